// Security integration tests
// Exercises the denylist through the validator and the gateway end-to-end

mod helpers;

use gitdeck::security::{CommandValidator, DANGEROUS_PATTERNS, Denylist, ValidationError};
use gitdeck::{CommandRequest, Gateway, GatewayError};
use helpers::RecordingRunner;

#[test]
fn test_validator_rejects_every_documented_pattern() {
    let validator = CommandValidator::new();

    let dangerous = [
        "rm -rf /",
        "rm -rf /some/path",
        "sudo rm -rf /var",
        "mkfs /dev/sda1",
        "mkfs.ext4 /dev/sdb1",
        "dd if=/dev/zero of=/dev/sda",
        ":(){ :|:& };:",
    ];

    for cmd in dangerous {
        let result = validator.validate(cmd);
        assert!(
            matches!(result, Err(ValidationError::Forbidden { .. })),
            "should be forbidden: {}",
            cmd
        );
    }
}

#[test]
fn test_validator_allows_everyday_commands() {
    let validator = CommandValidator::new();

    let commands = [
        "git status",
        "git log --oneline -20",
        "git diff HEAD~1",
        "git branch -a",
        "ls -la",
        "cat README.md",
        "rm -rf node_modules",
        "rm -rf ./build",
        "dd if=disk.img of=backup.img",
        "echo ':)'",
    ];

    for cmd in commands {
        assert!(validator.validate(cmd).is_ok(), "should be allowed: {}", cmd);
    }
}

#[test]
fn test_every_table_entry_has_a_reason() {
    let denylist = Denylist::new();
    assert_eq!(denylist.len(), DANGEROUS_PATTERNS.len());

    for entry in denylist.entries() {
        assert!(!entry.reason().is_empty(), "missing reason for {}", entry.pattern());
    }
}

#[test]
fn test_denylist_is_not_a_sandbox() {
    // Known gaps: the blocklist only catches the listed spellings
    let validator = CommandValidator::new();
    assert!(validator.validate("rm -r -f /").is_ok());
    assert!(validator.validate("rm --recursive --force /").is_ok());
}

#[tokio::test]
async fn test_gateway_maps_validation_errors() {
    let runner = RecordingRunner::new();
    let gateway = Gateway::new(runner.clone());

    let err = gateway.execute(&CommandRequest::shell("")).await.unwrap_err();
    assert!(matches!(err, GatewayError::InvalidInput(ref m) if m == "Invalid command"));

    let err = gateway
        .execute(&CommandRequest::shell("dd if=/dev/zero of=/dev/sda"))
        .await
        .unwrap_err();
    match err {
        GatewayError::Forbidden { pattern, reason } => {
            assert_eq!(pattern, r"dd\s+if=/dev/zero");
            assert_eq!(reason, "zero-fill device write");
        }
        other => panic!("expected Forbidden, got {:?}", other),
    }

    assert!(runner.calls().is_empty());
}

#[tokio::test]
async fn test_custom_validator_is_used() {
    let runner = RecordingRunner::new();
    let denylist = Denylist::from_patterns(&[(r"\bcurl\b", "network access")]).unwrap();
    let gateway = Gateway::new(runner.clone()).with_validator(CommandValidator::with_denylist(denylist));

    let err = gateway
        .execute(&CommandRequest::shell("curl https://example.com"))
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::Forbidden { .. }));

    assert!(gateway.execute(&CommandRequest::shell("echo ok")).await.is_ok());
    assert_eq!(runner.calls().len(), 1);
}
