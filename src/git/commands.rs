//! Fixed git invocations used by the commit, push and history operations.
//!
//! Each builder returns an argument vector, so user-supplied values such as
//! the commit message reach git as a single argument without passing
//! through a shell.

use crate::gateway::executor::Invocation;

const GIT: &str = "git";

/// Field separator in the history format
pub const HISTORY_SEPARATOR: char = '|';

/// `--format` string for history: full hash, subject, author name, relative date
pub const HISTORY_FORMAT: &str = "%H|%s|%an|%ar";

/// `git add .`
pub fn stage_all() -> Invocation {
    Invocation::program(GIT, ["add", "."])
}

/// `git commit -m <message>`
pub fn commit(message: &str) -> Invocation {
    Invocation::program(GIT, ["commit", "-m", message])
}

/// `git push <remote> [<branch>]`
pub fn push(remote: &str, branch: Option<&str>) -> Invocation {
    let mut args = vec!["push", remote];
    if let Some(branch) = branch {
        args.push(branch);
    }
    Invocation::program(GIT, args)
}

/// `git log -n <limit> --format=%H|%s|%an|%ar`
pub fn history(limit: usize) -> Invocation {
    Invocation::program(
        GIT,
        [
            "log".to_string(),
            "-n".to_string(),
            limit.to_string(),
            format!("--format={}", HISTORY_FORMAT),
        ],
    )
}
