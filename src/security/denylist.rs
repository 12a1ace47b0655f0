use regex::Regex;

/// Ordered table of dangerous command patterns and the reason each is blocked.
///
/// Patterns are matched against the raw command text, so they also fire when
/// the dangerous command is embedded after `;`, `&&` or inside a subshell.
/// This is a blocklist of known-bad commands, not a sandbox: anything not
/// listed here runs with the full privileges of the gateway process.
pub const DANGEROUS_PATTERNS: &[(&str, &str)] = &[
    (r"rm\s+-rf\s+/", "recursive forced delete of the filesystem root"),
    (r"mkfs", "filesystem format command"),
    (r"dd\s+if=/dev/zero", "zero-fill device write"),
    (r":\s*\(\s*\)\s*\{\s*:\s*\|\s*:\s*&\s*\}\s*;", "fork bomb"),
];

/// A compiled denylist entry
#[derive(Debug, Clone)]
pub struct DenylistEntry {
    regex: Regex,
    reason: &'static str,
}

impl DenylistEntry {
    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }

    pub fn reason(&self) -> &'static str {
        self.reason
    }

    pub fn is_match(&self, command: &str) -> bool {
        self.regex.is_match(command)
    }
}

/// Compiled, ordered denylist. The first matching entry wins.
#[derive(Debug, Clone)]
pub struct Denylist {
    entries: Vec<DenylistEntry>,
}

impl Denylist {
    /// Compile the built-in pattern table
    pub fn new() -> Self {
        Self::from_patterns(DANGEROUS_PATTERNS)
            .expect("built-in denylist patterns are valid regular expressions")
    }

    /// Compile a custom ordered pattern table
    pub fn from_patterns(patterns: &[(&str, &'static str)]) -> Result<Self, regex::Error> {
        let entries = patterns
            .iter()
            .map(|(pattern, reason)| {
                Ok(DenylistEntry {
                    regex: Regex::new(pattern)?,
                    reason: *reason,
                })
            })
            .collect::<Result<Vec<_>, regex::Error>>()?;

        Ok(Self { entries })
    }

    /// Return the first entry matching `command`, if any
    pub fn check(&self, command: &str) -> Option<&DenylistEntry> {
        self.entries.iter().find(|entry| entry.is_match(command))
    }

    pub fn entries(&self) -> impl Iterator<Item = &DenylistEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for Denylist {
    fn default() -> Self {
        Self::new()
    }
}
