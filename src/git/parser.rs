use crate::git::commands::HISTORY_SEPARATOR;
use serde::Serialize;

/// Parse `git log --format=%H|%s|%an|%ar` output
///
/// Blank lines are skipped; every other line yields an entry, even if it is
/// missing fields.
pub fn parse_history(output: &str) -> Vec<CommitEntry> {
    output
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(parse_history_line)
        .collect()
}

/// Parse a single `hash|message|author|date` line
///
/// Fields are split on the literal `|`. Short lines leave the trailing
/// fields as `None`; anything after a fourth `|` is dropped.
pub fn parse_history_line(line: &str) -> CommitEntry {
    let mut fields = line.split(HISTORY_SEPARATOR).map(str::to_string);

    CommitEntry {
        hash: fields.next(),
        message: fields.next(),
        author: fields.next(),
        date: fields.next(),
    }
}

/// Represents a commit from the history listing
///
/// Missing fields are omitted when serialized rather than sent as `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CommitEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}
