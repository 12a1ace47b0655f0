pub mod commands;
pub mod parser;

// Re-export commonly used types
pub use commands::{HISTORY_FORMAT, HISTORY_SEPARATOR};
pub use parser::{CommitEntry, parse_history, parse_history_line};
