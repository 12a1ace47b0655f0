pub mod denylist;
pub mod validator;

pub use denylist::{DANGEROUS_PATTERNS, Denylist, DenylistEntry};
pub use validator::{CommandValidator, ValidatedCommand, ValidationError};
