//! Subcommands. Each `run` returns the process exit code.

pub mod discover;
pub mod schema;
pub mod stats;
pub mod validate;

pub const EXIT_OK: u8 = 0;
pub const EXIT_FAILURE: u8 = 1;
/// The manifest or lock is not there at all.
pub const EXIT_MISSING: u8 = 2;
