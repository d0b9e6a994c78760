//! Command-line interface for lexcheck.

mod commands;
pub mod helpers;
pub mod progress;

pub use commands::{is_verbose, run};
