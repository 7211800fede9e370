//! Command-line interface for medportal.

mod commands;
pub mod icons;

pub use commands::{is_verbose, run};
