//! Terminal display and formatting utilities.
//!
//! Handles colorized JSON output and report rendering for both
//! human-readable and machine-readable output.

pub mod json_printer;
pub mod report;
