//! Command handlers.
//!
//! The tool has a single command; its handler exposes an `execute`
//! function that receives the parsed arguments.

pub mod inspect;
