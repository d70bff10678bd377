//! Core business logic for token inspection.
//!
//! This module contains the domain logic separated from CLI concerns.
//! All types and functions here are testable without the CLI layer.

pub mod decoder;
pub mod input;
pub mod key;
pub mod options;
pub mod validator;
