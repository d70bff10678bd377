//! Domain error types for jotty.
//!
//! All business-logic errors are defined here using `thiserror`.
//! These errors are converted to user-friendly messages at the CLI boundary.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Maximum number of bytes of untrusted input echoed back in messages.
const DISPLAY_LIMIT: usize = 128;

/// The token segment a decoding failure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    Header,
    Payload,
}

impl fmt::Display for SegmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Header => f.write_str("header"),
            Self::Payload => f.write_str("payload"),
        }
    }
}

/// Errors that can occur while reading, decoding, or validating a token.
#[derive(Debug, Error)]
pub enum JottyError {
    /// The input does not split into exactly three dot-separated segments.
    #[error("invalid token format: '{token}' is not a 'header.payload.signature' structure")]
    MalformedToken {
        /// The offending input, sanitized for display.
        token: String,
    },

    /// A header or payload segment still contains a `.` separator.
    #[error("'{segment}' doesn't look like a single token segment")]
    SegmentLooksLikeMultiPart {
        /// The offending segment, sanitized for display.
        segment: String,
    },

    /// A segment is not valid base64url, even after padding.
    #[error("failed to decode {kind}: invalid base64url encoding in '{segment}': {source}")]
    InvalidBase64 {
        kind: SegmentKind,
        /// The padded segment text, sanitized for display.
        segment: String,
        #[source]
        source: base64::DecodeError,
    },

    /// The decoded bytes are not a JSON object.
    #[error("failed to parse {kind} as JSON: {source}")]
    InvalidJson {
        kind: SegmentKind,
        #[source]
        source: serde_json::Error,
    },

    /// The signing key file could not be opened or read.
    #[error("failed to read key file '{}': {source}", path.display())]
    KeyFileUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The key file was read but cannot be used for the token's algorithm.
    #[error("key material is not usable for {algorithm}: {reason}")]
    InvalidKeyMaterial {
        algorithm: String,
        reason: String,
    },

    /// The token file or stdin could not be read.
    #[error("failed to read token from {source_name}: {source}")]
    InputUnreadable {
        /// Either a file path or `stdin`.
        source_name: String,
        #[source]
        source: std::io::Error,
    },

    /// No token was provided via any input method.
    #[error("no token provided: pass a token as an argument, via --file, or through stdin")]
    NoTokenProvided,

    /// A leeway duration could not be parsed.
    #[error("invalid duration '{expression}': {reason}")]
    InvalidDuration {
        expression: String,
        reason: String,
    },

    /// The given signing method name is not known.
    #[error("unsupported algorithm: {algorithm}")]
    UnsupportedAlgorithm {
        algorithm: String,
    },

    /// The log filter directive could not be parsed.
    #[error("invalid log filter: {reason}")]
    LogFilter {
        reason: String,
    },
}

/// Sanitize untrusted text for inclusion in error messages.
///
/// Replaces control characters (including ANSI escape sequences) with
/// the Unicode replacement character to prevent terminal injection,
/// then truncates to [`DISPLAY_LIMIT`] bytes on a char boundary.
pub fn sanitize_for_display(text: &str) -> String {
    let clean = replace_control_chars(text);
    if clean.len() > DISPLAY_LIMIT {
        let end = clean.floor_char_boundary(DISPLAY_LIMIT);
        format!("{}...(truncated)", &clean[..end])
    } else {
        clean
    }
}

/// Replace control characters with the Unicode replacement character,
/// keeping the full length of `text`.
pub fn replace_control_chars(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_control() { '\u{FFFD}' } else { c })
        .collect()
}
