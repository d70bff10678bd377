//! Token decoding logic.
//!
//! Handles splitting a raw token string into its three parts (header,
//! payload, signature), padding and base64url-decoding the header and
//! payload segments, and parsing them as JSON objects.
//!
//! Decoding is staged: [`RawToken::split`] yields the borrowed segments,
//! and [`RawToken::decode`] turns them into a [`Token`] or fails without
//! producing a partial result.

use std::fmt;

use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use serde_json::{Map, Value};
use tracing::trace;

use crate::error::{JottyError, SegmentKind, sanitize_for_display};

/// Segment separator in compact serialization.
const SEPARATOR: char = '.';

/// URL-safe engine for segments that have already been padded.
///
/// Tolerates non-zero trailing bits in the final quantum, matching the
/// lenient decoders most token producers are tested against.
const PADDED_URL_SAFE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_decode_allow_trailing_bits(true)
        .with_decode_padding_mode(DecodePaddingMode::RequireCanonical),
);

/// How many `=` characters are appended to a segment before decoding.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum PaddingRule {
    /// Pad to the next multiple of four: `(4 - len % 4) % 4` characters.
    Standard,
    /// Append `len % 4` characters.
    ///
    /// This is the default. It only pads correctly for lengths congruent
    /// to 0 or 2 mod 4, so segments of length 3 mod 4 fail to decode.
    #[default]
    Legacy,
}

impl PaddingRule {
    /// Number of `=` characters this rule appends to a segment of `len` bytes.
    pub fn padding_for(self, len: usize) -> usize {
        match self {
            Self::Standard => (4 - len % 4) % 4,
            Self::Legacy => len % 4,
        }
    }

    /// Return `segment` with this rule's padding appended.
    pub fn pad(self, segment: &str) -> String {
        let fill = self.padding_for(segment.len());
        let mut padded = String::with_capacity(segment.len() + fill);
        padded.push_str(segment);
        padded.extend(std::iter::repeat_n('=', fill));
        padded
    }
}

/// The three segments of a token, split but not yet decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawToken<'a> {
    pub header: &'a str,
    pub payload: &'a str,
    pub signature: &'a str,
}

impl<'a> RawToken<'a> {
    /// Split a token on `.` into exactly three segments.
    ///
    /// # Errors
    ///
    /// Returns [`JottyError::MalformedToken`] if the input has any other
    /// number of segments.
    pub fn split(raw: &'a str) -> Result<Self, JottyError> {
        let parts: Vec<&str> = raw.split(SEPARATOR).collect();
        match parts.as_slice() {
            [header, payload, signature] => Ok(Self {
                header,
                payload,
                signature,
            }),
            _ => Err(JottyError::MalformedToken {
                token: sanitize_for_display(raw),
            }),
        }
    }

    /// Decode the header and then the payload, in that order.
    ///
    /// The signature is copied verbatim and never decoded here.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by [`decode_segment`].
    pub fn decode(&self, rule: PaddingRule) -> Result<Token, JottyError> {
        let header = decode_segment(self.header, SegmentKind::Header, rule)?;
        let payload = decode_segment(self.payload, SegmentKind::Payload, rule)?;

        Ok(Token {
            header,
            payload,
            signature: self.signature.to_string(),
        })
    }
}

/// A fully decoded token.
///
/// Implements a custom `Debug` that redacts `payload` and `signature`
/// to prevent accidental leakage of sensitive claim data.
#[derive(Clone, PartialEq)]
pub struct Token {
    /// The parsed header (typically contains `alg` and `typ`).
    pub header: Map<String, Value>,
    /// The parsed payload (claims).
    pub payload: Map<String, Value>,
    /// The raw base64url-encoded signature segment.
    pub signature: String,
}

impl Token {
    /// Split and decode a raw token string.
    ///
    /// # Errors
    ///
    /// Returns an error if the token doesn't have exactly three parts,
    /// if base64url decoding fails, or if JSON parsing fails.
    pub fn decode(raw: &str, rule: PaddingRule) -> Result<Self, JottyError> {
        RawToken::split(raw)?.decode(rule)
    }
}

/// Custom `Debug` that redacts payload and signature to prevent
/// accidental leakage through debug formatting or error chains.
impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("header", &self.header)
            .field("payload", &"[REDACTED]")
            .field("signature", &"[REDACTED]")
            .finish()
    }
}

/// Pad, base64url-decode, and parse one header or payload segment.
///
/// # Errors
///
/// - [`JottyError::SegmentLooksLikeMultiPart`] if `segment` contains a `.`
/// - [`JottyError::InvalidBase64`] if the padded text is not base64url
/// - [`JottyError::InvalidJson`] if the bytes are not a JSON object
pub fn decode_segment(
    segment: &str,
    kind: SegmentKind,
    rule: PaddingRule,
) -> Result<Map<String, Value>, JottyError> {
    if segment.contains(SEPARATOR) {
        return Err(JottyError::SegmentLooksLikeMultiPart {
            segment: sanitize_for_display(segment),
        });
    }

    let padded = rule.pad(segment);
    trace!(
        segment = %kind,
        len = segment.len(),
        padding = padded.len() - segment.len(),
        "decoding segment"
    );

    let bytes = PADDED_URL_SAFE
        .decode(&padded)
        .map_err(|source| JottyError::InvalidBase64 {
            kind,
            segment: sanitize_for_display(&padded),
            source,
        })?;

    serde_json::from_slice(&bytes).map_err(|source| JottyError::InvalidJson { kind, source })
}
