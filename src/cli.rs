//! CLI argument definitions for jotty.
//!
//! Uses `clap` derive macros to define the command-line interface.
//! Values are validated while parsing, and the validation flags are
//! turned into a [`ValidationConfig`] by explicit field assignment.
//!
//! # Security
//!
//! `Cli` implements a custom `Debug` that redacts the inline token to
//! prevent accidental leakage through debug formatting or logging.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use clap::Parser;
use jsonwebtoken::Algorithm;

use crate::core::decoder::PaddingRule;
use crate::core::input::{STDIN_MARKER, TokenSource};
use crate::core::options::{ValidationConfig, dedup_methods};
use crate::display::report::Sections;
use crate::error::JottyError;

/// Inspect a JSON Web Token: decode its header, payload, and signature,
/// and optionally validate it against a key and a set of claim rules.
#[derive(Parser)]
#[command(name = "jotty")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// The token to inspect. If omitted, reads from --file.
    pub token: Option<String>,

    /// Read the token from a file, or from stdin with "-".
    #[arg(short, long, value_name = "FILE", default_value = STDIN_MARKER)]
    pub file: PathBuf,

    /// Do not print the header.
    #[arg(long)]
    pub no_header: bool,

    /// Do not print the payload.
    #[arg(long)]
    pub no_payload: bool,

    /// Do not print the signature.
    #[arg(long)]
    pub no_signature: bool,

    /// Require the `aud` claim to match this value.
    #[arg(long, value_name = "AUD")]
    pub with_audience: Option<String>,

    /// Require the `exp` claim to be present.
    #[arg(long)]
    pub with_expiration: bool,

    /// Reject tokens whose `iat` claim lies in the future.
    #[arg(long)]
    pub with_issued_at: bool,

    /// Require the `iss` claim to match this value.
    #[arg(long, value_name = "ISS")]
    pub with_issuer: Option<String>,

    /// Keep claim numbers exact instead of converting them to floats.
    #[arg(long)]
    pub with_json_number: bool,

    /// Clock-skew tolerance for time-based claims, e.g. "30s" or "1m30s".
    #[arg(long, value_name = "DURATION", default_value = "0", value_parser = parse_duration)]
    pub with_leeway: Duration,

    /// Accept padded base64url segments during validation.
    #[arg(long)]
    pub with_padding_allowed: bool,

    /// Require canonical base64url encoding during validation.
    #[arg(long)]
    pub with_strict_decoding: bool,

    /// Require the `sub` claim to match this value.
    #[arg(long, value_name = "SUB")]
    pub with_subject: Option<String>,

    /// Accepted signing methods. Repeat the flag or separate with commas.
    #[arg(long, value_name = "ALG", value_delimiter = ',', value_parser = parse_algorithm)]
    pub with_valid_methods: Vec<Algorithm>,

    /// Verification key: an HMAC secret or a PEM-encoded public key.
    #[arg(long, value_name = "FILE")]
    pub key_file: Option<PathBuf>,

    /// Output raw JSON without colors (machine-readable).
    #[arg(long)]
    pub json: bool,

    /// Pad segments to a multiple of four instead of appending `len % 4` characters.
    #[arg(long)]
    pub standard_padding: bool,

    /// Log filter directive for diagnostics on stderr. `RUST_LOG` wins when set.
    #[arg(long, value_name = "FILTER", default_value = "warn")]
    pub log_level: String,
}

impl Cli {
    pub fn token_source(&self) -> TokenSource {
        TokenSource::resolve(self.token.as_deref(), &self.file)
    }

    pub fn padding_rule(&self) -> PaddingRule {
        if self.standard_padding {
            PaddingRule::Standard
        } else {
            PaddingRule::Legacy
        }
    }

    pub fn sections(&self) -> Sections {
        Sections {
            header: !self.no_header,
            payload: !self.no_payload,
            signature: !self.no_signature,
        }
    }
}

impl From<&Cli> for ValidationConfig {
    fn from(cli: &Cli) -> Self {
        Self {
            audience: non_empty(cli.with_audience.as_deref()),
            require_expiration: cli.with_expiration,
            require_issued_at: cli.with_issued_at,
            issuer: non_empty(cli.with_issuer.as_deref()),
            json_numbers: cli.with_json_number,
            leeway: cli.with_leeway,
            allow_padding: cli.with_padding_allowed,
            strict_decoding: cli.with_strict_decoding,
            subject: non_empty(cli.with_subject.as_deref()),
            valid_methods: dedup_methods(cli.with_valid_methods.iter().copied()),
            key_file: cli
                .key_file
                .clone()
                .filter(|path| !path.as_os_str().is_empty()),
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}

/// Custom `Debug` that redacts the inline token.
impl fmt::Debug for Cli {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cli")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("file", &self.file)
            .field("no_header", &self.no_header)
            .field("no_payload", &self.no_payload)
            .field("no_signature", &self.no_signature)
            .field("with_audience", &self.with_audience)
            .field("with_expiration", &self.with_expiration)
            .field("with_issued_at", &self.with_issued_at)
            .field("with_issuer", &self.with_issuer)
            .field("with_json_number", &self.with_json_number)
            .field("with_leeway", &self.with_leeway)
            .field("with_padding_allowed", &self.with_padding_allowed)
            .field("with_strict_decoding", &self.with_strict_decoding)
            .field("with_subject", &self.with_subject)
            .field("with_valid_methods", &self.with_valid_methods)
            .field("key_file", &self.key_file)
            .field("json", &self.json)
            .field("standard_padding", &self.standard_padding)
            .field("log_level", &self.log_level)
            .finish()
    }
}

/// Parse a signing method name such as `HS256` or `EdDSA`.
fn parse_algorithm(name: &str) -> Result<Algorithm, JottyError> {
    Algorithm::from_str(name.trim()).map_err(|_| JottyError::UnsupportedAlgorithm {
        algorithm: name.to_string(),
    })
}

/// Parse a duration such as `300ms`, `1.5h`, or `2h45m`.
///
/// A duration is a sequence of decimal numbers, each with a unit suffix
/// (`ns`, `us`, `µs`, `ms`, `s`, `m`, `h`). A bare `0` is also accepted.
pub fn parse_duration(expression: &str) -> Result<Duration, JottyError> {
    let fail = |reason: String| JottyError::InvalidDuration {
        expression: expression.to_string(),
        reason,
    };

    let text = expression.trim();
    if text == "0" {
        return Ok(Duration::ZERO);
    }
    if text.is_empty() {
        return Err(fail("empty duration".to_string()));
    }
    if text.starts_with('-') {
        return Err(fail("duration must not be negative".to_string()));
    }

    let mut rest = text.strip_prefix('+').unwrap_or(text);
    let mut total_nanos: u128 = 0;

    while !rest.is_empty() {
        let number_end = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        let (number, after) = rest.split_at(number_end);
        if number.is_empty() {
            return Err(fail(format!("expected a number before '{after}'")));
        }

        let unit_end = after
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(after.len());
        let (unit, remainder) = after.split_at(unit_end);
        let unit_nanos: u128 = match unit {
            "ns" => 1,
            "us" | "µs" | "μs" => 1_000,
            "ms" => 1_000_000,
            "s" => 1_000_000_000,
            "m" => 60_000_000_000,
            "h" => 3_600_000_000_000,
            "" => return Err(fail(format!("missing unit after '{number}'"))),
            other => return Err(fail(format!("unknown unit '{other}'"))),
        };

        let nanos = scaled_nanos(number, unit_nanos)
            .ok_or_else(|| fail(format!("invalid number '{number}'")))?;
        total_nanos = total_nanos
            .checked_add(nanos)
            .ok_or_else(|| fail("duration is too large".to_string()))?;
        rest = remainder;
    }

    let secs = u64::try_from(total_nanos / 1_000_000_000)
        .map_err(|_| fail("duration is too large".to_string()))?;
    // The remainder is below one billion and always fits.
    let subsec = (total_nanos % 1_000_000_000) as u32;
    Ok(Duration::new(secs, subsec))
}

/// Multiply a decimal string by `unit_nanos` without going through floats.
fn scaled_nanos(number: &str, unit_nanos: u128) -> Option<u128> {
    let (whole, fraction) = number.split_once('.').unwrap_or((number, ""));
    if whole.is_empty() && fraction.is_empty() {
        return None;
    }
    if fraction.contains('.') {
        return None;
    }

    let whole: u128 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
    let mut nanos = whole.checked_mul(unit_nanos)?;

    if !fraction.is_empty() {
        // Digits beyond nanosecond precision of the largest unit are dropped.
        let digits = &fraction[..fraction.len().min(18)];
        let value: u128 = digits.parse().ok()?;
        let scale = 10u128.pow(u32::try_from(digits.len()).ok()?);
        nanos = nanos.checked_add(value.checked_mul(unit_nanos)? / scale)?;
    }
    Some(nanos)
}
