//! Validation configuration and its compiled option list.
//!
//! [`ValidationConfig`] is an immutable record with one field per
//! validation flag. [`ValidationConfig::compile`] maps it to an ordered
//! list of [`ValidationOption`]s consumed by the verifier.

use std::path::PathBuf;
use std::time::Duration;

use jsonwebtoken::Algorithm;

/// Validation settings for a single run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationConfig {
    /// Required `aud` value.
    pub audience: Option<String>,
    /// Require the `exp` claim to be present (and unexpired).
    pub require_expiration: bool,
    /// Reject tokens whose `iat` lies in the future.
    pub require_issued_at: bool,
    /// Required `iss` value.
    pub issuer: Option<String>,
    /// Keep claim numbers exact instead of converting them to `f64`.
    pub json_numbers: bool,
    /// Clock-skew tolerance for time-based claims.
    pub leeway: Duration,
    /// Accept padded base64url segments.
    pub allow_padding: bool,
    /// Require canonical base64url (zero trailing bits).
    pub strict_decoding: bool,
    /// Required `sub` value.
    pub subject: Option<String>,
    /// Accepted signing algorithms, in first-seen order without duplicates.
    pub valid_methods: Vec<Algorithm>,
    /// Path to the verification key.
    pub key_file: Option<PathBuf>,
}

/// A single validation rule handed to the verifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOption {
    Audience(String),
    ExpirationRequired,
    IssuedAt,
    Issuer(String),
    JsonNumber,
    Leeway(Duration),
    PaddingAllowed,
    StrictDecoding,
    Subject(String),
    ValidMethods(Vec<Algorithm>),
}

impl ValidationConfig {
    /// Compile this configuration into an ordered option list.
    ///
    /// Options are emitted in field order. Empty strings, a zero leeway,
    /// and an empty method list emit nothing, so a default configuration
    /// compiles to an empty list.
    pub fn compile(&self) -> Vec<ValidationOption> {
        let mut options = Vec::new();

        if let Some(audience) = non_empty(&self.audience) {
            options.push(ValidationOption::Audience(audience.to_string()));
        }
        if self.require_expiration {
            options.push(ValidationOption::ExpirationRequired);
        }
        if self.require_issued_at {
            options.push(ValidationOption::IssuedAt);
        }
        if let Some(issuer) = non_empty(&self.issuer) {
            options.push(ValidationOption::Issuer(issuer.to_string()));
        }
        if self.json_numbers {
            options.push(ValidationOption::JsonNumber);
        }
        if !self.leeway.is_zero() {
            options.push(ValidationOption::Leeway(self.leeway));
        }
        if self.allow_padding {
            options.push(ValidationOption::PaddingAllowed);
        }
        if self.strict_decoding {
            options.push(ValidationOption::StrictDecoding);
        }
        if let Some(subject) = non_empty(&self.subject) {
            options.push(ValidationOption::Subject(subject.to_string()));
        }
        if !self.valid_methods.is_empty() {
            options.push(ValidationOption::ValidMethods(self.valid_methods.clone()));
        }

        options
    }
}

/// Remove repeated algorithms while keeping first-seen order.
pub fn dedup_methods(methods: impl IntoIterator<Item = Algorithm>) -> Vec<Algorithm> {
    let mut unique = Vec::new();
    for method in methods {
        if !unique.contains(&method) {
            unique.push(method);
        }
    }
    unique
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
