//! Token signature and claim validation.
//!
//! A [`Parser`] is built by folding the compiled [`ValidationOption`]s in
//! order. Segments are decoded under the padding and strictness options,
//! the signature is checked over the token text exactly as received, and
//! the standard claim checks are delegated to `jsonwebtoken`. The
//! algorithm is taken from the token header and the key bytes are
//! interpreted for that algorithm's family.

use std::fmt;
use std::time::Duration;

use base64::Engine;
use base64::alphabet;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use jsonwebtoken::errors::{Error as JwtError, ErrorKind};
use jsonwebtoken::{Algorithm, DecodingKey, Header, Validation, crypto, decode};
use serde_json::{Map, Number, Value};
use tracing::debug;

use crate::core::key::KeyMaterial;
use crate::core::options::ValidationOption;
use crate::error::{JottyError, sanitize_for_display};

const SEGMENT_NAMES: [&str; 3] = ["header", "payload", "signature"];

/// The result of a validation attempt.
#[derive(Clone, PartialEq)]
pub enum Verdict {
    /// The signature and all requested claim checks passed.
    Valid {
        /// The verified claims, with numbers shaped by the number mode.
        claims: Map<String, Value>,
    },
    /// The token failed a signature, encoding, or claim check.
    Invalid {
        /// Human-readable reason for the failure.
        reason: String,
    },
    /// No key was configured, so nothing could be checked.
    Unverifiable,
}

impl Verdict {
    fn invalid(reason: impl Into<String>) -> Self {
        Self::Invalid {
            reason: reason.into(),
        }
    }

    /// Short status word used in output.
    pub fn status(&self) -> &'static str {
        match self {
            Self::Valid { .. } => "valid",
            Self::Invalid { .. } => "invalid",
            Self::Unverifiable => "unverifiable",
        }
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, Self::Invalid { .. })
    }
}

/// Custom `Debug` that redacts verified claims.
impl fmt::Debug for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Valid { .. } => f
                .debug_struct("Valid")
                .field("claims", &"[REDACTED]")
                .finish(),
            Self::Invalid { reason } => f.debug_struct("Invalid").field("reason", reason).finish(),
            Self::Unverifiable => f.write_str("Unverifiable"),
        }
    }
}

/// Validation settings accumulated from an option list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parser {
    audience: Option<String>,
    issuer: Option<String>,
    subject: Option<String>,
    require_expiration: bool,
    verify_issued_at: bool,
    exact_numbers: bool,
    leeway: Duration,
    allow_padding: bool,
    strict_decoding: bool,
    valid_methods: Option<Vec<Algorithm>>,
}

impl Parser {
    /// Build a parser by applying `options` in order. Later options
    /// of the same kind replace earlier ones.
    pub fn new(options: &[ValidationOption]) -> Self {
        let mut parser = Self::default();
        for option in options {
            parser.apply(option);
        }
        parser
    }

    fn apply(&mut self, option: &ValidationOption) {
        match option {
            ValidationOption::Audience(aud) => self.audience = Some(aud.clone()),
            ValidationOption::ExpirationRequired => self.require_expiration = true,
            ValidationOption::IssuedAt => self.verify_issued_at = true,
            ValidationOption::Issuer(iss) => self.issuer = Some(iss.clone()),
            ValidationOption::JsonNumber => self.exact_numbers = true,
            ValidationOption::Leeway(leeway) => self.leeway = *leeway,
            ValidationOption::PaddingAllowed => self.allow_padding = true,
            ValidationOption::StrictDecoding => self.strict_decoding = true,
            ValidationOption::Subject(sub) => self.subject = Some(sub.clone()),
            ValidationOption::ValidMethods(methods) => self.valid_methods = Some(methods.clone()),
        }
    }

    /// Validate `token` against `key`.
    ///
    /// Check failures are reported as [`Verdict::Invalid`]; only problems
    /// with the key itself are returned as errors.
    ///
    /// # Errors
    ///
    /// Returns [`JottyError::MalformedToken`] if the token does not have
    /// three segments, or [`JottyError::InvalidKeyMaterial`] if the key
    /// cannot be parsed for the token's algorithm.
    pub fn verify(&self, token: &str, key: &KeyMaterial) -> Result<Verdict, JottyError> {
        let parts: Vec<&str> = token.split('.').collect();
        let [header_text, payload_text, signature_text] = parts.as_slice() else {
            return Err(JottyError::MalformedToken {
                token: sanitize_for_display(token),
            });
        };

        let [header_bytes, payload_bytes, signature_bytes] =
            match self.decode_segments([*header_text, *payload_text, *signature_text]) {
                Ok(segments) => segments,
                Err(verdict) => return Ok(verdict),
            };

        let header: Header = match serde_json::from_slice(&header_bytes) {
            Ok(header) => header,
            Err(e) => {
                return Ok(Verdict::invalid(format!(
                    "token header is not usable: {}",
                    sanitize_for_display(&e.to_string())
                )));
            }
        };
        let algorithm = header.alg;
        debug!(?algorithm, "verifying token");

        if let Some(methods) = &self.valid_methods
            && !methods.contains(&algorithm)
        {
            return Ok(Verdict::invalid(format!(
                "signing method {algorithm:?} is not accepted"
            )));
        }

        let decoding_key = decoding_key_for(algorithm, key)?;

        // The signing input is the text as received, padding included.
        let message = &token[..header_text.len() + 1 + payload_text.len()];
        let signature = URL_SAFE_NO_PAD.encode(&signature_bytes);
        match crypto::verify(&signature, message.as_bytes(), &decoding_key, algorithm) {
            Ok(true) => {}
            Ok(false) => {
                return Ok(Verdict::invalid(describe_error(&ErrorKind::InvalidSignature)));
            }
            Err(e) => return reject(algorithm, &e),
        }

        // Claims are checked on a canonical rewrite of the decoded bytes.
        let canonical = format!(
            "{}.{}.",
            URL_SAFE_NO_PAD.encode(&header_bytes),
            URL_SAFE_NO_PAD.encode(&payload_bytes)
        );
        let validation = self.validation_for(algorithm);
        let claims = match decode::<Map<String, Value>>(&canonical, &decoding_key, &validation) {
            Ok(data) => data.claims,
            Err(e) => return reject(algorithm, &e),
        };

        if self.verify_issued_at {
            let now = chrono::Utc::now().timestamp();
            if let Err(reason) = check_issued_at(&claims, now, self.leeway) {
                return Ok(Verdict::invalid(reason));
            }
        }

        let claims = if self.exact_numbers {
            claims
        } else {
            claims
                .into_iter()
                .map(|(name, value)| (name, to_float_numbers(value)))
                .collect()
        };

        Ok(Verdict::Valid { claims })
    }

    /// Decode all three segments under the padding and strictness options.
    fn decode_segments(&self, segments: [&str; 3]) -> Result<[Vec<u8>; 3], Verdict> {
        let engine = self.segment_engine();
        let mut decoded: [Vec<u8>; 3] = Default::default();
        for ((segment, name), out) in segments.into_iter().zip(SEGMENT_NAMES).zip(&mut decoded) {
            if segment.ends_with('=') && !self.allow_padding {
                return Err(Verdict::invalid(format!(
                    "{name} segment is padded and padding is not allowed"
                )));
            }
            *out = engine.decode(segment).map_err(|e| {
                let form = if self.strict_decoding { "canonical " } else { "" };
                Verdict::invalid(format!("{name} segment is not {form}base64url: {e}"))
            })?;
        }
        Ok(decoded)
    }

    /// URL-safe engine for the configured options.
    ///
    /// Padding, when allowed, may be present or absent but must be correct
    /// if present. Non-zero trailing bits are rejected only in strict mode.
    fn segment_engine(&self) -> GeneralPurpose {
        let padding = if self.allow_padding {
            DecodePaddingMode::Indifferent
        } else {
            DecodePaddingMode::RequireNone
        };
        GeneralPurpose::new(
            &alphabet::URL_SAFE,
            GeneralPurposeConfig::new()
                .with_decode_allow_trailing_bits(!self.strict_decoding)
                .with_decode_padding_mode(padding),
        )
    }

    fn validation_for(&self, algorithm: Algorithm) -> Validation {
        let mut validation = Validation::new(algorithm);
        // Checked separately over the received text.
        validation.insecure_disable_signature_validation();
        validation.leeway = whole_seconds(self.leeway);
        validation.validate_exp = true;
        validation.validate_nbf = true;

        let mut required = Vec::new();
        if self.require_expiration {
            required.push("exp");
        }
        if self.audience.is_some() {
            required.push("aud");
        }
        if self.issuer.is_some() {
            required.push("iss");
        }
        if self.subject.is_some() {
            required.push("sub");
        }
        validation.set_required_spec_claims(&required);

        validation.validate_aud = self.audience.is_some();
        if let Some(audience) = &self.audience {
            validation.set_audience(&[audience]);
        }
        if let Some(issuer) = &self.issuer {
            validation.set_issuer(&[issuer]);
        }
        validation.sub.clone_from(&self.subject);
        validation
    }
}

/// Split a `jsonwebtoken` failure into a key error or an invalid verdict.
fn reject(algorithm: Algorithm, error: &JwtError) -> Result<Verdict, JottyError> {
    match error.kind() {
        ErrorKind::InvalidKeyFormat | ErrorKind::InvalidRsaKey(_) | ErrorKind::InvalidEcdsaKey => {
            Err(JottyError::InvalidKeyMaterial {
                algorithm: format!("{algorithm:?}"),
                reason: describe_error(error.kind()),
            })
        }
        kind => Ok(Verdict::invalid(describe_error(kind))),
    }
}

/// Interpret key bytes according to the algorithm family.
fn decoding_key_for(algorithm: Algorithm, key: &KeyMaterial) -> Result<DecodingKey, JottyError> {
    let bytes = key.as_bytes();
    let parsed = match algorithm {
        Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => {
            return Ok(DecodingKey::from_secret(bytes));
        }
        Algorithm::RS256
        | Algorithm::RS384
        | Algorithm::RS512
        | Algorithm::PS256
        | Algorithm::PS384
        | Algorithm::PS512 => DecodingKey::from_rsa_pem(bytes),
        Algorithm::ES256 | Algorithm::ES384 => DecodingKey::from_ec_pem(bytes),
        Algorithm::EdDSA => DecodingKey::from_ed_pem(bytes),
    };

    parsed.map_err(|e| JottyError::InvalidKeyMaterial {
        algorithm: format!("{algorithm:?}"),
        reason: describe_error(e.kind()),
    })
}

/// Reject an `iat` claim later than `now` plus `leeway`.
fn check_issued_at(claims: &Map<String, Value>, now: i64, leeway: Duration) -> Result<(), String> {
    let Some(iat) = claims.get("iat") else {
        return Ok(());
    };
    let Some(iat) = iat.as_f64() else {
        return Err("claim 'iat' is not a number".to_string());
    };

    #[allow(clippy::cast_precision_loss)]
    let latest = now as f64 + leeway.as_secs_f64();
    if iat > latest {
        return Err("token used before issued".to_string());
    }
    Ok(())
}

/// Round a leeway up to whole seconds.
fn whole_seconds(leeway: Duration) -> u64 {
    leeway.as_secs() + u64::from(leeway.subsec_nanos() > 0)
}

/// Recursively convert every JSON number to an `f64`.
fn to_float_numbers(value: Value) -> Value {
    match value {
        Value::Number(n) => n
            .as_f64()
            .and_then(Number::from_f64)
            .map_or(Value::Number(n), Value::Number),
        Value::Array(items) => Value::Array(items.into_iter().map(to_float_numbers).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(name, value)| (name, to_float_numbers(value)))
                .collect(),
        ),
        other => other,
    }
}

/// Map a `jsonwebtoken` error to a short reason that leaks no internals.
fn describe_error(kind: &ErrorKind) -> String {
    match kind {
        ErrorKind::InvalidSignature => "signature does not match the key".to_string(),
        ErrorKind::ExpiredSignature => "token is expired".to_string(),
        ErrorKind::ImmatureSignature => "token is not valid yet".to_string(),
        ErrorKind::InvalidAudience => "audience does not match".to_string(),
        ErrorKind::InvalidIssuer => "issuer does not match".to_string(),
        ErrorKind::InvalidSubject => "subject does not match".to_string(),
        ErrorKind::MissingRequiredClaim(claim) => format!("required claim '{claim}' is missing"),
        ErrorKind::InvalidAlgorithm => "algorithm mismatch between token and key".to_string(),
        ErrorKind::InvalidAlgorithmName => "unknown algorithm name".to_string(),
        ErrorKind::MissingAlgorithm => "no algorithm to validate with".to_string(),
        ErrorKind::InvalidToken => "token is malformed".to_string(),
        ErrorKind::Base64(e) => format!("invalid base64url: {e}"),
        ErrorKind::Json(e) => format!("invalid JSON: {e}"),
        ErrorKind::Utf8(_) => "token is not valid UTF-8".to_string(),
        ErrorKind::InvalidKeyFormat => "key is not in a supported format".to_string(),
        ErrorKind::InvalidRsaKey(_) => "key is not a valid RSA key".to_string(),
        ErrorKind::InvalidEcdsaKey => "key is not a valid ECDSA key".to_string(),
        _ => "verification failed".to_string(),
    }
}
