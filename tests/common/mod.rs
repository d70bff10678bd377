//! Shared test fixtures and helper utilities.
//!
//! Provides pre-built tokens with known claims, signing helpers, and
//! temporary file helpers for the CLI integration tests.
#![allow(dead_code)]

use std::io::Write;

use tempfile::NamedTempFile;

/// The jwt.io sample token. Both of its JSON segments decode under the
/// default padding rule.
///
/// Header: `{"alg":"HS256","typ":"JWT"}`
/// Payload: `{"sub":"1234567890","name":"John Doe","iat":1516239022}`
pub const VALID_HS256_TOKEN: &str = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9.\
     eyJzdWIiOiIxMjM0NTY3ODkwIiwibmFtZSI6IkpvaG4gRG9lIiwiaWF0IjoxNTE2MjM5MDIyfQ.\
     SflKxwRJSMeKKF2QT4fwpMeJf36POk6yJV_adQssw5c";

/// A token whose payload segment is 75 characters long (3 mod 4), so it
/// only decodes with `--standard-padding`.
///
/// Payload: `{"sub":"1234567890","name":"Test User","iat":1516239022}`
pub const THREE_MOD_FOUR_TOKEN: &str = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9.\
     eyJzdWIiOiIxMjM0NTY3ODkwIiwibmFtZSI6IlRlc3QgVXNlciIsImlhdCI6MTUxNjIzOTAyMn0.\
     SflKxwRJSMeKKF2QT4fwpMeJf36POk6yJV_adQssw5c";

/// A malformed token with only two parts (missing signature).
pub const MALFORMED_TOKEN_TWO_PARTS: &str = "eyJhbGciOiJIUzI1NiJ9.eyJzdWIiOiIxMjM0NTY3ODkwIn0";

/// A completely invalid token string.
pub const INVALID_TOKEN: &str = "not-a-valid-jwt";

/// A token whose header segment is base64 but not JSON.
pub const NON_JSON_HEADER_TOKEN: &str = "acbded.eyJhbGciOiJIUzI1NiJ9.sig";

/// HMAC secret used to sign test tokens for validation tests.
pub const HMAC_TEST_SECRET: &str = "verify-test-secret-key";

/// Path to the test RSA public key fixture.
pub const RSA_PUBLIC_KEY_PATH: &str = "tests/fixtures/rsa_public.pem";

/// Path to the test RSA private key fixture.
pub const RSA_PRIVATE_KEY_PATH: &str = "tests/fixtures/rsa_private.pem";

/// Path to the test EC public key fixture.
pub const EC_PUBLIC_KEY_PATH: &str = "tests/fixtures/ec_public.pem";

/// Path to the test EC private key fixture.
pub const EC_PRIVATE_KEY_PATH: &str = "tests/fixtures/ec_private.pem";

/// Create an HS256-signed token with the given claims.
pub fn create_hs256_token(secret: &str, claims: &serde_json::Value) -> String {
    use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());
    encode(&header, claims, &key).unwrap()
}

/// HS256-sign already encoded segments, keeping their text as given.
pub fn sign_hs256_segments(secret: &str, header: &str, payload: &str) -> String {
    use jsonwebtoken::{Algorithm, EncodingKey, crypto};
    let message = format!("{header}.{payload}");
    let key = EncodingKey::from_secret(secret.as_bytes());
    let signature = crypto::sign(message.as_bytes(), &key, Algorithm::HS256).unwrap();
    format!("{message}.{signature}")
}

/// Create an RS256-signed token using the test RSA private key.
pub fn create_rs256_token(claims: &serde_json::Value) -> String {
    use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
    let private_key = std::fs::read(RSA_PRIVATE_KEY_PATH).unwrap();
    let header = Header::new(Algorithm::RS256);
    let key = EncodingKey::from_rsa_pem(&private_key).unwrap();
    encode(&header, claims, &key).unwrap()
}

/// Create an ES256-signed token using the test EC private key.
pub fn create_es256_token(claims: &serde_json::Value) -> String {
    use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
    let private_key = std::fs::read(EC_PRIVATE_KEY_PATH).unwrap();
    let header = Header::new(Algorithm::ES256);
    let key = EncodingKey::from_ec_pem(&private_key).unwrap();
    encode(&header, claims, &key).unwrap()
}

/// Standard test claims used across validation tests.
///
/// Their JSON is 55 bytes, so the payload segment decodes under the
/// default padding rule.
pub fn standard_claims() -> serde_json::Value {
    serde_json::json!({
        "sub": "1234567890",
        "name": "John Doe",
        "iat": 1516239022
    })
}

/// Current Unix time in seconds.
pub fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Write `contents` to a fresh temporary file.
pub fn temp_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

/// A temporary key file holding the HMAC test secret.
pub fn hmac_key_file() -> NamedTempFile {
    temp_file(HMAC_TEST_SECRET)
}
