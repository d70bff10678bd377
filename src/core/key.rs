//! Verification key loading.
//!
//! An unconfigured key is represented as `None`, never as placeholder
//! bytes, so nothing downstream can mistake "no key" for key material.

use std::fmt;
use std::path::Path;

use tracing::debug;
use zeroize::Zeroizing;

use crate::error::JottyError;

/// Raw bytes of a verification key file (an HMAC secret or a PEM key).
///
/// The buffer is zeroized on drop and redacted in `Debug` output.
pub struct KeyMaterial(Zeroizing<Vec<u8>>);

impl KeyMaterial {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(Zeroizing::new(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("KeyMaterial").field(&"[REDACTED]").finish()
    }
}

/// Load the key at `path`, if one was configured.
///
/// Returns `Ok(None)` without touching the filesystem when `path` is
/// `None` or empty.
///
/// # Errors
///
/// Returns [`JottyError::KeyFileUnreadable`] if the file cannot be
/// opened or read.
pub fn resolve_key(path: Option<&Path>) -> Result<Option<KeyMaterial>, JottyError> {
    let Some(path) = path.filter(|p| !p.as_os_str().is_empty()) else {
        debug!("no key file configured");
        return Ok(None);
    };

    debug!(path = %path.display(), "reading key file");
    let bytes = std::fs::read(path).map_err(|source| JottyError::KeyFileUnreadable {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(Some(KeyMaterial::new(bytes)))
}
