//! Token input resolution.
//!
//! A token comes from the positional argument, a file, or stdin. Every
//! source is read to completion before decoding starts.

use std::io::Read;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::JottyError;

/// File name that selects standard input.
pub const STDIN_MARKER: &str = "-";

/// Where the token text is read from.
#[derive(Clone, PartialEq, Eq)]
pub enum TokenSource {
    Inline(String),
    File(PathBuf),
    Stdin,
}

impl std::fmt::Debug for TokenSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Inline(_) => f.write_str("Inline([REDACTED])"),
            Self::File(path) => f.debug_tuple("File").field(path).finish(),
            Self::Stdin => f.write_str("Stdin"),
        }
    }
}

impl TokenSource {
    /// Pick the source: an inline token wins, then `file` (`-` is stdin).
    pub fn resolve(token: Option<&str>, file: &Path) -> Self {
        match token {
            Some(token) => Self::Inline(token.to_string()),
            None if file.as_os_str() == STDIN_MARKER => Self::Stdin,
            None => Self::File(file.to_path_buf()),
        }
    }

    /// Read the token text from this source, using `stdin` for [`TokenSource::Stdin`].
    ///
    /// Surrounding whitespace is trimmed.
    ///
    /// # Errors
    ///
    /// Returns [`JottyError::InputUnreadable`] if reading fails, or
    /// [`JottyError::NoTokenProvided`] if the trimmed text is empty.
    pub fn read_with<R: Read>(&self, stdin: R) -> Result<String, JottyError> {
        debug!(source = ?self, "reading token");
        let text = match self {
            Self::Inline(token) => token.clone(),
            Self::File(path) => {
                std::fs::read_to_string(path).map_err(|source| JottyError::InputUnreadable {
                    source_name: format!("'{}'", path.display()),
                    source,
                })?
            }
            Self::Stdin => read_all(stdin)?,
        };

        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(JottyError::NoTokenProvided);
        }
        Ok(trimmed.to_string())
    }
}

fn read_all<R: Read>(mut reader: R) -> Result<String, JottyError> {
    let mut text = String::new();
    reader
        .read_to_string(&mut text)
        .map_err(|source| JottyError::InputUnreadable {
            source_name: "stdin".to_string(),
            source,
        })?;
    Ok(text)
}
