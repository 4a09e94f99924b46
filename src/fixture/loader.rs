//! Fixture file loading.

use crate::hook::HookError;
use bytes::Bytes;
use std::path::{Path, PathBuf};

/// Fixture contents read from disk. Opaque to this crate: never parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixturePayload {
    /// File the payload was read from.
    pub path: PathBuf,
    /// Full file contents.
    pub contents: String,
}

impl FixturePayload {
    /// Size of the payload in bytes.
    pub fn len(&self) -> usize {
        self.contents.len()
    }

    /// Whether the fixture file was empty.
    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }

    /// Consume the payload into a request body.
    pub fn into_body(self) -> Bytes {
        Bytes::from(self.contents)
    }
}

/// Load the fixture file at `path`.
///
/// Returns `Ok(None)` when the file does not exist. Any other failure,
/// including contents that are not valid UTF-8, is a [`HookError::FixtureRead`].
pub async fn load_fixture(path: &Path) -> Result<Option<FixturePayload>, HookError> {
    let read_error = |source| HookError::FixtureRead {
        path: path.display().to_string(),
        source,
    };

    if !tokio::fs::try_exists(path).await.map_err(read_error)? {
        return Ok(None);
    }

    let contents = tokio::fs::read_to_string(path).await.map_err(read_error)?;

    Ok(Some(FixturePayload {
        path: path.to_path_buf(),
        contents,
    }))
}
