//! Loading of image resources referenced by a document.

use std::path::{Path, PathBuf};

use billdesk_core::ImageSource;

use crate::encode::decode_data_uri;

/// Fetches the bytes behind an [`ImageSource`].
///
/// Errors are plain messages; the capture decides whether a failure blanks
/// the image or fails the whole capture.
pub trait ResourceLoader: Send + Sync {
    fn load(&self, source: &ImageSource) -> Result<Vec<u8>, String>;
}

/// Loads inline data URIs, local files relative to a base directory and,
/// with the `remote-images` feature, http(s) URLs.
#[derive(Debug, Clone, Default)]
pub struct DefaultLoader {
    base_dir: Option<PathBuf>,
}

impl DefaultLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve relative local paths against `dir`.
    pub fn with_base_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: Some(dir.into()),
        }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}

impl ResourceLoader for DefaultLoader {
    fn load(&self, source: &ImageSource) -> Result<Vec<u8>, String> {
        match source {
            ImageSource::Inline(uri) => decode_data_uri(uri),
            ImageSource::Local(path) => {
                let resolved = self.resolve(path);
                std::fs::read(&resolved).map_err(|e| format!("{}: {e}", resolved.display()))
            }
            ImageSource::Remote(url) => fetch_remote(url),
        }
    }
}

#[cfg(feature = "remote-images")]
fn fetch_remote(url: &str) -> Result<Vec<u8>, String> {
    let response = reqwest::blocking::get(url)
        .and_then(|r| r.error_for_status())
        .map_err(|e| format!("{url}: {e}"))?;
    let bytes = response.bytes().map_err(|e| format!("{url}: {e}"))?;
    Ok(bytes.to_vec())
}

#[cfg(not(feature = "remote-images"))]
fn fetch_remote(url: &str) -> Result<Vec<u8>, String> {
    Err(format!("{url}: remote fetching is not enabled"))
}
