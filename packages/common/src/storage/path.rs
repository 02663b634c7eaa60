use std::fmt;

use super::error::StorageError;

/// A validated, slash-separated blob path such as `category_images/logo.png`.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct BlobPath(String);

impl BlobPath {
    /// Validate and construct a blob path.
    ///
    /// Paths are relative, use `/` as the separator, and every segment must
    /// be non-empty. `.` and `..` segments are rejected so a path can never
    /// escape the store root.
    pub fn new(path: impl Into<String>) -> Result<Self, StorageError> {
        let path = path.into();
        if path.is_empty() {
            return Err(StorageError::InvalidPath("path is empty".into()));
        }
        for segment in path.split('/') {
            if segment.is_empty() {
                return Err(StorageError::InvalidPath(format!(
                    "empty segment in {path:?}"
                )));
            }
            if segment == "." || segment == ".." {
                return Err(StorageError::InvalidPath(format!(
                    "relative segment {segment:?} in {path:?}"
                )));
            }
        }
        Ok(Self(path))
    }

    /// Construct a path of the form `{dir}/{file}`.
    pub fn in_dir(dir: &str, file: &str) -> Result<Self, StorageError> {
        Self::new(format!("{dir}/{file}"))
    }

    /// Return the path as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for BlobPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlobPath({})", self.0)
    }
}

impl fmt::Display for BlobPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Mint a download URL for a blob.
///
/// The path is embedded as a single URL segment with `/` escaped to `%2F`,
/// followed by the fixed `alt=media` query and an access token:
/// `{base}/{escaped-path}?alt=media&token={token}`.
pub fn download_url(base_url: &str, path: &BlobPath, token: &str) -> String {
    let escaped = path.as_str().replace('/', "%2F");
    let base = base_url.trim_end_matches('/');
    format!("{base}/{escaped}?alt=media&token={token}")
}

/// Recover the blob path from a download URL minted for a blob in `dir`.
///
/// Only the file segment is taken from the URL: the text between the first
/// `%2F` and the following `%2F` or `?`. The result is `{dir}/{file}`. URLs
/// without an escaped separator, or with an empty file segment, are rejected.
pub fn path_from_url(url: &str, dir: &str) -> Result<BlobPath, StorageError> {
    let mut parts = url.split("%2F");
    parts.next();
    let Some(after_dir) = parts.next() else {
        return Err(StorageError::InvalidUrl(format!(
            "no escaped path separator in {url:?}"
        )));
    };
    let file = match after_dir.split_once('?') {
        Some((file, _query)) => file,
        None => after_dir,
    };
    if file.is_empty() {
        return Err(StorageError::InvalidUrl(format!(
            "empty file segment in {url:?}"
        )));
    }
    BlobPath::in_dir(dir, file)
}
