use std::fmt;

use super::error::MetadataError;

/// Characters that may not appear in a tree path segment.
const FORBIDDEN: [char; 6] = ['/', '.', '$', '#', '[', ']'];

/// Address of a node in the hierarchical metadata tree.
///
/// A path is a non-empty sequence of key segments, written with `/` as the
/// separator: `product_categories/general/1716891234567`. Segments may not
/// be empty or contain `/`, `.`, `$`, `#`, `[` or `]`.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct TreePath(Vec<String>);

impl TreePath {
    /// Parse a slash-separated path string.
    pub fn parse(path: &str) -> Result<Self, MetadataError> {
        if path.is_empty() {
            return Err(MetadataError::InvalidPath("path is empty".into()));
        }
        let segments = path
            .split('/')
            .map(validate_segment)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self(segments))
    }

    /// Build a path from individual segments.
    pub fn from_segments<I, S>(segments: I) -> Result<Self, MetadataError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let segments = segments
            .into_iter()
            .map(|s| validate_segment(s.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        if segments.is_empty() {
            return Err(MetadataError::InvalidPath("path is empty".into()));
        }
        Ok(Self(segments))
    }

    /// Extend the path with one more key segment.
    pub fn child(&self, key: &str) -> Result<Self, MetadataError> {
        let key = validate_segment(key)?;
        let mut segments = self.0.clone();
        segments.push(key);
        Ok(Self(segments))
    }

    /// The key segments in order from the root.
    pub fn segments(&self) -> &[String] {
        &self.0
    }
}

fn validate_segment(segment: &str) -> Result<String, MetadataError> {
    if segment.is_empty() {
        return Err(MetadataError::InvalidPath("empty path segment".into()));
    }
    if let Some(bad) = segment.chars().find(|c| FORBIDDEN.contains(c)) {
        return Err(MetadataError::InvalidPath(format!(
            "segment {segment:?} contains forbidden character {bad:?}"
        )));
    }
    Ok(segment.to_owned())
}

impl fmt::Debug for TreePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TreePath({})", self.0.join("/"))
    }
}

impl fmt::Display for TreePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("/"))
    }
}
