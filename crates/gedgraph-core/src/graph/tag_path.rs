use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{GedcomError, Result};

/// Segment meaning "stay on the current node"
pub const SELF: &str = ".";
/// Segment meaning "move to the parent node"
pub const PARENT: &str = "..";
/// Segment meaning "follow the resolved cross-reference"
pub const FOLLOW: &str = "*";

/// Colon-separated path of tags, e.g. `INDI:BIRT:DATE`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RawTagPath")]
pub struct TagPath {
    segments: Vec<String>,
}

/// Serialized form, checked by `from_segments` on the way in
#[derive(Deserialize)]
struct RawTagPath {
    segments: Vec<String>,
}

impl TryFrom<RawTagPath> for TagPath {
    type Error = GedcomError;

    fn try_from(raw: RawTagPath) -> Result<TagPath> {
        TagPath::from_segments(raw.segments)
    }
}

impl TagPath {
    /// Build a path from its segments
    ///
    /// # Errors
    ///
    /// Returns `InvalidTagPath` when there are no segments or a segment is
    /// empty or contains whitespace or a colon.
    pub fn from_segments<I, S>(segments: I) -> Result<TagPath>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        let malformed = segments.is_empty()
            || segments
                .iter()
                .any(|s| s.is_empty() || s.contains(':') || s.chars().any(char::is_whitespace));
        if malformed {
            return Err(GedcomError::InvalidTagPath {
                path: segments.join(":"),
            });
        }
        Ok(TagPath { segments })
    }

    /// Path with a single tag
    ///
    /// # Errors
    ///
    /// Returns `InvalidTagPath` for an empty or malformed tag.
    pub fn root(tag: &str) -> Result<TagPath> {
        Self::from_segments([tag])
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Always false; a path has at least one segment
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn first(&self) -> &str {
        self.segments.first().map_or("", String::as_str)
    }

    pub fn last(&self) -> &str {
        self.segments.last().map_or("", String::as_str)
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.segments.get(index).map(String::as_str)
    }

    /// This path extended by one tag
    ///
    /// # Errors
    ///
    /// Returns `InvalidTagPath` for a malformed tag.
    pub fn child(&self, tag: &str) -> Result<TagPath> {
        Self::from_segments(self.segments.iter().map(String::as_str).chain([tag]))
    }

    pub(crate) fn raw_root(tag: &str) -> TagPath {
        TagPath {
            segments: vec![tag.to_string()],
        }
    }

    /// Extend by a tag already known to be well formed
    pub(crate) fn join(&self, tag: &str) -> TagPath {
        let mut segments = self.segments.clone();
        segments.push(tag.to_string());
        TagPath { segments }
    }

    /// Path without its last segment; `None` for a root path
    pub fn parent(&self) -> Option<TagPath> {
        if self.segments.len() < 2 {
            return None;
        }
        Some(TagPath {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    /// Whether this path starts with all segments of `prefix`
    pub fn starts_with(&self, prefix: &TagPath) -> bool {
        self.segments.starts_with(&prefix.segments)
    }
}

impl FromStr for TagPath {
    type Err = GedcomError;

    fn from_str(s: &str) -> Result<Self> {
        TagPath::from_segments(s.trim().split(':'))
    }
}

impl fmt::Display for TagPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join(":"))
    }
}
