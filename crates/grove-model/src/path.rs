//! Absolute content paths
//!
//! Provides [`NodePath`] for addressing nodes within the content hierarchy.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Absolute slash-separated path into the content tree
///
/// The root is `/`; every other path is the root plus one segment per
/// hierarchy level.
///
/// # Examples
/// - `["site", "press", "article"]` → `/site/press/article`
/// - `[]` → `/`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodePath(Vec<String>);

impl NodePath {
    /// Create a path from segments
    ///
    /// # Errors
    /// Returns an error if any segment is empty or contains `/`.
    pub fn new(segments: Vec<String>) -> Result<Self, PathError> {
        for seg in &segments {
            validate_segment(seg)?;
        }
        Ok(Self(segments))
    }

    /// The root path `/`
    #[inline]
    #[must_use]
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Path segments, root first
    #[inline]
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Number of segments (0 for the root)
    #[inline]
    #[must_use]
    pub fn depth(&self) -> usize {
        self.0.len()
    }

    /// Check if this is the root path
    #[inline]
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Final segment, i.e. the node name (None for the root)
    #[inline]
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    /// Parent path (None for the root)
    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.0.is_empty() {
            None
        } else {
            Some(Self(self.0[..self.0.len() - 1].to_vec()))
        }
    }

    /// Append a segment, returning the child path
    ///
    /// # Errors
    /// Returns an error if the segment is empty or contains `/`.
    pub fn child(&self, segment: impl Into<String>) -> Result<Self, PathError> {
        let segment = segment.into();
        validate_segment(&segment)?;
        let mut new = self.clone();
        new.0.push(segment);
        Ok(new)
    }

    /// Check if this path is a strict ancestor of another
    #[inline]
    #[must_use]
    pub fn is_ancestor_of(&self, other: &Self) -> bool {
        self.0.len() < other.0.len() && self.0 == other.0[..self.0.len()]
    }

    /// Check if this path equals or is an ancestor of another
    #[inline]
    #[must_use]
    pub fn contains(&self, other: &Self) -> bool {
        self.0.len() <= other.0.len() && self.0 == other.0[..self.0.len()]
    }

    /// Iterator over ancestor paths from self up to the root, self first
    pub fn ancestors_and_self(&self) -> impl Iterator<Item = NodePath> + '_ {
        (0..=self.0.len())
            .rev()
            .map(move |n| Self(self.0[..n].to_vec()))
    }
}

fn validate_segment(segment: &str) -> Result<(), PathError> {
    if segment.is_empty() {
        return Err(PathError::EmptySegment);
    }
    if segment.contains('/') {
        return Err(PathError::InvalidSegment(segment.to_string()));
    }
    Ok(())
}

impl Display for NodePath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            write!(f, "/")
        } else {
            for seg in &self.0 {
                write!(f, "/{seg}")?;
            }
            Ok(())
        }
    }
}

impl FromStr for NodePath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "/" {
            return Ok(Self::root());
        }
        let Some(rest) = s.strip_prefix('/') else {
            return Err(PathError::NotAbsolute(s.to_string()));
        };
        let segments: Vec<String> = rest
            .split('/')
            .map(|seg| {
                validate_segment(seg)?;
                Ok(seg.to_string())
            })
            .collect::<Result<_, PathError>>()?;
        Ok(Self(segments))
    }
}

impl Default for NodePath {
    fn default() -> Self {
        Self::root()
    }
}

/// Errors related to content paths
#[derive(Debug, thiserror::Error)]
pub enum PathError {
    /// Path does not start with `/`
    #[error("path is not absolute: {0}")]
    NotAbsolute(String),

    /// Empty segment in path
    #[error("path contains empty segment")]
    EmptySegment,

    /// Segment contains illegal characters
    #[error("invalid segment: {0}")]
    InvalidSegment(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_displays_as_slash() {
        assert_eq!(NodePath::root().to_string(), "/");
        assert!(NodePath::root().is_root());
    }

    #[test]
    fn path_display_round_trip() {
        let path: NodePath = "/site/press/article".parse().unwrap();
        assert_eq!(path.segments(), &["site", "press", "article"]);
        assert_eq!(path.to_string(), "/site/press/article");
    }

    #[test]
    fn path_rejects_relative() {
        let result: Result<NodePath, _> = "site/press".parse();
        assert!(matches!(result, Err(PathError::NotAbsolute(_))));
    }

    #[test]
    fn path_rejects_empty_segment() {
        let result: Result<NodePath, _> = "/site//press".parse();
        assert!(matches!(result, Err(PathError::EmptySegment)));
    }

    #[test]
    fn path_name_and_parent() {
        let path: NodePath = "/site/press".parse().unwrap();
        assert_eq!(path.name(), Some("press"));
        assert_eq!(path.parent().unwrap().to_string(), "/site");
        assert!(NodePath::root().parent().is_none());
    }

    #[test]
    fn path_child() {
        let path = NodePath::root().child("site").unwrap().child("a b").unwrap();
        assert_eq!(path.to_string(), "/site/a b");
        assert!(path.parent().unwrap().child("x/y").is_err());
    }

    #[test]
    fn path_ancestry() {
        let a: NodePath = "/site".parse().unwrap();
        let b: NodePath = "/site/press".parse().unwrap();
        assert!(a.is_ancestor_of(&b));
        assert!(!b.is_ancestor_of(&a));
        assert!(!a.is_ancestor_of(&a));
        assert!(a.contains(&a));
        assert!(NodePath::root().is_ancestor_of(&a));
    }

    #[test]
    fn path_ancestors_and_self() {
        let path: NodePath = "/a/b/c".parse().unwrap();
        let all: Vec<String> = path.ancestors_and_self().map(|p| p.to_string()).collect();
        assert_eq!(all, vec!["/a/b/c", "/a/b", "/a", "/"]);
    }
}
