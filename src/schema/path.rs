use std::{borrow::Borrow, fmt, str::FromStr};

use super::SchemaParseError;

/// A hierarchical node path, e.g. `uvx/antennas/ecef`.
///
/// Both `/` and `.` are accepted as separators when parsing; the stored form
/// always uses `/`. A single leading `/` (as in an absolute HDF5 path) is
/// dropped.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodePath(String);

impl NodePath {
    pub fn new(path: &str) -> Result<NodePath, SchemaParseError> {
        let trimmed = path.strip_prefix('/').unwrap_or(path);
        if trimmed.is_empty() {
            return Err(SchemaParseError::InvalidPath(path.to_string()));
        }

        let mut normalised = String::with_capacity(trimmed.len());
        for (i, segment) in trimmed.split(['/', '.']).enumerate() {
            if segment.is_empty() || segment.trim() != segment {
                return Err(SchemaParseError::InvalidPath(path.to_string()));
            }
            if i > 0 {
                normalised.push('/');
            }
            normalised.push_str(segment);
        }

        Ok(NodePath(normalised))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The final segment of the path.
    pub fn name(&self) -> &str {
        match self.0.rsplit_once('/') {
            Some((_, name)) => name,
            None => &self.0,
        }
    }

    /// The path minus its final segment. `None` means the parent is the
    /// document root.
    pub fn parent(&self) -> Option<NodePath> {
        self.0
            .rsplit_once('/')
            .map(|(parent, _)| NodePath(parent.to_string()))
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/')
    }

    /// The number of segments; top-level nodes have depth 1.
    pub fn depth(&self) -> usize {
        self.segments().count()
    }

    pub fn join(&self, name: &str) -> Result<NodePath, SchemaParseError> {
        NodePath::new(&format!("{}/{name}", self.0))
    }

    /// Is `self` a strict descendant of `other`?
    pub fn is_descendant_of(&self, other: &NodePath) -> bool {
        self.0.len() > other.0.len()
            && self.0.starts_with(other.as_str())
            && self.0.as_bytes()[other.0.len()] == b'/'
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for NodePath {
    type Err = SchemaParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NodePath::new(s)
    }
}

impl TryFrom<&str> for NodePath {
    type Error = SchemaParseError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        NodePath::new(value)
    }
}

impl AsRef<str> for NodePath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for NodePath {
    fn borrow(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_separators_are_normalised() {
        let slash = NodePath::new("uvx/antennas/ecef").unwrap();
        let dot = NodePath::new("uvx.antennas.ecef").unwrap();
        let absolute = NodePath::new("/uvx/antennas/ecef").unwrap();
        assert_eq!(slash, dot);
        assert_eq!(slash, absolute);
        assert_eq!(slash.as_str(), "uvx/antennas/ecef");
    }

    #[test]
    fn test_parent_and_name() {
        let p = NodePath::new("uvx/antennas/ecef").unwrap();
        assert_eq!(p.name(), "ecef");
        assert_eq!(p.depth(), 3);
        let parent = p.parent().unwrap();
        assert_eq!(parent.as_str(), "uvx/antennas");
        assert_eq!(parent.parent().unwrap().as_str(), "uvx");
        assert!(parent.parent().unwrap().parent().is_none());
    }

    #[test]
    fn test_bad_paths() {
        for bad in ["", "/", "uvx//ecef", "uvx/", "uvx/ ecef", "a..b"] {
            assert!(
                matches!(NodePath::new(bad), Err(SchemaParseError::InvalidPath(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_descendants() {
        let antennas = NodePath::new("uvx/antennas").unwrap();
        let ecef = NodePath::new("uvx/antennas/ecef").unwrap();
        let similar = NodePath::new("uvx/antennas_extra").unwrap();
        assert!(ecef.is_descendant_of(&antennas));
        assert!(!antennas.is_descendant_of(&antennas));
        assert!(!similar.is_descendant_of(&antennas));
    }
}
