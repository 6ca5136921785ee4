use std::fmt;

use itertools::Itertools;
use vec1::Vec1;

use crate::schema::{Hdf5Type, NodePath};

/// What is wrong with a container at some path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueKind {
    /// The schema declares the path, but the container doesn't have it.
    MissingPath,

    /// The container has a group where the schema wants a dataset, or vice
    /// versa.
    WrongHdf5Type { expected: Hdf5Type, found: Hdf5Type },

    /// The dataset's rank isn't the number of dims the schema gives it.
    RankMismatch { expected: usize, found: usize },

    /// Datasets sharing a dimension name disagree on its extent. `observed`
    /// has every (dataset, extent) pair for the dimension.
    DimensionExtentMismatch {
        dimension: String,
        observed: Vec1<(NodePath, usize)>,
    },
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueKind::MissingPath => write!(f, "missing"),
            IssueKind::WrongHdf5Type { expected, found } => {
                write!(f, "expected a {expected}, found a {found}")
            }
            IssueKind::RankMismatch { expected, found } => {
                write!(f, "expected rank {expected}, found rank {found}")
            }
            IssueKind::DimensionExtentMismatch {
                dimension,
                observed,
            } => write!(
                f,
                "dimension '{dimension}' has inconsistent extents: {}",
                observed
                    .iter()
                    .map(|(path, extent)| format!("{path} = {extent}"))
                    .join(", ")
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub path: NodePath,
    pub kind: IssueKind,
}

impl Issue {
    pub fn new(path: NodePath, kind: IssueKind) -> Issue {
        Issue { path, kind }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.kind)
    }
}

/// The result of validating one container. An empty report means the
/// container is valid.
#[derive(Debug, Clone)]
pub struct ValidationReport {
    class_name: Option<String>,
    issues: Vec<Issue>,

    /// The extent of every dimension whose datasets agree, in order of first
    /// use.
    extents: Vec<(String, usize)>,
}

impl ValidationReport {
    pub(crate) fn new(
        class_name: Option<String>,
        issues: Vec<Issue>,
        extents: Vec<(String, usize)>,
    ) -> ValidationReport {
        ValidationReport {
            class_name,
            issues,
            extents,
        }
    }

    /// The class name of the schema the container was checked against.
    pub fn class_name(&self) -> Option<&str> {
        self.class_name.as_deref()
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// How many issues satisfy `pred`, e.g.
    /// `report.count(|k| matches!(k, IssueKind::MissingPath))`.
    pub fn count<F: Fn(&IssueKind) -> bool>(&self, pred: F) -> usize {
        self.issues.iter().filter(|i| pred(&i.kind)).count()
    }

    /// The extent of a dimension, if every dataset using it agrees.
    pub fn dimension_extent(&self, dimension: &str) -> Option<usize> {
        self.extents
            .iter()
            .find(|(d, _)| d == dimension)
            .map(|(_, e)| *e)
    }

    pub fn extents(&self) -> &[(String, usize)] {
        &self.extents
    }
}

impl<'a> IntoIterator for &'a ValidationReport {
    type Item = &'a Issue;
    type IntoIter = std::slice::Iter<'a, Issue>;

    fn into_iter(self) -> Self::IntoIter {
        self.issues.iter()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let class_name = self.class_name().unwrap_or("<unnamed schema>");
        if self.is_valid() {
            writeln!(f, "Valid {class_name}")?;
        } else {
            writeln!(f, "Invalid {class_name}: {} issue(s)", self.len())?;
            for issue in &self.issues {
                writeln!(f, "  {issue}")?;
            }
        }
        if !self.extents.is_empty() {
            writeln!(
                f,
                "Dimensions: {}",
                self.extents
                    .iter()
                    .map(|(d, e)| format!("{d}={e}"))
                    .join(", ")
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(s: &str) -> NodePath {
        NodePath::new(s).unwrap()
    }

    #[test]
    fn test_display() {
        let report = ValidationReport::new(
            Some("AA_UV".to_string()),
            vec![
                Issue::new(path("uvx/antennas/enu"), IssueKind::MissingPath),
                Issue::new(
                    path("uvx/antennas/ecef"),
                    IssueKind::DimensionExtentMismatch {
                        dimension: "antenna".to_string(),
                        observed: vec1::vec1![
                            (path("uvx/antennas/ecef"), 256),
                            (path("uvx/antennas/attrs/identifier"), 255)
                        ],
                    },
                ),
            ],
            vec![("spatial".to_string(), 3)],
        );

        let s = report.to_string();
        assert!(s.starts_with("Invalid AA_UV: 2 issue(s)\n"), "{s}");
        assert!(s.contains("  uvx/antennas/enu: missing\n"), "{s}");
        assert!(s.contains("uvx/antennas/ecef = 256, uvx/antennas/attrs/identifier = 255"), "{s}");
        assert!(s.ends_with("Dimensions: spatial=3\n"), "{s}");
        assert_eq!(report.count(|k| matches!(k, IssueKind::MissingPath)), 1);
    }

    #[test]
    fn test_valid_display() {
        let report = ValidationReport::new(None, vec![], vec![]);
        assert_eq!(report.to_string(), "Valid <unnamed schema>\n");
        assert!(report.is_valid());
    }
}
