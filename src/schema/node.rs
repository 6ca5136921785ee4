use std::{fmt, str::FromStr};

use hifitime::Epoch;

/// The HDF5 object kind a schema node describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hdf5Type {
    Root,
    Group,
    Dataset,
}

impl Hdf5Type {
    pub fn as_str(self) -> &'static str {
        match self {
            Hdf5Type::Root => "root",
            Hdf5Type::Group => "group",
            Hdf5Type::Dataset => "dataset",
        }
    }

    /// Can this kind of node have children?
    pub fn is_group_like(self) -> bool {
        matches!(self, Hdf5Type::Root | Hdf5Type::Group)
    }
}

impl fmt::Display for Hdf5Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Hdf5Type {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "root" => Ok(Hdf5Type::Root),
            "group" => Ok(Hdf5Type::Group),
            "dataset" => Ok(Hdf5Type::Dataset),
            _ => Err(()),
        }
    }
}

/// The encoding convention of a dataset's values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Format {
    /// Modified Julian Date \[days\].
    Mjd,
    /// Seconds since 1970-01-01 00:00:00 UTC.
    Unix,
    Other(String),
}

impl Format {
    pub fn as_str(&self) -> &str {
        match self {
            Format::Mjd => "mjd",
            Format::Unix => "unix",
            Format::Other(s) => s,
        }
    }

    /// Interpret a single sample of a dataset with this format as a UTC
    /// [Epoch]. Only time encodings decode.
    pub fn decode(&self, value: f64) -> Option<Epoch> {
        if !value.is_finite() {
            return None;
        }
        match self {
            Format::Mjd => Some(Epoch::from_mjd_utc(value)),
            Format::Unix => Some(Epoch::from_unix_seconds(value)),
            Format::Other(_) => None,
        }
    }
}

impl From<&str> for Format {
    fn from(s: &str) -> Self {
        match s {
            "mjd" => Format::Mjd,
            "unix" => Format::Unix,
            other => Format::Other(other.to_string()),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootNode {
    pub description: Option<String>,

    /// The file class identifier, e.g. "AA_UV".
    pub class_name: Option<String>,

    /// The schema version string.
    pub version: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupNode {
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetNode {
    pub description: Option<String>,

    /// The names of each axis, in axis order. Empty for a scalar.
    pub dims: Vec<String>,

    pub units: Option<String>,

    pub format: Option<Format>,
}

/// Everything the schema says about one node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeDescriptor {
    Root(RootNode),
    Group(GroupNode),
    Dataset(DatasetNode),
}

impl NodeDescriptor {
    pub fn hdf5_type(&self) -> Hdf5Type {
        match self {
            NodeDescriptor::Root(_) => Hdf5Type::Root,
            NodeDescriptor::Group(_) => Hdf5Type::Group,
            NodeDescriptor::Dataset(_) => Hdf5Type::Dataset,
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            NodeDescriptor::Root(RootNode { description, .. })
            | NodeDescriptor::Group(GroupNode { description })
            | NodeDescriptor::Dataset(DatasetNode { description, .. }) => description.as_deref(),
        }
    }

    pub fn dims(&self) -> &[String] {
        match self {
            NodeDescriptor::Dataset(d) => &d.dims,
            NodeDescriptor::Root(_) | NodeDescriptor::Group(_) => &[],
        }
    }

    pub fn units(&self) -> Option<&str> {
        match self {
            NodeDescriptor::Dataset(d) => d.units.as_deref(),
            NodeDescriptor::Root(_) | NodeDescriptor::Group(_) => None,
        }
    }

    pub fn format(&self) -> Option<&Format> {
        match self {
            NodeDescriptor::Dataset(d) => d.format.as_ref(),
            NodeDescriptor::Root(_) | NodeDescriptor::Group(_) => None,
        }
    }

    pub fn as_dataset(&self) -> Option<&DatasetNode> {
        match self {
            NodeDescriptor::Dataset(d) => Some(d),
            NodeDescriptor::Root(_) | NodeDescriptor::Group(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hdf5_type_strings() {
        for t in [Hdf5Type::Root, Hdf5Type::Group, Hdf5Type::Dataset] {
            assert_eq!(t.as_str().parse::<Hdf5Type>(), Ok(t));
        }
        assert!("Group".parse::<Hdf5Type>().is_err());
        assert!("attribute".parse::<Hdf5Type>().is_err());
    }

    #[test]
    fn test_format_decode() {
        // 2000-01-01 12:00:00 UTC
        let from_unix = Format::Unix.decode(946_728_000.0).unwrap();
        let from_mjd = Format::Mjd.decode(51_544.5).unwrap();
        let diff = (from_unix - from_mjd).to_seconds().abs();
        assert!(diff < 1e-3, "{diff}");

        assert!(Format::from("iso").decode(1.0).is_none());
        assert!(Format::Unix.decode(f64::NAN).is_none());
    }

    #[test]
    fn test_format_keeps_source_spelling() {
        assert_eq!(Format::from("mjd"), Format::Mjd);
        assert_eq!(Format::from("MJD"), Format::Other("MJD".to_string()));
        assert_eq!(Format::from("MJD").as_str(), "MJD");
    }
}
