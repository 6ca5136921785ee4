//! Structure manifests: a YAML dump of a container's layout, as produced by an
//! HDF5 lister. Each key is a path; each value is either the string `group`
//! or a dataset's shape and dtype:
//!
//! ```yaml
//! uvx: group
//! uvx/antennas: group
//! uvx/antennas/ecef: {shape: [256, 3], dtype: float64}
//! uvx/antennas/attrs/identifier: {shape: [256], dtype: S8}
//! ```
//!
//! Groups implied by a dataset's path don't need to be listed.

use std::{collections::BTreeMap, path::Path};

use log::debug;
use serde::Deserialize;

use super::{Container, ContainerError, DatasetInfo, Dtype};

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
enum GroupTag {
    Group,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ManifestEntry {
    Group(GroupTag),
    Dataset {
        shape: Vec<usize>,
        dtype: String,
    },
}

impl Container {
    /// Build a container from manifest text.
    pub fn from_manifest_yaml(text: &str) -> Result<Container, ContainerError> {
        // Sorted keys mean groups are seen before anything inside them.
        let entries: BTreeMap<String, ManifestEntry> = serde_yaml::from_str(text)?;
        let mut container = Container::new();
        for (path, entry) in entries {
            match entry {
                ManifestEntry::Group(GroupTag::Group) => container.insert_group(&path)?,
                ManifestEntry::Dataset { shape, dtype } => {
                    let dtype: Dtype = dtype.parse()?;
                    container.insert_dataset(&path, DatasetInfo::new(shape, dtype))?
                }
            }
        }
        debug!("Read a container manifest with {} nodes", container.len());
        Ok(container)
    }

    /// Read a manifest file.
    pub fn from_manifest_file<P: AsRef<Path>>(file: P) -> Result<Container, crate::Error> {
        let file = file.as_ref();
        debug!("Reading container manifest {}", file.display());
        let text = std::fs::read_to_string(file).map_err(|e| crate::Error::Io {
            file: file.to_path_buf(),
            source: e,
        })?;
        Ok(Container::from_manifest_yaml(&text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{container::Entry, container::ContainerRead, schema::NodePath};

    #[test]
    fn test_read_manifest() {
        let c = Container::from_manifest_yaml(
            r#"
uvx: group
uvx/antennas/ecef: {shape: [256, 3], dtype: float64}
uvx/antennas/attrs/identifier:
  shape: [256]
  dtype: S8
uvx/phase_center/ra: {shape: [], dtype: float64}
"#,
        )
        .unwrap();

        let ecef = c.dataset("uvx/antennas/ecef").unwrap();
        assert_eq!(ecef.shape, [256, 3]);
        assert_eq!(ecef.dtype, Dtype::Float(64));
        assert_eq!(c.dataset("uvx/phase_center/ra").unwrap().rank(), 0);
        assert_eq!(
            c.entry(&NodePath::new("uvx/antennas/attrs").unwrap()),
            Some(Entry::Group)
        );
    }

    #[test]
    fn test_bad_manifests() {
        assert!(matches!(
            Container::from_manifest_yaml("a: {shape: [1], dtype: float63}\n"),
            Err(ContainerError::UnknownDtype(_))
        ));
        assert!(matches!(
            Container::from_manifest_yaml("a: dataset\n"),
            Err(ContainerError::Manifest(_))
        ));
        assert!(matches!(
            Container::from_manifest_yaml("a: {shape: [1], dtype: bool}\na/b: group\n"),
            Err(ContainerError::NotAGroup { .. })
        ));
    }
}
