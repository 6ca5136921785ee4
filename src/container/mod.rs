//! The structural view of a hierarchical array store (e.g. an HDF5 file) that
//! schemas are validated against. Only structure is represented here, never
//! data values.

mod dtype;
pub mod manifest;

pub use dtype::{Dtype, Element};

use std::collections::BTreeMap;

use log::trace;
use ndarray::{ArrayBase, Data, Dimension};
use thiserror::Error;

use crate::schema::{NodePath, SchemaParseError};

#[derive(Error, Debug)]
pub enum ContainerError {
    #[error(transparent)]
    BadPath(#[from] SchemaParseError),

    #[error("Can't put '{path}' inside '{parent}'; '{parent}' is a dataset")]
    NotAGroup { path: String, parent: String },

    #[error("'{0}' is a group; it can't be replaced by a dataset")]
    GroupExists(String),

    #[error("'{0}' is a dataset; it can't be replaced by a group")]
    DatasetExists(String),

    #[error("Unknown dtype '{0}'")]
    UnknownDtype(String),

    #[error("Couldn't parse container manifest: {0}")]
    Manifest(#[from] serde_yaml::Error),
}

/// The shape and element type of a dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetInfo {
    pub shape: Vec<usize>,
    pub dtype: Dtype,
}

impl DatasetInfo {
    pub fn new(shape: Vec<usize>, dtype: Dtype) -> DatasetInfo {
        DatasetInfo { shape, dtype }
    }

    pub fn rank(&self) -> usize {
        self.shape.len()
    }
}

/// What lives at a path in a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entry<'a> {
    Group,
    Dataset(&'a DatasetInfo),
}

/// Structural read access to a hierarchical container. Implementors wrap an
/// HDF5 (or equivalent) reader; [Container] is the in-memory implementation.
pub trait ContainerRead: Sync {
    fn entry(&self, path: &NodePath) -> Option<Entry<'_>>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ContainerNode {
    Group,
    Dataset(DatasetInfo),
}

/// An in-memory container structure. The document root always exists and is
/// not addressable; every other node has a path.
#[derive(Debug, Clone, Default)]
pub struct Container {
    nodes: BTreeMap<NodePath, ContainerNode>,
}

impl Container {
    pub fn new() -> Container {
        Container::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All paths in the container, sorted.
    pub fn paths(&self) -> impl Iterator<Item = &NodePath> {
        self.nodes.keys()
    }

    /// Add a group. Adding a group that already exists does nothing.
    pub fn insert_group(&mut self, path: &str) -> Result<(), ContainerError> {
        let path = NodePath::new(path)?;
        self.ensure_parents(&path)?;
        match self.nodes.get(&path) {
            Some(ContainerNode::Group) => Ok(()),
            Some(ContainerNode::Dataset(_)) => Err(ContainerError::DatasetExists(path.to_string())),
            None => {
                trace!("Adding group {path}");
                self.nodes.insert(path, ContainerNode::Group);
                Ok(())
            }
        }
    }

    /// Add (or replace) a dataset.
    pub fn insert_dataset(&mut self, path: &str, info: DatasetInfo) -> Result<(), ContainerError> {
        let path = NodePath::new(path)?;
        self.ensure_parents(&path)?;
        if let Some(ContainerNode::Group) = self.nodes.get(&path) {
            return Err(ContainerError::GroupExists(path.to_string()));
        }
        trace!("Adding dataset {path} {:?} {}", info.shape, info.dtype);
        self.nodes.insert(path, ContainerNode::Dataset(info));
        Ok(())
    }

    /// Add a dataset described by an array; only its shape and element type
    /// are kept.
    pub fn insert_array<A, S, D>(
        &mut self,
        path: &str,
        array: &ArrayBase<S, D>,
    ) -> Result<(), ContainerError>
    where
        A: Element,
        S: Data<Elem = A>,
        D: Dimension,
    {
        self.insert_dataset(path, DatasetInfo::new(array.shape().to_vec(), A::DTYPE))
    }

    /// Remove a node and everything beneath it. Returns whether anything was
    /// removed.
    pub fn remove(&mut self, path: &str) -> bool {
        let path = match NodePath::new(path) {
            Ok(p) => p,
            Err(_) => return false,
        };
        let before = self.nodes.len();
        self.nodes
            .retain(|p, _| p != &path && !p.is_descendant_of(&path));
        self.nodes.len() != before
    }

    pub fn dataset(&self, path: &str) -> Option<&DatasetInfo> {
        let path = NodePath::new(path).ok()?;
        match self.nodes.get(&path)? {
            ContainerNode::Dataset(info) => Some(info),
            ContainerNode::Group => None,
        }
    }

    /// Create any missing ancestors of `path` as groups.
    fn ensure_parents(&mut self, path: &NodePath) -> Result<(), ContainerError> {
        let mut ancestors = vec![];
        let mut current = path.parent();
        while let Some(p) = current {
            current = p.parent();
            ancestors.push(p);
        }

        // Check everything before inserting anything, so a failure leaves the
        // container untouched.
        let mut missing = vec![];
        for ancestor in ancestors.into_iter().rev() {
            match self.nodes.get(&ancestor) {
                Some(ContainerNode::Group) => (),
                Some(ContainerNode::Dataset(_)) => {
                    return Err(ContainerError::NotAGroup {
                        path: path.to_string(),
                        parent: ancestor.to_string(),
                    })
                }
                None => missing.push(ancestor),
            }
        }
        for ancestor in missing {
            trace!("Adding intermediate group {ancestor}");
            self.nodes.insert(ancestor, ContainerNode::Group);
        }
        Ok(())
    }
}

impl ContainerRead for Container {
    fn entry(&self, path: &NodePath) -> Option<Entry<'_>> {
        match self.nodes.get(path)? {
            ContainerNode::Group => Some(Entry::Group),
            ContainerNode::Dataset(info) => Some(Entry::Dataset(info)),
        }
    }
}
