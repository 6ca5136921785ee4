//! Declarative schema documents describing a hierarchical (HDF5) file layout.
//!
//! A schema is a mapping of node paths to node descriptors, e.g.
//!
//! ```yaml
//! uvx:
//!   description: Root of an AA_UV file.
//!   hdf5_type: root
//!   class_name: AA_UV
//!   version: "0.1.0"
//! uvx/antennas:
//!   hdf5_type: group
//! uvx/antennas/ecef:
//!   hdf5_type: dataset
//!   dims: [antenna, spatial]
//!   units: m
//! ```

mod error;
mod node;
mod path;

pub use error::{SchemaParseError, UnknownPathError};
pub use node::{DatasetNode, Format, GroupNode, Hdf5Type, NodeDescriptor, RootNode};
pub use path::NodePath;

use std::{collections::HashMap, path::Path};

use itertools::Itertools;
use log::{debug, trace};
use serde_yaml::{Mapping, Value};

const KNOWN_KEYS: [&str; 7] = [
    "description",
    "hdf5_type",
    "dims",
    "units",
    "format",
    "class_name",
    "version",
];

/// A loaded schema. Immutable once constructed.
#[derive(Debug, Clone)]
pub struct SchemaDocument {
    /// All nodes, in the order they were declared.
    nodes: Vec<(NodePath, NodeDescriptor)>,

    /// Node path to index into `nodes`.
    index: HashMap<NodePath, usize>,

    /// Indices of the direct children of each group-like node, in declaration
    /// order. Nodes without children have no entry.
    children: HashMap<NodePath, Vec<usize>>,

    /// Indices of nodes whose parent is the document root.
    top_level: Vec<usize>,

    /// Index of the root node, if one is declared.
    root: Option<usize>,
}

impl SchemaDocument {
    /// Parse schema text.
    pub fn from_yaml(text: &str) -> Result<SchemaDocument, SchemaParseError> {
        let value: Value = serde_yaml::from_str(text)?;
        match value {
            Value::Mapping(mapping) => SchemaDocument::from_mapping(&mapping),
            _ => Err(SchemaParseError::NotAMapping),
        }
    }

    /// Read schema text from a file.
    pub fn from_file<P: AsRef<Path>>(file: P) -> Result<SchemaDocument, crate::Error> {
        let file = file.as_ref();
        debug!("Reading schema {}", file.display());
        let text = std::fs::read_to_string(file).map_err(|e| crate::Error::Io {
            file: file.to_path_buf(),
            source: e,
        })?;
        Ok(SchemaDocument::from_yaml(&text)?)
    }

    /// Build a schema from an already-parsed mapping of node paths to
    /// descriptors. The mapping's order is the declaration order.
    pub fn from_mapping(mapping: &Mapping) -> Result<SchemaDocument, SchemaParseError> {
        let mut nodes = Vec::with_capacity(mapping.len());
        let mut index = HashMap::with_capacity(mapping.len());
        for (key, value) in mapping {
            let key = match key {
                Value::String(s) => s,
                other => return Err(SchemaParseError::NonStringKey(render(other))),
            };
            let path = NodePath::new(key)?;
            let descriptor = parse_descriptor(&path, value)?;
            trace!("{path}: {}", descriptor.hdf5_type());

            if index.insert(path.clone(), nodes.len()).is_some() {
                return Err(SchemaParseError::DuplicatePath(path.to_string()));
            }
            nodes.push((path, descriptor));
        }

        // Every path is known now, so parents can be resolved regardless of
        // where in the document they were declared.
        let mut children: HashMap<NodePath, Vec<usize>> = HashMap::new();
        let mut top_level = vec![];
        let mut root: Option<usize> = None;
        for (i, (path, descriptor)) in nodes.iter().enumerate() {
            if descriptor.hdf5_type() == Hdf5Type::Root {
                if path.depth() != 1 {
                    return Err(SchemaParseError::RootNotTopLevel(path.to_string()));
                }
                if let Some(first) = root {
                    return Err(SchemaParseError::MultipleRoots {
                        first: nodes[first].0.to_string(),
                        second: path.to_string(),
                    });
                }
                root = Some(i);
            }

            match path.parent() {
                None => top_level.push(i),
                Some(parent) => {
                    let parent_index = match index.get(&parent) {
                        Some(&p) => p,
                        None => {
                            return Err(SchemaParseError::UndeclaredParent {
                                path: path.to_string(),
                                parent: parent.to_string(),
                            })
                        }
                    };
                    if !nodes[parent_index].1.hdf5_type().is_group_like() {
                        return Err(SchemaParseError::ParentNotAGroup {
                            path: path.to_string(),
                            parent: parent.to_string(),
                        });
                    }
                    children.entry(parent).or_default().push(i);
                }
            }
        }

        let doc = SchemaDocument {
            nodes,
            index,
            children,
            top_level,
            root,
        };
        debug!(
            "Loaded schema {} ({} nodes, {} datasets)",
            doc.class_name().unwrap_or("<unnamed>"),
            doc.len(),
            doc.datasets().count()
        );
        Ok(doc)
    }

    /// The class identifier declared on the root node, e.g. "AA_UV".
    pub fn class_name(&self) -> Option<&str> {
        self.root_descriptor()?.class_name.as_deref()
    }

    /// The schema version declared on the root node.
    pub fn version(&self) -> Option<&str> {
        self.root_descriptor()?.version.as_deref()
    }

    /// The path of the root node, if the schema declares one.
    pub fn root(&self) -> Option<&NodePath> {
        self.root.map(|i| &self.nodes[i].0)
    }

    fn root_descriptor(&self) -> Option<&RootNode> {
        match &self.nodes[self.root?].1 {
            NodeDescriptor::Root(r) => Some(r),
            NodeDescriptor::Group(_) | NodeDescriptor::Dataset(_) => None,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains<P: AsRef<str>>(&self, path: P) -> bool {
        self.lookup(path.as_ref()).is_ok()
    }

    /// Look up the descriptor of a node.
    pub fn describe<P: AsRef<str>>(&self, path: P) -> Result<&NodeDescriptor, UnknownPathError> {
        let i = self.lookup(path.as_ref())?;
        Ok(&self.nodes[i].1)
    }

    /// The direct children of a node, in declaration order.
    pub fn list_children<P: AsRef<str>>(&self, path: P) -> Result<Vec<&NodePath>, UnknownPathError> {
        let i = self.lookup(path.as_ref())?;
        let path = &self.nodes[i].0;
        Ok(self
            .children
            .get(path)
            .map(|c| c.iter().map(|&i| &self.nodes[i].0).collect())
            .unwrap_or_default())
    }

    /// The nodes whose parent is the document root, in declaration order.
    pub fn top_level(&self) -> impl Iterator<Item = &NodePath> {
        self.top_level.iter().map(|&i| &self.nodes[i].0)
    }

    /// All nodes in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&NodePath, &NodeDescriptor)> {
        self.nodes.iter().map(|(p, d)| (p, d))
    }

    pub fn datasets(&self) -> impl Iterator<Item = (&NodePath, &DatasetNode)> {
        self.nodes.iter().filter_map(|(p, d)| d.as_dataset().map(|d| (p, d)))
    }

    /// Every dimension name used by a dataset, in order of first use.
    pub fn dimension_names(&self) -> Vec<&str> {
        self.datasets()
            .flat_map(|(_, d)| d.dims.iter().map(|s| s.as_str()))
            .unique()
            .collect()
    }

    fn lookup(&self, path: &str) -> Result<usize, UnknownPathError> {
        NodePath::new(path)
            .ok()
            .and_then(|p| self.index.get(&p).copied())
            .ok_or_else(|| UnknownPathError(path.to_string()))
    }
}

fn parse_descriptor(path: &NodePath, value: &Value) -> Result<NodeDescriptor, SchemaParseError> {
    let fields = value
        .as_mapping()
        .ok_or_else(|| SchemaParseError::DescriptorNotAMapping(path.to_string()))?;

    let hdf5_type = match fields.get("hdf5_type") {
        None | Some(Value::Null) => {
            return Err(SchemaParseError::MissingHdf5Type(path.to_string()))
        }
        Some(Value::String(s)) => {
            s.parse::<Hdf5Type>()
                .map_err(|()| SchemaParseError::UnknownHdf5Type {
                    path: path.to_string(),
                    value: s.clone(),
                })?
        }
        Some(other) => {
            return Err(SchemaParseError::UnknownHdf5Type {
                path: path.to_string(),
                value: render(other),
            })
        }
    };

    for key in fields.keys() {
        let known = key
            .as_str()
            .map(|k| KNOWN_KEYS.contains(&k))
            .unwrap_or(false);
        if !known {
            debug!("Ignoring unrecognised key {} on node '{path}'", render(key));
        }
    }

    let description = string_field(path, fields, "description")?;
    let dims = fields.get("dims");
    let descriptor = match hdf5_type {
        Hdf5Type::Root => {
            reject_dims(path, dims)?;
            NodeDescriptor::Root(RootNode {
                description,
                class_name: string_field(path, fields, "class_name")?,
                version: string_field(path, fields, "version")?,
            })
        }

        Hdf5Type::Group => {
            reject_dims(path, dims)?;
            NodeDescriptor::Group(GroupNode { description })
        }

        Hdf5Type::Dataset => NodeDescriptor::Dataset(DatasetNode {
            description,
            dims: parse_dims(path, dims)?,
            units: string_field(path, fields, "units")?,
            format: string_field(path, fields, "format")?.map(|f| Format::from(f.as_str())),
        }),
    };
    Ok(descriptor)
}

fn string_field(
    path: &NodePath,
    fields: &Mapping,
    field: &'static str,
) -> Result<Option<String>, SchemaParseError> {
    match fields.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(SchemaParseError::InvalidField {
            path: path.to_string(),
            field,
        }),
    }
}

fn parse_dims(path: &NodePath, dims: Option<&Value>) -> Result<Vec<String>, SchemaParseError> {
    match dims {
        None | Some(Value::Null) => Ok(vec![]),
        Some(Value::Sequence(seq)) => seq
            .iter()
            .map(|d| match d {
                Value::String(s) => Ok(s.clone()),
                _ => Err(SchemaParseError::InvalidDims(path.to_string())),
            })
            .collect(),
        Some(_) => Err(SchemaParseError::InvalidDims(path.to_string())),
    }
}

fn reject_dims(path: &NodePath, dims: Option<&Value>) -> Result<(), SchemaParseError> {
    match dims {
        None | Some(Value::Null) => Ok(()),
        Some(Value::Sequence(seq)) if seq.is_empty() => Ok(()),
        Some(_) => Err(SchemaParseError::DimsOnGroup(path.to_string())),
    }
}

/// A short rendering of a YAML value for error messages.
fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_else(|_| format!("{other:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
uvx:
  description: Root
  hdf5_type: root
  class_name: AA_UV
  version: "0.1.0"
uvx/antennas:
  description: Antenna array spatial coordinate details.
  hdf5_type: group
uvx/antennas/attrs:
  hdf5_type: group
uvx/antennas/attrs/identifier:
  description: Antenna name / identifier
  hdf5_type: dataset
  dims: [antenna]
uvx/antennas/coords:
  hdf5_type: group
uvx/antennas/ecef:
  description: Antenna positions, geocentric
  hdf5_type: dataset
  dims: [antenna, spatial]
  units: m
uvx/antennas/enu:
  hdf5_type: dataset
  dims: [antenna, spatial]
  units: m
uvx/time:
  hdf5_type: dataset
  dims: [time]
  format: mjd
"#;

    fn sample() -> SchemaDocument {
        SchemaDocument::from_yaml(SAMPLE).unwrap()
    }

    #[test]
    fn test_document_attributes() {
        let doc = sample();
        assert_eq!(doc.class_name(), Some("AA_UV"));
        assert_eq!(doc.version(), Some("0.1.0"));
        assert_eq!(doc.root().map(|p| p.as_str()), Some("uvx"));
        assert_eq!(doc.len(), 8);
        assert_eq!(doc.top_level().count(), 1);
    }

    #[test]
    fn test_describe() {
        let doc = sample();
        let ecef = doc.describe("uvx/antennas/ecef").unwrap();
        assert_eq!(ecef.hdf5_type(), Hdf5Type::Dataset);
        assert_eq!(ecef.dims(), ["antenna", "spatial"]);
        assert_eq!(ecef.units(), Some("m"));
        assert_eq!(ecef.description(), Some("Antenna positions, geocentric"));

        // Dotted lookups resolve to the same node.
        assert_eq!(doc.describe("uvx.antennas.ecef").unwrap(), ecef);

        let time = doc.describe("uvx/time").unwrap();
        assert_eq!(time.format(), Some(&Format::Mjd));

        let group = doc.describe("uvx/antennas/coords").unwrap();
        assert_eq!(group.hdf5_type(), Hdf5Type::Group);
        assert!(group.dims().is_empty());
        assert!(group.description().is_none());
    }

    #[test]
    fn test_unknown_path() {
        let doc = sample();
        assert_eq!(
            doc.describe("uvx/antennas/xyz").unwrap_err(),
            UnknownPathError("uvx/antennas/xyz".to_string())
        );
        assert!(doc.list_children("nope").is_err());
        assert!(doc.describe("").is_err());
    }

    #[test]
    fn test_list_children_declaration_order() {
        let doc = sample();
        let names: Vec<&str> = doc
            .list_children("uvx/antennas")
            .unwrap()
            .into_iter()
            .map(|p| p.name())
            .collect();
        assert_eq!(names, ["attrs", "coords", "ecef", "enu"]);
        assert!(doc.list_children("uvx/antennas/ecef").unwrap().is_empty());
    }

    #[test]
    fn test_dimension_names() {
        assert_eq!(sample().dimension_names(), ["antenna", "spatial", "time"]);
    }

    #[test]
    fn test_parent_declared_after_child() {
        let doc = SchemaDocument::from_yaml(
            "a/b:\n  hdf5_type: dataset\na:\n  hdf5_type: group\n",
        )
        .unwrap();
        assert_eq!(doc.list_children("a").unwrap().len(), 1);
    }

    fn parse_err(text: &str) -> SchemaParseError {
        match SchemaDocument::from_yaml(text) {
            Ok(_) => panic!("expected {text:?} to fail"),
            Err(e) => e,
        }
    }

    #[test]
    fn test_parse_failures() {
        use SchemaParseError::*;

        assert!(matches!(parse_err("- a\n- b\n"), NotAMapping));
        assert!(matches!(parse_err("a: [unclosed\n"), Yaml(_)));
        assert!(matches!(parse_err("1: {hdf5_type: group}\n"), NonStringKey(_)));
        assert!(matches!(parse_err("a: hello\n"), DescriptorNotAMapping(_)));
        assert!(matches!(parse_err("a: {description: x}\n"), MissingHdf5Type(_)));
        assert!(matches!(
            parse_err("a: {hdf5_type: attribute}\n"),
            UnknownHdf5Type { .. }
        ));
        assert!(matches!(
            parse_err("a: {hdf5_type: 3}\n"),
            UnknownHdf5Type { .. }
        ));
        assert!(matches!(
            parse_err("a/b: {hdf5_type: dataset}\n"),
            UndeclaredParent { .. }
        ));
        assert!(matches!(
            parse_err("a: {hdf5_type: dataset}\na/b: {hdf5_type: dataset}\n"),
            ParentNotAGroup { .. }
        ));
        assert!(matches!(
            parse_err("a: {hdf5_type: dataset, dims: antenna}\n"),
            InvalidDims(_)
        ));
        assert!(matches!(
            parse_err("a: {hdf5_type: dataset, dims: [antenna, 3]}\n"),
            InvalidDims(_)
        ));
        assert!(matches!(
            parse_err("a: {hdf5_type: group, dims: [antenna]}\n"),
            DimsOnGroup(_)
        ));
        assert!(matches!(
            parse_err("a: {hdf5_type: group}\na/b: {hdf5_type: root}\n"),
            RootNotTopLevel(_)
        ));
        assert!(matches!(
            parse_err("a: {hdf5_type: root}\nb: {hdf5_type: root}\n"),
            MultipleRoots { .. }
        ));
        assert!(matches!(
            parse_err("a: {hdf5_type: group}\na.b: {hdf5_type: group}\na/b: {hdf5_type: group}\n"),
            DuplicatePath(_)
        ));
        assert!(matches!(
            parse_err("a: {hdf5_type: dataset, units: [m]}\n"),
            InvalidField { field: "units", .. }
        ));
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let doc = SchemaDocument::from_yaml("a: {hdf5_type: dataset, chunks: [64]}\n").unwrap();
        assert!(doc.describe("a").unwrap().dims().is_empty());
    }

    #[test]
    fn test_empty_document() {
        let doc = SchemaDocument::from_yaml("{}").unwrap();
        assert!(doc.is_empty());
        assert!(doc.class_name().is_none());
        assert!(doc.root().is_none());
    }

    #[test]
    fn test_schema_is_shareable_between_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SchemaDocument>();
    }
}
