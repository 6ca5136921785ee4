use thiserror::Error;

/// The schema text (or a key/value structure parsed from it) is malformed.
/// Nothing of a document that fails to parse is usable.
#[derive(Error, Debug)]
pub enum SchemaParseError {
    #[error("Couldn't parse schema text as YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("The schema document must be a mapping of node paths to node descriptors")]
    NotAMapping,

    #[error("Schema key '{0}' is not a string")]
    NonStringKey(String),

    #[error("'{0}' is not a valid node path")]
    InvalidPath(String),

    #[error("Node '{0}' is declared more than once")]
    DuplicatePath(String),

    #[error("The descriptor for node '{0}' is not a mapping")]
    DescriptorNotAMapping(String),

    #[error("Node '{0}' has no hdf5_type")]
    MissingHdf5Type(String),

    #[error("Node '{path}' has hdf5_type '{value}'; expected one of root, group, dataset")]
    UnknownHdf5Type { path: String, value: String },

    #[error("Node '{path}' has parent '{parent}', which is not declared")]
    UndeclaredParent { path: String, parent: String },

    #[error("Node '{path}' has parent '{parent}', which is a dataset rather than a group or root")]
    ParentNotAGroup { path: String, parent: String },

    #[error("Root node '{0}' must be top-level")]
    RootNotTopLevel(String),

    #[error("Only one root node is allowed, but both '{first}' and '{second}' are roots")]
    MultipleRoots { first: String, second: String },

    #[error("The dims of node '{0}' must be a sequence of strings")]
    InvalidDims(String),

    #[error("Node '{0}' is not a dataset, so it can't have dims")]
    DimsOnGroup(String),

    #[error("Field '{field}' of node '{path}' must be a string")]
    InvalidField { path: String, field: &'static str },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("No node '{0}' in the schema")]
pub struct UnknownPathError(pub String);
