//! Schema-driven structure validation for AA_UV-style HDF5 radio
//! interferometry files.
//!
//! A [SchemaDocument] declares which groups and datasets a file must have and
//! which named dimensions each dataset's axes correspond to. A container (any
//! [ContainerRead] implementor, e.g. a wrapper around an HDF5 reader, or the
//! in-memory [Container]) is checked against it with [validate_container].

pub mod builtin;
pub mod container;
pub mod registry;
pub mod schema;
pub mod validate;

use std::path::PathBuf;

use thiserror::Error;

pub use container::{Container, ContainerError, ContainerRead, DatasetInfo, Dtype, Entry};
pub use registry::{RegistryError, SchemaRegistry};
pub use schema::{
    Format, Hdf5Type, NodeDescriptor, NodePath, SchemaDocument, SchemaParseError,
    UnknownPathError,
};
pub use validate::{validate_container, validate_many, Issue, IssueKind, ValidationReport};

/// Everything that can go wrong.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    SchemaParse(#[from] SchemaParseError),

    #[error(transparent)]
    UnknownPath(#[from] UnknownPathError),

    #[error(transparent)]
    Container(#[from] ContainerError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("Couldn't read {}: {source}", file.display())]
    Io {
        file: PathBuf,
        source: std::io::Error,
    },
}
