//! Several schema variants (e.g. visibilities and calibration solutions)
//! loaded side by side.

use itertools::Itertools;
use log::debug;
use thiserror::Error;

use crate::{
    container::{ContainerRead, Entry},
    schema::SchemaDocument,
};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("A schema with class name '{0}' is already registered")]
    DuplicateClass(String),

    #[error("Schemas must declare a root node with a class_name to be registered")]
    Anonymous,

    #[error("None of the registered schemas ({0}) have their root in this container")]
    NoMatch(String),
}

#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: Vec<SchemaDocument>,
}

impl SchemaRegistry {
    pub fn new() -> SchemaRegistry {
        SchemaRegistry::default()
    }

    pub fn insert(&mut self, doc: SchemaDocument) -> Result<(), RegistryError> {
        let class_name = doc.class_name().ok_or(RegistryError::Anonymous)?;
        if self.get(class_name).is_some() {
            return Err(RegistryError::DuplicateClass(class_name.to_string()));
        }
        debug!("Registering schema {class_name}");
        self.schemas.push(doc);
        Ok(())
    }

    pub fn get(&self, class_name: &str) -> Option<&SchemaDocument> {
        self.schemas
            .iter()
            .find(|s| s.class_name() == Some(class_name))
    }

    /// The first registered schema whose root exists as a group in
    /// `container`.
    pub fn detect<C: ContainerRead + ?Sized>(&self, container: &C) -> Option<&SchemaDocument> {
        self.schemas.iter().find(|s| {
            s.root()
                .map(|root| matches!(container.entry(root), Some(Entry::Group)))
                .unwrap_or(false)
        })
    }

    /// Like [SchemaRegistry::detect], but not finding a schema is an error.
    pub fn require<C: ContainerRead + ?Sized>(
        &self,
        container: &C,
    ) -> Result<&SchemaDocument, RegistryError> {
        self.detect(container).ok_or_else(|| {
            RegistryError::NoMatch(self.schemas.iter().filter_map(|s| s.class_name()).join(", "))
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &SchemaDocument> {
        self.schemas.iter()
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}
