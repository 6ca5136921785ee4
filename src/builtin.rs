//! The schemas shipped with the crate.

use lazy_static::lazy_static;

use crate::{registry::SchemaRegistry, schema::SchemaDocument};

/// Schema text for AA_UV visibility files.
pub const UVX_YAML: &str = include_str!("../schemas/uvx.yaml");

/// Schema text for AA_CAL calibration solution files.
pub const CAL_YAML: &str = include_str!("../schemas/cal.yaml");

lazy_static! {
    pub static ref UVX: SchemaDocument =
        SchemaDocument::from_yaml(UVX_YAML).expect("built-in uvx schema is valid");
    pub static ref CAL: SchemaDocument =
        SchemaDocument::from_yaml(CAL_YAML).expect("built-in cal schema is valid");
}

/// Get a built-in schema by its short name ("uvx" or "cal").
pub fn by_name(name: &str) -> Option<&'static SchemaDocument> {
    match name {
        "uvx" => Some(&*UVX),
        "cal" => Some(&*CAL),
        _ => None,
    }
}

/// A registry holding every built-in schema.
pub fn registry() -> SchemaRegistry {
    let mut registry = SchemaRegistry::new();
    for doc in [&*UVX, &*CAL] {
        registry
            .insert(doc.clone())
            .expect("built-in schemas have distinct class names");
    }
    registry
}
