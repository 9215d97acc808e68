//! Domain model: components, versions, the manifest and the workspace.

pub mod entities;
pub mod value_objects;
