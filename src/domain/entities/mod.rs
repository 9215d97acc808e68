pub mod component;
pub mod manifest;
pub mod workspace;

pub use component::Component;
pub use manifest::{ComponentEntry, Manifest, ALT_MANIFEST_FILE_NAME, MANIFEST_FILE_NAME};
pub use workspace::{Workspace, WorkspaceConfig};
