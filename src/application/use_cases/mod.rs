pub mod clone_components;
pub mod manifest_sync;
pub mod status_check;
