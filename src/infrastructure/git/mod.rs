pub mod command;
pub mod repository;
pub mod status_report;
pub mod version_classifier;

// Re-export main types for convenience
pub use command::{DiffOptions, FetchOptions, GitCommand, MessageSource, StashCommand};
pub use repository::RepositoryHandle;
pub use status_report::{ChangeKind, ChangeRecord};
pub use version_classifier::HeadState;
