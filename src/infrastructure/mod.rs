/// Infrastructure layer modules
///
/// This layer provides concrete implementations for external system interactions:
/// - git invocations and their typed arguments
/// - interpretation of git output (HEAD classification, porcelain status)
/// - the manifest file on disk
pub mod filesystem;
pub mod git;
pub mod process;

// Re-export commonly used types
pub use filesystem::ManifestStore;
pub use git::{GitCommand, RepositoryHandle};
pub use process::{CommandOutput, GitCli, GitRunner};
