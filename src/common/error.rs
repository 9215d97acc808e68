use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MetapinError {
    #[error("invalid component name [{name}]")]
    InvalidComponent { name: String },

    #[error("{operation} requires exactly one of a message or a message file")]
    MessageSource { operation: String },

    #[error("Command `{command}` failed{}: {output}", .exit_code.map(|c| format!(" with exit code {}", c)).unwrap_or_default())]
    CommandFailed {
        command: String,
        exit_code: Option<i32>,
        output: String,
    },

    #[error("Could not run `{command}`: {source}")]
    CommandSpawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Hash {hash} does not exist on {remote}. Have you run 'metapin push'?")]
    HashNotOnRemote { hash: String, remote: String },

    #[error("Could not classify the checked out version of {}: {output:?}", .path.display())]
    UnclassifiableVersion { path: PathBuf, output: String },

    #[error("Manifest error: {message}")]
    ManifestError {
        message: String,
        file_path: Option<PathBuf>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("File system operation failed: {message}")]
    FileSystemError {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("Workspace error: {message}")]
    WorkspaceError {
        message: String,
        workspace_path: Option<PathBuf>,
    },

    #[error("Operation timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    #[error("Internal error: {message}")]
    InternalError { message: String },
}

impl MetapinError {
    pub fn invalid_component(name: impl Into<String>) -> Self {
        Self::InvalidComponent { name: name.into() }
    }

    pub fn message_source(operation: impl Into<String>) -> Self {
        Self::MessageSource {
            operation: operation.into(),
        }
    }

    pub fn command_failed(
        command: impl Into<String>,
        exit_code: Option<i32>,
        output: impl Into<String>,
    ) -> Self {
        Self::CommandFailed {
            command: command.into(),
            exit_code,
            output: output.into(),
        }
    }

    pub fn command_spawn(command: impl Into<String>, source: std::io::Error) -> Self {
        Self::CommandSpawn {
            command: command.into(),
            source,
        }
    }

    pub fn hash_not_on_remote(hash: impl Into<String>, remote: impl Into<String>) -> Self {
        Self::HashNotOnRemote {
            hash: hash.into(),
            remote: remote.into(),
        }
    }

    pub fn unclassifiable_version(path: impl Into<PathBuf>, output: impl Into<String>) -> Self {
        Self::UnclassifiableVersion {
            path: path.into(),
            output: output.into(),
        }
    }

    pub fn manifest_error(message: impl Into<String>, file_path: Option<PathBuf>) -> Self {
        Self::ManifestError {
            message: message.into(),
            file_path,
            source: None,
        }
    }

    pub fn manifest_error_with_source(
        message: impl Into<String>,
        file_path: Option<PathBuf>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::ManifestError {
            message: message.into(),
            file_path,
            source: Some(Box::new(source)),
        }
    }

    pub fn filesystem_error(message: impl Into<String>, path: Option<PathBuf>) -> Self {
        Self::FileSystemError {
            message: message.into(),
            path,
            source: None,
        }
    }

    pub fn filesystem_error_with_source(
        message: impl Into<String>,
        path: Option<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::FileSystemError {
            message: message.into(),
            path,
            source: Some(source),
        }
    }

    pub fn workspace_error(message: impl Into<String>, workspace_path: Option<PathBuf>) -> Self {
        Self::WorkspaceError {
            message: message.into(),
            workspace_path,
        }
    }

    pub fn timeout(timeout_secs: u64) -> Self {
        Self::Timeout { timeout_secs }
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::InternalError {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for MetapinError {
    fn from(error: std::io::Error) -> Self {
        Self::filesystem_error_with_source("File system operation failed", None, error)
    }
}

impl From<serde_yaml::Error> for MetapinError {
    fn from(error: serde_yaml::Error) -> Self {
        Self::manifest_error_with_source("YAML serialization failed", None, error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_component_names_the_identifier() {
        let error = MetapinError::invalid_component("fvdycore");
        assert_eq!(error.to_string(), "invalid component name [fvdycore]");
    }

    #[test]
    fn test_command_failed_with_exit_code() {
        let error = MetapinError::command_failed("git pull", Some(128), "fatal: not a git repository");
        assert_eq!(
            error.to_string(),
            "Command `git pull` failed with exit code 128: fatal: not a git repository"
        );
    }

    #[test]
    fn test_command_failed_without_exit_code() {
        let error = MetapinError::command_failed("git pull", None, "killed");
        assert_eq!(error.to_string(), "Command `git pull` failed: killed");
    }

    #[test]
    fn test_hash_not_on_remote_hint() {
        let error = MetapinError::hash_not_on_remote("abc1234", "https://example.com/env.git");
        let message = error.to_string();
        assert!(message.contains("abc1234"));
        assert!(message.contains("metapin push"));
    }

    #[test]
    fn test_timeout_error() {
        let error = MetapinError::timeout(30);
        assert_eq!(error.to_string(), "Operation timed out after 30 seconds");
    }

    #[test]
    fn test_error_conversion_from_io_error() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error: MetapinError = io_error.into();
        assert!(matches!(error, MetapinError::FileSystemError { .. }));
    }
}
