use super::manifest::{Manifest, ALT_MANIFEST_FILE_NAME, MANIFEST_FILE_NAME};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Process-wide settings resolved once per invocation and passed by value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceConfig {
    /// Workspace root; every component path is relative to it.
    pub root: PathBuf,

    /// Manifest file.
    pub manifest_path: PathBuf,

    /// git executable to invoke.
    pub git_executable: String,

    /// Per-command timeout; `None` blocks until git exits.
    pub command_timeout: Option<Duration>,
}

impl WorkspaceConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            manifest_path: root.join(MANIFEST_FILE_NAME),
            root,
            git_executable: "git".to_string(),
            command_timeout: None,
        }
    }

    pub fn with_manifest_path(mut self, manifest_path: impl Into<PathBuf>) -> Self {
        self.manifest_path = manifest_path.into();
        self
    }

    pub fn with_git_executable(mut self, executable: impl Into<String>) -> Self {
        self.git_executable = executable.into();
        self
    }

    pub fn with_command_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.command_timeout = timeout;
        self
    }

    /// Absolute location of a component checkout.
    pub fn component_path(&self, local: &str) -> PathBuf {
        self.root.join(local)
    }
}

/// A meta-repository: its settings and its loaded manifest.
#[derive(Debug, Clone)]
pub struct Workspace {
    pub config: WorkspaceConfig,
    pub manifest: Manifest,
}

impl Workspace {
    pub fn new(config: WorkspaceConfig, manifest: Manifest) -> Self {
        Self { config, manifest }
    }

    /// Search `start` and its ancestors for a directory holding a manifest.
    pub fn discover_workspace_root(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .find(|dir| Self::find_manifest_file(dir).is_some())
            .map(Path::to_path_buf)
    }

    /// Manifest file directly inside `dir`, preferring `components.yaml`.
    pub fn find_manifest_file(dir: &Path) -> Option<PathBuf> {
        [MANIFEST_FILE_NAME, ALT_MANIFEST_FILE_NAME]
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.is_file())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_defaults() {
        let config = WorkspaceConfig::new("/work/model");
        assert_eq!(config.manifest_path, PathBuf::from("/work/model/components.yaml"));
        assert_eq!(config.git_executable, "git");
        assert!(config.command_timeout.is_none());
        assert_eq!(
            config.component_path("./@env"),
            PathBuf::from("/work/model/./@env")
        );
    }

    #[test]
    fn test_discover_workspace_root_from_nested_directory() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("components.yaml"), "").unwrap();
        let nested = temp_dir.path().join("src").join("deep");
        std::fs::create_dir_all(&nested).unwrap();

        let root = Workspace::discover_workspace_root(&nested).unwrap();
        assert_eq!(root, temp_dir.path());
    }

    #[test]
    fn test_find_manifest_file_accepts_yml() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("components.yml"), "").unwrap();

        let found = Workspace::find_manifest_file(temp_dir.path()).unwrap();
        assert_eq!(found, temp_dir.path().join("components.yml"));
    }

    #[test]
    fn test_find_manifest_file_prefers_yaml() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("components.yml"), "").unwrap();
        std::fs::write(temp_dir.path().join("components.yaml"), "").unwrap();

        let found = Workspace::find_manifest_file(temp_dir.path()).unwrap();
        assert_eq!(found, temp_dir.path().join("components.yaml"));
    }

    #[test]
    fn test_manifest_directory_is_not_a_manifest() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::create_dir(temp_dir.path().join("components.yaml")).unwrap();
        std::fs::write(temp_dir.path().join("components.yml"), "").unwrap();

        let found = Workspace::find_manifest_file(temp_dir.path()).unwrap();
        assert_eq!(found, temp_dir.path().join("components.yml"));
    }

    #[test]
    fn test_discover_without_manifest() {
        let temp_dir = TempDir::new().unwrap();
        assert!(Workspace::find_manifest_file(temp_dir.path()).is_none());
    }
}
