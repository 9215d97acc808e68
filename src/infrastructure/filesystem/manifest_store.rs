use std::path::{Path, PathBuf};
use tokio::fs as async_fs;
use tracing::debug;

use crate::common::error::MetapinError;
use crate::common::result::MetapinResult;
use crate::domain::entities::manifest::Manifest;

/// Write behaviour of [`ManifestStore`].
#[derive(Debug, Clone)]
pub struct ManifestStoreOptions {
    /// Copy an existing manifest to `<name>.bak_<timestamp>` before overwriting it
    pub create_backup: bool,

    /// Maximum number of backup files to keep
    pub max_backups: usize,

    /// Whether to create parent directories if they don't exist
    pub create_parent_dirs: bool,
}

impl Default for ManifestStoreOptions {
    fn default() -> Self {
        Self {
            create_backup: true,
            max_backups: 5,
            create_parent_dirs: true,
        }
    }
}

/// Reads and writes `components.yaml`.
#[derive(Debug, Clone, Default)]
pub struct ManifestStore {
    options: ManifestStoreOptions,
}

impl ManifestStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ManifestStoreOptions) -> Self {
        Self { options }
    }

    /// Read and parse the manifest at `manifest_path`.
    pub async fn read_manifest<P: AsRef<Path>>(&self, manifest_path: P) -> MetapinResult<Manifest> {
        let manifest_path = manifest_path.as_ref();

        if !manifest_path.exists() {
            return Err(MetapinError::manifest_error(
                format!("manifest file not found at {}", manifest_path.display()),
                Some(manifest_path.to_path_buf()),
            ));
        }

        let content = async_fs::read_to_string(manifest_path).await.map_err(|e| {
            MetapinError::filesystem_error_with_source(
                "failed to read manifest",
                Some(manifest_path.to_path_buf()),
                e,
            )
        })?;

        let manifest = Manifest::from_yaml_str(&content, Some(manifest_path))?;
        debug!(
            "loaded {} components from {}",
            manifest.components.len(),
            manifest_path.display()
        );
        Ok(manifest)
    }

    /// Serialize `manifest` to `manifest_path`, backing up any existing file.
    ///
    /// Returns the backup path when one was written.
    pub async fn write_manifest<P: AsRef<Path>>(
        &self,
        manifest_path: P,
        manifest: &Manifest,
    ) -> MetapinResult<Option<PathBuf>> {
        let manifest_path = manifest_path.as_ref();
        let yaml_content = manifest.to_yaml_string()?;

        let backup = if self.options.create_backup && manifest_path.exists() {
            Some(self.create_backup(manifest_path).await?)
        } else {
            None
        };

        if let Some(parent) = manifest_path.parent() {
            if self.options.create_parent_dirs && !parent.as_os_str().is_empty() && !parent.exists()
            {
                async_fs::create_dir_all(parent).await.map_err(|e| {
                    MetapinError::filesystem_error_with_source(
                        "failed to create manifest directory",
                        Some(parent.to_path_buf()),
                        e,
                    )
                })?;
            }
        }

        async_fs::write(manifest_path, yaml_content)
            .await
            .map_err(|e| {
                MetapinError::filesystem_error_with_source(
                    "failed to write manifest",
                    Some(manifest_path.to_path_buf()),
                    e,
                )
            })?;

        Ok(backup)
    }

    pub fn manifest_exists<P: AsRef<Path>>(&self, manifest_path: P) -> bool {
        manifest_path.as_ref().is_file()
    }

    async fn create_backup(&self, file_path: &Path) -> MetapinResult<PathBuf> {
        let file_name = file_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| {
                MetapinError::filesystem_error(
                    "manifest path has no file name",
                    Some(file_path.to_path_buf()),
                )
            })?;

        let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
        let backup_path = file_path.with_file_name(format!("{}.bak_{}", file_name, timestamp));

        async_fs::copy(file_path, &backup_path).await.map_err(|e| {
            MetapinError::filesystem_error_with_source(
                "failed to back up manifest",
                Some(backup_path.clone()),
                e,
            )
        })?;
        debug!("backed up manifest to {}", backup_path.display());

        self.cleanup_old_backups(file_path, &file_name).await;
        Ok(backup_path)
    }

    /// Keep the newest `max_backups` backups; removal failures are ignored.
    async fn cleanup_old_backups(&self, file_path: &Path, file_name: &str) {
        let parent = match file_path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let prefix = format!("{}.bak_", file_name);

        let mut backups = Vec::new();
        if let Ok(mut entries) = async_fs::read_dir(parent).await {
            while let Ok(Some(entry)) = entries.next_entry().await {
                let path = entry.path();
                let is_backup = path
                    .file_name()
                    .map(|n| n.to_string_lossy().starts_with(&prefix))
                    .unwrap_or(false);
                if is_backup {
                    backups.push(path);
                }
            }
        }

        // timestamped names sort oldest first
        backups.sort();
        backups.reverse();

        for backup in backups.iter().skip(self.options.max_backups) {
            let _ = async_fs::remove_file(backup).await;
        }
    }
}
