use super::command::{DiffOptions, FetchOptions, GitCommand, MessageSource, StashCommand};
use super::status_report::{self, ChangeRecord};
use super::version_classifier::{self, HeadState};
use crate::common::error::MetapinError;
use crate::common::result::{MetapinResult, OptionExt};
use crate::domain::entities::component::Component;
use crate::domain::entities::workspace::WorkspaceConfig;
use crate::domain::value_objects::remote_url::RemoteUrl;
use crate::domain::value_objects::version::{Version, VersionKind};
use crate::infrastructure::process::git_runner::{CommandOutput, GitRunner};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// Typed git operations on one component checkout.
#[derive(Clone)]
pub struct RepositoryHandle {
    runner: Arc<dyn GitRunner>,
    root: PathBuf,
    local_path: PathBuf,
    remote_url: String,
}

impl std::fmt::Debug for RepositoryHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RepositoryHandle")
            .field("local_path", &self.local_path)
            .field("remote_url", &self.remote_url)
            .finish()
    }
}

impl RepositoryHandle {
    /// Handle for `component`, resolving a `..` remote against the workspace
    /// root's `origin`.
    pub async fn open(
        runner: Arc<dyn GitRunner>,
        config: &WorkspaceConfig,
        component: &Component,
    ) -> MetapinResult<Self> {
        let remote_url = if RemoteUrl::is_relative(&component.remote) {
            let command = GitCommand::RemoteUrl {
                remote: "origin".to_string(),
            };
            let output = runner.run(&config.root, &command).await?;
            let base = checked(&command, output)?;
            RemoteUrl::resolve_relative(base.trim(), &component.remote)
                .map_err(|e| MetapinError::workspace_error(e.to_string(), Some(config.root.clone())))?
                .to_string()
        } else {
            component.remote.clone()
        };

        Ok(Self::with_remote(runner, &config.root, &component.local, remote_url))
    }

    /// Handle with an already resolved remote.
    pub fn with_remote(
        runner: Arc<dyn GitRunner>,
        root: &Path,
        local: &str,
        remote_url: impl Into<String>,
    ) -> Self {
        Self {
            runner,
            root: root.to_path_buf(),
            local_path: root.join(local),
            remote_url: remote_url.into(),
        }
    }

    pub fn local_path(&self) -> &Path {
        &self.local_path
    }

    pub fn remote_url(&self) -> &str {
        &self.remote_url
    }

    pub fn exists(&self) -> bool {
        self.local_path.exists()
    }

    async fn run_in(&self, dir: &Path, command: GitCommand) -> MetapinResult<String> {
        let output = self.runner.run(dir, &command).await?;
        checked(&command, output)
    }

    async fn exec(&self, command: GitCommand) -> MetapinResult<String> {
        self.run_in(&self.local_path, command).await
    }

    async fn exec_trimmed(&self, command: GitCommand) -> MetapinResult<String> {
        Ok(self.exec(command).await?.trim().to_string())
    }

    async fn exec_lines(&self, command: GitCommand) -> MetapinResult<Vec<String>> {
        let output = self.exec(command).await?;
        Ok(output
            .trim()
            .lines()
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect())
    }

    /// Exit status of a probe command; no error for a non-zero exit.
    async fn probe(&self, command: GitCommand) -> MetapinResult<bool> {
        let output = self.runner.run(&self.local_path, &command).await?;
        Ok(output.is_success())
    }

    /// Clone into the local path, check out `version` and detach HEAD.
    ///
    /// A failure after `clone` leaves the partial checkout in place.
    pub async fn clone(&self, version: &Version, recurse_submodules: bool) -> MetapinResult<()> {
        self.run_in(
            &self.root,
            GitCommand::Clone {
                remote: self.remote_url.clone(),
                destination: self.local_path.clone(),
                recurse_submodules,
            },
        )
        .await?;
        self.checkout(version.name(), false).await?;
        self.exec(GitCommand::DetachHead).await?;
        Ok(())
    }

    pub async fn checkout(&self, target: &str, detach: bool) -> MetapinResult<()> {
        self.exec(GitCommand::Checkout {
            target: target.to_string(),
            detach,
        })
        .await?;
        Ok(())
    }

    /// Install `sparse` (relative to the workspace root) as this checkout's
    /// sparse-checkout rules and re-read the tree.
    pub async fn sparsify(&self, sparse: &str) -> MetapinResult<()> {
        let source = self.root.join(sparse);
        let info_dir = self.local_path.join(".git").join("info");
        let destination = info_dir.join("sparse-checkout");

        tokio::fs::create_dir_all(&info_dir).await.map_err(|e| {
            MetapinError::filesystem_error_with_source(
                "failed to create git info directory",
                Some(info_dir.clone()),
                e,
            )
        })?;
        tokio::fs::copy(&source, &destination).await.map_err(|e| {
            MetapinError::filesystem_error_with_source(
                format!("failed to copy sparse file {}", source.display()),
                Some(source.clone()),
                e,
            )
        })?;
        debug!("installed sparse rules from {}", source.display());

        self.exec(GitCommand::ConfigSet {
            key: "core.sparseCheckout".to_string(),
            value: "true".to_string(),
        })
        .await?;
        self.exec(GitCommand::ReadTreeHead).await?;
        Ok(())
    }

    pub async fn list_branches(&self, all: bool) -> MetapinResult<String> {
        self.exec_trimmed(GitCommand::ListBranches { all }).await
    }

    pub async fn list_tags(&self) -> MetapinResult<String> {
        self.exec_trimmed(GitCommand::ListTags).await
    }

    pub async fn rev_list(&self, revision: &str) -> MetapinResult<String> {
        self.exec_trimmed(GitCommand::RevList {
            revision: revision.to_string(),
        })
        .await
    }

    pub async fn list_stash(&self) -> MetapinResult<String> {
        self.exec_trimmed(GitCommand::Stash(StashCommand::List)).await
    }

    pub async fn pop_stash(&self) -> MetapinResult<String> {
        self.exec_trimmed(GitCommand::Stash(StashCommand::Pop)).await
    }

    pub async fn apply_stash(&self) -> MetapinResult<String> {
        self.exec_trimmed(GitCommand::Stash(StashCommand::Apply)).await
    }

    pub async fn push_stash(&self, message: Option<&str>) -> MetapinResult<String> {
        self.exec_trimmed(GitCommand::Stash(StashCommand::Push {
            message: message.map(str::to_string),
        }))
        .await
    }

    pub async fn show_stash(&self, patch: bool) -> MetapinResult<String> {
        self.exec_trimmed(GitCommand::Stash(StashCommand::Show { patch }))
            .await
    }

    pub async fn run_diff(&self, options: DiffOptions) -> MetapinResult<String> {
        self.exec_trimmed(GitCommand::Diff {
            color: true,
            options,
        })
        .await
    }

    pub async fn fetch(&self, options: FetchOptions) -> MetapinResult<String> {
        self.exec_trimmed(GitCommand::Fetch(options)).await
    }

    pub async fn create_branch(&self, name: &str) -> MetapinResult<()> {
        self.exec(GitCommand::CreateBranch {
            name: name.to_string(),
        })
        .await?;
        Ok(())
    }

    /// Lightweight tag, or annotated tag when `annotate` is set.
    ///
    /// An annotated tag needs exactly one of `message`/`file`; that is checked
    /// before git runs.
    pub async fn create_tag(
        &self,
        name: &str,
        annotate: bool,
        message: Option<&str>,
        file: Option<&Path>,
    ) -> MetapinResult<()> {
        let annotation = if annotate {
            Some(MessageSource::exactly_one(message, file, "annotated tag")?)
        } else {
            None
        };
        self.exec(GitCommand::CreateTag {
            name: name.to_string(),
            annotation,
        })
        .await?;
        Ok(())
    }

    pub async fn delete_branch(&self, name: &str, force: bool) -> MetapinResult<()> {
        self.exec(GitCommand::DeleteBranch {
            name: name.to_string(),
            force,
        })
        .await?;
        Ok(())
    }

    pub async fn delete_tag(&self, name: &str) -> MetapinResult<()> {
        self.exec(GitCommand::DeleteTag {
            name: name.to_string(),
        })
        .await?;
        Ok(())
    }

    pub async fn push_tag(&self, name: &str, force: bool) -> MetapinResult<()> {
        self.exec(GitCommand::PushTag {
            name: name.to_string(),
            force,
        })
        .await?;
        Ok(())
    }

    /// Whether `origin/<name>` is known locally.
    pub async fn verify_branch(&self, name: &str) -> MetapinResult<bool> {
        self.probe(GitCommand::ShowRemoteBranch {
            name: name.to_string(),
        })
        .await
    }

    pub async fn status_records(&self) -> MetapinResult<Vec<ChangeRecord>> {
        let output = self.exec(GitCommand::StatusPorcelain).await?;
        Ok(status_report::parse_records(&output))
    }

    /// Formatted per-file status; empty for a clean tree.
    pub async fn check_status(&self) -> MetapinResult<String> {
        Ok(status_report::format_records(&self.status_records().await?))
    }

    /// Modified files, plus untracked ones when `untracked` is set.
    pub async fn get_changed_files(&self, untracked: bool) -> MetapinResult<Vec<String>> {
        let mut files = self
            .exec_lines(GitCommand::Diff {
                color: false,
                options: DiffOptions {
                    name_only: true,
                    staged: false,
                },
            })
            .await?;
        if untracked {
            files.extend(self.exec_lines(GitCommand::ListUntracked).await?);
        }
        Ok(files)
    }

    pub async fn get_staged_files(&self) -> MetapinResult<Vec<String>> {
        self.exec_lines(GitCommand::Diff {
            color: false,
            options: DiffOptions {
                name_only: true,
                staged: true,
            },
        })
        .await
    }

    pub async fn stage_file(&self, path: &str) -> MetapinResult<()> {
        self.exec(GitCommand::Add {
            path: path.to_string(),
        })
        .await?;
        Ok(())
    }

    pub async fn unstage_file(&self, path: &str) -> MetapinResult<()> {
        self.exec(GitCommand::Unstage {
            path: path.to_string(),
        })
        .await?;
        Ok(())
    }

    /// Commit the index with exactly one of `message`/`file`.
    pub async fn commit_files(
        &self,
        message: Option<&str>,
        file: Option<&Path>,
    ) -> MetapinResult<()> {
        let message = MessageSource::exactly_one(message, file, "commit")?;
        self.exec(GitCommand::Commit { message }).await?;
        Ok(())
    }

    pub async fn push(&self) -> MetapinResult<String> {
        self.exec_trimmed(GitCommand::Push {
            remote: self.remote_url.clone(),
        })
        .await
    }

    /// Commit id of `reference` on the remote.
    ///
    /// Hashes are only checked for existence and returned unchanged. A branch
    /// or tag missing on the remote falls back to the local HEAD.
    pub async fn get_remote_latest_commit_id(
        &self,
        reference: &str,
        kind: VersionKind,
    ) -> MetapinResult<String> {
        let Some(namespace) = kind.ref_namespace() else {
            let exists = self
                .probe(GitCommand::ObjectExists {
                    object: reference.to_string(),
                })
                .await?;
            if !exists {
                return Err(MetapinError::hash_not_on_remote(reference, &self.remote_url));
            }
            return Ok(reference.to_string());
        };

        let mut output = self
            .exec_trimmed(GitCommand::LsRemote {
                remote: self.remote_url.clone(),
                reference: format!("refs/{}/{}", namespace, reference),
            })
            .await?;
        if output.is_empty() {
            warn!(
                "{} {} does not exist on {}, using local HEAD",
                kind, reference, self.remote_url
            );
            output = self.get_local_latest_commit_id().await?;
        }

        output
            .split_whitespace()
            .next()
            .map(str::to_string)
            .ok_or_internal_error(format!("no commit id for {} {}", kind, reference))
    }

    pub async fn get_local_latest_commit_id(&self) -> MetapinResult<String> {
        self.exec_trimmed(GitCommand::RevParseHead).await
    }

    pub async fn pull(&self) -> MetapinResult<String> {
        self.exec_trimmed(GitCommand::Pull).await
    }

    /// Currently checked out version.
    pub async fn get_version(&self) -> MetapinResult<Version> {
        let output = self.exec(GitCommand::HeadRefNames).await?;
        let version = match version_classifier::classify(&output, &self.local_path)? {
            HeadState::Attached { name } => Version::branch(name),
            HeadState::DetachedTag { name } => Version::tag(name),
            HeadState::DetachedBranch { name } => Version::detached_branch(name),
            HeadState::DetachedCommit => Version::hash(self.get_local_latest_commit_id().await?),
            HeadState::Grafted => {
                Version::hash(self.exec_trimmed(GitCommand::DescribeAlways).await?)
            }
        };
        debug!("{} is at {}", self.local_path.display(), version);
        Ok(version)
    }
}

fn checked(command: &GitCommand, output: CommandOutput) -> MetapinResult<String> {
    if output.is_success() {
        Ok(output.stdout)
    } else {
        Err(MetapinError::command_failed(
            command.to_string(),
            output.exit_code,
            output.diagnostic(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::process::git_runner::MockGitRunner;

    fn handle(mock: MockGitRunner) -> RepositoryHandle {
        RepositoryHandle::with_remote(
            Arc::new(mock),
            Path::new("/work"),
            "./@env",
            "https://example.com/org/env.git",
        )
    }

    #[tokio::test]
    async fn test_open_resolves_relative_remote_in_root() {
        let mut mock = MockGitRunner::new();
        mock.expect_run()
            .withf(|dir, command| {
                dir == Path::new("/work") && matches!(command, GitCommand::RemoteUrl { .. })
            })
            .times(1)
            .returning(|_, _| Ok(CommandOutput::success("git@github.com:org/root.git\n")));

        let config = WorkspaceConfig::new("/work");
        let component = Component::new("env", "./@env", "../env.git", Version::tag("v1"));
        let handle = RepositoryHandle::open(Arc::new(mock), &config, &component)
            .await
            .unwrap();

        assert_eq!(handle.remote_url(), "git@github.com:org/env.git");
        assert_eq!(handle.local_path(), Path::new("/work/./@env"));
    }

    #[tokio::test]
    async fn test_open_keeps_absolute_remote_without_git() {
        let mut mock = MockGitRunner::new();
        mock.expect_run().times(0);

        let config = WorkspaceConfig::new("/work");
        let component = Component::new(
            "env",
            "./@env",
            "https://example.com/org/env.git",
            Version::tag("v1"),
        );
        let handle = RepositoryHandle::open(Arc::new(mock), &config, &component)
            .await
            .unwrap();
        assert_eq!(handle.remote_url(), "https://example.com/org/env.git");
    }

    #[tokio::test]
    async fn test_annotated_tag_without_message_runs_nothing() {
        let mut mock = MockGitRunner::new();
        mock.expect_run().times(0);

        let result = handle(mock).create_tag("v2", true, None, None).await;
        assert!(matches!(result, Err(MetapinError::MessageSource { .. })));
    }

    #[tokio::test]
    async fn test_commit_with_message_and_file_runs_nothing() {
        let mut mock = MockGitRunner::new();
        mock.expect_run().times(0);

        let result = handle(mock)
            .commit_files(Some("msg"), Some(Path::new("msg.txt")))
            .await;
        assert!(matches!(result, Err(MetapinError::MessageSource { .. })));
    }

    #[tokio::test]
    async fn test_hash_missing_on_remote() {
        let mut mock = MockGitRunner::new();
        mock.expect_run()
            .withf(|_, command| matches!(command, GitCommand::ObjectExists { .. }))
            .times(1)
            .returning(|_, _| Ok(CommandOutput::failure(128, "fatal: Not a valid object name")));

        let error = handle(mock)
            .get_remote_latest_commit_id("deadbeef", VersionKind::Hash)
            .await
            .unwrap_err();
        let message = error.to_string();
        assert!(message.contains("deadbeef"));
        assert!(message.contains("https://example.com/org/env.git"));
        assert!(message.contains("Have you run 'metapin push'?"));
    }

    #[tokio::test]
    async fn test_hash_present_on_remote_is_returned_unchanged() {
        let mut mock = MockGitRunner::new();
        mock.expect_run()
            .times(1)
            .returning(|_, _| Ok(CommandOutput::success("")));

        let id = handle(mock)
            .get_remote_latest_commit_id("3d2e1f0", VersionKind::Hash)
            .await
            .unwrap();
        assert_eq!(id, "3d2e1f0");
    }

    #[tokio::test]
    async fn test_tag_lookup_takes_first_token() {
        let mut mock = MockGitRunner::new();
        mock.expect_run()
            .withf(|_, command| {
                command
                    == &GitCommand::LsRemote {
                        remote: "https://example.com/org/env.git".to_string(),
                        reference: "refs/tags/v1.0".to_string(),
                    }
            })
            .times(1)
            .returning(|_, _| Ok(CommandOutput::success("a1b2c3\trefs/tags/v1.0\n")));

        let id = handle(mock)
            .get_remote_latest_commit_id("v1.0", VersionKind::Tag)
            .await
            .unwrap();
        assert_eq!(id, "a1b2c3");
    }

    #[tokio::test]
    async fn test_missing_branch_falls_back_to_local_head() {
        let mut mock = MockGitRunner::new();
        mock.expect_run().times(2).returning(|_, command| match command {
            GitCommand::LsRemote { .. } => Ok(CommandOutput::success("")),
            GitCommand::RevParseHead => Ok(CommandOutput::success("f00dfeed\n")),
            other => panic!("unexpected command {}", other),
        });

        let id = handle(mock)
            .get_remote_latest_commit_id("feature", VersionKind::Branch)
            .await
            .unwrap();
        assert_eq!(id, "f00dfeed");
    }

    #[tokio::test]
    async fn test_get_version_for_bare_commit_reads_hash() {
        let mut mock = MockGitRunner::new();
        mock.expect_run().times(2).returning(|_, command| match command {
            GitCommand::HeadRefNames => Ok(CommandOutput::success("HEAD\n")),
            GitCommand::RevParseHead => Ok(CommandOutput::success("0123abcd\n")),
            other => panic!("unexpected command {}", other),
        });

        let version = handle(mock).get_version().await.unwrap();
        assert_eq!(version, Version::hash("0123abcd"));
    }

    #[tokio::test]
    async fn test_get_version_grafted_uses_describe() {
        let mut mock = MockGitRunner::new();
        mock.expect_run().times(2).returning(|_, command| match command {
            GitCommand::HeadRefNames => Ok(CommandOutput::success("grafted, HEAD\n")),
            GitCommand::DescribeAlways => Ok(CommandOutput::success("9f8e7d6\n")),
            other => panic!("unexpected command {}", other),
        });

        let version = handle(mock).get_version().await.unwrap();
        assert_eq!(version, Version::hash("9f8e7d6"));
    }

    #[tokio::test]
    async fn test_get_version_detached_tag() {
        let mut mock = MockGitRunner::new();
        mock.expect_run()
            .times(1)
            .returning(|_, _| Ok(CommandOutput::success("HEAD, tag: v1.0\n")));

        let version = handle(mock).get_version().await.unwrap();
        assert_eq!(version, Version::tag("v1.0"));
        assert!(version.is_detached());
    }

    #[tokio::test]
    async fn test_failed_command_reports_stderr() {
        let mut mock = MockGitRunner::new();
        mock.expect_run()
            .times(1)
            .returning(|_, _| Ok(CommandOutput::failure(1, "error: branch 'x' not found.\n")));

        let error = handle(mock).delete_branch("x", false).await.unwrap_err();
        match error {
            MetapinError::CommandFailed {
                command,
                exit_code,
                output,
            } => {
                assert_eq!(command, "git branch -d x");
                assert_eq!(exit_code, Some(1));
                assert_eq!(output, "error: branch 'x' not found.");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_verify_branch_reads_exit_status() {
        let mut mock = MockGitRunner::new();
        mock.expect_run()
            .times(1)
            .returning(|_, _| Ok(CommandOutput::failure(128, "fatal: bad sha1 reference")));

        assert!(!handle(mock).verify_branch("nope").await.unwrap());
    }

    #[tokio::test]
    async fn test_changed_files_with_untracked() {
        let mut mock = MockGitRunner::new();
        mock.expect_run().times(2).returning(|_, command| match command {
            GitCommand::Diff { .. } => Ok(CommandOutput::success("src/lib.rs\n")),
            GitCommand::ListUntracked => Ok(CommandOutput::success("foo.txt\nbar.txt\n")),
            other => panic!("unexpected command {}", other),
        });

        let files = handle(mock).get_changed_files(true).await.unwrap();
        assert_eq!(files, vec!["src/lib.rs", "foo.txt", "bar.txt"]);
    }

    #[tokio::test]
    async fn test_staged_files_empty_output() {
        let mut mock = MockGitRunner::new();
        mock.expect_run()
            .times(1)
            .returning(|_, _| Ok(CommandOutput::success("\n")));

        assert!(handle(mock).get_staged_files().await.unwrap().is_empty());
    }
}
