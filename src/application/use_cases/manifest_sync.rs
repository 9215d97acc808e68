use crate::common::result::{MetapinResult, OptionExt};
use crate::domain::entities::component::Component;
use crate::domain::entities::workspace::{Workspace, WorkspaceConfig};
use crate::domain::value_objects::version::VersionKind;
use crate::infrastructure::git::command::MessageSource;
use crate::infrastructure::git::repository::RepositoryHandle;
use crate::infrastructure::process::git_runner::GitRunner;
use serde::Serialize;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// コンポーネントがスキップされた理由
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    DetachedHead,
    NoChanges,
    AlreadyCloned,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            SkipReason::DetachedHead => "detached HEAD",
            SkipReason::NoChanges => "no changes",
            SkipReason::AlreadyCloned => "already cloned",
        };
        write!(f, "{}", reason)
    }
}

/// 実行された操作
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentAction {
    pub component: String,
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedComponent {
    pub component: String,
    pub reason: SkipReason,
}

/// 一括操作の結果
///
/// 途中でエラーになっても、それまでの結果は残る。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BulkReport {
    pub actions: Vec<ComponentAction>,
    pub skipped: Vec<SkippedComponent>,
}

impl BulkReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, component: &str, detail: impl Into<String>) {
        self.actions.push(ComponentAction {
            component: component.to_string(),
            detail: detail.into(),
        });
    }

    pub fn skip(&mut self, component: &str, reason: SkipReason) {
        self.skipped.push(SkippedComponent {
            component: component.to_string(),
            reason,
        });
    }

    pub fn acted_on(&self) -> Vec<&str> {
        self.actions.iter().map(|a| a.component.as_str()).collect()
    }

    pub fn skipped_names(&self) -> Vec<&str> {
        self.skipped.iter().map(|s| s.component.as_str()).collect()
    }

    /// 指定した理由でスキップされたコンポーネント名
    pub fn skipped_for(&self, reason: SkipReason) -> Vec<&str> {
        self.skipped
            .iter()
            .filter(|s| s.reason == reason)
            .map(|s| s.component.as_str())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty() && self.skipped.is_empty()
    }
}

/// マニフェストの全コンポーネントに対する一括操作
pub struct ManifestSync {
    runner: Arc<dyn GitRunner>,
    config: WorkspaceConfig,
    components: Vec<Component>,
}

impl ManifestSync {
    pub fn new(
        runner: Arc<dyn GitRunner>,
        config: WorkspaceConfig,
        components: Vec<Component>,
    ) -> Self {
        Self {
            runner,
            config,
            components,
        }
    }

    pub fn from_workspace(runner: Arc<dyn GitRunner>, workspace: &Workspace) -> Self {
        Self::new(
            runner,
            workspace.config.clone(),
            workspace.manifest.components.clone(),
        )
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    /// 名前でコンポーネントを選択する
    ///
    /// 空のリストはマニフェスト順の全コンポーネント。未知の名前があれば
    /// git を実行する前に [`InvalidComponent`](crate::common::error::MetapinError::InvalidComponent) を返す。
    pub fn select(&self, names: &[String]) -> MetapinResult<Vec<&Component>> {
        if names.is_empty() {
            return Ok(self.components.iter().collect());
        }
        names
            .iter()
            .map(|name| {
                self.components
                    .iter()
                    .find(|c| &c.name == name)
                    .ok_or_invalid_component(name.as_str())
            })
            .collect()
    }

    pub fn find(&self, name: &str) -> MetapinResult<&Component> {
        self.components
            .iter()
            .find(|c| c.name == name)
            .ok_or_invalid_component(name)
    }

    pub async fn handle(&self, component: &Component) -> MetapinResult<RepositoryHandle> {
        RepositoryHandle::open(Arc::clone(&self.runner), &self.config, component).await
    }

    /// ブランチにいる全コンポーネントで `git pull` を実行する
    ///
    /// detached HEAD のコンポーネントはスキップする。
    pub async fn pull_all(&self, report: &mut BulkReport) -> MetapinResult<()> {
        for component in &self.components {
            let repo = self.handle(component).await?;
            let version = repo.get_version().await?;
            if version.is_detached() {
                report.skip(&component.name, SkipReason::DetachedHead);
                continue;
            }
            info!("pulling branch {} in {}", version.name(), component.name);
            repo.pull().await?;
            report.record(&component.name, version.name());
        }
        Ok(())
    }

    /// 変更のあるコンポーネントにだけブランチを作成する
    pub async fn create_branch_where_changed(
        &self,
        branch: &str,
        report: &mut BulkReport,
    ) -> MetapinResult<()> {
        for component in &self.components {
            let repo = self.handle(component).await?;
            if repo.get_changed_files(false).await?.is_empty() {
                report.skip(&component.name, SkipReason::NoChanges);
                continue;
            }
            repo.create_branch(branch).await?;
            report.record(&component.name, branch);
        }
        Ok(())
    }

    pub async fn delete_branch(
        &self,
        branch: &str,
        names: &[String],
        force: bool,
        report: &mut BulkReport,
    ) -> MetapinResult<()> {
        for component in self.select(names)? {
            self.handle(component)
                .await?
                .delete_branch(branch, force)
                .await?;
            report.record(&component.name, branch);
        }
        Ok(())
    }

    /// ブランチに切り替える (detach しない)
    pub async fn switch_branch(&self, name: &str, branch: &str) -> MetapinResult<()> {
        let component = self.find(name)?;
        let repo = self.handle(component).await?;
        if !repo.verify_branch(branch).await? {
            warn!("branch {} is not known on origin for {}", branch, name);
        }
        repo.checkout(branch, false).await
    }

    /// タグを作成する
    ///
    /// annotated タグのメッセージ指定は最初のコンポーネントより前に検証する。
    pub async fn create_tag(
        &self,
        tag: &str,
        annotate: bool,
        message: Option<&str>,
        file: Option<&Path>,
        names: &[String],
        report: &mut BulkReport,
    ) -> MetapinResult<()> {
        if annotate {
            MessageSource::exactly_one(message, file, "annotated tag")?;
        }
        for component in self.select(names)? {
            self.handle(component)
                .await?
                .create_tag(tag, annotate, message, file)
                .await?;
            report.record(&component.name, tag);
        }
        Ok(())
    }

    pub async fn delete_tag(
        &self,
        tag: &str,
        names: &[String],
        report: &mut BulkReport,
    ) -> MetapinResult<()> {
        for component in self.select(names)? {
            self.handle(component).await?.delete_tag(tag).await?;
            report.record(&component.name, tag);
        }
        Ok(())
    }

    pub async fn push_tag(
        &self,
        tag: &str,
        force: bool,
        names: &[String],
        report: &mut BulkReport,
    ) -> MetapinResult<()> {
        for component in self.select(names)? {
            self.handle(component).await?.push_tag(tag, force).await?;
            report.record(&component.name, tag);
        }
        Ok(())
    }

    pub async fn push_branches(&self, names: &[String], report: &mut BulkReport) -> MetapinResult<()> {
        for component in self.select(names)? {
            let output = self.handle(component).await?.push().await?;
            report.record(&component.name, output);
        }
        Ok(())
    }

    /// 各コンポーネントを現在のバージョンで固定し直す
    ///
    /// ハッシュはリモートに存在することを確認する。未クローンの
    /// コンポーネントは元の固定のまま残る。
    pub async fn save(&self) -> MetapinResult<Vec<Component>> {
        let mut saved = Vec::with_capacity(self.components.len());
        for component in &self.components {
            let repo = self.handle(component).await?;
            if !repo.exists() {
                warn!("{} is not cloned, keeping {}", component.name, component.version);
                saved.push(component.clone());
                continue;
            }

            let version = repo.get_version().await?;
            if version.kind() == VersionKind::Hash {
                repo.get_remote_latest_commit_id(version.name(), VersionKind::Hash)
                    .await?;
            }
            if !component.version.matches(&version) {
                info!(
                    "{}: {} -> {}",
                    component.name, component.version, version
                );
            }
            saved.push(component.repinned(version));
        }
        Ok(saved)
    }
}
