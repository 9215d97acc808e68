use super::manifest_sync::ManifestSync;
use crate::common::result::MetapinResult;
use crate::domain::value_objects::version::{Version, VersionKind};
use crate::infrastructure::git::repository::RepositoryHandle;
use crate::infrastructure::git::status_report::{self, ChangeRecord};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

/// チェックアウトの状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckoutState {
    /// クリーン（変更なし）
    Clean,
    /// ダーティ（未コミットの変更あり）
    Dirty,
    /// 存在しない
    Missing,
}

/// 単一コンポーネントのステータス
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentStatus {
    pub name: String,

    /// ワークスペースルートからの相対パス
    pub local: String,

    /// マニフェストで固定されたバージョン
    pub pinned: Version,

    /// 実際にチェックアウトされているバージョン（未クローンなら None）
    pub observed: Option<Version>,

    pub state: CheckoutState,

    /// 固定と実際のバージョンが異なるか
    pub drift: bool,

    pub changes: Vec<ChangeRecord>,
}

impl ComponentStatus {
    pub fn missing(name: &str, local: &str, pinned: Version) -> Self {
        Self {
            name: name.to_string(),
            local: local.to_string(),
            pinned,
            observed: None,
            state: CheckoutState::Missing,
            drift: false,
            changes: Vec::new(),
        }
    }

    pub fn observed(
        name: &str,
        local: &str,
        pinned: Version,
        observed: Version,
        changes: Vec<ChangeRecord>,
    ) -> Self {
        let state = if changes.is_empty() {
            CheckoutState::Clean
        } else {
            CheckoutState::Dirty
        };
        Self {
            name: name.to_string(),
            local: local.to_string(),
            drift: !pinned.matches(&observed),
            pinned,
            observed: Some(observed),
            state,
            changes,
        }
    }

    /// 整形済みの変更一覧（変更がなければ空文字列）
    pub fn formatted_changes(&self) -> String {
        status_report::format_records(&self.changes)
    }

    pub fn has_issues(&self) -> bool {
        self.drift || self.state != CheckoutState::Clean
    }
}

/// 全体のステータス結果
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub generated_at: DateTime<Utc>,
    pub components: Vec<ComponentStatus>,
}

impl StatusReport {
    pub fn new(components: Vec<ComponentStatus>) -> Self {
        Self {
            generated_at: Utc::now(),
            components,
        }
    }

    fn count(&self, state: CheckoutState) -> usize {
        self.components.iter().filter(|c| c.state == state).count()
    }

    pub fn clean_count(&self) -> usize {
        self.count(CheckoutState::Clean)
    }

    pub fn dirty_count(&self) -> usize {
        self.count(CheckoutState::Dirty)
    }

    pub fn missing_count(&self) -> usize {
        self.count(CheckoutState::Missing)
    }

    pub fn drift_count(&self) -> usize {
        self.components.iter().filter(|c| c.drift).count()
    }

    /// 全体的に問題があるかチェック
    pub fn has_issues(&self) -> bool {
        self.components.iter().any(ComponentStatus::has_issues)
    }

    pub fn total_count(&self) -> usize {
        self.components.len()
    }
}

/// ステータス確認のユースケース
pub struct StatusCheckUseCase<'a> {
    sync: &'a ManifestSync,
}

impl<'a> StatusCheckUseCase<'a> {
    pub fn new(sync: &'a ManifestSync) -> Self {
        Self { sync }
    }

    /// ステータス確認を実行
    ///
    /// `names` が空なら全コンポーネントが対象。
    pub async fn execute(&self, names: &[String]) -> MetapinResult<StatusReport> {
        let mut statuses = Vec::new();
        for component in self.sync.select(names)? {
            let repo = self.sync.handle(component).await?;
            if !repo.exists() {
                statuses.push(ComponentStatus::missing(
                    &component.name,
                    &component.local,
                    component.version.clone(),
                ));
                continue;
            }

            let observed = repo.get_version().await?;
            let changes = repo.status_records().await?;
            let mut status = ComponentStatus::observed(
                &component.name,
                &component.local,
                component.version.clone(),
                observed,
                changes,
            );
            // HEAD の装飾はタグを一つしか示さないので、別タグでも同一コミットなら一致扱い
            if status.drift
                && component.version.kind() == VersionKind::Tag
                && tag_points_at_head(&repo, component.version.name()).await?
            {
                status.drift = false;
            }
            statuses.push(status);
        }
        Ok(StatusReport::new(statuses))
    }
}

/// `tag` が HEAD と同じコミットを指すか（ローカルに無いタグは false）
async fn tag_points_at_head(repo: &RepositoryHandle, tag: &str) -> MetapinResult<bool> {
    let tagged = match repo.rev_list(tag).await {
        Ok(commit) => commit,
        Err(e) => {
            debug!("cannot resolve tag {}: {}", tag, e);
            return Ok(false);
        }
    };
    Ok(tagged == repo.get_local_latest_commit_id().await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::component::Component;
    use crate::domain::entities::workspace::WorkspaceConfig;
    use crate::infrastructure::git::command::GitCommand;
    use crate::infrastructure::process::git_runner::{CommandOutput, MockGitRunner};
    use std::sync::Arc;
    use tempfile::TempDir;

    #[test]
    fn test_component_status_drift() {
        let status = ComponentStatus::observed(
            "env",
            "./@env",
            Version::remote_branch("main"),
            Version::branch("main"),
            Vec::new(),
        );
        assert!(!status.drift);
        assert_eq!(status.state, CheckoutState::Clean);
        assert!(!status.has_issues());

        let drifted = ComponentStatus::observed(
            "env",
            "./@env",
            Version::tag("v1.0"),
            Version::branch("feature"),
            Vec::new(),
        );
        assert!(drifted.drift);
        assert!(drifted.has_issues());
    }

    #[test]
    fn test_missing_status() {
        let status = ComponentStatus::missing("env", "./@env", Version::tag("v1.0"));
        assert_eq!(status.state, CheckoutState::Missing);
        assert!(status.observed.is_none());
        assert_eq!(status.formatted_changes(), "");
    }

    #[tokio::test]
    async fn test_execute_reports_missing_clean_and_dirty() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().to_path_buf();
        std::fs::create_dir(root.join("clean")).unwrap();
        std::fs::create_dir(root.join("dirty")).unwrap();
        let dirty_path = root.join("dirty");

        let mut mock = MockGitRunner::new();
        mock.expect_run()
            .withf(|_, command| matches!(command, GitCommand::HeadRefNames))
            .times(2)
            .returning(|_, _| Ok(CommandOutput::success("HEAD, tag: v1.0\n")));
        mock.expect_run()
            .withf(|_, command| matches!(command, GitCommand::StatusPorcelain))
            .times(2)
            .returning(move |dir, _| {
                if dir == dirty_path {
                    Ok(CommandOutput::success("? foo.txt\n"))
                } else {
                    Ok(CommandOutput::success(""))
                }
            });

        let components = ["clean", "dirty", "missing"]
            .iter()
            .map(|name| {
                Component::new(
                    *name,
                    *name,
                    format!("https://example.com/{}.git", name),
                    Version::tag("v1.0"),
                )
            })
            .collect();
        let sync = ManifestSync::new(Arc::new(mock), WorkspaceConfig::new(&root), components);

        let report = StatusCheckUseCase::new(&sync).execute(&[]).await.unwrap();

        let states: Vec<CheckoutState> = report.components.iter().map(|c| c.state).collect();
        assert_eq!(
            states,
            vec![
                CheckoutState::Clean,
                CheckoutState::Dirty,
                CheckoutState::Missing
            ]
        );
        assert_eq!(report.drift_count(), 0);
        assert_eq!(report.missing_count(), 1);
        assert!(report.components[1]
            .formatted_changes()
            .contains("untracked file"));

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["components"][1]["state"], "dirty");
        assert_eq!(json["components"][1]["changes"][0]["kind"], "untracked");
    }

    #[tokio::test]
    async fn test_other_tag_on_same_commit_is_not_drift() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().to_path_buf();
        for name in ["same", "moved", "unknown"] {
            std::fs::create_dir(root.join(name)).unwrap();
        }
        let moved_path = root.join("moved");
        let unknown_path = root.join("unknown");

        let mut mock = MockGitRunner::new();
        mock.expect_run()
            .withf(|_, command| matches!(command, GitCommand::HeadRefNames))
            .times(3)
            .returning(|_, _| Ok(CommandOutput::success("HEAD, tag: v1.0, tag: v1.0-rc\n")));
        mock.expect_run()
            .withf(|_, command| matches!(command, GitCommand::StatusPorcelain))
            .times(3)
            .returning(|_, _| Ok(CommandOutput::success("")));
        mock.expect_run()
            .withf(|_, command| {
                matches!(command, GitCommand::RevList { revision } if revision == "v1.0-rc")
            })
            .times(3)
            .returning(move |dir, _| {
                if dir == unknown_path {
                    Ok(CommandOutput::failure(128, "fatal: bad revision 'v1.0-rc'"))
                } else if dir == moved_path {
                    Ok(CommandOutput::success("0000000\n"))
                } else {
                    Ok(CommandOutput::success("abc1234\n"))
                }
            });
        mock.expect_run()
            .withf(|_, command| matches!(command, GitCommand::RevParseHead))
            .times(2)
            .returning(|_, _| Ok(CommandOutput::success("abc1234\n")));

        let components = ["same", "moved", "unknown"]
            .iter()
            .map(|name| {
                Component::new(
                    *name,
                    *name,
                    format!("https://example.com/{}.git", name),
                    Version::tag("v1.0-rc"),
                )
            })
            .collect();
        let sync = ManifestSync::new(Arc::new(mock), WorkspaceConfig::new(&root), components);

        let report = StatusCheckUseCase::new(&sync).execute(&[]).await.unwrap();

        let drift: Vec<bool> = report.components.iter().map(|c| c.drift).collect();
        assert_eq!(drift, vec![false, true, true]);
        assert_eq!(report.components[0].observed, Some(Version::tag("v1.0")));
    }
}
