use super::manifest_sync::{BulkReport, ManifestSync, SkipReason};
use crate::common::result::MetapinResult;
use tracing::info;

/// クローンの設定
#[derive(Debug, Clone, Default)]
pub struct CloneComponentsConfig {
    /// `develop` ブランチが指定されていればクローン後にチェックアウトする
    pub use_develop: bool,
}

/// 未クローンのコンポーネントをクローンするユースケース
pub struct CloneComponentsUseCase<'a> {
    sync: &'a ManifestSync,
    config: CloneComponentsConfig,
}

impl<'a> CloneComponentsUseCase<'a> {
    pub fn new(sync: &'a ManifestSync, config: CloneComponentsConfig) -> Self {
        Self { sync, config }
    }

    /// ローカルパスが存在しないコンポーネントをクローンする
    ///
    /// 失敗した時点で中断する。途中まで作られたディレクトリは残る。
    pub async fn clone_missing(&self, report: &mut BulkReport) -> MetapinResult<()> {
        for component in self.sync.components() {
            let repo = self.sync.handle(component).await?;
            if repo.exists() {
                report.skip(&component.name, SkipReason::AlreadyCloned);
                continue;
            }

            info!("cloning {} into {}", component.name, repo.local_path().display());
            repo.clone(&component.version, component.recurses_submodules())
                .await?;

            if let Some(sparse) = &component.sparse {
                repo.sparsify(sparse).await?;
            }

            let mut detail = component.version.to_string();
            if self.config.use_develop {
                if let Some(develop) = &component.develop {
                    repo.checkout(develop, false).await?;
                    detail = format!("{} (develop {})", detail, develop);
                }
            }
            report.record(&component.name, detail);
        }
        Ok(())
    }
}
