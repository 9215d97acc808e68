use anyhow::Result;
use clap::Subcommand;

use super::{name_width, print_component_output};
use crate::application::use_cases::manifest_sync::ManifestSync;
use crate::infrastructure::git::repository::RepositoryHandle;

/// `metapin stash` subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum StashCommand {
    /// List stash entries
    List {
        /// Components (all if omitted)
        components: Vec<String>,
    },

    /// Pop the latest stash entry
    Pop {
        /// Components (all if omitted)
        components: Vec<String>,
    },

    /// Apply the latest stash entry, keeping it
    Apply {
        /// Components (all if omitted)
        components: Vec<String>,
    },

    /// Stash local changes
    Push {
        /// Stash message
        #[arg(short, long)]
        message: Option<String>,

        /// Components (all if omitted)
        components: Vec<String>,
    },

    /// Show the latest stash entry
    Show {
        /// Show the full patch
        #[arg(short, long)]
        patch: bool,

        /// Components (all if omitted)
        components: Vec<String>,
    },
}

impl StashCommand {
    fn components(&self) -> &[String] {
        match self {
            StashCommand::List { components }
            | StashCommand::Pop { components }
            | StashCommand::Apply { components }
            | StashCommand::Push { components, .. }
            | StashCommand::Show { components, .. } => components,
        }
    }

    async fn run_on(&self, repo: &RepositoryHandle) -> Result<String> {
        let output = match self {
            StashCommand::List { .. } => repo.list_stash().await?,
            StashCommand::Pop { .. } => repo.pop_stash().await?,
            StashCommand::Apply { .. } => repo.apply_stash().await?,
            StashCommand::Push { message, .. } => repo.push_stash(message.as_deref()).await?,
            StashCommand::Show { patch, .. } => repo.show_stash(*patch).await?,
        };
        Ok(output)
    }

    pub async fn execute(&self, sync: &ManifestSync) -> Result<()> {
        let selected = sync.select(self.components())?;
        let width = name_width(selected.iter().copied());
        for component in selected {
            let repo = sync.handle(component).await?;
            let output = self.run_on(&repo).await?;
            if !output.is_empty() {
                print_component_output(&component.name, &output, width);
            }
        }
        Ok(())
    }
}
