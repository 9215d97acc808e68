use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;

use super::{name_width, print_component_output, print_report};
use crate::application::use_cases::manifest_sync::{BulkReport, ManifestSync};

/// `metapin branch` subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum BranchCommand {
    /// List local branches in each component
    List {
        /// Include remote-tracking branches
        #[arg(short, long)]
        all: bool,

        /// Components to list (all if omitted)
        components: Vec<String>,
    },

    /// Create a branch in every component that has local changes
    Create {
        /// Branch name
        name: String,
    },

    /// Delete a branch in the given components
    Delete {
        /// Branch name
        name: String,

        /// Components to delete the branch in
        #[arg(required = true)]
        components: Vec<String>,

        /// Delete even if not fully merged
        #[arg(short, long)]
        force: bool,
    },

    /// Check out a branch in one component
    Switch {
        /// Component name
        component: String,

        /// Branch to check out
        branch: String,
    },
}

impl BranchCommand {
    pub async fn execute(&self, sync: &ManifestSync) -> Result<()> {
        match self {
            BranchCommand::List { all, components } => {
                let selected = sync.select(components)?;
                let width = name_width(selected.iter().copied());
                for component in selected {
                    let output = sync.handle(component).await?.list_branches(*all).await?;
                    print_component_output(&component.name, &output, width);
                }
                Ok(())
            }
            BranchCommand::Create { name } => {
                let mut report = BulkReport::new();
                let result = sync.create_branch_where_changed(name, &mut report).await;
                print_report(&report);
                result?;
                Ok(())
            }
            BranchCommand::Delete {
                name,
                components,
                force,
            } => {
                let mut report = BulkReport::new();
                let result = sync
                    .delete_branch(name, components, *force, &mut report)
                    .await;
                print_report(&report);
                result?;
                Ok(())
            }
            BranchCommand::Switch { component, branch } => {
                sync.switch_branch(component, branch).await?;
                println!("{}: switched to {}", component.bold(), branch.yellow());
                Ok(())
            }
        }
    }
}
