use anyhow::Result;
use clap::Subcommand;
use std::path::PathBuf;

use super::{absolute_path, name_width, print_component_output, print_report};
use crate::application::use_cases::manifest_sync::{BulkReport, ManifestSync};

/// `metapin tag` subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum TagCommand {
    /// List tags in each component
    List {
        /// Components to list (all if omitted)
        components: Vec<String>,
    },

    /// Create a tag in the given components
    Create {
        /// Tag name
        name: String,

        /// Make an annotated tag (needs -m or -F)
        #[arg(short, long)]
        annotate: bool,

        /// Tag message
        #[arg(short, long)]
        message: Option<String>,

        /// Read the tag message from a file
        #[arg(short = 'F', long)]
        file: Option<PathBuf>,

        /// Components to tag (all if omitted)
        components: Vec<String>,
    },

    /// Delete a local tag
    Delete {
        /// Tag name
        name: String,

        /// Components to delete the tag in (all if omitted)
        components: Vec<String>,
    },

    /// Push a tag to origin
    Push {
        /// Tag name
        name: String,

        /// Replace an existing remote tag
        #[arg(short, long)]
        force: bool,

        /// Components to push the tag from (all if omitted)
        components: Vec<String>,
    },
}

impl TagCommand {
    pub async fn execute(&self, sync: &ManifestSync) -> Result<()> {
        let mut report = BulkReport::new();
        let result = match self {
            TagCommand::List { components } => {
                let selected = sync.select(components)?;
                let width = name_width(selected.iter().copied());
                for component in selected {
                    let output = sync.handle(component).await?.list_tags().await?;
                    print_component_output(&component.name, &output, width);
                }
                return Ok(());
            }
            TagCommand::Create {
                name,
                annotate,
                message,
                file,
                components,
            } => {
                let file = file.as_deref().map(absolute_path).transpose()?;
                sync.create_tag(
                    name,
                    *annotate,
                    message.as_deref(),
                    file.as_deref(),
                    components,
                    &mut report,
                )
                .await
            }
            TagCommand::Delete { name, components } => {
                sync.delete_tag(name, components, &mut report).await
            }
            TagCommand::Push {
                name,
                force,
                components,
            } => sync.push_tag(name, *force, components, &mut report).await,
        };

        print_report(&report);
        result?;
        Ok(())
    }
}
