pub mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::env;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::process::exit;
use std::sync::Arc;
use std::time::Duration;

use crate::application::use_cases::clone_components::{
    CloneComponentsConfig, CloneComponentsUseCase,
};
use crate::application::use_cases::manifest_sync::{BulkReport, ManifestSync, SkipReason};
use crate::common::result::MetapinResult;
use crate::domain::entities::manifest::Manifest;
use crate::domain::entities::workspace::{Workspace, WorkspaceConfig};
use crate::infrastructure::filesystem::manifest_store::ManifestStore;
use crate::infrastructure::git::command::{DiffOptions, FetchOptions, MessageSource};
use crate::infrastructure::git::repository::RepositoryHandle;
use crate::infrastructure::process::git_runner::GitCli;

use commands::{
    absolute_path, name_width, print_component_output, print_report, BranchCommand,
    CompareCommand, OutputFormat, StashCommand, StatusCommand, TagCommand,
};

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("GIT_HASH"),
    ", built ",
    env!("BUILD_DATE"),
    ")"
);

/// metapin - keep a meta-repository of pinned git components in sync
#[derive(Debug, Parser)]
#[command(name = "metapin")]
#[command(about = "Keep a meta-repository of pinned git components in sync with its manifest")]
#[command(version, long_version = LONG_VERSION)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Working directory (defaults to current directory)
    #[arg(short = 'C', long, global = true)]
    pub directory: Option<PathBuf>,

    /// Manifest file (defaults to components.yaml at the workspace root)
    #[arg(long, global = true, env = "METAPIN_MANIFEST")]
    pub manifest: Option<PathBuf>,

    /// Per-command git timeout in seconds
    #[arg(long, global = true, env = "METAPIN_GIT_TIMEOUT", value_name = "SECS")]
    pub timeout: Option<u64>,

    /// git executable
    #[arg(long = "git", global = true, env = "METAPIN_GIT", default_value = "git")]
    pub git_executable: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Clone every component that is not checked out yet
    Clone {
        /// Check out each component's develop branch after cloning
        #[arg(long)]
        develop: bool,
    },

    /// Show the checked-out version and local changes of each component
    Status {
        /// Output format (text, json, yaml)
        #[arg(short, long, value_enum, default_value = "text")]
        output: OutputFormat,

        /// Components to check (all if omitted)
        components: Vec<String>,
    },

    /// Compare pinned and checked-out versions
    Compare {
        /// Components to compare (all if omitted)
        components: Vec<String>,
    },

    /// Pull every component that is on a branch
    PullAll,

    /// Pull the given components
    Pull {
        /// Components to pull (all if omitted)
        components: Vec<String>,
    },

    /// Fetch from remotes
    Fetch {
        /// Fetch all remotes
        #[arg(long)]
        all: bool,

        /// Prune deleted remote refs
        #[arg(short, long)]
        prune: bool,

        /// Fetch all tags
        #[arg(short, long)]
        tags: bool,

        /// Force-update local refs
        #[arg(short, long)]
        force: bool,

        /// Components to fetch (all if omitted)
        components: Vec<String>,
    },

    /// Show diffs of local changes
    Diff {
        /// Show only file names
        #[arg(long)]
        name_only: bool,

        /// Diff the index instead of the working tree
        #[arg(long)]
        staged: bool,

        /// Components to diff (all if omitted)
        components: Vec<String>,
    },

    /// Check out a branch, tag or commit
    Checkout {
        /// Ref to check out
        reference: String,

        /// Components (all if omitted)
        components: Vec<String>,

        /// Detach HEAD
        #[arg(long)]
        detach: bool,
    },

    /// Branch operations
    Branch {
        #[command(subcommand)]
        command: BranchCommand,
    },

    /// Tag operations
    Tag {
        #[command(subcommand)]
        command: TagCommand,
    },

    /// Stash operations
    Stash {
        #[command(subcommand)]
        command: StashCommand,
    },

    /// Stage files in a component
    Stage {
        /// Component name
        component: String,

        /// Paths relative to the component
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Unstage files in a component
    Unstage {
        /// Component name
        component: String,

        /// Paths relative to the component
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Commit staged files
    Commit {
        /// Commit message
        #[arg(short, long)]
        message: Option<String>,

        /// Read the commit message from a file
        #[arg(short = 'F', long)]
        file: Option<PathBuf>,

        /// Components to commit in
        #[arg(required = true)]
        components: Vec<String>,
    },

    /// Push the current branch of the given components
    Push {
        /// Components to push
        #[arg(required = true)]
        components: Vec<String>,
    },

    /// Re-pin every component to its checked-out version
    Save {
        /// Write to this file instead of the workspace manifest
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// CLI application runner
pub struct CliApp {
    cli: Cli,
}

impl CliApp {
    pub fn new() -> Self {
        Self { cli: Cli::parse() }
    }

    pub fn from_cli(cli: Cli) -> Self {
        Self { cli }
    }

    pub async fn run(self) -> anyhow::Result<()> {
        // colored already turns itself off when stdout is not a terminal
        if self.cli.no_color {
            colored::control::set_override(false);
        }

        // Change directory if specified
        if let Some(ref dir) = self.cli.directory {
            env::set_current_dir(dir)?;
        }

        // Handle the command
        match self.handle_command().await {
            Ok(_) => Ok(()),
            Err(e) => {
                eprintln!("{} {}", "Error:".red().bold(), e);
                exit(1);
            }
        }
    }

    async fn handle_command(&self) -> anyhow::Result<()> {
        let workspace = self.load_workspace().await?;
        let sync = self.manifest_sync(&workspace);

        match &self.cli.command {
            Commands::Clone { develop } => self.handle_clone_command(&sync, *develop).await,
            Commands::Status { output, components } => {
                StatusCommand::new(components.clone(), *output)
                    .execute(&sync)
                    .await
            }
            Commands::Compare { components } => {
                CompareCommand::new(components.clone()).execute(&sync).await
            }
            Commands::PullAll => {
                let mut report = BulkReport::new();
                let result = sync.pull_all(&mut report).await;
                print_report(&report);
                Ok(result?)
            }
            Commands::Pull { components } => {
                self.for_each_component(&sync, components, |repo| async move {
                    repo.pull().await
                })
                .await
            }
            Commands::Fetch {
                all,
                prune,
                tags,
                force,
                components,
            } => {
                let options = FetchOptions {
                    all: *all,
                    prune: *prune,
                    tags: *tags,
                    force: *force,
                };
                self.for_each_component(&sync, components, move |repo| async move {
                    repo.fetch(options).await
                })
                .await
            }
            Commands::Diff {
                name_only,
                staged,
                components,
            } => {
                let options = DiffOptions {
                    name_only: *name_only,
                    staged: *staged,
                };
                self.for_each_component(&sync, components, move |repo| async move {
                    repo.run_diff(options).await
                })
                .await
            }
            Commands::Checkout {
                reference,
                components,
                detach,
            } => {
                let mut report = BulkReport::new();
                let result = self
                    .handle_checkout_command(&sync, reference, components, *detach, &mut report)
                    .await;
                print_report(&report);
                result
            }
            Commands::Branch { command } => command.execute(&sync).await,
            Commands::Tag { command } => command.execute(&sync).await,
            Commands::Stash { command } => command.execute(&sync).await,
            Commands::Stage { component, paths } => {
                let repo = sync.handle(sync.find(component)?).await?;
                for path in paths {
                    repo.stage_file(path).await?;
                    println!("+ {}: {}", component.bold(), path.green());
                }
                Ok(())
            }
            Commands::Unstage { component, paths } => {
                let repo = sync.handle(sync.find(component)?).await?;
                for path in paths {
                    repo.unstage_file(path).await?;
                    println!("- {}: {}", component.bold(), path.red());
                }
                Ok(())
            }
            Commands::Commit {
                message,
                file,
                components,
            } => {
                let file = file.as_deref().map(absolute_path).transpose()?;
                let mut report = BulkReport::new();
                let result = self
                    .handle_commit_command(
                        &sync,
                        message.as_deref(),
                        file.as_deref(),
                        components,
                        &mut report,
                    )
                    .await;
                print_report(&report);
                result
            }
            Commands::Push { components } => {
                let mut report = BulkReport::new();
                let result = sync.push_branches(components, &mut report).await;
                print_report(&report);
                Ok(result?)
            }
            Commands::Save { output } => self.handle_save_command(&sync, &workspace, output).await,
        }
    }

    async fn handle_clone_command(&self, sync: &ManifestSync, develop: bool) -> Result<()> {
        println!("{} Cloning components...", "::".blue().bold());

        let config = CloneComponentsConfig {
            use_develop: develop,
        };
        let mut report = BulkReport::new();
        let result = CloneComponentsUseCase::new(sync, config)
            .clone_missing(&mut report)
            .await;
        print_report(&report);
        result?;

        println!("{} Clone completed!", "✓".green().bold());
        Ok(())
    }

    async fn handle_checkout_command(
        &self,
        sync: &ManifestSync,
        reference: &str,
        components: &[String],
        detach: bool,
        report: &mut BulkReport,
    ) -> Result<()> {
        for component in sync.select(components)? {
            sync.handle(component)
                .await?
                .checkout(reference, detach)
                .await?;
            report.record(&component.name, reference);
        }
        Ok(())
    }

    async fn handle_commit_command(
        &self,
        sync: &ManifestSync,
        message: Option<&str>,
        file: Option<&Path>,
        components: &[String],
        report: &mut BulkReport,
    ) -> Result<()> {
        let selected = sync.select(components)?;
        // validate the message source before touching any component
        MessageSource::exactly_one(message, file, "commit")?;

        for component in selected {
            let repo = sync.handle(component).await?;
            let staged = repo.get_staged_files().await?;
            if staged.is_empty() {
                report.skip(&component.name, SkipReason::NoChanges);
                continue;
            }
            repo.commit_files(message, file).await?;
            report.record(&component.name, staged.join(", "));
        }
        Ok(())
    }

    async fn handle_save_command(
        &self,
        sync: &ManifestSync,
        workspace: &Workspace,
        output: &Option<PathBuf>,
    ) -> Result<()> {
        let mut manifest: Manifest = workspace.manifest.clone();
        manifest.apply_updates(sync.save().await?);

        let target = match output {
            Some(path) => absolute_path(path)?,
            None => workspace.config.manifest_path.clone(),
        };
        let backup = ManifestStore::new().write_manifest(&target, &manifest).await?;

        println!("{} Saved {}", "✓".green().bold(), target.display());
        if let Some(backup) = backup {
            println!("  previous manifest kept as {}", backup.display());
        }
        Ok(())
    }

    /// Run one read-only operation per selected component and print its output.
    async fn for_each_component<F, Fut>(
        &self,
        sync: &ManifestSync,
        components: &[String],
        operation: F,
    ) -> Result<()>
    where
        F: Fn(RepositoryHandle) -> Fut,
        Fut: Future<Output = MetapinResult<String>>,
    {
        let selected = sync.select(components)?;
        let width = name_width(selected.iter().copied());
        for component in selected {
            let repo = sync.handle(component).await?;
            let output = operation(repo).await?;
            if !output.is_empty() {
                print_component_output(&component.name, &output, width);
            }
        }
        Ok(())
    }

    fn workspace_config(&self) -> Result<WorkspaceConfig> {
        let current_dir = env::current_dir()?;

        let (root, manifest_path) = match &self.cli.manifest {
            Some(manifest) => {
                let manifest_path = absolute_path(manifest)?;
                let root = manifest_path
                    .parent()
                    .map(|p| p.to_path_buf())
                    .unwrap_or_else(|| current_dir.clone());
                (root, manifest_path)
            }
            None => {
                // Discover workspace root by searching upward for the manifest
                let root = Workspace::discover_workspace_root(&current_dir).ok_or_else(|| {
                    anyhow::anyhow!(
                        "No metapin workspace found. Searched upward from {} for components.yaml or components.yml.",
                        current_dir.display()
                    )
                })?;
                let manifest_path = Workspace::find_manifest_file(&root)
                    .ok_or_else(|| anyhow::anyhow!("No manifest in {}", root.display()))?;
                (root, manifest_path)
            }
        };

        Ok(WorkspaceConfig::new(root)
            .with_manifest_path(manifest_path)
            .with_git_executable(self.cli.git_executable.clone())
            .with_command_timeout(self.cli.timeout.map(Duration::from_secs)))
    }

    /// Load workspace from the current directory or any parent directory
    async fn load_workspace(&self) -> anyhow::Result<Workspace> {
        let config = self.workspace_config()?;
        let manifest = ManifestStore::new()
            .read_manifest(&config.manifest_path)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to load manifest: {}", e))?;

        tracing::debug!(
            "workspace root {}, {} components",
            config.root.display(),
            manifest.components.len()
        );
        Ok(Workspace::new(config, manifest))
    }

    fn manifest_sync(&self, workspace: &Workspace) -> ManifestSync {
        let runner = Arc::new(GitCli::from_config(&workspace.config));
        ManifestSync::from_workspace(runner, workspace)
    }
}

impl Default for CliApp {
    fn default() -> Self {
        Self::new()
    }
}
