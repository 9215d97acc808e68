//! # metapin - meta-repository manager
//!
//! `metapin` manages a *meta-repository*: a directory tree made of independent git
//! repositories (components), each pinned to a branch, tag or commit in a single
//! `components.yaml` manifest. It clones missing components, reports drift between the
//! manifest and what is checked out, and runs branch/tag/stash/commit operations across
//! many components at once.
//!
//! ## Quick Start
//!
//! 1. Describe the components in `components.yaml` at the workspace root:
//!
//! ```yaml
//! env:
//!   local: ./@env
//!   remote: ../ESMA_env.git
//!   branch: main
//! cmake:
//!   local: ./@cmake
//!   remote: git@github.com:org/ESMA_cmake.git
//!   tag: v3.28.0
//!   sparse: ./config/cmake.sparse
//! ```
//!
//! 2. Clone everything:
//!
//! ```bash
//! metapin clone
//! ```
//!
//! 3. Check where each component is:
//!
//! ```bash
//! metapin status
//! metapin compare
//! ```
//!
//! ## Architecture
//!
//! The crate is organized using clean architecture principles:
//!
//! - [`domain`]: components, versions, the manifest and the workspace
//! - [`application`]: bulk operations over the manifest ([`application::ManifestSync`])
//! - [`infrastructure`]: git invocations, output interpretation and manifest I/O
//! - [`presentation`]: CLI interface and user interaction
//! - [`common`]: Shared utilities and error handling
//!
//! git is always driven through its command line. Every invocation is a typed
//! [`infrastructure::git::GitCommand`] executed by a [`infrastructure::process::GitRunner`],
//! which is the seam tests replace with a mock.
//!
//! ## Error Handling
//!
//! - [`common::error::MetapinError`]: Main error type with detailed context
//! - [`common::result::MetapinResult`]: Type alias for `Result<T, MetapinError>`
//!
//! ## Examples
//!
//! ```rust,no_run
//! use metapin::application::{BulkReport, ManifestSync};
//! use metapin::domain::entities::{Workspace, WorkspaceConfig};
//! use metapin::infrastructure::{GitCli, ManifestStore};
//! use std::sync::Arc;
//!
//! # async fn example() -> metapin::Result<()> {
//! let config = WorkspaceConfig::new("/work/model");
//! let manifest = ManifestStore::new().read_manifest(&config.manifest_path).await?;
//! let workspace = Workspace::new(config.clone(), manifest);
//!
//! let sync = ManifestSync::from_workspace(Arc::new(GitCli::from_config(&config)), &workspace);
//! let mut report = BulkReport::new();
//! sync.pull_all(&mut report).await?;
//!
//! for skipped in &report.skipped {
//!     println!("{} not pulled: {}", skipped.component, skipped.reason);
//! }
//! # Ok(())
//! # }
//! ```

// Documentation attributes
#![deny(rustdoc::broken_intra_doc_links)]

pub mod application;
pub mod common;
pub mod domain;
pub mod infrastructure;
pub mod presentation;

// Re-export commonly used types for convenience
pub use crate::common::error::MetapinError;
pub use crate::common::result::MetapinResult as Result;
