//! Classifies `git show -s --pretty=%D HEAD` output.

use crate::common::error::MetapinError;
use crate::common::result::MetapinResult;
use std::path::Path;

/// Where HEAD points, as read from the ref-name decoration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeadState {
    Attached { name: String },
    DetachedTag { name: String },
    DetachedBranch { name: String },
    /// Bare commit; the caller asks `rev-parse HEAD` for the id.
    DetachedCommit,
    /// Shallow history; the caller asks `describe --always` for the id.
    Grafted,
}

type Matcher = fn(&str) -> Option<HeadState>;

/// Evaluated in order, first match wins.
const MATCHERS: &[Matcher] = &[attached, detached_ref, detached_commit, grafted];

fn attached(line: &str) -> Option<HeadState> {
    let rest = line.strip_prefix("HEAD ->")?;
    let name = rest.split(',').next().unwrap_or_default().trim();
    Some(HeadState::Attached {
        name: name.to_string(),
    })
}

fn detached_ref(line: &str) -> Option<HeadState> {
    let rest = line.strip_prefix("HEAD,")?;
    let second = rest.split(',').next().unwrap_or_default().trim();

    if let Some(tag) = second.strip_prefix("tag:") {
        return Some(HeadState::DetachedTag {
            name: tag.trim().to_string(),
        });
    }

    let name = line.split_whitespace().last().unwrap_or_default();
    Some(HeadState::DetachedBranch {
        name: name.to_string(),
    })
}

fn detached_commit(line: &str) -> Option<HeadState> {
    (line.trim() == "HEAD").then_some(HeadState::DetachedCommit)
}

fn grafted(line: &str) -> Option<HeadState> {
    line.starts_with("grafted").then_some(HeadState::Grafted)
}

/// Classify the first line of `raw`; `path` only labels the error.
pub fn classify(raw: &str, path: &Path) -> MetapinResult<HeadState> {
    let line = raw.lines().next().unwrap_or_default();
    MATCHERS
        .iter()
        .find_map(|matcher| matcher(line))
        .ok_or_else(|| MetapinError::unclassifiable_version(path, raw.trim()))
}
