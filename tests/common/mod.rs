//! Common test utilities and helpers
//!
//! Integration tests drive a real `git`. Every helper that needs it is
//! guarded by [`git_available`] so machines without git skip instead of fail.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// Whether a `git` executable is on `PATH`.
pub fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Run git in `dir` with a fixed identity, panicking on failure.
pub fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(["-c", "user.name=Test User", "-c", "user.email=test@example.com"])
        .args(["-c", "init.defaultBranch=main", "-c", "commit.gpgsign=false"])
        .args(args)
        .current_dir(dir)
        .output()
        .expect("failed to run git");
    assert!(
        output.status.success(),
        "git {:?} failed in {}: {}",
        args,
        dir.display(),
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// Commit `file` with `content` and return the new commit id.
pub fn commit_file(repo: &Path, file: &str, content: &str, message: &str) -> String {
    std::fs::write(repo.join(file), content).expect("failed to write file");
    git(repo, &["add", file]);
    git(repo, &["commit", "-q", "-m", message]);
    git(repo, &["rev-parse", "HEAD"])
}

/// Upstream repository used as a component remote
pub struct Upstream {
    pub path: PathBuf,
    /// Commit tagged `v1.0`
    pub tagged_commit: String,
    /// Tip of `main`, one commit after the tag
    pub head_commit: String,
}

/// Create an upstream repo on `main` with two commits; `v1.0` tags the
/// first one so a checkout of the tag is not decorated by any branch.
pub fn create_upstream(parent: &Path, name: &str) -> Upstream {
    let path = parent.join(name);
    std::fs::create_dir_all(&path).expect("failed to create upstream dir");
    git(&path, &["init", "-q"]);
    git(&path, &["symbolic-ref", "HEAD", "refs/heads/main"]);

    let tagged_commit = commit_file(&path, "README.md", "# component\n", "initial");
    git(&path, &["tag", "v1.0"]);
    let head_commit = commit_file(&path, "src.txt", "source\n", "second");

    Upstream {
        path,
        tagged_commit,
        head_commit,
    }
}

/// Clone `upstream` into `dest` and give the clone a local identity.
pub fn clone_upstream(upstream: &Upstream, dest: &Path) {
    let parent = dest.parent().expect("clone destination has a parent");
    std::fs::create_dir_all(parent).expect("failed to create clone parent");
    git(
        parent,
        &[
            "clone",
            "-q",
            upstream.path.to_str().expect("utf-8 path"),
            dest.to_str().expect("utf-8 path"),
        ],
    );
    configure_identity(dest);
}

pub fn configure_identity(repo: &Path) {
    git(repo, &["config", "user.name", "Test User"]);
    git(repo, &["config", "user.email", "test@example.com"]);
    git(repo, &["config", "commit.gpgsign", "false"]);
}

/// Temporary workspace root holding a `components.yaml`.
pub fn create_workspace(manifest: &str) -> TempDir {
    let temp = TempDir::new().expect("failed to create temp dir");
    std::fs::write(temp.path().join("components.yaml"), manifest)
        .expect("failed to write manifest");
    temp
}

/// Manifest entry for a component cloned from `upstream`.
pub fn component_yaml(name: &str, local: &str, upstream: &Path, pin: &str) -> String {
    format!(
        "{}:\n  local: {}\n  remote: {}\n  {}\n",
        name,
        local,
        upstream.display(),
        pin
    )
}
