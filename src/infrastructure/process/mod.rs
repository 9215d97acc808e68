pub mod git_runner;

pub use git_runner::{CommandOutput, GitCli, GitRunner};

#[cfg(test)]
pub use git_runner::MockGitRunner;
