//! Typed git invocations.
//!
//! Each operation is a variant with explicit fields; argument vectors are only
//! produced at the process boundary by [`GitCommand::to_args`], so refs, paths
//! and messages are never spliced into a shell string.

use crate::common::error::MetapinError;
use crate::common::result::MetapinResult;
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};

/// Message for an annotated tag or a commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageSource {
    /// `-m <message>`
    Inline(String),
    /// `-F <file>`
    File(PathBuf),
}

impl MessageSource {
    /// Require exactly one of `message` / `file`.
    pub fn exactly_one(
        message: Option<&str>,
        file: Option<&Path>,
        operation: &str,
    ) -> MetapinResult<Self> {
        match (message, file) {
            (Some(message), None) => Ok(Self::Inline(message.to_string())),
            (None, Some(file)) => Ok(Self::File(file.to_path_buf())),
            _ => Err(MetapinError::message_source(operation)),
        }
    }

    fn push_args(&self, args: &mut Vec<OsString>) {
        match self {
            MessageSource::Inline(message) => {
                args.push("-m".into());
                args.push(message.into());
            }
            MessageSource::File(file) => {
                args.push("-F".into());
                args.push(file.into());
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchOptions {
    pub all: bool,
    pub prune: bool,
    pub tags: bool,
    pub force: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiffOptions {
    pub name_only: bool,
    pub staged: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StashCommand {
    List,
    Pop,
    Apply,
    Push { message: Option<String> },
    Show { patch: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitCommand {
    Clone {
        remote: String,
        destination: PathBuf,
        recurse_submodules: bool,
    },
    Checkout {
        target: String,
        detach: bool,
    },
    /// `checkout --detach` at the current commit.
    DetachHead,
    ConfigSet {
        key: String,
        value: String,
    },
    /// `read-tree -mu HEAD`, re-materializing the tree under sparse rules.
    ReadTreeHead,
    ListBranches {
        all: bool,
    },
    ListTags,
    RevList {
        revision: String,
    },
    Stash(StashCommand),
    Diff {
        color: bool,
        options: DiffOptions,
    },
    ListUntracked,
    Fetch(FetchOptions),
    CreateBranch {
        name: String,
    },
    CreateTag {
        name: String,
        annotation: Option<MessageSource>,
    },
    DeleteBranch {
        name: String,
        force: bool,
    },
    DeleteTag {
        name: String,
    },
    PushTag {
        name: String,
        force: bool,
    },
    /// `show-branch remotes/origin/<name>`; exit status tells if it exists.
    ShowRemoteBranch {
        name: String,
    },
    StatusPorcelain,
    Add {
        path: String,
    },
    Unstage {
        path: String,
    },
    Commit {
        message: MessageSource,
    },
    Push {
        remote: String,
    },
    Pull,
    /// `cat-file -e <object>`; exit status tells if the object exists.
    ObjectExists {
        object: String,
    },
    LsRemote {
        remote: String,
        reference: String,
    },
    RevParseHead,
    DescribeAlways,
    /// `show -s --pretty=%D HEAD`: the ref names pointing at HEAD.
    HeadRefNames,
    RemoteUrl {
        remote: String,
    },
}

impl GitCommand {
    /// Argument vector passed to the git executable.
    pub fn to_args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = Vec::new();
        let mut push = |arg: &str| args.push(arg.into());

        match self {
            GitCommand::Clone {
                remote,
                destination,
                recurse_submodules,
            } => {
                push("clone");
                if *recurse_submodules {
                    push("--recurse-submodules");
                }
                push("--quiet");
                push(remote);
                args.push(destination.into());
            }
            GitCommand::Checkout { target, detach } => {
                push("checkout");
                if *detach {
                    push("--detach");
                }
                push("--quiet");
                push(target);
            }
            GitCommand::DetachHead => {
                push("checkout");
                push("--detach");
            }
            GitCommand::ConfigSet { key, value } => {
                push("config");
                push(key);
                push(value);
            }
            GitCommand::ReadTreeHead => {
                push("read-tree");
                push("-mu");
                push("HEAD");
            }
            GitCommand::ListBranches { all } => {
                push("branch");
                if *all {
                    push("-a");
                }
            }
            GitCommand::ListTags => push("tag"),
            GitCommand::RevList { revision } => {
                push("rev-list");
                push("-n");
                push("1");
                push(revision);
            }
            GitCommand::Stash(stash) => {
                push("stash");
                match stash {
                    StashCommand::List => push("list"),
                    StashCommand::Pop => push("pop"),
                    StashCommand::Apply => push("apply"),
                    StashCommand::Push { message } => {
                        push("push");
                        if let Some(message) = message {
                            push("-m");
                            push(message);
                        }
                    }
                    StashCommand::Show { patch } => {
                        push("show");
                        if *patch {
                            push("-p");
                            push("--color");
                        }
                    }
                }
            }
            GitCommand::Diff { color, options } => {
                push("diff");
                if *color {
                    push("--color");
                }
                if options.name_only {
                    push("--name-only");
                }
                if options.staged {
                    push("--staged");
                }
            }
            GitCommand::ListUntracked => {
                push("ls-files");
                push("--others");
                push("--exclude-standard");
            }
            GitCommand::Fetch(options) => {
                push("fetch");
                if options.all {
                    push("--all");
                }
                if options.prune {
                    push("--prune");
                }
                if options.tags {
                    push("--tags");
                }
                if options.force {
                    push("--force");
                }
            }
            GitCommand::CreateBranch { name } => {
                push("branch");
                push(name);
            }
            GitCommand::CreateTag { name, annotation } => {
                push("tag");
                if let Some(message) = annotation {
                    args.push("-a".into());
                    message.push_args(&mut args);
                }
                args.push(name.into());
            }
            GitCommand::DeleteBranch { name, force } => {
                push("branch");
                push(if *force { "-D" } else { "-d" });
                push(name);
            }
            GitCommand::DeleteTag { name } => {
                push("tag");
                push("-d");
                push(name);
            }
            GitCommand::PushTag { name, force } => {
                push("push");
                if *force {
                    push("--force");
                }
                push("origin");
                push(name);
            }
            GitCommand::ShowRemoteBranch { name } => {
                push("show-branch");
                push(&format!("remotes/origin/{}", name));
            }
            GitCommand::StatusPorcelain => {
                push("status");
                push("--porcelain=v2");
            }
            GitCommand::Add { path } => {
                push("add");
                push(path);
            }
            GitCommand::Unstage { path } => {
                push("reset");
                push("--");
                push(path);
            }
            GitCommand::Commit { message } => {
                args.push("commit".into());
                message.push_args(&mut args);
            }
            GitCommand::Push { remote } => {
                push("push");
                push("-u");
                push(remote);
            }
            GitCommand::Pull => push("pull"),
            GitCommand::ObjectExists { object } => {
                push("cat-file");
                push("-e");
                push(object);
            }
            GitCommand::LsRemote { remote, reference } => {
                push("ls-remote");
                push(remote);
                push(reference);
            }
            GitCommand::RevParseHead => {
                push("rev-parse");
                push("HEAD");
            }
            GitCommand::DescribeAlways => {
                push("describe");
                push("--always");
            }
            GitCommand::HeadRefNames => {
                push("show");
                push("-s");
                push("--pretty=%D");
                push("HEAD");
            }
            GitCommand::RemoteUrl { remote } => {
                push("remote");
                push("get-url");
                push(remote);
            }
        }

        args
    }
}

impl fmt::Display for GitCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let args: Vec<String> = self
            .to_args()
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        write!(f, "git {}", args.join(" "))
    }
}
