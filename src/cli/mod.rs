//! Command-line interface for gitlet
//!
//! This module defines the CLI structure using clap derive macros.
//! Each command group is implemented in its own submodule.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::error::{Error, Result};
use crate::output::OutputOptions;
use crate::repository::Repository;

mod branch;
mod checkout;
mod commit;
mod history;
mod init;
mod merge;
mod remote;
mod stage;
mod status;

/// gitlet - a small local snapshot version-control system
#[derive(Parser, Debug)]
#[command(name = "gitlet")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Working-tree root of the repository (defaults to current directory)
    #[arg(long, global = true, env = "GITLET_DIR")]
    pub repo: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a repository in the working directory
    Init,

    /// Stage a file for the next commit
    Add {
        /// File to stage
        file: String,
    },

    /// Record staged changes as a new commit
    Commit {
        /// Commit message
        message: String,
    },

    /// Unstage a file, or stage its removal if it is tracked
    Rm {
        /// File to remove
        file: String,
    },

    /// Show first-parent history from HEAD
    Log,

    /// Show every commit ever made
    GlobalLog,

    /// Print ids of commits with the given message
    Find {
        /// Exact commit message
        message: String,
    },

    /// Show branches, staged changes and untracked files
    Status,

    /// Switch branches, or restore a file
    ///
    /// `checkout <branch>`, `checkout -- <file>`, `checkout <commit> -- <file>`
    Checkout {
        /// Branch name, or commit id (prefix) when a file follows `--`
        target: Option<String>,

        /// File to restore
        #[arg(last = true)]
        file: Option<String>,
    },

    /// Create a branch at HEAD
    Branch {
        /// Branch name
        name: String,
    },

    /// Delete a branch pointer
    RmBranch {
        /// Branch name
        name: String,
    },

    /// Check out a commit and move the current branch to it
    Reset {
        /// Commit id (prefix)
        commit: String,
    },

    /// Merge another branch into the current branch
    Merge {
        /// Branch to merge
        branch: String,
    },

    /// Register another repository's .gitlet directory
    AddRemote {
        /// Remote name
        name: String,

        /// Path to the remote's .gitlet directory
        path: PathBuf,
    },

    /// Forget a remote
    RmRemote {
        /// Remote name
        name: String,
    },

    /// Send the current head to a remote branch
    Push {
        remote: String,
        branch: String,
    },

    /// Copy a remote branch into <remote>/<branch>
    Fetch {
        remote: String,
        branch: String,
    },

    /// Fetch a remote branch, then merge it
    Pull {
        remote: String,
        branch: String,
    },
}

/// Global flags shared by every command
#[derive(Debug, Clone)]
pub struct CommonOptions {
    pub repo: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

impl CommonOptions {
    pub fn output(&self) -> OutputOptions {
        OutputOptions {
            json: self.json,
            quiet: self.quiet,
        }
    }

    /// Working-tree root: `--repo` or the current directory.
    pub fn work_root(&self) -> Result<PathBuf> {
        match &self.repo {
            Some(path) => Ok(path.clone()),
            None => Ok(std::env::current_dir()?),
        }
    }

    pub fn open(&self) -> Result<Repository> {
        Repository::open(&self.work_root()?)
    }
}

impl Cli {
    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        let common = CommonOptions {
            repo: self.repo,
            json: self.json,
            quiet: self.quiet,
        };

        match self.command {
            Commands::Init => init::run(&common),
            Commands::Add { file } => stage::run_add(&common, &file),
            Commands::Rm { file } => stage::run_rm(&common, &file),
            Commands::Commit { message } => commit::run(&common, &message),
            Commands::Log => history::run_log(&common),
            Commands::GlobalLog => history::run_global_log(&common),
            Commands::Find { message } => history::run_find(&common, &message),
            Commands::Status => status::run(&common),
            Commands::Checkout { target, file } => match (target, file) {
                (Some(branch), None) => checkout::run_branch(&common, &branch),
                (commit, Some(file)) => checkout::run_file(&common, commit.as_deref(), &file),
                (None, None) => Err(Error::InvalidArgument(
                    "checkout needs a branch, `-- <file>` or `<commit> -- <file>`".to_string(),
                )),
            },
            Commands::Branch { name } => branch::run_create(&common, &name),
            Commands::RmBranch { name } => branch::run_remove(&common, &name),
            Commands::Reset { commit } => checkout::run_reset(&common, &commit),
            Commands::Merge { branch } => merge::run(&common, &branch),
            Commands::AddRemote { name, path } => remote::run_add(&common, &name, path),
            Commands::RmRemote { name } => remote::run_remove(&common, &name),
            Commands::Push { remote, branch } => remote::run_push(&common, &remote, &branch),
            Commands::Fetch { remote, branch } => remote::run_fetch(&common, &remote, &branch),
            Commands::Pull { remote, branch } => remote::run_pull(&common, &remote, &branch),
        }
    }
}
