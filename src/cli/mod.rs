//! Command-line interface for goaltree
//!
//! This module defines the CLI structure using clap derive macros.
//! Command implementations live in submodules.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::error::Result;
use crate::goal::GoalId;
use crate::lock::FileLock;
use crate::output::{HumanOutput, OutputOptions};
use crate::storage::{Loaded, Storage};
use crate::store::GoalStore;

mod goal;
mod init;
mod report;

/// goaltree - hierarchical goal tracking
///
/// Track goals and their sub-goals, attach notes, issues and resources,
/// and watch completion roll up the tree.
#[derive(Parser, Debug)]
#[command(name = "goaltree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Goals data file (overrides the configured one)
    #[arg(long, global = true, env = "GOALTREE_FILE")]
    pub file: Option<PathBuf>,

    /// Configuration file (defaults to ./.goaltree.toml, then the user config)
    #[arg(long, global = true, env = "GOALTREE_CONFIG")]
    pub config: Option<PathBuf>,

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
    /// Write a default .goaltree.toml in the current directory
    Init {
        /// Overwrite an existing configuration file
        #[arg(long)]
        force: bool,
    },

    /// Add a top-level goal, or a sub-goal with --parent
    Add {
        /// Goal title
        title: String,

        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due: Option<String>,

        /// Parent goal ID
        #[arg(long)]
        parent: Option<GoalId>,
    },

    /// Show a goal's details
    Show {
        /// Goal ID
        id: GoalId,
    },

    /// Mark a goal complete, or incomplete if it already is
    Toggle {
        /// Goal ID
        id: GoalId,
    },

    /// Mark a goal complete (all sub-goals must be complete)
    Done {
        /// Goal ID
        id: GoalId,
    },

    /// Mark a goal incomplete, reopening every ancestor
    Reopen {
        /// Goal ID
        id: GoalId,
    },

    /// Edit a goal's title or due date
    Edit {
        /// Goal ID
        id: GoalId,

        /// New title
        #[arg(long)]
        title: Option<String>,

        /// New due date (YYYY-MM-DD)
        #[arg(long, conflicts_with = "clear_due")]
        due: Option<String>,

        /// Remove the due date
        #[arg(long)]
        clear_due: bool,
    },

    /// Delete a goal and all of its sub-goals
    Rm {
        /// Goal ID
        id: GoalId,
    },

    /// Attach a note to a goal
    Note {
        /// Goal ID
        id: GoalId,

        /// Note text
        #[arg(required = true)]
        text: Vec<String>,
    },

    /// Record an issue on a goal
    Issue {
        /// Goal ID
        id: GoalId,

        /// Issue text
        #[arg(required = true)]
        text: Vec<String>,
    },

    /// Attach a resource (link, book, ...) to a goal
    Resource {
        /// Goal ID
        id: GoalId,

        /// Resource text
        #[arg(required = true)]
        text: Vec<String>,
    },

    /// Attach an annotation of the given kind: note, issue or resource
    Annotate {
        /// Goal ID
        id: GoalId,

        /// Annotation kind: note, issue, resource
        kind: String,

        /// Annotation text
        #[arg(required = true)]
        text: Vec<String>,
    },

    /// Show progress for every goal
    Progress,

    /// Show completed goals, oldest first
    History,
}

/// Flags shared by every command.
#[derive(Debug, Clone)]
pub struct GlobalOptions {
    pub file: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

impl GlobalOptions {
    pub fn output(&self) -> OutputOptions {
        OutputOptions {
            json: self.json,
            quiet: self.quiet,
        }
    }
}

/// Loaded state for a single command.
pub(crate) struct GoalContext {
    pub config: Config,
    pub storage: Storage,
    pub store: GoalStore,
    unreadable: Option<String>,
    set_aside: Option<PathBuf>,
    lock: Option<FileLock>,
}

impl GoalContext {
    /// Persist the store; the single save point of a mutating command.
    ///
    /// A document that failed to load is moved aside first instead of being
    /// overwritten.
    pub fn save(&mut self) -> Result<()> {
        if self.unreadable.is_some() && self.set_aside.is_none() && self.storage.exists() {
            self.set_aside = Some(self.storage.set_aside()?);
        }
        match &self.lock {
            Some(lock) => self.storage.save_locked(&self.store, lock),
            None => self.storage.save(&self.store),
        }
    }

    pub fn push_warnings(&self, human: &mut HumanOutput) {
        if let Some(reason) = &self.unreadable {
            human.push_warning(format!(
                "could not read {} ({reason}); started with no goals",
                self.storage.data_file().display()
            ));
        }
        if let Some(path) = &self.set_aside {
            human.push_warning(format!("previous contents kept in {}", path.display()));
        }
    }
}

/// Load goals for a command that only reads them.
pub(crate) fn load_context(global: &GlobalOptions) -> Result<GoalContext> {
    open_context(global, false)
}

/// Load goals for a command that saves them, holding the document lock
/// until the context is dropped.
pub(crate) fn load_context_for_update(global: &GlobalOptions) -> Result<GoalContext> {
    open_context(global, true)
}

fn open_context(global: &GlobalOptions, for_update: bool) -> Result<GoalContext> {
    let cwd = std::env::current_dir()?;
    let config = Config::resolve(global.config.as_deref(), &cwd)?;
    let data_file = global
        .file
        .clone()
        .unwrap_or_else(|| config.data_file.clone());
    let storage = Storage::new(data_file).with_lock_timeout(config.storage.lock_timeout_ms);

    let lock = if for_update {
        Some(storage.lock()?)
    } else {
        None
    };
    let Loaded { store, unreadable } = storage.load();
    Ok(GoalContext {
        config,
        storage,
        store,
        unreadable,
        set_aside: None,
        lock,
    })
}

impl Cli {
    /// Run the CLI command
    pub fn run(self) -> Result<()> {
        let global = GlobalOptions {
            file: self.file,
            config: self.config,
            json: self.json,
            quiet: self.quiet,
        };

        match self.command {
            Commands::Init { force } => init::run(init::InitOptions { force, global }),
            Commands::Add { title, due, parent } => goal::run_add(goal::AddOptions {
                title,
                due,
                parent,
                global,
            }),
            Commands::Show { id } => goal::run_show(id, global),
            Commands::Toggle { id } => {
                goal::run_completion(id, goal::CompletionAction::Toggle, global)
            }
            Commands::Done { id } => {
                goal::run_completion(id, goal::CompletionAction::Complete, global)
            }
            Commands::Reopen { id } => {
                goal::run_completion(id, goal::CompletionAction::Reopen, global)
            }
            Commands::Edit {
                id,
                title,
                due,
                clear_due,
            } => goal::run_edit(goal::EditOptions {
                id,
                title,
                due,
                clear_due,
                global,
            }),
            Commands::Rm { id } => goal::run_delete(id, global),
            Commands::Note { id, text } => goal::run_annotate("note", id, "note", text, global),
            Commands::Issue { id, text } => goal::run_annotate("issue", id, "issue", text, global),
            Commands::Resource { id, text } => {
                goal::run_annotate("resource", id, "resource", text, global)
            }
            Commands::Annotate { id, kind, text } => {
                goal::run_annotate("annotate", id, &kind, text, global)
            }
            Commands::Progress => report::run_progress(global),
            Commands::History => report::run_history(global),
        }
    }
}
