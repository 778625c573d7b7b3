//! goaltree - hierarchical goal tracking library
//!
//! This library provides the core functionality for the goaltree CLI:
//! a forest of goals with arbitrary-depth sub-goals, completion that rolls
//! up and down the tree, free-text annotations and progress reports.
//!
//! # Core Concepts
//!
//! - **Goals**: nodes of the forest; top-level goals and their sub-goals
//! - **Cascading completion**: finishing the last open sub-goal completes
//!   the parent; reopening a goal reopens every ancestor
//! - **Progress**: unweighted recursive mean of sub-goal completion
//!
//! # Module Organization
//!
//! - `cli`: Command-line interface using clap
//! - `config`: Configuration loading from `.goaltree.toml`
//! - `date`: Date parsing at the input boundary
//! - `error`: Error types and result aliases
//! - `goal`: Goal records and the persisted document shape
//! - `lock`: File locking and atomic writes
//! - `output`: Human and JSON output
//! - `report`: Progress tree and completion history
//! - `storage`: Loading and saving the goals document
//! - `store`: The goal store and its tree operations

pub mod cli;
pub mod config;
pub mod date;
pub mod error;
pub mod goal;
pub mod lock;
pub mod output;
pub mod report;
pub mod storage;
pub mod store;

pub use error::{Error, Result};
pub use goal::{AnnotationKind, DueDateChange, Goal, GoalDocument, GoalId, GoalNode};
pub use store::{GoalStore, Toggle};
