//! Goal records and the persisted goals document.
//!
//! In memory a goal refers to its children and parent by id (see
//! [`crate::store::GoalStore`]). On disk the forest is a nested document
//! where every node embeds its sub-goals.

use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Goal identifier. Assigned sequentially from 1 and never reused.
pub type GoalId = u64;

/// A goal record in the store's arena.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Goal {
    pub id: GoalId,
    pub title: String,
    pub due_date: Option<NaiveDate>,
    completed: bool,
    completion_date: Option<NaiveDate>,
    pub notes: Vec<String>,
    pub issues: Vec<String>,
    pub resources: Vec<String>,
    pub(crate) sub_goals: Vec<GoalId>,
    pub(crate) parent_id: Option<GoalId>,
}

impl Goal {
    pub(crate) fn new(
        id: GoalId,
        title: impl Into<String>,
        due_date: Option<NaiveDate>,
        parent_id: Option<GoalId>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            due_date,
            completed: false,
            completion_date: None,
            notes: Vec::new(),
            issues: Vec::new(),
            resources: Vec::new(),
            sub_goals: Vec::new(),
            parent_id,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn completion_date(&self) -> Option<NaiveDate> {
        self.completion_date
    }

    /// Child ids in insertion order.
    pub fn sub_goals(&self) -> &[GoalId] {
        &self.sub_goals
    }

    pub fn parent_id(&self) -> Option<GoalId> {
        self.parent_id
    }

    pub fn is_leaf(&self) -> bool {
        self.sub_goals.is_empty()
    }

    // The only two places that touch `completed`, so the date is present
    // exactly when the goal is completed.
    pub(crate) fn mark_completed(&mut self, on: NaiveDate) {
        self.completed = true;
        self.completion_date = Some(on);
    }

    pub(crate) fn mark_incomplete(&mut self) {
        self.completed = false;
        self.completion_date = None;
    }

    pub(crate) fn annotations_mut(&mut self, kind: AnnotationKind) -> &mut Vec<String> {
        match kind {
            AnnotationKind::Note => &mut self.notes,
            AnnotationKind::Issue => &mut self.issues,
            AnnotationKind::Resource => &mut self.resources,
        }
    }

    /// Rebuild a record from a document node; children are wired up by the store.
    pub(crate) fn from_node(node: &GoalNode, parent_id: Option<GoalId>) -> Self {
        Self {
            id: node.id,
            title: node.title.clone(),
            due_date: node.due_date,
            completed: node.completed,
            completion_date: node.completion_date,
            notes: node.notes.clone(),
            issues: node.issues.clone(),
            resources: node.resources.clone(),
            sub_goals: node.sub_goals.iter().map(|child| child.id).collect(),
            parent_id,
        }
    }
}

/// Free-text annotation lists attached to a goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationKind {
    Note,
    Issue,
    Resource,
}

impl AnnotationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnnotationKind::Note => "note",
            AnnotationKind::Issue => "issue",
            AnnotationKind::Resource => "resource",
        }
    }
}

impl FromStr for AnnotationKind {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "note" | "notes" => Ok(AnnotationKind::Note),
            "issue" | "issues" => Ok(AnnotationKind::Issue),
            "resource" | "resources" => Ok(AnnotationKind::Resource),
            other => Err(Error::InvalidArgument(format!(
                "unknown annotation kind '{other}' (expected note|issue|resource)"
            ))),
        }
    }
}

impl std::fmt::Display for AnnotationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How `edit` should treat the due date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DueDateChange {
    #[default]
    Keep,
    Set(NaiveDate),
    Clear,
}

/// Persisted form of the whole forest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalDocument {
    pub next_id: GoalId,
    pub goals: Vec<GoalNode>,
}

impl GoalDocument {
    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Persisted form of a single goal with its nested sub-goals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalNode {
    pub id: GoalId,
    pub title: String,
    pub due_date: Option<NaiveDate>,
    pub completed: bool,
    pub completion_date: Option<NaiveDate>,
    pub notes: Vec<String>,
    pub issues: Vec<String>,
    pub resources: Vec<String>,
    pub sub_goals: Vec<GoalNode>,
    pub parent_id: Option<GoalId>,
}

impl GoalNode {
    pub(crate) fn from_goal(goal: &Goal, sub_goals: Vec<GoalNode>) -> Self {
        Self {
            id: goal.id,
            title: goal.title.clone(),
            due_date: goal.due_date,
            completed: goal.completed,
            completion_date: goal.completion_date,
            notes: goal.notes.clone(),
            issues: goal.issues.clone(),
            resources: goal.resources.clone(),
            sub_goals,
            parent_id: goal.parent_id,
        }
    }
}
