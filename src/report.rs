//! Progress and completion-history reports built from a [`GoalStore`].

use chrono::NaiveDate;
use serde::Serialize;

use crate::config::DisplayConfig;
use crate::date::format_date;
use crate::goal::{Goal, GoalId};
use crate::store::GoalStore;

/// One goal in the progress tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressNode {
    pub id: GoalId,
    pub title: String,
    pub due_date: Option<NaiveDate>,
    pub completed: bool,
    pub percentage: f64,
    pub sub_goals: Vec<ProgressNode>,
}

/// One completed goal in the history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    pub completion_date: NaiveDate,
    pub id: GoalId,
    pub title: String,
    /// Title of the top-level goal this one belongs to (its own for roots).
    pub top_level_title: String,
}

impl GoalStore {
    /// Progress tree for the whole forest, in forest order.
    pub fn progress_report(&self) -> Vec<ProgressNode> {
        self.roots().map(|root| self.progress_node(root)).collect()
    }

    fn progress_node(&self, goal: &Goal) -> ProgressNode {
        ProgressNode {
            id: goal.id,
            title: goal.title.clone(),
            due_date: goal.due_date,
            completed: goal.is_completed(),
            percentage: self.progress_of(goal),
            sub_goals: self
                .children(goal.id)
                .map(|child| self.progress_node(child))
                .collect(),
        }
    }

    /// Every completed goal at any depth, oldest completion first.
    ///
    /// Goals completed on the same day keep their forest (pre-order) order.
    pub fn completion_history(&self) -> Vec<HistoryEntry> {
        let mut entries: Vec<HistoryEntry> = self
            .iter()
            .filter_map(|goal| {
                let completion_date = goal.completion_date()?;
                let top_level_title = self
                    .root_of(goal.id)
                    .map(|root| root.title.clone())
                    .unwrap_or_else(|| goal.title.clone());
                Some(HistoryEntry {
                    completion_date,
                    id: goal.id,
                    title: goal.title.clone(),
                    top_level_title,
                })
            })
            .collect();
        entries.sort_by_key(|entry| entry.completion_date);
        entries
    }
}

/// Render the progress tree as indented text lines.
pub fn render_progress(nodes: &[ProgressNode], display: &DisplayConfig) -> Vec<String> {
    if nodes.is_empty() {
        return vec!["No goals found.".to_string()];
    }

    let mut lines = Vec::new();
    for node in nodes {
        push_progress_lines(&mut lines, node, "Goal", 0, display);
        for child in &node.sub_goals {
            push_subgoal_lines(&mut lines, child, display.indent, display);
        }
        lines.push("-".repeat(40));
    }
    lines
}

fn push_subgoal_lines(
    lines: &mut Vec<String>,
    node: &ProgressNode,
    indent: usize,
    display: &DisplayConfig,
) {
    push_progress_lines(lines, node, "Subgoal", indent, display);
    for child in &node.sub_goals {
        push_subgoal_lines(lines, child, indent + display.indent, display);
    }
}

fn push_progress_lines(
    lines: &mut Vec<String>,
    node: &ProgressNode,
    label: &str,
    indent: usize,
    display: &DisplayConfig,
) {
    let pad = " ".repeat(indent);
    lines.push(format!(
        "{pad}{label} [{}]: {} - Due: {}",
        node.id,
        node.title,
        due_label(node.due_date)
    ));
    lines.push(format!(
        "{pad}  Progress: {:.*}% - Completed: {}",
        display.precision,
        node.percentage,
        yes_no(node.completed)
    ));
}

/// Render the completion history as text lines.
pub fn render_history(entries: &[HistoryEntry]) -> Vec<String> {
    if entries.is_empty() {
        return vec!["No completed goals yet.".to_string()];
    }

    entries
        .iter()
        .map(|entry| {
            format!(
                "{} - {} (Part of: {})",
                format_date(entry.completion_date),
                entry.title,
                entry.top_level_title
            )
        })
        .collect()
}

pub fn due_label(due: Option<NaiveDate>) -> String {
    due.map(format_date).unwrap_or_else(|| "No due date".to_string())
}

pub fn yes_no(value: bool) -> &'static str {
    if value {
        "Yes"
    } else {
        "No"
    }
}
