//! The goal store: an id-indexed arena holding the goal forest.
//!
//! Parent/child edges are id references: every goal lists its children in
//! order and names its parent, and the store keeps the ordered list of root
//! ids. All tree walks (cascades, deletion, progress) run over the arena.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, warn};

use crate::date;
use crate::error::{Error, Result};
use crate::goal::{AnnotationKind, DueDateChange, Goal, GoalDocument, GoalId, GoalNode};

/// Deepest allowed nesting, counting top-level goals as level 1.
///
/// Each level adds two levels to the saved JSON, and the document must stay
/// under serde_json's parse depth limit of 128 to load again.
pub const MAX_DEPTH: usize = 60;

/// Result of a completion toggle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Toggle {
    /// The goal was completed; `cascaded` lists ancestors auto-completed with it.
    Completed { cascaded: Vec<GoalId> },
    /// The goal was reopened; `reset` lists ancestors that were forced open.
    Reopened { reset: Vec<GoalId> },
}

/// Summary of a direct sub-goal, used by [`GoalDetails`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubGoalSummary {
    pub id: GoalId,
    pub title: String,
    pub completed: bool,
}

/// Everything the view command shows for one goal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalDetails {
    pub id: GoalId,
    pub title: String,
    pub due_date: Option<NaiveDate>,
    pub completed: bool,
    pub completion_date: Option<NaiveDate>,
    pub parent_id: Option<GoalId>,
    pub progress: f64,
    pub notes: Vec<String>,
    pub issues: Vec<String>,
    pub resources: Vec<String>,
    pub sub_goals: Vec<SubGoalSummary>,
}

/// In-memory goal forest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoalStore {
    goals: HashMap<GoalId, Goal>,
    roots: Vec<GoalId>,
    next_id: GoalId,
}

impl Default for GoalStore {
    fn default() -> Self {
        Self::new()
    }
}

impl GoalStore {
    pub fn new() -> Self {
        Self {
            goals: HashMap::new(),
            roots: Vec::new(),
            next_id: 1,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Identifier the next `add` will assign.
    pub fn next_id(&self) -> GoalId {
        self.next_id
    }

    pub fn len(&self) -> usize {
        self.goals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.goals.is_empty()
    }

    /// Top-level goals in forest order.
    pub fn roots(&self) -> impl Iterator<Item = &Goal> + '_ {
        self.roots.iter().filter_map(|id| self.goals.get(id))
    }

    /// Direct sub-goals of `id`, in order. Empty for unknown ids.
    pub fn children(&self, id: GoalId) -> impl Iterator<Item = &Goal> + '_ {
        self.goals
            .get(&id)
            .map(|goal| goal.sub_goals.as_slice())
            .unwrap_or_default()
            .iter()
            .filter_map(|child| self.goals.get(child))
    }

    pub fn find(&self, id: GoalId) -> Option<&Goal> {
        self.goals.get(&id)
    }

    /// The goal owning `id`; `None` when `id` is a root or unknown.
    pub fn find_parent(&self, id: GoalId) -> Option<&Goal> {
        self.goals
            .get(&id)
            .and_then(|goal| goal.parent_id)
            .and_then(|parent| self.goals.get(&parent))
    }

    /// The top-level goal `id` lives under (itself for roots).
    pub fn root_of(&self, id: GoalId) -> Option<&Goal> {
        let mut current = self.goals.get(&id)?;
        while let Some(parent) = current.parent_id.and_then(|p| self.goals.get(&p)) {
            current = parent;
        }
        Some(current)
    }

    /// All goals in depth-first pre-order across the forest.
    pub fn iter(&self) -> impl Iterator<Item = &Goal> + '_ {
        let mut stack: Vec<GoalId> = self.roots.iter().rev().copied().collect();
        std::iter::from_fn(move || loop {
            let id = stack.pop()?;
            if let Some(goal) = self.goals.get(&id) {
                stack.extend(goal.sub_goals.iter().rev().copied());
                return Some(goal);
            }
        })
    }

    fn get_mut(&mut self, id: GoalId) -> Result<&mut Goal> {
        self.goals.get_mut(&id).ok_or(Error::NotFound(id))
    }

    /// Nesting level of `id`, counting roots as 1.
    fn depth(&self, id: GoalId) -> usize {
        self.ancestors(id).len() + 1
    }

    fn ancestors(&self, id: GoalId) -> Vec<GoalId> {
        let mut chain = Vec::new();
        let mut current = self.goals.get(&id).and_then(|goal| goal.parent_id);
        while let Some(parent) = current {
            chain.push(parent);
            current = self.goals.get(&parent).and_then(|goal| goal.parent_id);
        }
        chain
    }

    // =========================================================================
    // Creation and editing
    // =========================================================================

    /// Add a goal at the top level or under `parent_id`, returning its id.
    pub fn add(
        &mut self,
        title: &str,
        due_date: Option<NaiveDate>,
        parent_id: Option<GoalId>,
    ) -> Result<GoalId> {
        let title = title.trim();
        if title.is_empty() {
            return Err(Error::InvalidArgument("title cannot be empty".to_string()));
        }
        if let Some(parent) = parent_id {
            if !self.goals.contains_key(&parent) {
                return Err(Error::ParentNotFound(parent));
            }
            if self.depth(parent) >= MAX_DEPTH {
                return Err(Error::InvalidArgument(format!(
                    "sub-goals cannot nest more than {MAX_DEPTH} levels deep"
                )));
            }
        }

        let id = self.next_id;
        self.next_id = id
            .checked_add(1)
            .ok_or_else(|| Error::InvalidArgument("no goal ids left".to_string()))?;
        self.goals.insert(id, Goal::new(id, title, due_date, parent_id));
        match parent_id {
            Some(parent) => self.get_mut(parent)?.sub_goals.push(id),
            None => self.roots.push(id),
        }

        debug!(id, ?parent_id, "goal added");
        Ok(id)
    }

    /// Replace the title (when non-empty) and/or due date of a goal.
    pub fn edit(&mut self, id: GoalId, title: Option<&str>, due: DueDateChange) -> Result<()> {
        let goal = self.get_mut(id)?;
        if let Some(title) = title.map(str::trim).filter(|t| !t.is_empty()) {
            goal.title = title.to_string();
        }
        match due {
            DueDateChange::Keep => {}
            DueDateChange::Set(date) => goal.due_date = Some(date),
            DueDateChange::Clear => goal.due_date = None,
        }
        debug!(id, "goal edited");
        Ok(())
    }

    /// Append free text to one of the goal's annotation lists.
    pub fn annotate(&mut self, id: GoalId, kind: AnnotationKind, text: &str) -> Result<()> {
        self.get_mut(id)?.annotations_mut(kind).push(text.to_string());
        debug!(id, %kind, "annotation added");
        Ok(())
    }

    pub fn add_note(&mut self, id: GoalId, text: &str) -> Result<()> {
        self.annotate(id, AnnotationKind::Note, text)
    }

    pub fn add_issue(&mut self, id: GoalId, text: &str) -> Result<()> {
        self.annotate(id, AnnotationKind::Issue, text)
    }

    pub fn add_resource(&mut self, id: GoalId, text: &str) -> Result<()> {
        self.annotate(id, AnnotationKind::Resource, text)
    }

    // =========================================================================
    // Completion
    // =========================================================================

    fn all_children_completed(&self, goal: &Goal) -> bool {
        goal.sub_goals
            .iter()
            .all(|child| self.goals.get(child).is_some_and(Goal::is_completed))
    }

    /// Complete a goal today. See [`GoalStore::complete_on`].
    pub fn complete(&mut self, id: GoalId) -> Result<Vec<GoalId>> {
        self.complete_on(id, date::today())
    }

    /// Complete a goal, then auto-complete every ancestor whose sub-goals are
    /// now all complete, stopping at the first one that is not.
    ///
    /// Returns the ancestors completed by the cascade, nearest first.
    pub fn complete_on(&mut self, id: GoalId, on: NaiveDate) -> Result<Vec<GoalId>> {
        let goal = self.goals.get(&id).ok_or(Error::NotFound(id))?;
        if !self.all_children_completed(goal) {
            return Err(Error::IncompleteChildren(id));
        }
        self.get_mut(id)?.mark_completed(on);

        let mut cascaded = Vec::new();
        for ancestor in self.ancestors(id) {
            let ready = self
                .goals
                .get(&ancestor)
                .is_some_and(|goal| self.all_children_completed(goal));
            if !ready {
                break;
            }
            self.get_mut(ancestor)?.mark_completed(on);
            cascaded.push(ancestor);
        }

        debug!(id, ?cascaded, "goal completed");
        Ok(cascaded)
    }

    /// Reopen a goal and force every ancestor up to the root open as well,
    /// whatever the state of their other sub-goals.
    ///
    /// Returns the ancestors that were completed before the reset, nearest first.
    pub fn uncomplete(&mut self, id: GoalId) -> Result<Vec<GoalId>> {
        self.get_mut(id)?.mark_incomplete();

        let mut reset = Vec::new();
        for ancestor in self.ancestors(id) {
            let goal = self.get_mut(ancestor)?;
            if goal.is_completed() {
                reset.push(ancestor);
            }
            goal.mark_incomplete();
        }

        debug!(id, ?reset, "goal reopened");
        Ok(reset)
    }

    /// Flip a goal's completion state, stamping completions with today's date.
    pub fn toggle(&mut self, id: GoalId) -> Result<Toggle> {
        self.toggle_on(id, date::today())
    }

    pub fn toggle_on(&mut self, id: GoalId, on: NaiveDate) -> Result<Toggle> {
        let completed = self.find(id).ok_or(Error::NotFound(id))?.is_completed();
        if completed {
            Ok(Toggle::Reopened {
                reset: self.uncomplete(id)?,
            })
        } else {
            Ok(Toggle::Completed {
                cascaded: self.complete_on(id, on)?,
            })
        }
    }

    // =========================================================================
    // Deletion
    // =========================================================================

    /// Remove a goal and its whole subtree. Returns the removed ids in pre-order.
    ///
    /// The former parent's completion state is left as it was.
    pub fn delete(&mut self, id: GoalId) -> Result<Vec<GoalId>> {
        let parent_id = self.find(id).ok_or(Error::NotFound(id))?.parent_id;
        match parent_id.and_then(|parent| self.goals.get_mut(&parent)) {
            Some(parent) => parent.sub_goals.retain(|child| *child != id),
            None => self.roots.retain(|root| *root != id),
        }

        let mut removed = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(goal) = self.goals.remove(&current) {
                stack.extend(goal.sub_goals.iter().rev().copied());
                removed.push(current);
            }
        }

        debug!(id, removed = removed.len(), "goal deleted");
        Ok(removed)
    }

    // =========================================================================
    // Aggregation
    // =========================================================================

    /// Completion percentage of a goal's subtree, in `[0, 100]`.
    pub fn progress(&self, id: GoalId) -> Result<f64> {
        let goal = self.find(id).ok_or(Error::NotFound(id))?;
        Ok(self.progress_of(goal))
    }

    /// Leaves count 0 or 100; other goals average their direct sub-goals,
    /// each sub-goal weighing the same regardless of its own subtree size.
    pub fn progress_of(&self, goal: &Goal) -> f64 {
        if goal.is_leaf() {
            return if goal.is_completed() { 100.0 } else { 0.0 };
        }
        let total: f64 = self
            .children(goal.id)
            .map(|child| self.progress_of(child))
            .sum();
        total / goal.sub_goals.len() as f64
    }

    pub fn details(&self, id: GoalId) -> Result<GoalDetails> {
        let goal = self.find(id).ok_or(Error::NotFound(id))?;
        Ok(GoalDetails {
            id: goal.id,
            title: goal.title.clone(),
            due_date: goal.due_date,
            completed: goal.is_completed(),
            completion_date: goal.completion_date(),
            parent_id: goal.parent_id,
            progress: self.progress_of(goal),
            notes: goal.notes.clone(),
            issues: goal.issues.clone(),
            resources: goal.resources.clone(),
            sub_goals: self
                .children(id)
                .map(|child| SubGoalSummary {
                    id: child.id,
                    title: child.title.clone(),
                    completed: child.is_completed(),
                })
                .collect(),
        })
    }

    // =========================================================================
    // Document conversion
    // =========================================================================

    /// Build the nested persisted form of the forest.
    pub fn to_document(&self) -> GoalDocument {
        GoalDocument {
            next_id: self.next_id,
            goals: self.roots().map(|root| self.node_for(root)).collect(),
        }
    }

    fn node_for(&self, goal: &Goal) -> GoalNode {
        let sub_goals = self
            .children(goal.id)
            .map(|child| self.node_for(child))
            .collect();
        GoalNode::from_goal(goal, sub_goals)
    }

    /// Rebuild a store from its persisted form.
    ///
    /// Fails with `InvalidDocument` on duplicate ids and when the stored ids
    /// leave no room for another goal. Parent links are taken from the
    /// nesting, `next_id` is raised past the largest stored id, and a goal
    /// whose completed flag and completion date disagree is reopened along
    /// with its ancestors.
    pub fn from_document(document: &GoalDocument) -> Result<Self> {
        let mut store = Self::new();
        let mut seen = HashSet::new();
        let mut inconsistent = Vec::new();
        let mut stack: Vec<(&GoalNode, Option<GoalId>)> =
            document.goals.iter().rev().map(|node| (node, None)).collect();

        while let Some((node, parent_id)) = stack.pop() {
            if !seen.insert(node.id) {
                return Err(Error::InvalidDocument(format!("duplicate goal id {}", node.id)));
            }
            if node.parent_id != parent_id {
                warn!(
                    id = node.id,
                    stored = ?node.parent_id,
                    actual = ?parent_id,
                    "stored parent_id disagrees with nesting; using nesting"
                );
            }
            if node.completed != node.completion_date.is_some() {
                inconsistent.push(node.id);
            }
            if parent_id.is_none() {
                store.roots.push(node.id);
            }
            store.goals.insert(node.id, Goal::from_node(node, parent_id));
            stack.extend(node.sub_goals.iter().rev().map(|child| (child, Some(node.id))));
        }

        for id in inconsistent {
            warn!(id, "completed flag and completion date disagree; reopening");
            store.uncomplete(id)?;
        }

        let max_id = store.goals.keys().copied().max().unwrap_or(0);
        let floor = max_id.checked_add(1).ok_or_else(|| {
            Error::InvalidDocument(format!("goal id {max_id} leaves no room for new goals"))
        })?;
        store.next_id = document.next_id.max(1);
        if store.next_id < floor {
            warn!(
                next_id = document.next_id,
                max_id,
                "next_id behind stored ids; advancing"
            );
            store.next_id = floor;
        }

        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, d).unwrap()
    }

    fn learn_x() -> GoalStore {
        let mut store = GoalStore::new();
        assert_eq!(store.add("Learn X", None, None).unwrap(), 1);
        assert_eq!(store.add("Read docs", None, Some(1)).unwrap(), 2);
        assert_eq!(store.add("Build demo", None, Some(1)).unwrap(), 3);
        store
    }

    #[test]
    fn ids_are_sequential_and_never_reused() {
        let mut store = GoalStore::new();
        let a = store.add("a", None, None).unwrap();
        let b = store.add("b", None, Some(a)).unwrap();
        store.delete(b).unwrap();
        store.delete(a).unwrap();
        assert!(store.is_empty());
        let c = store.add("c", None, None).unwrap();
        assert_eq!((a, b, c), (1, 2, 3));
        assert_eq!(store.next_id(), 4);
    }

    #[test]
    fn add_under_missing_parent_fails_without_consuming_id() {
        let mut store = GoalStore::new();
        match store.add("orphan", None, Some(9)) {
            Err(Error::ParentNotFound(9)) => {}
            other => panic!("unexpected result: {other:?}"),
        }
        assert_eq!(store.next_id(), 1);
        assert!(store.is_empty());
    }

    #[test]
    fn add_rejects_blank_title() {
        let mut store = GoalStore::new();
        assert!(matches!(
            store.add("   ", None, None),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn add_appends_children_in_order() {
        let store = learn_x();
        let titles: Vec<&str> = store.children(1).map(|g| g.title.as_str()).collect();
        assert_eq!(titles, vec!["Read docs", "Build demo"]);
        assert_eq!(store.find(3).unwrap().parent_id(), Some(1));
        assert_eq!(store.find_parent(3).unwrap().id, 1);
        assert!(store.find_parent(1).is_none());
        assert!(store.find_parent(42).is_none());
    }

    #[test]
    fn iter_walks_pre_order() {
        let mut store = learn_x();
        store.add("Chapter 1", None, Some(2)).unwrap();
        store.add("Other", None, None).unwrap();
        let ids: Vec<GoalId> = store.iter().map(|g| g.id).collect();
        assert_eq!(ids, vec![1, 2, 4, 3, 5]);
    }

    #[test]
    fn complete_requires_all_children() {
        let mut store = learn_x();
        match store.complete_on(1, day(1)) {
            Err(Error::IncompleteChildren(1)) => {}
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(!store.find(1).unwrap().is_completed());
        assert_eq!(store.find(1).unwrap().completion_date(), None);
    }

    #[test]
    fn complete_unknown_goal_is_not_found() {
        let mut store = GoalStore::new();
        assert!(matches!(store.complete_on(5, day(1)), Err(Error::NotFound(5))));
        assert!(matches!(store.uncomplete(5), Err(Error::NotFound(5))));
    }

    #[test]
    fn completing_last_child_cascades_to_root() {
        let mut store = GoalStore::new();
        let root = store.add("root", None, None).unwrap();
        let mid = store.add("mid", None, Some(root)).unwrap();
        let leaf = store.add("leaf", None, Some(mid)).unwrap();

        let cascaded = store.complete_on(leaf, day(2)).unwrap();
        assert_eq!(cascaded, vec![mid, root]);
        for id in [root, mid, leaf] {
            assert_eq!(store.find(id).unwrap().completion_date(), Some(day(2)));
        }
    }

    #[test]
    fn cascade_stops_at_first_incomplete_ancestor() {
        let mut store = GoalStore::new();
        let root = store.add("root", None, None).unwrap();
        let mid = store.add("mid", None, Some(root)).unwrap();
        let _sibling = store.add("sibling", None, Some(root)).unwrap();
        let leaf = store.add("leaf", None, Some(mid)).unwrap();

        let cascaded = store.complete_on(leaf, day(3)).unwrap();
        assert_eq!(cascaded, vec![mid]);
        assert!(store.find(mid).unwrap().is_completed());
        assert!(!store.find(root).unwrap().is_completed());
    }

    #[test]
    fn uncomplete_forces_every_ancestor_open() {
        let mut store = GoalStore::new();
        let root = store.add("root", None, None).unwrap();
        let mid = store.add("mid", None, Some(root)).unwrap();
        let a = store.add("a", None, Some(mid)).unwrap();
        let b = store.add("b", None, Some(mid)).unwrap();
        store.complete_on(a, day(4)).unwrap();
        store.complete_on(b, day(4)).unwrap();
        assert!(store.find(root).unwrap().is_completed());

        let reset = store.uncomplete(a).unwrap();
        assert_eq!(reset, vec![mid, root]);
        for id in [root, mid, a] {
            let goal = store.find(id).unwrap();
            assert!(!goal.is_completed());
            assert_eq!(goal.completion_date(), None);
        }
        assert!(store.find(b).unwrap().is_completed());
    }

    #[test]
    fn leaf_goals_toggle_freely() {
        let mut store = GoalStore::new();
        let id = store.add("solo", None, None).unwrap();
        assert_eq!(
            store.toggle_on(id, day(5)).unwrap(),
            Toggle::Completed { cascaded: vec![] }
        );
        assert_eq!(store.progress(id).unwrap(), 100.0);
        assert_eq!(
            store.toggle_on(id, day(6)).unwrap(),
            Toggle::Reopened { reset: vec![] }
        );
        assert_eq!(store.progress(id).unwrap(), 0.0);
    }

    #[test]
    fn delete_removes_subtree_and_keeps_siblings() {
        let mut store = learn_x();
        let grandchild = store.add("Chapter 1", None, Some(2)).unwrap();

        let removed = store.delete(2).unwrap();
        assert_eq!(removed, vec![2, grandchild]);
        assert!(store.find(2).is_none());
        assert!(store.find(grandchild).is_none());
        assert_eq!(store.find(1).unwrap().sub_goals(), &[3]);
        assert!(matches!(store.delete(2), Err(Error::NotFound(2))));
    }

    #[test]
    fn delete_root_removes_from_forest() {
        let mut store = learn_x();
        let other = store.add("Other", None, None).unwrap();
        store.delete(1).unwrap();
        let roots: Vec<GoalId> = store.roots().map(|g| g.id).collect();
        assert_eq!(roots, vec![other]);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn delete_does_not_reevaluate_parent() {
        let mut store = learn_x();
        store.complete_on(2, day(7)).unwrap();
        store.delete(3).unwrap();
        assert!(!store.find(1).unwrap().is_completed());
        assert_eq!(store.progress(1).unwrap(), 100.0);
    }

    #[test]
    fn progress_is_unweighted_mean_of_children() {
        let mut store = GoalStore::new();
        let root = store.add("root", None, None).unwrap();
        let big = store.add("big", None, Some(root)).unwrap();
        let small = store.add("small", None, Some(root)).unwrap();
        for i in 0..4 {
            let child = store.add(&format!("part {i}"), None, Some(big)).unwrap();
            if i == 0 {
                store.complete_on(child, day(8)).unwrap();
            }
        }
        store.complete_on(small, day(8)).unwrap();

        assert_eq!(store.progress(big).unwrap(), 25.0);
        assert_eq!(store.progress(root).unwrap(), 62.5);
    }

    #[test]
    fn scenario_learn_x() {
        let mut store = learn_x();
        assert_eq!(store.progress(1).unwrap(), 0.0);

        store.complete_on(2, day(9)).unwrap();
        assert_eq!(store.progress(1).unwrap(), 50.0);
        assert!(!store.find(1).unwrap().is_completed());

        assert_eq!(store.complete_on(3, day(10)).unwrap(), vec![1]);
        assert_eq!(store.progress(1).unwrap(), 100.0);
        assert!(store.find(1).unwrap().is_completed());

        assert_eq!(store.uncomplete(2).unwrap(), vec![1]);
        assert!(!store.find(1).unwrap().is_completed());
        assert_eq!(store.progress(1).unwrap(), 50.0);
        assert!(store.find(3).unwrap().is_completed());
    }

    #[test]
    fn edit_replaces_title_and_due_date() {
        let mut store = learn_x();
        store
            .edit(2, Some("Read the book"), DueDateChange::Set(day(20)))
            .unwrap();
        assert_eq!(store.find(2).unwrap().title, "Read the book");
        assert_eq!(store.find(2).unwrap().due_date, Some(day(20)));

        store.edit(2, Some("  "), DueDateChange::Keep).unwrap();
        assert_eq!(store.find(2).unwrap().title, "Read the book");
        assert_eq!(store.find(2).unwrap().due_date, Some(day(20)));

        store.edit(2, None, DueDateChange::Clear).unwrap();
        assert_eq!(store.find(2).unwrap().due_date, None);

        assert!(matches!(
            store.edit(99, Some("x"), DueDateChange::Keep),
            Err(Error::NotFound(99))
        ));
    }

    #[test]
    fn annotations_append_in_order() {
        let mut store = learn_x();
        store.add_note(1, "first").unwrap();
        store.add_note(1, "first").unwrap();
        store.add_issue(1, "time").unwrap();
        store.add_resource(1, "https://example.com").unwrap();
        let goal = store.find(1).unwrap();
        assert_eq!(goal.notes, vec!["first".to_string(), "first".to_string()]);
        assert_eq!(goal.issues, vec!["time".to_string()]);
        assert_eq!(goal.resources, vec!["https://example.com".to_string()]);
        assert!(matches!(
            store.annotate(8, AnnotationKind::Note, "x"),
            Err(Error::NotFound(8))
        ));
    }

    #[test]
    fn details_summarize_children() {
        let mut store = learn_x();
        store.complete_on(3, day(11)).unwrap();
        let details = store.details(1).unwrap();
        assert_eq!(details.progress, 50.0);
        assert_eq!(details.parent_id, None);
        assert_eq!(
            details.sub_goals,
            vec![
                SubGoalSummary {
                    id: 2,
                    title: "Read docs".to_string(),
                    completed: false,
                },
                SubGoalSummary {
                    id: 3,
                    title: "Build demo".to_string(),
                    completed: true,
                },
            ]
        );
    }

    #[test]
    fn document_round_trip_preserves_forest() {
        let mut store = learn_x();
        store.add("Other", Some(day(30)), None).unwrap();
        store.add_note(2, "skim first").unwrap();
        store.complete_on(3, day(12)).unwrap();
        store.delete(4).unwrap();

        let document = store.to_document();
        assert_eq!(document.next_id, 5);
        let restored = GoalStore::from_document(&document).unwrap();
        assert_eq!(restored, store);
        assert_eq!(restored.to_document(), document);
    }

    #[test]
    fn from_document_rejects_duplicate_ids() {
        let mut store = learn_x();
        store.add("dup", None, None).unwrap();
        let mut document = store.to_document();
        document.goals[1].id = 2;
        assert!(matches!(
            GoalStore::from_document(&document),
            Err(Error::InvalidDocument(_))
        ));
    }

    #[test]
    fn from_document_repairs_parent_links_and_counter() {
        let store = learn_x();
        let mut document = store.to_document();
        document.next_id = 2;
        document.goals[0].sub_goals[1].parent_id = None;

        let restored = GoalStore::from_document(&document).unwrap();
        assert_eq!(restored.next_id(), 4);
        assert_eq!(restored.find(3).unwrap().parent_id(), Some(1));
    }

    #[test]
    fn add_refuses_nesting_past_max_depth() {
        let mut store = GoalStore::new();
        let mut parent = store.add("level 1", None, None).unwrap();
        for level in 2..=MAX_DEPTH {
            parent = store
                .add(&format!("level {level}"), None, Some(parent))
                .unwrap();
        }
        let next_id = store.next_id();

        assert!(matches!(
            store.add("too deep", None, Some(parent)),
            Err(Error::InvalidArgument(_))
        ));
        assert_eq!(store.next_id(), next_id);
        assert_eq!(store.len(), MAX_DEPTH);
    }

    #[test]
    fn add_fails_cleanly_when_ids_run_out() {
        let document = GoalDocument {
            next_id: GoalId::MAX,
            goals: Vec::new(),
        };
        let mut store = GoalStore::from_document(&document).unwrap();
        assert!(matches!(
            store.add("one too many", None, None),
            Err(Error::InvalidArgument(_))
        ));
        assert!(store.is_empty());
        assert_eq!(store.next_id(), GoalId::MAX);
    }

    #[test]
    fn from_document_rejects_largest_possible_id() {
        let mut document = learn_x().to_document();
        document.goals[0].sub_goals[1].id = GoalId::MAX;
        assert!(matches!(
            GoalStore::from_document(&document),
            Err(Error::InvalidDocument(_))
        ));
    }

    #[test]
    fn from_document_reopens_goals_with_mismatched_completion() {
        let mut store = learn_x();
        store.complete_on(2, day(13)).unwrap();
        store.complete_on(3, day(13)).unwrap();
        let mut document = store.to_document();
        document.goals[0].sub_goals[1].completion_date = None;

        let restored = GoalStore::from_document(&document).unwrap();
        for id in [1, 3] {
            let goal = restored.find(id).unwrap();
            assert!(!goal.is_completed());
            assert_eq!(goal.completion_date(), None);
        }
        assert_eq!(restored.find(2).unwrap().completion_date(), Some(day(13)));
    }
}
