//! goaltree goal command implementations.

use crate::cli::{load_context, load_context_for_update, GlobalOptions};
use crate::date::{format_date, parse_date, parse_optional_date};
use crate::error::{Error, Result};
use crate::goal::{AnnotationKind, DueDateChange, GoalId};
use crate::output::{emit_success, HumanOutput};
use crate::report::{due_label, yes_no};
use crate::store::Toggle;

pub struct AddOptions {
    pub title: String,
    pub due: Option<String>,
    pub parent: Option<GoalId>,
    pub global: GlobalOptions,
}

pub struct EditOptions {
    pub id: GoalId,
    pub title: Option<String>,
    pub due: Option<String>,
    pub clear_due: bool,
    pub global: GlobalOptions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionAction {
    Toggle,
    Complete,
    Reopen,
}

#[derive(serde::Serialize)]
struct GoalAddedOutput {
    id: GoalId,
    title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    parent_id: Option<GoalId>,
}

#[derive(serde::Serialize)]
struct CompletionOutput {
    id: GoalId,
    completed: bool,
    change: Toggle,
    progress: f64,
}

#[derive(serde::Serialize)]
struct DeleteOutput {
    id: GoalId,
    removed: Vec<GoalId>,
}

#[derive(serde::Serialize)]
struct AnnotateOutput {
    id: GoalId,
    kind: AnnotationKind,
    text: String,
    count: usize,
}

pub fn run_add(options: AddOptions) -> Result<()> {
    let due = parse_optional_date(options.due.as_deref())?;
    let mut ctx = load_context_for_update(&options.global)?;

    let id = ctx.store.add(&options.title, due, options.parent)?;
    ctx.save()?;

    let title = options.title.trim().to_string();
    let mut human = HumanOutput::new(match options.parent {
        Some(_) => "Sub-goal added",
        None => "Goal added",
    });
    human.push_summary("ID", id.to_string());
    human.push_summary("Title", title.clone());
    human.push_summary("Due", due_label(due));
    if let Some(parent) = options.parent {
        human.push_summary("Parent", parent.to_string());
    }
    human.push_next_step(format!("goaltree add \"...\" --parent {id}"));
    ctx.push_warnings(&mut human);

    emit_success(
        options.global.output(),
        "add",
        &GoalAddedOutput {
            id,
            title,
            parent_id: options.parent,
        },
        Some(&human),
    )
}

pub fn run_show(id: GoalId, global: GlobalOptions) -> Result<()> {
    let ctx = load_context(&global)?;
    let details = ctx.store.details(id)?;

    let mut human = HumanOutput::new(format!("Goal [{}]: {}", details.id, details.title));
    human.push_summary("Due Date", due_label(details.due_date));
    human.push_summary("Completed", yes_no(details.completed));
    if let Some(date) = details.completion_date {
        human.push_summary("Completion Date", format_date(date));
    }
    human.push_summary(
        "Progress",
        format!("{:.*}%", ctx.config.display.precision, details.progress),
    );
    if let Some(parent) = details.parent_id {
        human.push_summary("Parent", parent.to_string());
    }

    push_numbered(&mut human, "Notes", &details.notes);
    push_numbered(&mut human, "Issues", &details.issues);
    push_numbered(&mut human, "Resources", &details.resources);
    if !details.sub_goals.is_empty() {
        human.push_line("Sub-Goals:");
        for sub in &details.sub_goals {
            human.push_line(format!(
                "  [{}] {} - Completed: {}",
                sub.id,
                sub.title,
                yes_no(sub.completed)
            ));
        }
    }
    ctx.push_warnings(&mut human);

    emit_success(global.output(), "show", &details, Some(&human))
}

fn push_numbered(human: &mut HumanOutput, label: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    human.push_line(format!("{label}:"));
    for (idx, item) in items.iter().enumerate() {
        human.push_line(format!("  {}. {}", idx + 1, item));
    }
}

pub fn run_completion(id: GoalId, action: CompletionAction, global: GlobalOptions) -> Result<()> {
    let mut ctx = load_context_for_update(&global)?;

    let change = match action {
        CompletionAction::Toggle => ctx.store.toggle(id)?,
        CompletionAction::Complete => Toggle::Completed {
            cascaded: ctx.store.complete(id)?,
        },
        CompletionAction::Reopen => Toggle::Reopened {
            reset: ctx.store.uncomplete(id)?,
        },
    };
    ctx.save()?;

    let progress = ctx.store.progress(id)?;
    let completed = matches!(change, Toggle::Completed { .. });
    let mut human = HumanOutput::new(if completed {
        "Marked as complete."
    } else {
        "Marked as incomplete."
    });
    human.push_summary("ID", id.to_string());
    match &change {
        Toggle::Completed { cascaded } if !cascaded.is_empty() => {
            human.push_summary("Auto-completed", join_ids(cascaded));
        }
        Toggle::Reopened { reset } if !reset.is_empty() => {
            human.push_summary("Reopened ancestors", join_ids(reset));
        }
        _ => {}
    }
    ctx.push_warnings(&mut human);

    let command = match action {
        CompletionAction::Toggle => "toggle",
        CompletionAction::Complete => "done",
        CompletionAction::Reopen => "reopen",
    };
    emit_success(
        global.output(),
        command,
        &CompletionOutput {
            id,
            completed,
            change,
            progress,
        },
        Some(&human),
    )
}

pub fn run_edit(options: EditOptions) -> Result<()> {
    let due = if options.clear_due {
        DueDateChange::Clear
    } else {
        match options.due.as_deref().map(str::trim) {
            None => DueDateChange::Keep,
            Some("") => DueDateChange::Clear,
            Some(value) => DueDateChange::Set(parse_date(value)?),
        }
    };
    if options.title.is_none() && due == DueDateChange::Keep {
        return Err(Error::InvalidArgument(
            "nothing to change: pass --title, --due or --clear-due".to_string(),
        ));
    }

    let mut ctx = load_context_for_update(&options.global)?;
    ctx.store.edit(options.id, options.title.as_deref(), due)?;
    ctx.save()?;

    let details = ctx.store.details(options.id)?;
    let mut human = HumanOutput::new("Goal updated");
    human.push_summary("ID", details.id.to_string());
    human.push_summary("Title", details.title.clone());
    human.push_summary("Due", due_label(details.due_date));
    ctx.push_warnings(&mut human);

    emit_success(options.global.output(), "edit", &details, Some(&human))
}

pub fn run_delete(id: GoalId, global: GlobalOptions) -> Result<()> {
    let mut ctx = load_context_for_update(&global)?;
    let removed = ctx.store.delete(id)?;
    ctx.save()?;

    let mut human = HumanOutput::new("Goal deleted.");
    human.push_summary("ID", id.to_string());
    if removed.len() > 1 {
        human.push_summary("Sub-goals removed", join_ids(&removed[1..]));
    }
    ctx.push_warnings(&mut human);

    emit_success(
        global.output(),
        "rm",
        &DeleteOutput { id, removed },
        Some(&human),
    )
}

pub fn run_annotate(
    command: &str,
    id: GoalId,
    kind: &str,
    text: Vec<String>,
    global: GlobalOptions,
) -> Result<()> {
    let kind: AnnotationKind = kind.parse()?;
    let text = text.join(" ");

    let mut ctx = load_context_for_update(&global)?;
    ctx.store.annotate(id, kind, &text)?;
    ctx.save()?;

    let count = ctx
        .store
        .find(id)
        .map(|goal| match kind {
            AnnotationKind::Note => goal.notes.len(),
            AnnotationKind::Issue => goal.issues.len(),
            AnnotationKind::Resource => goal.resources.len(),
        })
        .unwrap_or_default();

    let mut human = HumanOutput::new(format!("Added {kind} to goal {id}"));
    human.push_summary(format!("{kind}s"), count.to_string());
    ctx.push_warnings(&mut human);

    emit_success(
        global.output(),
        command,
        &AnnotateOutput {
            id,
            kind,
            text,
            count,
        },
        Some(&human),
    )
}

fn join_ids(ids: &[GoalId]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
