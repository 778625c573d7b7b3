//! goaltree progress and history commands.

use crate::cli::{load_context, GlobalOptions};
use crate::error::Result;
use crate::output::{emit_success, HumanOutput};
use crate::report::{render_history, render_progress};

pub fn run_progress(global: GlobalOptions) -> Result<()> {
    let ctx = load_context(&global)?;
    let report = ctx.store.progress_report();

    let mut human = HumanOutput::new("Goal progress");
    for line in render_progress(&report, &ctx.config.display) {
        human.push_line(line);
    }
    ctx.push_warnings(&mut human);

    emit_success(global.output(), "progress", &report, Some(&human))
}

pub fn run_history(global: GlobalOptions) -> Result<()> {
    let ctx = load_context(&global)?;
    let history = ctx.store.completion_history();

    let header = if history.is_empty() {
        "Completion history"
    } else {
        "Completion history (date - goal - major goal)"
    };
    let mut human = HumanOutput::new(header);
    for line in render_history(&history) {
        human.push_line(line);
    }
    ctx.push_warnings(&mut human);

    emit_success(global.output(), "history", &history, Some(&human))
}
