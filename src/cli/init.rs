//! goaltree init command implementation
//!
//! Writes a default `.goaltree.toml` and an empty goals document.

use std::path::PathBuf;

use crate::cli::GlobalOptions;
use crate::config::{Config, CONFIG_FILE};
use crate::error::Result;
use crate::output::{emit_success, HumanOutput};
use crate::storage::Storage;
use crate::store::GoalStore;

pub struct InitOptions {
    pub force: bool,
    pub global: GlobalOptions,
}

#[derive(serde::Serialize)]
struct InitReport {
    config: PathBuf,
    data_file: PathBuf,
    created: InitCreated,
}

#[derive(serde::Serialize)]
struct InitCreated {
    config: bool,
    data_file: bool,
}

pub fn run(options: InitOptions) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let config_path = options
        .global
        .config
        .clone()
        .unwrap_or_else(|| cwd.join(CONFIG_FILE));

    let created_config = if config_path.exists() && !options.force {
        false
    } else {
        Config::default().save(&config_path)?;
        true
    };

    let config = Config::load(&config_path)?;
    let storage = match options.global.file.as_ref() {
        Some(file) => Storage::new(file.clone()),
        None => Storage::from_config(&config),
    };
    let created_data = if storage.exists() {
        false
    } else {
        storage.save(&GoalStore::new())?;
        true
    };

    let mut created_items = Vec::new();
    if created_config {
        created_items.push(config_path.display().to_string());
    }
    if created_data {
        created_items.push(storage.data_file().display().to_string());
    }

    let header = if created_items.is_empty() {
        "goaltree init: nothing to do"
    } else {
        "goaltree init: initialized"
    };

    let mut human = HumanOutput::new(header);
    human.push_summary("config", config_path.display().to_string());
    human.push_summary("data file", storage.data_file().display().to_string());
    human.push_summary(
        "created",
        if created_items.is_empty() {
            "none".to_string()
        } else {
            created_items.join(", ")
        },
    );
    human.push_next_step("goaltree add \"My first goal\" --due 2026-12-31");

    emit_success(
        options.global.output(),
        "init",
        &InitReport {
            config: config_path,
            data_file: storage.data_file().to_path_buf(),
            created: InitCreated {
                config: created_config,
                data_file: created_data,
            },
        },
        Some(&human),
    )
}
