//! CLI module for Rulebook Assistant
//!
//! - `serve`: HTTP API answering questions from the active index
//! - `index`: build a new index snapshot from the knowledge export
//! - `ask`: answer a single question from the stored index

pub mod ask;
pub mod index;
pub mod serve;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};

use crate::config::AppConfig;
use crate::infrastructure::logging;

/// Rulebook Assistant - answers employee questions about company rules
#[derive(Parser)]
#[command(name = "rulebook-assistant")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP API
    Serve(serve::ServeArgs),

    /// Build and publish a new index snapshot
    Index(index::IndexArgs),

    /// Answer one question and print the result as JSON
    Ask(ask::AskArgs),
}

/// Options shared by every subcommand
#[derive(Args, Debug, Clone, Default)]
pub struct CommonArgs {
    /// Override the knowledge export path
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Override the snapshot directory
    #[arg(long)]
    pub snapshot_dir: Option<PathBuf>,
}

impl CommonArgs {
    fn apply(&self, config: &mut AppConfig) {
        if let Some(ref export) = self.export {
            config.index.export_path = export.clone();
        }
        if let Some(ref dir) = self.snapshot_dir {
            config.index.snapshot_dir = dir.clone();
        }
    }
}

/// Load `.env` and the layered configuration, then start logging
fn load_config(common: &CommonArgs) -> anyhow::Result<AppConfig> {
    dotenvy::dotenv().ok();

    let mut config = AppConfig::load().context("Failed to load configuration")?;
    common.apply(&mut config);

    logging::init_logging(&config.logging);

    Ok(config)
}
