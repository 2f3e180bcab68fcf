#![deny(unsafe_code)]

mod clicker;
mod commands;
mod common;
mod config;
mod constants;
mod controller;
mod picker;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::config::KeyIdentifier;
use crate::controller::{Feature, KeySlot};

#[derive(Parser)]
#[command(name = "fufu-launcher-settings")]
#[command(version)]
#[command(about = "Launcher auto-clicker and additional program settings", long_about = None)]
struct Cli {
    /// Settings file to use instead of the platform default
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Enable debug logging (RUST_LOG overrides)
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the current settings
    Show {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// List every key name that can be bound
    Keys,
    /// Turn a feature on or off
    Enable {
        #[arg(value_enum)]
        feature: Feature,
        #[arg(action = clap::ArgAction::Set)]
        enabled: bool,
    },
    /// Bind a key to a slot
    Bind {
        #[arg(value_enum)]
        slot: KeySlot,
        key: KeyIdentifier,
    },
    /// Record a key for a slot, read as a key name from stdin
    Record {
        #[arg(value_enum)]
        slot: KeySlot,
    },
    /// Select the additional program to launch
    SetProgram { path: PathBuf },
    /// Write the current settings back to the store
    Save,
    /// Broadcast a background refresh request
    Refresh {
        /// Ask listeners to reuse cached backgrounds
        #[arg(long)]
        no_force: bool,
    },
}

fn init_logging(debug: bool) -> Result<()> {
    let default_level = if debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.debug)?;

    // The controller is single-threaded; everything runs on one LocalSet
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to build Tokio runtime")?;
    let local = tokio::task::LocalSet::new();

    local.block_on(&rt, commands::run(cli.settings, cli.command))
}
