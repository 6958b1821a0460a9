//! Command-line interface for config-overlay
//!
//! Every flag below overrides the matching field from the config file.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::ffi::OsString;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, reload, EnvFilter, Registry};

use config_overlay::{ConfigError, FlagOverlay, Loader};

mod completions;
mod settings;
mod show;

use settings::AppConfig;

const APP_NAME: &str = env!("CARGO_PKG_NAME");

/// Locate a YAML/JSON config file and overlay command-line flags on top of it
#[derive(Parser)]
#[command(name = "config-overlay")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to config file (default: first config.{yaml,yml,json} in ., ~/.config-overlay, /etc/config-overlay)
    #[arg(long, value_name = "FILE", global = true)]
    #[allow(dead_code)] // read by the file locator before flag parsing
    config: Option<PathBuf>,

    /// Instance name
    #[arg(long, value_name = "NAME", global = true)]
    name: Option<String>,

    /// Address to listen on
    #[arg(long, value_name = "ADDR", global = true)]
    listen: Option<String>,

    /// Number of workers
    #[arg(long, value_name = "N", global = true)]
    workers: Option<usize>,

    /// Log filter used when RUST_LOG is unset (e.g. 'info', 'config_overlay=debug')
    #[arg(long, value_name = "FILTER", global = true)]
    log_level: Option<String>,

    /// Replace configured tags (repeatable or comma-separated)
    #[arg(long = "tag", value_name = "TAGS", value_delimiter = ',', global = true)]
    tags: Vec<String>,

    /// Enable verbose logging (sets log level to DEBUG)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the effective configuration (default)
    Show(show::ShowArgs),

    /// Print the config file that was loaded, or 'none'
    Locate,

    /// Generate shell completion scripts
    Completions(completions::CompletionsArgs),
}

impl FlagOverlay for Cli {
    type Config = AppConfig;
    type Command = Commands;

    fn overlay(self, config: &mut AppConfig) -> Option<Commands> {
        if let Some(name) = self.name {
            config.name = name;
        }
        if let Some(listen) = self.listen {
            config.listen = listen;
        }
        if let Some(workers) = self.workers {
            config.workers = workers;
        }
        if let Some(log_level) = self.log_level {
            config.log_level = log_level;
        }
        if !self.tags.is_empty() {
            config.tags = self.tags;
        }
        if self.verbose {
            config.verbose = true;
        }
        self.command
    }
}

pub fn run() -> Result<()> {
    let args: Vec<_> = std::env::args_os().collect();
    let log_filter = init_tracing(verbose_flag(&args));

    let mut config = AppConfig::default();
    let loaded = match Loader::new(APP_NAME).args(args).load::<Cli>(&mut config) {
        Ok(loaded) => loaded,
        Err(ConfigError::HelpRequested(text)) | Err(ConfigError::VersionRequested(text)) => {
            print!("{}", text);
            return Ok(());
        }
        Err(err) => return Err(err).context("Failed to load configuration"),
    };

    if let Some(handle) = log_filter {
        let _ = handle.reload(log_filter_for(config.verbose, &config.log_level));
    }
    match &loaded.source {
        Some(path) => tracing::debug!("Configuration loaded from {}", path.display()),
        None => tracing::debug!("No config file found; using defaults and flags"),
    }

    match loaded.command.unwrap_or_else(|| Commands::Show(show::ShowArgs::default())) {
        Commands::Show(args) => show::run(&config, args),
        Commands::Locate => {
            match loaded.source {
                Some(path) => println!("{}", path.display()),
                None => println!("none"),
            }
            Ok(())
        }
        Commands::Completions(args) => completions::run(args),
    }
}

type LogFilterHandle = reload::Handle<EnvFilter, Registry>;

/// Install the subscriber before loading so locator and decode events are
/// visible. The filter is swapped once the configured log level is known.
fn init_tracing(verbose: bool) -> Option<LogFilterHandle> {
    let (filter, handle) = reload::Layer::new(log_filter_for(verbose, "warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .ok()
        .map(|_| handle)
}

// RUST_LOG in the environment always takes precedence; --verbose falls back to DEBUG,
// otherwise the configured log_level applies.
fn log_filter_for(verbose: bool, log_level: &str) -> EnvFilter {
    if verbose {
        EnvFilter::from_default_env().add_directive(Level::DEBUG.into())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("warn"))
        })
    }
}

/// `-v` / `--verbose` anywhere before `--`, ahead of the full parse.
fn verbose_flag(args: &[OsString]) -> bool {
    args.iter()
        .skip(1)
        .filter_map(|arg| arg.to_str())
        .take_while(|arg| *arg != "--")
        .any(|arg| arg == "-v" || arg == "--verbose")
}
