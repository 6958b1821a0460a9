//! config-overlay: layered configuration for command-line programs
//!
//! Locates `config.yaml` / `config.yml` / `config.json` in the current
//! directory, `~/.<app>`, or `/etc/<app>`, decodes it onto your config struct,
//! then overlays the command-line flags your `clap` schema declares.

pub mod config;

pub use config::{
    parse, parse_command, ConfigError, FlagOverlay, Format, Loaded, Loader, Locator,
};
