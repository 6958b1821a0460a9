//! config-overlay: show the effective configuration of a layered config setup
//!
//! Reads `config.{yaml,yml,json}` from the usual search path, overlays the
//! command-line flags, and prints the result.

use anyhow::Result;

mod cli;

fn main() -> Result<()> {
    cli::run()
}
