//! Show command implementation

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};

use super::settings::AppConfig;

#[derive(Args, Default)]
pub struct ShowArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Yaml)]
    pub output: OutputFormat,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Yaml,
    Json,
}

pub fn run(config: &AppConfig, args: ShowArgs) -> Result<()> {
    print!("{}", render(config, args.output)?);
    Ok(())
}

fn render(config: &AppConfig, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Yaml => {
            serde_yaml::to_string(config).context("Failed to render configuration as YAML")
        }
        OutputFormat::Json => serde_json::to_string_pretty(config)
            .map(|json| json + "\n")
            .context("Failed to render configuration as JSON"),
    }
}
