//! Config loading: locate the file, decode it, then overlay flags

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::ffi::OsString;
use std::path::PathBuf;

use super::locate::{config_flag, Locator};
use super::merge::{decode_into, overlay_flags, FlagOverlay};
use super::ConfigError;

/// Result of a full load.
#[derive(Debug)]
pub struct Loaded<C> {
    /// Config file that was decoded, if any.
    pub source: Option<PathBuf>,
    /// Sub-command selected on the command line.
    pub command: Option<C>,
}

/// Loads an application's config from its file and command line.
#[derive(Debug, Clone)]
pub struct Loader {
    locator: Locator,
    args: Option<Vec<OsString>>,
}

impl Loader {
    /// Search the default locations for `app_name` and read the process arguments.
    pub fn new(app_name: &str) -> Self {
        Self { locator: Locator::new(app_name), args: None }
    }

    pub fn locator(mut self, locator: Locator) -> Self {
        self.locator = locator;
        self
    }

    /// Use these arguments instead of `std::env::args_os()`. The first one is
    /// the binary name.
    pub fn args<I, T>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        self.args = Some(args.into_iter().map(Into::into).collect());
        self
    }

    pub fn load<F>(&self, config: &mut F::Config) -> Result<Loaded<F::Command>, ConfigError>
    where
        F: FlagOverlay,
        F::Config: Serialize + DeserializeOwned,
    {
        let args = match &self.args {
            Some(args) => args.clone(),
            None => std::env::args_os().collect(),
        };

        let explicit = config_flag(args.iter().skip(1).cloned())?;
        let source = self.locator.locate(explicit.as_deref());
        if let Some(path) = &source {
            decode_into(path, config)?;
        }

        let command = overlay_flags::<F>(args, config)?;
        Ok(Loaded { source, command })
    }

    pub fn parse_command<F>(&self, config: &mut F::Config) -> Result<Option<F::Command>, ConfigError>
    where
        F: FlagOverlay,
        F::Config: Serialize + DeserializeOwned,
    {
        self.load::<F>(config).map(|loaded| loaded.command)
    }

    pub fn parse<F>(&self, config: &mut F::Config) -> Result<(), ConfigError>
    where
        F: FlagOverlay,
        F::Config: Serialize + DeserializeOwned,
    {
        self.load::<F>(config).map(|_| ())
    }
}

/// Populate `config` for `app_name` from its config file and the process
/// arguments, returning the active sub-command.
pub fn parse_command<F>(app_name: &str, config: &mut F::Config) -> Result<Option<F::Command>, ConfigError>
where
    F: FlagOverlay,
    F::Config: Serialize + DeserializeOwned,
{
    Loader::new(app_name).parse_command::<F>(config)
}

/// Like [`parse_command`] but discards the sub-command.
pub fn parse<F>(app_name: &str, config: &mut F::Config) -> Result<(), ConfigError>
where
    F: FlagOverlay,
    F::Config: Serialize + DeserializeOwned,
{
    Loader::new(app_name).parse::<F>(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::{Parser, Subcommand};
    use serde::Deserialize;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    #[serde(default)]
    struct AppConfig {
        name: String,
        retries: u32,
    }

    #[derive(Parser)]
    #[command(name = "app")]
    struct Flags {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        retries: Option<u32>,
        #[command(subcommand)]
        command: Option<Cmd>,
    }

    #[derive(Debug, PartialEq, Subcommand)]
    enum Cmd {
        Up,
        Down,
    }

    impl FlagOverlay for Flags {
        type Config = AppConfig;
        type Command = Cmd;

        fn overlay(self, config: &mut AppConfig) -> Option<Cmd> {
            if let Some(name) = self.name {
                config.name = name;
            }
            if let Some(retries) = self.retries {
                config.retries = retries;
            }
            self.command
        }
    }

    fn loader(dir: &Path, args: &[&str]) -> Loader {
        Loader::new("app")
            .locator(Locator::with_search_dirs([dir]))
            .args(std::iter::once("app").chain(args.iter().copied()))
    }

    #[test]
    fn test_no_config_file_is_not_an_error() {
        let tmp = TempDir::new().expect("tmp");
        let mut cfg = AppConfig::default();
        let loaded = loader(tmp.path(), &[]).load::<Flags>(&mut cfg).expect("load");
        assert!(loaded.source.is_none());
        assert!(loaded.command.is_none());
        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn test_flag_overrides_file() {
        let tmp = TempDir::new().expect("tmp");
        fs::write(tmp.path().join("config.yaml"), "name: \"a\"\nretries: 3\n").expect("write");

        let mut cfg = AppConfig::default();
        let loaded = loader(tmp.path(), &["--name", "b"]).load::<Flags>(&mut cfg).expect("load");
        assert_eq!(loaded.source, Some(tmp.path().join("config.yaml")));
        assert_eq!(cfg, AppConfig { name: "b".into(), retries: 3 });
    }

    #[test]
    fn test_explicit_config_wins_over_discovered_file() {
        let tmp = TempDir::new().expect("tmp");
        fs::write(tmp.path().join("config.yaml"), "name: from-yaml\n").expect("write");
        let custom = tmp.path().join("custom.json");
        fs::write(&custom, r#"{"name": "from-json", "retries": 5}"#).expect("write");

        let mut cfg = AppConfig::default();
        let custom_arg = custom.to_str().expect("utf8 path");
        loader(tmp.path(), &["--config", custom_arg]).parse::<Flags>(&mut cfg).expect("parse");
        assert_eq!(cfg, AppConfig { name: "from-json".into(), retries: 5 });
    }

    #[test]
    fn test_active_command_is_returned() {
        let tmp = TempDir::new().expect("tmp");
        let mut cfg = AppConfig::default();
        let cmd = loader(tmp.path(), &["--retries", "2", "down"])
            .parse_command::<Flags>(&mut cfg)
            .expect("parse");
        assert_eq!(cmd, Some(Cmd::Down));
        assert_eq!(cfg.retries, 2);
    }

    #[test]
    fn test_unsupported_explicit_config() {
        let tmp = TempDir::new().expect("tmp");
        let txt = tmp.path().join("config.txt");
        fs::write(&txt, "name: a\n").expect("write");

        let arg = format!("--config={}", txt.display());
        let err = loader(tmp.path(), &[arg.as_str()])
            .parse::<Flags>(&mut AppConfig::default())
            .expect_err("unsupported");
        assert!(matches!(err, ConfigError::UnsupportedFormat { .. }), "got {err:?}");
    }

    #[test]
    fn test_missing_explicit_config_is_open_error() {
        let tmp = TempDir::new().expect("tmp");
        let missing = tmp.path().join("missing.yaml");
        let err = loader(tmp.path(), &["--config", missing.to_str().expect("utf8 path")])
            .parse::<Flags>(&mut AppConfig::default())
            .expect_err("missing");
        assert!(matches!(err, ConfigError::FileOpen { .. }), "got {err:?}");
    }

    #[test]
    fn test_help_short_circuits() {
        let tmp = TempDir::new().expect("tmp");
        let err = loader(tmp.path(), &["--help"])
            .parse::<Flags>(&mut AppConfig::default())
            .expect_err("help");
        assert!(err.is_informational());
        match err {
            ConfigError::HelpRequested(text) => assert!(text.contains("Usage")),
            other => panic!("expected HelpRequested, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_error_surfaces_before_flags() {
        let tmp = TempDir::new().expect("tmp");
        fs::write(tmp.path().join("config.json"), "{\"retries\": \"many\"}").expect("write");

        let err = loader(tmp.path(), &["--retries", "1"])
            .parse::<Flags>(&mut AppConfig::default())
            .expect_err("decode");
        assert!(matches!(err, ConfigError::Decode { .. }), "got {err:?}");
    }
}
