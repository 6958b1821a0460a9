//! Config file discovery

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use super::ConfigError;

/// File names tried in every search directory, in order.
pub const CONFIG_FILE_NAMES: [&str; 3] = ["config.yaml", "config.yml", "config.json"];

/// Finds the config file for an application.
///
/// The default search path is the current directory, then `~/.<app>`, then
/// `/etc/<app>`.
#[derive(Debug, Clone)]
pub struct Locator {
    search_dirs: Vec<PathBuf>,
}

impl Locator {
    /// Default search path, reading the home directory from `HOME`.
    pub fn new(app_name: &str) -> Self {
        let home = std::env::var_os("HOME").filter(|h| !h.is_empty()).map(PathBuf::from);
        Self::with_home(app_name, home)
    }

    /// Default search path with an explicit home directory. `None` skips `~/.<app>`.
    pub fn with_home(app_name: &str, home: Option<PathBuf>) -> Self {
        let mut search_dirs = vec![PathBuf::from(".")];
        if let Some(home) = home {
            search_dirs.push(home.join(format!(".{}", app_name)));
        }
        search_dirs.push(Path::new("/etc").join(app_name));
        Self { search_dirs }
    }

    pub fn with_search_dirs<I, P>(dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self { search_dirs: dirs.into_iter().map(Into::into).collect() }
    }

    pub fn search_dirs(&self) -> &[PathBuf] {
        &self.search_dirs
    }

    /// Every candidate path in search order.
    pub fn candidates(&self) -> impl Iterator<Item = PathBuf> + '_ {
        self.search_dirs
            .iter()
            .flat_map(|dir| CONFIG_FILE_NAMES.iter().map(move |name| dir.join(name)))
    }

    /// Resolve the config file to read.
    ///
    /// An explicit path is returned as-is without checking that it exists.
    /// Otherwise the first readable candidate wins; `None` means no config file,
    /// which is not an error.
    pub fn locate(&self, explicit: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            tracing::debug!("Using explicit config file {}", path.display());
            return Some(path.to_path_buf());
        }

        for candidate in self.candidates() {
            if is_readable_file(&candidate) {
                tracing::debug!("Discovered config file {}", candidate.display());
                return Some(candidate);
            }
            tracing::trace!("No config at {}", candidate.display());
        }

        tracing::debug!("No config file found in {} search directories", self.search_dirs.len());
        None
    }
}

fn is_readable_file(path: &Path) -> bool {
    // A directory named config.yaml opens fine on unix, so check the kind first.
    let is_file = fs::metadata(path).map(|m| m.is_file()).unwrap_or(false);
    is_file && fs::File::open(path).is_ok()
}

/// Pull `--config <path>` / `--config=<path>` out of raw arguments.
///
/// `args` excludes the binary name. Every other token is ignored, scanning stops
/// at `--`, and the last occurrence wins.
pub fn config_flag<I, T>(args: I) -> Result<Option<PathBuf>, ConfigError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut found = None;
    let mut iter = args.into_iter().map(Into::into);

    while let Some(arg) = iter.next() {
        let Some(text) = arg.to_str() else {
            continue;
        };
        if text == "--" {
            break;
        }
        if text == "--config" {
            match iter.next() {
                Some(value) => found = Some(PathBuf::from(value)),
                None => {
                    return Err(ConfigError::FlagParse(clap::Error::raw(
                        clap::error::ErrorKind::InvalidValue,
                        "a value is required for '--config <FILE>' but none was supplied\n",
                    )))
                }
            }
        } else if let Some(value) = text.strip_prefix("--config=") {
            found = Some(PathBuf::from(value));
        }
    }

    Ok(found)
}
