//! Merging config file contents and command-line flags into one value
//!
//! Precedence is CLI > File > the caller's starting value.

use clap::error::ErrorKind;
use clap::Parser;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::ffi::OsString;
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::args::filter_args;
use super::{ConfigError, DecodeError};

/// A flag schema that knows how to write its parsed values onto a config.
///
/// Implementors copy only the flags the user actually gave (typically
/// `Option` fields and set booleans), so values from the file survive
/// when a flag is absent.
pub trait FlagOverlay: Parser {
    /// Config populated from the file and then from flags.
    ///
    /// File values reach it through a serde round-trip, so every field must
    /// serialize and deserialize; see [`decode_into`].
    type Config;
    /// Sub-command enum; use `()` or an uninhabited enum when there is none.
    type Command;

    /// Apply the parsed flags and return the active sub-command, if any.
    fn overlay(self, config: &mut Self::Config) -> Option<Self::Command>;
}

/// Config file encodings, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Yaml,
}

impl Format {
    pub fn from_path(path: &Path) -> Option<Format> {
        let ext = path.extension().and_then(|e| e.to_str())?.to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(Format::Json),
            "yaml" | "yml" => Some(Format::Yaml),
            _ => None,
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::Json => f.write_str("JSON"),
            Format::Yaml => f.write_str("YAML"),
        }
    }
}

/// Decode `path` onto `config`.
///
/// Fields present in the file replace the current ones; nested objects merge
/// key by key and everything the file leaves out keeps its current value.
///
/// The current value is serialized, merged with the file, and deserialized
/// back, so only fields that round-trip through serde are carried over. A
/// `#[serde(skip)]` field comes back as its `Default`, and a
/// `skip_serializing` field on a struct without `#[serde(default)]` is
/// rejected with [`ConfigError::Decode`]. Keep runtime-only state out of the
/// config struct.
pub fn decode_into<T>(path: &Path, config: &mut T) -> Result<(), ConfigError>
where
    T: Serialize + DeserializeOwned,
{
    let content = read_file(path)?;

    let Some(format) = Format::from_path(path) else {
        return Err(ConfigError::UnsupportedFormat { path: path.to_path_buf() });
    };
    let decode_err = |source: DecodeError| ConfigError::Decode {
        path: path.to_path_buf(),
        format,
        source,
    };

    let patch: Value = match format {
        Format::Json => {
            serde_json::from_slice(&content).map_err(|e| decode_err(DecodeError::from(e)))?
        }
        Format::Yaml => first_yaml_document(&content).map_err(|e| decode_err(e.into()))?,
    };

    let mut current = serde_json::to_value(&*config).map_err(|e| decode_err(e.into()))?;
    overlay_value(&mut current, patch);
    *config = serde_json::from_value(current).map_err(|e| decode_err(e.into()))?;

    tracing::debug!("Loaded {} config from {}", format, path.display());
    Ok(())
}

/// Only the first document of a multi-document stream is used; an empty
/// stream decodes as `null`.
fn first_yaml_document(content: &[u8]) -> Result<Value, serde_yaml::Error> {
    match serde_yaml::Deserializer::from_slice(content).next() {
        Some(document) => Value::deserialize(document),
        None => Ok(Value::Null),
    }
}

/// Read the whole file; the handle is dropped before returning. Text encoding
/// is left to the decoder so invalid UTF-8 is a decode error.
fn read_file(path: &Path) -> Result<Vec<u8>, ConfigError> {
    let open_err = |source| ConfigError::FileOpen { path: path.to_path_buf(), source };
    let mut file = File::open(path).map_err(open_err)?;
    let mut content = Vec::new();
    file.read_to_end(&mut content).map_err(open_err)?;
    Ok(content)
}

/// Write `patch` onto `base`. Objects merge recursively, `null` is skipped,
/// anything else replaces.
pub fn overlay_value(base: &mut Value, patch: Value) {
    match (base, patch) {
        (_, Value::Null) => {}
        (Value::Object(base_map), Value::Object(patch_map)) => {
            for (key, value) in patch_map {
                match base_map.get_mut(&key) {
                    Some(existing) => overlay_value(existing, value),
                    None => {
                        if !value.is_null() {
                            base_map.insert(key, value);
                        }
                    }
                }
            }
        }
        (base, patch) => *base = patch,
    }
}

/// Parse `args` (binary name first) with the schema `F` and overlay the result.
///
/// Flags the schema does not declare are dropped before parsing.
pub fn overlay_flags<F>(
    args: Vec<OsString>,
    config: &mut F::Config,
) -> Result<Option<F::Command>, ConfigError>
where
    F: FlagOverlay,
{
    let args = filter_args(&F::command(), args);
    let parsed = F::try_parse_from(args).map_err(map_clap_error)?;
    Ok(parsed.overlay(config))
}

fn map_clap_error(err: clap::Error) -> ConfigError {
    match err.kind() {
        // DisplayHelpOnMissingArgumentOrSubcommand is a usage error, not a request.
        ErrorKind::DisplayHelp => ConfigError::HelpRequested(err.render().to_string()),
        ErrorKind::DisplayVersion => ConfigError::VersionRequested(err.render().to_string()),
        _ => ConfigError::FlagParse(err),
    }
}
