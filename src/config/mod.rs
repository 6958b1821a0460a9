//! Configuration loading and merging
//!
//! Finds a YAML/JSON config file, decodes it onto a caller-owned struct, and
//! overlays command-line flags with precedence CLI > File > starting value.

mod args;
pub mod error;
pub mod loader;
pub mod locate;
pub mod merge;

pub use error::{ConfigError, DecodeError};
pub use loader::{parse, parse_command, Loaded, Loader};
pub use locate::{config_flag, Locator, CONFIG_FILE_NAMES};
pub use merge::{decode_into, overlay_flags, FlagOverlay, Format};
