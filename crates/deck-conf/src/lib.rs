//! deck-conf: configuration loader for LaunchDeck.
//!
//! Provides:
//! - Launcher path layout (base directory, config file, cache directory)
//! - INI-style config parsing with multi-line values
//! - Application records consumed by the icon engine and the launcher

mod error;
mod parse;
mod paths;
mod record;

pub use error::ConfError;
pub use parse::{LauncherConfig, parse_config, read_config};
pub use paths::{LauncherPaths, resolve_path};
pub use record::{AppRecord, parse_flag};
