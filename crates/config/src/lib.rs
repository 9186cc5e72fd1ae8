//! Configuration loading and validation for skiff.
//!
//! Settings are layered: built-in defaults, then an optional TOML file in
//! the platform config directory, then `SKIFF_*` environment variables.
//! Command-line flags override all of these, but that merge belongs to the
//! binary; this crate only produces the resolved [`Settings`].

pub mod error;

use crate::error::{ErrorKind, Result};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default worker pool size for the fetch-and-hash phase.
pub const DEFAULT_WORKERS: usize = 4;

/// Run defaults that are not tied to a single invocation.
///
/// Per-run values (input, output, authz) are command-line arguments only
/// and never come from a file or the environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Worker pool size; validated (>= 1) by the pipeline, not here.
    pub workers: usize,
    /// Skip the first non-blank input line.
    pub skip_header: bool,
    /// AWS profile name passed through to the credential chain.
    pub profile: Option<String>,
    /// AWS region override.
    pub region: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            skip_header: false,
            profile: None,
            region: None,
        }
    }
}

impl Settings {
    /// Load settings from the default config file location and environment.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load settings, layering defaults, the given TOML file (if any; a
    /// missing file is not an error), and `SKIFF_*` environment variables.
    pub fn load_from(file: Option<PathBuf>) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Settings::default()));
        if let Some(file) = file {
            tracing::debug!(path = %file.display(), "merging configuration file");
            figment = figment.merge(Toml::file(file));
        }
        let settings = figment.merge(Env::prefixed("SKIFF_")).extract().map_err(ErrorKind::Load)?;
        Ok(settings)
    }
}

/// Platform config file location, e.g. `~/.config/skiff/skiff.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "skiff").map(|dirs| dirs.config_dir().join("skiff.toml"))
}
