//! Configuration file loading

use super::schema::ConfigSchema;
use crate::error::{Error, Result, ResultExt};
use std::path::{Path, PathBuf};

/// Standard configuration file locations, in lookup order
const CANDIDATES: [&str; 3] = [
    ".releasekit.toml",
    "releasekit.toml",
    ".config/releasekit.toml",
];

/// Configuration wrapper
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub schema: ConfigSchema,
    pub path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from an explicit path, a standard location under
    /// the current directory, or fall back to defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_from(path, Path::new("."))
    }

    /// Same as [`Config::load`] but searches standard locations under `base`
    pub fn load_from(path: Option<&Path>, base: &Path) -> Result<Self> {
        let config_path = match path {
            Some(p) => {
                if !p.is_file() {
                    return Err(Error::config_not_found(p));
                }
                Some(p.to_path_buf())
            }
            None => find_config_file(base),
        };

        let schema = match config_path {
            Some(ref p) => load_config_file(p)?,
            None => ConfigSchema::default(),
        };

        tracing::debug!(path = ?config_path, "configuration loaded");

        Ok(Self {
            schema,
            path: config_path,
        })
    }
}

/// Find configuration file in standard locations
fn find_config_file(base: &Path) -> Option<PathBuf> {
    CANDIDATES
        .iter()
        .map(|candidate| base.join(candidate))
        .find(|candidate| candidate.is_file())
}

/// Load and parse a TOML configuration file
fn load_config_file(path: &Path) -> Result<ConfigSchema> {
    let content = std::fs::read_to_string(path)
        .map_err(Error::from)
        .context(format!("Failed to read config file {}", path.display()))?;

    toml::from_str(&content)
        .map_err(Error::from)
        .context(format!("Failed to parse config file {}", path.display()))
}
