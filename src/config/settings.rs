//! Application settings loaded from config.toml.

use super::catalog::ProductConfig;
use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

/// Default location of the settings file
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Contents of config.toml
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Database settings
    #[serde(default)]
    pub database: DatabaseSettings,
    /// Product catalog to seed
    #[serde(default)]
    pub products: Vec<ProductConfig>,
}

/// `[database]` table
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DatabaseSettings {
    /// Connection URL; `DATABASE_URL` takes precedence
    pub url: Option<String>,
}

/// Loads settings from a TOML file.
///
/// # Errors
/// Returns [`Error::Config`] if the file cannot be read or is not valid TOML for [`AppConfig`].
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    debug!("Attempting to load configuration from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;

    parse_config(&contents, path_ref)
}

fn parse_config(contents: &str, path: &Path) -> Result<AppConfig> {
    toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse {}: {e}", path.display()),
    })
}

/// Loads `./config.toml`, falling back to defaults when the file does not exist.
///
/// # Errors
/// Returns [`Error::Io`] if the file exists but cannot be read, or [`Error::Config`] if it
/// cannot be parsed.
pub fn load_default_config() -> Result<AppConfig> {
    let path = Path::new(DEFAULT_CONFIG_PATH);
    match std::fs::read_to_string(path) {
        Ok(contents) => {
            debug!("Loaded configuration from: {:?}", path);
            parse_config(&contents, path)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            info!("No {DEFAULT_CONFIG_PATH} found, using defaults");
            Ok(AppConfig::default())
        }
        Err(e) => Err(e.into()),
    }
}
