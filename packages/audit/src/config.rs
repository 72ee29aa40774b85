//! Loading [`Config`] from TOML.
//!
//! The default configuration ships inside the binary via [`include_str!`].
//! A user-supplied file replaces it wholesale; sections it omits fall back
//! to the serde defaults on the config structs.

use std::path::Path;

use osm_clean_audit_models::Config;

/// Configuration embedded at compile time.
pub const DEFAULT_CONFIG_TOML: &str = include_str!("../config/osm_clean.toml");

/// Errors from loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file not found.
    #[error("Config file not found: {0}")]
    FileNotFound(String),

    /// I/O error reading the config file.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path that caused the error.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The file is not valid TOML or does not match the config layout.
    #[error("Invalid config {path}: {message}")]
    Parse {
        /// Path (or `<embedded>`) of the offending document.
        path: String,
        /// Parser message.
        message: String,
    },
}

/// Parses a TOML config document.
///
/// # Errors
///
/// Returns [`ConfigError::Parse`] if the document is malformed.
pub fn parse_config(toml_str: &str, origin: &str) -> Result<Config, ConfigError> {
    toml::de::from_str(toml_str).map_err(|e| ConfigError::Parse {
        path: origin.to_string(),
        message: e.to_string(),
    })
}

/// Loads the config at `path`, or the embedded default when `path` is
/// `None`.
///
/// # Errors
///
/// Returns an error if the file is missing, unreadable, or malformed.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let Some(path) = path else {
        log::debug!("Using embedded default config");
        return parse_config(DEFAULT_CONFIG_TOML, "<embedded>");
    };

    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.display().to_string(),
        source: e,
    })?;

    log::info!("Loaded config from {}", path.display());
    parse_config(&contents, &path.display().to_string())
}
