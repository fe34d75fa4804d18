//! # Quantdesk Configuration
//!
//! Runtime settings for the command-line front end. Settings are layered: built-in
//! defaults, then an optional TOML file, then `QUANTDESK_*` environment variables
//! (sections separated by `__`, e.g. `QUANTDESK_SIMULATION__SEED=7`).

use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{LoggingSettings, OutputFormat, OutputSettings, Settings, SimulationSettings};

/// The file looked up in the working directory when no explicit path is given.
pub const DEFAULT_CONFIG_FILE: &str = "quantdesk.toml";

/// Loads the application settings.
///
/// With `path` set, that file must exist. Without it, `quantdesk.toml` in the
/// working directory is read if present and silently skipped otherwise.
pub fn load_settings(path: Option<&Path>) -> Result<Settings, ConfigError> {
    let file = match path {
        Some(p) => config::File::from(p).required(true),
        None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
    };

    let builder = config::Config::builder()
        .add_source(file)
        .add_source(
            config::Environment::with_prefix("QUANTDESK")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let settings = builder.try_deserialize::<Settings>()?;
    settings.validate()?;

    tracing::debug!(?settings, "configuration loaded");
    Ok(settings)
}

impl Settings {
    /// Checks the invariants that deserialization alone cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.logging.level.trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: "logging.level",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }
}
