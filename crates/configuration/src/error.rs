use thiserror::Error;

/// Why the settings could not be produced.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file was missing, unreadable, or did not fit the `Settings` shape.
    #[error("could not read settings: {0}")]
    Source(#[from] config::ConfigError),

    #[error("invalid setting `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}
