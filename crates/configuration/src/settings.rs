use serde::Deserialize;

/// The root configuration structure for the entire application.
///
/// Every section is optional; a missing `quantdesk.toml` yields `Settings::default()`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub output: OutputSettings,
    pub simulation: SimulationSettings,
    pub logging: LoggingSettings,
}

/// How results are rendered on stdout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum OutputFormat {
    /// Human-readable terminal tables.
    #[default]
    Table,
    /// One JSON document per invocation.
    Json,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    pub format: OutputFormat,
}

/// Parameters for the Monte Carlo calculators.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    /// Seeds the random generator for reproducible runs.
    /// Left unset, every run draws fresh entropy.
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// The default `tracing` filter directive, e.g. "warn" or "calculators=debug".
    /// `RUST_LOG` takes precedence when set.
    pub level: String,
}

// --- Default Implementations ---

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}
