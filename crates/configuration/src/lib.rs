use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{AnalysisSettings, ChartSettings, Config, Logging, Metric, Paths};

/// Environment variables with this prefix override file values,
/// e.g. `PAIRWISE__PATHS__RESULTS_ROOT=/tmp/results`.
pub const ENV_PREFIX: &str = "PAIRWISE";

/// Loads the application configuration.
///
/// Reads `path` when given (the file must then exist), otherwise an optional
/// `config.toml` in the working directory, and layers `PAIRWISE__*` environment
/// variables on top. Every value has a default, so an absent file is not an error.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let file = match path {
        Some(path) => config::File::from(path).required(true),
        None => config::File::with_name("config").required(false),
    };

    let builder = config::Config::builder()
        .add_source(file)
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.try_deserialize::<Config>()?;
    validate(&config)?;

    tracing::debug!(?config, "Configuration loaded.");
    Ok(config)
}

/// Rejects values that would make every later computation meaningless.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    let invalid = |key, reason: String| Err(ConfigError::Invalid { key, reason });

    if config.paths.data_dir.as_os_str().is_empty() {
        return invalid("paths.data_dir", "must not be empty".to_string());
    }
    if config.paths.results_root.as_os_str().is_empty() {
        return invalid("paths.results_root", "must not be empty".to_string());
    }
    if !config.analysis.risk_free_rate.is_finite() {
        return invalid(
            "analysis.risk_free_rate",
            format!("must be a finite number, got {}", config.analysis.risk_free_rate),
        );
    }
    if config.chart.width < 200 || config.chart.height < 150 {
        return invalid(
            "chart",
            format!(
                "must be at least 200x150 pixels, got {}x{}",
                config.chart.width, config.chart.height
            ),
        );
    }
    Ok(())
}
