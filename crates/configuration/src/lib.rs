use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use logging::init_tracing;
pub use settings::{AnalyticsSettings, Bucketing, Config, DataSource, LoggingConfig, RankOrder};

/// Prefix of environment variables that override file settings,
/// e.g. `SALESBOARD__DATA_SOURCE__PATH`.
pub const ENV_PREFIX: &str = "SALESBOARD";

/// Loads the application configuration from an optional `config.toml` in the
/// working directory, layered under `SALESBOARD__*` environment variables.
///
/// Every key has a default, so a missing file is not an error.
pub fn load_config() -> Result<Config, ConfigError> {
    build(config::File::with_name("config.toml").required(false))
}

/// Loads the application configuration from an explicit TOML file, which must exist.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    build(config::File::from(path).format(config::FileFormat::Toml).required(true))
}

fn build<S>(file: S) -> Result<Config, ConfigError>
where
    S: config::Source + Send + Sync + 'static,
{
    let builder = config::Config::builder()
        .add_source(file)
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let config = builder.try_deserialize::<Config>()?;
    validate(&config)?;

    Ok(config)
}

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.analytics.top_categories == 0 {
        return Err(ConfigError::ValidationError(
            "analytics.top_categories must be at least 1".to_string(),
        ));
    }
    if config.data_source.path.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "data_source.path must not be empty".to_string(),
        ));
    }
    Ok(())
}
