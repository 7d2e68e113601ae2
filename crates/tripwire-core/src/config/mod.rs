//! Config - TOML configuration, validation, and construction of each
//! project's trigger and state store.

pub mod build;
pub mod error;
pub mod loader;
pub mod model;
pub mod validation;

use std::path::Path;

pub use build::{BuildContext, BuiltProject, build_projects};
pub use error::{ConfigError, render_errors};
pub use loader::{DEFAULT_CONFIG_FILE, load_config, load_config_from_path, load_config_from_str};
pub use model::{ProjectConfig, StateConfig, TriggerConfig, TripwireConfig};
pub use validation::validate_config;

/// Load a config file with env overrides and validate it.
pub fn load_and_validate(path: &Path) -> Result<TripwireConfig, Vec<ConfigError>> {
    let config = load_config_from_path(path).map_err(|e| vec![ConfigError::from(e)])?;
    validate_config(&config)?;
    Ok(config)
}

/// Load a TOML string and validate it.
pub fn load_and_validate_str(toml_content: &str) -> Result<TripwireConfig, Vec<ConfigError>> {
    let config = load_config_from_str(toml_content).map_err(|e| vec![ConfigError::from(e)])?;
    validate_config(&config)?;
    Ok(config)
}
