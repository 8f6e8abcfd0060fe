//! Loading of [`OrchestratorConfig`] from the environment or a YAML file.
//!
//! Each field maps to `AEM_ORCHESTRATOR_<FIELD>`:
//!   - `AEM_ORCHESTRATOR_AUTHOR_ELB_NAME`         (required)
//!   - `AEM_ORCHESTRATOR_AEM_PROTOCOL`            (default `https`)
//!   - `AEM_ORCHESTRATOR_DISPATCHER_PORT`         (default `443`)
//!   - `AEM_ORCHESTRATOR_AUTHOR_PORT`             (default `443`)
//!   - `AEM_ORCHESTRATOR_ADDRESS_POLL_ATTEMPTS`   (default `20`)
//!   - `AEM_ORCHESTRATOR_ADDRESS_POLL_DELAY_SECS` (default `5`)
//!   - `AEM_ORCHESTRATOR_STACK_PREFIX`            (optional)

use std::path::Path;

use anyhow::{Context, Result};

use crate::domain::OrchestratorConfig;

pub const ENV_PREFIX: &str = "AEM_ORCHESTRATOR_";

/// Load and validate configuration from `AEM_ORCHESTRATOR_*` variables.
///
/// # Errors
///
/// Returns an error if a required variable is missing, a value does not
/// parse, or validation fails.
pub fn load_from_env() -> Result<OrchestratorConfig> {
    load_from_vars(std::env::vars())
}

/// Load and validate configuration from explicit `(name, value)` pairs.
///
/// # Errors
///
/// Same as [`load_from_env`].
pub fn load_from_vars(vars: impl IntoIterator<Item = (String, String)>) -> Result<OrchestratorConfig> {
    let config: OrchestratorConfig = envy::prefixed(ENV_PREFIX)
        .from_iter(vars)
        .context("failed to load config from AEM_ORCHESTRATOR_* env vars (AEM_ORCHESTRATOR_AUTHOR_ELB_NAME is required)")?;
    config.validate()?;
    Ok(config)
}

/// Load and validate configuration from a YAML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or validation
/// fails.
pub fn load_from_file(path: &Path) -> Result<OrchestratorConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading config file {}", path.display()))?;
    let config: OrchestratorConfig = serde_yaml::from_str(&content)
        .with_context(|| format!("parsing config file {}", path.display()))?;
    config.validate()?;
    Ok(config)
}
