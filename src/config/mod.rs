//! Configuration module for sshdeploy
//!
//! Configuration hierarchy:
//! 1. CLI flags (highest priority)
//! 2. Environment variables (SSHDEPLOY_*)
//! 3. Project config (`--config <file>` or ./sshdeploy.toml)
//! 4. Built-in defaults (lowest priority)

mod loader;
mod types;

pub use loader::{with_env_overrides_from, ConfigWarning, DEFAULT_CONFIG_FILE};
pub use types::{Config, ConfigOverrides, ConnectionConfig, DeployConfig, MonitorConfig};
