//! Domain Entities
//!
//! - `Dependency` - A package runtime asset to ship with the payload
//! - `DeploymentConfig` - Everything one deployment run needs
//! - `DeploymentState` - Single-flight lock and deployment counter

mod dependency;
mod deployment_config;
mod deployment_state;

pub use dependency::Dependency;
pub use deployment_config::{
    ConnectionInfo, DeploymentConfig, DEFAULT_PORT, DEFAULT_RUNTIME_IDENTIFIER,
};
pub use deployment_state::{DeploymentLease, DeploymentState};
