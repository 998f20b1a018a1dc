//! sshdeploy - push a locally built application tree to a remote host
//!
//! Uploads the payload and its runtime dependencies over SSH, running pre-
//! and post-deployment commands on the remote side. Deployments are
//! single-flight: a trigger that arrives while one is running is dropped.

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod logging;

// Re-exports for convenience
pub use application::{
    DeploymentOrchestrator, DeploymentReport, DeploymentStatus, MonitorEvent, MonitorOptions,
    MonitorUseCase,
};
pub use config::{Config, ConfigOverrides, ConfigWarning};
pub use domain::entities::{ConnectionInfo, DeploymentConfig};
pub use error::{DeployError, DeployResult};
