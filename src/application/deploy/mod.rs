//! Deploy Module
//!
//! Orchestrates one deployment run.
//!
//! ## Structure
//!
//! - `result` - Report types (`DeploymentReport`, `DeploymentStatus`)
//! - `use_case` - The single-flight pipeline (`DeploymentOrchestrator`)
//!
//! ## Usage
//!
//! ```ignore
//! use sshdeploy::application::deploy::DeploymentOrchestrator;
//!
//! let orchestrator = DeploymentOrchestrator::new(provider, fs, decoder, package_store);
//! let report = orchestrator.execute_deployment(&config)?;
//! ```

mod result;
mod use_case;

pub use result::{DeploymentReport, DeploymentStatus};
pub use use_case::DeploymentOrchestrator;
