//! Application Layer
//!
//! Use cases that orchestrate the deployment flow.
//! This layer:
//! - Depends on Domain layer (entities, services, ports)
//! - Does NOT contain manifest or path rules (those are in Domain)
//! - Coordinates between Infrastructure and Domain
//!
//! ## Use Cases
//!
//! - `DeploymentOrchestrator` - Single-flight pipeline with guaranteed finalization
//! - `MonitorUseCase` - File watching with redeploy on change
//!
//! ## Services
//!
//! - `RemotePathPreparer` - Idempotent remote directory creation and cleaning
//! - `FileSynchronizer` - Dependency and payload uploads
//! - `RemoteCommandRunner` - `client` and `shell` mode remote commands
//! - `ManifestDependencyResolver` - Manifest discovery and decoding

pub mod command_runner;
pub mod dependency_resolver;
pub mod deploy;
pub mod file_synchronizer;
pub mod monitor;
pub mod remote_path_preparer;

pub use command_runner::{CommandOutcome, RemoteCommandRunner, ShellForwarding, ShellRelay};
pub use dependency_resolver::ManifestDependencyResolver;
pub use deploy::{DeploymentOrchestrator, DeploymentReport, DeploymentStatus};
pub use file_synchronizer::{FileSynchronizer, UploadSummary};
pub use monitor::{
    compute_content_hash, ChangeFilter, MonitorEvent, MonitorOptions, MonitorUseCase,
    WatcherState, DEBOUNCE_MS,
};
pub use remote_path_preparer::RemotePathPreparer;
