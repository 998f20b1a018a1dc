//! Domain Ports
//!
//! Interfaces the deployment core requires from the outside world.

pub mod deploy_events;
pub mod file_system;
pub mod manifest_decoder;
pub mod package_store;
pub mod remote;

pub use deploy_events::{DeployEvent, DeployEventSink, DeployStep, NoopEventSink};
pub use file_system::{FileSystem, FsError, FsResult};
pub use manifest_decoder::{DecodeError, ManifestDecoder};
pub use package_store::PackageStore;
pub use remote::{
    ChannelError, ChannelResult, CommandChannel, CommandOutput, FileChannel, RemoteEntry,
    RemoteSession, SessionProvider, ShellHandle,
};
