//! Infrastructure Layer
//!
//! Concrete implementations of domain ports.
//! This layer handles all I/O operations.
//!
//! ## Structure
//!
//! - `fs/` - Local file system and package store locators
//! - `manifest/` - Manifest document decoders
//! - `ssh/` - Remote session over the system `ssh` binary
//! - `memory` - In-process remote host
//! - `events/` - Event sinks

pub mod events;
pub mod fs;
pub mod manifest;
pub mod memory;
pub mod ssh;

// Re-export for convenience
pub use events::JsonEventSink;
pub use fs::{FixedPackageStore, LocalFs, NuGetPackageStore};
pub use manifest::JsonManifestDecoder;
pub use memory::{InMemoryRemote, RemoteOp};
pub use ssh::SshSessionProvider;
