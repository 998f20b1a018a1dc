//! Domain Value Objects
//!
//! Immutable value types that represent domain concepts.

mod command_mode;
mod exclusion_rules;
mod manifest_node;
mod remote_path;

pub use command_mode::CommandMode;
pub use exclusion_rules::ExclusionRules;
pub use manifest_node::ManifestNode;
pub use remote_path::RemotePath;
