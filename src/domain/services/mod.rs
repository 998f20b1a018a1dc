//! Domain Services
//!
//! Pure business logic services that operate on domain entities.
//! These services have no I/O dependencies and are easily testable.

mod manifest_resolver;

pub use manifest_resolver::{resolve_dependencies, ResolveError, MANIFEST_SUFFIX};
