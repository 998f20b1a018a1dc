//! Package Store Port
//!
//! Locates the local package cache that holds dependency runtime assets.

use std::path::PathBuf;

pub trait PackageStore: Send + Sync {
    /// Root of the global package store, `None` when it cannot be located
    fn root(&self) -> Option<PathBuf>;
}
