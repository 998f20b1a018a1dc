//! Package store locators
//!
//! The global NuGet package folder is `$NUGET_PACKAGES` when set, otherwise
//! `~/.nuget/packages`.

use std::path::PathBuf;

use crate::domain::ports::PackageStore;

use super::home::sshdeploy_home_dir;

/// Environment variable that relocates the global package folder
pub const NUGET_PACKAGES_VAR: &str = "NUGET_PACKAGES";

/// Locates the NuGet global package folder from the environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct NuGetPackageStore;

impl NuGetPackageStore {
    pub fn new() -> Self {
        Self
    }

    fn locate(env_value: Option<String>, home: Option<PathBuf>) -> Option<PathBuf> {
        env_value
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .or_else(|| home.map(|h| h.join(".nuget").join("packages")))
    }
}

impl PackageStore for NuGetPackageStore {
    fn root(&self) -> Option<PathBuf> {
        let root = Self::locate(std::env::var(NUGET_PACKAGES_VAR).ok(), sshdeploy_home_dir());
        tracing::debug!(root = ?root, "package store");
        root
    }
}

/// A package store at a fixed location.
#[derive(Debug, Clone)]
pub struct FixedPackageStore(Option<PathBuf>);

impl FixedPackageStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self(Some(root.into()))
    }

    /// A store that cannot be located
    pub fn none() -> Self {
        Self(None)
    }
}

impl PackageStore for FixedPackageStore {
    fn root(&self) -> Option<PathBuf> {
        self.0.clone()
    }
}
