//! Manifest Dependency Resolver
//!
//! Finds the runtime-dependency manifest in the source directory, decodes it
//! and hands the tree to the pure resolver. A source directory without a
//! manifest has no extra dependencies.

use std::path::{Path, PathBuf};

use crate::domain::entities::Dependency;
use crate::domain::ports::{FileSystem, ManifestDecoder};
use crate::domain::services::{resolve_dependencies, ResolveError, MANIFEST_SUFFIX};
use crate::error::{DeployError, DeployResult};

pub struct ManifestDependencyResolver<'a> {
    file_system: &'a dyn FileSystem,
    decoder: &'a dyn ManifestDecoder,
    runtime_identifier: &'a str,
}

impl<'a> ManifestDependencyResolver<'a> {
    pub fn new(
        file_system: &'a dyn FileSystem,
        decoder: &'a dyn ManifestDecoder,
        runtime_identifier: &'a str,
    ) -> Self {
        Self {
            file_system,
            decoder,
            runtime_identifier,
        }
    }

    /// First `*.deps.json` directly inside `source`, by file name.
    pub fn find_manifest(&self, source: &Path) -> DeployResult<Option<PathBuf>> {
        let manifest = self
            .file_system
            .list_files(source)?
            .into_iter()
            .find(|path| {
                path.file_name()
                    .is_some_and(|name| name.to_string_lossy().ends_with(MANIFEST_SUFFIX))
            });
        Ok(manifest)
    }

    pub fn resolve(&self, source: &Path) -> DeployResult<Vec<Dependency>> {
        let Some(manifest) = self.find_manifest(source)? else {
            tracing::debug!(source = %source.display(), "no dependency manifest");
            return Ok(Vec::new());
        };

        let text = self.file_system.read_to_string(&manifest)?;
        let root = self
            .decoder
            .decode(&text)
            .map_err(|e| DeployError::Resolution {
                manifest: manifest.clone(),
                source: ResolveError::InvalidDocument {
                    message: e.to_string(),
                },
            })?;

        let dependencies = resolve_dependencies(&root, self.runtime_identifier)
            .map_err(|source| DeployError::Resolution {
                manifest: manifest.clone(),
                source,
            })?;

        tracing::debug!(
            manifest = %manifest.display(),
            count = dependencies.len(),
            "resolved dependencies"
        );
        Ok(dependencies)
    }
}
