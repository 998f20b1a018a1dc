//! Dependency entity - a runtime asset shipped by a package

use std::path::Path;

/// A package runtime asset that must accompany the application payload.
///
/// Produced by the manifest resolver, consumed once by the synchronizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    name: String,
    version: String,
    /// Relative path inside the package store entry (`lib/net8.0/Foo.dll`)
    path: String,
}

impl Dependency {
    pub fn new(name: impl Into<String>, version: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            path: path.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Final segment of the asset path, used as the flattened remote name.
    pub fn file_name(&self) -> &str {
        self.path
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(self.path.as_str())
    }

    /// Location of the asset inside a package store root,
    /// `<root>/<name>/<version>/<path>`.
    pub fn store_location(&self, store_root: &Path) -> std::path::PathBuf {
        let mut location = store_root.join(&self.name).join(&self.version);
        for segment in self.path.split(['/', '\\']).filter(|s| !s.is_empty()) {
            location.push(segment);
        }
        location
    }

    /// Same as [`store_location`](Self::store_location) with a lower-cased
    /// name and version, the layout NuGet uses on disk.
    pub fn store_location_lowercase(&self, store_root: &Path) -> std::path::PathBuf {
        Dependency::new(
            self.name.to_lowercase(),
            self.version.to_lowercase(),
            self.path.clone(),
        )
        .store_location(store_root)
    }
}
