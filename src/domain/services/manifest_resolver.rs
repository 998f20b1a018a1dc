//! Manifest dependency resolution
//!
//! Pure navigation over a decoded manifest tree:
//!
//! ```text
//! targets
//!   └─ "<framework>/<rid>"          (key contains the runtime identifier)
//!        ├─ "App/1.0.0"             (first entry: the application itself)
//!        │    └─ dependencies { "Pkg": "1.2.3", ... }
//!        └─ "Pkg/1.2.3"
//!             └─ runtime { "lib/net8.0/Pkg.dll": {}, ... }
//! ```

use thiserror::Error;

use crate::domain::entities::Dependency;
use crate::domain::value_objects::ManifestNode;

/// File name suffix of a runtime-dependency manifest
pub const MANIFEST_SUFFIX: &str = ".deps.json";

const TARGETS_KEY: &str = "targets";
const DEPENDENCIES_KEY: &str = "dependencies";
const RUNTIME_KEY: &str = "runtime";

/// Structural problem found while navigating a manifest
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// The manifest text is not a valid document
    #[error("{message}")]
    InvalidDocument { message: String },
    /// No `targets` object at the document root
    #[error("manifest has no '{}' object", TARGETS_KEY)]
    MissingTargets,
    /// No target key containing the runtime identifier
    #[error("no target matching runtime identifier '{runtime_identifier}'")]
    MissingPlatform { runtime_identifier: String },
    /// The platform target has no package entries
    #[error("target '{platform}' has no package entry")]
    MissingPackageEntry { platform: String },
    /// An entry exists but has the wrong shape
    #[error("unexpected value at '{key_path}'")]
    MalformedEntry { key_path: String },
}

/// Resolve the runtime assets every dependency of the top-level package ships.
///
/// Packages without a `runtime` object contribute nothing. Only the first
/// asset of each package is used.
pub fn resolve_dependencies(
    root: &ManifestNode,
    runtime_identifier: &str,
) -> Result<Vec<Dependency>, ResolveError> {
    let targets = root
        .get(TARGETS_KEY)
        .filter(|n| n.is_object())
        .ok_or(ResolveError::MissingTargets)?;

    let (platform_key, platform) = targets
        .find_key_containing(runtime_identifier)
        .ok_or_else(|| ResolveError::MissingPlatform {
            runtime_identifier: runtime_identifier.to_string(),
        })?;

    let (package_key, package) =
        platform
            .first_entry()
            .ok_or_else(|| ResolveError::MissingPackageEntry {
                platform: platform_key.to_string(),
            })?;

    let Some(dependencies) = package.get(DEPENDENCIES_KEY) else {
        return Ok(Vec::new());
    };
    let entries = dependencies
        .entries()
        .ok_or_else(|| ResolveError::MalformedEntry {
            key_path: format!("{}/{}/{}", platform_key, package_key, DEPENDENCIES_KEY),
        })?;

    let mut resolved = Vec::new();
    for (name, version) in entries {
        let version = version.as_str().ok_or_else(|| ResolveError::MalformedEntry {
            key_path: format!(
                "{}/{}/{}/{}",
                platform_key, package_key, DEPENDENCIES_KEY, name
            ),
        })?;

        let composite = format!("{}/{}", name, version);
        let Some((asset, _)) = platform
            .navigate(&[composite.as_str(), RUNTIME_KEY])
            .and_then(ManifestNode::first_entry)
        else {
            continue;
        };
        resolved.push(Dependency::new(name.as_str(), version, asset));
    }

    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty() -> ManifestNode {
        ManifestNode::Object(vec![])
    }

    fn runtime(assets: &[&str]) -> ManifestNode {
        ManifestNode::object([(
            "runtime",
            ManifestNode::object(assets.iter().map(|a| (*a, empty()))),
        )])
    }

    fn manifest(platform: ManifestNode) -> ManifestNode {
        ManifestNode::object([(
            "targets",
            ManifestNode::object([(".NETCoreApp,Version=v8.0/linux-arm", platform)]),
        )])
    }

    fn app_with(deps: &[(&str, &str)]) -> ManifestNode {
        ManifestNode::object([(
            "dependencies",
            ManifestNode::object(deps.iter().map(|(n, v)| (*n, ManifestNode::string(*v)))),
        )])
    }

    #[test]
    fn resolves_runtime_assets_in_manifest_order() {
        let root = manifest(ManifestNode::object([
            ("App/1.0.0", app_with(&[("Zeta", "2.0.0"), ("Alpha", "1.0.0")])),
            ("Alpha/1.0.0", runtime(&["lib/net8.0/Alpha.dll"])),
            ("Zeta/2.0.0", runtime(&["lib/net8.0/Zeta.dll"])),
        ]));

        let deps = resolve_dependencies(&root, "linux-arm").unwrap();
        assert_eq!(
            deps,
            vec![
                Dependency::new("Zeta", "2.0.0", "lib/net8.0/Zeta.dll"),
                Dependency::new("Alpha", "1.0.0", "lib/net8.0/Alpha.dll"),
            ]
        );
    }

    #[test]
    fn packages_without_runtime_are_skipped() {
        let root = manifest(ManifestNode::object([
            ("App/1.0.0", app_with(&[("Analyzer", "1.0.0"), ("Lib", "1.0.0")])),
            ("Analyzer/1.0.0", empty()),
            ("Lib/1.0.0", runtime(&["lib/Lib.dll"])),
        ]));

        let deps = resolve_dependencies(&root, "linux-arm").unwrap();
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].name(), "Lib");
    }

    #[test]
    fn package_missing_from_target_is_skipped() {
        let root = manifest(ManifestNode::object([(
            "App/1.0.0",
            app_with(&[("Ghost", "0.1.0")]),
        )]));
        assert!(resolve_dependencies(&root, "linux-arm").unwrap().is_empty());
    }

    #[test]
    fn only_first_runtime_asset_is_used() {
        let root = manifest(ManifestNode::object([
            ("App/1.0.0", app_with(&[("Multi", "1.0.0")])),
            ("Multi/1.0.0", runtime(&["lib/First.dll", "lib/Second.dll"])),
        ]));

        let deps = resolve_dependencies(&root, "linux-arm").unwrap();
        assert_eq!(deps[0].path(), "lib/First.dll");
    }

    #[test]
    fn missing_dependencies_key_is_empty() {
        let root = manifest(ManifestNode::object([("App/1.0.0", empty())]));
        assert!(resolve_dependencies(&root, "linux-arm").unwrap().is_empty());
    }

    #[test]
    fn missing_targets_is_an_error() {
        let root = ManifestNode::object([("runtimeTarget", empty())]);
        assert_eq!(
            resolve_dependencies(&root, "linux-arm"),
            Err(ResolveError::MissingTargets)
        );
    }

    #[test]
    fn missing_platform_is_an_error() {
        let root = manifest(ManifestNode::object([("App/1.0.0", empty())]));
        let err = resolve_dependencies(&root, "linux-x64").unwrap_err();
        assert_eq!(
            err,
            ResolveError::MissingPlatform {
                runtime_identifier: "linux-x64".to_string()
            }
        );
    }

    #[test]
    fn empty_platform_is_an_error() {
        let root = manifest(empty());
        assert!(matches!(
            resolve_dependencies(&root, "linux-arm"),
            Err(ResolveError::MissingPackageEntry { .. })
        ));
    }

    #[test]
    fn non_string_version_is_malformed() {
        let root = manifest(ManifestNode::object([(
            "App/1.0.0",
            ManifestNode::object([(
                "dependencies",
                ManifestNode::object([("Lib", empty())]),
            )]),
        )]));
        let err = resolve_dependencies(&root, "linux-arm").unwrap_err();
        assert!(err.to_string().contains("dependencies/Lib"));
    }

    #[test]
    fn resolve_errors_describe_the_missing_piece() {
        assert_eq!(
            ResolveError::MissingTargets.to_string(),
            "manifest has no 'targets' object"
        );
        assert_eq!(
            ResolveError::MissingPlatform {
                runtime_identifier: "linux-arm".to_string()
            }
            .to_string(),
            "no target matching runtime identifier 'linux-arm'"
        );
        let err: Box<dyn std::error::Error> = Box::new(ResolveError::MissingPackageEntry {
            platform: ".NETCoreApp,Version=v8.0/linux-arm".to_string(),
        });
        assert_eq!(
            err.to_string(),
            "target '.NETCoreApp,Version=v8.0/linux-arm' has no package entry"
        );
    }
}
