//! File System Implementations
//!
//! Concrete implementations of the FileSystem and PackageStore ports.

mod home;
mod local;
mod package_store;

pub use home::{sshdeploy_home_dir, SSHDEPLOY_TEST_HOME_VAR};
pub use local::LocalFs;
pub use package_store::{FixedPackageStore, NuGetPackageStore, NUGET_PACKAGES_VAR};
