//! Home directory resolution with test isolation support.
//!
//! On Windows, `dirs::home_dir()` uses the system API rather than
//! environment variables, so setting `HOME` in tests has no effect there.
//! `SSHDEPLOY_TEST_HOME` overrides the lookup for every sshdeploy-internal
//! path (package store fallback).

use std::path::PathBuf;

/// Environment variable for test isolation of home directory.
pub const SSHDEPLOY_TEST_HOME_VAR: &str = "SSHDEPLOY_TEST_HOME";

/// Home directory for sshdeploy-internal paths.
pub fn sshdeploy_home_dir() -> Option<PathBuf> {
    home_dir_from(std::env::var(SSHDEPLOY_TEST_HOME_VAR).ok())
}

fn home_dir_from(override_value: Option<String>) -> Option<PathBuf> {
    override_value
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
}
