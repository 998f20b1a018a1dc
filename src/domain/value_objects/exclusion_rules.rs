//! File exclusion rules
//!
//! A file is excluded when its name ends with one of the configured
//! suffixes. Matching is exact and case-sensitive on every platform.

use std::path::Path;

/// Suffix-based exclusion rules for the payload upload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionRules {
    suffixes: Vec<String>,
}

impl ExclusionRules {
    /// Empty suffixes are dropped, they would match every file.
    pub fn new<I, S>(suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            suffixes: suffixes
                .into_iter()
                .map(Into::into)
                .filter(|s: &String| !s.is_empty())
                .collect(),
        }
    }

    /// Parse a `|`-separated list such as `.pdb|.vshost.exe`.
    pub fn parse(list: &str) -> Self {
        Self::new(list.split('|').map(str::trim))
    }

    pub fn suffixes(&self) -> &[String] {
        &self.suffixes
    }

    pub fn is_empty(&self) -> bool {
        self.suffixes.is_empty()
    }

    pub fn is_excluded_name(&self, file_name: &str) -> bool {
        self.suffixes.iter().any(|s| file_name.ends_with(s.as_str()))
    }

    /// Check the last component of `path`.
    pub fn is_excluded(&self, path: &Path) -> bool {
        path.file_name()
            .map(|n| self.is_excluded_name(&n.to_string_lossy()))
            .unwrap_or(false)
    }

    /// Display form used in the options header.
    pub fn joined(&self) -> String {
        self.suffixes.join("|")
    }
}
