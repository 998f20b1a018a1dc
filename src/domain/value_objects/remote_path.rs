//! Remote path value object
//!
//! Remote hosts always use `/` as separator. Local paths built on Windows
//! carry `\`, so every remote path is normalized on construction.

use std::fmt;
use std::path::{Component, Path};

/// A normalized remote filesystem path (forward slashes, no empty segments).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RemotePath(String);

impl RemotePath {
    /// Normalize separators and collapse duplicate slashes.
    ///
    /// A leading `/` is kept so absolute paths stay absolute. A trailing
    /// separator is dropped except for the root itself.
    pub fn new(raw: impl AsRef<str>) -> Self {
        let raw = raw.as_ref().trim().replace('\\', "/");
        let absolute = raw.starts_with('/');
        let joined = raw
            .split('/')
            .filter(|s| !s.is_empty() && *s != ".")
            .collect::<Vec<_>>()
            .join("/");

        match (absolute, joined.is_empty()) {
            (true, true) => Self("/".to_string()),
            (true, false) => Self(format!("/{joined}")),
            (false, true) => Self(".".to_string()),
            (false, false) => Self(joined),
        }
    }

    /// Append a local relative path, translating its separators.
    pub fn join_local(&self, relative: &Path) -> Self {
        let tail = relative
            .components()
            .filter_map(|c| match c {
                Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("/");
        self.join(&tail)
    }

    /// Append a `/`-separated (or `\`-separated) tail.
    pub fn join(&self, tail: &str) -> Self {
        if self.0 == "." {
            return Self::new(tail);
        }
        Self::new(format!("{}/{}", self.0, tail))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0 == "/"
    }

    /// Parent directory, `None` for the root or a single relative segment.
    pub fn parent(&self) -> Option<Self> {
        if self.is_root() || self.0 == "." {
            return None;
        }
        match self.0.rfind('/') {
            Some(0) => Some(Self("/".to_string())),
            Some(idx) => Some(Self(self.0[..idx].to_string())),
            None => None,
        }
    }

    /// Last segment of the path.
    pub fn file_name(&self) -> Option<&str> {
        if self.is_root() || self.0 == "." {
            return None;
        }
        self.0.rsplit('/').next()
    }

    /// Every prefix of the path from the top-most segment down to the path
    /// itself. The filesystem root is not included.
    ///
    /// `/opt/app/bin` yields `/opt`, `/opt/app`, `/opt/app/bin`.
    pub fn ancestors_from_root(&self) -> Vec<Self> {
        if self.is_root() || self.0 == "." {
            return Vec::new();
        }
        let absolute = self.0.starts_with('/');
        let mut current = String::new();
        let mut out = Vec::new();
        for segment in self.0.split('/').filter(|s| !s.is_empty()) {
            if absolute || !current.is_empty() {
                current.push('/');
            }
            current.push_str(segment);
            out.push(Self(current.clone()));
        }
        out
    }

    /// True when `self` is `base` or lies below it.
    pub fn starts_with(&self, base: &RemotePath) -> bool {
        if base.is_root() {
            return self.0.starts_with('/');
        }
        self.0 == base.0
            || self
                .0
                .strip_prefix(base.0.as_str())
                .is_some_and(|rest| rest.starts_with('/'))
    }

    /// Single-quote the path for a POSIX shell.
    pub fn shell_quoted(&self) -> String {
        format!("'{}'", self.0.replace('\'', "'\\''"))
    }
}

impl fmt::Display for RemotePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RemotePath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn normalizes_windows_separators() {
        assert_eq!(RemotePath::new(r"\home\pi\app").as_str(), "/home/pi/app");
    }

    #[test]
    fn collapses_duplicate_and_trailing_slashes() {
        assert_eq!(RemotePath::new("/home//pi/app/").as_str(), "/home/pi/app");
        assert_eq!(RemotePath::new("/").as_str(), "/");
        assert_eq!(RemotePath::new("  /srv/app  ").as_str(), "/srv/app");
    }

    #[test]
    fn relative_paths_stay_relative() {
        assert_eq!(RemotePath::new("apps/demo").as_str(), "apps/demo");
        assert_eq!(RemotePath::new("./apps").as_str(), "apps");
    }

    #[test]
    fn join_local_translates_components() {
        let root = RemotePath::new("/home/pi/app");
        let rel = PathBuf::from("wwwroot").join("css").join("site.css");
        assert_eq!(
            root.join_local(&rel).as_str(),
            "/home/pi/app/wwwroot/css/site.css"
        );
    }

    #[test]
    fn join_accepts_backslash_tail() {
        let root = RemotePath::new("/opt");
        assert_eq!(root.join(r"lib\native.so").as_str(), "/opt/lib/native.so");
    }

    #[test]
    fn parent_of_top_level_is_root() {
        assert_eq!(RemotePath::new("/opt").parent(), Some(RemotePath::new("/")));
        assert_eq!(RemotePath::new("/").parent(), None);
        assert_eq!(RemotePath::new("apps").parent(), None);
        assert_eq!(
            RemotePath::new("/opt/app/x.dll").parent(),
            Some(RemotePath::new("/opt/app"))
        );
    }

    #[test]
    fn file_name_is_last_segment() {
        assert_eq!(RemotePath::new("/opt/app/x.dll").file_name(), Some("x.dll"));
        assert_eq!(RemotePath::new("/").file_name(), None);
    }

    #[test]
    fn ancestors_walk_down_from_root() {
        let paths: Vec<String> = RemotePath::new("/opt/app/bin")
            .ancestors_from_root()
            .into_iter()
            .map(|p| p.to_string())
            .collect();
        assert_eq!(paths, vec!["/opt", "/opt/app", "/opt/app/bin"]);
    }

    #[test]
    fn starts_with_respects_segment_boundaries() {
        let base = RemotePath::new("/opt/app");
        assert!(RemotePath::new("/opt/app").starts_with(&base));
        assert!(RemotePath::new("/opt/app/lib").starts_with(&base));
        assert!(!RemotePath::new("/opt/application").starts_with(&base));
        assert!(!RemotePath::new("/opt").starts_with(&base));
    }

    #[test]
    fn ancestors_of_relative_path() {
        let paths: Vec<String> = RemotePath::new("a/b")
            .ancestors_from_root()
            .into_iter()
            .map(|p| p.to_string())
            .collect();
        assert_eq!(paths, vec!["a", "a/b"]);
    }

    #[test]
    fn shell_quote_escapes_single_quote() {
        assert_eq!(
            RemotePath::new("/home/pi/it's").shell_quoted(),
            "'/home/pi/it'\\''s'"
        );
    }
}
