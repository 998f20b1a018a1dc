//! Manifest tree value object
//!
//! A decoded runtime-dependency manifest. Objects keep document order so
//! "first entry" lookups are deterministic.

/// A node in a decoded manifest document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestNode {
    Object(Vec<(String, ManifestNode)>),
    Array(Vec<ManifestNode>),
    /// Numbers and booleans are kept in their textual form
    String(String),
    Null,
}

impl ManifestNode {
    pub fn object<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, ManifestNode)>,
        K: Into<String>,
    {
        ManifestNode::Object(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn string(value: impl Into<String>) -> Self {
        ManifestNode::String(value.into())
    }

    /// Direct child of an object by exact key.
    pub fn get(&self, key: &str) -> Option<&ManifestNode> {
        self.entries()?
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Descend through objects by exact keys. Returns `None` as soon as a key
    /// is missing or a non-object node is hit.
    pub fn navigate(&self, path: &[&str]) -> Option<&ManifestNode> {
        path.iter().try_fold(self, |node, key| node.get(key))
    }

    /// Object entries in document order.
    pub fn entries(&self) -> Option<&[(String, ManifestNode)]> {
        match self {
            ManifestNode::Object(entries) => Some(entries),
            _ => None,
        }
    }

    pub fn first_entry(&self) -> Option<(&str, &ManifestNode)> {
        self.entries()?.first().map(|(k, v)| (k.as_str(), v))
    }

    /// First object entry whose key contains `needle`.
    pub fn find_key_containing(&self, needle: &str) -> Option<(&str, &ManifestNode)> {
        self.entries()?
            .iter()
            .find(|(k, _)| k.contains(needle))
            .map(|(k, v)| (k.as_str(), v))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ManifestNode::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_object(&self) -> bool {
        matches!(self, ManifestNode::Object(_))
    }
}
