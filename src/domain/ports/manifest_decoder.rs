//! Manifest Decoder Port
//!
//! Turns manifest text into a `ManifestNode` tree. The concrete document
//! format lives in infrastructure.

use thiserror::Error;

use crate::domain::value_objects::ManifestNode;

/// Error raised when the manifest text is not a valid document
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid manifest document: {0}")]
pub struct DecodeError(pub String);

pub trait ManifestDecoder: Send + Sync {
    fn decode(&self, text: &str) -> Result<ManifestNode, DecodeError>;
}
