//! Manifest decoders

mod json;

pub use json::JsonManifestDecoder;
