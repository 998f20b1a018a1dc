//! Terminal presentation for the `sshdeploy` binary.

pub mod blocks;
pub mod console;
pub mod context;
pub mod error;
pub mod primitives;
pub mod terminal;
pub mod theme;
pub mod views;
