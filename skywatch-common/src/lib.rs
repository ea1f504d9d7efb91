//! Data model shared by the skywatch crates.

pub mod types;

pub use types::*;
