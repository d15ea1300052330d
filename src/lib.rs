//! texcrunch - batch texture import-settings compressor
//!
//! Adjusts crunch compression, max size and low-resolution settings across a
//! project's textures, a chunk per host tick, with progress, cancellation
//! and a transient status message.

pub mod compressor;
pub mod config;
pub mod host;
pub mod job;
pub mod message;
pub mod paths;
pub mod store;
pub mod textures;
