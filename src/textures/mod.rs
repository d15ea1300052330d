//! Texture import settings
//!
//! The subset of an engine's texture importer that the compressor reads and
//! rewrites: crunch quality, compression level and max size.

mod settings;

pub use settings::{TextureCompression, TextureImportSettings, TEXTURE_EXTENSIONS};
