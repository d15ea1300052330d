//! Import settings stored per texture asset

use serde::{Deserialize, Serialize};

/// File extensions treated as texture assets (lowercase, no dot)
pub const TEXTURE_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "tga", "psd", "tif", "tiff", "bmp", "gif", "exr", "hdr", "dds",
];

/// Compression level applied when a texture is imported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TextureCompression {
    /// Raw pixels
    Uncompressed,
    /// Platform default block compression
    #[default]
    Compressed,
    /// Higher quality format, larger on disk
    CompressedHQ,
    /// Lower quality format, smallest on disk
    CompressedLQ,
}

impl TextureCompression {
    /// Get name for logging and listings
    pub fn name(&self) -> &'static str {
        match self {
            TextureCompression::Uncompressed => "Uncompressed",
            TextureCompression::Compressed => "Compressed",
            TextureCompression::CompressedHQ => "CompressedHQ",
            TextureCompression::CompressedLQ => "CompressedLQ",
        }
    }
}

/// Importer settings for one texture.
///
/// Missing fields in a sidecar fall back to the engine defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextureImportSettings {
    /// Crunch quality, 0-100
    pub compression_quality: u8,
    /// Whether crunch compression is enabled
    pub crunched_compression: bool,
    /// Block compression level
    pub texture_compression: TextureCompression,
    /// Largest dimension the texture is imported at
    pub max_texture_size: u32,
}

impl Default for TextureImportSettings {
    fn default() -> Self {
        Self {
            compression_quality: 50,
            crunched_compression: false,
            texture_compression: TextureCompression::Compressed,
            max_texture_size: 2048,
        }
    }
}
