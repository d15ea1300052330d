//! Compression configuration
//!
//! User-adjustable settings for a compression run, the eligibility check
//! they imply, and the change they make to a texture's importer.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::ops::RangeInclusive;
use std::path::Path;

use crate::textures::{TextureCompression, TextureImportSettings};

/// Allowed textures-per-tick
pub const CHUNK_SIZE_RANGE: RangeInclusive<usize> = 1..=20;

/// Allowed clamped max sizes
pub const MAX_SIZE_RANGE: RangeInclusive<u32> = 32..=16384;

/// Configuration for a compression run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressionConfig {
    /// Textures processed per tick
    pub chunk_size: usize,

    /// Enable crunch compression on every processed texture
    pub use_crunch_compression: bool,

    /// Crunch quality (only applied with crunch compression)
    pub compression_quality: u8,

    /// Clamp the max texture size
    pub clamp_max_size: bool,

    /// Max size applied when clamping
    pub max_size_value: u32,

    /// Downgrade to low-quality compression
    pub force_low_resolution: bool,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            chunk_size: 10,
            use_crunch_compression: true,
            compression_quality: 75,
            clamp_max_size: false,
            max_size_value: 1024,
            force_low_resolution: false,
        }
    }
}

impl CompressionConfig {
    /// Load a configuration file (JSON). Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {:?}", path))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {:?}", path))?;

        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !CHUNK_SIZE_RANGE.contains(&self.chunk_size) {
            return Err(ConfigError::ChunkSizeOutOfRange(self.chunk_size));
        }

        if self.compression_quality > 100 {
            return Err(ConfigError::QualityOutOfRange(self.compression_quality));
        }

        if self.clamp_max_size
            && (!MAX_SIZE_RANGE.contains(&self.max_size_value)
                || !self.max_size_value.is_power_of_two())
        {
            return Err(ConfigError::InvalidMaxSize(self.max_size_value));
        }

        Ok(())
    }

    /// Chunk size as a non-zero count (call after `validate`)
    pub fn chunk_size(&self) -> Result<NonZeroUsize, ConfigError> {
        NonZeroUsize::new(self.chunk_size).ok_or(ConfigError::ChunkSizeOutOfRange(self.chunk_size))
    }

    /// Whether a texture still needs processing.
    ///
    /// True when its quality differs from the configured one or crunch
    /// compression is not yet enabled on it.
    pub fn is_eligible(&self, settings: &TextureImportSettings) -> bool {
        settings.compression_quality != self.compression_quality || !settings.crunched_compression
    }

    /// Rewrite importer settings according to this configuration
    pub fn apply_to(&self, settings: &mut TextureImportSettings) {
        if self.use_crunch_compression {
            settings.compression_quality = self.compression_quality;
            settings.crunched_compression = true;
        }
        if self.force_low_resolution {
            settings.texture_compression = TextureCompression::CompressedLQ;
        }
        if self.clamp_max_size {
            settings.max_texture_size = self.max_size_value;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Chunk size must be between 1 and 20, got {0}")]
    ChunkSizeOutOfRange(usize),

    #[error("Compression quality must be between 0 and 100, got {0}")]
    QualityOutOfRange(u8),

    #[error("Max texture size must be a power of two between 32 and 16384, got {0}")]
    InvalidMaxSize(u32),
}
