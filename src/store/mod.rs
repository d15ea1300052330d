//! Asset stores
//!
//! The compressor never talks to an asset database directly. It asks an
//! [`AssetStore`] for the candidate textures, reads each importer, and hands
//! back rewritten settings to be persisted.
//!
//! - [`MemoryStore`]: in-memory map, for embedding and tests
//! - [`FileStore`]: image files under a project directory, with settings in
//!   `<file>.import.json` sidecars

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use std::fmt;
use std::path::PathBuf;

use crate::textures::TextureImportSettings;

/// Opaque identifier of a texture asset (project-relative path)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AssetHandle(String);

impl AssetHandle {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AssetHandle {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

impl From<String> for AssetHandle {
    fn from(path: String) -> Self {
        Self(path)
    }
}

/// Query/mutate capability over a set of texture assets
pub trait AssetStore {
    /// All candidate textures, in a deterministic order
    fn find_textures(&self) -> Result<Vec<AssetHandle>, StoreError>;

    /// Current importer settings. `Ok(None)` means the asset has no usable
    /// importer and should be skipped.
    fn importer(&self, handle: &AssetHandle) -> Result<Option<TextureImportSettings>, StoreError>;

    /// Write settings and persist them immediately
    fn apply(
        &mut self,
        handle: &AssetHandle,
        settings: &TextureImportSettings,
    ) -> Result<(), StoreError>;
}

/// Asset store errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Project directory not found: {0}")]
    RootNotFound(PathBuf),

    #[error("Asset store is unavailable")]
    Offline,

    #[error("Asset not found: {0}")]
    NotFound(AssetHandle),

    #[error("Asset is read-only: {0}")]
    ReadOnly(AssetHandle),

    #[error("Failed to scan {path}: {source}")]
    Scan {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize settings for {handle}: {source}")]
    Serialize {
        handle: AssetHandle,
        #[source]
        source: serde_json::Error,
    },
}
