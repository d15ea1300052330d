//! In-memory asset store

use std::collections::{BTreeMap, HashSet};
use std::io::{self, ErrorKind};
use std::path::PathBuf;

use super::{AssetHandle, AssetStore, StoreError};
use crate::textures::TextureImportSettings;

/// Texture assets held in memory, iterated in handle order.
///
/// An entry with `None` settings stands for an asset without an importer.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    assets: BTreeMap<AssetHandle, Option<TextureImportSettings>>,
    read_only: HashSet<AssetHandle>,
    unreadable: HashSet<AssetHandle>,
    offline: bool,
    writes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a texture with the given importer settings
    pub fn insert(&mut self, handle: impl Into<AssetHandle>, settings: TextureImportSettings) {
        self.assets.insert(handle.into(), Some(settings));
    }

    /// Add an asset that has no importer
    pub fn insert_without_importer(&mut self, handle: impl Into<AssetHandle>) {
        self.assets.insert(handle.into(), None);
    }

    /// Reject every future write to `handle`
    pub fn set_read_only(&mut self, handle: impl Into<AssetHandle>) {
        self.read_only.insert(handle.into());
    }

    /// Fail every future importer read of `handle`
    pub fn set_unreadable(&mut self, handle: impl Into<AssetHandle>) {
        self.unreadable.insert(handle.into());
    }

    /// While offline, `find_textures` fails
    pub fn set_offline(&mut self, offline: bool) {
        self.offline = offline;
    }

    pub fn get(&self, handle: &AssetHandle) -> Option<&TextureImportSettings> {
        self.assets.get(handle).and_then(|s| s.as_ref())
    }

    /// Number of successful `apply` calls
    pub fn writes(&self) -> usize {
        self.writes
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

impl AssetStore for MemoryStore {
    fn find_textures(&self) -> Result<Vec<AssetHandle>, StoreError> {
        if self.offline {
            return Err(StoreError::Offline);
        }
        Ok(self.assets.keys().cloned().collect())
    }

    fn importer(&self, handle: &AssetHandle) -> Result<Option<TextureImportSettings>, StoreError> {
        if self.unreadable.contains(handle) {
            return Err(StoreError::Io {
                path: PathBuf::from(handle.as_str()),
                source: io::Error::new(ErrorKind::PermissionDenied, "importer is unreadable"),
            });
        }
        Ok(self.assets.get(handle).cloned().flatten())
    }

    fn apply(
        &mut self,
        handle: &AssetHandle,
        settings: &TextureImportSettings,
    ) -> Result<(), StoreError> {
        if self.read_only.contains(handle) {
            return Err(StoreError::ReadOnly(handle.clone()));
        }
        match self.assets.get_mut(handle) {
            Some(slot) => {
                *slot = Some(settings.clone());
                self.writes += 1;
                Ok(())
            }
            None => Err(StoreError::NotFound(handle.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_is_sorted() {
        let mut store = MemoryStore::new();
        store.insert("b.png", TextureImportSettings::default());
        store.insert("a.png", TextureImportSettings::default());
        store.insert_without_importer("c.png");

        let found = store.find_textures().unwrap();
        let names: Vec<&str> = found.iter().map(|h| h.as_str()).collect();
        assert_eq!(names, vec!["a.png", "b.png", "c.png"]);
        assert_eq!(store.importer(&"c.png".into()).unwrap(), None);
    }

    #[test]
    fn test_apply_and_read_only() {
        let mut store = MemoryStore::new();
        store.insert("a.png", TextureImportSettings::default());
        store.insert("locked.png", TextureImportSettings::default());
        store.set_read_only("locked.png");

        let updated = TextureImportSettings {
            compression_quality: 90,
            crunched_compression: true,
            ..Default::default()
        };

        store.apply(&"a.png".into(), &updated).unwrap();
        assert_eq!(store.get(&"a.png".into()), Some(&updated));
        assert_eq!(store.writes(), 1);

        assert!(matches!(
            store.apply(&"locked.png".into(), &updated),
            Err(StoreError::ReadOnly(_))
        ));
        assert!(matches!(
            store.apply(&"missing.png".into(), &updated),
            Err(StoreError::NotFound(_))
        ));
        assert_eq!(store.writes(), 1);
    }

    #[test]
    fn test_injected_read_failures() {
        let mut store = MemoryStore::new();
        store.insert("a.png", TextureImportSettings::default());
        store.set_unreadable("a.png");
        assert!(matches!(
            store.importer(&"a.png".into()),
            Err(StoreError::Io { .. })
        ));

        store.set_offline(true);
        assert!(matches!(store.find_textures(), Err(StoreError::Offline)));
        store.set_offline(false);
        assert_eq!(store.find_textures().unwrap().len(), 1);
    }
}
