//! Filesystem-backed asset store
//!
//! Every image file under the project root is a texture asset. Its import
//! settings live next to it in `<file>.import.json`; a texture without a
//! sidecar uses the default settings. Writes go through a temp file and a
//! rename so a sidecar is never left half-written.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use super::{AssetHandle, AssetStore, StoreError};
use crate::paths;
use crate::textures::TextureImportSettings;

/// Texture assets in a project directory
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Open a project directory
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        if !root.is_dir() {
            return Err(StoreError::RootNotFound(root));
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path of the texture behind `handle`
    pub fn texture_path(&self, handle: &AssetHandle) -> PathBuf {
        paths::join_asset_path(&self.root, handle.as_str())
    }

    /// Absolute path of the sidecar for `handle`
    pub fn sidecar_path(&self, handle: &AssetHandle) -> PathBuf {
        paths::sidecar_path(&self.texture_path(handle))
    }
}

/// Hidden files and directories (`.git`, `.cache`, ...) are not assets
fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .map(|s| s.starts_with('.'))
            .unwrap_or(false)
}

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> StoreError {
    let path = path.to_path_buf();
    move |source| StoreError::Io { path, source }
}

impl AssetStore for FileStore {
    fn find_textures(&self) -> Result<Vec<AssetHandle>, StoreError> {
        let mut found = Vec::new();

        let walker = WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !is_hidden(e));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(source) if source.depth() == 0 => {
                    return Err(StoreError::Scan {
                        path: self.root.clone(),
                        source,
                    });
                }
                Err(e) => {
                    warn!("Skipping unreadable entry under {}: {}", self.root.display(), e);
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            if let Some(rel) = paths::to_asset_path(&self.root, entry.path()) {
                if paths::is_texture_path(&rel) {
                    found.push(AssetHandle::new(rel));
                }
            }
        }

        debug!("Found {} textures under {}", found.len(), self.root.display());
        Ok(found)
    }

    fn importer(&self, handle: &AssetHandle) -> Result<Option<TextureImportSettings>, StoreError> {
        if !self.texture_path(handle).is_file() {
            return Ok(None);
        }

        let sidecar = self.sidecar_path(handle);
        let content = match fs::read_to_string(&sidecar) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Ok(Some(TextureImportSettings::default()));
            }
            Err(source) => {
                return Err(StoreError::Io {
                    path: sidecar,
                    source,
                })
            }
        };

        match serde_json::from_str(&content) {
            Ok(settings) => Ok(Some(settings)),
            Err(e) => {
                warn!("Ignoring {}: unreadable sidecar {}: {}", handle, sidecar.display(), e);
                Ok(None)
            }
        }
    }

    fn apply(
        &mut self,
        handle: &AssetHandle,
        settings: &TextureImportSettings,
    ) -> Result<(), StoreError> {
        let texture = self.texture_path(handle);
        if !texture.is_file() {
            return Err(StoreError::NotFound(handle.clone()));
        }

        let content =
            serde_json::to_string_pretty(settings).map_err(|source| StoreError::Serialize {
                handle: handle.clone(),
                source,
            })?;

        let sidecar = paths::sidecar_path(&texture);
        let mut tmp = sidecar.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        paths::ensure_parent_dirs(&sidecar).map_err(io_err(&sidecar))?;
        fs::write(&tmp, content).map_err(io_err(&tmp))?;
        fs::rename(&tmp, &sidecar).map_err(io_err(&sidecar))?;

        debug!("Reimported {}", handle);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::textures::TextureCompression;
    use anyhow::Result;
    use tempfile::TempDir;

    fn project() -> Result<TempDir> {
        let dir = TempDir::new()?;
        fs::create_dir_all(dir.path().join("Assets/ui"))?;
        fs::create_dir_all(dir.path().join(".git"))?;
        fs::write(dir.path().join("Assets/rock.png"), b"png")?;
        fs::write(dir.path().join("Assets/ui/icon.TGA"), b"tga")?;
        fs::write(dir.path().join("Assets/model.fbx"), b"fbx")?;
        fs::write(dir.path().join(".git/hidden.png"), b"png")?;
        Ok(dir)
    }

    #[test]
    fn test_open_missing_root() {
        let result = FileStore::open("/definitely/not/a/project");
        assert!(matches!(result, Err(StoreError::RootNotFound(_))));
    }

    #[test]
    fn test_find_textures() -> Result<()> {
        let dir = project()?;
        let store = FileStore::open(dir.path())?;

        let found = store.find_textures()?;
        let names: Vec<&str> = found.iter().map(|h| h.as_str()).collect();
        assert_eq!(names, vec!["Assets/rock.png", "Assets/ui/icon.TGA"]);
        Ok(())
    }

    #[test]
    fn test_missing_sidecar_uses_defaults() -> Result<()> {
        let dir = project()?;
        let store = FileStore::open(dir.path())?;

        let settings = store.importer(&"Assets/rock.png".into())?;
        assert_eq!(settings, Some(TextureImportSettings::default()));

        assert_eq!(store.importer(&"Assets/gone.png".into())?, None);
        Ok(())
    }

    #[test]
    fn test_corrupt_sidecar_is_skipped() -> Result<()> {
        let dir = project()?;
        fs::write(dir.path().join("Assets/rock.png.import.json"), b"{ broken")?;
        let store = FileStore::open(dir.path())?;

        assert_eq!(store.importer(&"Assets/rock.png".into())?, None);
        Ok(())
    }

    #[test]
    fn test_apply_writes_sidecar() -> Result<()> {
        let dir = project()?;
        let mut store = FileStore::open(dir.path())?;
        let handle = AssetHandle::from("Assets/ui/icon.TGA");

        let settings = TextureImportSettings {
            compression_quality: 75,
            crunched_compression: true,
            texture_compression: TextureCompression::CompressedLQ,
            max_texture_size: 512,
        };
        store.apply(&handle, &settings)?;

        assert!(dir.path().join("Assets/ui/icon.TGA.import.json").is_file());
        assert!(!dir.path().join("Assets/ui/icon.TGA.import.json.tmp").exists());
        assert_eq!(store.importer(&handle)?, Some(settings));

        // Sidecars are not textures themselves
        assert_eq!(store.find_textures()?.len(), 2);
        Ok(())
    }

    #[test]
    fn test_apply_missing_texture() -> Result<()> {
        let dir = project()?;
        let mut store = FileStore::open(dir.path())?;

        let result = store.apply(&"Assets/gone.png".into(), &TextureImportSettings::default());
        assert!(matches!(result, Err(StoreError::NotFound(_))));
        Ok(())
    }

    #[test]
    fn test_missing_root_fails_scan() -> Result<()> {
        let dir = project()?;
        let store = FileStore::open(dir.path())?;
        drop(dir);

        assert!(matches!(store.find_textures(), Err(StoreError::Scan { .. })));
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_subdirectory_does_not_abort_scan() -> Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let dir = project()?;
        let locked = dir.path().join("Assets/locked");
        fs::create_dir_all(&locked)?;
        fs::write(locked.join("secret.png"), b"png")?;
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000))?;

        let store = FileStore::open(dir.path())?;
        let found = store.find_textures();

        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755))?;

        let names: Vec<String> = found?.iter().map(|h| h.to_string()).collect();
        assert!(names.contains(&"Assets/rock.png".to_string()));
        assert!(names.contains(&"Assets/ui/icon.TGA".to_string()));
        Ok(())
    }
}
