//! Asset path handling
//!
//! Asset handles are project-relative paths with forward slashes, whatever
//! the host platform uses. This module handles:
//! - Converting filesystem paths to handle form and back
//! - Recognising texture files by extension
//! - Locating the import-settings sidecar of a texture

use std::path::{Path, PathBuf};

use crate::textures::TEXTURE_EXTENSIONS;

/// Suffix appended to a texture's file name to form its sidecar
pub const SIDECAR_SUFFIX: &str = ".import.json";

/// Convert Windows path separators to forward slashes
/// `Textures\armor.png` -> `Textures/armor.png`
pub fn to_forward_slashes(path: &str) -> String {
    path.replace('\\', "/")
}

/// Project-relative handle form of `path`, or `None` if it lies outside `root`
pub fn to_asset_path(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let rel = to_forward_slashes(&rel.to_string_lossy());
    let rel = rel.trim_matches('/');
    if rel.is_empty() {
        None
    } else {
        Some(rel.to_string())
    }
}

/// Join a project root with a handle-form path
pub fn join_asset_path(root: &Path, asset_path: &str) -> PathBuf {
    root.join(to_forward_slashes(asset_path))
}

/// Get the filename from a path (handles both / and \)
pub fn file_name(path: &str) -> &str {
    path.rfind(['\\', '/'])
        .map(|idx| &path[idx + 1..])
        .unwrap_or(path)
}

/// Get file extension (as written)
pub fn extension(path: &str) -> Option<&str> {
    let name = file_name(path);
    match name.rfind('.') {
        Some(0) | None => None,
        Some(idx) => Some(&name[idx + 1..]),
    }
}

/// Whether a path names a texture file (case-insensitive extension match)
pub fn is_texture_path(path: &str) -> bool {
    extension(path)
        .map(|ext| {
            let ext = ext.to_lowercase();
            TEXTURE_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

/// Sidecar path for a texture file: `armor.png` -> `armor.png.import.json`
pub fn sidecar_path(texture: &Path) -> PathBuf {
    let mut name = texture.as_os_str().to_os_string();
    name.push(SIDECAR_SUFFIX);
    PathBuf::from(name)
}

/// Create parent directories for a path if they don't exist
pub fn ensure_parent_dirs(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_forward_slashes() {
        assert_eq!(to_forward_slashes("Textures\\ui\\icon.png"), "Textures/ui/icon.png");
        assert_eq!(to_forward_slashes("already/forward"), "already/forward");
    }

    #[test]
    fn test_to_asset_path() {
        let root = Path::new("/project");
        assert_eq!(
            to_asset_path(root, Path::new("/project/Assets/rock.png")),
            Some("Assets/rock.png".to_string())
        );
        assert_eq!(to_asset_path(root, Path::new("/elsewhere/rock.png")), None);
        assert_eq!(to_asset_path(root, root), None);
    }

    #[test]
    fn test_is_texture_path() {
        assert!(is_texture_path("Assets/rock.png"));
        assert!(is_texture_path("Assets\\Sky.HDR"));
        assert!(is_texture_path("noise.tga"));
        assert!(!is_texture_path("Assets/rock.png.import.json"));
        assert!(!is_texture_path("Assets/model.fbx"));
        assert!(!is_texture_path("Assets/.png"));
        assert!(!is_texture_path("README"));
    }

    #[test]
    fn test_extension() {
        assert_eq!(extension("armor.dds"), Some("dds"));
        assert_eq!(extension("Data\\armor.DDS"), Some("DDS"));
        assert_eq!(extension("noext"), None);
    }

    #[test]
    fn test_sidecar_path() {
        assert_eq!(
            sidecar_path(Path::new("/p/Assets/rock.png")),
            PathBuf::from("/p/Assets/rock.png.import.json")
        );
    }
}
