//! ROM library: the directory of game files served to the player.

use std::io;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

/// File extensions recognised as ROMs (compared case-insensitively).
pub const ROM_EXTENSIONS: &[&str] = &["sfc", "smc", "zip"];

/// A ROM as listed by `GET /api/roms`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RomEntry {
    /// Human readable name.
    pub name: String,
    /// File name within the library.
    pub file_name: String,
}

impl RomEntry {
    fn new(file_name: String) -> Self {
        Self {
            name: prettify(&file_name),
            file_name,
        }
    }
}

/// Read-only view of a ROM directory.
#[derive(Debug, Clone)]
pub struct RomLibrary {
    root: PathBuf,
}

impl RomLibrary {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// List the ROM files in the library, sorted by file name.
    ///
    /// An unreadable or missing directory yields an empty list.
    pub async fn scan(&self) -> Vec<RomEntry> {
        let mut dir = match tokio::fs::read_dir(&self.root).await {
            Ok(dir) => dir,
            Err(e) => {
                tracing::warn!(
                    root = %self.root.display(),
                    error = %e,
                    "Cannot read ROM directory"
                );
                return Vec::new();
            }
        };

        let mut roms = Vec::new();
        loop {
            let entry = match dir.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!(error = %e, "Stopped scanning ROM directory");
                    break;
                }
            };
            let is_file = entry.file_type().await.map(|t| t.is_file()).unwrap_or(false);
            let Ok(file_name) = entry.file_name().into_string() else {
                continue;
            };
            if is_file && is_rom(&file_name) {
                roms.push(RomEntry::new(file_name));
            }
        }

        roms.sort_by(|a, b| a.file_name.cmp(&b.file_name));
        roms
    }

    /// Map a requested name to a path inside the library.
    ///
    /// Only the final path component is kept, so no request can leave the root.
    pub fn resolve(&self, name: &str) -> Option<PathBuf> {
        sanitize(name).map(|file_name| self.root.join(file_name))
    }

    /// Read a ROM file. Returns `None` when the name does not resolve to a file.
    pub async fn read(&self, name: &str) -> io::Result<Option<Vec<u8>>> {
        let Some(path) = self.resolve(name) else {
            return Ok(None);
        };

        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => {}
            Ok(_) => return Ok(None),
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        }

        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// Reduce a requested file name to its final, normal path component.
pub fn sanitize(name: &str) -> Option<&str> {
    match Path::new(name).components().last()? {
        Component::Normal(part) => part.to_str().filter(|part| !part.is_empty()),
        _ => None,
    }
}

/// Whether a file name carries a ROM extension.
pub fn is_rom(file_name: &str) -> bool {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ROM_EXTENSIONS.iter().any(|rom| ext.eq_ignore_ascii_case(rom)))
        .unwrap_or(false)
}

/// Display name for a ROM file: extension dropped, `_` and `-` as spaces.
pub fn prettify(file_name: &str) -> String {
    let stem = match file_name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => file_name,
    };
    stem.replace(['_', '-'], " ")
}
