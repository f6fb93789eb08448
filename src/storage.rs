//! Filesystem access scoped to the uploads directory.
//!
//! Every operation is blocking; handlers run them through `web::block`.

use chrono::{DateTime, Utc};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("file not found: {0}")]
    NotFound(String),
    #[error("file already exists: {0}")]
    AlreadyExists(String),
    #[error("invalid file name: {0:?}")]
    InvalidName(String),
    #[error("io error on {name}: {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

impl StorageError {
    fn io(name: &str, source: std::io::Error) -> Self {
        match source.kind() {
            ErrorKind::NotFound => StorageError::NotFound(name.to_string()),
            ErrorKind::AlreadyExists => StorageError::AlreadyExists(name.to_string()),
            _ => StorageError::Io {
                name: name.to_string(),
                source,
            },
        }
    }
}

/// One regular file in the uploads directory.
#[derive(Debug, Clone, PartialEq)]
pub struct FileEntry {
    pub storage_name: String,
    pub size_bytes: u64,
    pub modified_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct Storage {
    root: PathBuf,
}

impl Storage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn ensure_root_exists(&self) -> Result<(), StorageError> {
        std::fs::create_dir_all(&self.root).map_err(|e| StorageError::Io {
            name: self.root.display().to_string(),
            source: e,
        })
    }

    /// Whether `name` is a regular file in the root. Directories and other
    /// entries are not files of this store.
    pub fn exists(&self, name: &str) -> bool {
        self.resolve(name).map(|p| p.is_file()).unwrap_or(false)
    }

    pub fn write(&self, name: &str, data: &[u8]) -> Result<(), StorageError> {
        let path = self.resolve(name)?;
        std::fs::write(path, data).map_err(|e| StorageError::Io {
            name: name.to_string(),
            source: e,
        })
    }

    pub fn read(&self, name: &str) -> Result<Vec<u8>, StorageError> {
        let path = self.resolve(name)?;
        if !path.is_file() {
            return Err(StorageError::NotFound(name.to_string()));
        }
        std::fs::read(path).map_err(|e| StorageError::io(name, e))
    }

    /// Regular files in the root, in directory enumeration order. A missing
    /// root reads as empty.
    pub fn list(&self) -> Result<Vec<FileEntry>, StorageError> {
        let root_name = self.root.display().to_string();
        let entries = match std::fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StorageError::io(&root_name, e)),
        };

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StorageError::io(&root_name, e))?;
            let storage_name = match entry.file_name().into_string() {
                Ok(name) => name,
                Err(raw) => {
                    log::warn!("skipping non-utf8 entry {raw:?}");
                    continue;
                }
            };
            let metadata = match entry.metadata() {
                Ok(m) => m,
                // Removed between read_dir and stat.
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(StorageError::io(&storage_name, e)),
            };
            if !metadata.is_file() {
                continue;
            }
            let modified = metadata.modified().unwrap_or(UNIX_EPOCH);
            files.push(FileEntry {
                storage_name,
                size_bytes: metadata.len(),
                modified_at: DateTime::<Utc>::from(modified),
            });
        }
        Ok(files)
    }

    /// Rename without overwriting. The existence checks and the rename are
    /// separate syscalls, so two concurrent renames may both pass them.
    pub fn rename(&self, old_name: &str, new_name: &str) -> Result<(), StorageError> {
        let old_path = self.resolve(old_name)?;
        let new_path = self.resolve(new_name)?;
        if !self.exists(old_name) {
            return Err(StorageError::NotFound(old_name.to_string()));
        }
        // any entry at the target blocks the rename, not just regular files
        if std::fs::symlink_metadata(&new_path).is_ok() {
            return Err(StorageError::AlreadyExists(new_name.to_string()));
        }
        std::fs::rename(&old_path, &new_path).map_err(|e| StorageError::io(old_name, e))
    }

    // Names must be a single plain path component so nothing escapes the root.
    fn resolve(&self, name: &str) -> Result<PathBuf, StorageError> {
        if name.is_empty()
            || name == "."
            || name == ".."
            || name.contains(['/', '\\', '\0'])
        {
            return Err(StorageError::InvalidName(name.to_string()));
        }
        Ok(self.root.join(name))
    }
}
