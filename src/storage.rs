use crate::config::ensure_config_dir;
use crate::error::{Result, SnipjarError};
use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Key-value byte store holding persisted state.
///
/// Values are always replaced wholesale; there is no partial write.
pub trait Store {
    /// Read the value under `key`, `None` if it was never written.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Overwrite the value under `key`.
    fn set(&mut self, key: &str, value: &[u8]) -> Result<()>;
}

/// Store backed by a directory, one `<key>.json` file per key.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn open(dir: &Path) -> Result<Self> {
        let dir = ensure_config_dir(dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Get the path to the file holding `key`
    pub fn key_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    /// Scratch file a new value is written to before it replaces `key_path`.
    pub fn temp_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json.tmp", key))
    }

    /// Write to the scratch file, fsync, then rename over the target so a
    /// reader sees either the old value or the new one.
    fn write_atomic(&self, key: &str, value: &[u8]) -> io::Result<()> {
        let temp = self.temp_path(key);
        let mut file = fs::File::create(&temp)?;
        file.write_all(value)?;
        file.sync_all()?;
        drop(file);
        fs::rename(&temp, self.key_path(key))
    }
}

impl Store for FileStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.key_path(key);
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(SnipjarError::Persistence(format!(
                "could not read {}: {}",
                path.display(),
                e
            ))),
        }
    }

    fn set(&mut self, key: &str, value: &[u8]) -> Result<()> {
        let path = self.key_path(key);
        self.write_atomic(key, value).map_err(|e| {
            SnipjarError::Persistence(format!("could not write {}: {}", path.display(), e))
        })?;
        log::debug!("Wrote {} bytes to {}", value.len(), path.display());
        Ok(())
    }
}

/// In-memory store, used when embedding the library and in tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, Vec<u8>>,
    read_only: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-populated with `value` under `key`.
    pub fn with_entry(key: &str, value: &[u8]) -> Self {
        let mut store = Self::new();
        store.entries.insert(key.to_string(), value.to_vec());
        store
    }

    /// Make every subsequent write fail, like a full or disabled storage area.
    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    pub fn raw(&self, key: &str) -> Option<&[u8]> {
        self.entries.get(key).map(Vec::as_slice)
    }
}

impl Store for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &[u8]) -> Result<()> {
        if self.read_only {
            return Err(SnipjarError::Persistence(
                "storage quota exceeded".to_string(),
            ));
        }
        self.entries.insert(key.to_string(), value.to_vec());
        Ok(())
    }
}
