use crate::error::{Result, SnipjarError};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Store key holding the whole snippet collection.
pub const STORE_KEY: &str = "snippets";
/// File name used when exporting into a directory.
pub const EXPORT_FILENAME: &str = "snippets.json";
/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "SNIPJAR_HOME";

/// Get the snipjar data directory
pub fn get_config_dir() -> PathBuf {
    if let Ok(dir) = env::var(DATA_DIR_ENV) {
        if !dir.trim().is_empty() {
            return PathBuf::from(dir);
        }
    }
    env::var("HOME")
        .map(|home| PathBuf::from(home).join(".snipjar"))
        .unwrap_or_else(|_| PathBuf::from(".snipjar"))
}

/// Ensure the data directory exists, creating it if needed
pub fn ensure_config_dir(dir: &Path) -> Result<PathBuf> {
    if dir.exists() && !dir.is_dir() {
        return Err(SnipjarError::InvalidConfig(format!(
            "Data path is not a directory: {}",
            dir.display()
        )));
    }
    if !dir.exists() {
        log::info!("Creating data directory at: {}", dir.display());
        fs::create_dir_all(dir)?;
    }
    Ok(dir.to_path_buf())
}

/// Resolve where an export should be written.
///
/// A directory gets `snippets.json` appended; anything else is used as is.
pub fn resolve_export_path(target: &Path) -> PathBuf {
    if target.is_dir() {
        target.join(EXPORT_FILENAME)
    } else {
        target.to_path_buf()
    }
}
