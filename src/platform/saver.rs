/// Client-side "save as" for generated images

use crate::{data_url, Result};
use log::info;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub trait FileSaver: Send + Sync {
    /// Save the payload of `data_url` under `filename`; returns where it went
    fn save(&self, data_url: &str, filename: &str) -> Result<PathBuf>;
}

/// Only the final path component of a requested name is honoured
fn safe_name(filename: &str) -> String {
    Path::new(filename)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| "download".to_string())
}

/// Writes downloads into a directory, creating it on first use
pub struct DirectorySaver {
    dir: PathBuf,
}

impl DirectorySaver {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        DirectorySaver { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl FileSaver for DirectorySaver {
    fn save(&self, data_url: &str, filename: &str) -> Result<PathBuf> {
        let decoded = data_url::decode(data_url)?;
        std::fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(safe_name(filename));
        std::fs::write(&path, &decoded.bytes)?;
        info!("Saved {} bytes to {}", decoded.bytes.len(), path.display());
        Ok(path)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SavedFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Keeps saved files in memory
pub struct MemorySaver {
    saved: Mutex<Vec<SavedFile>>,
}

impl MemorySaver {
    pub fn new() -> Self {
        MemorySaver { saved: Mutex::new(Vec::new()) }
    }

    pub fn saved(&self) -> Vec<SavedFile> {
        self.saved.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl Default for MemorySaver {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSaver for MemorySaver {
    fn save(&self, data_url: &str, filename: &str) -> Result<PathBuf> {
        let decoded = data_url::decode(data_url)?;
        let filename = safe_name(filename);
        self.saved
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(SavedFile { filename: filename.clone(), bytes: decoded.bytes });
        Ok(PathBuf::from(filename))
    }
}
