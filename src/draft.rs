//! Draft model: the user-edited fields that define what gets captured.
//!
//! Locally picked images are registered in an [`ObjectUrlRegistry`], which
//! hands out `blob:` display URLs and keeps the bytes resolvable for the
//! capture engine. A draft releases its registry entry whenever the image is
//! replaced or cleared, and when the draft itself is dropped.

use crate::rendering::ImageResolver;
use crate::{Error, Result};
use log::debug;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

const BLOB_PREFIX: &str = "blob:ogshot/";

/// A file the user picked
#[derive(Debug, Clone)]
pub struct LocalFile {
    pub name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl LocalFile {
    pub fn new(name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self { name: name.into(), mime: mime.into(), bytes }
    }

    /// Read a file from disk, guessing its MIME type from the extension
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let mime = image::ImageFormat::from_path(path)
            .map(|f| f.to_mime_type().to_string())
            .unwrap_or_else(|_| "application/octet-stream".to_string());
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self { name, mime, bytes })
    }

    pub fn is_image(&self) -> bool {
        self.mime.to_ascii_lowercase().starts_with("image/")
    }
}

#[derive(Default)]
struct RegistryInner {
    next_id: u64,
    entries: HashMap<String, LocalFile>,
}

/// Session-scoped table of `blob:` URLs for locally picked files
///
/// Cloning yields another handle to the same table.
#[derive(Clone, Default)]
pub struct ObjectUrlRegistry {
    inner: Arc<Mutex<RegistryInner>>,
}

impl ObjectUrlRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, RegistryInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Register a file and return its display URL
    pub fn create(&self, file: LocalFile) -> String {
        let mut inner = self.lock();
        inner.next_id += 1;
        let url = format!("{}{}", BLOB_PREFIX, inner.next_id);
        inner.entries.insert(url.clone(), file);
        url
    }

    /// Release a URL. Returns false if it was not live.
    pub fn revoke(&self, url: &str) -> bool {
        let removed = self.lock().entries.remove(url).is_some();
        if removed {
            debug!("Released local image {}", url);
        }
        removed
    }

    pub fn is_live(&self, url: &str) -> bool {
        self.lock().entries.contains_key(url)
    }

    /// Number of URLs that have not been released yet
    pub fn live_count(&self) -> usize {
        self.lock().entries.len()
    }
}

impl ImageResolver for ObjectUrlRegistry {
    fn resolve(&self, url: &str) -> Result<Vec<u8>> {
        self.lock()
            .entries
            .get(url)
            .map(|f| f.bytes.clone())
            .ok_or_else(|| Error::UnknownImage(url.to_string()))
    }
}

/// The chosen image as the draft sees it
#[derive(Debug, Clone, PartialEq)]
pub struct LocalImage {
    pub url: String,
    pub name: String,
    /// Encoded file contents, shared with any region captured from this draft
    pub bytes: Arc<[u8]>,
}

/// The in-progress post
pub struct Draft {
    title: String,
    content: String,
    image: Option<LocalImage>,
    registry: ObjectUrlRegistry,
}

impl Draft {
    pub fn new(registry: ObjectUrlRegistry) -> Self {
        Self {
            title: String::new(),
            content: String::new(),
            image: None,
            registry,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// HTML markup from the rich-text editor
    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn image(&self) -> Option<&LocalImage> {
        self.image.as_ref()
    }

    pub fn set_title(&mut self, text: impl Into<String>) {
        self.title = text.into();
    }

    pub fn set_content(&mut self, html: impl Into<String>) {
        self.content = html.into();
    }

    /// Register a picked file and make it the draft's image.
    ///
    /// Non-image files are refused and the current image is kept.
    pub fn set_image(&mut self, file: LocalFile) -> Result<&LocalImage> {
        if !file.is_image() {
            return Err(Error::UnsupportedMedia(format!("{} ({})", file.name, file.mime)));
        }
        let name = file.name.clone();
        let bytes: Arc<[u8]> = Arc::from(file.bytes.as_slice());
        let url = self.registry.create(file);
        self.release_image();
        Ok(self.image.insert(LocalImage { url, name, bytes }))
    }

    pub fn clear_image(&mut self) {
        self.release_image();
    }

    fn release_image(&mut self) {
        if let Some(old) = self.image.take() {
            self.registry.revoke(&old.url);
        }
    }

    /// At least one of title, content or image is present
    pub fn is_valid_for_generation(&self) -> bool {
        !self.title.is_empty() || !self.content.is_empty() || self.image.is_some()
    }

    pub fn ensure_valid(&self) -> Result<()> {
        if self.is_valid_for_generation() {
            Ok(())
        } else {
            Err(Error::ValidationError("title, content and image are all empty".into()))
        }
    }
}

impl Drop for Draft {
    fn drop(&mut self) {
        self.release_image();
    }
}
