//! Platform surface: page metadata, downloads and new viewing surfaces
//!
//! The composer never touches a document directly. Everything it publishes
//! goes through these traits, so a real page host and the headless
//! implementations below are interchangeable.

pub mod meta;
pub mod saver;
pub mod surface;

pub use meta::{HeadMetadata, MetaSlot};
pub use saver::{DirectorySaver, FileSaver, MemorySaver, SavedFile};
pub use surface::{RecordingOpener, SurfaceOpener};

use std::path::PathBuf;

/// A small composite trait bundling the side-effect targets of a session.
pub trait PlatformApi: Send + Sync {
    fn meta_slot(&self) -> &dyn MetaSlot;
    fn file_saver(&self) -> &dyn FileSaver;
    fn surface_opener(&self) -> &dyn SurfaceOpener;
}

/// In-process platform: an in-memory head, a recording opener and a saver
/// of choice (a directory by default).
pub struct HeadlessPlatform<S = DirectorySaver> {
    head: HeadMetadata,
    saver: S,
    opener: RecordingOpener,
}

impl HeadlessPlatform<DirectorySaver> {
    pub fn new(download_dir: impl Into<PathBuf>) -> Self {
        Self::with_saver(DirectorySaver::new(download_dir))
    }
}

impl HeadlessPlatform<MemorySaver> {
    pub fn in_memory() -> Self {
        Self::with_saver(MemorySaver::new())
    }
}

impl<S: FileSaver> HeadlessPlatform<S> {
    pub fn with_saver(saver: S) -> Self {
        HeadlessPlatform {
            head: HeadMetadata::new(),
            saver,
            opener: RecordingOpener::new(),
        }
    }

    pub fn head(&self) -> &HeadMetadata {
        &self.head
    }

    pub fn saver(&self) -> &S {
        &self.saver
    }

    pub fn opener(&self) -> &RecordingOpener {
        &self.opener
    }
}

impl<S: FileSaver> PlatformApi for HeadlessPlatform<S> {
    fn meta_slot(&self) -> &dyn MetaSlot {
        &self.head
    }

    fn file_saver(&self) -> &dyn FileSaver {
        &self.saver
    }

    fn surface_opener(&self) -> &dyn SurfaceOpener {
        &self.opener
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headless_platform_exposes_its_parts() {
        let p = HeadlessPlatform::in_memory();
        p.meta_slot().publish("og:image", "data:x");
        assert_eq!(p.head().value("og:image").as_deref(), Some("data:x"));

        p.file_saver().save("data:image/png;base64,AQID", "og-image.png").unwrap();
        assert_eq!(p.saver().saved().len(), 1);

        p.surface_opener().open("/og/x").unwrap();
        assert_eq!(p.opener().opened().len(), 1);
    }
}
