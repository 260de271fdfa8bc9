/// Opening an image in a new viewing context

use crate::Result;
use log::info;
use std::sync::Mutex;

pub trait SurfaceOpener: Send + Sync {
    fn open(&self, url: &str) -> Result<()>;
}

/// Records every opened URL; the headless stand-in for a new tab
pub struct RecordingOpener {
    opened: Mutex<Vec<String>>,
}

impl RecordingOpener {
    pub fn new() -> Self {
        RecordingOpener { opened: Mutex::new(Vec::new()) }
    }

    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl Default for RecordingOpener {
    fn default() -> Self {
        Self::new()
    }
}

impl SurfaceOpener for RecordingOpener {
    fn open(&self, url: &str) -> Result<()> {
        info!("Opening new surface ({} chars)", url.len());
        self.opened.lock().unwrap_or_else(|e| e.into_inner()).push(url.to_string());
        Ok(())
    }
}
