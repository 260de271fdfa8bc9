//! ogshot
//!
//! Compose a short post (title, rich-text content, optional image) and
//! snapshot the composed layout into an Open Graph preview image.
//!
//! # Features
//!
//! - **Composer**: draft fields, a two-state generation pipeline, notifications
//!   and the generated-image panel, all owned by one session
//! - **Pluggable capture**: any [`CaptureEngine`] works; [`CaptureWorker`] runs the
//!   built-in pure-Rust rasterizer on a dedicated thread
//! - **Injected side effects**: page metadata, downloads and new surfaces go through
//!   the traits in [`platform`], so no global document is needed
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use ogshot::platform::HeadlessPlatform;
//! use ogshot::{CaptureWorker, Composer, ComposerConfig, ObjectUrlRegistry, RasterEngine};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = ObjectUrlRegistry::new();
//! let worker = CaptureWorker::spawn(RasterEngine::new(Arc::new(registry.clone())))?;
//! let platform = Arc::new(HeadlessPlatform::new("out"));
//!
//! let composer = Composer::new(ComposerConfig::default(), Arc::new(worker), platform, registry);
//! composer.set_title("Hello");
//! composer.set_content("<p>World</p>");
//! composer.generate().await;
//! composer.download()?;
//! # Ok(())
//! # }
//! ```

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub mod error;
pub use error::{Error, Result};

pub mod artifact;
pub mod data_url;
pub mod draft;
pub mod engine;
pub mod notify;
pub mod pipeline;
pub mod platform;
pub mod region;
pub mod rendering;
pub mod viewer;
pub mod worker;

pub use artifact::{ImageArtifact, PanelVisibility};
pub use draft::{Draft, LocalFile, LocalImage, ObjectUrlRegistry};
pub use engine::RasterEngine;
pub use notify::{Notification, NotificationChannel, Severity};
pub use pipeline::{Composer, DraftFields, GenerateOutcome, Phase, ViewState};
pub use region::{ImageRef, RenderedRegion};
pub use rendering::Screenshot;
pub use worker::CaptureWorker;

/// Largest frame, in pixels, any capture may allocate (64 megapixels)
pub const MAX_OUTPUT_PIXELS: u64 = 64 * 1024 * 1024;

/// Options handed to the capture engine with every request
///
/// The defaults mirror a typical Open Graph card: a 1200x630 logical
/// region rendered at twice its size with cross-origin images allowed.
///
/// # Examples
///
/// ```
/// let opts = ogshot::CaptureOptions::default();
/// assert_eq!(opts.scale, 2.0);
/// assert_eq!((opts.window_width, opts.window_height), (1200, 630));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureOptions {
    /// Output pixels per logical pixel
    pub scale: f32,
    /// Whether images marked `crossorigin="anonymous"` may be included
    pub use_cors: bool,
    /// Logical width of the captured region
    pub window_width: u32,
    /// Logical height of the captured region
    pub window_height: u32,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            scale: 2.0,
            use_cors: true,
            window_width: 1200,
            window_height: 630,
        }
    }
}

impl CaptureOptions {
    /// Pixel size of the frame an engine should produce for a region of the given logical size
    pub fn output_size(&self, width: u32, height: u32) -> (u32, u32) {
        let w = (width as f32 * self.scale).round().max(1.0) as u32;
        let h = (height as f32 * self.scale).round().max(1.0) as u32;
        (w, h)
    }

    /// [`Self::output_size`], refusing invalid scales and frames over [`MAX_OUTPUT_PIXELS`]
    pub fn checked_output_size(&self, width: u32, height: u32) -> Result<(u32, u32)> {
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(Error::RenderError(format!("invalid scale {}", self.scale)));
        }
        let (w, h) = self.output_size(width, height);
        if u64::from(w) * u64::from(h) > MAX_OUTPUT_PIXELS {
            return Err(Error::RenderError(format!(
                "{}x{} frame exceeds {} pixels",
                w, h, MAX_OUTPUT_PIXELS
            )));
        }
        Ok((w, h))
    }
}

/// Session configuration for a [`Composer`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComposerConfig {
    /// Capture request options
    pub capture: CaptureOptions,
    /// How long a notification stays visible before it hides itself
    pub notification_timeout_ms: u64,
    /// File name used when the artifact is downloaded
    pub download_filename: String,
    /// Page metadata property the artifact URL is published under
    pub meta_property: String,
    /// Route prefix of the full-screen image viewer
    pub viewer_prefix: String,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            capture: CaptureOptions::default(),
            notification_timeout_ms: 3000,
            download_filename: "og-image.png".to_string(),
            meta_property: "og:image".to_string(),
            viewer_prefix: "/og/".to_string(),
        }
    }
}

impl ComposerConfig {
    /// Load a JSON config file; missing keys keep their defaults
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| Error::ConfigError(format!("Failed to read {}: {}", path.display(), e)))?;
        let config: ComposerConfig = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values no capture could honour
    pub fn validate(&self) -> Result<()> {
        let scale = self.capture.scale;
        if !scale.is_finite() || scale <= 0.0 {
            return Err(Error::ConfigError(format!("scale must be positive, got {}", scale)));
        }
        if self.capture.window_width == 0 || self.capture.window_height == 0 {
            return Err(Error::ConfigError("window dimensions must be non-zero".into()));
        }
        let capture = &self.capture;
        if let Err(e) = capture.checked_output_size(capture.window_width, capture.window_height) {
            return Err(Error::ConfigError(format!("capture size: {}", e)));
        }
        if self.notification_timeout_ms == 0 {
            return Err(Error::ConfigError("notification timeout must be non-zero".into()));
        }
        if self.download_filename.trim().is_empty() {
            return Err(Error::ConfigError("download filename is empty".into()));
        }
        Ok(())
    }
}

/// A rasterizer that turns a rendered region into one PNG frame
///
/// Implementations must be interchangeable: the pipeline only relies on
/// this contract. A returned error is treated as a rejected capture.
pub trait CaptureEngine: Send + Sync {
    /// Capture `region` according to `options`
    fn capture<'a>(
        &'a self,
        region: &'a RenderedRegion,
        options: &'a CaptureOptions,
    ) -> BoxFuture<'a, Result<Screenshot>>;
}
