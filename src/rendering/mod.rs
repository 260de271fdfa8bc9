//! Rendering: region markup -> layout -> paint commands -> PNG frame

pub mod layout;
pub mod paint;
pub mod raster;

use crate::region::{ImageRef, RenderedRegion};
use crate::{CaptureOptions, Result};
use scraper::Html;
use sha2::{Digest, Sha256};

/// Logical size of the area being laid out
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

/// One raster frame produced by a capture
#[derive(Debug, Clone)]
pub struct Screenshot {
    pub width: u32,
    pub height: u32,
    pub png_data: Vec<u8>,
}

impl Screenshot {
    /// Hex SHA-256 of the PNG bytes
    pub fn digest(&self) -> String {
        hex::encode(Sha256::digest(&self.png_data))
    }
}

/// Resolves non-inline image URLs to their encoded bytes
pub trait ImageResolver: Send + Sync {
    fn resolve(&self, url: &str) -> Result<Vec<u8>>;
}

/// Serves the region's pinned image bytes, falling back to `inner` for other URLs
struct PinnedImages<'a> {
    pinned: Option<&'a ImageRef>,
    inner: &'a dyn ImageResolver,
}

impl ImageResolver for PinnedImages<'_> {
    fn resolve(&self, url: &str) -> Result<Vec<u8>> {
        match self.pinned {
            Some(ImageRef { url: pinned_url, bytes: Some(bytes), .. }) if pinned_url == url => Ok(bytes.to_vec()),
            _ => self.inner.resolve(url),
        }
    }
}

/// Run the full layout/paint/raster chain for a region
pub fn render_region(
    region: &RenderedRegion,
    options: &CaptureOptions,
    resolver: &dyn ImageResolver,
) -> Result<Screenshot> {
    let viewport = Viewport { width: region.width, height: region.height };
    let document = Html::parse_fragment(&region.to_html());
    let nodes = layout::layout_region(&document, viewport)?;
    let commands = paint::build_display_list(&nodes, viewport);
    let images = PinnedImages { pinned: region.image.as_ref(), inner: resolver };
    raster::rasterize(&commands, viewport, options, &images)
}
