//! RasterEngine: pure-Rust capture backend built on the `rendering` module.

use crate::region::RenderedRegion;
use crate::rendering::{self, ImageResolver, Screenshot};
use crate::{CaptureEngine, CaptureOptions, Error, Result};
use futures::future::BoxFuture;
use log::{debug, warn};
use std::sync::Arc;

/// Synchronous rasterizer. Wrap it in a [`crate::CaptureWorker`] to keep
/// captures off the async executor.
#[derive(Clone)]
pub struct RasterEngine {
    resolver: Arc<dyn ImageResolver>,
}

impl RasterEngine {
    pub fn new(resolver: Arc<dyn ImageResolver>) -> Self {
        Self { resolver }
    }

    /// Render `region` into a PNG frame. Any failure is reported as a rejected capture.
    pub fn render(&self, region: &RenderedRegion, options: &CaptureOptions) -> Result<Screenshot> {
        if region.width == 0 || region.height == 0 {
            return Err(Error::CaptureError("region has zero size".into()));
        }
        match rendering::render_region(region, options, self.resolver.as_ref()) {
            Ok(shot) => {
                debug!("Rendered {}x{} frame {}", shot.width, shot.height, shot.digest());
                Ok(shot)
            }
            Err(e @ Error::TaintedImage(_)) => {
                warn!("Capture blocked: {}", e);
                Err(e)
            }
            Err(e) => Err(Error::CaptureError(e.to_string())),
        }
    }
}

impl CaptureEngine for RasterEngine {
    fn capture<'a>(
        &'a self,
        region: &'a RenderedRegion,
        options: &'a CaptureOptions,
    ) -> BoxFuture<'a, Result<Screenshot>> {
        Box::pin(async move { self.render(region, options) })
    }
}
