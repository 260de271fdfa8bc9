//! Generation state machine scenarios against scripted capture engines

use futures::future::BoxFuture;
use ogshot::platform::{HeadlessPlatform, MemorySaver, MetaSlot};
use ogshot::{
    CaptureEngine, CaptureOptions, Composer, ComposerConfig, Error, GenerateOutcome, LocalFile, ObjectUrlRegistry,
    Phase, RasterEngine, RenderedRegion, Result, Screenshot, Severity,
};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

fn frame(bytes: &[u8]) -> Screenshot {
    Screenshot { width: 1, height: 1, png_data: bytes.to_vec() }
}

/// Resolves with fixed bytes, or fails while `fail` is set; records regions it saw
struct ScriptedEngine {
    calls: AtomicUsize,
    fail: AtomicBool,
    regions: Mutex<Vec<RenderedRegion>>,
}

impl ScriptedEngine {
    fn new() -> Arc<Self> {
        Arc::new(Self { calls: AtomicUsize::new(0), fail: AtomicBool::new(false), regions: Mutex::new(Vec::new()) })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl CaptureEngine for ScriptedEngine {
    fn capture<'a>(&'a self, region: &'a RenderedRegion, _: &'a CaptureOptions) -> BoxFuture<'a, Result<Screenshot>> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        self.regions.lock().unwrap().push(region.clone());
        let fail = self.fail.load(Ordering::SeqCst);
        Box::pin(async move {
            if fail {
                Err(Error::CaptureError("engine rejected".into()))
            } else if n == 0 {
                Ok(frame(&[0, 0, 0]))
            } else {
                Ok(frame(&[1, 2, 3]))
            }
        })
    }
}

/// Holds every capture until the gate is opened
struct GatedEngine {
    calls: AtomicUsize,
    gate: Notify,
    fail: bool,
}

impl GatedEngine {
    fn new(fail: bool) -> Arc<Self> {
        Arc::new(Self { calls: AtomicUsize::new(0), gate: Notify::new(), fail })
    }
}

impl CaptureEngine for GatedEngine {
    fn capture<'a>(&'a self, _: &'a RenderedRegion, _: &'a CaptureOptions) -> BoxFuture<'a, Result<Screenshot>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Box::pin(async move {
            self.gate.notified().await;
            if self.fail {
                Err(Error::CaptureError("late failure".into()))
            } else {
                Ok(frame(&[0, 0, 0]))
            }
        })
    }
}

/// Real rasterizer that waits for the gate before drawing
struct GatedRaster {
    inner: RasterEngine,
    gate: Notify,
}

impl CaptureEngine for GatedRaster {
    fn capture<'a>(&'a self, region: &'a RenderedRegion, options: &'a CaptureOptions) -> BoxFuture<'a, Result<Screenshot>> {
        Box::pin(async move {
            self.gate.notified().await;
            self.inner.render(region, options)
        })
    }
}

fn solid_png(rgba: [u8; 4]) -> Vec<u8> {
    let mut bytes = Vec::new();
    DynamicImage::ImageRgba8(RgbaImage::from_pixel(8, 8, Rgba(rgba)))
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

fn setup(engine: Arc<dyn CaptureEngine>) -> (Composer, Arc<HeadlessPlatform<MemorySaver>>) {
    let platform = Arc::new(HeadlessPlatform::in_memory());
    let composer = Composer::new(ComposerConfig::default(), engine, platform.clone(), ObjectUrlRegistry::new());
    (composer, platform)
}

#[tokio::test]
async fn populated_draft_generates_artifact_panel_and_meta() {
    let engine = ScriptedEngine::new();
    let (composer, platform) = setup(engine.clone());
    composer.set_title("Hello");
    composer.set_content("<p>World</p>");

    let outcome = composer.generate().await;

    let expected = "data:image/png;base64,AAAA";
    assert_eq!(outcome, GenerateOutcome::Generated(expected.to_string()));
    assert_eq!(engine.calls(), 1);
    assert_eq!(composer.artifact_url().as_deref(), Some(expected));
    assert_eq!(platform.head().value("og:image").as_deref(), Some(expected));
    assert_eq!(composer.phase(), Phase::Idle);

    let view = composer.view_state();
    assert!(view.panel_visible);
    assert!(!view.busy);
    let n = view.notification.unwrap();
    assert_eq!(n.severity, Severity::Success);
    assert!(n.visible);

    let regions = engine.regions.lock().unwrap();
    let region = &regions[0];
    assert_eq!(region.title, "Hello");
    assert_eq!(region.content_html, "<p>World</p>");
    assert_eq!((region.width, region.height), (1200, 630));
}

#[tokio::test]
async fn empty_draft_never_reaches_engine() {
    let engine = ScriptedEngine::new();
    let (composer, platform) = setup(engine.clone());

    assert_eq!(composer.generate().await, GenerateOutcome::Invalid);
    assert_eq!(engine.calls(), 0);
    assert_eq!(composer.artifact_url(), None);
    assert_eq!(platform.head().value("og:image"), None);

    let n = composer.view_state().notification.unwrap();
    assert_eq!(n.severity, Severity::Error);
    assert!(n.visible);
}

#[tokio::test]
async fn image_only_draft_is_valid() {
    let engine = ScriptedEngine::new();
    let (composer, _) = setup(engine.clone());
    let url = composer.set_image(LocalFile::new("pic.png", "image/png", vec![9])).unwrap();

    assert!(matches!(composer.generate().await, GenerateOutcome::Generated(_)));
    let regions = engine.regions.lock().unwrap();
    let region = &regions[0];
    let img = region.image.as_ref().unwrap();
    assert_eq!(img.url, url);
    assert!(img.cross_origin);
}

#[tokio::test]
async fn failure_keeps_prior_artifact_and_returns_to_idle() {
    let engine = ScriptedEngine::new();
    let (composer, platform) = setup(engine.clone());
    composer.set_title("t");

    let first = match composer.generate().await {
        GenerateOutcome::Generated(url) => url,
        other => panic!("unexpected {:?}", other),
    };

    engine.fail.store(true, Ordering::SeqCst);
    let outcome = composer.generate().await;
    assert!(matches!(outcome, GenerateOutcome::Failed(_)));
    assert_eq!(composer.phase(), Phase::Idle);
    assert_eq!(composer.artifact_url(), Some(first.clone()));
    assert_eq!(platform.head().value("og:image"), Some(first));
    assert_eq!(composer.view_state().notification.unwrap().severity, Severity::Error);

    // The user retries explicitly
    engine.fail.store(false, Ordering::SeqCst);
    assert!(matches!(composer.generate().await, GenerateOutcome::Generated(_)));
    assert_eq!(engine.calls(), 3);
}

#[tokio::test]
async fn failure_without_prior_artifact_leaves_it_absent() {
    let engine = ScriptedEngine::new();
    engine.fail.store(true, Ordering::SeqCst);
    let (composer, _) = setup(engine);
    composer.set_content("x");

    assert!(matches!(composer.generate().await, GenerateOutcome::Failed(_)));
    assert_eq!(composer.artifact_url(), None);
    assert!(!composer.view_state().panel_visible);
}

#[tokio::test]
async fn repeated_generations_overwrite_single_meta_slot() {
    let engine = ScriptedEngine::new();
    let (composer, platform) = setup(engine);
    composer.set_title("t");

    composer.generate().await;
    composer.generate().await;

    assert_eq!(platform.head().count("og:image"), 1);
    assert_eq!(platform.head().value("og:image").as_deref(), Some("data:image/png;base64,AQID"));
    assert_eq!(composer.artifact_url().as_deref(), Some("data:image/png;base64,AQID"));
}

#[tokio::test]
async fn generate_while_generating_is_ignored() {
    let engine = GatedEngine::new(false);
    let (composer, _) = setup(engine.clone());
    composer.set_title("busy");

    let mut running = Box::pin(composer.generate());
    assert!(futures::poll!(&mut running).is_pending());
    assert_eq!(composer.phase(), Phase::Generating);

    let view = composer.view_state();
    assert!(view.busy);
    assert!(!view.can_generate);
    assert_eq!(view.notification.unwrap().severity, Severity::Info);

    assert_eq!(composer.generate().await, GenerateOutcome::Rejected);
    assert_eq!(composer.generate().await, GenerateOutcome::Rejected);
    assert_eq!(engine.calls.load(Ordering::SeqCst), 1);

    engine.gate.notify_one();
    assert!(matches!(running.await, GenerateOutcome::Generated(_)));
    assert_eq!(composer.phase(), Phase::Idle);
    assert_eq!(engine.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn late_failure_releases_generating_phase() {
    let engine = GatedEngine::new(true);
    let (composer, _) = setup(engine.clone());
    composer.set_title("x");

    let mut running = Box::pin(composer.generate());
    assert!(futures::poll!(&mut running).is_pending());
    engine.gate.notify_one();
    assert!(matches!(running.await, GenerateOutcome::Failed(_)));
    assert_eq!(composer.phase(), Phase::Idle);
}

#[tokio::test]
async fn dropped_generation_does_not_stick_in_generating() {
    let engine = GatedEngine::new(false);
    let (composer, _) = setup(engine);
    composer.set_title("x");

    let mut running = Box::pin(composer.generate());
    assert!(futures::poll!(&mut running).is_pending());
    drop(running);
    assert_eq!(composer.phase(), Phase::Idle);
    assert_eq!(composer.artifact_url(), None);
}

#[tokio::test]
async fn download_saves_artifact_and_notifies() {
    let (composer, platform) = setup(ScriptedEngine::new());
    assert!(!composer.download().unwrap());
    assert!(platform.saver().saved().is_empty());

    composer.set_title("t");
    composer.generate().await;
    assert!(composer.download().unwrap());

    let saved = platform.saver().saved();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].filename, "og-image.png");
    assert_eq!(saved[0].bytes, vec![0, 0, 0]);
    let n = composer.view_state().notification.unwrap();
    assert_eq!((n.severity, n.message.as_str()), (Severity::Success, "Image downloaded."));
}

#[tokio::test]
async fn panel_toggle_is_independent_of_artifact() {
    let (composer, _) = setup(ScriptedEngine::new());
    assert!(!composer.view_state().panel_visible);
    assert!(composer.toggle_panel());
    assert!(composer.view_state().image_url.is_none());
    assert!(!composer.toggle_panel());

    composer.set_title("t");
    composer.generate().await;
    assert!(composer.view_state().panel_visible);
    assert!(!composer.toggle_panel());
    assert!(composer.view_state().image_url.is_some());
}

#[tokio::test(start_paused = true)]
async fn newer_notification_outlives_older_timer() {
    let (composer, _) = setup(ScriptedEngine::new());

    // Error at t=0
    composer.generate().await;
    tokio::time::sleep(Duration::from_millis(2000)).await;

    // Success at t=2000
    composer.set_title("now valid");
    composer.generate().await;

    tokio::time::sleep(Duration::from_millis(1500)).await;
    let n = composer.view_state().notification.unwrap();
    assert_eq!(n.severity, Severity::Success);

    tokio::time::sleep(Duration::from_millis(1600)).await;
    assert!(composer.view_state().notification.is_none());
}

#[tokio::test]
async fn dismiss_hides_notification_immediately() {
    let (composer, _) = setup(ScriptedEngine::new());
    composer.generate().await;
    assert!(composer.view_state().notification.is_some());
    composer.dismiss_notification();
    assert!(composer.view_state().notification.is_none());
}

#[tokio::test]
async fn replacing_image_mid_capture_keeps_captured_image() {
    let registry = ObjectUrlRegistry::new();
    let engine = Arc::new(GatedRaster { inner: RasterEngine::new(Arc::new(registry.clone())), gate: Notify::new() });
    let mut config = ComposerConfig::default();
    config.capture.window_width = 120;
    config.capture.window_height = 120;
    let platform = Arc::new(HeadlessPlatform::in_memory());
    let composer = Composer::new(config, engine.clone(), platform, registry.clone());

    let first = composer.set_image(LocalFile::new("a.png", "image/png", solid_png([255, 0, 0, 255]))).unwrap();
    let mut running = Box::pin(composer.generate());
    assert!(futures::poll!(&mut running).is_pending());

    composer.set_image(LocalFile::new("b.png", "image/png", solid_png([0, 0, 255, 255]))).unwrap();
    assert!(!registry.is_live(&first));
    engine.gate.notify_one();

    let url = match running.await {
        GenerateOutcome::Generated(url) => url,
        other => panic!("unexpected {:?}", other),
    };
    let bytes = ogshot::data_url::decode(&url).unwrap().bytes;
    let frame = image::load_from_memory(&bytes).unwrap().to_rgba8();
    assert!(frame.pixels().any(|p| p.0 == [255, 0, 0, 255]), "frame should hold the image chosen at capture time");
    assert!(!frame.pixels().any(|p| p.0 == [0, 0, 255, 255]));

    // Clearing mid-capture behaves the same
    let mut running = Box::pin(composer.generate());
    assert!(futures::poll!(&mut running).is_pending());
    composer.clear_image();
    engine.gate.notify_one();
    assert!(matches!(running.await, GenerateOutcome::Generated(_)));
    assert_eq!(registry.live_count(), 0);
}
