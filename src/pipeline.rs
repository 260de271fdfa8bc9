//! Snapshot pipeline: the composer session and its generation state machine.
//!
//! ```text
//! Idle --generate/invalid--> Idle         (Error notification)
//! Idle --generate/valid----> Generating   (Info notification, capture)
//! Generating --generate----> Generating   (ignored)
//! Generating --capture ok--> Idle         (artifact, panel, meta slot, Success)
//! Generating --capture err-> Idle         (Error notification)
//! ```
//!
//! Session state sits behind a mutex that is never held across the capture
//! await, so overlapping `generate` calls on one composer see `Generating`
//! and are ignored. The return to `Idle` is tied to a drop guard and happens
//! on every exit path.

use crate::artifact::{ImageArtifact, PanelVisibility};
use crate::draft::{Draft, LocalFile, ObjectUrlRegistry};
use crate::notify::{Notification, NotificationChannel, Severity};
use crate::platform::PlatformApi;
use crate::region::RenderedRegion;
use crate::{data_url, viewer, CaptureEngine, ComposerConfig, Result};
use log::{debug, error, info};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

pub const MSG_FIELDS_MISSING: &str = "Please fill in at least one field before generating.";
pub const MSG_GENERATING: &str = "Generating OG image...";
pub const MSG_GENERATED: &str = "OG image generated successfully.";
pub const MSG_DOWNLOADED: &str = "Image downloaded.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Idle,
    Generating,
}

/// What a `generate` request ended up doing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerateOutcome {
    /// A capture was already running; nothing happened
    Rejected,
    /// The draft had nothing to capture
    Invalid,
    /// Capture succeeded; carries the new artifact URL
    Generated(String),
    /// Capture failed; the previous artifact is kept
    Failed(String),
}

/// Read-only copy of the draft fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DraftFields {
    pub title: String,
    pub content: String,
    pub image_url: Option<String>,
}

/// Everything the view layer renders from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewState {
    pub busy: bool,
    pub can_generate: bool,
    pub panel_visible: bool,
    pub image_url: Option<String>,
    pub notification: Option<Notification>,
}

struct Session {
    draft: Draft,
    phase: Phase,
    artifact: ImageArtifact,
    panel: PanelVisibility,
}

/// Returns the session to `Idle` when dropped
struct IdleOnDrop<'a> {
    session: &'a Mutex<Session>,
}

impl Drop for IdleOnDrop<'_> {
    fn drop(&mut self) {
        lock(self.session).phase = Phase::Idle;
    }
}

fn lock(session: &Mutex<Session>) -> MutexGuard<'_, Session> {
    session.lock().unwrap_or_else(|e| e.into_inner())
}

/// One composer view: draft, generation state, artifact, panel and notifications
pub struct Composer {
    config: ComposerConfig,
    engine: Arc<dyn CaptureEngine>,
    platform: Arc<dyn PlatformApi>,
    session: Mutex<Session>,
    notifications: NotificationChannel,
}

impl Composer {
    pub fn new(
        config: ComposerConfig,
        engine: Arc<dyn CaptureEngine>,
        platform: Arc<dyn PlatformApi>,
        registry: ObjectUrlRegistry,
    ) -> Self {
        let notifications = NotificationChannel::new(Duration::from_millis(config.notification_timeout_ms));
        Self {
            config,
            engine,
            platform,
            session: Mutex::new(Session {
                draft: Draft::new(registry),
                phase: Phase::Idle,
                artifact: ImageArtifact::default(),
                panel: PanelVisibility::default(),
            }),
            notifications,
        }
    }

    fn session(&self) -> MutexGuard<'_, Session> {
        lock(&self.session)
    }

    pub fn config(&self) -> &ComposerConfig {
        &self.config
    }

    pub fn notifications(&self) -> &NotificationChannel {
        &self.notifications
    }

    // --- draft ---

    pub fn set_title(&self, text: impl Into<String>) {
        self.session().draft.set_title(text);
    }

    pub fn set_content(&self, html: impl Into<String>) {
        self.session().draft.set_content(html);
    }

    /// Attach a picked file; returns its display URL
    pub fn set_image(&self, file: LocalFile) -> Result<String> {
        let mut session = self.session();
        let image = session.draft.set_image(file)?;
        debug!("Draft image set to {} ({})", image.url, image.name);
        Ok(image.url.clone())
    }

    pub fn clear_image(&self) {
        self.session().draft.clear_image();
    }

    pub fn draft_fields(&self) -> DraftFields {
        let session = self.session();
        DraftFields {
            title: session.draft.title().to_string(),
            content: session.draft.content().to_string(),
            image_url: session.draft.image().map(|i| i.url.clone()),
        }
    }

    // --- generation ---

    pub fn phase(&self) -> Phase {
        self.session().phase
    }

    pub fn is_generating(&self) -> bool {
        self.phase() == Phase::Generating
    }

    /// Run one pass of the state machine.
    ///
    /// Failures never escape: they become an Error notification and a
    /// `Failed` outcome, and the phase is back to `Idle` when this returns.
    pub async fn generate(&self) -> GenerateOutcome {
        let region = {
            let mut session = self.session();
            if session.phase == Phase::Generating {
                debug!("Generate ignored: capture already running");
                return GenerateOutcome::Rejected;
            }
            if let Err(e) = session.draft.ensure_valid() {
                drop(session);
                info!("Generate refused: {}", e);
                self.notifications.trigger(MSG_FIELDS_MISSING, Severity::Error);
                return GenerateOutcome::Invalid;
            }
            session.phase = Phase::Generating;
            let capture = &self.config.capture;
            RenderedRegion::from_draft(&session.draft, capture.window_width, capture.window_height)
        };
        let _idle = IdleOnDrop { session: &self.session };

        info!("Generating OG image...");
        self.notifications.trigger(MSG_GENERATING, Severity::Info);

        let captured = self
            .engine
            .capture(&region, &self.config.capture)
            .await
            .map(|frame| data_url::encode_png(&frame.png_data));

        match captured {
            Ok(url) => {
                {
                    let mut session = self.session();
                    session.artifact.store(url.clone());
                    session.panel.show();
                }
                self.platform.meta_slot().publish(&self.config.meta_property, &url);
                info!("OG image generated successfully ({} bytes as data URL)", url.len());
                self.notifications.trigger(MSG_GENERATED, Severity::Success);
                GenerateOutcome::Generated(url)
            }
            Err(e) => {
                error!("Failed to generate OG image: {}", e);
                self.notifications
                    .trigger(format!("Failed to generate OG image: {}", e), Severity::Error);
                GenerateOutcome::Failed(e.to_string())
            }
        }
    }

    // --- artifact and panel ---

    pub fn artifact_url(&self) -> Option<String> {
        self.session().artifact.data_url().map(str::to_string)
    }

    /// Save the artifact under the configured file name.
    ///
    /// Returns `Ok(false)` without touching the saver when there is no artifact.
    pub fn download(&self) -> Result<bool> {
        let Some(url) = self.artifact_url() else {
            debug!("Download ignored: no artifact");
            return Ok(false);
        };
        match self.platform.file_saver().save(&url, &self.config.download_filename) {
            Ok(path) => {
                info!("Downloaded artifact to {}", path.display());
                self.notifications.trigger(MSG_DOWNLOADED, Severity::Success);
                Ok(true)
            }
            Err(e) => {
                error!("Download failed: {}", e);
                self.notifications.trigger(format!("Download failed: {}", e), Severity::Error);
                Err(e)
            }
        }
    }

    /// Open the artifact in the full-screen viewer; `Ok(false)` without artifact
    pub fn open_in_new_surface(&self) -> Result<bool> {
        let Some(url) = self.artifact_url() else {
            return Ok(false);
        };
        let route = viewer::route_for(&self.config.viewer_prefix, &url);
        self.platform.surface_opener().open(&route)?;
        Ok(true)
    }

    pub fn toggle_panel(&self) -> bool {
        self.session().panel.toggle()
    }

    pub fn dismiss_notification(&self) {
        self.notifications.dismiss();
    }

    pub fn view_state(&self) -> ViewState {
        let (busy, panel_visible, image_url) = {
            let session = self.session();
            (
                session.phase == Phase::Generating,
                session.panel.is_visible(),
                session.artifact.data_url().map(str::to_string),
            )
        };
        ViewState {
            busy,
            can_generate: !busy,
            panel_visible,
            image_url,
            notification: self.notifications.visible(),
        }
    }
}
