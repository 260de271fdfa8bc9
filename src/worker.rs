use crate::region::RenderedRegion;
use crate::rendering::Screenshot;
use crate::{CaptureEngine, CaptureOptions, Error, RasterEngine, Result};
use futures::future::BoxFuture;
use log::debug;
use std::sync::mpsc::{self, Sender};
use std::thread;
use tokio::sync::oneshot;

enum Command {
    Capture(RenderedRegion, CaptureOptions, oneshot::Sender<Result<Screenshot>>),
    Close(oneshot::Sender<Result<()>>),
}

/// An async-friendly capture engine backed by a dedicated worker thread.
///
/// The worker thread owns a [`RasterEngine`] and executes capture commands
/// sent from async tasks, so rasterizing never blocks the executor.
/// Commands are served one at a time in arrival order.
#[derive(Clone)]
pub struct CaptureWorker {
    cmd_tx: Sender<Command>,
}

impl CaptureWorker {
    /// Spawn the worker thread that owns `engine`
    pub fn spawn(engine: RasterEngine) -> Result<Self> {
        let (cmd_tx, cmd_rx) = mpsc::channel::<Command>();

        thread::Builder::new()
            .name("ogshot-capture".into())
            .spawn(move || {
                while let Ok(cmd) = cmd_rx.recv() {
                    match cmd {
                        Command::Capture(region, options, resp) => {
                            let res = engine.render(&region, &options);
                            let _ = resp.send(res);
                        }
                        Command::Close(resp) => {
                            debug!("Capture worker shutting down");
                            let _ = resp.send(Ok(()));
                            break;
                        }
                    }
                }
            })
            .map_err(|e| Error::InitializationError(format!("Failed to spawn capture thread: {}", e)))?;

        Ok(Self { cmd_tx })
    }

    /// Shut the worker down. Captures sent afterwards fail.
    pub async fn close(self) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::Close(tx))
            .map_err(|_| Error::Other("Capture worker already closed".into()))?;
        rx.await
            .map_err(|e| Error::Other(format!("Close canceled: {}", e)))?
    }
}

impl CaptureEngine for CaptureWorker {
    fn capture<'a>(
        &'a self,
        region: &'a RenderedRegion,
        options: &'a CaptureOptions,
    ) -> BoxFuture<'a, Result<Screenshot>> {
        Box::pin(async move {
            let (tx, rx) = oneshot::channel();
            self.cmd_tx
                .send(Command::Capture(region.clone(), options.clone(), tx))
                .map_err(|_| Error::CaptureError("capture worker is not running".into()))?;
            rx.await
                .map_err(|e| Error::CaptureError(format!("Capture canceled: {}", e)))?
        })
    }
}
