//! Render queue coordinator.
//!
//! Runs in the UI context, owns the renderer engine and the display surface,
//! and serializes every paint:
//!
//! - incoming artifacts land in a single pending slot, latest wins; the slot
//!   also buffers across engine initialization
//! - the first artifact after an idle period waits out a short coalescing
//!   window; anything newer reschedules it
//! - after a paint, a refilled slot drains again immediately with no extra
//!   delay, so the surface converges to the latest artifact
//! - the scroll offset is recorded before each paint and restored after it,
//!   so repaints do not jump the view
//! - a container resize repaints the cached last-successful artifact; it
//!   never triggers a compile
//!
//! On a render failure the previously painted output is retained and the
//! cache is left untouched; only successful paints move it forward.


use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{Instant, sleep_until};

use super::messages::{Artifact, RenderMsg};
use crate::engine::{EngineHandle, PreviewSurface, RendererEngine};
use crate::logger;

pub struct RenderActor {
    rx: mpsc::Receiver<RenderMsg>,
    renderer: EngineHandle<dyn RendererEngine>,
    surface: Box<dyn PreviewSurface>,
    /// Coalescing window applied to the first enqueue after idle.
    coalesce: Duration,
    /// Scale used when the surface reports a non-positive or non-finite one.
    fallback_scale: f32,
    /// The one-deep latest-wins slot.
    pending: Option<Artifact>,
    /// Last successfully painted artifact, kept for resize repaints.
    last_rendered: Option<Artifact>,
}

impl RenderActor {
    pub fn new(
        rx: mpsc::Receiver<RenderMsg>,
        renderer: EngineHandle<dyn RendererEngine>,
        surface: Box<dyn PreviewSurface>,
        coalesce: Duration,
        fallback_scale: f32,
    ) -> Self {
        Self {
            rx,
            renderer,
            surface,
            coalesce,
            fallback_scale,
            pending: None,
            last_rendered: None,
        }
    }

    /// Run the actor event loop.
    pub async fn run(mut self) {
        if !self.init_phase().await {
            return;
        }

        // An artifact may already be waiting from the init window
        let mut deadline = self.pending.as_ref().map(|_| Instant::now() + self.coalesce);

        loop {
            tokio::select! {
                biased;
                msg = self.rx.recv() => match msg {
                    Some(RenderMsg::Artifact(artifact)) => {
                        self.pending = Some(artifact);
                        deadline = Some(Instant::now() + self.coalesce);
                    }
                    Some(RenderMsg::Resized) => self.repaint_cached().await,
                    None => break,
                },
                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    deadline = None;
                    self.drain().await;
                }
            }
        }

        // Teardown: paint whatever is still pending so the surface matches
        // the final document state
        self.drain().await;
    }

    /// Drive the one-time renderer initialization.
    ///
    /// Artifacts arriving while initializing are held in the pending slot
    /// (latest wins) and painted once the engine is ready. Returns `false`
    /// when the actor should stop.
    async fn init_phase(&mut self) -> bool {
        let renderer = self.renderer.clone();
        let init = renderer.ready();
        tokio::pin!(init);

        let outcome = loop {
            tokio::select! {
                biased;
                res = &mut init => break res,
                msg = self.rx.recv() => match msg {
                    Some(RenderMsg::Artifact(artifact)) => self.pending = Some(artifact),
                    Some(RenderMsg::Resized) => {}
                    None => return false,
                },
            }
        };

        match outcome {
            Ok(()) => {
                crate::debug!("render"; "engine ready");
                true
            }
            Err(err) => {
                crate::log!("error"; "{}", err);
                logger::status_error("renderer unavailable", &err.to_string());
                // Terminal: consume and drop everything until shutdown
                while let Some(msg) = self.rx.recv().await {
                    if matches!(msg, RenderMsg::Artifact(_)) {
                        crate::debug!("render"; "dropped artifact, renderer init failed");
                    }
                }
                false
            }
        }
    }

    /// Paint the pending artifact, then keep draining as long as the slot
    /// refills during a paint. Re-drains skip the coalescing delay so the
    /// surface converges to the latest artifact without an extra wait.
    async fn drain(&mut self) {
        while let Some(artifact) = self.pending.take() {
            self.render_one(&artifact).await;
            self.collapse_queue();
        }
    }

    /// Collapse everything that arrived while painting into the single
    /// pending slot; intermediate artifacts are discarded.
    fn collapse_queue(&mut self) {
        while let Ok(msg) = self.rx.try_recv() {
            match msg {
                RenderMsg::Artifact(artifact) => self.pending = Some(artifact),
                // The paint that just finished may have sampled the container
                // before the resize; schedule one more paint unless a newer
                // artifact already covers it
                RenderMsg::Resized => {
                    if self.pending.is_none() {
                        self.pending = self.last_rendered.as_ref().map(Artifact::detached);
                    }
                }
            }
        }
    }

    /// One single-flight paint with scroll preservation.
    async fn render_one(&mut self, artifact: &Artifact) {
        let prev_scroll = self.surface.scroll_top();
        let reported = self.surface.pixel_scale();
        let pixel_scale = if reported.is_finite() && reported > 0.0 {
            reported
        } else {
            self.fallback_scale
        };

        let result = {
            let mut engine = self.renderer.lock().await;
            engine
                .render(&mut *self.surface, artifact.as_bytes(), pixel_scale)
                .await
        };

        // Restore once the paint has settled so the view does not jump
        self.surface.set_scroll_top(prev_scroll);

        match result {
            Ok(()) => {
                self.last_rendered = Some(artifact.detached());
                crate::debug!("render"; "painted {} bytes", artifact.len());
                logger::status_success("preview updated");
            }
            Err(err) => {
                // Previous output stays on the surface; the cache only
                // moves forward on success
                logger::status_error("render failed", &err.to_string());
            }
        }
    }

    /// Re-layout of existing output after a container resize. Never
    /// triggers a compile.
    async fn repaint_cached(&mut self) {
        let Some(artifact) = self.last_rendered.as_ref().map(Artifact::detached) else {
            crate::debug!("render"; "resize before first paint, nothing to do");
            return;
        };
        self.render_one(&artifact).await;
    }
}
