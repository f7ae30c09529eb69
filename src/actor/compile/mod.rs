//! Compile coordinator.
//!
//! Runs in the isolated compile context (its own spawned task), owns the
//! compiler engine, and serializes every compile:
//!
//! - snapshots received before the engine is `Ready` are dropped, not queued;
//!   the `Ready` event tells the store to reseed with a fresh sync
//! - at most one compile is ever in flight; snapshots arriving meanwhile
//!   collapse into a single latest-wins pending value, and only that value
//!   compiles once the running compile completes
//! - a failed init is terminal: every later snapshot fails immediately
//!
//! Supersession is the only form of cancellation: an in-flight compile is
//! never aborted, its output just stops mattering.

#[cfg(test)]
mod tests;

use tokio::sync::mpsc;

use super::messages::{Artifact, WorkerEvent, WorkerRequest};
use crate::engine::{CompilerEngine, EngineHandle};
use crate::error::CompileFailure;
use crate::vfs::{Snapshot, normalize_abs};

pub struct CompileActor {
    rx: mpsc::Receiver<WorkerRequest>,
    events: mpsc::Sender<WorkerEvent>,
    compiler: EngineHandle<dyn CompilerEngine>,
}

impl CompileActor {
    pub fn new(
        rx: mpsc::Receiver<WorkerRequest>,
        events: mpsc::Sender<WorkerEvent>,
        compiler: EngineHandle<dyn CompilerEngine>,
    ) -> Self {
        Self {
            rx,
            events,
            compiler,
        }
    }

    /// Run the actor event loop.
    pub async fn run(mut self) {
        if !self.init_phase().await {
            return;
        }

        while let Some(WorkerRequest::SyncVfs(snapshot)) = self.rx.recv().await {
            let mut next = Some(snapshot);
            while let Some(snapshot) = next.take() {
                let event = self.compile(snapshot).await;
                if self.events.send(event).await.is_err() {
                    return; // UI side gone
                }
                // Anything that arrived during the compile collapses to the
                // latest value; intermediates are discarded, never queued.
                next = self.take_latest_pending();
            }
        }
    }

    /// Drive the one-time engine initialization.
    ///
    /// Returns `false` when the actor should stop (init failed and the event
    /// channel closed, or the request channel closed). Snapshots arriving
    /// while initializing are dropped.
    async fn init_phase(&mut self) -> bool {
        let compiler = self.compiler.clone();
        let init = compiler.ready();
        tokio::pin!(init);

        let outcome = loop {
            tokio::select! {
                biased;
                res = &mut init => break res,
                msg = self.rx.recv() => match msg {
                    Some(WorkerRequest::SyncVfs(_)) => {
                        crate::debug!("compile"; "dropped snapshot before engine ready");
                    }
                    None => return false,
                },
            }
        };

        match outcome {
            Ok(()) => {
                // Anything still queued was sent before Ready: drop it too.
                // The eager re-sync triggered by the Ready event reseeds the
                // file set, so nothing is lost.
                while self.rx.try_recv().is_ok() {
                    crate::debug!("compile"; "dropped snapshot before engine ready");
                }
                crate::debug!("compile"; "engine ready");
                self.events.send(WorkerEvent::Ready).await.is_ok()
            }
            Err(err) => {
                crate::log!("error"; "{}", err);
                let _ = self.events.send(WorkerEvent::Failed(err.to_string())).await;
                // Terminal state: answer every further snapshot with the
                // initialization failure, never retry the init.
                while let Some(WorkerRequest::SyncVfs(_)) = self.rx.recv().await {
                    if self
                        .events
                        .send(WorkerEvent::Failed(err.to_string()))
                        .await
                        .is_err()
                    {
                        break;
                    }
                }
                false
            }
        }
    }

    /// Collapse everything queued behind the running compile into the single
    /// pending slot; the newest snapshot wins.
    fn take_latest_pending(&mut self) -> Option<Snapshot> {
        let mut pending = None;
        while let Ok(WorkerRequest::SyncVfs(snapshot)) = self.rx.try_recv() {
            pending = Some(snapshot);
        }
        pending
    }

    /// Compile one snapshot: reset the engine's file set, register every
    /// file under a normalized absolute path, compile from the main path.
    async fn compile(&self, snapshot: Snapshot) -> WorkerEvent {
        if !snapshot.has_main() {
            let failure =
                CompileFailure::message(format!("main file {} not found", snapshot.main_path));
            return WorkerEvent::Failed(failure.to_string());
        }

        crate::debug!(
            "compile";
            "{} files, main {}",
            snapshot.files.len(),
            snapshot.main_path
        );

        let mut engine = self.compiler.lock().await;
        engine.reset_files();
        for (path, content) in &snapshot.files {
            engine.add_file(&normalize_abs(path), content);
        }

        match engine.compile(&normalize_abs(&snapshot.main_path)).await {
            Ok(bytes) => WorkerEvent::Rendered(Artifact::new(bytes)),
            Err(failure) => WorkerEvent::Failed(failure.to_string()),
        }
    }
}
