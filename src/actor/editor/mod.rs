//! Editor-side actor (UI context).
//!
//! Owns the [`Debouncer`] and the document store, and is the only writer to
//! either. Everything the embedding UI does funnels through here:
//!
//! - `Edit` records the main document's new content in the debouncer; the
//!   adaptive deadline decides when it lands in the store and syncs
//! - `UpdateFile` and `Import` mutate the store and sync immediately
//! - compile events route back out: `Ready` reseeds the compiler with a
//!   fresh snapshot (unless the store is empty), `Rendered` forwards the
//!   artifact to the render queue, `Failed` surfaces on the status line
//!
//! On shutdown a still-pending edit is flushed into the store and synced, so
//! closing the editor never drops the last keystrokes. The actor then keeps
//! forwarding compile events until the compile side winds down, which lets
//! the final artifact reach the surface.


use tokio::sync::mpsc;
use tokio::time::{Instant, sleep};

use super::messages::{EditorMsg, RenderMsg, WorkerEvent, WorkerRequest};
use crate::debounce::Debouncer;
use crate::logger;
use crate::vfs::{FileContent, Snapshot, Vfs};

pub struct EditorActor {
    rx: mpsc::Receiver<EditorMsg>,
    events: mpsc::Receiver<WorkerEvent>,
    worker_tx: mpsc::Sender<WorkerRequest>,
    render_tx: mpsc::Sender<RenderMsg>,
    vfs: Vfs,
    debouncer: Debouncer,
}

impl EditorActor {
    pub fn new(
        rx: mpsc::Receiver<EditorMsg>,
        events: mpsc::Receiver<WorkerEvent>,
        worker_tx: mpsc::Sender<WorkerRequest>,
        render_tx: mpsc::Sender<RenderMsg>,
        vfs: Vfs,
        debouncer: Debouncer,
    ) -> Self {
        Self {
            rx,
            events,
            worker_tx,
            render_tx,
            vfs,
            debouncer,
        }
    }

    /// Run the actor event loop.
    pub async fn run(mut self) {
        loop {
            let now = Instant::now().into_std();
            tokio::select! {
                biased;
                event = self.events.recv() => match event {
                    Some(event) => self.on_worker_event(event).await,
                    None => break,
                },
                msg = self.rx.recv() => match msg {
                    Some(msg) => self.on_message(msg).await,
                    None => break,
                },
                _ = sleep(self.debouncer.sleep_duration(now)) => {
                    if let Some(content) = self.debouncer.take_if_due(Instant::now().into_std()) {
                        self.apply_edit(content).await;
                    }
                }
            }
        }

        // A scheduled edit is applied on teardown, never dropped
        if let Some(content) = self.debouncer.flush() {
            crate::debug!("edit"; "flushing pending edit on shutdown");
            self.apply_edit(content).await;
        }

        // Close the request channel so the compile side finishes its queue
        // and exits, then forward whatever it still produces. The sender
        // must be dropped explicitly: fields left to `..` stay alive in the
        // partially-moved `self` until `run` returns, which would keep the
        // channel open and deadlock against the drain loop below.
        let EditorActor {
            mut events,
            worker_tx,
            render_tx,
            ..
        } = self;
        drop(worker_tx);
        while let Some(event) = events.recv().await {
            if let WorkerEvent::Rendered(artifact) = event {
                let _ = render_tx.send(RenderMsg::Artifact(artifact)).await;
            }
        }
    }

    async fn on_message(&mut self, msg: EditorMsg) {
        match msg {
            EditorMsg::Edit(content) => {
                self.debouncer.record(content, Instant::now().into_std());
            }
            EditorMsg::UpdateFile { path, content } => {
                // A direct write to the main file is authoritative; a
                // pending edit against the old content must not fire
                let is_main = path == self.vfs.main_path();
                let snapshot = self.vfs.update(path, content);
                if is_main {
                    self.rebase_debouncer();
                }
                self.sync(snapshot).await;
            }
            EditorMsg::Import { files, main_path } => {
                let snapshot = self.vfs.replace_all(files, main_path);
                self.rebase_debouncer();
                crate::log!(
                    "sync";
                    "imported {} files, main {}",
                    snapshot.files.len(),
                    snapshot.main_path
                );
                self.sync(snapshot).await;
            }
            EditorMsg::Resized => {
                let _ = self.render_tx.send(RenderMsg::Resized).await;
            }
        }
    }

    async fn on_worker_event(&mut self, event: WorkerEvent) {
        match event {
            WorkerEvent::Ready => {
                crate::log!("compile"; "engine ready");
                if self.vfs.is_empty() {
                    crate::debug!("sync"; "store empty, nothing to reseed");
                } else {
                    // Snapshots sent before Ready were dropped; reseed the
                    // compiler with the current store state
                    let snapshot = self.vfs.snapshot();
                    self.sync(snapshot).await;
                }
            }
            WorkerEvent::Rendered(artifact) => {
                let _ = self.render_tx.send(RenderMsg::Artifact(artifact)).await;
            }
            WorkerEvent::Failed(message) => {
                logger::status_error("compile failed", &message);
            }
        }
    }

    /// Land a debounced edit in the store and sync.
    async fn apply_edit(&mut self, content: String) {
        let path = self.vfs.main_path().to_string();
        let snapshot = self.vfs.update(path, content);
        self.sync(snapshot).await;
    }

    /// Reset the debouncer baseline to the store's current main content,
    /// discarding any pending edit.
    fn rebase_debouncer(&mut self) {
        let baseline = match self.vfs.file(self.vfs.main_path()) {
            Some(FileContent::Text(text)) => text.clone(),
            _ => String::new(),
        };
        self.debouncer.rebase(baseline);
    }

    async fn sync(&mut self, snapshot: Snapshot) {
        crate::debug!("sync"; "{} files -> compiler", snapshot.files.len());
        if self
            .worker_tx
            .send(WorkerRequest::SyncVfs(snapshot))
            .await
            .is_err()
        {
            crate::debug!("sync"; "compile side gone, snapshot dropped");
        }
    }
}
