//! Pipeline assembly and the embedding-facing handle.
//!
//! [`Coordinator::spawn`] wires the three actors together and returns a
//! [`PreviewHandle`]. The engine handles are clonable, so an embedder that
//! keeps process-wide engine singletons can hand the same handles to every
//! preview session; initialization still happens exactly once per handle.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::compile::CompileActor;
use super::editor::EditorActor;
use super::messages::EditorMsg;
use super::render::RenderActor;
use crate::config::PreviewConfig;
use crate::debounce::Debouncer;
use crate::engine::{CompilerEngine, EngineHandle, PreviewSurface, RendererEngine};
use crate::vfs::import::{ImportEntry, import_entries};
use crate::vfs::{FileContent, Vfs};

pub struct Coordinator {
    config: Arc<PreviewConfig>,
}

impl Coordinator {
    pub fn new(config: PreviewConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Spawn the compile, render, and editor actors and wire their channels.
    ///
    /// `vfs` is the initial document store; its main content seeds the
    /// debouncer baseline. The compile actor runs on its own task (the
    /// isolated context); the editor and render actors belong to the UI side.
    pub fn spawn(
        self,
        compiler: EngineHandle<dyn CompilerEngine>,
        renderer: EngineHandle<dyn RendererEngine>,
        surface: Box<dyn PreviewSurface>,
        vfs: Vfs,
    ) -> PreviewHandle {
        let buffer = self.config.channel_buffer;
        let (editor_tx, editor_rx) = mpsc::channel(buffer);
        let (worker_tx, worker_rx) = mpsc::channel(buffer);
        let (event_tx, event_rx) = mpsc::channel(buffer);
        let (render_tx, render_rx) = mpsc::channel(buffer);

        tokio::spawn(CompileActor::new(worker_rx, event_tx, compiler).run());

        let coalesce = Duration::from_millis(self.config.render_coalesce_ms);
        tokio::spawn(
            RenderActor::new(
                render_rx,
                renderer,
                surface,
                coalesce,
                self.config.pixel_scale,
            )
            .run(),
        );

        let baseline = match vfs.file(vfs.main_path()) {
            Some(FileContent::Text(text)) => text.clone(),
            _ => String::new(),
        };
        let debouncer = Debouncer::with_initial(
            Duration::from_millis(self.config.base_debounce_ms),
            baseline,
        );
        let editor = tokio::spawn(
            EditorActor::new(editor_rx, event_rx, worker_tx, render_tx, vfs, debouncer).run(),
        );

        PreviewHandle {
            tx: editor_tx,
            editor,
            config: self.config,
        }
    }
}

/// Live handle to a running preview pipeline.
///
/// Dropping the handle tears the pipeline down without flushing; prefer
/// [`shutdown`](Self::shutdown), which waits for a pending edit to land.
pub struct PreviewHandle {
    tx: mpsc::Sender<EditorMsg>,
    editor: JoinHandle<()>,
    config: Arc<PreviewConfig>,
}

impl PreviewHandle {
    /// The main document's full new content after a keystroke or paste.
    pub async fn edit(&self, content: impl Into<String>) -> Result<()> {
        self.send(EditorMsg::Edit(content.into())).await
    }

    /// Replace one store entry directly, bypassing the debouncer.
    pub async fn update_file(
        &self,
        path: impl Into<String>,
        content: impl Into<FileContent>,
    ) -> Result<()> {
        self.send(EditorMsg::UpdateFile {
            path: path.into(),
            content: content.into(),
        })
        .await
    }

    /// Import a picked folder, replacing the whole store.
    ///
    /// Validation happens here, before anything is sent: a rejected import
    /// leaves the running pipeline untouched.
    pub async fn import(&self, entries: Vec<ImportEntry>) -> Result<()> {
        let project = import_entries(entries, &self.config)?;
        self.send(EditorMsg::Import {
            files: project.files,
            main_path: project.main_path,
        })
        .await
    }

    /// Notify the pipeline that the display container changed size.
    pub async fn resized(&self) -> Result<()> {
        self.send(EditorMsg::Resized).await
    }

    /// Tear the pipeline down, flushing a still-pending edit first.
    pub async fn shutdown(self) -> Result<()> {
        drop(self.tx);
        self.editor
            .await
            .context("editor actor panicked during shutdown")
    }

    async fn send(&self, msg: EditorMsg) -> Result<()> {
        self.tx
            .send(msg)
            .await
            .map_err(|_| anyhow::anyhow!("preview pipeline has stopped"))
    }
}
