//! Actor message definitions.
//!
//! ```text
//! EditorActor --SyncVfs--> CompileActor --Ready/Rendered/Failed--> EditorActor
//!                                                                      │
//!                                    RenderActor <--Artifact/Resized---┘
//! ```
//!
//! Messages cross the execution boundary by value: ownership transfers on
//! send, nothing is shared and mutated by both sides. [`Artifact::detached`]
//! is the explicit copy for the cases where a value must live on both sides
//! (the render pending slot and the last-rendered cache).

use crate::vfs::{FileContent, Snapshot};

/// Opaque compiled output, consumed by the renderer engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact(Vec<u8>);

impl Artifact {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Defensive copy for reuse across an asynchronous boundary.
    pub fn detached(&self) -> Artifact {
        Artifact(self.0.clone())
    }
}

impl From<Vec<u8>> for Artifact {
    fn from(bytes: Vec<u8>) -> Self {
        Artifact(bytes)
    }
}

/// Inbound command to the compile coordinator.
#[derive(Debug)]
pub enum WorkerRequest {
    /// Full, authoritative replacement of the compile-side file set.
    /// Never a diff.
    SyncVfs(Snapshot),
}

/// Outbound events from the compile coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerEvent {
    /// The compiler engine finished its one-time initialization.
    Ready,
    /// A compile succeeded; the artifact is ready to paint.
    Rendered(Artifact),
    /// A compile (or the initialization) failed.
    Failed(String),
}

/// Messages to the render coordinator.
#[derive(Debug)]
pub enum RenderMsg {
    /// New artifact to paint; supersedes any unpainted one.
    Artifact(Artifact),
    /// The display container changed size; repaint the cached artifact.
    Resized,
}

/// Messages to the editor actor (UI context).
#[derive(Debug)]
pub enum EditorMsg {
    /// Raw keystroke stream: the main document's full new content.
    /// Debounced before it reaches the store.
    Edit(String),
    /// Direct store update, synced immediately.
    UpdateFile { path: String, content: FileContent },
    /// Bulk import: swap the whole mapping and main pointer.
    Import {
        files: rustc_hash::FxHashMap<String, FileContent>,
        main_path: String,
    },
    /// Display container resize, forwarded to the render coordinator.
    Resized,
}
