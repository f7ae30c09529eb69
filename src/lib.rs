//! Typlive - edit-to-preview coordination core for Typst documents.
//!
//! Glues a text editor to an external compiler engine and an external
//! renderer engine across an isolated execution boundary:
//!
//! ```text
//! edit → Debouncer → Vfs → SyncVfs → CompileActor → CompilerEngine
//!                                          │
//!        RendererEngine ← RenderActor ← Rendered / Failed / Ready
//! ```
//!
//! The engines are black boxes behind traits (see [`engine`]); this crate
//! owns the scheduling: adaptive edit coalescing, single-flight compile and
//! render with latest-wins supersession, memoized engine initialization, and
//! scroll preservation across repaints.
//!
//! Entry point: [`Coordinator::spawn`] returns a [`PreviewHandle`] the
//! embedding UI drives.

pub mod actor;
pub mod config;
pub mod debounce;
pub mod engine;
pub mod error;
pub mod logger;
pub mod vfs;

pub use actor::coordinator::{Coordinator, PreviewHandle};
pub use actor::messages::{Artifact, WorkerEvent, WorkerRequest};
pub use config::PreviewConfig;
pub use engine::{CompilerEngine, EngineHandle, PreviewSurface, RendererEngine};
pub use error::{CompileFailure, ImportError, InitError, RenderError};
pub use vfs::import::{ImportEntry, ImportedProject};
pub use vfs::{FileContent, Snapshot, Vfs};
