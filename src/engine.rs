//! Engine interfaces and lifecycle.
//!
//! The compiler and renderer are external collaborators behind traits; this
//! crate never looks inside them. [`EngineHandle`] wraps an engine in a
//! shareable handle whose one-time async initialization is memoized: every
//! caller awaits the same initialization, and a failed init stays failed for
//! the lifetime of the handle (re-initialization is unbounded cost without
//! guaranteed progress).

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, MutexGuard, OnceCell};

use crate::error::{CompileFailure, InitError, RenderError};
use crate::vfs::FileContent;

/// The compiler engine, owned by the compile coordinator.
#[async_trait]
pub trait CompilerEngine: Send + 'static {
    /// One-time async initialization (module loading, font setup).
    async fn init(&mut self) -> Result<(), InitError>;

    /// Drop every file registered so far.
    fn reset_files(&mut self);

    /// Register one file under a normalized absolute path.
    fn add_file(&mut self, path: &str, content: &FileContent);

    /// Compile the registered files starting from `main_path`.
    async fn compile(&mut self, main_path: &str) -> Result<Vec<u8>, CompileFailure>;
}

/// The renderer engine, owned by the render coordinator.
#[async_trait]
pub trait RendererEngine: Send + 'static {
    /// One-time async initialization.
    async fn init(&mut self) -> Result<(), InitError>;

    /// Repaint the surface with a compiled artifact at the given pixel scale.
    async fn render(
        &mut self,
        surface: &mut dyn PreviewSurface,
        artifact: &[u8],
        pixel_scale: f32,
    ) -> Result<(), RenderError>;
}

/// The display container the renderer paints into.
///
/// The render coordinator records the scroll offset before a paint and
/// restores it once the paint has settled, so repaints do not jump the view.
pub trait PreviewSurface: Send + 'static {
    /// Current vertical scroll offset of the container.
    fn scroll_top(&self) -> f64;

    /// Restore a previously recorded scroll offset.
    fn set_scroll_top(&mut self, offset: f64);

    /// Device pixel scale to render at. Must stay constant between paints,
    /// otherwise the intrinsic height changes and scroll restore drifts.
    fn pixel_scale(&self) -> f32;
}

/// Engine lifecycle: `Uninitialized → Initializing → Ready | InitFailed`.
///
/// `Initializing` is entered at most once; concurrent callers of
/// [`EngineHandle::ready`] await the same pending initialization instead of
/// re-triggering it. `InitFailed` is terminal.
pub struct EngineHandle<E: ?Sized> {
    engine: Arc<Mutex<Box<E>>>,
    init: Arc<OnceCell<Result<(), InitError>>>,
}

impl<E: ?Sized> Clone for EngineHandle<E> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
            init: Arc::clone(&self.init),
        }
    }
}

impl<E: ?Sized> EngineHandle<E> {
    pub fn new(engine: Box<E>) -> Self {
        Self {
            engine: Arc::new(Mutex::new(engine)),
            init: Arc::new(OnceCell::new()),
        }
    }

    /// Exclusive access to the engine for a single operation.
    ///
    /// Callers must have awaited [`ready`](Self::ready) first; the guard is
    /// uncontended in practice because each coordinator is the sole owner of
    /// its engine's operations.
    pub async fn lock(&self) -> MutexGuard<'_, Box<E>> {
        self.engine.lock().await
    }
}

/// Unifies the engine traits for lifecycle purposes, so [`EngineHandle`]
/// carries a single `ready` implementation for every engine kind.
#[async_trait]
trait EngineInit {
    async fn engine_init(&mut self) -> Result<(), InitError>;
}

#[async_trait]
impl EngineInit for dyn CompilerEngine {
    async fn engine_init(&mut self) -> Result<(), InitError> {
        self.init().await
    }
}

#[async_trait]
impl EngineInit for dyn RendererEngine {
    async fn engine_init(&mut self) -> Result<(), InitError> {
        self.init().await
    }
}

impl<E: EngineInit + ?Sized> EngineHandle<E> {
    /// Await the memoized initialization outcome.
    pub async fn ready(&self) -> Result<(), InitError> {
        self.init
            .get_or_init(|| async { self.engine.lock().await.engine_init().await })
            .await
            .clone()
    }
}
