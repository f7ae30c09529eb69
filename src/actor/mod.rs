//! The three cooperating actors and their wiring.
//!
//! Each actor owns its state exclusively and communicates by value over
//! bounded channels; there is no shared mutable state between the UI side
//! and the compile side.
//!
//! - [`editor::EditorActor`]: UI context. Owns the debouncer and the
//!   document store, routes compile results to the render queue.
//! - [`compile::CompileActor`]: isolated context. Owns the compiler engine,
//!   single-flight with latest-wins supersession.
//! - [`render::RenderActor`]: UI context. Owns the renderer engine and the
//!   display surface, coalesces paints and preserves scroll.
//!
//! [`coordinator::Coordinator`] spawns all three and hands back a
//! [`coordinator::PreviewHandle`].

pub mod compile;
pub mod coordinator;
pub mod editor;
pub mod messages;
pub mod render;

pub use compile::CompileActor;
pub use coordinator::{Coordinator, PreviewHandle};
pub use editor::EditorActor;
pub use render::RenderActor;
