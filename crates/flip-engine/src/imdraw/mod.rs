//! Immediate-mode drawing.
//!
//! An [`ImDraw`] session collects vertices one at a time and draws them in a
//! single call through the [`ImDrawer`], which owns the per-mode pipelines and
//! the shared per-frame vertex stream.

mod cache;
mod drawer;
mod mode;
mod session;
mod vertex;

pub use cache::PipelineCache;
pub use drawer::ImDrawer;
pub use mode::RenderMode;
pub use session::ImDraw;
pub use vertex::ImVertex;
