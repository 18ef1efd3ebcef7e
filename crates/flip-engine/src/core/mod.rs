//! Application lifecycle contracts.
//!
//! The runtime drives an [`Application`] through a [`Host`], which owns the
//! renderer, camera, loader and timing state for one window. The host is
//! platform independent; `window::Runtime` feeds it translated events and
//! redraw requests, or runs a bounded number of frames without a window.

mod app;
mod ctx;
mod factory;
mod host;

pub use app::{Application, LoopControl};
pub use ctx::AppCtx;
pub use factory::{make_camera, make_renderer};
pub(crate) use host::Host;
