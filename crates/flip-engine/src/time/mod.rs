//! Frame timing.
//!
//! `FrameClock` measures real frame deltas; `TimeControl` turns them into the
//! application's update `Time`, honoring freeze, scale and fixed-rate settings.

mod control;
mod frame_clock;

pub use control::{Time, TimeControl};
pub use frame_clock::{FrameClock, FrameTime};
