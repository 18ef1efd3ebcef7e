//! GPU device + surface management.
//!
//! This module is responsible for:
//! - creating the wgpu Instance/Adapter/Device/Queue
//! - creating & configuring the Surface (swapchain)
//! - acquiring frames and mapping surface errors to recovery actions
//!
//! Draw recording lives one level up, in `gfx::WgpuGfx`, which owns a `Gpu`.

mod context;
mod error;
mod frame;
mod init;
mod surface;

pub use context::Gpu;
pub use error::{SurfaceErrorAction, ValidationErrors};
pub use frame::GpuFrame;
pub use init::GpuInit;
