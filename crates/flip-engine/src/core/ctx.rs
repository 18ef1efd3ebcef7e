use crate::gfx::GfxRef;
use crate::loader::Loader;

/// Engine services available to [`Application::initialize`](super::Application::initialize).
pub struct AppCtx<'a> {
    gfx: &'a GfxRef,
    loader: &'a mut Loader,
    headless: bool,
}

impl<'a> AppCtx<'a> {
    pub(crate) fn new(gfx: &'a GfxRef, loader: &'a mut Loader, headless: bool) -> Self {
        Self { gfx, loader, headless }
    }

    /// True when running without a window, renderer or camera.
    pub fn is_headless(&self) -> bool {
        self.headless
    }

    /// Backend for creating application owned resources.
    pub fn gfx(&self) -> &GfxRef {
        self.gfx
    }

    pub fn loader(&mut self) -> &mut Loader {
        self.loader
    }

    /// Framebuffer size in physical pixels.
    pub fn framebuffer_size(&self) -> (u32, u32) {
        self.gfx.framebuffer_size()
    }
}
