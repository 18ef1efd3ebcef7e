use anyhow::Result;

use crate::input::{InputEvent, InputState};
use crate::render::Renderer;
use crate::time::Time;

use super::AppCtx;

/// Directive returned by [`Application::update`].
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum LoopControl {
    #[default]
    Continue,
    /// Leave the loop normally.
    Break,
    /// Leave the loop and report failure from `Runtime::run` or
    /// `Runtime::run_headless`.
    BreakFailure,
}

/// Application contract implemented by programs built on the engine.
pub trait Application {
    /// Called once, after the GPU backend is available and before the first
    /// frame. An error aborts the run. When [`AppCtx::is_headless`] is true
    /// there is no window and `display` is never called.
    fn initialize(&mut self, _ctx: &mut AppCtx<'_>) -> Result<()> {
        Ok(())
    }

    fn update(&mut self, _time: &Time, _input: &InputState) -> LoopControl {
        LoopControl::Continue
    }

    /// Draws one frame. The default pass is open for the whole call.
    fn display(&mut self, renderer: &mut dyn Renderer) -> Result<()>;

    /// Returns true when the event was consumed; the renderer and camera then
    /// never see it.
    fn event(&mut self, _event: &InputEvent) -> bool {
        false
    }
}
