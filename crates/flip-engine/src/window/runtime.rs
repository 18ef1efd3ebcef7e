use std::rc::Rc;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::core::{Application, Host, LoopControl};
use crate::device::{Gpu, GpuInit};
use crate::gfx::{GfxRef, NullGfx, WgpuGfx};
use crate::input::platform::winit::translate_window_event;

/// Frames run by [`Runtime::run_headless`] unless the application breaks first.
pub const HEADLESS_FRAMES: usize = 10;

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
    /// Clear color of the default pass.
    pub clear_color: [f32; 4],
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "flip".to_string(),
            initial_size: LogicalSize::new(1280.0, 720.0),
            clear_color: [0.2, 0.2, 0.2, 1.0],
        }
    }
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Runs `app` until it breaks or the window closes.
    ///
    /// Returns an error when initialization or a frame fails, or when the
    /// application leaves with [`LoopControl::BreakFailure`].
    pub fn run<A>(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Result<()>
    where
        A: Application + 'static,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut state = RuntimeState::new(config, gpu_init, app);
        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        state.finish()
    }

    /// Runs `app` without a window for at most [`HEADLESS_FRAMES`] frames.
    ///
    /// The application is initialized headless against a backend that draws
    /// nothing; only `update` runs each frame.
    pub fn run_headless<A: Application>(app: A) -> Result<()> {
        run_headless_on(app, NullGfx::new(), HEADLESS_FRAMES)
    }
}

fn run_headless_on<A: Application>(app: A, gfx: GfxRef, frames: usize) -> Result<()> {
    log::info!("running headless for up to {frames} frames");
    let mut host = Host::headless(app, gfx)?;
    host.run_frames(frames)
}

/// Live window, backend and host. Fields drop in order so the host releases
/// its GPU resources before the backend goes away.
struct Active<A: Application> {
    host: Host<A>,
    gfx: Rc<WgpuGfx>,
    window: Arc<Window>,
}

struct RuntimeState<A: Application> {
    config: RuntimeConfig,
    gpu_init: GpuInit,
    app: Option<A>,
    active: Option<Active<A>>,
    failure: Option<anyhow::Error>,
}

impl<A: Application> RuntimeState<A> {
    fn new(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Self {
        Self { config, gpu_init, app: Some(app), active: None, failure: None }
    }

    fn start(&mut self, event_loop: &ActiveEventLoop, app: A) -> Result<Active<A>> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);
        let window = Arc::new(event_loop.create_window(attrs).context("failed to create window")?);

        let gpu = pollster::block_on(Gpu::new(window.clone(), self.gpu_init.clone()))
            .context("GPU initialization failed")?;
        let gfx = Rc::new(WgpuGfx::new(gpu));
        let gfx_ref: GfxRef = gfx.clone();

        let host = Host::new(app, gfx_ref, self.config.clear_color)?;
        window.request_redraw();

        Ok(Active { host, gfx, window })
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        self.failure.get_or_insert(err);
        self.shutdown(event_loop);
    }

    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        self.active = None;
        event_loop.exit();
    }

    fn finish(self) -> Result<()> {
        match self.failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// What the loop does after a window event.
enum After {
    Nothing,
    Exit,
    Fail(anyhow::Error),
}

impl<A: Application> ApplicationHandler for RuntimeState<A> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.active.is_some() {
            return;
        }
        let Some(app) = self.app.take() else {
            return;
        };

        match self.start(event_loop, app) {
            Ok(active) => self.active = Some(active),
            Err(err) => self.fail(event_loop, err),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        let Some(active) = self.active.as_mut() else {
            return;
        };
        if active.window.id() != window_id {
            return;
        }

        if let Some(input) = translate_window_event(active.window.scale_factor(), active.host.input(), &event) {
            active.host.event(&input);
        }

        let after = match &event {
            WindowEvent::CloseRequested => After::Exit,

            WindowEvent::Resized(size) => {
                active.gfx.resize(*size);
                active.window.request_redraw();
                After::Nothing
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                active.gfx.resize(active.window.inner_size());
                active.window.request_redraw();
                After::Nothing
            }

            WindowEvent::Occluded(false) => {
                active.host.reset_clock();
                After::Nothing
            }

            WindowEvent::RedrawRequested => {
                if active.gfx.is_lost() {
                    After::Fail(anyhow!("GPU device lost"))
                } else {
                    active.window.pre_present_notify();
                    match active.host.frame() {
                        Ok(LoopControl::Continue) => After::Nothing,
                        Ok(LoopControl::Break) => After::Exit,
                        Ok(LoopControl::BreakFailure) => {
                            After::Fail(anyhow!("application requested failure exit"))
                        }
                        Err(err) => After::Fail(err),
                    }
                }
            }

            _ => After::Nothing,
        };

        match after {
            After::Nothing => {}
            After::Exit => self.shutdown(event_loop),
            After::Fail(err) => self.fail(event_loop, err),
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(active) = &self.active {
            active.window.request_redraw();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::AppCtx;
    use crate::gfx::recording::{Call, RecordingGfx};
    use crate::input::InputState;
    use crate::render::Renderer;
    use crate::time::Time;
    use std::cell::Cell;

    #[derive(Default)]
    struct Counter {
        headless: Rc<Cell<bool>>,
        updates: Rc<Cell<usize>>,
        stop_after: Option<usize>,
    }

    impl Application for Counter {
        fn initialize(&mut self, ctx: &mut AppCtx<'_>) -> Result<()> {
            self.headless.set(ctx.is_headless());
            Ok(())
        }

        fn update(&mut self, _time: &Time, _input: &InputState) -> LoopControl {
            self.updates.set(self.updates.get() + 1);
            if self.stop_after == Some(self.updates.get()) {
                LoopControl::Break
            } else {
                LoopControl::Continue
            }
        }

        fn display(&mut self, _renderer: &mut dyn Renderer) -> Result<()> {
            anyhow::bail!("display is never called headless")
        }
    }

    #[test]
    fn headless_run_is_bounded_and_never_draws() {
        let app = Counter::default();
        let (headless, updates) = (app.headless.clone(), app.updates.clone());
        let rec = RecordingGfx::new();

        run_headless_on(app, rec.clone(), HEADLESS_FRAMES).unwrap();
        assert!(headless.get());
        assert_eq!(updates.get(), HEADLESS_FRAMES);
        assert_eq!(rec.count(|c| *c == Call::BeginPass), 0);
    }

    #[test]
    fn headless_run_on_the_null_backend_stops_at_break() {
        let app = Counter { stop_after: Some(3), ..Counter::default() };
        let updates = app.updates.clone();

        Runtime::run_headless(app).unwrap();
        assert_eq!(updates.get(), 3);
    }

    #[test]
    fn headless_initialize_failure_is_returned() {
        struct Failing;
        impl Application for Failing {
            fn initialize(&mut self, ctx: &mut AppCtx<'_>) -> Result<()> {
                anyhow::ensure!(!ctx.is_headless(), "needs a window");
                Ok(())
            }
            fn display(&mut self, _renderer: &mut dyn Renderer) -> Result<()> {
                Ok(())
            }
        }

        assert!(Runtime::run_headless(Failing).is_err());
    }
}
