use anyhow::{bail, Context, Result};

use crate::camera::Camera;
use crate::gfx::GfxRef;
use crate::input::{InputEvent, InputState};
use crate::loader::Loader;
use crate::profile::{Profile, ProfileRecord, RECORD_LEN};
use crate::render::{DefaultPass, Renderer};
use crate::time::{FrameClock, TimeControl};

use super::{make_camera, make_renderer, AppCtx, Application, LoopControl};

#[derive(Default)]
struct FrameProfiles {
    update: ProfileRecord,
    display: ProfileRecord,
    frame: ProfileRecord,
}

impl FrameProfiles {
    fn log(&self) {
        for (name, record) in [("update", &self.update), ("display", &self.display), ("frame", &self.frame)] {
            let s = record.stats();
            log::debug!("{name}: min {:.3} ms, mean {:.3} ms, max {:.3} ms", s.min, s.mean, s.max);
        }
    }
}

/// Renderer and camera; absent when headless.
struct View {
    renderer: Box<dyn Renderer>,
    camera: Box<dyn Camera>,
}

/// Drives one application against one backend.
///
/// Fields drop in declaration order: everything holding GPU resources goes
/// before the last `gfx` handle.
pub(crate) struct Host<A: Application> {
    app: A,
    view: Option<View>,
    loader: Loader,
    gfx: GfxRef,

    input: InputState,
    clock: FrameClock,
    time: TimeControl,
    profiles: FrameProfiles,
    frame: u64,
}

impl<A: Application> Host<A> {
    /// Builds the engine subsystems and initializes `app`.
    pub(crate) fn new(app: A, gfx: GfxRef, clear_color: [f32; 4]) -> Result<Self> {
        let renderer = make_renderer(gfx.clone(), clear_color).context("failed to create renderer")?;
        Self::with_view(app, gfx, Some(View { renderer, camera: make_camera() }))
    }

    /// Initializes `app` without renderer or camera. Frames only update.
    pub(crate) fn headless(app: A, gfx: GfxRef) -> Result<Self> {
        Self::with_view(app, gfx, None)
    }

    fn with_view(mut app: A, gfx: GfxRef, view: Option<View>) -> Result<Self> {
        let mut loader = Loader::new(gfx.clone())?;

        app.initialize(&mut AppCtx::new(&gfx, &mut loader, view.is_none()))
            .context("application initialization failed")?;

        let mut input = InputState::new(false);
        input.begin_frame(0);

        Ok(Self {
            app,
            view,
            loader,
            gfx,
            input,
            clock: FrameClock::new(),
            time: TimeControl::default(),
            profiles: FrameProfiles::default(),
            frame: 0,
        })
    }

    /// Updates input state, then offers the event to the application, the
    /// renderer and the camera, stopping at the first that consumes it.
    pub(crate) fn event(&mut self, event: &InputEvent) -> bool {
        self.input.apply(event);
        self.app.event(event)
            || self.view.as_mut().is_some_and(|v| v.renderer.event(event) || v.camera.event(event))
    }

    pub(crate) fn input(&self) -> &InputState {
        &self.input
    }

    /// Restarts frame timing, e.g. after the window was hidden.
    pub(crate) fn reset_clock(&mut self) {
        self.clock.reset();
    }

    /// Runs one frame: update, then display inside the default pass.
    pub(crate) fn frame(&mut self) -> Result<LoopControl> {
        let frame_profile = Profile::new(&mut self.profiles.frame);

        let ft = self.clock.tick();
        self.loader.poll();
        let time = self.time.update(ft.dt);

        let control = {
            let _profile = Profile::new(&mut self.profiles.update);
            if let Some(view) = self.view.as_mut() {
                view.camera.update(&time);
            }
            self.app.update(&time, &self.input)
        };

        if control == LoopControl::Continue
            && let Some(view) = self.view.as_mut()
        {
            let _profile = Profile::new(&mut self.profiles.display);
            let camera_view = *view.camera.camera_view();
            let mut pass = DefaultPass::new(view.renderer.as_mut(), &camera_view);
            self.app.display(&mut *pass).context("display failed")?;
        }
        drop(frame_profile);

        // Events arriving before the next redraw belong to the next frame.
        self.frame += 1;
        self.input.begin_frame(self.frame);

        if self.frame % RECORD_LEN as u64 == 0 {
            log::debug!("frame {} on {:?}", self.frame, self.gfx.framebuffer_size());
            self.profiles.log();
        }

        Ok(control)
    }

    /// Runs at most `max_frames` frames, stopping early when the
    /// application breaks.
    pub(crate) fn run_frames(&mut self, max_frames: usize) -> Result<()> {
        for _ in 0..max_frames {
            match self.frame()? {
                LoopControl::Continue => {}
                LoopControl::Break => return Ok(()),
                LoopControl::BreakFailure => bail!("application requested failure exit"),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::recording::{Call, RecordingGfx};
    use crate::input::{ButtonState, Key, Modifiers};
    use crate::render::{Color, Shape};
    use crate::time::Time;
    use glam::Mat4;
    use std::rc::Rc;

    #[derive(Default)]
    struct Script {
        initialized: bool,
        headless: bool,
        updates: usize,
        displays: usize,
        consume_events: bool,
        seen_events: usize,
        control: LoopControl,
        fail_display: bool,
        escape_released: Vec<bool>,
    }

    impl Application for Script {
        fn initialize(&mut self, ctx: &mut AppCtx<'_>) -> Result<()> {
            assert_eq!(ctx.framebuffer_size(), (1280, 720));
            self.initialized = true;
            self.headless = ctx.is_headless();
            Ok(())
        }

        fn update(&mut self, _time: &Time, input: &InputState) -> LoopControl {
            self.updates += 1;
            self.escape_released.push(input.keyboard.released(Key::Escape));
            self.control
        }

        fn display(&mut self, renderer: &mut dyn Renderer) -> Result<()> {
            self.displays += 1;
            renderer.draw_shape(Mat4::IDENTITY, Shape::Cube, Color::RED)?;
            anyhow::ensure!(!self.fail_display, "display failed on purpose");
            Ok(())
        }

        fn event(&mut self, _event: &InputEvent) -> bool {
            self.seen_events += 1;
            self.consume_events
        }
    }

    fn host(app: Script) -> (Rc<RecordingGfx>, Host<Script>) {
        let rec = RecordingGfx::new();
        let gfx: GfxRef = rec.clone();
        let host = Host::new(app, gfx, [0.1, 0.1, 0.1, 1.0]).unwrap();
        (rec, host)
    }

    fn camera_eye(host: &Host<Script>) -> glam::Vec3 {
        host.view.as_ref().unwrap().camera.camera_view().eye
    }

    fn escape(state: ButtonState) -> InputEvent {
        InputEvent::Key { key: Key::Escape, state, modifiers: Modifiers::default(), repeat: false }
    }

    #[test]
    fn frame_updates_then_displays_inside_a_pass() {
        let (rec, mut host) = host(Script::default());
        assert!(host.app.initialized);
        rec.clear_calls();

        assert_eq!(host.frame().unwrap(), LoopControl::Continue);
        assert_eq!(host.app.updates, 1);
        assert_eq!(host.app.displays, 1);

        let calls = rec.calls();
        assert_eq!(calls.first(), Some(&Call::BeginPass));
        assert_eq!(&calls[calls.len() - 2..], &[Call::EndPass, Call::Commit]);
        assert_eq!(rec.count(|c| matches!(c, Call::Draw { .. })), 1);
    }

    #[test]
    fn break_skips_display() {
        let (rec, mut host) = host(Script { control: LoopControl::Break, ..Script::default() });
        rec.clear_calls();

        assert_eq!(host.frame().unwrap(), LoopControl::Break);
        assert_eq!(host.app.displays, 0);
        assert_eq!(rec.count(|c| *c == Call::BeginPass), 0);
    }

    #[test]
    fn display_error_still_closes_the_pass() {
        let (rec, mut host) = host(Script { fail_display: true, ..Script::default() });
        rec.clear_calls();

        assert!(host.frame().is_err());
        assert_eq!(rec.count(|c| *c == Call::EndPass), 1);
        assert_eq!(rec.count(|c| *c == Call::Commit), 1);
    }

    #[test]
    fn consumed_event_stops_dispatch() {
        let (_rec, mut host) = host(Script { consume_events: true, ..Script::default() });
        let wheel = InputEvent::Wheel {
            delta: crate::input::WheelDelta::Lines(3.0),
            modifiers: Modifiers::default(),
        };
        let before = camera_eye(&host);

        assert!(host.event(&wheel));
        assert_eq!(host.app.seen_events, 1);
        assert_eq!(camera_eye(&host), before);
    }

    #[test]
    fn unconsumed_wheel_reaches_the_camera() {
        let (_rec, mut host) = host(Script::default());
        let wheel = InputEvent::Wheel {
            delta: crate::input::WheelDelta::Lines(3.0),
            modifiers: Modifiers::default(),
        };
        let before = camera_eye(&host);

        assert!(host.event(&wheel));
        assert_ne!(camera_eye(&host), before);
    }

    #[test]
    fn release_between_frames_is_seen_by_next_update_only() {
        let (_rec, mut host) = host(Script::default());
        host.frame().unwrap();

        host.event(&escape(ButtonState::Pressed));
        host.event(&escape(ButtonState::Released));
        host.frame().unwrap();
        host.frame().unwrap();

        assert_eq!(host.app.escape_released, vec![false, true, false]);
    }

    #[test]
    fn initialize_failure_is_reported() {
        struct Failing;
        impl Application for Failing {
            fn initialize(&mut self, _ctx: &mut AppCtx<'_>) -> Result<()> {
                anyhow::bail!("no assets")
            }
            fn display(&mut self, _renderer: &mut dyn Renderer) -> Result<()> {
                Ok(())
            }
        }

        let gfx: GfxRef = RecordingGfx::new();
        assert!(Host::new(Failing, gfx, [0.0; 4]).is_err());
    }

    #[test]
    fn dropping_the_host_releases_engine_resources() {
        let (rec, host) = host(Script::default());
        drop(host);
        assert_eq!(rec.live_buffers(), 0);
        assert_eq!(rec.live_pipelines(), 0);
    }

    fn headless_host(app: Script) -> (Rc<RecordingGfx>, Host<Script>) {
        let rec = RecordingGfx::new();
        let gfx: GfxRef = rec.clone();
        let host = Host::headless(app, gfx).unwrap();
        (rec, host)
    }

    #[test]
    fn windowed_initialize_is_not_headless() {
        let (_rec, host) = host(Script::default());
        assert!(!host.app.headless);
    }

    #[test]
    fn headless_frames_update_without_drawing() {
        let (rec, mut host) = headless_host(Script::default());
        assert!(host.app.initialized);
        assert!(host.app.headless);
        assert_eq!(rec.live_pipelines(), 0);

        host.run_frames(10).unwrap();
        assert_eq!(host.app.updates, 10);
        assert_eq!(host.app.displays, 0);
        assert_eq!(rec.count(|c| *c == Call::BeginPass), 0);
        assert_eq!(rec.count(|c| *c == Call::Commit), 0);
    }

    #[test]
    fn run_frames_stops_when_the_app_breaks() {
        let (_rec, mut host) = headless_host(Script { control: LoopControl::Break, ..Script::default() });
        host.run_frames(10).unwrap();
        assert_eq!(host.app.updates, 1);
    }

    #[test]
    fn run_frames_reports_break_failure() {
        let (_rec, mut host) = headless_host(Script { control: LoopControl::BreakFailure, ..Script::default() });
        assert!(host.run_frames(10).is_err());
        assert_eq!(host.app.updates, 1);
    }

    #[test]
    fn headless_events_stop_at_the_app() {
        let (_rec, mut host) = headless_host(Script::default());
        let wheel = InputEvent::Wheel {
            delta: crate::input::WheelDelta::Lines(3.0),
            modifiers: Modifiers::default(),
        };

        assert!(!host.event(&wheel));
        assert_eq!(host.app.seen_events, 1);
    }
}
