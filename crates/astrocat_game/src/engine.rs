//! Scene loop: poll input, update, render, repeat until asked to stop.
//!
//! The loop is plain sequential code. The exit flag is checked once at the top
//! of every iteration, so a quit event or exit request always lets the
//! current frame finish. Scenes see the engine through a [`SceneContext`],
//! which carries this frame's input, the backend if one is attached, and the
//! engine's exit flag. Without a backend the loop still runs: input is
//! empty, every frame advances by `1 / fps`, and rendering is skipped.

use astrocat_core::input::InputState;
use astrocat_core::time::FrameClock;
use thiserror::Error;

use crate::backend::{BackendEvent, RenderBackend};

#[derive(Debug, Error)]
#[error("scene '{scene}' requires a rendering backend but none is attached")]
pub struct MissingBackendError {
    pub scene: String,
}

/// What a scene can reach of the engine during one call.
pub struct SceneContext<'a> {
    input: &'a InputState,
    backend: Option<&'a mut dyn RenderBackend>,
    exit_requested: &'a mut bool,
}

impl<'a> SceneContext<'a> {
    pub fn input(&self) -> &InputState {
        self.input
    }

    pub fn has_backend(&self) -> bool {
        self.backend.is_some()
    }

    pub fn backend(&mut self) -> Option<&mut dyn RenderBackend> {
        match self.backend {
            Some(ref mut backend) => Some(&mut **backend),
            None => None,
        }
    }

    /// Stop the loop once the current frame finishes.
    /// Stop the next or current run at its next frame boundary.
    pub fn request_exit(&mut self) {
        *self.exit_requested = true;
    }
}

pub trait Scene {
    fn name(&self) -> &str;

    /// Scenes that only make sense with a live window return true.
    fn requires_backend(&self) -> bool {
        false
    }

    fn startup(&mut self, _ctx: &mut SceneContext<'_>) {}

    fn handle_input(&mut self, _ctx: &mut SceneContext<'_>) {}

    fn update(&mut self, dt: f64);

    fn render(&mut self, _ctx: &mut SceneContext<'_>) {}

    fn shutdown(&mut self) {}

    fn wants_exit(&self) -> bool {
        false
    }
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub fps: u32,
    /// Run backend-requiring scenes headless instead of failing.
    pub allow_headless: bool,
    /// Stop after this many frames.
    pub max_frames: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fps: 60,
            allow_headless: false,
            max_frames: None,
        }
    }
}

pub struct Engine {
    config: EngineConfig,
    backend: Option<Box<dyn RenderBackend>>,
    input: InputState,
    clock: FrameClock,
    exit_requested: bool,
    shutdown_hooks: Vec<Box<dyn FnOnce()>>,
}

impl Engine {
    /// A headless engine.
    pub fn new(config: EngineConfig) -> Self {
        let clock = FrameClock::new(config.fps);
        Self {
            config,
            backend: None,
            input: InputState::new(),
            clock,
            exit_requested: false,
            shutdown_hooks: Vec::new(),
        }
    }

    pub fn with_backend(config: EngineConfig, backend: Box<dyn RenderBackend>) -> Self {
        let mut engine = Self::new(config);
        engine.backend = Some(backend);
        engine
    }

    pub fn has_backend(&self) -> bool {
        self.backend.is_some()
    }

    #[allow(dead_code)]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[allow(dead_code)]
    pub fn input(&self) -> &InputState {
        &self.input
    }

    #[allow(dead_code)]
    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    /// Stop the next or current run at its next frame boundary.
    #[allow(dead_code)]
    pub fn request_exit(&mut self) {
        self.exit_requested = true;
    }

    /// Run `hook` once after the next `run` finishes, after the scene's own
    /// shutdown.
    pub fn add_shutdown_hook(&mut self, hook: impl FnOnce() + 'static) {
        self.shutdown_hooks.push(Box::new(hook));
    }

    /// Pump backend events into the input state and return the frame's dt.
    pub fn poll_input(&mut self) -> f64 {
        self.input.end_frame();
        let measured = match self.backend.as_mut() {
            Some(backend) => {
                for event in backend.poll_events() {
                    match event {
                        BackendEvent::Quit => {
                            log::info!("Quit requested, exiting.");
                            self.exit_requested = true;
                        }
                        BackendEvent::KeyDown(key) => self.input.key_down(key),
                        BackendEvent::KeyUp(key) => self.input.key_up(key),
                    }
                }
                Some(backend.tick(self.config.fps))
            }
            None => None,
        };
        self.clock.advance(measured)
    }

    /// Drive `scene` until an exit is requested. Returns the number of
    /// frames run.
    pub fn run(&mut self, scene: &mut dyn Scene) -> Result<u64, MissingBackendError> {
        if scene.requires_backend() && self.backend.is_none() {
            if !self.config.allow_headless {
                return Err(MissingBackendError {
                    scene: scene.name().to_string(),
                });
            }
            log::warn!(
                "Scene '{}' expects a rendering backend; running headless",
                scene.name()
            );
        }

        scene.startup(&mut self.context());
        log::info!(
            "Running scene '{}' at {} fps ({})",
            scene.name(),
            self.config.fps,
            if self.has_backend() { "backend" } else { "headless" }
        );

        let mut frames = 0u64;
        while !self.should_exit(scene, frames) {
            let dt = self.poll_input();
            scene.handle_input(&mut self.context());
            scene.update(dt);
            scene.render(&mut self.context());
            frames += 1;
        }

        scene.shutdown();
        for hook in self.shutdown_hooks.drain(..) {
            hook();
        }
        self.input.clear();
        self.exit_requested = false;
        log::info!(
            "Scene '{}' stopped after {} frames ({:.2}s simulated)",
            scene.name(),
            frames,
            self.clock.total_time
        );
        Ok(frames)
    }

    fn should_exit(&self, scene: &dyn Scene, frames: u64) -> bool {
        self.exit_requested
            || scene.wants_exit()
            || self.config.max_frames.is_some_and(|max| frames >= max)
    }

    fn context(&mut self) -> SceneContext<'_> {
        SceneContext {
            input: &self.input,
            backend: match self.backend {
                Some(ref mut backend) => Some(&mut **backend),
                None => None,
            },
            exit_requested: &mut self.exit_requested,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::testing::{DrawCommand, RecordingBackend};
    use crate::backend::{Color, Rect};
    use astrocat_core::input::Key;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    #[derive(Default)]
    struct ProbeScene {
        needs_backend: bool,
        exit_after: Option<u32>,
        started_with_backend: Option<bool>,
        updates: Vec<f64>,
        renders: u32,
        held_space: Vec<bool>,
        shutdowns: u32,
    }

    impl Scene for ProbeScene {
        fn name(&self) -> &str {
            "probe"
        }

        fn requires_backend(&self) -> bool {
            self.needs_backend
        }

        fn startup(&mut self, ctx: &mut SceneContext<'_>) {
            self.started_with_backend = Some(ctx.has_backend());
        }

        fn handle_input(&mut self, ctx: &mut SceneContext<'_>) {
            self.held_space.push(ctx.input().is_held(Key::Space));
            if ctx.input().is_just_pressed(Key::Escape) {
                ctx.request_exit();
            }
        }

        fn update(&mut self, dt: f64) {
            self.updates.push(dt);
        }

        fn render(&mut self, ctx: &mut SceneContext<'_>) {
            if let Some(backend) = ctx.backend() {
                self.renders += 1;
                backend.fill_rect(Rect::new(0.0, 0.0, 1.0, 1.0), Color(1, 2, 3));
                backend.present();
            }
        }

        fn shutdown(&mut self) {
            self.shutdowns += 1;
        }

        fn wants_exit(&self) -> bool {
            self.exit_after
                .is_some_and(|limit| self.updates.len() as u32 >= limit)
        }
    }

    #[test]
    fn headless_run_uses_fixed_time_step() {
        let mut engine = Engine::new(EngineConfig {
            fps: 30,
            allow_headless: false,
            max_frames: Some(5),
        });
        let mut scene = ProbeScene::default();

        let frames = engine.run(&mut scene).expect("headless scene should run");
        assert_eq!(frames, 5);
        assert_eq!(scene.updates.len(), 5);
        assert!(scene.updates.iter().all(|dt| (dt - 1.0 / 30.0).abs() < 1e-12));
        assert_eq!(scene.renders, 0);
        assert_eq!(scene.shutdowns, 1);
        assert_eq!(scene.started_with_backend, Some(false));
        assert_eq!(engine.clock().frame_count, 5);
    }

    #[test]
    fn scene_requiring_backend_fails_without_one() {
        let mut engine = Engine::new(EngineConfig::default());
        let mut scene = ProbeScene {
            needs_backend: true,
            ..ProbeScene::default()
        };

        let err = engine.run(&mut scene).expect_err("no backend attached");
        assert_eq!(err.scene, "probe");
        assert!(err.to_string().contains("requires a rendering backend"));
        assert_eq!(scene.started_with_backend, None, "startup never ran");
        assert_eq!(scene.shutdowns, 0);
    }

    #[test]
    fn scene_requiring_backend_runs_headless_when_allowed() {
        let mut engine = Engine::new(EngineConfig {
            allow_headless: true,
            max_frames: Some(3),
            ..EngineConfig::default()
        });
        let mut scene = ProbeScene {
            needs_backend: true,
            ..ProbeScene::default()
        };
        assert_eq!(engine.run(&mut scene).expect("allowed headless"), 3);
    }

    #[test]
    fn scene_exit_flag_stops_the_loop() {
        let mut engine = Engine::new(EngineConfig::default());
        let mut scene = ProbeScene {
            exit_after: Some(4),
            ..ProbeScene::default()
        };
        assert_eq!(engine.run(&mut scene).expect("run"), 4);
        assert_eq!(scene.shutdowns, 1);
    }

    #[test]
    fn backend_events_feed_input_and_quit_finishes_the_frame() {
        let backend = RecordingBackend::new(
            vec![
                vec![BackendEvent::KeyDown(Key::Space)],
                vec![],
                vec![BackendEvent::KeyUp(Key::Space), BackendEvent::Quit],
                vec![BackendEvent::KeyDown(Key::Space)],
            ],
            0.02,
        );
        let log = Rc::clone(&backend.log);
        let mut engine = Engine::with_backend(EngineConfig::default(), Box::new(backend));
        assert!(engine.has_backend());
        let mut scene = ProbeScene::default();

        let frames = engine.run(&mut scene).expect("run");
        assert_eq!(frames, 3, "quit is observed at the next iteration");
        assert_eq!(scene.held_space, vec![true, true, false]);
        assert!(scene.updates.iter().all(|dt| (dt - 0.02).abs() < 1e-12));
        assert_eq!(scene.renders, 3);
        assert_eq!(scene.started_with_backend, Some(true));

        let log = log.borrow();
        assert_eq!(log.ticks, 3);
        let presents = log
            .commands
            .iter()
            .filter(|c| **c == DrawCommand::Present)
            .count();
        assert_eq!(presents, 3);
    }

    #[test]
    fn shutdown_hooks_run_once_after_scene_shutdown() {
        let order = Rc::new(RefCell::new(Vec::new()));
        let calls = Rc::new(Cell::new(0));

        let mut engine = Engine::new(EngineConfig {
            max_frames: Some(1),
            ..EngineConfig::default()
        });
        {
            let order = Rc::clone(&order);
            let calls = Rc::clone(&calls);
            engine.add_shutdown_hook(move || {
                calls.set(calls.get() + 1);
                order.borrow_mut().push("hook");
            });
        }

        let mut scene = ProbeScene::default();
        engine.run(&mut scene).expect("first run");
        assert_eq!(scene.shutdowns, 1);
        assert_eq!(calls.get(), 1);

        engine.run(&mut scene).expect("second run");
        assert_eq!(calls.get(), 1, "hooks are consumed");
        assert_eq!(*order.borrow(), vec!["hook"]);
    }

    #[test]
    fn request_exit_before_run_stops_it_at_the_first_check() {
        let mut engine = Engine::new(EngineConfig {
            max_frames: Some(5),
            ..EngineConfig::default()
        });
        engine.request_exit();
        let mut scene = ProbeScene::default();
        assert_eq!(engine.run(&mut scene).expect("run"), 0);
        assert_eq!(scene.started_with_backend, Some(false));
        assert_eq!(scene.shutdowns, 1);

        assert_eq!(engine.run(&mut scene).expect("second run"), 5, "request is consumed");
    }

    #[test]
    fn scene_exit_request_through_context_finishes_the_frame() {
        let backend = RecordingBackend::new(
            vec![vec![], vec![BackendEvent::KeyDown(Key::Escape)], vec![]],
            1.0 / 60.0,
        );
        let mut engine = Engine::with_backend(EngineConfig::default(), Box::new(backend));
        let mut scene = ProbeScene::default();

        assert_eq!(engine.run(&mut scene).expect("run"), 2);
        assert_eq!(scene.updates.len(), 2, "the requesting frame still updates");
        assert_eq!(scene.renders, 2);
    }
}
