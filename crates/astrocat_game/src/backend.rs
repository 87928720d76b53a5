//! Rendering/input backend capability.
//!
//! The engine owns an `Option<Box<dyn RenderBackend>>`. When it is `None` the
//! game runs headless: no events, fixed frame time, and every draw call is
//! skipped by the scene.
//!
//! No live backend ships with this crate. The binary always runs headless and
//! the only implementation is the recording backend used by tests, so
//! `BackendEvent` is constructed nowhere outside them. A windowed backend
//! would wrap a winit event loop and translate its keyboard events into
//! `BackendEvent`s.

use astrocat_core::input::Key;
use astrocat_core::sprite_sheet::{SpriteFrame, SpriteSheet};
use glam::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color(pub u8, pub u8, pub u8);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(dead_code)]
pub enum BackendEvent {
    Quit,
    KeyDown(Key),
    KeyUp(Key),
}

pub trait RenderBackend {
    /// Drain pending window and keyboard events.
    fn poll_events(&mut self) -> Vec<BackendEvent>;

    /// Wait for the next frame at `fps` and return the elapsed seconds.
    fn tick(&mut self, fps: u32) -> f64;

    fn clear(&mut self, color: Color);

    fn fill_rect(&mut self, rect: Rect, color: Color);

    fn draw_text(&mut self, text: &str, position: Vec2, color: Color);

    /// Blit one frame of a sprite sheet. Backends without image support get a
    /// solid placeholder.
    fn draw_sprite(&mut self, _sheet: &SpriteSheet, _frame: &SpriteFrame, dest: Rect, tint: Color) {
        self.fill_rect(dest, tint);
    }

    fn present(&mut self);
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    #[derive(Debug, Clone, PartialEq)]
    pub enum DrawCommand {
        Clear(Color),
        FillRect(Rect, Color),
        Text(String),
        Sprite(usize, Rect),
        Present,
    }

    /// Shared log so tests can inspect a backend after handing it to the engine.
    #[derive(Debug, Default)]
    pub struct BackendLog {
        pub commands: Vec<DrawCommand>,
        pub ticks: u32,
    }

    /// Backend that replays scripted events per frame and records draw calls.
    pub struct RecordingBackend {
        pub frames: VecDeque<Vec<BackendEvent>>,
        pub frame_time: f64,
        pub log: Rc<RefCell<BackendLog>>,
    }

    impl RecordingBackend {
        pub fn new(frames: Vec<Vec<BackendEvent>>, frame_time: f64) -> Self {
            Self {
                frames: frames.into(),
                frame_time,
                log: Rc::new(RefCell::new(BackendLog::default())),
            }
        }
    }

    impl RenderBackend for RecordingBackend {
        fn poll_events(&mut self) -> Vec<BackendEvent> {
            self.frames.pop_front().unwrap_or_default()
        }

        fn tick(&mut self, _fps: u32) -> f64 {
            self.log.borrow_mut().ticks += 1;
            self.frame_time
        }

        fn clear(&mut self, color: Color) {
            self.log.borrow_mut().commands.push(DrawCommand::Clear(color));
        }

        fn fill_rect(&mut self, rect: Rect, color: Color) {
            self.log
                .borrow_mut()
                .commands
                .push(DrawCommand::FillRect(rect, color));
        }

        fn draw_text(&mut self, text: &str, _position: Vec2, _color: Color) {
            self.log
                .borrow_mut()
                .commands
                .push(DrawCommand::Text(text.to_string()));
        }

        fn draw_sprite(&mut self, _sheet: &SpriteSheet, frame: &SpriteFrame, dest: Rect, _tint: Color) {
            self.log
                .borrow_mut()
                .commands
                .push(DrawCommand::Sprite(frame.index, dest));
        }

        fn present(&mut self) {
            self.log.borrow_mut().commands.push(DrawCommand::Present);
        }
    }
}
