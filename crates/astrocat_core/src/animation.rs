//! Deterministic playback of loaded sprite animations.
//!
//! Manifests store `frame_duration` in seconds for readability. Playback
//! converts that once to integer microseconds so advancing an animation under
//! the fixed-step loop never accumulates floating-point drift.

use crate::sprite_sheet::{LoadedAnimation, SpriteFrame};

impl LoadedAnimation {
    /// Duration of each frame in microseconds, never zero.
    pub fn frame_duration_us(&self) -> u64 {
        ((self.frame_duration * 1_000_000.0).round() as u64).max(1)
    }

    /// Total duration of one full cycle in microseconds.
    pub fn total_duration_us(&self) -> u64 {
        self.frame_duration_us() * self.frames.len() as u64
    }
}

/// Runtime state for one active animation instance.
#[derive(Debug, Clone)]
pub struct AnimationState {
    pub animation: String,
    pub frame_index: usize,
    pub elapsed_us: u64,
    pub finished: bool,
}

impl AnimationState {
    pub fn new(animation: &str) -> Self {
        Self {
            animation: animation.to_string(),
            frame_index: 0,
            elapsed_us: 0,
            finished: false,
        }
    }

    /// Restart from the first frame.
    pub fn reset(&mut self) {
        self.frame_index = 0;
        self.elapsed_us = 0;
        self.finished = false;
    }

    /// Advance by `dt_us` microseconds and return the frame to draw.
    ///
    /// Returns `None` only for an animation with no frames, which the loader
    /// never produces.
    pub fn tick<'a>(&mut self, dt_us: u64, animation: &'a LoadedAnimation) -> Option<&'a SpriteFrame> {
        if animation.frames.is_empty() {
            return None;
        }
        if self.finished {
            return animation
                .frames
                .get(self.frame_index)
                .or_else(|| animation.frames.last());
        }

        let frame_us = animation.frame_duration_us();
        self.elapsed_us += dt_us;

        while self.elapsed_us >= frame_us {
            self.elapsed_us -= frame_us;
            self.frame_index += 1;

            if self.frame_index >= animation.frames.len() {
                if animation.looping {
                    self.frame_index = 0;
                } else {
                    self.frame_index = animation.frames.len() - 1;
                    self.elapsed_us = 0;
                    self.finished = true;
                    break;
                }
            }
        }

        animation.frames.get(self.frame_index)
    }
}
