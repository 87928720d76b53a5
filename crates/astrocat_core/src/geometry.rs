//! Axis-aligned hitboxes shared by the lobby engine and the scene code.
//!
//! Coordinates are screen-style: `top` is the smaller y value, `bottom` the
//! larger one. A hitbox is always derived from a position and a size and is
//! never edited in place.

use glam::Vec2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hitbox {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Hitbox {
    /// Build the hitbox occupied by something at `position` with `size`.
    pub fn from_position_size(position: Vec2, size: Vec2) -> Self {
        Self {
            left: position.x,
            top: position.y,
            right: position.x + size.x,
            bottom: position.y + size.y,
        }
    }

    /// Strict overlap test. Boxes that only share an edge do not overlap.
    pub fn overlaps(&self, other: &Hitbox) -> bool {
        !(self.right <= other.left
            || other.right <= self.left
            || self.bottom <= other.top
            || other.bottom <= self.top)
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }
}
