//! Keyboard state tracking with both edge-triggered and level-triggered queries.
//!
//! - **Level-triggered (held):** `is_held(key)` is true every frame the key is
//!   down. Movement reads this.
//! - **Edge-triggered (just_pressed / just_released):** true only during the
//!   frame the transition happened, cleared by `end_frame()`.
//!
//! Keys also have stable lowercase names (`"space"`, `"left"`, ...) so the
//! lobby engine can match its configurable interaction key against them.

use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    Escape,
    Space,
    Enter,
    W,
    A,
    S,
    D,
    E,
}

impl Key {
    pub const ALL: &'static [Key] = &[
        Key::Left,
        Key::Right,
        Key::Up,
        Key::Down,
        Key::Escape,
        Key::Space,
        Key::Enter,
        Key::W,
        Key::A,
        Key::S,
        Key::D,
        Key::E,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Up => "up",
            Self::Down => "down",
            Self::Escape => "escape",
            Self::Space => "space",
            Self::Enter => "enter",
            Self::W => "w",
            Self::A => "a",
            Self::S => "s",
            Self::D => "d",
            Self::E => "e",
        }
    }

    /// Case-insensitive lookup by name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|key| key.name().eq_ignore_ascii_case(name))
    }
}

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

fn names_in(keys: &HashSet<Key>) -> Vec<&'static str> {
    Key::ALL
        .iter()
        .filter(|key| keys.contains(*key))
        .map(|key| key.name())
        .collect()
}

#[derive(Debug, Default)]
pub struct InputState {
    held: HashSet<Key>,
    just_pressed: HashSet<Key>,
    just_released: HashSet<Key>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key_down(&mut self, key: Key) {
        if self.held.insert(key) {
            self.just_pressed.insert(key);
        }
    }

    pub fn key_up(&mut self, key: Key) {
        if self.held.remove(&key) {
            self.just_released.insert(key);
        }
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    pub fn is_just_pressed(&self, key: Key) -> bool {
        self.just_pressed.contains(&key)
    }

    pub fn is_just_released(&self, key: Key) -> bool {
        self.just_released.contains(&key)
    }

    /// True when any of `keys` is held.
    pub fn any_held(&self, keys: &[Key]) -> bool {
        keys.iter().any(|key| self.held.contains(key))
    }

    /// Names of every held key, in `Key::ALL` order.
    pub fn held_names(&self) -> Vec<&'static str> {
        names_in(&self.held)
    }

    /// Names of keys that went down this frame, in `Key::ALL` order.
    pub fn just_pressed_names(&self) -> Vec<&'static str> {
        names_in(&self.just_pressed)
    }

    /// Forget everything, including held keys.
    pub fn clear(&mut self) {
        self.held.clear();
        self.just_pressed.clear();
        self.just_released.clear();
    }

    pub fn end_frame(&mut self) {
        self.just_pressed.clear();
        self.just_released.clear();
    }
}
