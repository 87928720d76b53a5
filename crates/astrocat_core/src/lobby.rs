//! Lobby interaction engine: player movement against blocking objects and
//! keypress-while-overlapping interactions.
//!
//! Movement is all-or-nothing. A move whose projected hitbox overlaps any
//! blocking object is rejected outright and the player is left untouched;
//! there is no sliding along walls here (the platformer scene handles its own
//! physics).
//!
//! Each [`Interaction`] owns its one-shot state. An interaction built with
//! [`Interaction::fire_once`] moves from `Armed` to `Spent` the first time it
//! fires and never fires again.

use glam::Vec2;
use std::collections::HashSet;
use std::fmt;

use crate::geometry::Hitbox;

pub const DEFAULT_INTERACTION_KEY: &str = "space";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Facing {
    Up,
    #[default]
    Down,
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerState {
    pub position: Vec2,
    pub size: Vec2,
    pub facing: Facing,
}

impl PlayerState {
    pub fn new(position: Vec2, size: Vec2) -> Self {
        Self {
            position,
            size,
            facing: Facing::default(),
        }
    }

    pub fn hitbox(&self) -> Hitbox {
        Hitbox::from_position_size(self.position, self.size)
    }

    /// The hitbox the player would occupy after moving by `(dx, dy)`.
    pub fn offset_hitbox(&self, dx: f32, dy: f32) -> Hitbox {
        Hitbox::from_position_size(self.position + Vec2::new(dx, dy), self.size)
    }

    /// Apply a move and update facing. The dominant axis wins; ties go to
    /// the vertical axis.
    pub fn move_by(&mut self, dx: f32, dy: f32) {
        self.position += Vec2::new(dx, dy);
        if dx == 0.0 && dy == 0.0 {
            return;
        }
        if dx.abs() > dy.abs() {
            self.facing = if dx > 0.0 { Facing::Right } else { Facing::Left };
        } else if dy != 0.0 {
            self.facing = if dy > 0.0 { Facing::Down } else { Facing::Up };
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionState {
    Armed,
    Spent,
}

pub type InteractionCallback = Box<dyn FnMut(&PlayerState, &LobbyObject)>;

pub struct Interaction {
    callback: InteractionCallback,
    pub prompt: Option<String>,
    once: bool,
    state: InteractionState,
    fire_count: u32,
}

impl Interaction {
    pub fn new(callback: impl FnMut(&PlayerState, &LobbyObject) + 'static) -> Self {
        Self {
            callback: Box::new(callback),
            prompt: None,
            once: false,
            state: InteractionState::Armed,
            fire_count: 0,
        }
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    /// Make this interaction one-shot.
    pub fn fire_once(mut self) -> Self {
        self.once = true;
        self
    }

    pub fn is_once(&self) -> bool {
        self.once
    }

    pub fn state(&self) -> InteractionState {
        self.state
    }

    pub fn fire_count(&self) -> u32 {
        self.fire_count
    }

    pub fn can_trigger(&self) -> bool {
        self.state == InteractionState::Armed
    }

    /// Invoke the callback if still armed. Returns whether it fired.
    pub fn trigger(&mut self, player: &PlayerState, object: &LobbyObject) -> bool {
        if !self.can_trigger() {
            return false;
        }
        (self.callback)(player, object);
        self.fire_count += 1;
        if self.once {
            self.state = InteractionState::Spent;
        }
        true
    }
}

impl fmt::Debug for Interaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interaction")
            .field("prompt", &self.prompt)
            .field("once", &self.once)
            .field("state", &self.state)
            .field("fire_count", &self.fire_count)
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
pub struct LobbyObject {
    pub identifier: String,
    pub position: Vec2,
    pub size: Vec2,
    /// Detached while its own callback runs.
    pub interaction: Option<Interaction>,
    pub blocking: bool,
}

impl LobbyObject {
    pub fn new(identifier: impl Into<String>, position: Vec2, size: Vec2) -> Self {
        Self {
            identifier: identifier.into(),
            position,
            size,
            interaction: None,
            blocking: false,
        }
    }

    pub fn blocking(mut self) -> Self {
        self.blocking = true;
        self
    }

    pub fn with_interaction(mut self, interaction: Interaction) -> Self {
        self.interaction = Some(interaction);
        self
    }

    pub fn hitbox(&self) -> Hitbox {
        Hitbox::from_position_size(self.position, self.size)
    }

    pub fn collides_with(&self, player: &PlayerState) -> bool {
        self.hitbox().overlaps(&player.hitbox())
    }

    pub fn would_collide(&self, hitbox: &Hitbox) -> bool {
        self.hitbox().overlaps(hitbox)
    }
}

pub struct InteractionEngine {
    objects: Vec<LobbyObject>,
    player: PlayerState,
    interaction_key: String,
}

impl InteractionEngine {
    pub fn new(objects: Vec<LobbyObject>, player: PlayerState) -> Self {
        Self {
            objects,
            player,
            interaction_key: DEFAULT_INTERACTION_KEY.to_string(),
        }
    }

    pub fn with_interaction_key(mut self, key: impl Into<String>) -> Self {
        self.set_interaction_key(key);
        self
    }

    pub fn set_interaction_key(&mut self, key: impl Into<String>) {
        self.interaction_key = key.into();
    }

    pub fn interaction_key(&self) -> &str {
        &self.interaction_key
    }

    pub fn objects(&self) -> &[LobbyObject] {
        &self.objects
    }

    pub fn add_object(&mut self, object: LobbyObject) {
        self.objects.push(object);
    }

    pub fn player(&self) -> &PlayerState {
        &self.player
    }

    /// Try to move the player. Rejected moves leave the player untouched.
    pub fn move_player(&mut self, dx: f32, dy: f32) -> bool {
        if dx == 0.0 && dy == 0.0 {
            return false;
        }
        let projected = self.player.offset_hitbox(dx, dy);
        if let Some(blocker) = self
            .objects
            .iter()
            .find(|object| object.blocking && object.would_collide(&projected))
        {
            log::debug!("Move ({dx}, {dy}) blocked by '{}'", blocker.identifier);
            return false;
        }
        self.player.move_by(dx, dy);
        true
    }

    /// Every object, blocking or not, overlapping the player right now.
    pub fn colliding_objects(&self) -> Vec<&LobbyObject> {
        self.objects
            .iter()
            .filter(|object| object.collides_with(&self.player))
            .collect()
    }

    /// Prompt of the first overlapping interaction that can still fire.
    pub fn prompt_for_colliding(&self) -> Option<&str> {
        self.objects
            .iter()
            .filter(|object| object.collides_with(&self.player))
            .filter_map(|object| object.interaction.as_ref())
            .filter(|interaction| interaction.can_trigger())
            .find_map(|interaction| interaction.prompt.as_deref())
    }

    /// Fire overlapping interactions if the interaction key is pressed.
    /// Returns the identifiers of the objects whose interaction fired.
    pub fn handle_input<I, S>(&mut self, pressed_keys: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let pressed: HashSet<String> = pressed_keys
            .into_iter()
            .map(|key| key.as_ref().to_lowercase())
            .collect();
        if !pressed.contains(&self.interaction_key.to_lowercase()) {
            return Vec::new();
        }

        let player = &self.player;
        let mut fired = Vec::new();
        for object in self.objects.iter_mut() {
            if !object.collides_with(player) {
                continue;
            }
            let Some(mut interaction) = object.interaction.take() else {
                continue;
            };
            if interaction.trigger(player, object) {
                log::debug!("Interaction '{}' fired", object.identifier);
                fired.push(object.identifier.clone());
            }
            object.interaction = Some(interaction);
        }
        fired
    }
}
