//! Top-down lobby scene driving the interaction engine from the loop.
//!
//! Held arrow/WASD keys set a walking direction; the move is applied in
//! `update` so it scales with the frame time. Interactions see only the keys
//! that went down this frame, so holding the interaction key fires a
//! repeatable interaction once per press rather than once per frame.

use astrocat_core::input::{InputState, Key};
use astrocat_core::lobby::{Interaction, InteractionEngine, LobbyObject, PlayerState};
use glam::Vec2;

use crate::backend::{Color, Rect};
use crate::engine::{Scene, SceneContext};

pub const FLOOR_COLOR: Color = Color(30, 20, 50);
pub const BLOCKING_COLOR: Color = Color(120, 120, 140);
pub const OBJECT_COLOR: Color = Color(230, 170, 60);
pub const AVATAR_COLOR: Color = Color(240, 240, 255);
pub const LOBBY_MOVE_SPEED: f32 = 180.0;

const WALK_UP: &[Key] = &[Key::Up, Key::W];
const WALK_DOWN: &[Key] = &[Key::Down, Key::S];
const WALK_LEFT: &[Key] = &[Key::Left, Key::A];
const WALK_RIGHT: &[Key] = &[Key::Right, Key::D];

pub struct LobbyScene {
    engine: InteractionEngine,
    pub move_speed: f32,
    direction: Vec2,
    prompt: Option<String>,
    fired: Vec<String>,
}

impl LobbyScene {
    pub fn new(engine: InteractionEngine) -> Self {
        Self {
            engine,
            move_speed: LOBBY_MOVE_SPEED,
            direction: Vec2::ZERO,
            prompt: None,
            fired: Vec::new(),
        }
    }

    pub fn engine(&self) -> &InteractionEngine {
        &self.engine
    }

    /// Identifiers of every object whose interaction fired, oldest first.
    pub fn fired(&self) -> &[String] {
        &self.fired
    }

    /// Prompt for the interaction the player is standing on, if any.
    #[allow(dead_code)]
    pub fn prompt(&self) -> Option<&str> {
        self.prompt.as_deref()
    }

    fn walk_direction(input: &InputState) -> Vec2 {
        let axis = |negative: &[Key], positive: &[Key]| {
            f32::from(u8::from(input.any_held(positive))) - f32::from(u8::from(input.any_held(negative)))
        };
        Vec2::new(axis(WALK_LEFT, WALK_RIGHT), axis(WALK_UP, WALK_DOWN))
    }

    fn rect_of(position: Vec2, size: Vec2) -> Rect {
        Rect::new(position.x, position.y, size.x, size.y)
    }
}

impl Scene for LobbyScene {
    fn name(&self) -> &str {
        "lobby"
    }

    fn handle_input(&mut self, ctx: &mut SceneContext<'_>) {
        if ctx.input().is_just_pressed(Key::Escape) {
            ctx.request_exit();
        }
        let input = ctx.input();
        self.direction = Self::walk_direction(input);

        let fired = self.engine.handle_input(input.just_pressed_names());
        for identifier in &fired {
            log::info!("Interacted with '{identifier}'");
        }
        self.fired.extend(fired);
    }

    fn update(&mut self, dt: f64) {
        let delta = self.direction * self.move_speed * dt as f32;
        if delta != Vec2::ZERO && !self.engine.move_player(delta.x, delta.y) {
            // Slide along whichever axis is still open.
            self.engine.move_player(delta.x, 0.0);
            self.engine.move_player(0.0, delta.y);
        }
        self.prompt = self.engine.prompt_for_colliding().map(str::to_string);
    }

    fn render(&mut self, ctx: &mut SceneContext<'_>) {
        let Some(backend) = ctx.backend() else {
            return;
        };

        backend.clear(FLOOR_COLOR);
        for object in self.engine.objects() {
            let color = if object.blocking {
                BLOCKING_COLOR
            } else {
                OBJECT_COLOR
            };
            backend.fill_rect(Self::rect_of(object.position, object.size), color);
        }
        let player = self.engine.player();
        backend.fill_rect(Self::rect_of(player.position, player.size), AVATAR_COLOR);
        if let Some(prompt) = &self.prompt {
            backend.draw_text(prompt, Vec2::new(20.0, 560.0), AVATAR_COLOR);
        }
        backend.present();
    }
}

fn announce(message: &'static str) -> Interaction {
    Interaction::new(move |_, object| log::info!("{}: {message}", object.identifier))
}

/// The lobby: a console and a trophy case to poke at, a one-time poster and
/// walls around the room.
pub fn create_default_lobby() -> LobbyScene {
    let objects = vec![
        LobbyObject::new("north_wall", Vec2::new(0.0, 0.0), Vec2::new(800.0, 16.0)).blocking(),
        LobbyObject::new("south_wall", Vec2::new(0.0, 584.0), Vec2::new(800.0, 16.0)).blocking(),
        LobbyObject::new("west_wall", Vec2::new(0.0, 16.0), Vec2::new(16.0, 568.0)).blocking(),
        LobbyObject::new("east_wall", Vec2::new(784.0, 16.0), Vec2::new(16.0, 568.0)).blocking(),
        LobbyObject::new("console", Vec2::new(360.0, 80.0), Vec2::new(80.0, 48.0))
            .blocking()
            .with_interaction(
                announce("Mission log is up to date.").with_prompt("Press space to use the console"),
            ),
        LobbyObject::new("trophy", Vec2::new(600.0, 300.0), Vec2::new(48.0, 48.0)).with_interaction(
            announce("Best Mouser, three years running.").with_prompt("Press space to admire the trophy"),
        ),
        LobbyObject::new("poster", Vec2::new(120.0, 300.0), Vec2::new(64.0, 32.0)).with_interaction(
            announce("You peel the recruitment poster off the wall.")
                .with_prompt("Press space to take the poster")
                .fire_once(),
        ),
    ];
    let player = PlayerState::new(Vec2::new(384.0, 400.0), Vec2::new(32.0, 32.0));
    LobbyScene::new(InteractionEngine::new(objects, player))
}
