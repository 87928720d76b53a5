//! Side-scrolling platformer scene.
//!
//! The level is a character grid where `#` marks a solid tile. Physics is
//! deliberately simple: gravity is integrated into vertical velocity, velocity
//! into position, then the player is clamped to the map. Horizontally the
//! clamp keeps the player inside the map columns; vertically the lower tile
//! boundary acts as the floor and is the only thing that grounds the player.
//! Solid tiles are drawn but do not collide.

use astrocat_core::animation::AnimationState;
use astrocat_core::input::{InputState, Key};
use astrocat_core::sprite_sheet::{LoadedAnimation, LoadedAssets, SpriteFrame};
use glam::Vec2;

use crate::backend::{Color, Rect};
use crate::engine::{Scene, SceneContext};

pub const BACKGROUND_COLOR: Color = Color(25, 25, 40);
pub const TILE_COLOR: Color = Color(80, 200, 120);
pub const PLAYER_COLOR: Color = Color(240, 240, 255);
pub const TITLE: &str = "Astrocat Lobby";

const MOVE_LEFT: &[Key] = &[Key::Left, Key::A];
const MOVE_RIGHT: &[Key] = &[Key::Right, Key::D];
const JUMP: &[Key] = &[Key::Space, Key::Up];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tile {
    pub x: f32,
    pub y: f32,
    pub size: f32,
}

#[derive(Debug, Clone)]
pub struct TileMap {
    layout: Vec<Vec<char>>,
    pub rows: usize,
    pub cols: usize,
    pub tile_size: f32,
}

impl TileMap {
    pub fn new(layout: &[&str], tile_size: f32) -> Self {
        let layout: Vec<Vec<char>> = layout.iter().map(|row| row.chars().collect()).collect();
        let rows = layout.len();
        let cols = layout.first().map_or(0, Vec::len);
        Self {
            layout,
            rows,
            cols,
            tile_size,
        }
    }

    /// Solid tiles in row-major order, in world pixels.
    pub fn tiles(&self) -> Vec<Tile> {
        let mut solid = Vec::new();
        for (row_index, row) in self.layout.iter().enumerate() {
            for (col_index, &value) in row.iter().enumerate() {
                if value == '#' {
                    solid.push(Tile {
                        x: col_index as f32 * self.tile_size,
                        y: row_index as f32 * self.tile_size,
                        size: self.tile_size,
                    });
                }
            }
        }
        solid
    }

    /// Keep the player inside the map and land them on the bottom row.
    pub fn clamp_position(&self, player: &mut Player) {
        let max_x = self.cols.saturating_sub(1) as f32 * self.tile_size;
        let max_y = self.rows.saturating_sub(1) as f32 * self.tile_size;
        player.position.x = player.position.x.clamp(0.0, max_x);
        if player.position.y > max_y {
            player.position.y = max_y;
            player.velocity.y = 0.0;
            player.on_ground = true;
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub position: Vec2,
    pub velocity: Vec2,
    pub on_ground: bool,
}

impl Player {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            position: Vec2::new(x, y),
            velocity: Vec2::ZERO,
            on_ground: false,
        }
    }

    pub fn apply_gravity(&mut self, dt: f32, gravity: f32) {
        self.velocity.y += gravity * dt;
    }

    pub fn integrate(&mut self, dt: f32) {
        self.position += self.velocity * dt;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub width: f32,
    pub height: f32,
    pub offset: Vec2,
}

impl Camera {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            offset: Vec2::ZERO,
        }
    }

    /// Center on `target`, never scrolling past the top-left corner.
    pub fn follow(&mut self, target: Vec2) {
        self.offset.x = (target.x - self.width / 2.0).max(0.0);
        self.offset.y = (target.y - self.height / 2.0).max(0.0);
    }
}

/// Player sprite playback driven by movement.
struct PlayerSprite {
    assets: LoadedAssets,
    state: AnimationState,
}

/// "walk" while moving, "idle" otherwise, else whatever sorts first.
fn pick_animation(assets: &LoadedAssets, moving: bool) -> Option<&LoadedAnimation> {
    let preferred = if moving { "walk" } else { "idle" };
    assets
        .animations
        .get(preferred)
        .or_else(|| assets.animations.values().next())
}

pub struct SideScrollingScene {
    pub map: TileMap,
    pub player: Player,
    pub camera: Camera,
    pub gravity: f32,
    pub jump_speed: f32,
    pub move_speed: f32,
    sprite: Option<PlayerSprite>,
    current_frame: Option<SpriteFrame>,
    show_title: bool,
}

impl SideScrollingScene {
    pub fn new(map: TileMap, player: Player, camera: Camera) -> Self {
        Self {
            map,
            player,
            camera,
            gravity: 1600.0,
            jump_speed: -650.0,
            move_speed: 250.0,
            sprite: None,
            current_frame: None,
            show_title: false,
        }
    }

    /// Draw the player from `assets` instead of a plain rectangle.
    pub fn with_assets(mut self, assets: LoadedAssets) -> Self {
        let name = pick_animation(&assets, false)
            .map(|animation| animation.name.clone())
            .unwrap_or_default();
        self.sprite = Some(PlayerSprite {
            assets,
            state: AnimationState::new(&name),
        });
        self
    }

    /// Name of the animation currently playing, if sprites are loaded.
    #[allow(dead_code)]
    pub fn current_animation(&self) -> Option<&str> {
        self.sprite.as_ref().map(|sprite| sprite.state.animation.as_str())
    }

    #[allow(dead_code)]
    pub fn current_frame(&self) -> Option<&SpriteFrame> {
        self.current_frame.as_ref()
    }

    /// Horizontal movement from left/A or right/D, and a jump from the ground.
    pub fn apply_input(&mut self, input: &InputState) {
        if input.any_held(MOVE_LEFT) {
            self.player.velocity.x = -self.move_speed;
        } else if input.any_held(MOVE_RIGHT) {
            self.player.velocity.x = self.move_speed;
        } else {
            self.player.velocity.x = 0.0;
        }

        if input.any_held(JUMP) && self.player.on_ground {
            self.player.velocity.y = self.jump_speed;
            self.player.on_ground = false;
        }
    }

    fn advance_sprite(&mut self, dt: f64) {
        let Some(PlayerSprite { assets, state }) = self.sprite.as_mut() else {
            return;
        };
        let moving = self.player.velocity.x != 0.0;
        let Some(animation) = pick_animation(assets, moving) else {
            return;
        };
        if state.animation != animation.name {
            *state = AnimationState::new(&animation.name);
        }
        let dt_us = (dt * 1_000_000.0).round() as u64;
        self.current_frame = state.tick(dt_us, animation).copied();
    }

    fn screen_rect(&self, x: f32, y: f32, size: f32) -> Rect {
        Rect::new(
            x - self.camera.offset.x,
            y - self.camera.offset.y,
            size,
            size,
        )
    }
}

impl Scene for SideScrollingScene {
    fn name(&self) -> &str {
        "side_scrolling"
    }

    fn requires_backend(&self) -> bool {
        true
    }

    fn startup(&mut self, ctx: &mut SceneContext<'_>) {
        self.show_title = ctx.has_backend();
    }

    fn handle_input(&mut self, ctx: &mut SceneContext<'_>) {
        if ctx.input().is_just_pressed(Key::Escape) {
            ctx.request_exit();
        }
        self.apply_input(ctx.input());
    }

    fn update(&mut self, dt: f64) {
        let step = dt as f32;
        self.player.apply_gravity(step, self.gravity);
        self.player.integrate(step);
        self.map.clamp_position(&mut self.player);
        self.camera.follow(self.player.position);
        self.advance_sprite(dt);
    }

    fn render(&mut self, ctx: &mut SceneContext<'_>) {
        let Some(backend) = ctx.backend() else {
            return;
        };

        backend.clear(BACKGROUND_COLOR);
        for tile in self.map.tiles() {
            backend.fill_rect(self.screen_rect(tile.x, tile.y, tile.size), TILE_COLOR);
        }

        let player_rect = self.screen_rect(
            self.player.position.x,
            self.player.position.y,
            self.map.tile_size,
        );
        match (&self.sprite, &self.current_frame) {
            (Some(sprite), Some(frame)) => {
                backend.draw_sprite(&sprite.assets.sprite_sheet, frame, player_rect, PLAYER_COLOR)
            }
            _ => backend.fill_rect(player_rect, PLAYER_COLOR),
        }

        if self.show_title {
            backend.draw_text(TITLE, Vec2::new(20.0, 20.0), PLAYER_COLOR);
        }
        backend.present();
    }

    fn shutdown(&mut self) {
        self.show_title = false;
    }
}

pub const DEFAULT_LAYOUT: &[&str] = &[
    "........................................",
    "........................................",
    "........................................",
    "........................................",
    "........................................",
    "........................................",
    "...............####.....................",
    "........................................",
    "##############################....######",
    "........................................",
];

pub fn create_default_scene() -> SideScrollingScene {
    let map = TileMap::new(DEFAULT_LAYOUT, 32.0);
    let player = Player::new(map.tile_size * 2.0, map.tile_size * 4.0);
    let camera = Camera::new(800.0, 600.0);
    SideScrollingScene::new(map, player, camera)
}
