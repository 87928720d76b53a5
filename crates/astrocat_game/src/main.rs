//! Astrocat Lobby -- asset loading and the scene loop.
//!
//! Usage: `astrocat_game [ASSET_DIR] [MANIFEST_NAME]`
//!
//! Assets are loaded and validated up front; any manifest or sprite sheet
//! problem aborts with a non-zero exit before the scene starts. No windowing
//! backend is linked, so the chosen scene runs headless for
//! `ASTROCAT_FRAMES` frames (default 120) at a fixed time step.
//! `ASTROCAT_SCENE` picks `side_scrolling` (default) or `lobby`.

mod backend;
mod client;
mod engine;
mod lobby_scene;
mod scene;

use std::process::ExitCode;

use astrocat_core::sprite_sheet::DEFAULT_MANIFEST_NAME;
use client::{describe, GameClient, DEFAULT_ASSET_DIRECTORY};
use engine::{Engine, EngineConfig};

const FRAMES_ENV: &str = "ASTROCAT_FRAMES";
const DEFAULT_FRAMES: u64 = 120;
const SCENE_ENV: &str = "ASTROCAT_SCENE";

fn frame_budget() -> u64 {
    match std::env::var(FRAMES_ENV) {
        Ok(raw) => match raw.trim().parse::<u64>() {
            Ok(frames) => frames,
            Err(_) => {
                log::warn!("Ignoring invalid {FRAMES_ENV}='{raw}', using {DEFAULT_FRAMES}");
                DEFAULT_FRAMES
            }
        },
        Err(_) => DEFAULT_FRAMES,
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let asset_directory = args
        .next()
        .unwrap_or_else(|| DEFAULT_ASSET_DIRECTORY.to_string());
    let manifest_name = args
        .next()
        .unwrap_or_else(|| DEFAULT_MANIFEST_NAME.to_string());

    let client = GameClient::new(asset_directory, manifest_name);
    let assets = match client.load_assets() {
        Ok(assets) => assets,
        Err(err) => {
            log::error!(
                "Failed to load assets from {}: {err}",
                client.manifest_path().display()
            );
            return ExitCode::FAILURE;
        }
    };
    for line in describe(&assets) {
        log::info!("{line}");
    }

    let mut engine = Engine::new(EngineConfig {
        allow_headless: true,
        max_frames: Some(frame_budget()),
        ..EngineConfig::default()
    });
    engine.add_shutdown_hook(|| log::info!("Astrocat Lobby shut down."));

    let scene_name = std::env::var(SCENE_ENV).unwrap_or_else(|_| "side_scrolling".to_string());
    let result = match scene_name.trim() {
        "lobby" => {
            let mut lobby = lobby_scene::create_default_lobby();
            engine.run(&mut lobby).map(|frames| {
                log::info!(
                    "Lobby closed after {frames} frames with {} interactions",
                    lobby.fired().len()
                );
            })
        }
        "side_scrolling" => {
            let mut scene = scene::create_default_scene().with_assets(assets);
            engine.run(&mut scene).map(|frames| {
                log::info!(
                    "Player came to rest at ({:.1}, {:.1}) after {frames} frames",
                    scene.player.position.x,
                    scene.player.position.y
                );
            })
        }
        other => {
            log::error!("Unknown {SCENE_ENV}='{other}'; expected 'side_scrolling' or 'lobby'");
            return ExitCode::FAILURE;
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}
