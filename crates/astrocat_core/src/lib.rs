//! Core types for the Astrocat Lobby: sprite asset loading, lobby
//! interactions, input and frame timing, and the astro-cat roster.

pub mod animation;
pub mod geometry;
pub mod input;
pub mod lobby;
pub mod manifest;
pub mod roster;
pub mod sprite_sheet;
pub mod time;

pub use manifest::{load_manifest, AssetManifest, ManifestError};
pub use sprite_sheet::{load_assets, load_assets_from_directory, LoadedAssets};
