//! Entry point for loading the lobby's sprite assets from disk.

use std::path::{Path, PathBuf};

use astrocat_core::sprite_sheet::{LoadedAssets, DEFAULT_MANIFEST_NAME};
use astrocat_core::{load_assets_from_directory, ManifestError};

pub const DEFAULT_ASSET_DIRECTORY: &str = "assets";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameClient {
    asset_directory: PathBuf,
    manifest_name: String,
}

impl Default for GameClient {
    fn default() -> Self {
        Self::new(DEFAULT_ASSET_DIRECTORY, DEFAULT_MANIFEST_NAME)
    }
}

impl GameClient {
    pub fn new(asset_directory: impl Into<PathBuf>, manifest_name: impl Into<String>) -> Self {
        Self {
            asset_directory: asset_directory.into(),
            manifest_name: manifest_name.into(),
        }
    }

    /// Point the client at a different asset directory and manifest.
    #[allow(dead_code)]
    pub fn configure_assets(&mut self, asset_directory: impl Into<PathBuf>, manifest_name: impl Into<String>) {
        self.asset_directory = asset_directory.into();
        self.manifest_name = manifest_name.into();
    }

    #[allow(dead_code)]
    pub fn asset_directory(&self) -> &Path {
        &self.asset_directory
    }

    #[allow(dead_code)]
    pub fn manifest_name(&self) -> &str {
        &self.manifest_name
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.asset_directory.join(&self.manifest_name)
    }

    pub fn load_assets(&self) -> Result<LoadedAssets, ManifestError> {
        log::debug!("Loading assets from {}", self.manifest_path().display());
        load_assets_from_directory(&self.asset_directory, &self.manifest_name)
    }
}

/// One header line for the sheet, then one line per animation in name order.
pub fn describe(assets: &LoadedAssets) -> Vec<String> {
    let (width, height) = assets.sprite_sheet.size();
    let mut lines = vec![format!(
        "Loaded sprite sheet {}x{} with {} animations.",
        width,
        height,
        assets.animations.len()
    )];
    lines.extend(assets.animations.values().map(|animation| {
        format!(
            " - {}: {} frames @ {:.3}s",
            animation.name,
            animation.frames.len(),
            animation.frame_duration
        )
    }));
    lines
}
