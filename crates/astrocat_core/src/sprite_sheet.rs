//! Sprite sheet decoding and grid slicing.
//!
//! Only the PNG signature and the IHDR width/height fields are read; pixel
//! data is kept as raw bytes for whichever backend ends up drawing it. The
//! sheet is cut into a regular grid described by the manifest's
//! `SpriteSheetConfig`, and frames are numbered row-major starting at the
//! top-left corner.
//!
//! Grid size per axis is `1 + (usable - frame) / (frame + spacing)` with
//! `usable = dim - 2 * margin` and floor division, so a trailing partial
//! column or row is dropped rather than rejected.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::manifest::{load_manifest, AssetManifest, ManifestError, SpriteSheetConfig};

pub const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];
pub const DEFAULT_MANIFEST_NAME: &str = "manifest.json";

/// Decoded sprite sheet. Immutable once loaded.
#[derive(Debug, Clone)]
pub struct SpriteSheet {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl SpriteSheet {
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Pixel box of one frame, right/bottom exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameRect {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpriteFrame {
    pub index: usize,
    pub rect: FrameRect,
}

#[derive(Debug, Clone)]
pub struct LoadedAnimation {
    pub name: String,
    pub frames: Vec<SpriteFrame>,
    pub frame_duration: f64,
    pub looping: bool,
}

/// A sprite sheet bundled with every animation resolved against it.
#[derive(Debug, Clone)]
pub struct LoadedAssets {
    pub sprite_sheet: SpriteSheet,
    pub animations: BTreeMap<String, LoadedAnimation>,
}

/// Read `(width, height)` from the IHDR chunk of a PNG byte stream.
pub fn read_png_size(data: &[u8], path: &Path) -> Result<(u32, u32), ManifestError> {
    if data.len() < 24 || data[..8] != PNG_SIGNATURE {
        return Err(ManifestError::InvalidPng(path.to_path_buf()));
    }
    // IHDR follows the signature: 4-byte length, 4-byte type, then width and height.
    let width = u32::from_be_bytes([data[16], data[17], data[18], data[19]]);
    let height = u32::from_be_bytes([data[20], data[21], data[22], data[23]]);
    if width == 0 || height == 0 {
        return Err(ManifestError::EmptyImage { width, height });
    }
    Ok((width, height))
}

pub fn load_sprite_sheet(path: &Path) -> Result<SpriteSheet, ManifestError> {
    let data = fs::read(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            ManifestError::NotFound(path.to_path_buf())
        } else {
            ManifestError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;
    let (width, height) = read_png_size(&data, path)?;
    Ok(SpriteSheet {
        path: path.to_path_buf(),
        width,
        height,
        data,
    })
}

/// Number of `(columns, rows)` the configured grid fits into a sheet.
pub fn calculate_grid(
    width: u32,
    height: u32,
    config: &SpriteSheetConfig,
) -> Result<(u32, u32), ManifestError> {
    let margin = i64::from(config.margin);
    let spacing = i64::from(config.spacing);
    let frame_w = i64::from(config.frame_width);
    let frame_h = i64::from(config.frame_height);
    let usable_w = i64::from(width) - 2 * margin;
    let usable_h = i64::from(height) - 2 * margin;

    if usable_w <= 0 || usable_h <= 0 {
        return Err(ManifestError::SheetTooSmall {
            width,
            height,
            margin: config.margin,
        });
    }
    if frame_w > usable_w || frame_h > usable_h {
        return Err(ManifestError::FrameLargerThanSheet {
            frame_width: config.frame_width,
            frame_height: config.frame_height,
            usable_width: usable_w,
            usable_height: usable_h,
        });
    }

    let step_x = frame_w + spacing;
    let step_y = frame_h + spacing;
    let columns = 1 + ((usable_w - frame_w) / step_x).max(0);
    let rows = 1 + ((usable_h - frame_h) / step_y).max(0);

    if (usable_w - frame_w) % step_x != 0 || (usable_h - frame_h) % step_y != 0 {
        log::warn!(
            "Sprite sheet {}x{} does not divide evenly into {}x{} frames; trailing pixels are ignored",
            width,
            height,
            config.frame_width,
            config.frame_height
        );
    }

    Ok((columns as u32, rows as u32))
}

/// Cut the sheet into frames, row-major from the top-left.
pub fn slice_sprite_sheet(
    sheet: &SpriteSheet,
    config: &SpriteSheetConfig,
) -> Result<Vec<SpriteFrame>, ManifestError> {
    let (columns, rows) = calculate_grid(sheet.width, sheet.height, config)?;
    let margin = u64::from(config.margin);
    let frame_w = u64::from(config.frame_width);
    let frame_h = u64::from(config.frame_height);
    let step_x = frame_w + u64::from(config.spacing);
    let step_y = frame_h + u64::from(config.spacing);

    let mut frames = Vec::with_capacity(columns as usize * rows as usize);
    for row in 0..u64::from(rows) {
        for column in 0..u64::from(columns) {
            let left = margin + column * step_x;
            let top = margin + row * step_y;
            frames.push(SpriteFrame {
                index: frames.len(),
                rect: FrameRect {
                    left: pixel(left, "frame left")?,
                    top: pixel(top, "frame top")?,
                    right: pixel(left + frame_w, "frame right")?,
                    bottom: pixel(top + frame_h, "frame bottom")?,
                },
            });
        }
    }

    if frames.is_empty() {
        return Err(ManifestError::NoFrames);
    }
    Ok(frames)
}

/// Grid cells lie inside the sheet, so every edge fits the sheet's u32 size.
fn pixel(value: u64, field: &'static str) -> Result<u32, ManifestError> {
    u32::try_from(value).map_err(|_| ManifestError::OutOfRange {
        field,
        value: i64::try_from(value).unwrap_or(i64::MAX),
    })
}

/// Load the manifest's sprite sheet and resolve every animation into frames.
pub fn load_assets(manifest: &AssetManifest) -> Result<LoadedAssets, ManifestError> {
    let sprite_sheet = load_sprite_sheet(&manifest.sprite_sheet.image)?;
    let frames = slice_sprite_sheet(&sprite_sheet, &manifest.sprite_sheet)?;

    let mut animations = BTreeMap::new();
    for (name, sequence) in &manifest.animations {
        let resolved = sequence
            .frames
            .iter()
            .map(|&index| {
                frames
                    .get(index)
                    .copied()
                    .ok_or_else(|| ManifestError::FrameOutOfRange {
                        name: name.clone(),
                        index,
                        available: frames.len(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        animations.insert(
            name.clone(),
            LoadedAnimation {
                name: name.clone(),
                frames: resolved,
                frame_duration: sequence.frame_duration,
                looping: sequence.looping,
            },
        );
    }

    log::info!(
        "Loaded sprite sheet {} ({}x{}, {} frames, {} animations)",
        sprite_sheet.path.display(),
        sprite_sheet.width,
        sprite_sheet.height,
        frames.len(),
        animations.len()
    );
    Ok(LoadedAssets {
        sprite_sheet,
        animations,
    })
}

/// Load `directory/manifest_name` and everything it references.
pub fn load_assets_from_directory(
    directory: &Path,
    manifest_name: &str,
) -> Result<LoadedAssets, ManifestError> {
    let manifest = load_manifest(&directory.join(manifest_name))?;
    load_assets(&manifest)
}
