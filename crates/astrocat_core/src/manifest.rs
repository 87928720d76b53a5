//! Asset manifest loading and validation.
//!
//! A manifest binds one sprite sheet image and its slicing parameters to a set
//! of named animations:
//!
//! ```json
//! {
//!   "sprite_sheet": { "image": "cats.png", "frame_width": 16, "frame_height": 32,
//!                     "margin": 0, "spacing": 0 },
//!   "animations": { "idle": { "frames": [0, 1], "frame_duration": 0.2, "loop": true } }
//! }
//! ```
//!
//! The file is deserialized into private raw structs, validated as a whole,
//! and only then turned into the public [`AssetManifest`]. Callers never see a
//! partially validated manifest. The sheet image path is resolved against the
//! directory that contains the manifest.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Every way loading a manifest or its sprite sheet can fail.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("no such file: {}", .0.display())]
    NotFound(PathBuf),
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("manifest {} is not valid JSON: {source}", path.display())]
    InvalidJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("manifest {} has missing or invalid keys: {source}", path.display())]
    Schema {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("{field} must be positive (got {value})")]
    InvalidFrameSize { field: &'static str, value: i64 },
    #[error("margin and spacing must be zero or positive (margin {margin}, spacing {spacing})")]
    InvalidSpacing { margin: i64, spacing: i64 },
    #[error("{field} is out of range (got {value})")]
    OutOfRange { field: &'static str, value: i64 },
    #[error("manifest must define at least one animation")]
    EmptyAnimations,
    #[error("animation '{0}' must define at least one frame")]
    EmptyFrames(String),
    #[error("animation '{name}' contains a negative frame index: {index}")]
    NegativeFrameIndex { name: String, index: i64 },
    #[error("animation '{name}' frame_duration must be positive (got {value})")]
    InvalidFrameDuration { name: String, value: f64 },
    #[error("sprite sheet {} is not a valid PNG file", .0.display())]
    InvalidPng(PathBuf),
    #[error("sprite sheet reported non-positive dimensions {width}x{height}")]
    EmptyImage { width: u32, height: u32 },
    #[error("sprite sheet {width}x{height} is too small for margin {margin}")]
    SheetTooSmall { width: u32, height: u32, margin: u32 },
    #[error(
        "frame {frame_width}x{frame_height} is larger than the usable sheet area {usable_width}x{usable_height}"
    )]
    FrameLargerThanSheet {
        frame_width: u32,
        frame_height: u32,
        usable_width: i64,
        usable_height: i64,
    },
    #[error("sprite sheet configuration produced zero frames; check frame size, margin and spacing")]
    NoFrames,
    #[error("animation '{name}' references frame {index} but the sheet only has {available} frames")]
    FrameOutOfRange {
        name: String,
        index: usize,
        available: usize,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpriteSheetConfig {
    pub image: PathBuf,
    pub frame_width: u32,
    pub frame_height: u32,
    pub margin: u32,
    pub spacing: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnimationSequence {
    pub name: String,
    pub frames: Vec<usize>,
    /// Seconds each frame stays on screen.
    pub frame_duration: f64,
    pub looping: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssetManifest {
    pub sprite_sheet: SpriteSheetConfig,
    pub animations: BTreeMap<String, AnimationSequence>,
}

// --- JSON deserialization types (private) ---

#[derive(Debug, Deserialize)]
struct ManifestJson {
    sprite_sheet: SpriteSheetJson,
    animations: BTreeMap<String, AnimationJson>,
}

#[derive(Debug, Deserialize)]
struct SpriteSheetJson {
    image: String,
    frame_width: i64,
    frame_height: i64,
    #[serde(default)]
    margin: i64,
    #[serde(default)]
    spacing: i64,
}

#[derive(Debug, Deserialize)]
struct AnimationJson {
    frames: Vec<i64>,
    frame_duration: f64,
    #[serde(rename = "loop", default = "default_loop")]
    looping: bool,
}

const fn default_loop() -> bool {
    true
}

/// Load and validate the manifest at `path`.
pub fn load_manifest(path: &Path) -> Result<AssetManifest, ManifestError> {
    if !path.exists() {
        return Err(ManifestError::NotFound(path.to_path_buf()));
    }
    let raw = fs::read_to_string(path).map_err(|source| ManifestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let json: ManifestJson = serde_json::from_str(&raw).map_err(|source| {
        if source.is_data() {
            ManifestError::Schema {
                path: path.to_path_buf(),
                source,
            }
        } else {
            ManifestError::InvalidJson {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;
    validate_manifest_json(&json)?;

    let root = path.parent().unwrap_or_else(|| Path::new(""));
    let manifest = build_manifest(json, root);
    log::info!(
        "Loaded manifest {} ({} animations, sheet {})",
        path.display(),
        manifest.animations.len(),
        manifest.sprite_sheet.image.display()
    );
    Ok(manifest)
}

fn validate_manifest_json(json: &ManifestJson) -> Result<(), ManifestError> {
    let sheet = &json.sprite_sheet;
    ensure_positive(sheet.frame_width, "frame_width")?;
    ensure_positive(sheet.frame_height, "frame_height")?;
    if sheet.margin < 0 || sheet.spacing < 0 {
        return Err(ManifestError::InvalidSpacing {
            margin: sheet.margin,
            spacing: sheet.spacing,
        });
    }
    for (field, value) in [
        ("frame_width", sheet.frame_width),
        ("frame_height", sheet.frame_height),
        ("margin", sheet.margin),
        ("spacing", sheet.spacing),
    ] {
        if u32::try_from(value).is_err() {
            return Err(ManifestError::OutOfRange { field, value });
        }
    }

    for (name, animation) in &json.animations {
        if animation.frames.is_empty() {
            return Err(ManifestError::EmptyFrames(name.clone()));
        }
        if let Some(&index) = animation.frames.iter().find(|&&index| index < 0) {
            return Err(ManifestError::NegativeFrameIndex {
                name: name.clone(),
                index,
            });
        }
        if animation.frame_duration <= 0.0 || !animation.frame_duration.is_finite() {
            return Err(ManifestError::InvalidFrameDuration {
                name: name.clone(),
                value: animation.frame_duration,
            });
        }
    }

    if json.animations.is_empty() {
        return Err(ManifestError::EmptyAnimations);
    }
    Ok(())
}

fn ensure_positive(value: i64, field: &'static str) -> Result<(), ManifestError> {
    if value <= 0 {
        return Err(ManifestError::InvalidFrameSize { field, value });
    }
    Ok(())
}

fn build_manifest(json: ManifestJson, root: &Path) -> AssetManifest {
    let sheet = json.sprite_sheet;
    let image = PathBuf::from(sheet.image);
    let image = if image.is_absolute() {
        image
    } else {
        root.join(image)
    };

    let animations = json
        .animations
        .into_iter()
        .map(|(name, animation)| {
            let sequence = AnimationSequence {
                name: name.clone(),
                frames: animation.frames.into_iter().map(|i| i as usize).collect(),
                frame_duration: animation.frame_duration,
                looping: animation.looping,
            };
            (name, sequence)
        })
        .collect();

    AssetManifest {
        sprite_sheet: SpriteSheetConfig {
            image,
            frame_width: sheet.frame_width as u32,
            frame_height: sheet.frame_height as u32,
            margin: sheet.margin as u32,
            spacing: sheet.spacing as u32,
        },
        animations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_dir(name_hint: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        let dir = std::env::temp_dir().join(format!(
            "astrocat_manifest_test_{}_{}_{}",
            name_hint,
            std::process::id(),
            nanos
        ));
        fs::create_dir_all(&dir).expect("create temp dir");
        dir
    }

    fn write_manifest(name_hint: &str, body: &str) -> (PathBuf, PathBuf) {
        let dir = temp_dir(name_hint);
        let path = dir.join("manifest.json");
        fs::write(&path, body).expect("write temp manifest");
        (dir, path)
    }

    fn load_err(name_hint: &str, body: &str) -> ManifestError {
        let (dir, path) = write_manifest(name_hint, body);
        let err = load_manifest(&path).expect_err("manifest should be rejected");
        let _ = fs::remove_dir_all(dir);
        err
    }

    #[test]
    fn load_manifest_parses_valid_file() {
        let (dir, path) = write_manifest(
            "valid",
            r#"
            {
              "sprite_sheet": { "image": "sheet.png", "frame_width": 16, "frame_height": 32,
                                "margin": 1, "spacing": 2 },
              "animations": {
                "walk": { "frames": [0, 1, 2, 3], "frame_duration": 0.1 },
                "idle": { "frames": [0], "frame_duration": 0.5, "loop": false }
              }
            }
            "#,
        );

        let manifest = load_manifest(&path).expect("manifest should load");
        assert_eq!(manifest.sprite_sheet.image, dir.join("sheet.png"));
        assert_eq!(manifest.sprite_sheet.frame_width, 16);
        assert_eq!(manifest.sprite_sheet.frame_height, 32);
        assert_eq!(manifest.sprite_sheet.margin, 1);
        assert_eq!(manifest.sprite_sheet.spacing, 2);
        assert_eq!(manifest.animations.len(), 2);

        let walk = &manifest.animations["walk"];
        assert_eq!(walk.name, "walk");
        assert_eq!(walk.frames, vec![0, 1, 2, 3]);
        assert!(walk.looping, "loop defaults to true");
        assert!(!manifest.animations["idle"].looping);

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn margin_and_spacing_default_to_zero() {
        let (dir, path) = write_manifest(
            "defaults",
            r#"{"sprite_sheet":{"image":"s.png","frame_width":8,"frame_height":8},
                "animations":{"a":{"frames":[0],"frame_duration":1}}}"#,
        );
        let manifest = load_manifest(&path).expect("manifest should load");
        assert_eq!(manifest.sprite_sheet.margin, 0);
        assert_eq!(manifest.sprite_sheet.spacing, 0);
        assert_eq!(manifest.animations["a"].frame_duration, 1.0);
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn absolute_image_path_is_kept() {
        let absolute = std::env::temp_dir().join("elsewhere").join("sheet.png");
        let body = format!(
            r#"{{"sprite_sheet":{{"image":{},"frame_width":8,"frame_height":8}},
                "animations":{{"a":{{"frames":[0],"frame_duration":0.1}}}}}}"#,
            serde_json::to_string(&absolute.display().to_string()).expect("encode path")
        );
        let (dir, path) = write_manifest("absolute", &body);
        let manifest = load_manifest(&path).expect("manifest should load");
        assert_eq!(manifest.sprite_sheet.image, absolute);
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn missing_file_is_not_found() {
        let path = temp_dir("missing").join("nope.json");
        let err = load_manifest(&path).expect_err("missing file should fail");
        assert!(matches!(err, ManifestError::NotFound(_)));
    }

    #[test]
    fn rejects_invalid_json() {
        let err = load_err("bad_json", "{ not json");
        assert!(matches!(err, ManifestError::InvalidJson { .. }));
    }

    #[test]
    fn rejects_missing_top_level_keys() {
        let err = load_err(
            "no_animations",
            r#"{"sprite_sheet":{"image":"s.png","frame_width":8,"frame_height":8}}"#,
        );
        assert!(matches!(err, ManifestError::Schema { .. }));
    }

    #[test]
    fn rejects_missing_sheet_keys() {
        let err = load_err(
            "no_frame_height",
            r#"{"sprite_sheet":{"image":"s.png","frame_width":8},
                "animations":{"a":{"frames":[0],"frame_duration":0.1}}}"#,
        );
        assert!(matches!(err, ManifestError::Schema { .. }));
    }

    #[test]
    fn rejects_non_object_animations() {
        let err = load_err(
            "animations_list",
            r#"{"sprite_sheet":{"image":"s.png","frame_width":8,"frame_height":8},
                "animations":[1, 2]}"#,
        );
        assert!(matches!(err, ManifestError::Schema { .. }));
    }

    #[test]
    fn rejects_non_positive_frame_size() {
        let err = load_err(
            "zero_width",
            r#"{"sprite_sheet":{"image":"s.png","frame_width":0,"frame_height":8},
                "animations":{"a":{"frames":[0],"frame_duration":0.1}}}"#,
        );
        assert!(matches!(
            err,
            ManifestError::InvalidFrameSize {
                field: "frame_width",
                value: 0
            }
        ));

        let err = load_err(
            "negative_height",
            r#"{"sprite_sheet":{"image":"s.png","frame_width":8,"frame_height":-4},
                "animations":{"a":{"frames":[0],"frame_duration":0.1}}}"#,
        );
        assert!(err.to_string().contains("frame_height must be positive"));
    }

    #[test]
    fn rejects_negative_margin_or_spacing() {
        let err = load_err(
            "negative_margin",
            r#"{"sprite_sheet":{"image":"s.png","frame_width":8,"frame_height":8,"margin":-1},
                "animations":{"a":{"frames":[0],"frame_duration":0.1}}}"#,
        );
        assert!(matches!(err, ManifestError::InvalidSpacing { .. }));

        let err = load_err(
            "negative_spacing",
            r#"{"sprite_sheet":{"image":"s.png","frame_width":8,"frame_height":8,"spacing":-2},
                "animations":{"a":{"frames":[0],"frame_duration":0.1}}}"#,
        );
        assert!(matches!(err, ManifestError::InvalidSpacing { .. }));
    }

    #[test]
    fn rejects_empty_animation_map() {
        let err = load_err(
            "empty_animations",
            r#"{"sprite_sheet":{"image":"s.png","frame_width":8,"frame_height":8},
                "animations":{}}"#,
        );
        assert!(matches!(err, ManifestError::EmptyAnimations));
    }

    #[test]
    fn rejects_empty_frame_list() {
        let err = load_err(
            "empty_frames",
            r#"{"sprite_sheet":{"image":"s.png","frame_width":8,"frame_height":8},
                "animations":{"walk":{"frames":[],"frame_duration":0.1}}}"#,
        );
        assert!(matches!(err, ManifestError::EmptyFrames(ref name) if name == "walk"));
    }

    #[test]
    fn rejects_negative_frame_index() {
        let err = load_err(
            "negative_index",
            r#"{"sprite_sheet":{"image":"s.png","frame_width":8,"frame_height":8},
                "animations":{"walk":{"frames":[0, -3],"frame_duration":0.1}}}"#,
        );
        assert!(matches!(
            err,
            ManifestError::NegativeFrameIndex { index: -3, .. }
        ));
    }

    #[test]
    fn rejects_non_positive_frame_duration() {
        let err = load_err(
            "zero_duration",
            r#"{"sprite_sheet":{"image":"s.png","frame_width":8,"frame_height":8},
                "animations":{"walk":{"frames":[0],"frame_duration":0}}}"#,
        );
        assert!(matches!(err, ManifestError::InvalidFrameDuration { .. }));

        let err = load_err(
            "negative_duration",
            r#"{"sprite_sheet":{"image":"s.png","frame_width":8,"frame_height":8},
                "animations":{"walk":{"frames":[0],"frame_duration":-0.5}}}"#,
        );
        assert!(err.to_string().contains("frame_duration must be positive"));
    }
}
