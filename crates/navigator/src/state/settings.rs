//! Navigator settings

use std::path::PathBuf;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use shared::Rgb;

/// Camera transition tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    /// Fraction of the remaining distance covered per tick (0..=1)
    pub lerp_factor: f32,
    /// Scale the factor by frame time instead of applying it once per tick
    pub time_scaled: bool,
    /// Zoom while a shelf is selected
    pub zoomed: f32,
    /// Zoom over the whole room
    pub overview: f32,
    /// Camera position over the whole room (looks at the origin)
    pub overview_position: Vec3,
    /// Lift-and-forward offset from the selected shelf's position
    pub shelf_offset: Vec3,
    /// Distance below which a scripted flight counts as arrived
    pub arrival_epsilon: f32,
    /// Where the camera flies before a room is entered
    pub entry_position: Vec3,
    /// User zoom bounds
    pub min_zoom: f32,
    pub max_zoom: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            lerp_factor: 0.08,
            time_scaled: false,
            zoomed: 160.0,
            overview: 90.0,
            overview_position: Vec3::new(10.0, 10.0, 10.0),
            shelf_offset: Vec3::new(0.0, 0.5, 1.5),
            arrival_epsilon: 0.01,
            entry_position: Vec3::new(0.0, 4.0, 8.0),
            min_zoom: 70.0,
            max_zoom: 250.0,
        }
    }
}

/// Book slide-out animation tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationSettings {
    pub lerp_factor: f32,
    /// Offset along local Z relative to the captured position
    pub forward_offset: f32,
    /// Target rotation about Y (radians)
    pub open_angle: f32,
    /// Delay between pick and overlay open
    pub open_delay_ms: u64,
}

impl Default for AnimationSettings {
    fn default() -> Self {
        Self {
            lerp_factor: 0.08,
            forward_offset: -0.2,
            open_angle: std::f32::consts::FRAC_PI_2,
            open_delay_ms: 600,
        }
    }
}

/// Reading overlay settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlaySettings {
    /// Tint used when the picked cover has no readable color
    pub default_tint: Rgb,
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            default_tint: Rgb(0x1e, 0x29, 0x3b),
        }
    }
}

/// Asset naming conventions used to recognise books in a shelf model
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneSettings {
    /// Name suffix of the outer half of an untagged book mesh
    pub outer_suffix: String,
    /// Prefix shared by book groups
    pub book_group_prefix: String,
    /// Group holding the shelf model itself, never a book
    pub shelf_frame_group: String,
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            outer_suffix: "_1".to_string(),
            book_group_prefix: "group".to_string(),
            shelf_frame_group: "group1295511530".to_string(),
        }
    }
}

/// Where bookmarks live
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum BookmarkBackend {
    /// JSON file in the platform data dir
    #[default]
    Local,
    /// Per-account store on the bookmark server
    Remote { base_url: String, email: String },
    /// Process memory only
    Memory,
}

/// All navigator settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct NavSettings {
    #[serde(default)]
    pub camera: CameraSettings,
    #[serde(default)]
    pub animation: AnimationSettings,
    #[serde(default)]
    pub overlay: OverlaySettings,
    #[serde(default)]
    pub scene: SceneSettings,
    #[serde(default)]
    pub bookmarks: BookmarkBackend,
}

impl NavSettings {
    fn config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "library", "library-nav")
            .map(|dirs| dirs.config_dir().join("settings.json"))
    }

    /// Load settings from file, or return default if not found
    pub fn load() -> Self {
        if let Some(path) = Self::config_path() {
            if let Ok(json) = std::fs::read_to_string(&path) {
                match Self::from_json(&json) {
                    Ok(settings) => return settings,
                    Err(e) => tracing::warn!("Ignoring {}: {e}", path.display()),
                }
            }
        }
        Self::default()
    }

    /// Parse settings JSON; missing sections take their defaults
    pub fn from_json(json: &str) -> Result<Self, String> {
        serde_json::from_str(json).map_err(|e| format!("Settings JSON parse error: {e}"))
    }

    /// Save settings to file
    pub fn save(&self) {
        if let Some(path) = Self::config_path() {
            if let Some(dir) = path.parent() {
                if std::fs::create_dir_all(dir).is_ok() {
                    if let Ok(json) = serde_json::to_string_pretty(self) {
                        let _ = std::fs::write(path, json);
                    }
                }
            }
        }
    }
}
