//! Map and tile settings.
//!
//! Fixed geometric constants read once when a map is generated. Settings
//! load from JSON; any missing field falls back to its default.

use serde::{Deserialize, Serialize};

/// Which broad-phase predicate the out-of-bounds query uses before the
/// diamond test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BroadPhase {
    /// Standard axis-aligned overlap: all four edge conditions must hold.
    #[default]
    Aabb,
    /// Axis-aligned overlap of the two diamonds' true extents rather than the
    /// raw rect fields. Never rejects a pair whose diamonds overlap, even when
    /// the box and tile widths differ.
    Footprint,
    /// Legacy predicate that passes when *any* of the four edge conditions
    /// holds. Nearly every pair passes, so the diamond test decides alone.
    Permissive,
}

/// Tile colours handed to the renderer, as CSS-style hex strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub floor_top: String,
    pub floor_side: String,
    pub door_top: String,
    pub door_side: String,
    pub boundary: String,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            floor_top: "#eeeeee".to_string(),
            floor_side: "#dddddd".to_string(),
            door_top: "#ffaaaa".to_string(),
            door_side: "#ff0000".to_string(),
            boundary: "red".to_string(),
        }
    }
}

/// Geometry and generation settings for one map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Isometric tile width in pixels.
    pub tile_width: f32,
    /// Isometric tile height in pixels.
    pub tile_height: f32,
    /// Map width in tiles.
    pub map_width: usize,
    /// Map height in tiles. Must equal `map_width`.
    pub map_height: usize,
    /// Generator seed.
    pub seed: u64,
    pub broad_phase: BroadPhase,
    /// Emit boundary outlines alongside tile geometry.
    pub debug: bool,
    /// How far tile sides extrude below the top face, in pixels.
    pub side_depth: f32,
    pub palette: Palette,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tile_width: 64.0,
            tile_height: 32.0,
            map_width: 40,
            map_height: 40,
            seed: 42,
            broad_phase: BroadPhase::Aabb,
            debug: false,
            side_depth: 10.0,
            palette: Palette::default(),
        }
    }
}

impl Settings {
    /// Parse settings from JSON and validate them.
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set both map dimensions to `side` tiles.
    pub fn with_map_size(mut self, side: usize) -> Self {
        self.map_width = side;
        self.map_height = side;
        self
    }

    pub fn with_broad_phase(mut self, broad_phase: BroadPhase) -> Self {
        self.broad_phase = broad_phase;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Side length of the square grid these settings describe.
    pub fn side_length(&self) -> usize {
        self.map_width
    }

    /// Reject geometry the transform and generator can't work with.
    pub fn validate(&self) -> Result<(), SettingsError> {
        let size_ok = |v: f32| v.is_finite() && v > 0.0;
        if !size_ok(self.tile_width) || !size_ok(self.tile_height) {
            return Err(SettingsError::InvalidTileSize {
                width: self.tile_width,
                height: self.tile_height,
            });
        }
        if self.map_width == 0 || self.map_height == 0 {
            return Err(SettingsError::EmptyMap);
        }
        if self.map_width != self.map_height {
            return Err(SettingsError::NonSquareMap {
                width: self.map_width,
                height: self.map_height,
            });
        }
        Ok(())
    }
}

/// Errors from loading or validating settings.
#[derive(Debug)]
pub enum SettingsError {
    Json(serde_json::Error),
    InvalidTileSize { width: f32, height: f32 },
    EmptyMap,
    NonSquareMap { width: usize, height: usize },
}

impl From<serde_json::Error> for SettingsError {
    fn from(e: serde_json::Error) -> Self {
        SettingsError::Json(e)
    }
}

impl std::fmt::Display for SettingsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SettingsError::Json(e) => write!(f, "Settings parse error: {}", e),
            SettingsError::InvalidTileSize { width, height } => {
                write!(f, "Tile size must be positive and finite, got {}×{}", width, height)
            }
            SettingsError::EmptyMap => write!(f, "Map dimensions must be non-zero"),
            SettingsError::NonSquareMap { width, height } => {
                write!(f, "Map must be square, got {}×{} tiles", width, height)
            }
        }
    }
}

impl std::error::Error for SettingsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SettingsError::Json(e) => Some(e),
            _ => None,
        }
    }
}
