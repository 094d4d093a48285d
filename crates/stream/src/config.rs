use serde::{Deserialize, Serialize};
use std::path::Path;

/// Errors from configuration loading and validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{field} must be positive and finite, got {value}")]
    NonPositive { field: &'static str, value: f32 },
    #[error("{field} must be finite and non-negative, got {value}")]
    Negative { field: &'static str, value: f32 },
    #[error("{field} must be finite, got {value}")]
    NotFinite { field: &'static str, value: f32 },
    #[error("overlap_length {overlap} must lie in [0, tile_length {tile})")]
    Overlap { overlap: f32, tile: f32 },
    #[error("{field} must be at least {min}")]
    TooSmall { field: &'static str, min: u32 },
    #[error("eviction_margin {0} keeps evicting tiles that are still in view (minimum 0.5)")]
    EvictionMargin(f32),
    #[error("{field}: min {min} exceeds max {max}")]
    Range {
        field: &'static str,
        min: f32,
        max: f32,
    },
    #[error("{field} must lie in [0, 1], got {value}")]
    Probability { field: &'static str, value: f32 },
    #[error("tree_probability + rock_probability = {0} exceeds 1")]
    ProbabilitySum(f32),
    #[error("lateral_keepout {keepout} must lie in [{min}, {max})")]
    Keepout { keepout: f32, min: f32, max: f32 },
    #[error("tree_spread {spread} exceeds tile_length {tile}")]
    TreeSpread { spread: f32, tile: f32 },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Road geometry and window sizing.
///
/// Defaults reproduce the stock scene: 60-unit tiles overlapping by 10%,
/// a 10-unit road flanked by 40-unit shoulders, 15 tiles in view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Length of one tile along the road.
    pub tile_length: f32,
    /// Amount each tile overlaps the previous one to hide seams.
    pub overlap_length: f32,
    /// Width of the drivable strip.
    pub road_width: f32,
    pub road_thickness: f32,
    /// Width of one shoulder strip.
    pub shoulder_width: f32,
    /// Surface height of the shoulder strips; decorations rest on it.
    pub shoulder_height: f32,
    /// Shoulder strips per side, stacked outward from the road.
    pub shoulder_bands: u32,
    /// Tiles kept alive at rest.
    pub visible_segments: u32,
    /// Tiles are evicted once they are this many tile lengths behind the origin.
    pub eviction_margin: f32,
    pub scenery: SceneryConfig,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            tile_length: 60.0,
            overlap_length: 6.0,
            road_width: 10.0,
            road_thickness: 0.1,
            shoulder_width: 40.0,
            shoulder_height: 0.125,
            shoulder_bands: 1,
            visible_segments: 15,
            eviction_margin: 1.5,
            scenery: SceneryConfig::default(),
        }
    }
}

/// Roadside decoration tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneryConfig {
    /// Objects drawn per shoulder strip, inclusive range.
    pub objects_min: u32,
    pub objects_max: u32,
    pub tree_probability: f32,
    pub rock_probability: f32,
    /// Half-width of the lateral band no decoration may enter. Defaults to
    /// the drivable half-width.
    pub lateral_keepout: Option<f32>,
    /// Lateral resample attempts before an object is skipped.
    pub max_resample_attempts: u32,
    /// Trees stay within this longitudinal span around the tile centre.
    pub tree_spread: f32,
    pub tree_scale: f32,
    /// Trees scale by `tree_scale * (1 + u * tree_scale_jitter)`.
    pub tree_scale_jitter: f32,
    /// Total yaw spread for trees, in radians.
    pub tree_yaw_jitter: f32,
    pub rock_scale_min: f32,
    pub rock_scale_max: f32,
    /// Side of the square a grass patch spreads over.
    pub grass_patch_size: f32,
    pub grass_blades_max: u32,
    pub grass_scale_min: f32,
    pub grass_scale_max: f32,
}

impl Default for SceneryConfig {
    fn default() -> Self {
        Self {
            objects_min: 2,
            objects_max: 4,
            tree_probability: 0.1,
            rock_probability: 0.4,
            lateral_keepout: None,
            max_resample_attempts: 8,
            tree_spread: 10.0,
            tree_scale: 0.03,
            tree_scale_jitter: 0.4,
            tree_yaw_jitter: 0.3,
            rock_scale_min: 0.1,
            rock_scale_max: 0.5,
            grass_patch_size: 20.0,
            grass_blades_max: 4,
            grass_scale_min: 0.3,
            grass_scale_max: 0.6,
        }
    }
}

impl StreamConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&yaml)
    }

    /// Distance between the positions of consecutive tiles.
    pub fn spacing(&self) -> f32 {
        self.tile_length - self.overlap_length
    }

    /// Heads below this position are evicted.
    pub fn eviction_cutoff(&self) -> f32 {
        -self.tile_length * self.eviction_margin
    }

    /// A tile is appended while the tail sits below this position.
    pub fn extension_threshold(&self) -> f32 {
        self.tile_length * (self.visible_segments as f32 - 1.0)
    }

    /// Length of road covered by the window at rest.
    pub fn visible_span(&self) -> f32 {
        self.tile_length * self.visible_segments as f32
    }

    pub fn drivable_half_width(&self) -> f32 {
        self.road_width / 2.0
    }

    /// Lateral centre of shoulder band `band` (1-based) on the positive side.
    pub fn shoulder_offset(&self, band: u32) -> f32 {
        self.drivable_half_width() + self.shoulder_width * band as f32 - self.shoulder_width / 2.0
    }

    /// Outer lateral edge of the outermost shoulder.
    pub fn outer_edge(&self) -> f32 {
        self.drivable_half_width() + self.shoulder_width * self.shoulder_bands as f32
    }

    pub fn lateral_keepout(&self) -> f32 {
        self.scenery
            .lateral_keepout
            .unwrap_or_else(|| self.drivable_half_width())
    }

    /// Reject configurations the window cannot run with. Called before any
    /// segment exists.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("tile_length", self.tile_length)?;
        positive("road_width", self.road_width)?;
        positive("road_thickness", self.road_thickness)?;
        positive("shoulder_width", self.shoulder_width)?;
        finite("shoulder_height", self.shoulder_height)?;
        if !(self.overlap_length >= 0.0 && self.overlap_length < self.tile_length) {
            return Err(ConfigError::Overlap {
                overlap: self.overlap_length,
                tile: self.tile_length,
            });
        }
        if self.visible_segments < 1 {
            return Err(ConfigError::TooSmall {
                field: "visible_segments",
                min: 1,
            });
        }
        if self.shoulder_bands < 1 {
            return Err(ConfigError::TooSmall {
                field: "shoulder_bands",
                min: 1,
            });
        }
        if !(self.eviction_margin >= 0.5 && self.eviction_margin.is_finite()) {
            return Err(ConfigError::EvictionMargin(self.eviction_margin));
        }
        self.validate_scenery()
    }

    fn validate_scenery(&self) -> Result<(), ConfigError> {
        let s = &self.scenery;
        if s.max_resample_attempts < 1 {
            return Err(ConfigError::TooSmall {
                field: "max_resample_attempts",
                min: 1,
            });
        }
        range("objects", s.objects_min as f32, s.objects_max as f32)?;
        probability("tree_probability", s.tree_probability)?;
        probability("rock_probability", s.rock_probability)?;
        let sum = s.tree_probability + s.rock_probability;
        if sum > 1.0 {
            return Err(ConfigError::ProbabilitySum(sum));
        }

        let keepout = self.lateral_keepout();
        let (min, max) = (self.drivable_half_width(), self.outer_edge());
        if !(keepout >= min && keepout < max) {
            return Err(ConfigError::Keepout { keepout, min, max });
        }

        if !(s.tree_spread >= 0.0 && s.tree_spread <= self.tile_length) {
            return Err(ConfigError::TreeSpread {
                spread: s.tree_spread,
                tile: self.tile_length,
            });
        }
        positive("tree_scale", s.tree_scale)?;
        non_negative("tree_scale_jitter", s.tree_scale_jitter)?;
        non_negative("tree_yaw_jitter", s.tree_yaw_jitter)?;
        positive("rock_scale_min", s.rock_scale_min)?;
        range("rock_scale", s.rock_scale_min, s.rock_scale_max)?;
        positive("grass_patch_size", s.grass_patch_size)?;
        positive("grass_scale_min", s.grass_scale_min)?;
        range("grass_scale", s.grass_scale_min, s.grass_scale_max)?;
        Ok(())
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    // Written so NaN fails too.
    if !(value > 0.0 && value.is_finite()) {
        return Err(ConfigError::NonPositive { field, value });
    }
    Ok(())
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if !(value >= 0.0 && value.is_finite()) {
        return Err(ConfigError::Negative { field, value });
    }
    Ok(())
}

fn finite(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if !value.is_finite() {
        return Err(ConfigError::NotFinite { field, value });
    }
    Ok(())
}

fn probability(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::Probability { field, value });
    }
    Ok(())
}

fn range(field: &'static str, min: f32, max: f32) -> Result<(), ConfigError> {
    finite(field, min)?;
    finite(field, max)?;
    if !(min <= max) {
        return Err(ConfigError::Range { field, min, max });
    }
    Ok(())
}
