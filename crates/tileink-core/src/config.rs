//! Engine tunables.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from loading a [`FillConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: &'static str },
}

/// Tunables for rasterized fill discovery and vector reconstruction.
///
/// Lengths suffixed `_px` are raster pixels; margins are tile-local units
/// multiplied by [`FillConfig::render_scale`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FillConfig {
    /// Device pixel ratio of the host surface (part of the cache key).
    pub render_scale: f64,
    /// Longest raster dimension targeted by the fill raster.
    pub raster_target_px: f64,
    /// Longest raster dimension targeted by the ink-only closure raster.
    pub closure_target_px: f64,
    /// Lower bound of the adaptive raster scale factor.
    pub min_raster_scale: f64,
    /// Upper bound of the adaptive raster scale factor.
    pub max_raster_scale: f64,
    /// Margin around the tile polygon, in local units before `render_scale`.
    pub tile_margin: f64,
    /// Margin around seed and ink for the closure raster.
    pub closure_margin: f64,
    /// Stroke width used when painting walls.
    pub stroke_width_px: f32,
    /// Extra width painted on the coded raster so every wall pixel carries a code.
    pub code_stroke_pad_px: f32,
    /// Channel value below which a painted pixel is a wall.
    pub wall_threshold: u8,
    /// Dilation passes into non-wall pixels.
    pub dilate_iterations: usize,
    /// Extra dilation passes into tile-boundary pixels when the fill touches the tile edge.
    pub tile_seam_iterations: usize,
    /// Minimum perpendicular probe offset, in local units before `render_scale`.
    pub probe_min_offset: f64,
    /// Probe offset as a fraction of the tile side.
    pub probe_side_fraction: f64,
    /// Multipliers applied to the probe offset, tried in order.
    pub probe_multipliers: Vec<f64>,
    /// Vertices are merged on a grid of `1 / vertex_quantization`.
    pub vertex_quantization: f64,
    /// Hit-test tolerance for ink deletion, in local units before `render_scale`.
    pub ink_hit_tolerance: f64,
}

impl Default for FillConfig {
    fn default() -> Self {
        Self {
            render_scale: 1.0,
            raster_target_px: 900.0,
            closure_target_px: 700.0,
            min_raster_scale: 1.0,
            max_raster_scale: 3.2,
            tile_margin: 12.0,
            closure_margin: 18.0,
            stroke_width_px: 1.15,
            code_stroke_pad_px: 2.0,
            wall_threshold: 170,
            dilate_iterations: 2,
            tile_seam_iterations: 4,
            probe_min_offset: 0.8,
            probe_side_fraction: 0.0025,
            probe_multipliers: vec![1.0, 2.0, 4.0],
            vertex_quantization: 10_000.0,
            ink_hit_tolerance: 10.0,
        }
    }
}

impl FillConfig {
    /// Parse a config from JSON; missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the raster and probe code cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("render_scale", self.render_scale),
            ("raster_target_px", self.raster_target_px),
            ("closure_target_px", self.closure_target_px),
            ("min_raster_scale", self.min_raster_scale),
            ("max_raster_scale", self.max_raster_scale),
            ("stroke_width_px", f64::from(self.stroke_width_px)),
            ("vertex_quantization", self.vertex_quantization),
        ];
        for (field, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::Invalid {
                    field,
                    reason: "must be finite and positive",
                });
            }
        }
        let non_negative = [
            ("tile_margin", self.tile_margin),
            ("closure_margin", self.closure_margin),
            ("code_stroke_pad_px", f64::from(self.code_stroke_pad_px)),
            ("probe_min_offset", self.probe_min_offset),
            ("probe_side_fraction", self.probe_side_fraction),
            ("ink_hit_tolerance", self.ink_hit_tolerance),
        ];
        for (field, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid {
                    field,
                    reason: "must be finite and non-negative",
                });
            }
        }
        if self.min_raster_scale > self.max_raster_scale {
            return Err(ConfigError::Invalid {
                field: "min_raster_scale",
                reason: "must not exceed max_raster_scale",
            });
        }
        if self.probe_multipliers.is_empty() || self.probe_multipliers.iter().any(|m| !m.is_finite() || *m <= 0.0) {
            return Err(ConfigError::Invalid {
                field: "probe_multipliers",
                reason: "must be a non-empty list of positive numbers",
            });
        }
        Ok(())
    }

    /// Adaptive raster scale for a local extent of `width × height`.
    ///
    /// Bounds are applied as max-then-min so a config that skipped
    /// [`validate`](Self::validate) cannot panic here.
    pub fn raster_scale(&self, width: f64, height: f64, target_px: f64) -> f64 {
        let s = (target_px / width.max(1.0)).min(target_px / height.max(1.0));
        s.max(self.min_raster_scale).min(self.max_raster_scale)
    }

    /// Base perpendicular probe offset for a tile of the given side.
    pub fn probe_offset(&self, tile_side: f64) -> f64 {
        (self.probe_min_offset * self.render_scale).max(tile_side * self.probe_side_fraction)
    }
}
