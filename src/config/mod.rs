//! Request configuration
//!
//! Every tunable of the line pipeline lives here with the defaults the
//! numerical pipeline was tuned against. Configs deserialize from partial
//! JSON: any key left out keeps its default.
//!
//! ```rust
//! use astrocarto::CartographyConfig;
//!
//! let config = CartographyConfig::from_json_str(
//!     r#"{ "segmentation": { "max_jump_deg": 30.0 } }"#,
//! ).unwrap();
//! assert_eq!(config.segmentation.max_jump_deg, 30.0);
//! assert_eq!(config.parans.latitude_band_deg, 68.0);
//! ```

use crate::constants::{
    ASPECT_ARTIFACT_JUMP_DEG, ASPECT_CURVE_DENSITY, ASPECT_MERIDIAN_EXTENT_DEG, ASPECT_OFFSETS,
    DEFAULT_MAX_JUMP_DEG, MAX_CURVE_POINTS, MERIDIAN_EXTENT_DEG,
};
use crate::parans::ParanConfig;
use crate::solver::SolverConfig;
use crate::{CartographyError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Inclusive, ascending latitude sample grid in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatitudeGrid {
    pub start: f64,
    pub end: f64,
    pub step: f64,
}

impl LatitudeGrid {
    pub fn new(start: f64, end: f64, step: f64) -> Result<Self> {
        let grid = Self { start, end, step };
        grid.validate()?;
        Ok(grid)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.start.is_finite() && self.end.is_finite() && self.step.is_finite()) {
            return Err(CartographyError::Config(
                "latitude grid bounds must be finite".to_string(),
            ));
        }
        if self.step <= 0.0 {
            return Err(CartographyError::Config(format!(
                "latitude grid step must be positive, got {}",
                self.step
            )));
        }
        if self.start > self.end {
            return Err(CartographyError::Config(format!(
                "latitude grid start {} exceeds end {}",
                self.start, self.end
            )));
        }
        if self.start < -90.0 || self.end > 90.0 {
            return Err(CartographyError::Config(format!(
                "latitude grid [{}, {}] leaves [-90, 90]",
                self.start, self.end
            )));
        }
        let count = self.count();
        if count > MAX_CURVE_POINTS as f64 {
            return Err(CartographyError::Config(format!(
                "latitude grid step {} yields {:.0} samples, limit is {}",
                self.step, count, MAX_CURVE_POINTS
            )));
        }
        Ok(())
    }

    // Tolerance keeps `end` when (end - start) / step lands a hair under an integer
    fn count(&self) -> f64 {
        ((self.end - self.start) / self.step + 1e-9).floor() + 1.0
    }

    /// Expanded sample latitudes, ascending, both ends included
    pub fn values(&self) -> Result<Vec<f64>> {
        self.validate()?;
        let count = self.count() as usize;
        Ok((0..count)
            .map(|i| self.start + i as f64 * self.step)
            .collect())
    }
}

/// Number of points a fitted curve is resampled to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitDensity {
    /// As many output points as anchor points
    MatchAnchors,
    /// A fixed number of output points
    Points(usize),
}

impl FitDensity {
    pub fn resolve(&self, anchors: usize) -> usize {
        match *self {
            FitDensity::MatchAnchors => anchors,
            FitDensity::Points(n) => n,
        }
    }
}

/// Settings for AC/DC horizon curves
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HorizonConfig {
    pub latitude_grid: LatitudeGrid,
    pub density: FitDensity,
}

impl Default for HorizonConfig {
    fn default() -> Self {
        Self {
            latitude_grid: LatitudeGrid {
                start: -85.0,
                end: 85.0,
                step: 0.5,
            },
            density: FitDensity::MatchAnchors,
        }
    }
}

/// Settings for MC/IC meridians
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeridianConfig {
    /// Meridians run from `-extent_deg` to `+extent_deg`
    pub extent_deg: f64,
}

impl Default for MeridianConfig {
    fn default() -> Self {
        Self {
            extent_deg: MERIDIAN_EXTENT_DEG,
        }
    }
}

/// Settings for MC- and ASC-relative aspect lines
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AspectConfig {
    /// Signed offsets from the target angle, degrees
    pub offsets: Vec<i32>,
    /// Latitude samples for the ASC root-find
    pub latitude_grid: LatitudeGrid,
    /// Output points per ASC curve
    pub density: usize,
    /// ASC segments with a larger internal step are discarded
    pub artifact_jump_deg: f64,
    /// MC-relative meridians run from `-extent` to `+extent`
    pub meridian_extent_deg: f64,
}

impl Default for AspectConfig {
    fn default() -> Self {
        Self {
            offsets: ASPECT_OFFSETS.to_vec(),
            latitude_grid: LatitudeGrid {
                start: -85.0,
                end: 85.0,
                step: 0.5,
            },
            density: ASPECT_CURVE_DENSITY,
            artifact_jump_deg: ASPECT_ARTIFACT_JUMP_DEG,
            meridian_extent_deg: ASPECT_MERIDIAN_EXTENT_DEG,
        }
    }
}

/// Dateline segmentation threshold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentationConfig {
    pub max_jump_deg: f64,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            max_jump_deg: DEFAULT_MAX_JUMP_DEG,
        }
    }
}

/// Complete configuration for one request
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CartographyConfig {
    pub horizon: HorizonConfig,
    pub meridian: MeridianConfig,
    pub aspects: AspectConfig,
    pub segmentation: SegmentationConfig,
    pub solver: SolverConfig,
    pub parans: ParanConfig,
}

impl CartographyConfig {
    /// Parse a (possibly partial) JSON document
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a (possibly partial) JSON document from disk
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn with_horizon_grid(mut self, grid: LatitudeGrid) -> Self {
        self.horizon.latitude_grid = grid;
        self
    }

    pub fn with_horizon_density(mut self, density: FitDensity) -> Self {
        self.horizon.density = density;
        self
    }

    pub fn with_aspect_grid(mut self, grid: LatitudeGrid) -> Self {
        self.aspects.latitude_grid = grid;
        self
    }

    pub fn with_max_jump_deg(mut self, max_jump_deg: f64) -> Self {
        self.segmentation.max_jump_deg = max_jump_deg;
        self
    }

    pub fn with_paran_config(mut self, parans: ParanConfig) -> Self {
        self.parans = parans;
        self
    }

    /// Checks cross-field constraints the individual types cannot
    pub fn validate(&self) -> Result<()> {
        self.horizon.latitude_grid.validate()?;
        self.aspects.latitude_grid.validate()?;
        if let FitDensity::Points(n) = self.horizon.density {
            if !(2..=MAX_CURVE_POINTS).contains(&n) {
                return Err(CartographyError::Config(format!(
                    "horizon density must be in [2, {}], got {}",
                    MAX_CURVE_POINTS, n
                )));
            }
        }
        if !(2..=MAX_CURVE_POINTS).contains(&self.aspects.density) {
            return Err(CartographyError::Config(format!(
                "aspect density must be in [2, {}], got {}",
                MAX_CURVE_POINTS, self.aspects.density
            )));
        }
        if let Some(bad) = self
            .aspects
            .offsets
            .iter()
            .find(|o| ![60, 90, 120].contains(&o.abs()))
        {
            return Err(CartographyError::Config(format!(
                "unsupported aspect offset {}",
                bad
            )));
        }
        if !(self.segmentation.max_jump_deg > 0.0 && self.segmentation.max_jump_deg <= 180.0) {
            return Err(CartographyError::Config(format!(
                "max_jump_deg must lie in (0, 180], got {}",
                self.segmentation.max_jump_deg
            )));
        }
        self.solver.validate()?;
        self.parans.validate()?;
        Ok(())
    }
}
