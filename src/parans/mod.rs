//! Paran detection
//!
//! A paran is a latitude where one body's rising or setting line crosses a
//! different body's culmination line: at that latitude both events happen
//! at the same moment. Crossings are found by brute-force planar segment
//! intersection of downsampled lines, restricted to an operational
//! latitude band where horizon geometry is numerically stable.
//!
//! ```rust
//! use astrocarto::lines::{LineId, LineKind};
//! use astrocarto::{Body, GeoPoint, ParanFinder};
//! use std::collections::BTreeMap;
//!
//! let mut lines = BTreeMap::new();
//! lines.insert(
//!     LineId::new(Body::Sun, LineKind::Ac),
//!     vec![vec![GeoPoint::new(0.0, 10.0), GeoPoint::new(20.0, 50.0)]],
//! );
//! lines.insert(
//!     LineId::new(Body::Moon, LineKind::Mc),
//!     vec![vec![GeoPoint::new(10.0, -85.0), GeoPoint::new(10.0, 85.0)]],
//! );
//!
//! let parans = ParanFinder::default().find(&lines);
//! assert_eq!(parans.len(), 1);
//! assert!((parans[0].latitude - 30.0).abs() < 1e-9);
//! ```

pub mod intersect;

pub use intersect::{segment_intersection, Crossing, Segment};

use crate::constants::{PARAN_LATITUDE_BAND_DEG, PARAN_POINT_BUDGET};
use crate::coordinates::{latitude_range, GeoPoint};
use crate::ephemeris::Body;
use crate::lines::{LineFeature, LineId};
use crate::{CartographyError, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Parameters within 1e-12 of a segment end count as that end
const END_EPS: f64 = 1e-12;

/// Paran search settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParanConfig {
    /// Crossings beyond ±band are ignored
    pub latitude_band_deg: f64,
    /// Approximate number of points kept per line before scanning
    pub point_budget: usize,
    /// Longitude spacing of the drawn paran latitude line
    pub line_spacing_deg: f64,
    /// Bodies taking part; `None` means Sun through Pluto plus Chiron
    pub bodies: Option<Vec<Body>>,
}

impl Default for ParanConfig {
    fn default() -> Self {
        Self {
            latitude_band_deg: PARAN_LATITUDE_BAND_DEG,
            point_budget: PARAN_POINT_BUDGET,
            line_spacing_deg: 1.0,
            bodies: None,
        }
    }
}

impl ParanConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.latitude_band_deg > 0.0 && self.latitude_band_deg <= 90.0) {
            return Err(CartographyError::Config(format!(
                "paran latitude band must lie in (0, 90], got {}",
                self.latitude_band_deg
            )));
        }
        if self.point_budget < 2 {
            return Err(CartographyError::Config(
                "paran point budget must be at least 2".to_string(),
            ));
        }
        if !(self.line_spacing_deg > 0.0 && self.line_spacing_deg <= 360.0) {
            return Err(CartographyError::Config(format!(
                "paran line spacing must lie in (0, 360], got {}",
                self.line_spacing_deg
            )));
        }
        Ok(())
    }

    /// Whether `body` takes part in paran detection
    pub fn allows(&self, body: Body) -> bool {
        match &self.bodies {
            Some(bodies) => bodies.contains(&body),
            None => body.is_major(),
        }
    }
}

/// A paran latitude
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParanFeature {
    pub latitude: f64,
    /// Longitude of the crossing itself
    pub longitude: f64,
    /// Rising/setting line first, culmination line second
    pub lines: [LineId; 2],
    pub label: String,
}

impl ParanFeature {
    fn new(latitude: f64, longitude: f64, rise_set: LineId, culmination: LineId) -> Self {
        Self {
            latitude,
            longitude,
            lines: [rise_set, culmination],
            label: format!("{} crossing {}", rise_set, culmination),
        }
    }

    /// Constant-latitude line from -180 to 180 at `spacing_deg`
    pub fn path(&self, spacing_deg: f64) -> Vec<GeoPoint> {
        if !(spacing_deg > 0.0) {
            return vec![
                GeoPoint::new(-180.0, self.latitude),
                GeoPoint::new(180.0, self.latitude),
            ];
        }
        let steps = (360.0 / spacing_deg + 1e-9).floor() as usize;
        let mut path: Vec<GeoPoint> = (0..=steps)
            .map(|k| GeoPoint::new(-180.0 + k as f64 * spacing_deg, self.latitude))
            .collect();
        if path.last().map_or(true, |p| p.lon < 180.0 - 1e-9) {
            path.push(GeoPoint::new(180.0, self.latitude));
        }
        path
    }

    /// `"<Body>_<KIND>"` identifiers of both lines
    pub fn source_names(&self) -> [String; 2] {
        self.lines
            .map(|id| format!("{}_{}", id.body.name(), id.kind.as_str()))
    }
}

/// Downsampled line ready for scanning
struct Prepared {
    paths: Vec<Vec<GeoPoint>>,
    lat_min: f64,
    lat_max: f64,
}

/// Finds crossings between rising/setting and culmination lines
#[derive(Debug, Clone, Default)]
pub struct ParanFinder {
    config: ParanConfig,
}

impl ParanFinder {
    pub fn new(config: ParanConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ParanConfig {
        &self.config
    }

    /// Parans among the given lines
    ///
    /// Only AC/DC lines of one body against MC/IC lines of another are
    /// compared. Lines of any other kind are ignored. Each crossing inside
    /// the latitude band becomes one [`ParanFeature`]; a pair may cross
    /// more than once.
    pub fn find(&self, lines: &BTreeMap<LineId, Vec<Vec<GeoPoint>>>) -> Vec<ParanFeature> {
        let budget = self.config.point_budget;
        let prepared: BTreeMap<LineId, Prepared> = lines
            .iter()
            .filter(|(id, _)| id.kind.is_rise_set() || id.kind.is_culmination())
            .filter_map(|(id, paths)| prepare(paths, budget).map(|p| (*id, p)))
            .collect();

        let band = self.config.latitude_band_deg;
        let mut pair_count = 0usize;
        let mut segment_pairs = 0usize;
        let mut out = Vec::new();

        let rise_set = prepared.iter().filter(|(id, _)| id.kind.is_rise_set());
        for (id_a, a) in rise_set {
            let culmination = prepared.iter().filter(|(id, _)| id.kind.is_culmination());
            for (id_b, b) in culmination {
                if id_a.body == id_b.body {
                    continue;
                }
                let lo = a.lat_min.max(b.lat_min).max(-band);
                let hi = a.lat_max.min(b.lat_max).min(band);
                if lo > hi {
                    continue;
                }
                pair_count += 1;

                for path_a in &a.paths {
                    for path_b in &b.paths {
                        segment_pairs += (path_a.len() - 1) * (path_b.len() - 1);
                        for crossing in path_crossings(path_a, path_b) {
                            let lat = crossing.point.y;
                            if lat.abs() > band {
                                continue;
                            }
                            out.push(ParanFeature::new(
                                lat.clamp(-band, band),
                                crossing.point.x,
                                *id_a,
                                *id_b,
                            ));
                        }
                    }
                }
            }
        }

        debug!(
            "parans: {} line pairs, {} segment pairs, {} crossings",
            pair_count,
            segment_pairs,
            out.len()
        );
        out
    }

    /// Parans among generated line features
    ///
    /// Horizon curves are split into their AC and DC parts and bodies the
    /// configuration excludes are left out.
    pub fn find_in_features(&self, features: &[LineFeature]) -> Vec<ParanFeature> {
        let mut lines: BTreeMap<LineId, Vec<Vec<GeoPoint>>> = BTreeMap::new();
        for feature in features.iter().filter(|f| self.config.allows(f.body)) {
            for (id, paths) in feature.resolved() {
                if id.kind.is_rise_set() || id.kind.is_culmination() {
                    lines.entry(id).or_default().extend(paths);
                }
            }
        }
        self.find(&lines)
    }
}

/// Downsample each path with a shared stride, keeping every path's last point
fn prepare(paths: &[Vec<GeoPoint>], budget: usize) -> Option<Prepared> {
    let total: usize = paths.iter().map(Vec::len).sum();
    let stride = (total / budget.max(1)).max(1);

    let sampled: Vec<Vec<GeoPoint>> = paths
        .iter()
        .filter(|p| p.len() >= 2)
        .map(|p| {
            let mut kept: Vec<GeoPoint> = p.iter().step_by(stride).copied().collect();
            if (p.len() - 1) % stride != 0 {
                kept.push(p[p.len() - 1]);
            }
            kept
        })
        .collect();

    let all: Vec<GeoPoint> = sampled.iter().flatten().copied().collect();
    let (lat_min, lat_max) = latitude_range(&all)?;
    Some(Prepared {
        paths: sampled,
        lat_min,
        lat_max,
    })
}

/// Crossings between two polylines
///
/// Segments are treated as half-open so a crossing exactly at a shared
/// vertex is reported once; the final segment of each path keeps its end.
fn path_crossings(a: &[GeoPoint], b: &[GeoPoint]) -> Vec<Crossing> {
    let last_a = a.len() - 2;
    let last_b = b.len() - 2;
    let mut out = Vec::new();
    for (i, wa) in a.windows(2).enumerate() {
        let seg_a = Segment::from_geo(&wa[0], &wa[1]);
        for (j, wb) in b.windows(2).enumerate() {
            let seg_b = Segment::from_geo(&wb[0], &wb[1]);
            if !seg_a.bounds_overlap(&seg_b) {
                continue;
            }
            let Some(hit) = segment_intersection(&seg_a, &seg_b) else {
                continue;
            };
            if (hit.t > 1.0 - END_EPS && i != last_a) || (hit.s > 1.0 - END_EPS && j != last_b) {
                continue;
            }
            out.push(hit);
        }
    }
    out
}
