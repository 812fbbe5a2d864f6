//! Rising and setting (AC/DC) curves
//!
//! At latitude φ a body of declination δ crosses the horizon at hour angle
//! ±H with
//!
//! ```text
//! cos H = -tan φ · tan δ
//! ```
//!
//! and is circumpolar or never rises where |cos H| > 1. The rising point
//! lies at geographic longitude α − H − θ and the setting point at
//! α + H − θ (θ = Greenwich sidereal time).
//!
//! Rising anchors run south to north and setting anchors north to south,
//! sharing the northernmost point, so one fit yields a single continuous
//! AC+DC curve.

use super::{LineFeature, LineKind, LinePath, SegmentLabel};
use crate::config::{CartographyConfig, FitDensity};
use crate::constants::DEG2RAD;
use crate::coordinates::{normalize_longitude, GeoPoint};
use crate::curves::{CurveFitter, DatelineSegmenter};
use crate::ephemeris::Body;
use crate::{CartographyError, Result};
use log::{debug, trace};

/// Anchor path of a horizon curve before fitting
#[derive(Debug, Clone, PartialEq)]
pub struct HorizonAnchors {
    /// Rising branch ascending in latitude, then setting branch descending
    pub points: Vec<GeoPoint>,
    /// Index of the last rising anchor (the shared northern turn)
    pub join: usize,
    /// Number of latitudes at which the body crosses the horizon
    pub visible: usize,
}

/// Builds AC/DC curves from declination, right ascension and sidereal time
#[derive(Debug, Clone)]
pub struct HorizonLineGenerator {
    density: FitDensity,
    fitter: CurveFitter,
    segmenter: DatelineSegmenter,
}

impl Default for HorizonLineGenerator {
    fn default() -> Self {
        Self::from_config(&CartographyConfig::default())
    }
}

impl HorizonLineGenerator {
    pub fn new(density: FitDensity, segmenter: DatelineSegmenter) -> Self {
        Self {
            density,
            fitter: CurveFitter::default(),
            segmenter,
        }
    }

    pub fn from_config(config: &CartographyConfig) -> Self {
        Self::new(
            config.horizon.density,
            DatelineSegmenter::new(config.segmentation.max_jump_deg),
        )
    }

    /// Horizon anchors over `latitudes`, or `None` if the body never crosses
    pub fn anchors(
        declination: f64,
        right_ascension: f64,
        sidereal_time_deg: f64,
        latitudes: &[f64],
    ) -> Result<Option<HorizonAnchors>> {
        if !declination.is_finite() || declination.abs() > 90.0 {
            return Err(CartographyError::InvalidInput(format!(
                "declination must lie in [-90, 90], got {}",
                declination
            )));
        }
        if !(right_ascension.is_finite() && sidereal_time_deg.is_finite()) {
            return Err(CartographyError::InvalidInput(
                "right ascension and sidereal time must be finite".to_string(),
            ));
        }
        if latitudes.is_empty() {
            return Err(CartographyError::InvalidInput(
                "latitude grid is empty".to_string(),
            ));
        }

        let tan_dec = (declination * DEG2RAD).tan();
        let mut visible: Vec<(f64, f64)> = latitudes
            .iter()
            .filter_map(|&lat| {
                let cos_h = -(lat * DEG2RAD).tan() * tan_dec;
                if !cos_h.is_finite() {
                    trace!("skipping latitude {}: cos H undefined", lat);
                    return None;
                }
                (cos_h.abs() <= 1.0).then(|| (lat, cos_h.acos().to_degrees()))
            })
            .collect();

        if visible.is_empty() {
            return Ok(None);
        }
        visible.sort_by(|a, b| a.0.total_cmp(&b.0));
        visible.dedup_by(|a, b| a.0 == b.0);

        let base = right_ascension - sidereal_time_deg;
        let rising = visible
            .iter()
            .map(|&(lat, h)| GeoPoint::new(normalize_longitude(base - h), lat));
        let setting = visible
            .iter()
            .rev()
            .skip(1)
            .map(|&(lat, h)| GeoPoint::new(normalize_longitude(base + h), lat));

        let points: Vec<GeoPoint> = rising.chain(setting).collect();
        Ok(Some(HorizonAnchors {
            points,
            join: visible.len() - 1,
            visible: visible.len(),
        }))
    }

    /// Fitted, segmented and labelled AC/DC curve for `body`
    ///
    /// `Ok(None)` means the body does not cross the horizon anywhere on the
    /// grid, which is an expected outcome.
    pub fn generate(
        &self,
        body: Body,
        declination: f64,
        right_ascension: f64,
        sidereal_time_deg: f64,
        latitudes: &[f64],
    ) -> Result<Option<LineFeature>> {
        let Some(anchors) =
            Self::anchors(declination, right_ascension, sidereal_time_deg, latitudes)?
        else {
            debug!("{}: horizon not crossed at any sampled latitude", body);
            return Ok(None);
        };

        let density = self.density.resolve(anchors.points.len());
        let fitted = self.fitter.fit_curve(&anchors.points, density);
        let total = fitted.points.len();
        if total == 0 {
            return Ok(None);
        }

        let join = fitted.output_index(anchors.join).unwrap_or(0);
        let mut segments = vec![SegmentLabel {
            kind: LineKind::Ac,
            start: 0,
            end: join,
        }];
        if join + 1 < total {
            segments.push(SegmentLabel {
                kind: LineKind::Dc,
                start: join + 1,
                end: total - 1,
            });
        }

        let paths: Vec<LinePath> = self
            .segmenter
            .ranges(&fitted.points)
            .into_iter()
            .map(|r| LinePath::new(r.start, fitted.points[r].to_vec()))
            .collect();
        if paths.is_empty() {
            debug!("{}: no horizon segment survived segmentation", body);
            return Ok(None);
        }

        trace!(
            "{}: {} visible latitudes, {} points in {} paths",
            body,
            anchors.visible,
            total,
            paths.len()
        );
        Ok(Some(
            LineFeature::new(body, LineKind::Horizon, paths).with_segments(segments),
        ))
    }
}
