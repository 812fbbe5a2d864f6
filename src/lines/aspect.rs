//! Aspect lines to the Midheaven and the Ascendant
//!
//! An aspect line is the locus where the local MC (or ASC) sits at ecliptic
//! longitude `λ_body − offset`.
//!
//! MC-relative lines are meridians: the MC depends only on local sidereal
//! time, so the target is inverted in closed form
//! (`θ = atan2(sin λ · cos ε, cos λ)`) and the line is drawn at θ − GST.
//!
//! ASC-relative lines have no closed form. For each latitude the longitude
//! whose Ascendant hits the target is found numerically with
//! [`RootSolver`], seeded with the previous latitude's solution, and the
//! solutions are fitted and segmented like horizon curves.

use super::{Aspect, AspectTarget, LineFeature, LineKind, LinePath};
use crate::config::{AspectConfig, CartographyConfig};
use crate::coordinates::{
    angular_difference, max_longitude_step, normalize_degrees, normalize_longitude, GeoPoint,
};
use crate::curves::{CurveFitter, DatelineSegmenter};
use crate::ephemeris::angles::sidereal_time_for_midheaven_deg;
use crate::ephemeris::Body;
use crate::solver::RootSolver;
use crate::{CartographyError, Result};
use log::{debug, trace};
use std::ops::Range;

/// Generates MC- and ASC-relative aspect lines
#[derive(Debug, Clone)]
pub struct AspectLineGenerator {
    config: AspectConfig,
    solver: RootSolver,
    fitter: CurveFitter,
    segmenter: DatelineSegmenter,
}

impl Default for AspectLineGenerator {
    fn default() -> Self {
        Self::from_config(&CartographyConfig::default())
    }
}

impl AspectLineGenerator {
    pub fn new(config: AspectConfig, solver: RootSolver, segmenter: DatelineSegmenter) -> Self {
        Self {
            config,
            solver,
            fitter: CurveFitter::default(),
            segmenter,
        }
    }

    pub fn from_config(config: &CartographyConfig) -> Self {
        Self::new(
            config.aspects.clone(),
            RootSolver::new(config.solver.clone()),
            DatelineSegmenter::new(config.segmentation.max_jump_deg),
        )
    }

    /// Configured aspects towards `target`, in configuration order
    pub fn aspects(&self, target: AspectTarget) -> Result<Vec<Aspect>> {
        self.config
            .offsets
            .iter()
            .map(|&offset| Aspect::new(offset, target))
            .collect()
    }

    /// Geographic longitude whose MC lies at `target_longitude`
    pub fn midheaven_meridian(
        target_longitude: f64,
        obliquity_rad: f64,
        sidereal_time_deg: f64,
    ) -> f64 {
        let lst = sidereal_time_for_midheaven_deg(target_longitude, obliquity_rad);
        normalize_longitude(lst - sidereal_time_deg)
    }

    /// One MC-relative aspect meridian
    pub fn mc_line(
        &self,
        body: Body,
        ecliptic_longitude: f64,
        aspect: Aspect,
        obliquity_rad: f64,
        sidereal_time_deg: f64,
    ) -> Result<LineFeature> {
        if !(ecliptic_longitude.is_finite()
            && obliquity_rad.is_finite()
            && sidereal_time_deg.is_finite())
        {
            return Err(CartographyError::InvalidInput(format!(
                "{}: non-finite aspect inputs",
                body
            )));
        }
        let target = normalize_degrees(ecliptic_longitude - f64::from(aspect.offset));
        let lon = Self::midheaven_meridian(target, obliquity_rad, sidereal_time_deg);
        let extent = self.config.meridian_extent_deg;
        let path = LinePath::new(
            0,
            vec![GeoPoint::new(lon, -extent), GeoPoint::new(lon, extent)],
        );
        Ok(LineFeature::new(body, LineKind::Aspect, vec![path]).with_aspect(Aspect {
            target: AspectTarget::Mc,
            ..aspect
        }))
    }

    /// Every configured MC-relative aspect meridian for `body`
    pub fn mc_lines(
        &self,
        body: Body,
        ecliptic_longitude: f64,
        obliquity_rad: f64,
        sidereal_time_deg: f64,
    ) -> Result<Vec<LineFeature>> {
        self.aspects(AspectTarget::Mc)?
            .into_iter()
            .map(|aspect| {
                self.mc_line(
                    body,
                    ecliptic_longitude,
                    aspect,
                    obliquity_rad,
                    sidereal_time_deg,
                )
            })
            .collect()
    }

    /// Solved `(longitude, latitude)` anchors of an ASC-relative line
    ///
    /// `ascendant(latitude, longitude)` returns the Ascendant's ecliptic
    /// longitude; failures only remove the affected candidate. Latitudes
    /// without a root are skipped. Anchors are returned sorted by latitude.
    pub fn asc_anchors<F>(
        &self,
        ecliptic_longitude: f64,
        offset: i32,
        latitudes: &[f64],
        mut ascendant: F,
    ) -> Vec<GeoPoint>
    where
        F: FnMut(f64, f64) -> Result<f64>,
    {
        let target = normalize_degrees(ecliptic_longitude - f64::from(offset));
        let mut anchors = Vec::with_capacity(latitudes.len());
        let mut previous: Option<f64> = None;

        for &lat in latitudes {
            let residual = |lon: f64| match ascendant(lat, lon) {
                Ok(asc) if asc.is_finite() => Some(angular_difference(asc, target)),
                Ok(_) => None,
                Err(err) => {
                    trace!("ascendant failed at ({}, {}): {}", lat, lon, err);
                    None
                }
            };
            match self.solver.solve(residual, previous) {
                Some(root) => {
                    let lon = normalize_longitude(root.x);
                    anchors.push(GeoPoint::new(lon, lat));
                    previous = Some(lon);
                }
                None => {
                    trace!("no ascendant root at latitude {}", lat);
                    previous = None;
                }
            }
        }

        anchors.sort_by(|a, b| a.lat.total_cmp(&b.lat));
        anchors
    }

    /// One ASC-relative aspect line, or `None` if fewer than two latitudes solve
    pub fn asc_line<F>(
        &self,
        body: Body,
        ecliptic_longitude: f64,
        aspect: Aspect,
        latitudes: &[f64],
        ascendant: F,
    ) -> Result<Option<LineFeature>>
    where
        F: FnMut(f64, f64) -> Result<f64>,
    {
        if !ecliptic_longitude.is_finite() {
            return Err(CartographyError::InvalidInput(format!(
                "{}: non-finite ecliptic longitude",
                body
            )));
        }
        let aspect = Aspect {
            target: AspectTarget::Asc,
            ..aspect
        };

        let anchors = self.asc_anchors(ecliptic_longitude, aspect.offset, latitudes, ascendant);
        if anchors.len() < 2 {
            debug!(
                "{} {} ASC: only {} solved latitudes",
                body,
                aspect.name(),
                anchors.len()
            );
            return Ok(None);
        }

        let fitted = self.fitter.fit(&anchors, self.config.density);
        let paths: Vec<LinePath> = self
            .artifact_free_ranges(&fitted)
            .into_iter()
            .map(|r| LinePath::new(r.start, fitted[r].to_vec()))
            .collect();

        if paths.is_empty() {
            debug!("{} {} ASC: every segment rejected", body, aspect.name());
            return Ok(None);
        }
        trace!(
            "{} {} ASC: {} anchors, {} paths",
            body,
            aspect.name(),
            anchors.len(),
            paths.len()
        );
        Ok(Some(
            LineFeature::new(body, LineKind::Aspect, paths).with_aspect(aspect),
        ))
    }

    /// Segments of a fitted ASC curve with branch-jump artifacts removed
    ///
    /// Stretches between antimeridian crossings that step more than
    /// `artifact_jump_deg` anywhere are dropped whole; the rest are split
    /// like any other curve.
    fn artifact_free_ranges(&self, fitted: &[GeoPoint]) -> Vec<Range<usize>> {
        let artifact = self.config.artifact_jump_deg;
        DatelineSegmenter::crossing_ranges(fitted)
            .into_iter()
            .filter(|r| {
                let step = max_longitude_step(&fitted[r.clone()]);
                if step > artifact {
                    debug!(
                        "dropping ASC stretch {:?}: {:.1} deg step exceeds {}",
                        r, step, artifact
                    );
                }
                step <= artifact
            })
            .flat_map(|r| self.segmenter.split_range(fitted, r))
            .collect()
    }

    /// Every configured ASC-relative aspect line that exists for `body`
    ///
    /// Lines with fewer than two solved latitudes are omitted and reported
    /// at debug level.
    pub fn asc_lines<F>(
        &self,
        body: Body,
        ecliptic_longitude: f64,
        latitudes: &[f64],
        mut ascendant: F,
    ) -> Result<Vec<LineFeature>>
    where
        F: FnMut(f64, f64) -> Result<f64>,
    {
        let mut lines = Vec::new();
        for aspect in self.aspects(AspectTarget::Asc)? {
            match self.asc_line(body, ecliptic_longitude, aspect, latitudes, &mut ascendant)? {
                Some(line) => lines.push(line),
                None => debug!(
                    "{} {} ASC ({:+}) omitted: no drawable curve",
                    body,
                    aspect.name(),
                    aspect.offset
                ),
            }
        }
        Ok(lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ephemeris::angles::{ascendant_longitude_deg, midheaven_longitude_deg};
    use crate::nutationlib::mean_obliquity_rad;
    use crate::solver::SolverConfig;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_mc_inversion_round_trip_without_obliquity() {
        let gst = 37.5;
        for i in 0..36 {
            let target = i as f64 * 10.0 + 3.0;
            let lon = AspectLineGenerator::midheaven_meridian(target, 0.0, gst);
            let back = midheaven_longitude_deg(gst + lon, 0.0);
            assert_abs_diff_eq!(angular_difference(back, target), 0.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_mc_inversion_round_trip_with_obliquity() {
        let eps = mean_obliquity_rad(0.2);
        let gst = 301.0;
        for i in 0..36 {
            let target = i as f64 * 10.0 + 3.0;
            let lon = AspectLineGenerator::midheaven_meridian(target, eps, gst);
            let back = midheaven_longitude_deg(gst + lon, eps);
            assert_abs_diff_eq!(angular_difference(back, target), 0.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_mc_lines_cover_all_offsets() {
        let generator = AspectLineGenerator::default();
        let lines = generator.mc_lines(Body::Venus, 45.0, 0.409, 120.0).unwrap();
        assert_eq!(lines.len(), 6);
        for line in &lines {
            let aspect = line.aspect.unwrap();
            assert_eq!(aspect.target, AspectTarget::Mc);
            let path = &line.paths[0].points;
            assert_eq!(path.len(), 2);
            assert_eq!(path[0].lon, path[1].lon);
            assert_eq!(path[0].lat, -89.9);
            assert_eq!(path[1].lat, 89.9);
        }
        let offsets: Vec<i32> = lines.iter().map(|l| l.aspect.unwrap().offset).collect();
        assert_eq!(offsets, vec![60, 90, 120, -60, -90, -120]);
    }

    #[test]
    fn test_mc_square_without_obliquity() {
        // Body at 100, square MC at 10: LST 10, geographic 10 - GST
        let generator = AspectLineGenerator::default();
        let aspect = Aspect::new(90, AspectTarget::Mc).unwrap();
        let line = generator.mc_line(Body::Sun, 100.0, aspect, 0.0, 50.0).unwrap();
        assert_abs_diff_eq!(line.paths[0].points[0].lon, -40.0, epsilon = 1e-9);
    }

    fn tight_generator() -> AspectLineGenerator {
        let config = CartographyConfig::default();
        let solver = RootSolver::new(SolverConfig {
            tolerance: 1e-6,
            residual_tolerance: 1e-6,
            max_bisections: 40,
            ..SolverConfig::default()
        });
        AspectLineGenerator::new(config.aspects, solver, DatelineSegmenter::default())
    }

    #[test]
    fn test_asc_anchors_hit_target() {
        let generator = tight_generator();
        let eps = mean_obliquity_rad(0.0);
        let gst = 75.0;
        let body_lon = 210.0;
        let lats: Vec<f64> = (-60..=60).map(|l| l as f64).collect();

        for offset in [60, -90, 120] {
            let anchors = generator.asc_anchors(body_lon, offset, &lats, |lat, lon| {
                Ok(ascendant_longitude_deg(gst + lon, eps, lat))
            });
            assert!(anchors.len() > 100, "offset {}: {} anchors", offset, anchors.len());
            let target = normalize_degrees(body_lon - offset as f64);
            for p in &anchors {
                let asc = ascendant_longitude_deg(gst + p.lon, eps, p.lat);
                assert!(
                    angular_difference(asc, target).abs() < 0.05,
                    "offset {} at {:?}: asc {}",
                    offset,
                    p,
                    asc
                );
            }
        }
    }

    #[test]
    fn test_default_solver_anchors_hit_target() {
        let generator = AspectLineGenerator::default();
        let eps = 23.44_f64.to_radians();
        let gst = 75.0;
        let lats = CartographyConfig::default().aspects.latitude_grid.values().unwrap();
        let temperate = lats.iter().filter(|l| l.abs() <= 60.0).count();

        for body_lon in [0.0, 45.0, 100.0, 210.0, 300.0] {
            for offset in [60, 90, 120, -60, -90, -120] {
                let anchors = generator.asc_anchors(body_lon, offset, &lats, |lat, lon| {
                    Ok(ascendant_longitude_deg(gst + lon, eps, lat))
                });
                let target = normalize_degrees(body_lon - offset as f64);
                for p in &anchors {
                    let asc = ascendant_longitude_deg(gst + p.lon, eps, p.lat);
                    let residual = angular_difference(asc, target).abs();
                    assert!(
                        residual <= 0.05 + 1e-9,
                        "lon {} offset {} at {:?}: residual {}",
                        body_lon,
                        offset,
                        p,
                        residual
                    );
                }
                let solved = anchors.iter().filter(|p| p.lat.abs() <= 60.0).count();
                assert_eq!(solved, temperate, "lon {} offset {}", body_lon, offset);
            }
        }
    }

    #[test]
    fn test_artifact_stretch_dropped_before_splitting() {
        let generator = AspectLineGenerator::default();
        let at = |lons: &[f64]| -> Vec<GeoPoint> {
            lons.iter()
                .enumerate()
                .map(|(i, &lon)| GeoPoint::new(lon, i as f64))
                .collect()
        };

        // 110 degree branch jump inside the first stretch, clean stretch after the crossing
        let path = at(&[0.0, 10.0, 20.0, 130.0, 140.0, 150.0, 179.0, -175.0, -170.0, -165.0]);
        assert_eq!(generator.artifact_free_ranges(&path), vec![7..10]);

        // A 60 degree step is only a split, not an artifact
        let path = at(&[0.0, 10.0, 70.0, 80.0]);
        assert_eq!(generator.artifact_free_ranges(&path), vec![0..2, 2..4]);
    }

    #[test]
    fn test_asc_line_is_segmented_and_labelled() {
        let generator = AspectLineGenerator::default();
        let eps = mean_obliquity_rad(0.0);
        let aspect = Aspect::new(-60, AspectTarget::Mc).unwrap();
        let lats: Vec<f64> = (-60..=60).map(|l| l as f64).collect();
        let line = generator
            .asc_line(Body::Mars, 33.0, aspect, &lats, |lat, lon| {
                Ok(ascendant_longitude_deg(14.0 + lon, eps, lat))
            })
            .unwrap()
            .unwrap();
        let aspect = line.aspect.unwrap();
        assert_eq!(aspect.target, AspectTarget::Asc);
        assert_eq!(line.label(), "Mars sextile ASC");
        for path in &line.paths {
            assert!(path.points.len() >= 2);
            for w in path.points.windows(2) {
                assert!((w[1].lon - w[0].lon).abs() <= 45.0);
            }
        }
    }

    #[test]
    fn test_asc_line_absent_when_unsolvable() {
        let generator = AspectLineGenerator::default();
        let aspect = Aspect::new(90, AspectTarget::Asc).unwrap();
        let lats = [0.0, 10.0, 20.0];
        let line = generator
            .asc_line(Body::Moon, 0.0, aspect, &lats, |_, _| {
                Err(CartographyError::Ephemeris("offline".to_string()))
            })
            .unwrap();
        assert!(line.is_none());
    }

    #[test]
    fn test_unsolvable_asc_lines_are_omitted() {
        let generator = AspectLineGenerator::default();
        let lines = generator
            .asc_lines(Body::Moon, 0.0, &[0.0, 10.0, 20.0], |_, _| {
                Err(CartographyError::Ephemeris("offline".to_string()))
            })
            .unwrap();
        assert!(lines.is_empty());
    }

    #[test]
    fn test_asc_lines_skip_failed_samples() {
        let generator = AspectLineGenerator::default();
        let eps = mean_obliquity_rad(0.0);
        let lats: Vec<f64> = (-50..=50).map(|l| l as f64).collect();
        let mut calls = 0usize;
        let lines = generator
            .asc_lines(Body::Saturn, 280.0, &lats, |lat, lon| {
                calls += 1;
                if calls % 17 == 0 {
                    return Err(CartographyError::Ephemeris("flaky".to_string()));
                }
                Ok(ascendant_longitude_deg(200.0 + lon, eps, lat))
            })
            .unwrap();
        assert_eq!(lines.len(), 6);
    }
}
