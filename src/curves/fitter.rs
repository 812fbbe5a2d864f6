//! Arc-length parameterised curve fitting on the sphere
//!
//! Anchor points are unwrapped, parameterised by normalised cumulative
//! great-circle distance and interpolated with a cubic spline per
//! coordinate. Paths whose unwrapped longitude span exceeds the periodic
//! threshold are closed back onto their first point and fitted with
//! periodic splines. Spline failures degrade to piecewise-linear
//! interpolation over the same parameterisation; fitting never fails.

use super::spline::{linear_interpolate, Boundary, CubicSpline, SplineError};
use crate::constants::{FULL_CIRCLE_DEG, PERIODIC_SPAN_DEG};
use crate::coordinates::{great_circle_distance, normalize_longitude, unwrap_degrees, GeoPoint};
use log::{debug, trace};

/// Consecutive anchors closer than this (degrees of arc) are merged
const DUPLICATE_EPS_DEG: f64 = 1e-12;

/// Output longitudes are rounded to this step before wrapping
const OUTPUT_RESOLUTION_DEG: f64 = 1e-10;

/// Result of a fit: resampled points plus where each anchor sits on the curve
#[derive(Debug, Clone, PartialEq)]
pub struct FittedCurve {
    /// Output points, longitudes in (-180, 180], latitudes in [-90, 90]
    pub points: Vec<GeoPoint>,
    /// Curve parameter in [0, 1] of every input anchor (NaN for non-finite anchors)
    pub knots: Vec<f64>,
    /// Whether the path was closed and fitted periodically
    pub periodic: bool,
}

impl FittedCurve {
    /// Output index nearest to anchor `anchor`, if that anchor was fitted
    pub fn output_index(&self, anchor: usize) -> Option<usize> {
        let u = *self.knots.get(anchor)?;
        if !u.is_finite() || self.points.is_empty() {
            return None;
        }
        let last = self.points.len() - 1;
        Some(((u * last as f64).round() as usize).min(last))
    }
}

/// Smooth curve fitting through ordered anchor points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveFitter {
    periodic_span_deg: f64,
}

impl Default for CurveFitter {
    fn default() -> Self {
        Self {
            periodic_span_deg: PERIODIC_SPAN_DEG,
        }
    }
}

/// Unwrapped anchors with their curve parameters
struct Parameterised {
    u: Vec<f64>,
    lon: Vec<f64>,
    lat: Vec<f64>,
    /// Parameter per finite input anchor
    anchor_u: Vec<f64>,
    periodic: bool,
}

impl CurveFitter {
    /// Create a fitter with a custom periodic-closure threshold
    pub fn new(periodic_span_deg: f64) -> Self {
        Self { periodic_span_deg }
    }

    /// Fit `points` and resample to exactly `density` points
    ///
    /// Fewer than two points are returned unchanged.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use astrocarto::curves::CurveFitter;
    /// use astrocarto::GeoPoint;
    ///
    /// let anchors = vec![
    ///     GeoPoint::new(170.0, 0.0),
    ///     GeoPoint::new(178.0, 5.0),
    ///     GeoPoint::new(-174.0, 10.0),
    ///     GeoPoint::new(-166.0, 15.0),
    /// ];
    /// let dense = CurveFitter::default().fit(&anchors, 50);
    /// assert_eq!(dense.len(), 50);
    /// assert!(dense.iter().all(|p| p.lon > -180.0 && p.lon <= 180.0));
    /// ```
    pub fn fit(&self, points: &[GeoPoint], density: usize) -> Vec<GeoPoint> {
        self.fit_curve(points, density).points
    }

    /// Like [`fit`](Self::fit), also reporting anchor parameters
    pub fn fit_curve(&self, points: &[GeoPoint], density: usize) -> FittedCurve {
        if points.len() < 2 {
            return FittedCurve {
                points: points.to_vec(),
                knots: vec![0.0; points.len()],
                periodic: false,
            };
        }

        let finite: Vec<usize> = (0..points.len())
            .filter(|&i| points[i].is_finite())
            .collect();
        if finite.len() < points.len() {
            debug!(
                "dropping {} non-finite anchors before fitting",
                points.len() - finite.len()
            );
        }
        if finite.len() < 2 {
            let mut knots = vec![f64::NAN; points.len()];
            for &i in &finite {
                knots[i] = 0.0;
            }
            return FittedCurve {
                points: finite.iter().map(|&i| points[i]).collect(),
                knots,
                periodic: false,
            };
        }

        let anchors: Vec<GeoPoint> = finite.iter().map(|&i| points[i]).collect();
        let param = self.parameterise(&anchors);

        let samples: Vec<f64> = match density {
            0 => Vec::new(),
            1 => vec![0.0],
            n => (0..n).map(|k| k as f64 / (n - 1) as f64).collect(),
        };

        let raw = if param.u.len() < 4 {
            trace!("{} fit points, using linear interpolation", param.u.len());
            linear_samples(&param, &samples)
        } else {
            match spline_samples(&param, &samples) {
                Ok(values) => values,
                Err(err) => {
                    debug!("spline fit failed ({}), using linear interpolation", err);
                    linear_samples(&param, &samples)
                }
            }
        };

        let mut knots = vec![f64::NAN; points.len()];
        for (slot, &i) in finite.iter().enumerate() {
            knots[i] = param.anchor_u[slot];
        }

        FittedCurve {
            points: raw
                .into_iter()
                .map(|(lon, lat)| GeoPoint::new(wrap_output_longitude(lon), lat.clamp(-90.0, 90.0)))
                .collect(),
            knots,
            periodic: param.periodic,
        }
    }

    fn parameterise(&self, anchors: &[GeoPoint]) -> Parameterised {
        let n = anchors.len();
        let lons = unwrap_degrees(&anchors.iter().map(|p| p.lon).collect::<Vec<_>>());
        let lats = unwrap_degrees(&anchors.iter().map(|p| p.lat).collect::<Vec<_>>());

        let mut cumulative = vec![0.0; n];
        for i in 1..n {
            let step = great_circle_distance(
                &GeoPoint::new(lons[i - 1], lats[i - 1]),
                &GeoPoint::new(lons[i], lats[i]),
            );
            cumulative[i] = cumulative[i - 1] + step;
        }
        let total = cumulative[n - 1];

        if !(total > 0.0 && total.is_finite()) {
            // All anchors coincide: uniform spacing
            let u: Vec<f64> = (0..n).map(|i| i as f64 / (n - 1) as f64).collect();
            return Parameterised {
                anchor_u: u.clone(),
                u,
                lon: lons,
                lat: lats,
                periodic: false,
            };
        }

        let mut u = Vec::with_capacity(n + 1);
        let mut lon = Vec::with_capacity(n + 1);
        let mut lat = Vec::with_capacity(n + 1);
        for i in 0..n {
            if i > 0 && cumulative[i] - cumulative[i - 1] < DUPLICATE_EPS_DEG {
                continue;
            }
            u.push(cumulative[i]);
            lon.push(lons[i]);
            lat.push(lats[i]);
        }
        let mut anchor_u = cumulative;
        let mut length = total;

        let span = lons[n - 1] - lons[0];
        let periodic = span.abs() > self.periodic_span_deg;
        if periodic {
            let closing = GeoPoint::new(
                lons[0] + FULL_CIRCLE_DEG * (span / FULL_CIRCLE_DEG).round(),
                lats[0],
            );
            let last = lon.len() - 1;
            let gap = great_circle_distance(&GeoPoint::new(lon[last], lat[last]), &closing);
            if gap < DUPLICATE_EPS_DEG {
                lon[last] = closing.lon;
                lat[last] = closing.lat;
            } else {
                length += gap;
                u.push(length);
                lon.push(closing.lon);
                lat.push(closing.lat);
            }
            trace!("closing periodic path spanning {:.1} degrees", span);
        }

        for v in u.iter_mut().chain(anchor_u.iter_mut()) {
            *v /= length;
        }

        Parameterised {
            u,
            lon,
            lat,
            anchor_u,
            periodic,
        }
    }
}

/// Rounding first keeps a path lying on ±180 on one side of the wrap
fn wrap_output_longitude(lon: f64) -> f64 {
    let snapped = (lon / OUTPUT_RESOLUTION_DEG).round() * OUTPUT_RESOLUTION_DEG;
    normalize_longitude(if snapped.is_finite() { snapped } else { lon })
}

fn linear_samples(param: &Parameterised, samples: &[f64]) -> Vec<(f64, f64)> {
    samples
        .iter()
        .map(|&t| {
            (
                linear_interpolate(&param.u, &param.lon, t),
                linear_interpolate(&param.u, &param.lat, t),
            )
        })
        .collect()
}

fn spline_samples(param: &Parameterised, samples: &[f64]) -> Result<Vec<(f64, f64)>, SplineError> {
    if param.periodic {
        // Remove the net winding so longitude is periodic in u
        let first = param.lon[0];
        let drift = param.lon[param.lon.len() - 1] - first;
        let detrended: Vec<f64> = param
            .u
            .iter()
            .zip(&param.lon)
            .map(|(u, lon)| lon - drift * u)
            .collect();
        let lon_spline = CubicSpline::fit(&param.u, &detrended, Boundary::Periodic)?;
        let lat_spline = CubicSpline::fit(&param.u, &param.lat, Boundary::Periodic)?;
        Ok(samples
            .iter()
            .map(|&t| (lon_spline.evaluate(t) + drift * t, lat_spline.evaluate(t)))
            .collect())
    } else {
        let lon_spline = CubicSpline::fit(&param.u, &param.lon, Boundary::Natural)?;
        let lat_spline = CubicSpline::fit(&param.u, &param.lat, Boundary::Natural)?;
        Ok(samples
            .iter()
            .map(|&t| (lon_spline.evaluate(t), lat_spline.evaluate(t)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn arc() -> Vec<GeoPoint> {
        (-6..=6)
            .map(|i| {
                let lat = i as f64 * 10.0;
                GeoPoint::new(30.0 * lat.to_radians().sin(), lat)
            })
            .collect()
    }

    #[test]
    fn test_short_input_returned_unchanged() {
        let fitter = CurveFitter::default();
        assert!(fitter.fit(&[], 10).is_empty());
        let single = [GeoPoint::new(12.0, 3.0)];
        assert_eq!(fitter.fit(&single, 10), single.to_vec());
    }

    #[test]
    fn test_output_density_and_ranges() {
        let fitted = CurveFitter::default().fit(&arc(), 137);
        assert_eq!(fitted.len(), 137);
        for p in &fitted {
            assert!(p.lon > -180.0 && p.lon <= 180.0);
            assert!((-90.0..=90.0).contains(&p.lat));
        }
    }

    #[test]
    fn test_endpoints_and_anchors_are_interpolated() {
        let anchors = arc();
        let fitted = CurveFitter::default().fit_curve(&anchors, 301);
        let first = fitted.points[0];
        let last = fitted.points[300];
        assert_abs_diff_eq!(first.lon, anchors[0].lon, epsilon = 1e-9);
        assert_abs_diff_eq!(first.lat, anchors[0].lat, epsilon = 1e-9);
        assert_abs_diff_eq!(last.lat, anchors[12].lat, epsilon = 1e-9);
        assert!(!fitted.periodic);

        // knots are increasing and span [0, 1]
        assert_eq!(fitted.knots.len(), anchors.len());
        assert_abs_diff_eq!(fitted.knots[0], 0.0);
        assert_abs_diff_eq!(fitted.knots[12], 1.0, epsilon = 1e-12);
        assert!(fitted.knots.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn test_linear_fallback_for_three_points() {
        let anchors = [
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(10.0, 0.0),
            GeoPoint::new(20.0, 0.0),
        ];
        let fitted = CurveFitter::default().fit(&anchors, 5);
        let lons: Vec<f64> = fitted.iter().map(|p| p.lon).collect();
        for (got, want) in lons.iter().zip([0.0, 5.0, 10.0, 15.0, 20.0]) {
            assert_abs_diff_eq!(*got, want, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_dateline_crossing_is_not_a_detour() {
        let anchors: Vec<GeoPoint> = (0..8)
            .map(|i| GeoPoint::new(normalize_longitude(170.0 + i as f64 * 3.0), i as f64 * 2.0))
            .collect();
        let fitted = CurveFitter::default().fit(&anchors, 60);
        for w in fitted.windows(2) {
            let step = w[0].distance_to(&w[1]);
            assert!(step < 2.0, "step {} between {:?} and {:?}", step, w[0], w[1]);
        }
    }

    #[test]
    fn test_coincident_points_do_not_panic() {
        let anchors = vec![GeoPoint::new(5.0, 5.0); 6];
        let fitted = CurveFitter::default().fit(&anchors, 10);
        assert_eq!(fitted.len(), 10);
        for p in fitted {
            assert_abs_diff_eq!(p.lon, 5.0, epsilon = 1e-9);
            assert_abs_diff_eq!(p.lat, 5.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_repeated_anchor_is_merged() {
        let mut anchors = arc();
        anchors.insert(4, anchors[3]);
        let fitted = CurveFitter::default().fit_curve(&anchors, 100);
        assert_eq!(fitted.points.len(), 100);
        assert_eq!(fitted.knots[3], fitted.knots[4]);
        assert!(fitted.points.iter().all(GeoPoint::is_finite));
    }

    #[test]
    fn test_non_finite_anchor_is_skipped() {
        let mut anchors = arc();
        anchors[5] = GeoPoint::new(f64::NAN, 0.0);
        let fitted = CurveFitter::default().fit_curve(&anchors, 40);
        assert_eq!(fitted.points.len(), 40);
        assert!(fitted.points.iter().all(GeoPoint::is_finite));
        assert!(fitted.knots[5].is_nan());
    }

    #[test]
    fn test_periodic_loop_closes() {
        // A small circle of latitude sampled all the way round
        let anchors: Vec<GeoPoint> = (0..36)
            .map(|i| GeoPoint::new(normalize_longitude(i as f64 * 10.0), 60.0 + (i as f64 * 10.0).to_radians().sin()))
            .collect();
        let fitted = CurveFitter::default().fit_curve(&anchors, 200);
        assert!(fitted.periodic);
        let first = fitted.points[0];
        let last = fitted.points[199];
        assert!(first.distance_to(&last) < 1e-6);
        for w in fitted.points.windows(2) {
            assert!(w[0].distance_to(&w[1]) < 2.0);
        }
    }

    #[test]
    fn test_refit_stays_on_curve() {
        let anchors = arc();
        let fitter = CurveFitter::default();
        let once = fitter.fit(&anchors, 200);
        let twice = fitter.fit(&once, 200);
        for anchor in &anchors {
            let nearest = twice
                .iter()
                .map(|p| p.distance_to(anchor))
                .fold(f64::INFINITY, f64::min);
            assert!(nearest < 1.0, "anchor {:?} is {} away", anchor, nearest);
        }
    }

    #[test]
    fn test_output_index_maps_anchor() {
        let fitted = CurveFitter::default().fit_curve(&arc(), 13);
        assert_eq!(fitted.output_index(0), Some(0));
        assert_eq!(fitted.output_index(12), Some(12));
        assert_eq!(fitted.output_index(99), None);
    }

    #[test]
    fn test_random_paths_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        let fitter = CurveFitter::default();
        for _ in 0..50 {
            let n = rng.gen_range(2..40);
            let anchors: Vec<GeoPoint> = (0..n)
                .map(|_| GeoPoint::new(rng.gen_range(-180.0..180.0), rng.gen_range(-89.0..89.0)))
                .collect();
            let density = rng.gen_range(2..120);
            let fitted = fitter.fit(&anchors, density);
            assert_eq!(fitted.len(), density);
            for p in fitted {
                assert!(p.lon > -180.0 && p.lon <= 180.0, "{:?}", p);
                assert!((-90.0..=90.0).contains(&p.lat), "{:?}", p);
            }
        }
    }

    #[test]
    fn test_antimeridian_meridian_does_not_flicker() {
        // Constant longitude 180 with a bend at the top, like an equatorial AC line
        let mut anchors: Vec<GeoPoint> = (-80..=80).map(|l| GeoPoint::new(180.0, l as f64)).collect();
        anchors.extend((0..10).map(|l| GeoPoint::new(0.0, 79.0 - l as f64)));
        let fitted = CurveFitter::default().fit(&anchors, anchors.len());
        let far_from_bend = &fitted[..120];
        assert!(far_from_bend.iter().all(|p| p.lon == 180.0));
    }
}
