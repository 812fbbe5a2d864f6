//! Culmination (MC) and anti-culmination (IC) meridians
//!
//! A body culminates where local sidereal time equals its right ascension,
//! so the MC line is the meridian at α − θ and the IC line lies opposite.

use super::{LineFeature, LineKind, LinePath};
use crate::constants::MERIDIAN_EXTENT_DEG;
use crate::coordinates::{normalize_longitude, GeoPoint};
use crate::ephemeris::Body;
use crate::{CartographyError, Result};

/// `(MC, IC)` geographic longitudes in (-180, 180]
pub fn meridian_longitudes(right_ascension: f64, sidereal_time_deg: f64) -> (f64, f64) {
    let mc = normalize_longitude(right_ascension - sidereal_time_deg);
    (mc, normalize_longitude(mc + 180.0))
}

/// Closed-form MC/IC line generator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeridianLineGenerator {
    extent_deg: f64,
}

impl Default for MeridianLineGenerator {
    fn default() -> Self {
        Self {
            extent_deg: MERIDIAN_EXTENT_DEG,
        }
    }
}

impl MeridianLineGenerator {
    pub fn new(extent_deg: f64) -> Self {
        Self { extent_deg }
    }

    /// MC and IC features for `body`
    pub fn generate(
        &self,
        body: Body,
        right_ascension: f64,
        sidereal_time_deg: f64,
    ) -> Result<(LineFeature, LineFeature)> {
        if !(right_ascension.is_finite() && sidereal_time_deg.is_finite()) {
            return Err(CartographyError::InvalidInput(format!(
                "{}: right ascension and sidereal time must be finite",
                body
            )));
        }
        let (mc, ic) = meridian_longitudes(right_ascension, sidereal_time_deg);
        Ok((
            LineFeature::new(body, LineKind::Mc, vec![self.meridian(mc)]),
            LineFeature::new(body, LineKind::Ic, vec![self.meridian(ic)]),
        ))
    }

    fn meridian(&self, lon: f64) -> LinePath {
        LinePath::new(
            0,
            vec![
                GeoPoint::new(lon, -self.extent_deg),
                GeoPoint::new(lon, self.extent_deg),
            ],
        )
    }
}
