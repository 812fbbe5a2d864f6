//! Ephemeris backed by a supplied table of positions
//!
//! Positions come from outside (a chart service, a JSON file, a test
//! fixture). Sidereal time, obliquity and the Ascendant are derived from the
//! epoch with the standard closed forms unless explicitly overridden.

use super::angles::ascendant_longitude_deg;
use super::{Body, BodyPosition, Ephemeris};
use crate::coordinates::normalize_degrees;
use crate::nutationlib;
use crate::time::Epoch;
use crate::{CartographyError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Positions for a single chart epoch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartEphemeris {
    epoch: Epoch,
    positions: BTreeMap<Body, BodyPosition>,
    /// Greenwich sidereal time override, degrees
    sidereal_time_deg: Option<f64>,
    /// True obliquity override, radians
    obliquity_rad: Option<f64>,
}

impl ChartEphemeris {
    /// Create an empty chart for an epoch
    pub fn new(epoch: Epoch) -> Self {
        Self {
            epoch,
            positions: BTreeMap::new(),
            sidereal_time_deg: None,
            obliquity_rad: None,
        }
    }

    /// Add (or replace) a body position
    pub fn with_position(mut self, position: BodyPosition) -> Self {
        self.positions.insert(position.body, position);
        self
    }

    /// Fix Greenwich sidereal time instead of deriving it from the epoch
    pub fn with_sidereal_time_deg(mut self, gst_deg: f64) -> Self {
        self.sidereal_time_deg = Some(normalize_degrees(gst_deg));
        self
    }

    /// Fix the obliquity instead of deriving it from the epoch
    pub fn with_obliquity_rad(mut self, obliquity_rad: f64) -> Self {
        self.obliquity_rad = Some(obliquity_rad);
        self
    }

    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    /// Bodies with a supplied position, in `Body` order
    pub fn bodies(&self) -> impl Iterator<Item = Body> + '_ {
        self.positions.keys().copied()
    }

    fn check_epoch(&self, epoch: Epoch) -> Result<()> {
        if epoch != self.epoch {
            return Err(CartographyError::Ephemeris(format!(
                "chart holds positions for {}, requested {}",
                self.epoch, epoch
            )));
        }
        Ok(())
    }
}

impl Ephemeris for ChartEphemeris {
    fn body_position(&self, epoch: Epoch, body: Body) -> Result<BodyPosition> {
        self.check_epoch(epoch)?;
        if let Some(position) = self.positions.get(&body) {
            return Ok(*position);
        }
        // The south node mirrors the north node
        if body == Body::SouthNode {
            if let Some(north) = self.positions.get(&Body::NorthNode) {
                return Ok(BodyPosition {
                    body,
                    ecliptic_longitude: normalize_degrees(north.ecliptic_longitude + 180.0),
                    ecliptic_latitude: -north.ecliptic_latitude,
                    right_ascension: normalize_degrees(north.right_ascension + 180.0),
                    declination: -north.declination,
                    ..*north
                });
            }
        }
        Err(CartographyError::Ephemeris(format!(
            "no position for {} at {}",
            body, epoch
        )))
    }

    fn sidereal_time_deg(&self, epoch: Epoch) -> Result<f64> {
        self.check_epoch(epoch)?;
        Ok(self.sidereal_time_deg.unwrap_or_else(|| epoch.gast_deg()))
    }

    fn true_obliquity_rad(&self, epoch: Epoch) -> Result<f64> {
        self.check_epoch(epoch)?;
        Ok(self
            .obliquity_rad
            .unwrap_or_else(|| nutationlib::true_obliquity_rad(epoch.julian_centuries())))
    }

    fn ascendant_ecliptic_longitude(
        &self,
        epoch: Epoch,
        latitude: f64,
        longitude: f64,
    ) -> Result<f64> {
        let lst = self.sidereal_time_deg(epoch)? + longitude;
        let eps = self.true_obliquity_rad(epoch)?;
        let asc = ascendant_longitude_deg(lst, eps, latitude);
        if asc.is_finite() {
            Ok(asc)
        } else {
            Err(CartographyError::Ephemeris(format!(
                "Ascendant undefined at latitude {}",
                latitude
            )))
        }
    }
}
