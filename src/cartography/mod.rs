//! Per-request orchestration
//!
//! [`Astrocartography`] binds an [`Ephemeris`] to one epoch and one
//! [`CartographyConfig`], reads body positions through the boundary and
//! runs the line generators and the paran finder. Results are collected in
//! a [`FeatureCollection`] that renders as GeoJSON.
//!
//! ```rust
//! use astrocarto::{Astrocartography, Body, BodyPosition, CartographyConfig, ChartEphemeris, Epoch, FilterOptions};
//!
//! let epoch = Epoch::j2000();
//! let chart = ChartEphemeris::new(epoch)
//!     .with_sidereal_time_deg(50.0)
//!     .with_position(BodyPosition {
//!         body: Body::Sun,
//!         ecliptic_longitude: 280.0,
//!         ecliptic_latitude: 0.0,
//!         right_ascension: 281.3,
//!         declination: -23.0,
//!         distance: 0.98,
//!         daily_motion: 1.02,
//!     });
//!
//! let carto = Astrocartography::new(&chart, epoch, CartographyConfig::default()).unwrap();
//! let (mc, ic) = carto.generate_meridian_lines(Body::Sun).unwrap();
//! assert!((mc.paths[0].points[0].lon + 128.7).abs() < 1e-9);
//! assert_eq!(ic.paths[0].points.len(), 2);
//!
//! let filter = FilterOptions { include_aspects: false, ..FilterOptions::default() };
//! let collection = carto.assemble(&[Body::Sun], &filter);
//! assert_eq!(collection.to_geojson()["type"], "FeatureCollection");
//! ```

use crate::config::{CartographyConfig, LatitudeGrid};
use crate::ephemeris::{Body, BodyPosition, Ephemeris};
use crate::lines::{
    AspectLineGenerator, AspectTarget, HorizonLineGenerator, LineFeature, LineKind,
    MeridianLineGenerator,
};
use crate::parans::{ParanFeature, ParanFinder};
use crate::time::Epoch;
use crate::Result;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Which feature groups a request emits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterOptions {
    pub include_ac_dc: bool,
    pub include_ic_mc: bool,
    pub include_aspects: bool,
    pub include_parans: bool,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            include_ac_dc: true,
            include_ic_mc: true,
            include_aspects: true,
            include_parans: true,
        }
    }
}

/// Lines and parans produced by one request
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FeatureCollection {
    pub lines: Vec<LineFeature>,
    pub parans: Vec<ParanFeature>,
    /// Longitude spacing used when drawing paran latitude lines
    pub paran_spacing_deg: f64,
}

impl FeatureCollection {
    pub fn len(&self) -> usize {
        self.lines.len() + self.parans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty() && self.parans.is_empty()
    }

    /// GeoJSON `FeatureCollection`
    pub fn to_geojson(&self) -> Value {
        let features: Vec<Value> = self
            .lines
            .iter()
            .map(line_to_geojson)
            .chain(
                self.parans
                    .iter()
                    .map(|p| paran_to_geojson(p, self.paran_spacing_deg)),
            )
            .collect();
        json!({
            "type": "FeatureCollection",
            "features": features,
        })
    }

    pub fn to_geojson_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_geojson())?)
    }
}

fn pairs(points: &[crate::GeoPoint]) -> Vec<[f64; 2]> {
    points.iter().map(|p| p.to_pair()).collect()
}

fn line_to_geojson(line: &LineFeature) -> Value {
    let geometry = match line.paths.as_slice() {
        [single] => json!({
            "type": "LineString",
            "coordinates": pairs(&single.points),
        }),
        many => json!({
            "type": "MultiLineString",
            "coordinates": many.iter().map(|p| pairs(&p.points)).collect::<Vec<_>>(),
        }),
    };

    let mut properties = json!({
        "planet": line.body.name(),
        "line_type": line.kind.as_str(),
        "category": if line.kind == LineKind::Aspect { "aspect" } else { "planet" },
        "label": line.label(),
    });
    if let Some(aspect) = line.aspect {
        properties["angle"] = json!(aspect.angle());
        properties["offset"] = json!(aspect.offset);
        properties["to"] = json!(aspect.target.as_str());
    }
    if !line.segments.is_empty() {
        properties["segments"] = json!(line.segments);
    }

    json!({
        "type": "Feature",
        "geometry": geometry,
        "properties": properties,
    })
}

fn paran_to_geojson(paran: &ParanFeature, spacing_deg: f64) -> Value {
    json!({
        "type": "Feature",
        "geometry": {
            "type": "LineString",
            "coordinates": pairs(&paran.path(spacing_deg)),
        },
        "properties": {
            "intersection_lat": paran.latitude,
            "intersection_lon": paran.longitude,
            "source_lines": paran.source_names(),
            "label": paran.label,
            "type": "crossing_latitude",
            "category": "parans",
        },
    })
}

/// Astrocartography for one epoch through one ephemeris
pub struct Astrocartography<E: Ephemeris> {
    ephemeris: E,
    epoch: Epoch,
    config: CartographyConfig,
    horizon: HorizonLineGenerator,
    meridian: MeridianLineGenerator,
    aspects: AspectLineGenerator,
    parans: ParanFinder,
}

impl<E: Ephemeris> Astrocartography<E> {
    /// Bind an ephemeris and a validated configuration to `epoch`
    pub fn new(ephemeris: E, epoch: Epoch, config: CartographyConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            horizon: HorizonLineGenerator::from_config(&config),
            meridian: MeridianLineGenerator::new(config.meridian.extent_deg),
            aspects: AspectLineGenerator::from_config(&config),
            parans: ParanFinder::new(config.parans.clone()),
            ephemeris,
            epoch,
            config,
        })
    }

    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    pub fn config(&self) -> &CartographyConfig {
        &self.config
    }

    fn position(&self, body: Body) -> Result<BodyPosition> {
        let position = self.ephemeris.body_position(self.epoch, body)?;
        position.validate()?;
        Ok(position)
    }

    /// AC/DC curve of `body` over `grid`, or `None` if it never crosses the horizon
    pub fn generate_horizon_line(
        &self,
        body: Body,
        grid: &LatitudeGrid,
    ) -> Result<Option<LineFeature>> {
        let position = self.position(body)?;
        let gst = self.ephemeris.sidereal_time_deg(self.epoch)?;
        self.horizon.generate(
            body,
            position.declination,
            position.right_ascension,
            gst,
            &grid.values()?,
        )
    }

    /// MC and IC meridians of `body`
    pub fn generate_meridian_lines(&self, body: Body) -> Result<(LineFeature, LineFeature)> {
        let position = self.position(body)?;
        let gst = self.ephemeris.sidereal_time_deg(self.epoch)?;
        self.meridian.generate(body, position.right_ascension, gst)
    }

    /// Aspect lines of `body` towards the MC or the ASC
    ///
    /// MC-relative lines always exist. ASC-relative lines are omitted when
    /// too few latitudes can be solved.
    pub fn generate_aspect_lines(&self, body: Body, target: AspectTarget) -> Result<Vec<LineFeature>> {
        let position = self.position(body)?;
        match target {
            AspectTarget::Mc => {
                let gst = self.ephemeris.sidereal_time_deg(self.epoch)?;
                let obliquity = self.ephemeris.true_obliquity_rad(self.epoch)?;
                self.aspects
                    .mc_lines(body, position.ecliptic_longitude, obliquity, gst)
            }
            AspectTarget::Asc => {
                let latitudes = self.config.aspects.latitude_grid.values()?;
                self.aspects.asc_lines(
                    body,
                    position.ecliptic_longitude,
                    &latitudes,
                    |lat, lon| {
                        self.ephemeris
                            .ascendant_ecliptic_longitude(self.epoch, lat, lon)
                    },
                )
            }
        }
    }

    /// Parans among `lines`, restricted to the configured bodies
    pub fn find_parans(&self, lines: &[LineFeature]) -> Vec<ParanFeature> {
        self.parans.find_in_features(lines)
    }

    /// Every line and paran requested by `filter` for `bodies`
    ///
    /// A body whose inputs cannot be read or are invalid is logged and
    /// skipped. Horizon and meridian lines feed paran detection even when
    /// the filter hides them.
    pub fn assemble(&self, bodies: &[Body], filter: &FilterOptions) -> FeatureCollection {
        let mut lines = Vec::new();
        let mut paran_inputs = Vec::new();

        for &body in bodies {
            match self.body_lines(body, filter) {
                Ok(generated) => {
                    for line in generated {
                        let shown = match line.kind {
                            LineKind::Horizon | LineKind::Ac | LineKind::Dc => filter.include_ac_dc,
                            LineKind::Mc | LineKind::Ic => filter.include_ic_mc,
                            LineKind::Aspect => filter.include_aspects,
                        };
                        if filter.include_parans && line.kind != LineKind::Aspect {
                            paran_inputs.push(line.clone());
                        }
                        if shown {
                            lines.push(line);
                        }
                    }
                }
                Err(err) => warn!("skipping {}: {}", body, err),
            }
        }

        let parans = if filter.include_parans {
            self.find_parans(&paran_inputs)
        } else {
            Vec::new()
        };
        debug!(
            "assembled {} lines and {} parans for {} bodies",
            lines.len(),
            parans.len(),
            bodies.len()
        );

        FeatureCollection {
            lines,
            parans,
            paran_spacing_deg: self.config.parans.line_spacing_deg,
        }
    }

    fn body_lines(&self, body: Body, filter: &FilterOptions) -> Result<Vec<LineFeature>> {
        let mut out = Vec::new();
        let feeds_parans = filter.include_parans && self.config.parans.allows(body);

        if filter.include_ic_mc || feeds_parans {
            let (mc, ic) = self.generate_meridian_lines(body)?;
            out.push(mc);
            out.push(ic);
        }
        if filter.include_ac_dc || feeds_parans {
            let grid = self.config.horizon.latitude_grid;
            if let Some(horizon) = self.generate_horizon_line(body, &grid)? {
                out.push(horizon);
            }
        }
        if filter.include_aspects {
            out.extend(self.generate_aspect_lines(body, AspectTarget::Mc)?);
            out.extend(self.generate_aspect_lines(body, AspectTarget::Asc)?);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ephemeris::ChartEphemeris;
    use crate::CartographyError;

    fn position(body: Body, lon: f64, ra: f64, dec: f64) -> BodyPosition {
        BodyPosition {
            body,
            ecliptic_longitude: lon,
            ecliptic_latitude: 0.0,
            right_ascension: ra,
            declination: dec,
            distance: 1.0,
            daily_motion: 0.0,
        }
    }

    fn chart() -> ChartEphemeris {
        ChartEphemeris::new(Epoch::j2000())
            .with_sidereal_time_deg(50.0)
            .with_position(position(Body::Sun, 100.0, 101.0, 20.0))
            .with_position(position(Body::Moon, 10.0, 9.0, 5.0))
            .with_position(position(Body::NorthNode, 200.0, 198.0, -8.0))
    }

    fn coarse_config() -> CartographyConfig {
        let grid = LatitudeGrid::new(-80.0, 80.0, 2.0).unwrap();
        CartographyConfig::default()
            .with_horizon_grid(grid)
            .with_aspect_grid(grid)
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = CartographyConfig::default().with_max_jump_deg(-1.0);
        assert!(Astrocartography::new(chart(), Epoch::j2000(), config).is_err());
    }

    #[test]
    fn test_missing_body_is_an_error_for_single_generators() {
        let carto = Astrocartography::new(chart(), Epoch::j2000(), coarse_config()).unwrap();
        assert!(matches!(
            carto.generate_meridian_lines(Body::Pluto),
            Err(CartographyError::Ephemeris(_))
        ));
    }

    #[test]
    fn test_aspect_line_counts() {
        let carto = Astrocartography::new(chart(), Epoch::j2000(), coarse_config()).unwrap();
        let mc = carto.generate_aspect_lines(Body::Moon, AspectTarget::Mc).unwrap();
        assert_eq!(mc.len(), 6);
        let asc = carto.generate_aspect_lines(Body::Moon, AspectTarget::Asc).unwrap();
        assert!(!asc.is_empty() && asc.len() <= 6);
        assert!(asc
            .iter()
            .all(|l| l.aspect.map(|a| a.target) == Some(AspectTarget::Asc)));
    }

    #[test]
    fn test_assemble_skips_missing_bodies_and_filters() {
        let carto = Astrocartography::new(chart(), Epoch::j2000(), coarse_config()).unwrap();
        let filter = FilterOptions {
            include_aspects: false,
            include_ac_dc: false,
            ..FilterOptions::default()
        };
        let collection = carto.assemble(&[Body::Sun, Body::Pluto, Body::Moon], &filter);
        // Only MC/IC are shown, two per available body
        assert_eq!(collection.lines.len(), 4);
        assert!(collection.lines.iter().all(|l| l.kind.is_culmination()));
        // Horizon curves were still generated for the paran scan
        assert!(!collection.parans.is_empty());
    }

    #[test]
    fn test_parans_restricted_to_major_bodies() {
        let carto = Astrocartography::new(chart(), Epoch::j2000(), coarse_config()).unwrap();
        let filter = FilterOptions {
            include_aspects: false,
            ..FilterOptions::default()
        };
        let collection = carto.assemble(&[Body::Sun, Body::NorthNode], &filter);
        assert!(collection.parans.is_empty());
        assert_eq!(collection.lines.len(), 6);
    }

    #[test]
    fn test_geojson_shape() {
        let carto = Astrocartography::new(chart(), Epoch::j2000(), coarse_config()).unwrap();
        let filter = FilterOptions {
            include_aspects: false,
            ..FilterOptions::default()
        };
        let collection = carto.assemble(&[Body::Sun, Body::Moon], &filter);
        let geojson = collection.to_geojson();
        let features = geojson["features"].as_array().unwrap();
        assert_eq!(features.len(), collection.len());

        let horizon = features
            .iter()
            .find(|f| f["properties"]["line_type"] == "HORIZON")
            .unwrap();
        assert_eq!(horizon["properties"]["category"], "planet");
        assert_eq!(horizon["properties"]["segments"][0]["label"], "AC");

        let paran = features
            .iter()
            .find(|f| f["properties"]["type"] == "crossing_latitude")
            .unwrap();
        assert_eq!(paran["geometry"]["coordinates"].as_array().unwrap().len(), 361);
        assert_eq!(paran["properties"]["source_lines"].as_array().unwrap().len(), 2);
    }
}
