//! End-to-end checks through the public API

use std::collections::BTreeMap;

use approx::assert_abs_diff_eq;
use astrocarto::config::{CartographyConfig, FitDensity, LatitudeGrid};
use astrocarto::constants::DEG2RAD;
use astrocarto::lines::{HorizonLineGenerator, MeridianLineGenerator};
use astrocarto::lines::AspectLineGenerator;
use astrocarto::{
    Astrocartography, AspectTarget, Body, BodyPosition, ChartEphemeris, Ephemeris, Epoch,
    FilterOptions, GeoPoint, LineId, LineKind, ParanFinder,
};
use rstest::rstest;

fn grid(start: i32, end: i32) -> Vec<f64> {
    (start..=end).map(f64::from).collect()
}

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

fn visible_latitudes(declination: f64, latitudes: &[f64]) -> usize {
    let tan_dec = (declination * DEG2RAD).tan();
    latitudes
        .iter()
        .filter(|&&lat| (-(lat * DEG2RAD).tan() * tan_dec).abs() <= 1.0)
        .count()
}

#[test]
fn test_horizon_line_end_to_end() {
    let lats = grid(-80, 80);
    let n = visible_latitudes(20.0, &lats);
    assert!(n > 100);

    let feature = HorizonLineGenerator::default()
        .generate(Body::Sun, 20.0, 100.0, 50.0, &lats)
        .unwrap()
        .unwrap();

    assert_eq!(feature.kind, LineKind::Horizon);
    let kinds: Vec<LineKind> = feature.segments.iter().map(|s| s.kind).collect();
    assert_eq!(kinds, vec![LineKind::Ac, LineKind::Dc]);
    let labelled: usize = feature.segments.iter().map(|s| s.len()).sum();
    assert_eq!(labelled, 2 * n - 1);

    for path in &feature.paths {
        assert!(path.points.len() >= 2);
        for p in &path.points {
            assert!(p.lon > -180.0 && p.lon <= 180.0);
            assert!(p.lat >= -90.0 && p.lat <= 90.0);
        }
        for w in path.points.windows(2) {
            assert!((w[1].lon - w[0].lon).abs() <= 45.0);
        }
    }

    // AC and DC parts resolve to separate lines for the paran scan
    let resolved = feature.resolved();
    assert_eq!(resolved.len(), 2);
    assert_eq!(resolved[0].0, LineId::new(Body::Sun, LineKind::Ac));
    assert_eq!(resolved[1].0, LineId::new(Body::Sun, LineKind::Dc));
}

#[test]
fn test_horizon_generation_is_idempotent() {
    let generator = HorizonLineGenerator::default();
    let lats = grid(-80, 80);
    let first = generator.generate(Body::Venus, -12.5, 215.0, 333.0, &lats).unwrap();
    let second = generator.generate(Body::Venus, -12.5, 215.0, 333.0, &lats).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_horizon_edge_declinations() {
    let generator = HorizonLineGenerator::default();

    let lats = grid(-89, 89);
    let equatorial = generator
        .generate(Body::Moon, 0.0, 10.0, 0.0, &lats)
        .unwrap()
        .unwrap();
    let labelled: usize = equatorial.segments.iter().map(|s| s.len()).sum();
    assert_eq!(labelled, 2 * lats.len() - 1);

    assert!(generator
        .generate(Body::Moon, 89.0, 10.0, 0.0, &[-60.0, 60.0])
        .unwrap()
        .is_none());
    assert!(generator
        .generate(Body::Moon, 90.5, 10.0, 0.0, &lats)
        .is_err());
}

#[test]
fn test_equatorial_body_drawn_at_every_latitude() {
    let chart = ChartEphemeris::new(Epoch::j2000())
        .with_sidereal_time_deg(75.0)
        .with_position(position(Body::Moon, 0.0, 0.0, 0.0))
        .with_position(position(Body::Venus, 180.0, 180.0, 0.5));
    let config = CartographyConfig::default();
    let carto = Astrocartography::new(&chart, Epoch::j2000(), config.clone()).unwrap();
    let lats = config.horizon.latitude_grid.values().unwrap();

    for body in [Body::Moon, Body::Venus] {
        let feature = carto
            .generate_horizon_line(body, &config.horizon.latitude_grid)
            .unwrap()
            .unwrap();
        let labelled: usize = feature.segments.iter().map(|s| s.len()).sum();
        assert_eq!(labelled, 2 * lats.len() - 1);

        let resolved = feature.resolved();
        assert_eq!(resolved.len(), 2, "{} lost a horizon half", body);
        for (id, paths) in &resolved {
            let reach = paths.iter().flatten().map(|p| p.lat);
            let south = reach.clone().fold(f64::INFINITY, f64::min);
            let north = reach.fold(f64::NEG_INFINITY, f64::max);
            assert!(south <= -84.9 && north >= 80.0, "{} spans {}..{}", id, south, north);
        }
    }
}

#[test]
fn test_default_config_ascendant_accuracy() {
    let chart = chart().with_obliquity_rad(23.439_279_4 * DEG2RAD);
    let epoch = Epoch::j2000();
    let config = CartographyConfig::default();
    let generator = AspectLineGenerator::from_config(&config);
    let lats = config.aspects.latitude_grid.values().unwrap();
    let temperate = lats.iter().filter(|l| l.abs() <= 60.0).count();

    for body in chart.bodies() {
        let lon = chart.body_position(epoch, body).unwrap().ecliptic_longitude;
        for &offset in &config.aspects.offsets {
            let anchors = generator.asc_anchors(lon, offset, &lats, |lat, lon| {
                chart.ascendant_ecliptic_longitude(epoch, lat, lon)
            });
            let target = lon - f64::from(offset);
            for a in &anchors {
                let asc = chart.ascendant_ecliptic_longitude(epoch, a.lat, a.lon).unwrap();
                let miss = astrocarto::coordinates::angular_difference(asc, target).abs();
                assert!(
                    miss <= 0.05 + 1e-6,
                    "{} {:+} ASC misses by {} at ({}, {})",
                    body,
                    offset,
                    miss,
                    a.lon,
                    a.lat
                );
            }
            let solved = anchors.iter().filter(|a| a.lat.abs() <= 60.0).count();
            assert_eq!(solved, temperate, "{} {:+} ASC has gaps", body, offset);
        }
    }
}

#[rstest]
#[case(0.0, 0.0, 0.0, 180.0)]
#[case(100.0, 50.0, 50.0, -130.0)]
#[case(5.0, 355.0, 10.0, -170.0)]
fn test_meridians(#[case] ra: f64, #[case] gst: f64, #[case] mc_lon: f64, #[case] ic_lon: f64) {
    let (mc, ic) = MeridianLineGenerator::default()
        .generate(Body::Saturn, ra, gst)
        .unwrap();
    for p in &mc.paths[0].points {
        assert_abs_diff_eq!(p.lon, mc_lon, epsilon = 1e-9);
    }
    for p in &ic.paths[0].points {
        assert_abs_diff_eq!(p.lon.abs(), ic_lon.abs(), epsilon = 1e-9);
    }
}

#[test]
fn test_paran_at_known_crossing() {
    let mut lines = BTreeMap::new();
    lines.insert(
        LineId::new(Body::Sun, LineKind::Ac),
        vec![vec![GeoPoint::new(0.0, 10.0), GeoPoint::new(20.0, 50.0)]],
    );
    lines.insert(
        LineId::new(Body::Moon, LineKind::Mc),
        vec![vec![GeoPoint::new(10.0, -85.0), GeoPoint::new(10.0, 85.0)]],
    );

    let parans = ParanFinder::default().find(&lines);
    assert_eq!(parans.len(), 1);
    assert_abs_diff_eq!(parans[0].latitude, 30.0, epsilon = 1e-9);
    assert_abs_diff_eq!(parans[0].longitude, 10.0, epsilon = 1e-9);
    assert_eq!(parans[0].label, "Sun AC crossing Moon MC");
}

#[test]
fn test_same_body_lines_never_form_parans() {
    let mut lines = BTreeMap::new();
    lines.insert(
        LineId::new(Body::Sun, LineKind::Ac),
        vec![vec![GeoPoint::new(0.0, 10.0), GeoPoint::new(20.0, 50.0)]],
    );
    lines.insert(
        LineId::new(Body::Sun, LineKind::Mc),
        vec![vec![GeoPoint::new(10.0, -85.0), GeoPoint::new(10.0, 85.0)]],
    );
    assert!(ParanFinder::default().find(&lines).is_empty());
}

fn chart() -> ChartEphemeris {
    ChartEphemeris::new(Epoch::j2000())
        .with_sidereal_time_deg(280.46)
        .with_position(position(Body::Sun, 280.4, 281.3, -23.0))
        .with_position(position(Body::Moon, 223.3, 220.9, -10.7))
        .with_position(position(Body::Mars, 327.9, 330.1, -13.2))
        .with_position(position(Body::Chiron, 251.8, 250.2, -5.6))
}

#[test]
fn test_assemble_full_chart() {
    let chart = chart();
    let coarse = LatitudeGrid::new(-80.0, 80.0, 2.0).unwrap();
    let config = CartographyConfig::default()
        .with_horizon_grid(coarse)
        .with_aspect_grid(coarse)
        .with_horizon_density(FitDensity::Points(240));
    let carto = Astrocartography::new(&chart, Epoch::j2000(), config).unwrap();
    let bodies: Vec<Body> = chart.bodies().collect();

    let collection = carto.assemble(&bodies, &FilterOptions::default());

    for body in &bodies {
        let count = |kind: LineKind| {
            collection
                .lines
                .iter()
                .filter(|l| l.body == *body && l.kind == kind)
                .count()
        };
        assert_eq!(count(LineKind::Mc), 1);
        assert_eq!(count(LineKind::Ic), 1);
        assert_eq!(count(LineKind::Horizon), 1);
        assert!(count(LineKind::Aspect) >= 6);
    }

    assert!(!collection.parans.is_empty());
    for paran in &collection.parans {
        assert!(paran.latitude.abs() <= 68.0);
        assert_ne!(paran.lines[0].body, paran.lines[1].body);
        assert!(paran.lines[0].kind.is_rise_set());
        assert!(paran.lines[1].kind.is_culmination());
    }

    let geojson = collection.to_geojson();
    let features = geojson["features"].as_array().unwrap();
    assert_eq!(features.len(), collection.len());
    let aspect = features
        .iter()
        .find(|f| f["properties"]["line_type"] == "ASPECT")
        .unwrap();
    assert_eq!(aspect["properties"]["category"], "aspect");
    assert!(aspect["properties"]["to"] == "MC" || aspect["properties"]["to"] == "ASC");
}

#[test]
fn test_aspect_lines_through_boundary() {
    let chart = chart();
    let coarse = LatitudeGrid::new(-80.0, 80.0, 2.0).unwrap();
    let config = CartographyConfig::default().with_aspect_grid(coarse);
    let carto = Astrocartography::new(&chart, Epoch::j2000(), config).unwrap();

    let mc_lines = carto.generate_aspect_lines(Body::Mars, AspectTarget::Mc).unwrap();
    assert_eq!(mc_lines.len(), 6);
    for line in &mc_lines {
        assert_eq!(line.paths.len(), 1);
        let lon = line.paths[0].points[0].lon;
        assert!(line.paths[0].points.iter().all(|p| p.lon == lon));
    }

    for line in carto.generate_aspect_lines(Body::Mars, AspectTarget::Asc).unwrap() {
        assert!(line.point_count() >= 2);
        for path in &line.paths {
            for w in path.points.windows(2) {
                assert!((w[1].lon - w[0].lon).abs() <= 45.0);
            }
        }
    }
}

#[test]
fn test_epoch_mismatch_is_skipped() {
    let chart = chart();
    let other = Epoch::from_julian_day(2_460_000.5).unwrap();
    let carto = Astrocartography::new(&chart, other, CartographyConfig::default()).unwrap();
    assert!(carto.generate_meridian_lines(Body::Sun).is_err());
    let collection = carto.assemble(&[Body::Sun, Body::Moon], &FilterOptions::default());
    assert!(collection.is_empty());
}

#[test]
fn test_config_from_partial_json() {
    let config = CartographyConfig::from_json_str(
        r#"{ "segmentation": { "max_jump_deg": 30.0 }, "parans": { "latitude_band_deg": 60.0 } }"#,
    )
    .unwrap();
    assert_eq!(config.segmentation.max_jump_deg, 30.0);
    assert_eq!(config.parans.latitude_band_deg, 60.0);
    assert_eq!(config.meridian.extent_deg, 85.0);
    assert!(CartographyConfig::from_json_str(r#"{ "parans": { "latitude_band_deg": -1 } }"#).is_err());
}
