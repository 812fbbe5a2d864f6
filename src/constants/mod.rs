//! Constants module for astrocartography calculations

use std::f64::consts::PI;

// Time constants
/// Seconds in a day
pub const DAY_S: f64 = 86_400.0;
/// J2000.0 epoch as Julian date
pub const J2000: f64 = 2_451_545.0;
/// Days in a Julian century
pub const DAYS_PER_CENTURY: f64 = 36_525.0;
/// Julian date of the Unix epoch (1970-01-01T00:00:00Z)
pub const UNIX_EPOCH_JD: f64 = 2_440_587.5;

// Angles
/// Arcseconds to radians conversion factor
pub const ASEC2RAD: f64 = 4.848_136_811_095_36e-6;
/// Arcseconds to degrees conversion factor
pub const ASEC2DEG: f64 = 1.0 / 3600.0;
/// Degrees to radians conversion factor
pub const DEG2RAD: f64 = PI / 180.0;
/// Radians to degrees conversion factor
pub const RAD2DEG: f64 = 180.0 / PI;
/// Degrees in a full circle
pub const FULL_CIRCLE_DEG: f64 = 360.0;

// Geometry defaults
/// Largest longitude step allowed inside an emitted path
pub const DEFAULT_MAX_JUMP_DEG: f64 = 45.0;
/// Longitude step that marks an antimeridian crossing
pub const DATELINE_JUMP_DEG: f64 = 180.0;
/// Unwrapped longitude span beyond which a path is treated as closed
pub const PERIODIC_SPAN_DEG: f64 = 300.0;
/// Latitude reach of MC/IC meridians
pub const MERIDIAN_EXTENT_DEG: f64 = 85.0;
/// Latitude reach of MC-relative aspect meridians
pub const ASPECT_MERIDIAN_EXTENT_DEG: f64 = 89.9;
/// Jump above which an ASC aspect segment is treated as a solver artifact
pub const ASPECT_ARTIFACT_JUMP_DEG: f64 = 90.0;

/// Upper bound on latitude grid samples and fitted curve points
pub const MAX_CURVE_POINTS: usize = 100_000;

// Paran defaults
/// Operational latitude band for paran crossings
pub const PARAN_LATITUDE_BAND_DEG: f64 = 68.0;
/// Target point count per line before segment-pair scanning
pub const PARAN_POINT_BUDGET: usize = 180;

// Fitting defaults
/// Output density of ASC aspect curves
pub const ASPECT_CURVE_DENSITY: usize = 300;
/// Aspect offsets (degrees) measured from the MC or ASC
pub const ASPECT_OFFSETS: [i32; 6] = [60, 90, 120, -60, -90, -120];
