//! Astrocarto: astrocartography line synthesis
//!
//! This crate turns celestial coordinates supplied by an external ephemeris
//! (right ascension, declination, ecliptic longitude, sidereal time) into
//! dateline-safe polylines on the Earth's surface:
//!
//! - horizon (AC/DC) curves where a body rises or sets,
//! - meridian (MC/IC) lines where it culminates or anti-culminates,
//! - aspect lines where it sits at a fixed angle from the local MC or ASC,
//! - paran latitudes where the lines of two different bodies cross.
//!
//! Every generator is a pure function of its explicit inputs. The ephemeris
//! is injected through the [`ephemeris::Ephemeris`] trait rather than held
//! in global state.

use thiserror::Error;

pub mod cartography;
pub mod config;
pub mod constants;
pub mod coordinates;
pub mod curves;
pub mod ephemeris;
pub mod lines;
pub mod nutationlib;
pub mod parans;
pub mod solver;
pub mod time;

// Re-export commonly used types
pub use cartography::{Astrocartography, FeatureCollection, FilterOptions};
pub use config::CartographyConfig;
pub use coordinates::GeoPoint;
pub use ephemeris::{Body, BodyPosition, ChartEphemeris, Ephemeris};
pub use lines::{Aspect, AspectTarget, LineFeature, LineId, LineKind};
pub use parans::{ParanFeature, ParanFinder};
pub use time::Epoch;

/// Main error type for the astrocarto library
#[derive(Debug, Error)]
pub enum CartographyError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Ephemeris error: {0}")]
    Ephemeris(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for astrocarto operations
pub type Result<T> = std::result::Result<T, CartographyError>;
