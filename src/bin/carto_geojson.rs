//! Astrocartography GeoJSON Tool
//!
//! Reads a chart (epoch plus body positions) from a JSON file and prints the
//! requested astrocartography lines and parans as a GeoJSON
//! `FeatureCollection`.
//!
//! Usage:
//!   cargo run --bin carto_geojson -- chart.json [--config config.json] [--no-aspects]
//!
//! Chart file layout:
//!
//! ```json
//! {
//!   "epoch": "2000-01-01T12:00:00Z",
//!   "sidereal_time_deg": 280.46,
//!   "positions": [
//!     { "body": "Sun", "ecliptic_longitude": 280.4, "right_ascension": 281.3, "declination": -23.0 }
//!   ]
//! }
//! ```
//!
//! `julian_day` may replace `epoch`. `sidereal_time_deg` and `obliquity_deg`
//! are optional and derived from the epoch when absent.

use std::path::PathBuf;

use astrocarto::{
    Astrocartography, Body, BodyPosition, CartographyConfig, ChartEphemeris, Epoch, FilterOptions,
};
use clap::{ArgAction, Parser};
use serde::Deserialize;

/// Type alias for the error type used throughout this module
type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Astrocartography GeoJSON Tool
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Renders astrocartography lines and parans for a chart as GeoJSON",
    long_about = None
)]
struct Args {
    /// Chart JSON file
    chart: PathBuf,

    /// Optional configuration JSON (partial documents are allowed)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Comma separated bodies to draw (default: every body in the chart)
    #[arg(short, long, value_delimiter = ',')]
    bodies: Vec<String>,

    /// Omit AC/DC horizon curves
    #[arg(long, action = ArgAction::SetTrue)]
    no_ac_dc: bool,

    /// Omit MC/IC meridians
    #[arg(long, action = ArgAction::SetTrue)]
    no_ic_mc: bool,

    /// Omit aspect lines
    #[arg(long, action = ArgAction::SetTrue)]
    no_aspects: bool,

    /// Omit paran latitudes
    #[arg(long, action = ArgAction::SetTrue)]
    no_parans: bool,

    /// Print a one-line summary to stderr
    #[arg(short, long, action = ArgAction::SetTrue)]
    summary: bool,
}

/// Chart as read from disk
#[derive(Debug, Deserialize)]
struct ChartFile {
    epoch: Option<String>,
    julian_day: Option<f64>,
    sidereal_time_deg: Option<f64>,
    obliquity_deg: Option<f64>,
    positions: Vec<BodyPosition>,
}

impl ChartFile {
    fn epoch(&self) -> Result<Epoch> {
        match (&self.epoch, self.julian_day) {
            (Some(text), _) => Ok(Epoch::parse_rfc3339(text)?),
            (None, Some(jd)) => Ok(Epoch::from_julian_day(jd)?),
            (None, None) => Err("chart needs either \"epoch\" or \"julian_day\"".into()),
        }
    }

    fn into_ephemeris(self) -> Result<ChartEphemeris> {
        let epoch = self.epoch()?;
        let mut chart = ChartEphemeris::new(epoch);
        if let Some(gst) = self.sidereal_time_deg {
            chart = chart.with_sidereal_time_deg(gst);
        }
        if let Some(eps) = self.obliquity_deg {
            chart = chart.with_obliquity_rad(eps.to_radians());
        }
        for position in self.positions {
            chart = chart.with_position(position);
        }
        Ok(chart)
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let chart: ChartFile = serde_json::from_str(&std::fs::read_to_string(&args.chart)?)?;
    let ephemeris = chart.into_ephemeris()?;
    let epoch = ephemeris.epoch();

    let config = match &args.config {
        Some(path) => CartographyConfig::from_json_file(path)?,
        None => CartographyConfig::default(),
    };

    let bodies: Vec<Body> = if args.bodies.is_empty() {
        ephemeris.bodies().collect()
    } else {
        args.bodies
            .iter()
            .map(|name| name.parse())
            .collect::<astrocarto::Result<_>>()?
    };

    let filter = FilterOptions {
        include_ac_dc: !args.no_ac_dc,
        include_ic_mc: !args.no_ic_mc,
        include_aspects: !args.no_aspects,
        include_parans: !args.no_parans,
    };

    let carto = Astrocartography::new(&ephemeris, epoch, config)?;
    let collection = carto.assemble(&bodies, &filter);

    if args.summary {
        eprintln!(
            "{}: {} bodies, {} lines, {} parans",
            epoch,
            bodies.len(),
            collection.lines.len(),
            collection.parans.len()
        );
    }
    println!("{}", collection.to_geojson_string()?);

    Ok(())
}
