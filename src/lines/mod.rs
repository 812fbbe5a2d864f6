//! Astrocartography line features and their generators
//!
//! A [`LineFeature`] is the output of one generator for one body: one or
//! more dateline-safe paths plus metadata. Horizon curves carry AC and DC
//! in a single continuous curve; [`SegmentLabel`]s record which indices of
//! the fitted curve belong to which, and every [`LinePath`] remembers where
//! it started so labels survive segmentation.

pub mod aspect;
pub mod horizon;
pub mod meridian;

pub use aspect::AspectLineGenerator;
pub use horizon::{HorizonAnchors, HorizonLineGenerator};
pub use meridian::{meridian_longitudes, MeridianLineGenerator};

use crate::coordinates::GeoPoint;
use crate::ephemeris::Body;
use crate::{CartographyError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;

/// Kind of an angular line
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LineKind {
    /// Upper culmination
    Mc,
    /// Lower culmination
    Ic,
    /// Rising
    Ac,
    /// Setting
    Dc,
    /// Combined rising and setting curve, labelled by [`SegmentLabel`]s
    Horizon,
    /// Fixed angle from the MC or ASC
    Aspect,
}

impl LineKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineKind::Mc => "MC",
            LineKind::Ic => "IC",
            LineKind::Ac => "AC",
            LineKind::Dc => "DC",
            LineKind::Horizon => "HORIZON",
            LineKind::Aspect => "ASPECT",
        }
    }

    /// AC or DC
    pub fn is_rise_set(&self) -> bool {
        matches!(self, LineKind::Ac | LineKind::Dc)
    }

    /// MC or IC
    pub fn is_culmination(&self) -> bool {
        matches!(self, LineKind::Mc | LineKind::Ic)
    }
}

impl fmt::Display for LineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Angle an aspect line is measured from
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AspectTarget {
    Mc,
    Asc,
}

impl AspectTarget {
    pub fn as_str(&self) -> &'static str {
        match self {
            AspectTarget::Mc => "MC",
            AspectTarget::Asc => "ASC",
        }
    }
}

impl fmt::Display for AspectTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A signed aspect offset towards a target angle
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Aspect {
    /// Signed offset in degrees: ±60, ±90 or ±120
    pub offset: i32,
    pub target: AspectTarget,
}

impl Aspect {
    pub fn new(offset: i32, target: AspectTarget) -> Result<Self> {
        if ![60, 90, 120].contains(&offset.abs()) {
            return Err(CartographyError::InvalidInput(format!(
                "unsupported aspect offset {}",
                offset
            )));
        }
        Ok(Self { offset, target })
    }

    /// Unsigned aspect angle
    pub fn angle(&self) -> u32 {
        self.offset.unsigned_abs()
    }

    pub fn name(&self) -> &'static str {
        match self.angle() {
            60 => "sextile",
            90 => "square",
            120 => "trine",
            _ => "aspect",
        }
    }
}

/// Identifies a line by body and kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LineId {
    pub body: Body,
    pub kind: LineKind,
}

impl LineId {
    pub fn new(body: Body, kind: LineKind) -> Self {
        Self { body, kind }
    }
}

impl fmt::Display for LineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.body, self.kind)
    }
}

/// Inclusive index range of the fitted curve carrying one kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentLabel {
    #[serde(rename = "label")]
    pub kind: LineKind,
    pub start: usize,
    pub end: usize,
}

impl SegmentLabel {
    pub fn len(&self) -> usize {
        (self.end + 1).saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }

    fn range(&self) -> Range<usize> {
        self.start..self.end + 1
    }
}

/// One dateline-safe path and its start index within the fitted curve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinePath {
    pub offset: usize,
    pub points: Vec<GeoPoint>,
}

impl LinePath {
    pub fn new(offset: usize, points: Vec<GeoPoint>) -> Self {
        Self { offset, points }
    }

    /// Indices this path covers in the fitted curve
    pub fn range(&self) -> Range<usize> {
        self.offset..self.offset + self.points.len()
    }
}

/// A generated line for one body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineFeature {
    pub body: Body,
    pub kind: LineKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aspect: Option<Aspect>,
    pub paths: Vec<LinePath>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub segments: Vec<SegmentLabel>,
}

impl LineFeature {
    /// Single unlabelled feature
    pub fn new(body: Body, kind: LineKind, paths: Vec<LinePath>) -> Self {
        Self {
            body,
            kind,
            aspect: None,
            paths,
            segments: Vec::new(),
        }
    }

    pub fn with_aspect(mut self, aspect: Aspect) -> Self {
        self.aspect = Some(aspect);
        self
    }

    pub fn with_segments(mut self, segments: Vec<SegmentLabel>) -> Self {
        self.segments = segments;
        self
    }

    pub fn id(&self) -> LineId {
        LineId::new(self.body, self.kind)
    }

    /// Human readable label, e.g. `"Venus AC/DC"` or `"Mars trine ASC"`
    pub fn label(&self) -> String {
        match (self.kind, self.aspect) {
            (LineKind::Aspect, Some(aspect)) => {
                format!("{} {} {}", self.body, aspect.name(), aspect.target)
            }
            (LineKind::Horizon, _) => format!("{} AC/DC", self.body),
            (kind, _) => format!("{} {}", self.body, kind),
        }
    }

    pub fn point_count(&self) -> usize {
        self.paths.iter().map(|p| p.points.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.iter().all(|p| p.points.is_empty())
    }

    /// Raw path geometry
    pub fn coordinates(&self) -> Vec<&[GeoPoint]> {
        self.paths.iter().map(|p| p.points.as_slice()).collect()
    }

    /// Paths belonging to `kind`
    ///
    /// For a feature of that kind this is every path. For a labelled
    /// feature it is the labelled sub-ranges clipped to each path, keeping
    /// pieces with at least two points. A label that directly follows
    /// another one also takes the join point, so both halves of a horizon
    /// curve end at the shared turning point.
    pub fn paths_for(&self, kind: LineKind) -> Vec<Vec<GeoPoint>> {
        if self.kind == kind {
            return self.paths.iter().map(|p| p.points.clone()).collect();
        }

        let mut out = Vec::new();
        for label in self.segments.iter().filter(|s| s.kind == kind && !s.is_empty()) {
            let mut wanted = label.range();
            if self.follows_other_label(label) {
                wanted.start -= 1;
            }
            for path in &self.paths {
                let covered = path.range();
                let start = wanted.start.max(covered.start);
                let end = wanted.end.min(covered.end);
                if end >= start + 2 {
                    out.push(path.points[start - path.offset..end - path.offset].to_vec());
                }
            }
        }
        out
    }

    fn follows_other_label(&self, label: &SegmentLabel) -> bool {
        label.start > 0
            && self
                .segments
                .iter()
                .any(|s| s.kind != label.kind && !s.is_empty() && s.end + 1 == label.start)
    }

    /// Split into `(id, paths)` with horizon curves resolved into AC and DC
    pub fn resolved(&self) -> Vec<(LineId, Vec<Vec<GeoPoint>>)> {
        match self.kind {
            LineKind::Horizon => [LineKind::Ac, LineKind::Dc]
                .into_iter()
                .map(|kind| (LineId::new(self.body, kind), self.paths_for(kind)))
                .filter(|(_, paths)| !paths.is_empty())
                .collect(),
            kind => vec![(self.id(), self.paths_for(kind))],
        }
    }
}
