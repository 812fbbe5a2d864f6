//! Antimeridian-safe path segmentation
//!
//! A wrapped path that crosses ±180° shows a longitude step close to 360°.
//! Any step above the configured jump threshold, crossings included, ends
//! the current segment and starts the next one. Non-finite points are
//! left out and also end a segment. Pieces shorter than two points are
//! dropped, so an isolated spline overshoot disappears while the curve on
//! either side of it survives.

use crate::constants::{DATELINE_JUMP_DEG, DEFAULT_MAX_JUMP_DEG};
use crate::coordinates::GeoPoint;
use log::debug;
use std::ops::Range;

/// Splits wrapped polylines at antimeridian crossings and oversized steps
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DatelineSegmenter {
    max_jump_deg: f64,
}

impl Default for DatelineSegmenter {
    fn default() -> Self {
        Self {
            max_jump_deg: DEFAULT_MAX_JUMP_DEG,
        }
    }
}

impl DatelineSegmenter {
    pub fn new(max_jump_deg: f64) -> Self {
        Self { max_jump_deg }
    }

    pub fn max_jump_deg(&self) -> f64 {
        self.max_jump_deg
    }

    /// Index ranges between antimeridian crossings, without any filtering
    pub fn crossing_ranges(path: &[GeoPoint]) -> Vec<Range<usize>> {
        if path.is_empty() {
            return Vec::new();
        }
        let mut out = Vec::new();
        let mut start = 0;
        for i in 1..path.len() {
            if (path[i].lon - path[i - 1].lon).abs() > DATELINE_JUMP_DEG {
                out.push(start..i);
                start = i;
            }
        }
        out.push(start..path.len());
        out
    }

    /// Dateline-safe pieces of `path[range]`, as indices into `path`
    pub fn split_range(&self, path: &[GeoPoint], range: Range<usize>) -> Vec<Range<usize>> {
        let end = range.end.min(path.len());
        let mut out = Vec::new();
        let mut breaks = 0usize;
        let mut start: Option<usize> = None;

        for i in range.start..end {
            if !path[i].is_finite() {
                if let Some(s) = start.take() {
                    push_piece(&mut out, s..i);
                }
                breaks += 1;
                continue;
            }
            match start {
                None => start = Some(i),
                Some(s) if (path[i].lon - path[i - 1].lon).abs() > self.max_jump_deg => {
                    push_piece(&mut out, s..i);
                    start = Some(i);
                    breaks += 1;
                }
                Some(_) => {}
            }
        }
        if let Some(s) = start {
            push_piece(&mut out, s..end);
        }

        if breaks > 0 {
            debug!(
                "split {} points into {} segments at {} breaks (max jump {} deg)",
                end.saturating_sub(range.start),
                out.len(),
                breaks,
                self.max_jump_deg
            );
        }
        out
    }

    /// Index ranges of the segments that survive
    ///
    /// Every returned range holds at least two points, all finite, with no
    /// consecutive longitude step above `max_jump_deg`.
    pub fn ranges(&self, path: &[GeoPoint]) -> Vec<Range<usize>> {
        Self::crossing_ranges(path)
            .into_iter()
            .flat_map(|r| self.split_range(path, r))
            .collect()
    }

    /// Split `path` into dateline-safe segments
    pub fn split(&self, path: &[GeoPoint]) -> Vec<Vec<GeoPoint>> {
        self.ranges(path)
            .into_iter()
            .map(|r| path[r].to_vec())
            .collect()
    }
}

fn push_piece(out: &mut Vec<Range<usize>>, piece: Range<usize>) {
    if piece.len() >= 2 {
        out.push(piece);
    }
}

/// Split `path` with the given jump threshold
pub fn split_dateline(path: &[GeoPoint], max_jump_deg: f64) -> Vec<Vec<GeoPoint>> {
    DatelineSegmenter::new(max_jump_deg).split(path)
}
