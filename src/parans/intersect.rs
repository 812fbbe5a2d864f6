//! Planar segment intersection in (longitude, latitude) space

use crate::coordinates::GeoPoint;
use nalgebra::Vector2;

/// Determinants below this are treated as parallel
const PARALLEL_EPS: f64 = 1e-12;

/// A straight segment between two planar points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: Vector2<f64>,
    pub end: Vector2<f64>,
}

impl Segment {
    pub fn new(start: Vector2<f64>, end: Vector2<f64>) -> Self {
        Self { start, end }
    }

    /// Segment between two geographic points, longitude as x
    pub fn from_geo(a: &GeoPoint, b: &GeoPoint) -> Self {
        Self::new(Vector2::new(a.lon, a.lat), Vector2::new(b.lon, b.lat))
    }

    pub fn direction(&self) -> Vector2<f64> {
        self.end - self.start
    }

    /// Whether the axis-aligned bounding boxes overlap
    pub fn bounds_overlap(&self, other: &Segment) -> bool {
        let (ax0, ax1) = min_max(self.start.x, self.end.x);
        let (ay0, ay1) = min_max(self.start.y, self.end.y);
        let (bx0, bx1) = min_max(other.start.x, other.end.x);
        let (by0, by1) = min_max(other.start.y, other.end.y);
        ax0 <= bx1 && bx0 <= ax1 && ay0 <= by1 && by0 <= ay1
    }
}

fn min_max(a: f64, b: f64) -> (f64, f64) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Crossing point of two segments with its parameter along each
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Crossing {
    pub point: Vector2<f64>,
    /// Position along the first segment, 0 at its start and 1 at its end
    pub t: f64,
    /// Position along the second segment
    pub s: f64,
}

/// Intersection of two closed segments; parallel and collinear pairs yield `None`
pub fn segment_intersection(a: &Segment, b: &Segment) -> Option<Crossing> {
    let d1 = a.direction();
    let d2 = b.direction();
    let cross = d1.perp(&d2);
    if cross.abs() < PARALLEL_EPS {
        return None;
    }

    let delta = b.start - a.start;
    let t = delta.perp(&d2) / cross;
    let s = delta.perp(&d1) / cross;
    if !(0.0..=1.0).contains(&t) || !(0.0..=1.0).contains(&s) {
        return None;
    }

    Some(Crossing {
        point: a.start + d1 * t,
        t,
        s,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn seg(x0: f64, y0: f64, x1: f64, y1: f64) -> Segment {
        Segment::new(Vector2::new(x0, y0), Vector2::new(x1, y1))
    }

    #[test]
    fn test_basic_crossing() {
        let hit = segment_intersection(&seg(0.0, 10.0, 20.0, 50.0), &seg(10.0, -85.0, 10.0, 85.0))
            .unwrap();
        assert_abs_diff_eq!(hit.point.x, 10.0, epsilon = 1e-12);
        assert_abs_diff_eq!(hit.point.y, 30.0, epsilon = 1e-12);
        assert_abs_diff_eq!(hit.t, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_miss_outside_segment() {
        assert!(segment_intersection(&seg(0.0, 0.0, 1.0, 1.0), &seg(3.0, 0.0, 3.0, 5.0)).is_none());
    }

    #[test]
    fn test_parallel_and_collinear() {
        assert!(segment_intersection(&seg(0.0, 0.0, 1.0, 0.0), &seg(0.0, 1.0, 1.0, 1.0)).is_none());
        assert!(segment_intersection(&seg(0.0, 0.0, 2.0, 0.0), &seg(1.0, 0.0, 3.0, 0.0)).is_none());
    }

    #[test]
    fn test_touching_endpoint() {
        let hit = segment_intersection(&seg(0.0, 0.0, 1.0, 1.0), &seg(1.0, 1.0, 2.0, 0.0)).unwrap();
        assert_abs_diff_eq!(hit.t, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(hit.s, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_bounds_overlap() {
        assert!(seg(0.0, 0.0, 2.0, 2.0).bounds_overlap(&seg(1.0, 1.0, 3.0, 0.0)));
        assert!(!seg(0.0, 0.0, 1.0, 1.0).bounds_overlap(&seg(2.0, 0.0, 3.0, 1.0)));
    }
}
