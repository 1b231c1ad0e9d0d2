//! Helpers for closed polygons given as ordered vertex lists (the closing edge from the last
//! vertex back to the first is implicit).

use crate::{coord::Coord, utils::orient, Scalar};

/// Iterator over polygon edges including the closing one.
pub fn edges(polygon: &[Coord]) -> impl Iterator<Item = (Coord, Coord)> + '_ {
    let n = polygon.len();
    (0..n).map(move |i| (polygon[i], polygon[(i + 1) % n]))
}

/// Signed area (positive for counter-clockwise order in the `cross > 0` sense).
///
/// # Examples
/// ```
/// use coloring_mesh_core::prelude::*;
///
/// let square = [
///     Coord::new(0.0, 0.0),
///     Coord::new(2.0, 0.0),
///     Coord::new(2.0, 2.0),
///     Coord::new(0.0, 2.0),
/// ];
/// assert_eq!(polygon::signed_area(&square), 4.0);
/// assert!(polygon::contains(&square, Coord::new(1.0, 1.0)));
/// assert!(!polygon::contains(&square, Coord::new(3.0, 1.0)));
/// ```
pub fn signed_area(polygon: &[Coord]) -> Scalar {
    if polygon.len() < 3 {
        return 0.0;
    }
    let sum = edges(polygon)
        .map(|(a, b)| {
            let (ax, ay) = a.wide();
            let (bx, by) = b.wide();
            ax * by - bx * ay
        })
        .sum::<f64>();
    (sum * 0.5) as Scalar
}

/// Even-odd ray casting containment test.
pub fn contains(polygon: &[Coord], point: Coord) -> bool {
    let (px, py) = point.wide();
    let mut inside = false;
    for (a, b) in edges(polygon) {
        let (ax, ay) = a.wide();
        let (bx, by) = b.wide();
        if (ay > py) != (by > py) {
            let x = ax + (py - ay) * (bx - ax) / (by - ay);
            if px < x {
                inside = !inside;
            }
        }
    }
    inside
}

/// Axis aligned bounds: `(min, max)`.
pub fn bounds(polygon: &[Coord]) -> Option<(Coord, Coord)> {
    let first = *polygon.first()?;
    Some(polygon.iter().fold((first, first), |(min, max), p| {
        (
            Coord::new(min.x.min(p.x), min.y.min(p.y)),
            Coord::new(max.x.max(p.x), max.y.max(p.y)),
        )
    }))
}

/// Distance from point to segment.
pub fn segment_distance(point: Coord, a: Coord, b: Coord) -> Scalar {
    let ab = b - a;
    let len = ab.sqr_magnitude();
    if len <= 0.0 {
        return point.distance(a);
    }
    let t = ((point - a).dot(ab) / len).max(0.0).min(1.0);
    point.distance(a + ab * t)
}

/// Distance from point to the closest polygon edge.
pub fn boundary_distance(polygon: &[Coord], point: Coord) -> Scalar {
    edges(polygon)
        .map(|(a, b)| segment_distance(point, a, b))
        .fold(Scalar::INFINITY, Scalar::min)
}

/// Check if segments `a0-a1` and `b0-b1` cross at a single point interior to both.
pub fn segments_cross(a0: Coord, a1: Coord, b0: Coord, b1: Coord) -> bool {
    let d1 = orient(a0, a1, b0);
    let d2 = orient(a0, a1, b1);
    let d3 = orient(b0, b1, a0);
    let d4 = orient(b0, b1, a1);
    d1 * d2 < 0.0 && d3 * d4 < 0.0
}

/// Check if segments `a0-a1` and `b0-b1` share any point (touching and collinear overlap
/// included).
pub fn segments_touch(a0: Coord, a1: Coord, b0: Coord, b1: Coord) -> bool {
    fn on_segment(p: Coord, a: Coord, b: Coord) -> bool {
        orient(a, b, p) == 0.0
            && p.x >= a.x.min(b.x)
            && p.x <= a.x.max(b.x)
            && p.y >= a.y.min(b.y)
            && p.y <= a.y.max(b.y)
    }
    segments_cross(a0, a1, b0, b1)
        || on_segment(b0, a0, a1)
        || on_segment(b1, a0, a1)
        || on_segment(a0, b0, b1)
        || on_segment(a1, b0, b1)
}

/// Returns the first point where two non adjacent polygon edges touch, if any.
pub fn find_self_intersection(polygon: &[Coord]) -> Option<Coord> {
    let n = polygon.len();
    if n < 4 {
        return None;
    }
    for i in 0..n {
        let (a0, a1) = (polygon[i], polygon[(i + 1) % n]);
        for j in (i + 2)..n {
            // first and last edges share a vertex
            if i == 0 && j == n - 1 {
                continue;
            }
            let (b0, b1) = (polygon[j], polygon[(j + 1) % n]);
            if segments_touch(a0, a1, b0, b1) {
                return Some(b0);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notch() -> Vec<Coord> {
        vec![
            Coord::new(0.0, 0.0),
            Coord::new(10.0, 0.0),
            Coord::new(10.0, 10.0),
            Coord::new(5.0, 4.0),
            Coord::new(0.0, 10.0),
        ]
    }

    #[test]
    fn test_contains_concave() {
        let polygon = notch();
        assert!(contains(&polygon, Coord::new(5.0, 2.0)));
        assert!(!contains(&polygon, Coord::new(5.0, 8.0)));
        assert!(contains(&polygon, Coord::new(9.0, 8.0)));
    }

    #[test]
    fn test_area_sign_follows_order() {
        let mut polygon = notch();
        let area = signed_area(&polygon);
        polygon.reverse();
        assert_eq!(signed_area(&polygon), -area);
        assert!((area.abs() - 70.0).abs() < 1.0e-4);
    }

    #[test]
    fn test_self_intersection() {
        let bow_tie = [
            Coord::new(0.0, 0.0),
            Coord::new(10.0, 10.0),
            Coord::new(10.0, 0.0),
            Coord::new(0.0, 10.0),
        ];
        assert!(find_self_intersection(&bow_tie).is_some());
        assert!(find_self_intersection(&notch()).is_none());
    }

    #[test]
    fn test_boundary_distance() {
        let polygon = notch();
        assert!((boundary_distance(&polygon, Coord::new(5.0, 1.0)) - 1.0).abs() < 1.0e-6);
        assert!((segment_distance(Coord::new(-3.0, 4.0), Coord::new(0.0, 0.0), Coord::new(5.0, 0.0)) - 5.0).abs() < 1.0e-6);
    }
}
