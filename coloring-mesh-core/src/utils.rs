use crate::{coord::Coord, error::TriangulationDefect};
use triangulation::{Delaunay, Point};

/// Twice the signed area of triangle `abc`, positive when counter-clockwise.
#[inline]
pub(crate) fn orient(a: Coord, b: Coord, c: Coord) -> f64 {
    let (ax, ay) = a.wide();
    let (bx, by) = b.wide();
    let (cx, cy) = c.wide();
    (bx - ax) * (cy - ay) - (by - ay) * (cx - ax)
}

/// In-circle predicate: positive when `d` lies strictly inside the circumcircle of the
/// counter-clockwise triangle `abc`, zero when cocircular.
///
/// Returns `(determinant, magnitude)` where magnitude is the scale of the lifted terms, used
/// to build relative tolerances.
#[inline]
pub(crate) fn in_circle(a: Coord, b: Coord, c: Coord, d: Coord) -> (f64, f64) {
    let (dx, dy) = d.wide();
    let (adx, ady) = (a.x as f64 - dx, a.y as f64 - dy);
    let (bdx, bdy) = (b.x as f64 - dx, b.y as f64 - dy);
    let (cdx, cdy) = (c.x as f64 - dx, c.y as f64 - dy);
    let ab_det = adx * bdy - bdx * ady;
    let bc_det = bdx * cdy - cdx * bdy;
    let ca_det = cdx * ady - adx * cdy;
    let a_lift = adx * adx + ady * ady;
    let b_lift = bdx * bdx + bdy * bdy;
    let c_lift = cdx * cdx + cdy * cdy;
    let det = a_lift * bc_det + b_lift * ca_det + c_lift * ab_det;
    let magnitude = a_lift.max(b_lift).max(c_lift);
    (det, magnitude * magnitude)
}

/// Boundary inclusive containment test for counter-clockwise triangle `abc`.
#[inline]
pub(crate) fn triangle_contains(a: Coord, b: Coord, c: Coord, p: Coord, epsilon: f64) -> bool {
    orient(a, b, p) >= -epsilon && orient(b, c, p) >= -epsilon && orient(c, a, p) >= -epsilon
}

/// Unconstrained Delaunay triangulation of given points.
///
/// # Returns
/// Index triples with consistent counter-clockwise orientation, degenerate triangles included.
pub(crate) fn triangulate(points: &[Coord]) -> Result<Vec<[usize; 3]>, TriangulationDefect> {
    let input = points
        .iter()
        .map(|p| Point::new(p.x, p.y))
        .collect::<Vec<_>>();
    let delaunay = Delaunay::new(&input).ok_or(TriangulationDefect::Delaunay)?;
    let mut triangles = delaunay
        .dcel
        .vertices
        .chunks(3)
        .filter(|t| t.len() == 3)
        .map(|t| [t[0], t[1], t[2]])
        .collect::<Vec<_>>();
    let mut proper = 0;
    for t in &mut triangles {
        let area = orient(points[t[0]], points[t[1]], points[t[2]]);
        if area < 0.0 {
            t.swap(1, 2);
        }
        if area != 0.0 {
            proper += 1;
        }
    }
    if proper == 0 {
        return Err(TriangulationDefect::Collinear);
    }
    Ok(triangles)
}
