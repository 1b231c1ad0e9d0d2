//! Constrained Delaunay triangulation of a contour polygon and its interior points.
//!
//! Base triangulation comes from the `triangulation` crate, computed over the input points
//! enclosed by a helper super triangle so that no input point lies on the convex hull. Contour
//! edges are then forced into the triangulation by edge flips, remaining edges are legalized
//! with Lawson flips and finally triangles outside of the contour are discarded.

use crate::{
    coord::Coord,
    error::{ColoringMeshError, TriangulationDefect},
    mesh::{settings::GenerateColoringMeshSettings, ColoringMesh},
    polygon,
    utils::{in_circle, orient, triangulate as delaunay},
    Scalar,
};
use std::collections::{HashMap, HashSet, VecDeque};

/// Relative tolerance of in-circle test used when legalizing edges.
const IN_CIRCLE_TOLERANCE: f64 = 1.0e-10;
/// Relative tolerance used to detect vertices lying on constraint segments.
const COLLINEAR_TOLERANCE: f64 = 1.0e-9;

/// Triangulates contour polygon with interior points.
///
/// # Arguments
/// * `boundary` - Closed contour polygon, its consecutive points become mesh edges.
/// * `interior` - Points inside the contour.
/// * `settings` - Mesh generation settings.
///
/// # Returns
/// Mesh covering the contour polygon or triangulation error.
///
/// # Examples
/// ```
/// use coloring_mesh_core::prelude::*;
///
/// let square = contour::frame(100, 100);
/// let settings = GenerateColoringMeshSettings::default();
/// let mesh = triangulator::triangulate(&square, &[Coord::new(49.5, 49.5)], &settings).unwrap();
/// assert_eq!(mesh.vertices.len(), 5);
/// assert_eq!(mesh.triangles.len(), 4);
/// assert!((mesh.total_area() - 99.0 * 99.0).abs() < 1.0e-2);
/// ```
pub fn triangulate(
    boundary: &[Coord],
    interior: &[Coord],
    settings: &GenerateColoringMeshSettings,
) -> Result<ColoringMesh, ColoringMeshError> {
    let (mut points, boundary_count) = merge_points(boundary, interior, settings.dedup_epsilon);
    if boundary_count < 3 || points.len() < 3 {
        return Err(TriangulationDefect::TooFewPoints(points.len().min(boundary_count)).into());
    }
    if is_collinear(&points) {
        return Err(TriangulationDefect::Collinear.into());
    }
    let count = points.len();
    points.extend(super_triangle(&points));

    let base = delaunay(&points)?;
    let mut referenced = vec![false; points.len()];
    for index in base.iter().flatten() {
        referenced[*index] = true;
    }
    if let Some(missing) = referenced.iter().position(|r| !r) {
        log::warn!("Point {} was skipped by base triangulation", missing);
        return Err(TriangulationDefect::Delaunay.into());
    }

    let mut triangulation = Triangulation::new(&points, base);
    for from in 0..boundary_count {
        let to = (from + 1) % boundary_count;
        triangulation.insert_constraint(from, to, settings.max_recovery_flips)?;
    }
    let flips = triangulation.legalize(settings.max_recovery_flips);

    let contour = &points[..boundary_count];
    let min_area = settings.min_triangle_area as f64 * 2.0;
    let triangles = triangulation
        .triangles
        .into_iter()
        .filter(|t| {
            let (a, b, c) = (points[t[0]], points[t[1]], points[t[2]]);
            let area = orient(a, b, c);
            // slivers along the contour are the only cover of their area
            let touches_contour = t.iter().any(|i| *i < boundary_count);
            t.iter().all(|i| *i < count)
                && (area >= min_area || (touches_contour && area > 0.0))
                && polygon::contains(contour, Coord::centroid(a, b, c))
        })
        .collect::<Vec<_>>();

    let expected = polygon::signed_area(contour).abs() as f64;
    let covered = triangles
        .iter()
        .map(|t| orient(points[t[0]], points[t[1]], points[t[2]]) * 0.5)
        .sum::<f64>();
    if triangles.is_empty()
        || (covered - expected).abs() > settings.coverage_tolerance as f64 * expected
    {
        return Err(TriangulationDefect::Coverage(covered as Scalar, expected as Scalar).into());
    }
    log::debug!(
        "Triangulated {} boundary and {} interior points into {} triangles ({} legalizing flips)",
        boundary_count,
        count - boundary_count,
        triangles.len(),
        flips
    );
    Ok(ColoringMesh::bake(&points[..count], boundary_count, &triangles))
}

/// Joins boundary and interior points dropping duplicates.
///
/// # Returns
/// `(points, boundary points count)`, boundary points go first.
fn merge_points(boundary: &[Coord], interior: &[Coord], epsilon: Scalar) -> (Vec<Coord>, usize) {
    let mut points: Vec<Coord> = Vec::with_capacity(boundary.len() + interior.len());
    for point in boundary {
        if points.last().map_or(true, |last| last.distance(*point) > epsilon) {
            points.push(*point);
        }
    }
    while points.len() > 1 && points[0].distance(points[points.len() - 1]) <= epsilon {
        points.pop();
    }
    let boundary_count = points.len();

    let cell = epsilon.max(Scalar::EPSILON);
    let key = |p: Coord| ((p.x / cell).floor() as i64, (p.y / cell).floor() as i64);
    let mut grid = HashMap::<(i64, i64), Vec<usize>>::new();
    for (index, point) in points.iter().enumerate() {
        grid.entry(key(*point)).or_default().push(index);
    }
    for point in interior {
        let (cx, cy) = key(*point);
        let duplicate = (-1..=1).any(|dy| {
            (-1..=1).any(|dx| {
                grid.get(&(cx + dx, cy + dy)).map_or(false, |indices| {
                    indices
                        .iter()
                        .any(|i| points[*i].distance(*point) <= epsilon)
                })
            })
        });
        if !duplicate {
            grid.entry((cx, cy)).or_default().push(points.len());
            points.push(*point);
        }
    }
    (points, boundary_count)
}

fn is_collinear(points: &[Coord]) -> bool {
    let a = points[0];
    match points.iter().find(|p| **p != a) {
        Some(b) => points.iter().all(|c| orient(a, *b, *c) == 0.0),
        None => true,
    }
}

/// Triangle enclosing all points with a wide margin.
fn super_triangle(points: &[Coord]) -> [Coord; 3] {
    let (min, max) = polygon::bounds(points).unwrap_or_default();
    let center = (min + max) * 0.5;
    let size = ((max.x - min.x).max(max.y - min.y) * 0.5).max(1.0);
    [
        Coord::new(center.x - 20.0 * size, center.y - 10.0 * size),
        Coord::new(center.x + 20.0 * size, center.y - 10.0 * size),
        Coord::new(center.x, center.y + 20.0 * size),
    ]
}

#[inline]
fn edge_key(a: usize, b: usize) -> (usize, usize) {
    (a.min(b), a.max(b))
}

#[inline]
fn directed_edges(t: [usize; 3]) -> [(usize, usize); 3] {
    [(t[0], t[1]), (t[1], t[2]), (t[2], t[0])]
}

/// Triangle soup with directed edge lookup.
struct Triangulation<'a> {
    points: &'a [Coord],
    triangles: Vec<[usize; 3]>,
    /// Directed edge -> triangle that has it in counter-clockwise order.
    edges: HashMap<(usize, usize), usize>,
    constraints: HashSet<(usize, usize)>,
}

impl<'a> Triangulation<'a> {
    fn new(points: &'a [Coord], triangles: Vec<[usize; 3]>) -> Self {
        let edges = triangles
            .iter()
            .enumerate()
            .flat_map(|(index, t)| directed_edges(*t).map(|e| (e, index)))
            .collect();
        Self {
            points,
            triangles,
            edges,
            constraints: Default::default(),
        }
    }

    fn has_edge(&self, a: usize, b: usize) -> bool {
        self.edges.contains_key(&(a, b)) || self.edges.contains_key(&(b, a))
    }

    fn is_constrained(&self, a: usize, b: usize) -> bool {
        self.constraints.contains(&edge_key(a, b))
    }

    /// Undirected edges in deterministic order.
    fn sorted_edges(&self) -> Vec<(usize, usize)> {
        let mut result = self
            .edges
            .keys()
            .map(|(a, b)| edge_key(*a, *b))
            .collect::<Vec<_>>();
        result.sort_unstable();
        result.dedup();
        result
    }

    fn apex(&self, triangle: usize, a: usize, b: usize) -> Option<usize> {
        self.triangles[triangle]
            .iter()
            .copied()
            .find(|i| *i != a && *i != b)
    }

    /// Triangles `(u, v, p)` and `(v, u, q)` sharing edge `u-v`.
    ///
    /// # Returns
    /// `(first triangle, second triangle, p, q)`
    fn quad(&self, u: usize, v: usize) -> Option<(usize, usize, usize, usize)> {
        let first = *self.edges.get(&(u, v))?;
        let second = *self.edges.get(&(v, u))?;
        Some((
            first,
            second,
            self.apex(first, u, v)?,
            self.apex(second, u, v)?,
        ))
    }

    /// Replaces edge `u-v` with the other diagonal of its quad when the quad is strictly convex.
    ///
    /// # Returns
    /// New diagonal `(p, q)` or `None` when edge cannot be flipped.
    fn flip(&mut self, u: usize, v: usize) -> Option<(usize, usize)> {
        let (first, second, p, q) = self.quad(u, v)?;
        let points = self.points;
        if !polygon::segments_cross(points[u], points[v], points[p], points[q]) {
            return None;
        }
        for triangle in [first, second] {
            for edge in directed_edges(self.triangles[triangle]) {
                self.edges.remove(&edge);
            }
        }
        self.triangles[first] = [u, q, p];
        self.triangles[second] = [q, v, p];
        for triangle in [first, second] {
            for edge in directed_edges(self.triangles[triangle]) {
                self.edges.insert(edge, triangle);
            }
        }
        Some((p, q))
    }

    /// Vertex lying on the open segment `a-b` closest to `a`.
    fn vertex_on_segment(&self, a: usize, b: usize) -> Option<usize> {
        let (pa, pb) = (self.points[a], self.points[b]);
        let (ax, ay) = pa.wide();
        let (bx, by) = pb.wide();
        let (dx, dy) = (bx - ax, by - ay);
        let length = dx * dx + dy * dy;
        if length <= 0.0 {
            return None;
        }
        self.points
            .iter()
            .enumerate()
            .filter(|(index, _)| *index != a && *index != b)
            .filter_map(|(index, point)| {
                if orient(pa, pb, *point).abs() > COLLINEAR_TOLERANCE * length {
                    return None;
                }
                let (px, py) = point.wide();
                let factor = ((px - ax) * dx + (py - ay) * dy) / length;
                if factor > 0.0 && factor < 1.0 {
                    Some((index, factor))
                } else {
                    None
                }
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(index, _)| index)
    }

    /// Makes segment `from-to` an edge of the triangulation and marks it as constraint.
    fn insert_constraint(
        &mut self,
        from: usize,
        to: usize,
        max_flips: usize,
    ) -> Result<(), TriangulationDefect> {
        let mut pending = vec![(from, to)];
        while let Some((a, b)) = pending.pop() {
            if !self.has_edge(a, b) {
                if let Some(c) = self.vertex_on_segment(a, b) {
                    pending.push((c, b));
                    pending.push((a, c));
                    continue;
                }
                if !self.recover_edge(a, b, max_flips) {
                    return Err(TriangulationDefect::ConstraintRecovery { from: a, to: b });
                }
            }
            self.constraints.insert(edge_key(a, b));
        }
        Ok(())
    }

    /// Flips edges crossing segment `a-b` until the segment becomes an edge.
    fn recover_edge(&mut self, a: usize, b: usize, max_flips: usize) -> bool {
        let points = self.points;
        let (pa, pb) = (points[a], points[b]);
        let crosses = |u: usize, v: usize| polygon::segments_cross(pa, pb, points[u], points[v]);
        let mut crossing = self
            .sorted_edges()
            .into_iter()
            .filter(|(u, v)| crosses(*u, *v))
            .collect::<VecDeque<_>>();
        let mut attempts = 0;
        while let Some((u, v)) = crossing.pop_front() {
            attempts += 1;
            if attempts > max_flips || self.is_constrained(u, v) {
                log::debug!(
                    "Giving up recovery of edge {} -> {} after {} attempts",
                    a,
                    b,
                    attempts
                );
                return false;
            }
            match self.flip(u, v) {
                Some((p, q)) => {
                    if crosses(p, q) {
                        crossing.push_back((p, q));
                    }
                }
                None => crossing.push_back((u, v)),
            }
        }
        self.has_edge(a, b)
    }

    /// Lawson flips of all non-constraint edges failing the in-circle test.
    ///
    /// # Returns
    /// Number of performed flips.
    fn legalize(&mut self, max_flips: usize) -> usize {
        let mut stack = self.sorted_edges();
        let mut flips = 0;
        while let Some((u, v)) = stack.pop() {
            if self.is_constrained(u, v) {
                continue;
            }
            let (p, q) = match self.quad(u, v) {
                Some((_, _, p, q)) => (p, q),
                None => continue,
            };
            let points = self.points;
            let (det, scale) = in_circle(points[u], points[v], points[p], points[q]);
            if det <= IN_CIRCLE_TOLERANCE * scale || self.flip(u, v).is_none() {
                continue;
            }
            flips += 1;
            if flips >= max_flips {
                log::warn!("Edge legalization stopped after {} flips", flips);
                break;
            }
            stack.extend([(u, q), (q, v), (v, p), (p, u)]);
        }
        flips
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{contour::frame, interior::sample_interior};

    fn slit() -> Vec<Coord> {
        vec![
            Coord::new(0.0, 0.0),
            Coord::new(100.0, 0.0),
            Coord::new(100.0, 100.0),
            Coord::new(55.0, 100.0),
            Coord::new(50.0, 20.0),
            Coord::new(45.0, 100.0),
            Coord::new(0.0, 100.0),
        ]
    }

    fn vertex_id(mesh: &ColoringMesh, point: Coord) -> usize {
        mesh.vertices
            .iter()
            .position(|v| v.point == point)
            .unwrap()
    }

    fn assert_valid(mesh: &ColoringMesh, contour: &[Coord]) {
        assert!(!mesh.is_empty());
        for id in 0..mesh.triangles.len() {
            assert!(mesh.area(id).unwrap() > 0.0);
            assert!(polygon::contains(contour, mesh.centroid(id).unwrap()));
        }
        let expected = polygon::signed_area(contour).abs();
        assert!((mesh.total_area() - expected).abs() <= expected * 1.0e-3);
        let edges = mesh.edges().collect::<HashSet<_>>();
        for (a, b) in polygon::edges(contour) {
            let edge = edge_key(vertex_id(mesh, a), vertex_id(mesh, b));
            assert!(edges.contains(&edge), "missing contour edge {:?} -> {:?}", a, b);
        }
    }

    fn assert_locally_delaunay(mesh: &ColoringMesh) {
        let mut owners = HashMap::new();
        for (index, t) in mesh.triangles.iter().enumerate() {
            for edge in t.edges() {
                owners.insert(edge, index);
            }
        }
        for ((u, v), first) in &owners {
            if let Some(second) = owners.get(&(*v, *u)) {
                let t1 = mesh.triangles[*first];
                let t2 = mesh.triangles[*second];
                let q = t2.ids().into_iter().find(|i| i != u && i != v).unwrap();
                let p = mesh.vertices[t1.ids().into_iter().find(|i| i != u && i != v).unwrap()];
                let (det, scale) = in_circle(
                    mesh.vertices[*u].point,
                    mesh.vertices[*v].point,
                    p.point,
                    mesh.vertices[q].point,
                );
                assert!(det <= 1.0e-6 * scale, "edge {} - {} is not Delaunay", u, v);
            }
        }
    }

    #[test]
    fn test_square_corners_only() {
        let square = frame(100, 100);
        let mesh = triangulate(&square, &[], &Default::default()).unwrap();
        assert_eq!(mesh.triangles.len(), 2);
        assert_eq!(mesh.boundary_vertices_count(), 4);
        assert_valid(&mesh, &square);
    }

    #[test]
    fn test_convex_domain_is_delaunay() {
        let square = frame(100, 100);
        let settings = GenerateColoringMeshSettings::default();
        let boundary = crate::contour::resample(&square, 25);
        let interior = sample_interior(&boundary, 8, (100, 100), &settings);
        let mesh = triangulate(&boundary, &interior, &settings).unwrap();
        assert_valid(&mesh, &boundary);
        assert_eq!(mesh.vertices.len(), boundary.len() + interior.len());
        for t in &mesh.triangles {
            let [a, b, c] = t.ids().map(|i| mesh.vertices[i].point);
            for (index, vertex) in mesh.vertices.iter().enumerate() {
                if t.contains_vertex(index) {
                    continue;
                }
                let (det, scale) = in_circle(a, b, c, vertex.point);
                assert!(det <= 1.0e-6 * scale);
            }
        }
    }

    #[test]
    fn test_slit_recovers_contour_edges() {
        let contour = slit();
        let settings = GenerateColoringMeshSettings::default();
        let interior = sample_interior(&contour, 10, (101, 101), &settings);
        assert!(interior.len() > 40);
        let mesh = triangulate(&contour, &interior, &settings).unwrap();
        assert_valid(&mesh, &contour);
        assert_locally_delaunay(&mesh);
        assert!((mesh.total_area() - 9600.0).abs() < 1.0);
    }

    #[test]
    fn test_duplicates_are_merged() {
        let square = frame(50, 50);
        let boundary = vec![
            square[0],
            square[1],
            square[1],
            square[2],
            square[3],
            square[0],
        ];
        let interior = vec![
            Coord::new(20.0, 20.0),
            Coord::new(20.001, 20.0),
            square[2],
        ];
        let mesh = triangulate(&boundary, &interior, &Default::default()).unwrap();
        assert_eq!(mesh.vertices.len(), 5);
        assert_eq!(mesh.boundary_vertices_count(), 4);
        assert_eq!(mesh.triangles.len(), 4);
    }

    #[test]
    fn test_degenerate_input_fails() {
        let settings = GenerateColoringMeshSettings::default();
        assert_eq!(
            triangulate(
                &[Coord::new(0.0, 0.0), Coord::new(1.0, 1.0)],
                &[],
                &settings
            ),
            Err(ColoringMeshError::TriangulationFailed(
                TriangulationDefect::TooFewPoints(2)
            ))
        );
        assert_eq!(
            triangulate(
                &[
                    Coord::new(0.0, 0.0),
                    Coord::new(5.0, 5.0),
                    Coord::new(10.0, 10.0)
                ],
                &[Coord::new(2.0, 2.0)],
                &settings
            ),
            Err(ColoringMeshError::TriangulationFailed(
                TriangulationDefect::Collinear
            ))
        );
    }

    #[test]
    fn test_triangulation_is_idempotent() {
        let contour = slit();
        let settings = GenerateColoringMeshSettings::default();
        let interior = sample_interior(&contour, 12, (101, 101), &settings);
        assert_eq!(
            triangulate(&contour, &interior, &settings),
            triangulate(&contour, &interior, &settings)
        );
    }
}
