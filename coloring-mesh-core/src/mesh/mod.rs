pub mod settings;

use crate::{
    coord::Coord,
    triangle::{Triangle, TriangleId, VertexId},
    utils::orient,
    Scalar,
};
use serde::{Deserialize, Serialize};

/// Mesh vertex.
#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    /// Index of this vertex in mesh vertex table.
    pub id: VertexId,
    /// Position in image space.
    pub point: Coord,
    /// True if vertex comes from the contour.
    #[serde(default)]
    pub boundary: bool,
}

/// Triangulated coloring mesh.
///
/// Triangles are counter-clockwise (positive cross product) and reference vertices by their
/// index in the vertex table.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColoringMesh {
    /// List of vertices.
    pub vertices: Vec<Vertex>,
    /// List of triangles.
    pub triangles: Vec<Triangle>,
}

impl ColoringMesh {
    /// Creates mesh from raw points and index triples, compacting unused points away.
    ///
    /// # Arguments
    /// * `points` - Point positions.
    /// * `boundary` - Number of leading points that come from the contour.
    /// * `triangles` - Index triples into `points`.
    pub(crate) fn bake(points: &[Coord], boundary: usize, triangles: &[[usize; 3]]) -> Self {
        let mut mapping = vec![None; points.len()];
        let mut vertices = Vec::with_capacity(points.len());
        let triangles = triangles
            .iter()
            .map(|t| {
                let mut ids = [0; 3];
                for (id, index) in ids.iter_mut().zip(t.iter()) {
                    *id = *mapping[*index].get_or_insert_with(|| {
                        vertices.push(Vertex {
                            id: vertices.len(),
                            point: points[*index],
                            boundary: *index < boundary,
                        });
                        vertices.len() - 1
                    });
                }
                Triangle::from(ids)
            })
            .collect::<Vec<_>>();
        Self {
            vertices,
            triangles,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Returns vertex positions of a triangle, `None` for unknown triangle or vertex ids.
    pub fn triangle_points(&self, id: TriangleId) -> Option<[Coord; 3]> {
        let t = self.triangles.get(id)?;
        Some([
            self.vertices.get(t.a)?.point,
            self.vertices.get(t.b)?.point,
            self.vertices.get(t.c)?.point,
        ])
    }

    pub fn centroid(&self, id: TriangleId) -> Option<Coord> {
        self.triangle_points(id)
            .map(|[a, b, c]| Coord::centroid(a, b, c))
    }

    /// Signed triangle area, positive for counter-clockwise triangles.
    pub fn area(&self, id: TriangleId) -> Option<Scalar> {
        self.triangle_points(id)
            .map(|[a, b, c]| (orient(a, b, c) * 0.5) as Scalar)
    }

    /// Returns iterator over `(triangle id, centroid)`.
    pub fn centroids(&self) -> impl Iterator<Item = (TriangleId, Coord)> + '_ {
        (0..self.triangles.len()).filter_map(move |id| Some((id, self.centroid(id)?)))
    }

    /// Sum of all triangle areas.
    pub fn total_area(&self) -> Scalar {
        (0..self.triangles.len())
            .filter_map(|id| self.triangle_points(id))
            .map(|[a, b, c]| orient(a, b, c) * 0.5)
            .sum::<f64>() as Scalar
    }

    /// Axis aligned bounds of all vertices: `(min, max)`.
    pub fn bounds(&self) -> Option<(Coord, Coord)> {
        let first = self.vertices.first()?.point;
        Some(self.vertices.iter().fold((first, first), |(min, max), v| {
            (
                Coord::new(min.x.min(v.point.x), min.y.min(v.point.y)),
                Coord::new(max.x.max(v.point.x), max.y.max(v.point.y)),
            )
        }))
    }

    /// Returns iterator over unique undirected edges as vertex id pairs `(lower, higher)`.
    pub fn edges(&self) -> impl Iterator<Item = (VertexId, VertexId)> {
        let mut edges = self
            .triangles
            .iter()
            .flat_map(|t| t.edges())
            .map(|(a, b)| (a.min(b), a.max(b)))
            .collect::<Vec<_>>();
        edges.sort_unstable();
        edges.dedup();
        edges.into_iter()
    }

    pub fn boundary_vertices_count(&self) -> usize {
        self.vertices.iter().filter(|v| v.boundary).count()
    }

    pub fn interior_vertices_count(&self) -> usize {
        self.vertices.len() - self.boundary_vertices_count()
    }
}
