use crate::{
    coord::Coord,
    mesh::ColoringMesh,
    triangle::TriangleId,
    utils::triangle_contains,
    Scalar,
};

/// Uniform grid over mesh bounds answering point location queries.
///
/// Every triangle is registered in each cell overlapped by its bounding box, in ascending id
/// order, so the lowest id wins when a point lies on a shared edge or vertex.
///
/// # Examples
/// ```
/// use coloring_mesh_core::prelude::*;
///
/// let square = contour::frame(11, 11);
/// let mesh = triangulator::triangulate(&square, &[Coord::new(5.0, 5.0)], &Default::default())
///     .unwrap();
/// let index = MeshIndex::new(&mesh, 1.0);
/// for (id, centroid) in mesh.centroids() {
///     assert_eq!(index.locate(centroid), Some(id));
/// }
/// assert_eq!(index.locate(Coord::new(-1.0, 5.0)), None);
/// ```
#[derive(Debug, Default, Clone, PartialEq)]
pub struct MeshIndex {
    min: Coord,
    max: Coord,
    cell_size: Scalar,
    columns: usize,
    rows: usize,
    cells: Vec<Vec<TriangleId>>,
    triangles: Vec<[Coord; 3]>,
}

impl MeshIndex {
    /// Builds index of mesh triangles.
    ///
    /// # Arguments
    /// * `mesh` - Indexed mesh.
    /// * `cell_scale` - Multiplier of the cell size that gives one triangle per cell on average.
    pub fn new(mesh: &ColoringMesh, cell_scale: Scalar) -> Self {
        let triangles = (0..mesh.triangles.len())
            .filter_map(|id| mesh.triangle_points(id))
            .collect::<Vec<_>>();
        let (min, max) = match mesh.bounds() {
            Some(bounds) if !triangles.is_empty() => bounds,
            _ => return Self::default(),
        };
        let area = ((max.x - min.x) * (max.y - min.y)).max(Scalar::EPSILON);
        let cell_size = ((area / triangles.len() as Scalar).sqrt() * cell_scale.max(0.1))
            .max(Scalar::EPSILON);
        let columns = (((max.x - min.x) / cell_size).floor() as usize + 1).max(1);
        let rows = (((max.y - min.y) / cell_size).floor() as usize + 1).max(1);
        let mut result = Self {
            min,
            max,
            cell_size,
            columns,
            rows,
            cells: vec![vec![]; columns * rows],
            triangles: vec![],
        };
        for (id, [a, b, c]) in triangles.iter().enumerate() {
            let (fx, fy) = result.cell_of(Coord::new(a.x.min(b.x).min(c.x), a.y.min(b.y).min(c.y)));
            let (tx, ty) = result.cell_of(Coord::new(a.x.max(b.x).max(c.x), a.y.max(b.y).max(c.y)));
            for row in fy..=ty {
                for column in fx..=tx {
                    result.cells[row * columns + column].push(id);
                }
            }
        }
        result.triangles = triangles;
        log::debug!(
            "Indexed {} triangles in {} x {} cells of size {}",
            result.triangles.len(),
            columns,
            rows,
            cell_size
        );
        result
    }

    pub fn cell_size(&self) -> Scalar {
        self.cell_size
    }

    /// Returns `(columns, rows)`.
    pub fn grid_size(&self) -> (usize, usize) {
        (self.columns, self.rows)
    }

    /// Number of indexed triangles.
    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Finds triangle containing given point, boundary inclusive.
    pub fn locate(&self, point: Coord) -> Option<TriangleId> {
        self.candidates(point)
            .iter()
            .copied()
            .find(|id| {
                let [a, b, c] = self.triangles[*id];
                triangle_contains(a, b, c, point, 0.0)
            })
    }

    /// Triangles registered in the cell of given point, ascending by id.
    pub fn candidates(&self, point: Coord) -> &[TriangleId] {
        if self.is_empty()
            || !(point.x >= self.min.x
                && point.x <= self.max.x
                && point.y >= self.min.y
                && point.y <= self.max.y)
        {
            return &[];
        }
        let (column, row) = self.cell_of(point);
        &self.cells[row * self.columns + column]
    }

    fn cell_of(&self, point: Coord) -> (usize, usize) {
        let column = ((point.x - self.min.x) / self.cell_size).floor().max(0.0) as usize;
        let row = ((point.y - self.min.y) / self.cell_size).floor().max(0.0) as usize;
        (column.min(self.columns - 1), row.min(self.rows - 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        contour::{frame, resample},
        interior::sample_interior,
        mesh::settings::GenerateColoringMeshSettings,
        triangulator::triangulate,
    };

    fn mesh() -> ColoringMesh {
        let settings = GenerateColoringMeshSettings::default();
        let contour = vec![
            Coord::new(0.0, 0.0),
            Coord::new(80.0, 0.0),
            Coord::new(80.0, 60.0),
            Coord::new(40.0, 20.0),
            Coord::new(0.0, 60.0),
        ];
        let boundary = resample(&contour, 30);
        let interior = sample_interior(&boundary, 8, (81, 61), &settings);
        triangulate(&boundary, &interior, &settings).unwrap()
    }

    fn naive_locate(mesh: &ColoringMesh, point: Coord) -> Option<TriangleId> {
        (0..mesh.triangles.len()).find(|id| {
            let [a, b, c] = mesh.triangle_points(*id).unwrap();
            triangle_contains(a, b, c, point, 0.0)
        })
    }

    #[test]
    fn test_centroids_locate_to_own_triangle() {
        let mesh = mesh();
        let index = MeshIndex::new(&mesh, 1.0);
        assert_eq!(index.len(), mesh.triangles.len());
        for (id, centroid) in mesh.centroids() {
            assert_eq!(index.locate(centroid), Some(id));
        }
    }

    #[test]
    fn test_grid_agrees_with_naive_scan() {
        let mesh = mesh();
        let mut rng = fastrand::Rng::with_seed(3);
        for scale in [0.5, 1.0, 3.0] {
            let index = MeshIndex::new(&mesh, scale);
            for _ in 0..2000 {
                let point = Coord::new(rng.f32() * 100.0 - 10.0, rng.f32() * 80.0 - 10.0);
                assert_eq!(index.locate(point), naive_locate(&mesh, point));
            }
            for vertex in &mesh.vertices {
                assert_eq!(index.locate(vertex.point), naive_locate(&mesh, vertex.point));
            }
        }
    }

    #[test]
    fn test_outside_points() {
        let mesh = mesh();
        let index = MeshIndex::new(&mesh, 1.0);
        // inside bounds but in the notch
        assert_eq!(index.locate(Coord::new(40.0, 50.0)), None);
        assert_eq!(index.locate(Coord::new(81.0, 10.0)), None);
        assert_eq!(index.locate(Coord::new(10.0, -0.5)), None);
        assert!(MeshIndex::new(&ColoringMesh::default(), 1.0)
            .locate(Coord::new(0.0, 0.0))
            .is_none());
    }

    #[test]
    fn test_shared_vertex_resolves_to_lowest_id() {
        let square = frame(11, 11);
        let settings = GenerateColoringMeshSettings::default();
        let mesh = triangulate(&square, &[Coord::new(5.0, 5.0)], &settings).unwrap();
        let index = MeshIndex::new(&mesh, 1.0);
        assert_eq!(index.locate(Coord::new(5.0, 5.0)), Some(0));
    }
}
