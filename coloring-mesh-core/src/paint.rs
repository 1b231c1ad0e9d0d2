use crate::{color::Color, coord::Coord, mesh::ColoringMesh, triangle::TriangleId, Scalar};
use kiddo::{immutable::float::kdtree::ImmutableKdTree, SquaredEuclidean};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Color assigned to a triangle identified by its centroid.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaintRecord {
    pub centroid: Coord,
    pub color: Color,
}

/// Settings of triangle painting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaintSettings {
    /// Centroids are rounded to multiples of this value when used as record keys.
    #[serde(default = "PaintSettings::default_centroid_bucket")]
    pub centroid_bucket: Scalar,
    /// Maximal distance between old and new centroid when moving colors to a rebuilt mesh.
    #[serde(default = "PaintSettings::default_rematch_tolerance")]
    pub rematch_tolerance: Scalar,
}

impl Default for PaintSettings {
    fn default() -> Self {
        Self {
            centroid_bucket: Self::default_centroid_bucket(),
            rematch_tolerance: Self::default_rematch_tolerance(),
        }
    }
}

impl PaintSettings {
    fn default_centroid_bucket() -> Scalar {
        0.5
    }

    fn default_rematch_tolerance() -> Scalar {
        4.0
    }
}

/// Result of moving paint records onto a new mesh.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RematchReport {
    /// Records assigned to a new triangle.
    pub retained: usize,
    /// Records without a close enough triangle or losing to a closer record.
    pub dropped: usize,
}

/// Records closer than this are the same triangle.
const SAME_CENTROID: Scalar = 1.0e-3;

/// Triangle colors keyed by rounded triangle centroid. Triangles without record show the base
/// image.
///
/// Records sharing a bucket are told apart by their exact centroid, so small neighbouring
/// triangles never share a color.
///
/// # Examples
/// ```
/// use coloring_mesh_core::prelude::*;
///
/// let mut paint = PaintState::new(0.5);
/// paint.paint(Coord::new(10.1, 20.0), Color::RED);
/// paint.paint(Coord::new(10.0, 19.9), Color::GREEN);
/// assert_eq!(paint.key(Coord::new(10.1, 20.0)), paint.key(Coord::new(10.0, 19.9)));
/// assert_eq!(paint.color_of(Coord::new(10.1, 20.0)), Some(Color::RED));
/// assert_eq!(paint.color_of(Coord::new(10.0, 19.9)), Some(Color::GREEN));
/// assert_eq!(paint.color_of(Coord::new(10.0, 20.0)), None);
/// paint.clear();
/// assert!(paint.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PaintState {
    bucket: Scalar,
    records: HashMap<(i64, i64), Vec<PaintRecord>>,
}

impl Default for PaintState {
    fn default() -> Self {
        Self::new(PaintSettings::default_centroid_bucket())
    }
}

impl PaintState {
    pub fn new(bucket: Scalar) -> Self {
        Self {
            bucket: if bucket > 0.0 { bucket } else { 1.0 },
            records: Default::default(),
        }
    }

    /// Record key of a centroid.
    pub fn key(&self, centroid: Coord) -> (i64, i64) {
        (
            (centroid.x / self.bucket).round() as i64,
            (centroid.y / self.bucket).round() as i64,
        )
    }

    fn find(&self, centroid: Coord) -> Option<&PaintRecord> {
        self.records
            .get(&self.key(centroid))?
            .iter()
            .find(|r| r.centroid.distance(centroid) <= SAME_CENTROID)
    }

    /// Assigns color to triangle with given centroid, replacing previous one.
    pub fn paint(&mut self, centroid: Coord, color: Color) {
        let key = self.key(centroid);
        let bucket = self.records.entry(key).or_default();
        match bucket
            .iter_mut()
            .find(|r| r.centroid.distance(centroid) <= SAME_CENTROID)
        {
            Some(record) => record.color = color,
            None => bucket.push(PaintRecord { centroid, color }),
        }
    }

    /// Removes color of triangle with given centroid.
    pub fn erase(&mut self, centroid: Coord) -> Option<PaintRecord> {
        let key = self.key(centroid);
        let bucket = self.records.get_mut(&key)?;
        let index = bucket
            .iter()
            .position(|r| r.centroid.distance(centroid) <= SAME_CENTROID)?;
        let record = bucket.remove(index);
        if bucket.is_empty() {
            self.records.remove(&key);
        }
        Some(record)
    }

    pub fn color_of(&self, centroid: Coord) -> Option<Color> {
        self.find(centroid).map(|r| r.color)
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn len(&self) -> usize {
        self.records.values().map(|b| b.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records ordered by key, then by paint order.
    pub fn records(&self) -> Vec<PaintRecord> {
        let mut keys = self.records.keys().copied().collect::<Vec<_>>();
        keys.sort_unstable();
        keys.into_iter()
            .flat_map(|k| self.records[&k].iter().copied())
            .collect()
    }

    /// Color of every mesh triangle, `None` for unpainted ones.
    pub fn triangle_colors(&self, mesh: &ColoringMesh) -> Vec<Option<Color>> {
        (0..mesh.triangles.len())
            .map(|id| mesh.centroid(id).and_then(|c| self.color_of(c)))
            .collect()
    }

    /// Moves records onto triangles of a new mesh by nearest centroid.
    ///
    /// Each record goes to the triangle whose centroid is closest, if it is not further than
    /// `tolerance`. When more records pick the same triangle the closest one wins and the others
    /// are dropped.
    pub fn rematch(&self, mesh: &ColoringMesh, tolerance: Scalar) -> (Self, RematchReport) {
        let mut result = Self::new(self.bucket);
        let centroids = mesh.centroids().collect::<Vec<(TriangleId, Coord)>>();
        if centroids.is_empty() || self.records.is_empty() {
            return (
                result,
                RematchReport {
                    retained: 0,
                    dropped: self.len(),
                },
            );
        }
        let points = centroids
            .iter()
            .map(|(_, c)| [c.x as f64, c.y as f64])
            .collect::<Vec<_>>();
        let tree: ImmutableKdTree<f64, usize, 2, 32> = ImmutableKdTree::new_from_slice(&points);
        let limit = tolerance as f64 * tolerance as f64;

        // triangle slot -> (squared distance, record)
        let mut winners = HashMap::<usize, (f64, PaintRecord)>::new();
        for record in self.records() {
            let nearest = tree.nearest_one::<SquaredEuclidean>(&[
                record.centroid.x as f64,
                record.centroid.y as f64,
            ]);
            if nearest.distance > limit {
                continue;
            }
            match winners.get(&nearest.item) {
                Some((distance, _)) if *distance <= nearest.distance => {}
                _ => {
                    winners.insert(nearest.item, (nearest.distance, record));
                }
            }
        }
        for (slot, (_, record)) in &winners {
            result.paint(centroids[*slot].1, record.color);
        }
        let report = RematchReport {
            retained: result.len(),
            dropped: self.len() - result.len(),
        };
        (result, report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::Vertex;

    fn strip(offset: Scalar) -> ColoringMesh {
        // two triangles, centroids at (offset + 10, 5) and (offset + 5, 10)
        let points = [
            Coord::new(offset, 0.0),
            Coord::new(offset + 15.0, 0.0),
            Coord::new(offset + 15.0, 15.0),
            Coord::new(offset, 15.0),
        ];
        ColoringMesh {
            vertices: points
                .iter()
                .enumerate()
                .map(|(id, point)| Vertex {
                    id,
                    point: *point,
                    boundary: true,
                })
                .collect(),
            triangles: vec![[0, 1, 2].into(), [0, 2, 3].into()],
        }
    }

    #[test]
    fn test_same_bucket_records() {
        let mut paint = PaintState::new(0.5);
        let first = Coord::new(1.0, 1.0);
        let second = Coord::new(1.1, 0.9);
        assert_eq!(paint.key(first), paint.key(second));
        paint.paint(first, Color::RED);
        assert_eq!(paint.color_of(second), None);
        paint.paint(second, Color::GREEN);
        assert_eq!(paint.len(), 2);
        assert_eq!(paint.color_of(first), Some(Color::RED));
        assert_eq!(paint.color_of(second), Some(Color::GREEN));

        paint.paint(first, Color::BLACK);
        assert_eq!(paint.len(), 2);
        assert_eq!(paint.color_of(first), Some(Color::BLACK));
        assert_eq!(paint.erase(second).map(|r| r.color), Some(Color::GREEN));
        assert_eq!(paint.erase(second), None);
        assert_eq!(paint.erase(first).map(|r| r.color), Some(Color::BLACK));
        assert!(paint.is_empty());
    }

    #[test]
    fn test_rematch_keeps_close_records() {
        let old = strip(0.0);
        let mut paint = PaintState::default();
        paint.paint(old.centroid(0).unwrap(), Color::RED);
        paint.paint(old.centroid(1).unwrap(), Color::GREEN);

        let (moved, report) = paint.rematch(&strip(1.0), 4.0);
        assert_eq!(report, RematchReport { retained: 2, dropped: 0 });
        let colors = moved.triangle_colors(&strip(1.0));
        assert_eq!(colors, vec![Some(Color::RED), Some(Color::GREEN)]);

        let (moved, report) = paint.rematch(&strip(30.0), 4.0);
        assert_eq!(report, RematchReport { retained: 0, dropped: 2 });
        assert!(moved.is_empty());
    }

    #[test]
    fn test_rematch_closest_record_wins() {
        let mut paint = PaintState::default();
        paint.paint(Coord::new(10.0, 5.0), Color::RED);
        paint.paint(Coord::new(10.0, 6.0), Color::GREEN);
        let mesh = strip(0.0);
        // centroid of the first triangle is (10, 5)
        let (moved, report) = paint.rematch(&mesh, 4.0);
        assert_eq!(report, RematchReport { retained: 1, dropped: 1 });
        assert_eq!(moved.triangle_colors(&mesh), vec![Some(Color::RED), None]);
    }

    #[test]
    fn test_rematch_on_empty_mesh() {
        let mut paint = PaintState::default();
        paint.paint(Coord::new(1.0, 1.0), Color::RED);
        let (moved, report) = paint.rematch(&ColoringMesh::default(), 4.0);
        assert!(moved.is_empty());
        assert_eq!(report.dropped, 1);
    }
}
