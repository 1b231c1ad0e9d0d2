use crate::{
    coord::Coord,
    error::{ColoringMeshError, ContourDefect},
    mask::ForegroundMask,
    mesh::settings::GenerateColoringMeshSettings,
    polygon, Scalar,
};
use serde::{Deserialize, Serialize};
use std::{cmp::Reverse, collections::VecDeque};

/// Moore neighborhood, clockwise on screen (Y axis pointing down), starting east.
const MOORE: [(isize, isize); 8] = [
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
];

const WEST: usize = 4;

/// Origin of contour points.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContourSource {
    /// Boundary of the largest foreground region.
    Traced,
    /// Full image frame.
    Frame,
}

/// Closed contour polygon resampled to the requested number of points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contour {
    pub points: Vec<Coord>,
    pub source: ContourSource,
}

/// 8-connected foreground region.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Region {
    /// Non-zero label of region pixels in [`RegionMap`].
    pub label: usize,
    /// Pixel count.
    pub area: usize,
    /// First region pixel in raster order.
    pub start: (usize, usize),
    /// True if any region pixel lies on the image edge.
    pub touches_border: bool,
}

/// Connected component labeling of mask foreground.
#[derive(Debug, Clone)]
pub struct RegionMap {
    width: usize,
    height: usize,
    labels: Vec<usize>,
    regions: Vec<Region>,
}

impl RegionMap {
    /// Labels 8-connected foreground regions of the mask.
    pub fn new(mask: &ForegroundMask) -> Self {
        let width = mask.width();
        let height = mask.height();
        let mut labels = vec![0; width * height];
        let mut regions = vec![];
        let mut queue = VecDeque::new();
        for (x, y, foreground) in mask.foreground_iter() {
            if !foreground || labels[y * width + x] != 0 {
                continue;
            }
            let label = regions.len() + 1;
            let mut area = 0;
            let mut touches_border = false;
            labels[y * width + x] = label;
            queue.push_back((x, y));
            while let Some((cx, cy)) = queue.pop_front() {
                area += 1;
                touches_border |= cx == 0 || cy == 0 || cx + 1 == width || cy + 1 == height;
                for (dx, dy) in MOORE {
                    let nx = cx as isize + dx;
                    let ny = cy as isize + dy;
                    if mask.is_foreground((nx, ny)) {
                        let index = ny as usize * width + nx as usize;
                        if labels[index] == 0 {
                            labels[index] = label;
                            queue.push_back((nx as usize, ny as usize));
                        }
                    }
                }
            }
            regions.push(Region {
                label,
                area,
                start: (x, y),
                touches_border,
            });
        }
        Self {
            width,
            height,
            labels,
            regions,
        }
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// Returns region label at given pixel, 0 for background and out of bounds.
    ///
    /// # Arguments
    /// * `point` - (X, Y)
    pub fn label_at(&self, (x, y): (isize, isize)) -> usize {
        if x >= 0 && x < self.width as isize && y >= 0 && y < self.height as isize {
            self.labels[y as usize * self.width + x as usize]
        } else {
            0
        }
    }

    /// Largest region with at least `min_area` pixels. Ties resolve to the region found first.
    pub fn largest(&self, min_area: usize) -> Option<&Region> {
        self.regions
            .iter()
            .filter(|r| r.area >= min_area)
            .min_by_key(|r| (Reverse(r.area), r.label))
    }

    /// Traces outer boundary of a region with Moore-neighbor tracing using Jacob's stopping
    /// criterion.
    ///
    /// # Returns
    /// Boundary pixel centers in clockwise screen order, or `None` when tracing does not close.
    pub fn trace(&self, region: &Region) -> Option<Vec<Coord>> {
        let start = (region.start.0 as isize, region.start.1 as isize);
        let mut pixels = vec![start];
        let mut current = start;
        let mut backtrack = WEST;
        let mut first_move = None;
        // every pixel can be entered at most once from each side
        let limit = 4 * self.width * self.height + 8;
        for _ in 0..limit {
            let (direction, next, next_backtrack) = match self.next_boundary_pixel(
                region.label,
                current,
                backtrack,
            ) {
                Some(step) => step,
                None => return Some(to_coords(&pixels)),
            };
            if current == start {
                match first_move {
                    None => first_move = Some(direction),
                    Some(first) if first == direction => {
                        pixels.pop();
                        return Some(to_coords(&pixels));
                    }
                    _ => {}
                }
            }
            pixels.push(next);
            current = next;
            backtrack = next_backtrack;
        }
        None
    }

    /// Returns `(move direction, next pixel, backtrack direction seen from next pixel)`.
    fn next_boundary_pixel(
        &self,
        label: usize,
        (x, y): (isize, isize),
        backtrack: usize,
    ) -> Option<(usize, (isize, isize), usize)> {
        (1..=8).find_map(|k| {
            let direction = (backtrack + k) % 8;
            let (dx, dy) = MOORE[direction];
            let next = (x + dx, y + dy);
            if self.label_at(next) != label {
                return None;
            }
            let (cx, cy) = MOORE[(backtrack + k - 1) % 8];
            let checked = (x + cx - next.0, y + cy - next.1);
            let next_backtrack = MOORE.iter().position(|d| *d == checked)?;
            Some((direction, next, next_backtrack))
        })
    }
}

fn to_coords(pixels: &[(isize, isize)]) -> Vec<Coord> {
    pixels
        .iter()
        .map(|(x, y)| Coord::new(*x as Scalar, *y as Scalar))
        .collect::<Vec<_>>()
}

/// Image frame polygon through corner pixel centers.
pub fn frame(width: usize, height: usize) -> Vec<Coord> {
    let right = width.saturating_sub(1) as Scalar;
    let bottom = height.saturating_sub(1) as Scalar;
    vec![
        Coord::new(0.0, 0.0),
        Coord::new(right, 0.0),
        Coord::new(right, bottom),
        Coord::new(0.0, bottom),
    ]
}

/// Places `count` points along closed polyline at equal arc length offsets, starting at the
/// first polyline point.
///
/// # Examples
/// ```
/// use coloring_mesh_core::prelude::*;
///
/// let square = contour::frame(11, 11);
/// let points = contour::resample(&square, 8);
/// assert_eq!(points.len(), 8);
/// assert_eq!(points[1], Coord::new(5.0, 0.0));
/// assert_eq!(points[2], Coord::new(10.0, 0.0));
/// assert_eq!(points[7], Coord::new(0.0, 5.0));
/// ```
pub fn resample(polyline: &[Coord], count: usize) -> Vec<Coord> {
    let n = polyline.len();
    if n == 0 || count == 0 {
        return vec![];
    }
    let mut cumulative = Vec::with_capacity(n + 1);
    cumulative.push(0.0);
    for (a, b) in polygon::edges(polyline) {
        let last = cumulative[cumulative.len() - 1];
        cumulative.push(last + a.distance(b) as f64);
    }
    let total = cumulative[n];
    if total <= 0.0 {
        return vec![polyline[0]; count];
    }
    let mut segment = 0;
    (0..count)
        .map(|i| {
            let target = total * i as f64 / count as f64;
            while segment + 1 < n && cumulative[segment + 1] <= target {
                segment += 1;
            }
            let length = cumulative[segment + 1] - cumulative[segment];
            let factor = if length > 0.0 {
                (target - cumulative[segment]) / length
            } else {
                0.0
            };
            polyline[segment].lerp(polyline[(segment + 1) % n], factor as Scalar)
        })
        .collect::<Vec<_>>()
}

/// Removes consecutive duplicates and checks that points form a simple polygon with area.
pub fn validate(points: Vec<Coord>, epsilon: Scalar) -> Result<Vec<Coord>, ContourDefect> {
    let mut result: Vec<Coord> = Vec::with_capacity(points.len());
    for point in points {
        if result.last().map_or(true, |last| last.distance(point) > epsilon) {
            result.push(point);
        }
    }
    while result.len() > 1 && result[0].distance(result[result.len() - 1]) <= epsilon {
        result.pop();
    }
    if result.len() < 3 {
        return Err(ContourDefect::TooFewPoints(result.len()));
    }
    if polygon::signed_area(&result).abs() <= Scalar::EPSILON {
        return Err(ContourDefect::ZeroArea);
    }
    if let Some(point) = polygon::find_self_intersection(&result) {
        return Err(ContourDefect::SelfIntersecting(point));
    }
    Ok(result)
}

/// Extracts boundary contour of the mask foreground with `count` evenly spaced points.
///
/// The largest foreground region is traced. When there is no region large enough, when it
/// touches the image border or when its resampled contour is not a simple polygon, the image
/// frame is used instead.
///
/// # Examples
/// ```
/// use coloring_mesh_core::prelude::*;
///
/// let mask = ForegroundMask::full(100, 100).unwrap();
/// let settings = GenerateColoringMeshSettings::default();
/// let contour = contour::sample_contour(&mask, 4, &settings).unwrap();
/// assert_eq!(contour.source, ContourSource::Frame);
/// assert_eq!(contour.points, vec![
///     Coord::new(0.0, 0.0),
///     Coord::new(99.0, 0.0),
///     Coord::new(99.0, 99.0),
///     Coord::new(0.0, 99.0),
/// ]);
/// ```
pub fn sample_contour(
    mask: &ForegroundMask,
    count: usize,
    settings: &GenerateColoringMeshSettings,
) -> Result<Contour, ColoringMeshError> {
    if count < 3 {
        return Err(ContourDefect::TooFewRequested(count).into());
    }
    let regions = RegionMap::new(mask);
    let traced = match regions.largest(settings.min_region_area) {
        Some(region) if region.touches_border => {
            log::debug!(
                "Largest region ({} px) touches image border, using image frame",
                region.area
            );
            None
        }
        Some(region) => {
            let traced = regions.trace(region);
            if traced.is_none() {
                log::warn!("Tracing region of {} px did not close", region.area);
            }
            traced
        }
        None => {
            log::debug!(
                "No foreground region of at least {} px, using image frame",
                settings.min_region_area
            );
            None
        }
    };
    if let Some(boundary) = traced {
        match validate(resample(&boundary, count), settings.dedup_epsilon) {
            Ok(points) => {
                log::debug!(
                    "Traced contour of {} pixels resampled to {} points",
                    boundary.len(),
                    points.len()
                );
                return Ok(Contour {
                    points,
                    source: ContourSource::Traced,
                });
            }
            Err(defect) => log::warn!("Traced contour rejected ({}), using image frame", defect),
        }
    }
    let points = validate(
        resample(&frame(mask.width(), mask.height()), count),
        settings.dedup_epsilon,
    )?;
    Ok(Contour {
        points,
        source: ContourSource::Frame,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mask_with_rects(width: usize, height: usize, rects: &[(usize, usize, usize, usize)]) -> ForegroundMask {
        let mut data = vec![0; width * height];
        for (x, y, w, h) in rects {
            for row in *y..(y + h) {
                for col in *x..(x + w) {
                    data[row * width + col] = 255;
                }
            }
        }
        ForegroundMask::new(width, height, data, 0.5).unwrap()
    }

    #[test]
    fn test_labeling_finds_regions() {
        // diagonal neighbours belong to the same region
        let mask = ForegroundMask::new(4, 3, vec![255, 0, 0, 0, 0, 255, 0, 0, 0, 0, 0, 255], 0.5)
            .unwrap();
        let regions = RegionMap::new(&mask);
        assert_eq!(regions.regions().len(), 2);
        assert_eq!(regions.regions()[0].area, 2);
        assert_eq!(regions.regions()[0].start, (0, 0));
        assert_eq!(regions.regions()[1].area, 1);
        assert_eq!(regions.label_at((1, 1)), 1);
        assert_eq!(regions.label_at((3, 2)), 2);
        assert_eq!(regions.label_at((-1, 0)), 0);
        assert_eq!(regions.largest(2).map(|r| r.label), Some(1));
        assert_eq!(regions.largest(3), None);
    }

    #[test]
    fn test_trace_square_region() {
        let mask = mask_with_rects(10, 10, &[(2, 3, 4, 3)]);
        let regions = RegionMap::new(&mask);
        let boundary = regions.trace(&regions.regions()[0]).unwrap();
        // 4x3 block has 10 boundary pixels
        assert_eq!(boundary.len(), 10);
        assert_eq!(boundary[0], Coord::new(2.0, 3.0));
        assert_eq!(boundary[1], Coord::new(3.0, 3.0));
        assert_eq!(boundary[9], Coord::new(2.0, 4.0));
        assert!(polygon::signed_area(&boundary) > 0.0);
    }

    #[test]
    fn test_trace_single_pixel() {
        let mask = mask_with_rects(5, 5, &[(2, 2, 1, 1)]);
        let regions = RegionMap::new(&mask);
        let boundary = regions.trace(&regions.regions()[0]).unwrap();
        assert_eq!(boundary, vec![Coord::new(2.0, 2.0)]);
    }

    #[test]
    fn test_traced_contour_of_inner_square() {
        let mask = mask_with_rects(100, 100, &[(20, 20, 60, 60)]);
        let contour = sample_contour(&mask, 4, &Default::default()).unwrap();
        assert_eq!(contour.source, ContourSource::Traced);
        assert_eq!(
            contour.points,
            vec![
                Coord::new(20.0, 20.0),
                Coord::new(79.0, 20.0),
                Coord::new(79.0, 79.0),
                Coord::new(20.0, 79.0),
            ]
        );
    }

    #[test]
    fn test_largest_region_wins() {
        let mask = mask_with_rects(120, 100, &[(5, 5, 35, 35), (50, 10, 60, 60)]);
        let contour = sample_contour(&mask, 40, &Default::default()).unwrap();
        assert_eq!(contour.source, ContourSource::Traced);
        assert_eq!(contour.points.len(), 40);
        assert!(contour.points.iter().all(|p| p.x >= 50.0 && p.y >= 10.0));
        assert_eq!(contour.points[0], Coord::new(50.0, 10.0));
    }

    #[test]
    fn test_frame_fallbacks() {
        let settings = GenerateColoringMeshSettings::default();
        let small = mask_with_rects(100, 100, &[(40, 40, 10, 10)]);
        let contour = sample_contour(&small, 8, &settings).unwrap();
        assert_eq!(contour.source, ContourSource::Frame);
        let touching = mask_with_rects(100, 100, &[(0, 10, 60, 60)]);
        let contour = sample_contour(&touching, 8, &settings).unwrap();
        assert_eq!(contour.source, ContourSource::Frame);
        assert_eq!(contour.points.len(), 8);
        let empty = ForegroundMask::new(50, 50, vec![0; 2500], 0.5).unwrap();
        assert_eq!(
            sample_contour(&empty, 4, &settings).unwrap().source,
            ContourSource::Frame
        );
    }

    #[test]
    fn test_invalid_requests() {
        let settings = GenerateColoringMeshSettings::default();
        let mask = ForegroundMask::full(10, 10).unwrap();
        assert_eq!(
            sample_contour(&mask, 2, &settings),
            Err(ColoringMeshError::InvalidContour(
                ContourDefect::TooFewRequested(2)
            ))
        );
        let line = ForegroundMask::full(1, 10).unwrap();
        assert_eq!(
            sample_contour(&line, 4, &settings),
            Err(ColoringMeshError::InvalidContour(ContourDefect::ZeroArea))
        );
    }

    #[test]
    fn test_resample_spacing_is_even() {
        let points = resample(&frame(101, 51), 30);
        let perimeter = 300.0 / 30.0;
        for (a, b) in polygon::edges(&points) {
            // corners cut the path short, never make it longer
            assert!(a.distance(b) <= perimeter + 1.0e-3);
            assert!(a.distance(b) >= perimeter * 0.7);
        }
    }

    #[test]
    fn test_validate_rejects_defects() {
        let bow_tie = vec![
            Coord::new(0.0, 0.0),
            Coord::new(10.0, 10.0),
            Coord::new(10.0, 0.0),
            Coord::new(0.0, 10.0),
        ];
        assert!(matches!(
            validate(bow_tie, 0.01),
            Err(ContourDefect::SelfIntersecting(_))
        ));
        let duplicated = vec![
            Coord::new(0.0, 0.0),
            Coord::new(0.0, 0.0),
            Coord::new(5.0, 0.0),
            Coord::new(0.0, 0.0),
        ];
        assert_eq!(validate(duplicated, 0.01), Err(ContourDefect::TooFewPoints(2)));
    }
}
