use crate::{coord::Coord, mesh::settings::GenerateColoringMeshSettings, polygon, Scalar};
#[cfg(feature = "parallel")]
use rayon::prelude::*;

#[cfg(feature = "parallel")]
macro_rules! into_iter {
    ($v:expr) => {
        $v.into_par_iter()
    };
}

#[cfg(not(feature = "parallel"))]
macro_rules! into_iter {
    ($v:expr) => {
        $v.into_iter()
    };
}

/// Grid steps used for interior sampling of contour with given density.
///
/// # Returns
/// `(step x, step y)` or `None` for empty contour.
pub fn grid_steps(
    contour: &[Coord],
    density: usize,
    settings: &GenerateColoringMeshSettings,
) -> Option<(Scalar, Scalar)> {
    let (min, max) = polygon::bounds(contour)?;
    let density = density.max(1) as Scalar;
    let min_spacing = settings.min_spacing.max(Scalar::EPSILON);
    Some((
        ((max.x - min.x) / density).max(min_spacing),
        ((max.y - min.y) / density).max(min_spacing),
    ))
}

/// Generates interior points of contour polygon on a jittered regular grid.
///
/// Output depends only on the arguments, so the same contour and density always give the same
/// points in the same (row by row) order.
///
/// # Arguments
/// * `contour` - Closed contour polygon.
/// * `density` - Number of grid steps per bounding box axis.
/// * `image_size` - `(width, height)`, points outside the image are rejected.
/// * `settings` - Mesh generation settings.
///
/// # Examples
/// ```
/// use coloring_mesh_core::prelude::*;
///
/// let square = contour::frame(100, 100);
/// let settings = GenerateColoringMeshSettings::default();
/// let points = interior::sample_interior(&square, 1, (100, 100), &settings);
/// assert_eq!(points, vec![Coord::new(49.5, 49.5)]);
/// assert_eq!(interior::sample_interior(&square, 8, (100, 100), &settings).len(), 49);
/// ```
pub fn sample_interior(
    contour: &[Coord],
    density: usize,
    image_size: (usize, usize),
    settings: &GenerateColoringMeshSettings,
) -> Vec<Coord> {
    let (min, max) = match polygon::bounds(contour) {
        Some(bounds) if contour.len() >= 3 => bounds,
        _ => return vec![],
    };
    let (step_x, step_y) = match grid_steps(contour, density, settings) {
        Some(steps) => steps,
        None => return vec![],
    };
    let margin = settings.boundary_margin * step_x.min(step_y);
    let right = image_size.0.saturating_sub(1) as Scalar;
    let bottom = image_size.1.saturating_sub(1) as Scalar;
    let accepted = |point: &Coord| {
        point.x >= 0.0
            && point.x <= right
            && point.y >= 0.0
            && point.y <= bottom
            && polygon::contains(contour, *point)
            && polygon::boundary_distance(contour, *point) >= margin
    };

    let columns = (1..)
        .map(|k| min.x + k as Scalar * step_x)
        .take_while(|x| *x < max.x)
        .collect::<Vec<_>>();
    let rows = (1..)
        .map(|k| min.y + k as Scalar * step_y)
        .take_while(|y| *y < max.y)
        .collect::<Vec<_>>();
    let candidates = rows
        .iter()
        .flat_map(|y| columns.iter().map(move |x| Coord::new(*x, *y)))
        .enumerate()
        .map(|(index, point)| point + jitter_offset(index, step_x, step_y, settings))
        .collect::<Vec<_>>();
    let mut points = into_iter!(candidates)
        .filter(|point| accepted(point))
        .collect::<Vec<_>>();

    let center = Coord::new((min.x + max.x) * 0.5, (min.y + max.y) * 0.5);
    if accepted(&center) && points.iter().all(|p| p.distance(center) >= margin) {
        points.push(center);
    }
    log::debug!(
        "Sampled {} interior points (step {} x {})",
        points.len(),
        step_x,
        step_y
    );
    points
}

fn jitter_offset(
    index: usize,
    step_x: Scalar,
    step_y: Scalar,
    settings: &GenerateColoringMeshSettings,
) -> Coord {
    if settings.jitter <= 0.0 {
        return Coord::default();
    }
    let seed = settings.jitter_seed ^ (index as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    let mut rng = fastrand::Rng::with_seed(seed);
    Coord::new(
        (rng.f32() * 2.0 - 1.0) * settings.jitter * step_x,
        (rng.f32() * 2.0 - 1.0) * settings.jitter * step_y,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contour::frame;

    #[test]
    fn test_density_quadruples_points() {
        let square = frame(100, 100);
        let settings = GenerateColoringMeshSettings::default();
        let coarse = sample_interior(&square, 8, (100, 100), &settings);
        let fine = sample_interior(&square, 16, (100, 100), &settings);
        assert_eq!(coarse.len(), 49);
        assert_eq!(fine.len(), 225);
    }

    #[test]
    fn test_points_are_deterministic_and_inside() {
        let notch = vec![
            Coord::new(0.0, 0.0),
            Coord::new(100.0, 0.0),
            Coord::new(100.0, 100.0),
            Coord::new(50.0, 40.0),
            Coord::new(0.0, 100.0),
        ];
        let settings = GenerateColoringMeshSettings {
            jitter: 0.2,
            jitter_seed: 42,
            ..Default::default()
        };
        let first = sample_interior(&notch, 10, (101, 101), &settings);
        let second = sample_interior(&notch, 10, (101, 101), &settings);
        assert!(!first.is_empty());
        assert_eq!(first, second);
        let margin = settings.boundary_margin * 10.0;
        for point in &first {
            assert!(polygon::contains(&notch, *point));
            assert!(polygon::boundary_distance(&notch, *point) >= margin);
        }
        let reseeded = GenerateColoringMeshSettings {
            jitter_seed: 7,
            ..settings
        };
        assert_ne!(first, sample_interior(&notch, 10, (101, 101), &reseeded));
    }

    #[test]
    fn test_min_spacing_clamps_step() {
        let square = frame(20, 20);
        let settings = GenerateColoringMeshSettings::default();
        assert_eq!(grid_steps(&square, 16, &settings), Some((5.0, 5.0)));
        // 19 px wide box: grid at 5, 10, 15
        assert_eq!(sample_interior(&square, 16, (20, 20), &settings).len(), 9);
    }

    #[test]
    fn test_points_outside_image_are_rejected() {
        let square = frame(100, 100);
        let settings = GenerateColoringMeshSettings::default();
        let points = sample_interior(&square, 8, (50, 50), &settings);
        assert!(points.iter().all(|p| p.x <= 49.0 && p.y <= 49.0));
        assert_eq!(points.len(), 9);
    }
}
