use crate::{error::ColoringMeshError, Scalar};
use serde::{Deserialize, Serialize};

/// Mesh density knobs changed by the user at runtime.
///
/// # Examples
/// ```
/// use coloring_mesh_core::prelude::*;
///
/// assert!(DensityConfig::default().validate().is_ok());
/// assert_eq!(
///     DensityConfig::new(2, 8).validate(),
///     Err(ColoringMeshError::InvalidDensityConfig {
///         boundary_points: 2,
///         interior_density: 8,
///     }),
/// );
/// ```
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DensityConfig {
    /// Number of points placed on the contour (at least 3).
    #[serde(default = "DensityConfig::default_boundary_points")]
    pub boundary_points: usize,
    /// Number of interior grid steps per bounding box axis (at least 1).
    #[serde(default = "DensityConfig::default_interior_density")]
    pub interior_density: usize,
}

impl Default for DensityConfig {
    fn default() -> Self {
        Self {
            boundary_points: Self::default_boundary_points(),
            interior_density: Self::default_interior_density(),
        }
    }
}

impl DensityConfig {
    pub fn new(boundary_points: usize, interior_density: usize) -> Self {
        Self {
            boundary_points,
            interior_density,
        }
    }

    /// Check if config can be used to build a mesh.
    pub fn validate(&self) -> Result<(), ColoringMeshError> {
        if self.boundary_points < 3 || self.interior_density < 1 {
            Err(ColoringMeshError::InvalidDensityConfig {
                boundary_points: self.boundary_points,
                interior_density: self.interior_density,
            })
        } else {
            Ok(())
        }
    }

    fn default_boundary_points() -> usize {
        25
    }

    fn default_interior_density() -> usize {
        8
    }
}

/// Settings of coloring mesh generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateColoringMeshSettings {
    /// Minimal pixel count of a foreground region used as the contour source.
    #[serde(default = "GenerateColoringMeshSettings::default_min_region_area")]
    pub min_region_area: usize,
    /// Points closer than this are considered duplicates.
    #[serde(default = "GenerateColoringMeshSettings::default_dedup_epsilon")]
    pub dedup_epsilon: Scalar,
    /// Lower bound of interior grid step.
    #[serde(default = "GenerateColoringMeshSettings::default_min_spacing")]
    pub min_spacing: Scalar,
    /// Interior point jitter as a fraction of grid step.
    #[serde(default = "GenerateColoringMeshSettings::default_jitter")]
    pub jitter: Scalar,
    /// Jitter random seed.
    #[serde(default)]
    pub jitter_seed: u64,
    /// Minimal distance of interior points to the contour as a fraction of grid step.
    #[serde(default = "GenerateColoringMeshSettings::default_boundary_margin")]
    pub boundary_margin: Scalar,
    /// Triangles with smaller area are discarded, unless they have a contour vertex.
    #[serde(default = "GenerateColoringMeshSettings::default_min_triangle_area")]
    pub min_triangle_area: Scalar,
    /// Relative tolerance of triangulated area against contour polygon area.
    #[serde(default = "GenerateColoringMeshSettings::default_coverage_tolerance")]
    pub coverage_tolerance: Scalar,
    /// Limit of edge flips when recovering single boundary edge.
    #[serde(default = "GenerateColoringMeshSettings::default_max_recovery_flips")]
    pub max_recovery_flips: usize,
    /// Multiplier of mesh index cell size.
    #[serde(default = "GenerateColoringMeshSettings::default_index_cell_scale")]
    pub index_cell_scale: Scalar,
}

impl Default for GenerateColoringMeshSettings {
    fn default() -> Self {
        Self {
            min_region_area: Self::default_min_region_area(),
            dedup_epsilon: Self::default_dedup_epsilon(),
            min_spacing: Self::default_min_spacing(),
            jitter: Self::default_jitter(),
            jitter_seed: 0,
            boundary_margin: Self::default_boundary_margin(),
            min_triangle_area: Self::default_min_triangle_area(),
            coverage_tolerance: Self::default_coverage_tolerance(),
            max_recovery_flips: Self::default_max_recovery_flips(),
            index_cell_scale: Self::default_index_cell_scale(),
        }
    }
}

impl GenerateColoringMeshSettings {
    fn default_min_region_area() -> usize {
        1000
    }

    fn default_dedup_epsilon() -> Scalar {
        0.01
    }

    fn default_min_spacing() -> Scalar {
        5.0
    }

    fn default_jitter() -> Scalar {
        0.005
    }

    fn default_boundary_margin() -> Scalar {
        0.25
    }

    fn default_min_triangle_area() -> Scalar {
        0.01
    }

    fn default_coverage_tolerance() -> Scalar {
        1.0e-3
    }

    fn default_max_recovery_flips() -> usize {
        100_000
    }

    fn default_index_cell_scale() -> Scalar {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_use_defaults() {
        let settings: GenerateColoringMeshSettings =
            serde_json::from_str(r#"{ "min_region_area": 10 }"#).unwrap();
        assert_eq!(settings.min_region_area, 10);
        assert_eq!(settings.min_spacing, 5.0);
        assert_eq!(settings.jitter_seed, 0);
        let config: DensityConfig = serde_json::from_str(r#"{ "interior_density": 3 }"#).unwrap();
        assert_eq!(config, DensityConfig::new(25, 3));
    }
}
