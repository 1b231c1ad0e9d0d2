use crate::{
    contour::{sample_contour, Contour},
    coord::Coord,
    error::ColoringMeshError,
    interior::sample_interior,
    mask::ForegroundMask,
    mesh::{
        settings::{DensityConfig, GenerateColoringMeshSettings},
        ColoringMesh,
    },
    triangulator::triangulate,
    Scalar,
};
use serde::{Deserialize, Serialize};

/// Coloring mesh generator state object.
/// It allows you to process mesh generation in steps and track progress or cancel generation in
/// the middle of the process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ColoringMeshGenerator {
    Uninitialized,
    TracingContour {
        mask: ForegroundMask,
        config: DensityConfig,
        settings: GenerateColoringMeshSettings,
    },
    SamplingInterior {
        contour: Contour,
        /// (width, height)
        image_size: (usize, usize),
        config: DensityConfig,
        settings: GenerateColoringMeshSettings,
    },
    Triangulating {
        contour: Contour,
        interior: Vec<Coord>,
        settings: GenerateColoringMeshSettings,
    },
    Completed {
        mesh: ColoringMesh,
    },
}

impl Default for ColoringMeshGenerator {
    fn default() -> Self {
        Self::Uninitialized
    }
}

impl ColoringMeshGenerator {
    const STAGES: usize = 3;

    /// Creates new generator instance.
    ///
    /// # Arguments
    /// * `mask` - Foreground mask of the image.
    /// * `config` - Density config.
    /// * `settings` - Coloring mesh generation settings.
    pub fn new(
        mask: ForegroundMask,
        config: DensityConfig,
        settings: GenerateColoringMeshSettings,
    ) -> Self {
        Self::TracingContour {
            mask,
            config,
            settings,
        }
    }

    /// Get processing progress.
    ///
    /// # Returns
    /// `(current, limit, percentage)`
    pub fn progress(&self) -> (usize, usize, Scalar) {
        let current = match self {
            Self::Uninitialized | Self::TracingContour { .. } => 0,
            Self::SamplingInterior { .. } => 1,
            Self::Triangulating { .. } => 2,
            Self::Completed { .. } => Self::STAGES,
        };
        (
            current,
            Self::STAGES,
            current as Scalar / Self::STAGES as Scalar,
        )
    }

    /// Check if mesh generation is done.
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }

    /// Tries to get inner generated mesh when ready, otherwise gets itself.
    /// This function consumes generator!
    ///
    /// # Returns
    /// Result with mesh (Ok) when completed, or self (Err) when still processing.
    pub fn get_mesh_or_self(self) -> Result<ColoringMesh, Self> {
        match self {
            Self::Completed { mesh } => Ok(mesh),
            gen => Err(gen),
        }
    }

    /// Process single stage of mesh generation. This function consumes generator!
    ///
    /// # Returns
    /// Self if ok or mesh generation error.
    ///
    /// # Examples
    /// ```
    /// use coloring_mesh_core::prelude::*;
    ///
    /// let mask = ForegroundMask::full(100, 100).unwrap();
    /// let mut generator = ColoringMeshGenerator::new(mask, DensityConfig::new(4, 1), Default::default());
    /// loop {
    ///     match generator.process().unwrap().get_mesh_or_self() {
    ///         Ok(mesh) => {
    ///             assert_eq!(mesh.vertices.len(), 5);
    ///             assert_eq!(mesh.triangles.len(), 4);
    ///             return;
    ///         },
    ///         Err(gen) => generator = gen,
    ///     }
    /// }
    /// ```
    pub fn process(self) -> Result<Self, ColoringMeshError> {
        match self {
            Self::Uninitialized => Err(ColoringMeshError::UninitializedGenerator),
            Self::TracingContour {
                mask,
                config,
                settings,
            } => {
                config.validate()?;
                let contour = sample_contour(&mask, config.boundary_points, &settings)?;
                log::debug!(
                    "Contour with {} points from {:?}",
                    contour.points.len(),
                    contour.source
                );
                Ok(Self::SamplingInterior {
                    contour,
                    image_size: (mask.width(), mask.height()),
                    config,
                    settings,
                })
            }
            Self::SamplingInterior {
                contour,
                image_size,
                config,
                settings,
            } => {
                let interior = sample_interior(
                    &contour.points,
                    config.interior_density,
                    image_size,
                    &settings,
                );
                Ok(Self::Triangulating {
                    contour,
                    interior,
                    settings,
                })
            }
            Self::Triangulating {
                contour,
                interior,
                settings,
            } => Ok(Self::Completed {
                mesh: triangulate(&contour.points, &interior, &settings)?,
            }),
            Self::Completed { .. } => Err(ColoringMeshError::AlreadyCompleted),
        }
    }

    /// Process mesh generation until it returns either mesh or error.
    /// This function consumes generator!
    pub fn process_wait(mut self) -> Result<ColoringMesh, ColoringMeshError> {
        loop {
            match self.process()?.get_mesh_or_self() {
                Ok(mesh) => return Ok(mesh),
                Err(gen) => self = gen,
            }
        }
    }

    /// Process mesh generation with callback that gets called on progress update
    /// until it returns either mesh or error.
    /// This function consumes generator!
    ///
    /// # Arguments
    /// * `f` - Callback with progress arguments: `(current, limit, percentage)`.
    ///
    /// # Examples
    /// ```
    /// use coloring_mesh_core::prelude::*;
    ///
    /// let mask = ForegroundMask::full(50, 50).unwrap();
    /// let mut reports = vec![];
    /// let mesh = ColoringMeshGenerator::new(mask, DensityConfig::default(), Default::default())
    ///     .process_wait_tracked(|current, _, _| reports.push(current))
    ///     .unwrap();
    /// assert!(!mesh.is_empty());
    /// assert_eq!(reports, vec![0, 1, 2, 3]);
    /// ```
    pub fn process_wait_tracked<F>(mut self, mut f: F) -> Result<ColoringMesh, ColoringMeshError>
    where
        F: FnMut(usize, usize, Scalar),
    {
        let (c, l, p) = self.progress();
        f(c, l, p);
        loop {
            let gen = self.process()?;
            let (c, l, p) = gen.progress();
            f(c, l, p);
            match gen.get_mesh_or_self() {
                Ok(mesh) => return Ok(mesh),
                Err(gen) => self = gen,
            }
        }
    }
}

/// Runs whole mesh generation pipeline at once.
pub fn generate_mesh(
    mask: &ForegroundMask,
    config: DensityConfig,
    settings: &GenerateColoringMeshSettings,
) -> Result<ColoringMesh, ColoringMeshError> {
    ColoringMeshGenerator::new(mask.clone(), config, settings.clone()).process_wait()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_config_is_rejected() {
        let mask = ForegroundMask::full(10, 10).unwrap();
        assert_eq!(
            generate_mesh(&mask, DensityConfig::new(25, 0), &Default::default()),
            Err(ColoringMeshError::InvalidDensityConfig {
                boundary_points: 25,
                interior_density: 0,
            })
        );
    }

    #[test]
    fn test_stage_errors() {
        assert_eq!(
            ColoringMeshGenerator::default().process(),
            Err(ColoringMeshError::UninitializedGenerator)
        );
        let done = ColoringMeshGenerator::Completed {
            mesh: Default::default(),
        };
        assert!(done.is_done());
        assert_eq!(done.process(), Err(ColoringMeshError::AlreadyCompleted));
    }

    #[test]
    fn test_dense_contour_on_small_image() {
        let mask = ForegroundMask::full(7, 5).unwrap();
        for density in [1, 8] {
            let mesh = generate_mesh(
                &mask,
                DensityConfig::new(200, density),
                &Default::default(),
            )
            .unwrap();
            assert!(!mesh.is_empty());
            assert!((mesh.total_area() - 24.0).abs() < 24.0 * 1.0e-3);
            for id in 0..mesh.triangles.len() {
                assert!(mesh.area(id).unwrap() > 0.0);
            }
        }
    }

    #[test]
    fn test_same_config_gives_same_mesh() {
        let mut data = vec![0; 120 * 90];
        for y in 10..80 {
            for x in 15..(15 + y) {
                data[y * 120 + x] = 255;
            }
        }
        let mask = ForegroundMask::new(120, 90, data, 0.5).unwrap();
        let settings = GenerateColoringMeshSettings::default();
        let first = generate_mesh(&mask, DensityConfig::default(), &settings).unwrap();
        let second = generate_mesh(&mask, DensityConfig::default(), &settings).unwrap();
        assert!(!first.is_empty());
        assert_eq!(first, second);
    }
}
