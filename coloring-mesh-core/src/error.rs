use crate::{coord::Coord, Scalar};
use thiserror::Error;

/// Error thrown when constructing raster data (masks and color buffers).
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RasterError {
    /// Wrong data length.
    /// (provided, expected)
    #[error("wrong data length: provided {0}, expected {1}")]
    WrongDataLength(usize, usize),
    /// Image has no pixels.
    #[error("image buffer is empty ({width}x{height})")]
    Empty { width: usize, height: usize },
    /// Buffers describing the same image differ in size.
    /// ((width, height) expected, (width, height) provided)
    #[error("size mismatch: expected {0:?}, provided {1:?}")]
    SizeMismatch((usize, usize), (usize, usize)),
}

/// Reason why a contour cannot be used as a mesh boundary.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum ContourDefect {
    /// Requested boundary point count is below 3.
    #[error("requested {0} boundary points, at least 3 are required")]
    TooFewRequested(usize),
    /// Less than 3 distinct points remain after resampling.
    #[error("only {0} distinct boundary points after resampling")]
    TooFewPoints(usize),
    /// Contour polygon encloses no area.
    #[error("contour polygon has zero area")]
    ZeroArea,
    /// Two non adjacent contour edges cross each other.
    #[error("contour polygon intersects itself near {0:?}")]
    SelfIntersecting(Coord),
}

/// Reason why triangulation of a point set failed.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum TriangulationDefect {
    /// Less than 3 points remain after deduplication.
    #[error("only {0} points left after deduplication")]
    TooFewPoints(usize),
    /// All points lie on a single line.
    #[error("all points are collinear")]
    Collinear,
    /// Base Delaunay triangulation could not be constructed.
    #[error("base Delaunay triangulation failed")]
    Delaunay,
    /// Boundary edge could not be recovered in the triangulation.
    #[error("boundary edge {from} -> {to} could not be recovered")]
    ConstraintRecovery { from: usize, to: usize },
    /// Triangles do not cover the contour polygon.
    /// (covered area, polygon area)
    #[error("triangles cover {0} of {1} polygon area")]
    Coverage(Scalar, Scalar),
}

/// Error thrown during coloring mesh generation and editing.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ColoringMeshError {
    /// Raster data error.
    #[error(transparent)]
    Raster(#[from] RasterError),
    /// Boundary could not be traced or resampled.
    #[error("invalid contour: {0}")]
    InvalidContour(ContourDefect),
    /// Density configuration out of range.
    #[error(
        "invalid density config: boundary points {boundary_points} (min 3), interior density {interior_density} (min 1)"
    )]
    InvalidDensityConfig {
        boundary_points: usize,
        interior_density: usize,
    },
    /// Point set could not be triangulated.
    #[error("triangulation failed: {0}")]
    TriangulationFailed(TriangulationDefect),
    /// Trying to process uninitialized generator.
    #[error("generator is not initialized")]
    UninitializedGenerator,
    /// Trying to process generator that already produced a mesh.
    #[error("generator already completed")]
    AlreadyCompleted,
}

impl From<ContourDefect> for ColoringMeshError {
    fn from(defect: ContourDefect) -> Self {
        Self::InvalidContour(defect)
    }
}

impl From<TriangulationDefect> for ColoringMeshError {
    fn from(defect: TriangulationDefect) -> Self {
        Self::TriangulationFailed(defect)
    }
}
