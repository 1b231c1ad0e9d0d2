use crate::{
    buffer::ColorBuffer,
    color::{Color, DEFAULT_PALETTE},
    coord::Coord,
    error::{ColoringMeshError, RasterError},
    generator::generate_mesh,
    index::MeshIndex,
    mask::ForegroundMask,
    mesh::{
        settings::{DensityConfig, GenerateColoringMeshSettings},
        ColoringMesh,
    },
    paint::{PaintSettings, PaintState},
    render::{render, RenderStyle},
    triangle::TriangleId,
};
use serde::{Deserialize, Serialize};

/// Density changes applied by keyboard shortcuts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DensityStepping {
    #[serde(default = "DensityStepping::default_boundary_step")]
    pub boundary_step: usize,
    #[serde(default = "DensityStepping::default_density_step")]
    pub density_step: usize,
    #[serde(default = "DensityStepping::default_min_boundary_points")]
    pub min_boundary_points: usize,
    #[serde(default = "DensityStepping::default_max_boundary_points")]
    pub max_boundary_points: usize,
    #[serde(default = "DensityStepping::default_min_interior_density")]
    pub min_interior_density: usize,
    #[serde(default = "DensityStepping::default_max_interior_density")]
    pub max_interior_density: usize,
}

impl Default for DensityStepping {
    fn default() -> Self {
        Self {
            boundary_step: Self::default_boundary_step(),
            density_step: Self::default_density_step(),
            min_boundary_points: Self::default_min_boundary_points(),
            max_boundary_points: Self::default_max_boundary_points(),
            min_interior_density: Self::default_min_interior_density(),
            max_interior_density: Self::default_max_interior_density(),
        }
    }
}

impl DensityStepping {
    fn default_boundary_step() -> usize {
        5
    }

    fn default_density_step() -> usize {
        1
    }

    fn default_min_boundary_points() -> usize {
        10
    }

    fn default_max_boundary_points() -> usize {
        100
    }

    fn default_min_interior_density() -> usize {
        2
    }

    fn default_max_interior_density() -> usize {
        20
    }

    /// Denser config. Values already above the upper limit are kept.
    ///
    /// # Examples
    /// ```
    /// use coloring_mesh_core::prelude::*;
    ///
    /// let stepping = DensityStepping::default();
    /// assert_eq!(stepping.increase(DensityConfig::new(25, 8)), DensityConfig::new(30, 9));
    /// assert_eq!(stepping.increase(DensityConfig::new(98, 20)), DensityConfig::new(100, 20));
    /// assert_eq!(stepping.increase(DensityConfig::new(150, 30)), DensityConfig::new(150, 30));
    /// ```
    pub fn increase(&self, config: DensityConfig) -> DensityConfig {
        let step = |value: usize, step: usize, max: usize| (value + step).min(max).max(value);
        DensityConfig::new(
            step(
                config.boundary_points,
                self.boundary_step,
                self.max_boundary_points,
            ),
            step(
                config.interior_density,
                self.density_step,
                self.max_interior_density,
            ),
        )
    }

    /// Sparser config. Values already below the lower limit are kept.
    ///
    /// # Examples
    /// ```
    /// use coloring_mesh_core::prelude::*;
    ///
    /// let stepping = DensityStepping::default();
    /// assert_eq!(stepping.decrease(DensityConfig::new(25, 8)), DensityConfig::new(20, 7));
    /// assert_eq!(stepping.decrease(DensityConfig::new(12, 2)), DensityConfig::new(10, 2));
    /// assert_eq!(stepping.decrease(DensityConfig::new(4, 1)), DensityConfig::new(4, 1));
    /// ```
    pub fn decrease(&self, config: DensityConfig) -> DensityConfig {
        let step =
            |value: usize, step: usize, min: usize| value.saturating_sub(step).max(min).min(value);
        DensityConfig::new(
            step(
                config.boundary_points,
                self.boundary_step,
                self.min_boundary_points,
            ),
            step(
                config.interior_density,
                self.density_step,
                self.min_interior_density,
            ),
        )
    }
}

/// All settings of a coloring session.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControllerSettings {
    #[serde(default)]
    pub mesh: GenerateColoringMeshSettings,
    #[serde(default)]
    pub paint: PaintSettings,
    #[serde(default)]
    pub stepping: DensityStepping,
    #[serde(default)]
    pub render: RenderStyle,
}

/// Input event coming from the user interface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Click at image space point, paints triangle with current color.
    Click { point: Coord },
    /// New density chosen with sliders.
    DensityChanged { config: DensityConfig },
    /// Keyboard shortcut.
    KeyPressed { key: char },
    /// Palette color chosen.
    ColorSelected { color: Color },
}

/// Summary of a successful mesh rebuild.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RebuildReport {
    pub vertices: usize,
    pub triangles: usize,
    /// Paint records moved to the new mesh.
    pub retained: usize,
    /// Paint records without matching triangle in the new mesh.
    pub dropped: usize,
}

/// Effect of handled event.
#[derive(Debug, Clone, PartialEq)]
pub enum EventOutcome {
    Painted { triangle: TriangleId },
    /// Click outside of the mesh.
    Missed,
    Reset,
    Rebuilt(RebuildReport),
    /// Rebuild failed, previous mesh is kept.
    RebuildRejected(ColoringMeshError),
    ColorSelected(Color),
    SaveRequested,
    QuitRequested,
    Ignored,
}

#[derive(Debug, Clone)]
struct MeshState {
    mesh: ColoringMesh,
    index: MeshIndex,
    paint: PaintState,
}

/// Coloring session: base image, its mesh and triangle colors.
///
/// # Examples
/// ```
/// use coloring_mesh_core::prelude::*;
///
/// let base = ColorBuffer::filled(100, 100, Color::WHITE).unwrap();
/// let mask = ForegroundMask::full(100, 100).unwrap();
/// let mut controller = MeshController::new(
///     base,
///     mask,
///     DensityConfig::new(4, 1),
///     ControllerSettings::default(),
/// )
/// .unwrap();
/// let centroid = controller.mesh().centroid(0).unwrap();
/// controller.handle(Event::ColorSelected { color: Color::RED });
/// assert_eq!(
///     controller.handle(Event::Click { point: centroid }),
///     EventOutcome::Painted { triangle: 0 },
/// );
/// assert_eq!(controller.triangle_color(0), Some(Color::RED));
/// assert_eq!(controller.handle(Event::KeyPressed { key: 'r' }), EventOutcome::Reset);
/// assert_eq!(controller.triangle_color(0), None);
/// ```
#[derive(Debug, Clone)]
pub struct MeshController {
    base: ColorBuffer,
    mask: ForegroundMask,
    settings: ControllerSettings,
    config: DensityConfig,
    color: Color,
    state: MeshState,
}

impl MeshController {
    /// Creates session and builds initial mesh.
    ///
    /// # Arguments
    /// * `base` - Image shown under the mesh.
    /// * `mask` - Foreground mask of the same size as the base image.
    /// * `config` - Initial density config.
    /// * `settings` - Session settings.
    pub fn new(
        base: ColorBuffer,
        mask: ForegroundMask,
        config: DensityConfig,
        settings: ControllerSettings,
    ) -> Result<Self, ColoringMeshError> {
        let expected = (base.width(), base.height());
        let provided = (mask.width(), mask.height());
        if expected != provided {
            return Err(RasterError::SizeMismatch(expected, provided).into());
        }
        config.validate()?;
        let mesh = generate_mesh(&mask, config, &settings.mesh)?;
        let index = MeshIndex::new(&mesh, settings.mesh.index_cell_scale);
        let paint = PaintState::new(settings.paint.centroid_bucket);
        log::info!(
            "Session started with {} triangles ({} boundary points, density {})",
            mesh.triangles.len(),
            config.boundary_points,
            config.interior_density
        );
        Ok(Self {
            base,
            mask,
            settings,
            config,
            color: DEFAULT_PALETTE[0],
            state: MeshState { mesh, index, paint },
        })
    }

    pub fn base(&self) -> &ColorBuffer {
        &self.base
    }

    pub fn mask(&self) -> &ForegroundMask {
        &self.mask
    }

    pub fn settings(&self) -> &ControllerSettings {
        &self.settings
    }

    pub fn config(&self) -> DensityConfig {
        self.config
    }

    pub fn mesh(&self) -> &ColoringMesh {
        &self.state.mesh
    }

    pub fn index(&self) -> &MeshIndex {
        &self.state.index
    }

    pub fn paint_state(&self) -> &PaintState {
        &self.state.paint
    }

    /// Color used by clicks.
    pub fn color(&self) -> Color {
        self.color
    }

    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    /// Finds triangle under given point.
    pub fn locate(&self, point: Coord) -> Option<TriangleId> {
        self.state.index.locate(point)
    }

    /// Paints triangle under given point.
    ///
    /// # Returns
    /// Painted triangle or `None` when point is outside of the mesh.
    pub fn paint(&mut self, point: Coord, color: Color) -> Option<TriangleId> {
        let id = self.locate(point)?;
        let centroid = self.state.mesh.centroid(id)?;
        self.state.paint.paint(centroid, color);
        Some(id)
    }

    /// Color of triangle under given point.
    pub fn color_at(&self, point: Coord) -> Option<Color> {
        self.triangle_color(self.locate(point)?)
    }

    pub fn triangle_color(&self, id: TriangleId) -> Option<Color> {
        self.state
            .paint
            .color_of(self.state.mesh.centroid(id)?)
    }

    /// Removes all triangle colors.
    pub fn reset(&mut self) {
        self.state.paint.clear();
    }

    /// Builds new mesh for given config and moves triangle colors onto it.
    /// On error the current mesh and colors are kept.
    pub fn rebuild(&mut self, config: DensityConfig) -> Result<RebuildReport, ColoringMeshError> {
        config.validate()?;
        let mesh = generate_mesh(&self.mask, config, &self.settings.mesh)?;
        let index = MeshIndex::new(&mesh, self.settings.mesh.index_cell_scale);
        let (paint, rematch) = self
            .state
            .paint
            .rematch(&mesh, self.settings.paint.rematch_tolerance);
        let report = RebuildReport {
            vertices: mesh.vertices.len(),
            triangles: mesh.triangles.len(),
            retained: rematch.retained,
            dropped: rematch.dropped,
        };
        self.state = MeshState { mesh, index, paint };
        self.config = config;
        log::info!(
            "Mesh rebuilt with {} triangles ({} boundary points, density {}), {} colors kept, {} dropped",
            report.triangles,
            config.boundary_points,
            config.interior_density,
            report.retained,
            report.dropped
        );
        Ok(report)
    }

    /// Renders base image with painted triangles and mesh overlay.
    pub fn render(&self) -> ColorBuffer {
        render(
            &self.base,
            &self.state.mesh,
            &self.state.paint,
            &self.settings.render,
        )
    }

    /// Applies single input event.
    pub fn handle(&mut self, event: Event) -> EventOutcome {
        match event {
            Event::Click { point } => match self.paint(point, self.color) {
                Some(triangle) => EventOutcome::Painted { triangle },
                None => EventOutcome::Missed,
            },
            Event::DensityChanged { config } => self.rebuild_outcome(config),
            Event::ColorSelected { color } => {
                self.color = color;
                EventOutcome::ColorSelected(color)
            }
            Event::KeyPressed { key } => match key {
                '+' | '=' => self.step(self.settings.stepping.increase(self.config)),
                '-' | '_' => self.step(self.settings.stepping.decrease(self.config)),
                'r' | 'R' => {
                    self.reset();
                    EventOutcome::Reset
                }
                's' | 'S' => EventOutcome::SaveRequested,
                '\u{1b}' => EventOutcome::QuitRequested,
                _ => EventOutcome::Ignored,
            },
        }
    }

    fn step(&mut self, config: DensityConfig) -> EventOutcome {
        if config == self.config {
            log::debug!("Density already at its limit: {:?}", config);
            EventOutcome::Ignored
        } else {
            self.rebuild_outcome(config)
        }
    }

    fn rebuild_outcome(&mut self, config: DensityConfig) -> EventOutcome {
        match self.rebuild(config) {
            Ok(report) => EventOutcome::Rebuilt(report),
            Err(error) => {
                log::warn!("Rebuild with {:?} rejected: {}", config, error);
                EventOutcome::RebuildRejected(error)
            }
        }
    }
}
