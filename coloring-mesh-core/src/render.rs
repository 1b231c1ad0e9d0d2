use crate::{
    buffer::ColorBuffer, color::Color, coord::Coord, mesh::ColoringMesh, paint::PaintState,
    utils::triangle_contains, Scalar,
};
use serde::{Deserialize, Serialize};

/// Look of rendered mesh overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderStyle {
    /// Draw triangle edges.
    #[serde(default = "RenderStyle::default_draw_edges")]
    pub draw_edges: bool,
    #[serde(default = "RenderStyle::default_edge_color")]
    pub edge_color: Color,
    /// Draw mesh vertices as small squares.
    #[serde(default)]
    pub draw_vertices: bool,
    #[serde(default = "RenderStyle::default_vertex_color")]
    pub vertex_color: Color,
    /// Half size of vertex square in pixels.
    #[serde(default = "RenderStyle::default_vertex_radius")]
    pub vertex_radius: usize,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            draw_edges: Self::default_draw_edges(),
            edge_color: Self::default_edge_color(),
            draw_vertices: false,
            vertex_color: Self::default_vertex_color(),
            vertex_radius: Self::default_vertex_radius(),
        }
    }
}

impl RenderStyle {
    fn default_draw_edges() -> bool {
        true
    }

    fn default_edge_color() -> Color {
        Color::BLACK
    }

    fn default_vertex_color() -> Color {
        Color::RED
    }

    fn default_vertex_radius() -> usize {
        1
    }
}

/// Composites base image, painted triangles and mesh overlay.
///
/// # Arguments
/// * `base` - Base image, also defines output size.
/// * `mesh` - Mesh in base image space.
/// * `paint` - Triangle colors.
/// * `style` - Overlay style.
pub fn render(
    base: &ColorBuffer,
    mesh: &ColoringMesh,
    paint: &PaintState,
    style: &RenderStyle,
) -> ColorBuffer {
    let mut result = base.clone();
    for (id, color) in paint.triangle_colors(mesh).into_iter().enumerate() {
        if let (Some(color), Some(points)) = (color, mesh.triangle_points(id)) {
            fill_triangle(&mut result, points, color);
        }
    }
    if style.draw_edges {
        for (a, b) in mesh.edges() {
            if let (Some(a), Some(b)) = (mesh.vertices.get(a), mesh.vertices.get(b)) {
                draw_line(&mut result, a.point, b.point, style.edge_color);
            }
        }
    }
    if style.draw_vertices {
        let radius = style.vertex_radius as isize;
        for vertex in &mesh.vertices {
            let (x, y) = pixel(vertex.point);
            for dy in -radius..=radius {
                for dx in -radius..=radius {
                    result.put((x + dx, y + dy), style.vertex_color);
                }
            }
        }
    }
    result
}

#[inline]
fn pixel(point: Coord) -> (isize, isize) {
    (point.x.round() as isize, point.y.round() as isize)
}

/// Fills pixels whose centers lie inside counter-clockwise triangle, edges included.
pub fn fill_triangle(buffer: &mut ColorBuffer, [a, b, c]: [Coord; 3], color: Color) {
    let right = buffer.width() as Scalar - 1.0;
    let bottom = buffer.height() as Scalar - 1.0;
    let fx = a.x.min(b.x).min(c.x).ceil().max(0.0) as isize;
    let fy = a.y.min(b.y).min(c.y).ceil().max(0.0) as isize;
    let tx = a.x.max(b.x).max(c.x).floor().min(right) as isize;
    let ty = a.y.max(b.y).max(c.y).floor().min(bottom) as isize;
    for y in fy..=ty {
        for x in fx..=tx {
            if triangle_contains(a, b, c, Coord::new(x as Scalar, y as Scalar), 0.0) {
                buffer.put((x, y), color);
            }
        }
    }
}

/// Draws one pixel thick line, both end pixels included.
pub fn draw_line(buffer: &mut ColorBuffer, from: Coord, to: Coord, color: Color) {
    let (fx, fy) = pixel(from);
    let (tx, ty) = pixel(to);
    let dx = tx - fx;
    let dy = ty - fy;
    let steps = dx.abs().max(dy.abs());
    if steps == 0 {
        buffer.put((fx, fy), color);
        return;
    }
    for step in 0..=steps {
        let f = step as Scalar / steps as Scalar;
        let x = fx + (dx as Scalar * f).round() as isize;
        let y = fy + (dy as Scalar * f).round() as isize;
        buffer.put((x, y), color);
    }
}
