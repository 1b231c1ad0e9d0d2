pub mod buffer;
pub mod color;
pub mod contour;
pub mod controller;
pub mod coord;
pub mod error;
pub mod generator;
pub mod index;
pub mod interior;
pub mod mask;
pub mod mesh;
pub mod paint;
pub mod polygon;
pub mod render;
pub mod triangle;
pub mod triangulator;
mod utils;

/// Scalar type.
pub type Scalar = f32;

pub mod prelude {
    pub use crate::{
        buffer::*,
        color::*,
        contour::{self, Contour, ContourSource, Region, RegionMap},
        controller::*,
        coord::*,
        error::*,
        generator::*,
        index::*,
        interior, mask::*,
        mesh::settings::*,
        mesh::*,
        paint::*,
        polygon,
        render::{render, RenderStyle},
        triangle::*,
        triangulator, Scalar,
    };
}
