use crate::{color::Color, error::RasterError};
use serde::{Deserialize, Serialize};

/// Row-major RGBA image buffer exchanged with image loading and display collaborators.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorBuffer {
    width: usize,
    height: usize,
    pixels: Vec<Color>,
}

impl ColorBuffer {
    /// Create new color buffer.
    ///
    /// # Arguments
    /// * `width` - Columns.
    /// * `height` - Rows.
    /// * `pixels` - Row-major pixel colors.
    ///
    /// # Returns
    /// Color buffer or error.
    ///
    /// # Examples
    /// ```
    /// use coloring_mesh_core::prelude::*;
    ///
    /// assert!(ColorBuffer::new(2, 1, vec![Color::WHITE; 2]).is_ok());
    /// assert_eq!(
    ///     ColorBuffer::new(2, 2, vec![Color::WHITE; 2]),
    ///     Err(RasterError::WrongDataLength(2, 4)),
    /// );
    /// assert_eq!(
    ///     ColorBuffer::new(0, 5, vec![]),
    ///     Err(RasterError::Empty { width: 0, height: 5 }),
    /// );
    /// ```
    pub fn new(width: usize, height: usize, pixels: Vec<Color>) -> Result<Self, RasterError> {
        if width == 0 || height == 0 {
            Err(RasterError::Empty { width, height })
        } else if pixels.len() != width * height {
            Err(RasterError::WrongDataLength(pixels.len(), width * height))
        } else {
            Ok(Self {
                width,
                height,
                pixels,
            })
        }
    }

    /// Create buffer filled with single color.
    pub fn filled(width: usize, height: usize, color: Color) -> Result<Self, RasterError> {
        Self::new(width, height, vec![color; width * height])
    }

    /// Create buffer from raw RGBA bytes (4 bytes per pixel).
    pub fn from_rgba_bytes(width: usize, height: usize, data: &[u8]) -> Result<Self, RasterError> {
        if data.len() != width * height * 4 {
            return Err(RasterError::WrongDataLength(data.len(), width * height * 4));
        }
        let pixels = data
            .chunks_exact(4)
            .map(|c| Color::new(c[0], c[1], c[2], c[3]))
            .collect::<Vec<_>>();
        Self::new(width, height, pixels)
    }

    /// Returns raw RGBA bytes.
    pub fn to_rgba_bytes(&self) -> Vec<u8> {
        self.pixels
            .iter()
            .flat_map(|c| <[u8; 4]>::from(*c))
            .collect::<Vec<_>>()
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    /// Returns color at given pixel or `None` if out of bounds.
    ///
    /// # Arguments
    /// * `point` - (X, Y)
    pub fn get(&self, point: (isize, isize)) -> Option<Color> {
        self.index(point).map(|i| self.pixels[i])
    }

    /// Sets color at given pixel, ignoring pixels out of bounds.
    ///
    /// # Arguments
    /// * `point` - (X, Y)
    /// * `color` - New color.
    pub fn put(&mut self, point: (isize, isize), color: Color) {
        if let Some(i) = self.index(point) {
            self.pixels[i] = color;
        }
    }

    fn index(&self, (x, y): (isize, isize)) -> Option<usize> {
        if x >= 0 && x < self.width as isize && y >= 0 && y < self.height as isize {
            Some(y as usize * self.width + x as usize)
        } else {
            None
        }
    }
}
