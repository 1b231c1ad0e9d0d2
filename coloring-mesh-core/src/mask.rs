use crate::{error::RasterError, Scalar};
use serde::{Deserialize, Serialize};

/// Foreground mask: normalized value per pixel and a threshold separating foreground from
/// background.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForegroundMask {
    width: usize,
    height: usize,
    threshold: Scalar,
    data: Vec<Scalar>,
}

impl ForegroundMask {
    /// Create new foreground mask.
    ///
    /// # Arguments
    /// * `width` - Columns.
    /// * `height` - Rows.
    /// * `data` - Raw pixel data.
    /// * `threshold` - Normalized values strictly above it are foreground.
    ///
    /// # Returns
    /// Foreground mask or error.
    ///
    /// # Examples
    /// ```
    /// use coloring_mesh_core::prelude::*;
    ///
    /// let mask = ForegroundMask::new(2, 2, vec![0, 255, 128, 0], 0.5).unwrap();
    /// assert!(mask.is_foreground((1, 0)));
    /// assert!(mask.is_foreground((0, 1)));
    /// assert!(!mask.is_foreground((0, 0)));
    /// assert!(!mask.is_foreground((-1, 0)));
    /// assert_eq!(
    ///     ForegroundMask::new(1, 2, vec![0, 1, 2, 3], 0.5),
    ///     Err(RasterError::WrongDataLength(4, 2)),
    /// );
    /// ```
    pub fn new(
        width: usize,
        height: usize,
        data: Vec<u8>,
        threshold: Scalar,
    ) -> Result<Self, RasterError> {
        if width == 0 || height == 0 {
            return Err(RasterError::Empty { width, height });
        }
        if data.len() != width * height {
            return Err(RasterError::WrongDataLength(data.len(), width * height));
        }
        let data = data
            .into_iter()
            .map(|v| v as Scalar / 255.0)
            .collect::<Vec<_>>();
        Ok(Self {
            width,
            height,
            threshold,
            data,
        })
    }

    /// Create mask where every pixel is foreground.
    pub fn full(width: usize, height: usize) -> Result<Self, RasterError> {
        Self::new(width, height, vec![255; width * height], 0.5)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn threshold(&self) -> Scalar {
        self.threshold
    }

    /// Returns values buffer.
    pub fn values(&self) -> &[Scalar] {
        &self.data
    }

    /// Returns value at given point or 0 if out of bounds.
    ///
    /// # Arguments
    /// * `point` - (X, Y)
    pub fn value_at_point(&self, (x, y): (isize, isize)) -> Scalar {
        if x >= 0 && x < self.width as isize && y >= 0 && y < self.height as isize {
            self.data[y as usize * self.width + x as usize]
        } else {
            0.0
        }
    }

    /// Check if pixel belongs to foreground. Pixels out of bounds are background.
    ///
    /// # Arguments
    /// * `point` - (X, Y)
    #[inline]
    pub fn is_foreground(&self, point: (isize, isize)) -> bool {
        self.value_at_point(point) > self.threshold
    }

    /// Returns iterator over foreground flags: `(x, y, is foreground)`.
    pub fn foreground_iter(&self) -> impl Iterator<Item = (usize, usize, bool)> + '_ {
        self.data
            .iter()
            .enumerate()
            .map(move |(i, v)| (i % self.width, i / self.width, *v > self.threshold))
    }
}
