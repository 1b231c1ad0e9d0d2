use crate::Scalar;
use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Neg, Sub};

/// Image-space coordinate. Pixel `(col, row)` has its center at `Coord::new(col, row)`.
///
/// # Examples
/// ```
/// use coloring_mesh_core::prelude::*;
///
/// let a = Coord::new(0.0, 0.0);
/// let b = Coord::new(3.0, 4.0);
/// assert_eq!(a.distance(b), 5.0);
/// assert_eq!((b - a).sqr_magnitude(), 25.0);
/// assert_eq!(Coord::new(1.0, 0.0).cross(Coord::new(0.0, 1.0)), 1.0);
/// assert_eq!(Coord::centroid(a, Coord::new(3.0, 0.0), Coord::new(0.0, 3.0)), Coord::new(1.0, 1.0));
/// ```
#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coord {
    /// X value.
    pub x: Scalar,
    /// Y value.
    pub y: Scalar,
}

impl Coord {
    /// Create new coordinate.
    ///
    /// # Arguments
    /// * `x` - X value.
    /// * `y` - Y value.
    #[inline]
    pub fn new(x: Scalar, y: Scalar) -> Self {
        Self { x, y }
    }

    /// Return squared length of the vector.
    #[inline]
    pub fn sqr_magnitude(self) -> Scalar {
        self.x * self.x + self.y * self.y
    }

    /// Return length of the vector.
    #[inline]
    pub fn magnitude(self) -> Scalar {
        self.sqr_magnitude().sqrt()
    }

    /// Return distance to other coordinate.
    #[inline]
    pub fn distance(self, other: Self) -> Scalar {
        (other - self).magnitude()
    }

    /// Returns dot product.
    #[inline]
    pub fn dot(self, other: Self) -> Scalar {
        self.x * other.x + self.y * other.y
    }

    /// Returns z component of the 3D cross product (twice the signed area spanned by both
    /// vectors).
    ///
    /// ```plain
    ///  other
    ///    ^
    ///    |   positive
    ///    *---> self
    /// ```
    #[inline]
    pub fn cross(self, other: Self) -> Scalar {
        self.x * other.y - self.y * other.x
    }

    /// Linear interpolation towards `other` by `factor` clamped to `[0, 1]`.
    #[inline]
    pub fn lerp(self, other: Self, factor: Scalar) -> Self {
        self + (other - self) * factor.max(0.0).min(1.0)
    }

    /// Centroid of a triangle.
    #[inline]
    pub fn centroid(a: Self, b: Self, c: Self) -> Self {
        (a + b + c) / 3.0
    }

    /// Coordinates promoted to `f64` for geometric predicates.
    #[inline]
    pub(crate) fn wide(self) -> (f64, f64) {
        (self.x as f64, self.y as f64)
    }
}

impl From<(Scalar, Scalar)> for Coord {
    fn from((x, y): (Scalar, Scalar)) -> Self {
        Self { x, y }
    }
}

impl From<[Scalar; 2]> for Coord {
    fn from([x, y]: [Scalar; 2]) -> Self {
        Self { x, y }
    }
}

impl Add for Coord {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

impl Sub for Coord {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }
}

impl Mul<Scalar> for Coord {
    type Output = Self;

    fn mul(self, other: Scalar) -> Self {
        Self {
            x: self.x * other,
            y: self.y * other,
        }
    }
}

impl Div<Scalar> for Coord {
    type Output = Self;

    fn div(self, other: Scalar) -> Self {
        Self {
            x: self.x / other,
            y: self.y / other,
        }
    }
}

impl Neg for Coord {
    type Output = Self;

    fn neg(self) -> Self {
        Self {
            x: -self.x,
            y: -self.y,
        }
    }
}
