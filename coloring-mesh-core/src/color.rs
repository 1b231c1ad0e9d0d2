use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

/// Error thrown when parsing color from text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("expected `#rrggbb` or `#rrggbbaa`, got `{0}`")]
pub struct ParseColorError(pub String);

/// RGBA color with 8 bits per channel.
///
/// Text form is `#rrggbb` or `#rrggbbaa` and it is also used for serialization.
///
/// # Examples
/// ```
/// use coloring_mesh_core::prelude::*;
///
/// let color = "#ff8000".parse::<Color>().unwrap();
/// assert_eq!(color, Color::rgb(255, 128, 0));
/// assert_eq!(color.to_string(), "#ff8000");
/// assert_eq!(Color::new(1, 2, 3, 4).to_string(), "#01020304");
/// ```
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    pub const RED: Self = Self::rgb(255, 0, 0);
    pub const GREEN: Self = Self::rgb(0, 255, 0);
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);

    #[inline]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color.
    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

impl From<[u8; 4]> for Color {
    fn from([r, g, b, a]: [u8; 4]) -> Self {
        Self::new(r, g, b, a)
    }
}

impl From<Color> for [u8; 4] {
    fn from(color: Color) -> Self {
        [color.r, color.g, color.b, color.a]
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)?;
        if self.a != 255 {
            write!(f, "{:02x}", self.a)?;
        }
        Ok(())
    }
}

impl FromStr for Color {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let error = || ParseColorError(s.to_owned());
        let hex = s.trim().strip_prefix('#').ok_or_else(error)?;
        if !hex.is_ascii() || (hex.len() != 6 && hex.len() != 8) {
            return Err(error());
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..(i + 2)], 16).map_err(|_| error());
        let a = if hex.len() == 8 { channel(6)? } else { 255 };
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?, a))
    }
}

impl TryFrom<String> for Color {
    type Error = ParseColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

/// Palette offered to the user for painting triangles.
pub const DEFAULT_PALETTE: [Color; 45] = [
    Color::rgb(0, 0, 255),
    Color::rgb(0, 255, 0),
    Color::rgb(255, 0, 0),
    Color::rgb(0, 255, 255),
    Color::rgb(255, 0, 255),
    Color::rgb(255, 255, 0),
    Color::rgb(255, 165, 0),
    Color::rgb(255, 69, 0),
    Color::rgb(255, 140, 0),
    Color::rgb(255, 0, 0),
    Color::rgb(47, 107, 85),
    Color::rgb(128, 0, 128),
    Color::rgb(92, 92, 205),
    Color::rgb(19, 69, 139),
    Color::rgb(45, 82, 160),
    Color::rgb(130, 0, 75),
    Color::rgb(193, 182, 255),
    Color::rgb(221, 160, 221),
    Color::rgb(230, 216, 173),
    Color::rgb(144, 238, 144),
    Color::rgb(224, 255, 255),
    Color::rgb(165, 42, 42),
    Color::rgb(139, 69, 19),
    Color::rgb(107, 142, 35),
    Color::rgb(46, 139, 87),
    Color::rgb(160, 82, 45),
    Color::rgb(192, 192, 192),
    Color::rgb(255, 215, 0),
    Color::rgb(130, 130, 130),
    Color::rgb(105, 105, 105),
    Color::rgb(0, 0, 0),
    Color::rgb(255, 255, 255),
    Color::rgb(127, 255, 0),
    Color::rgb(147, 20, 255),
    Color::rgb(255, 191, 0),
    Color::rgb(50, 205, 50),
    Color::rgb(255, 0, 255),
    Color::rgb(238, 130, 238),
    Color::rgb(214, 112, 218),
    Color::rgb(211, 85, 186),
    Color::rgb(219, 112, 147),
    Color::rgb(238, 104, 123),
    Color::rgb(205, 90, 106),
    Color::rgb(139, 61, 72),
    Color::rgb(112, 25, 25),
];
