//! Geometry and color primitives for the visualization layer

use crate::value_objects::ValueError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Position of a node in 2D space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position2D {
    pub x: f64,
    pub y: f64,
}

impl Position2D {
    /// Create a new position
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Get the distance to another position
    pub fn distance_to(&self, other: &Position2D) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

impl Default for Position2D {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// Pixel dimensions of the rendering viewport
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
}

impl Dimensions {
    /// Create new dimensions
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// The center point of the viewport
    pub fn center(&self) -> Position2D {
        Position2D::new(self.width / 2.0, self.height / 2.0)
    }
}

impl Default for Dimensions {
    fn default() -> Self {
        Self::new(800.0, 600.0)
    }
}

/// An RGBA color value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color { r: 255, g: 255, b: 255, a: 255 };
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0, a: 255 };

    /// Create a new color
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create a new opaque color
    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Parse a `#rrggbb` hex string
    pub fn from_hex(hex: &str) -> Result<Self, ValueError> {
        let digits = hex
            .strip_prefix('#')
            .filter(|digits| digits.len() == 6 && digits.is_ascii())
            .ok_or_else(|| ValueError::InvalidHexColor(hex.to_string()))?;
        let parse = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16)
                .map_err(|_| ValueError::InvalidHexColor(hex.to_string()))
        };
        Ok(Self::rgb(parse(0..2)?, parse(2..4)?, parse(4..6)?))
    }

    /// Format as a `#rrggbb` hex string, dropping the alpha channel
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Perceived luminance on the 0-255 scale
    ///
    /// Uses the ITU-R BT.601 weights `0.299 R + 0.587 G + 0.114 B`.
    pub fn luminance(&self) -> f64 {
        0.299 * f64::from(self.r) + 0.587 * f64::from(self.g) + 0.114 * f64::from(self.b)
    }

    /// Black or white, whichever is legible against this background
    ///
    /// Black above luminance 186, white at or below it.
    pub fn contrasting_text_color(&self) -> Color {
        if self.luminance() > 186.0 {
            Color::BLACK
        } else {
            Color::WHITE
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}
