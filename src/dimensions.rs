//! Width/height value type.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An immutable `width × height` pair in pixels.
///
/// No bounds checking happens here: zero-sized dimensions are legal and it is
/// up to callers to reject them where they matter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Pixel area (`width * height`).
    pub fn area(self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// The longer of the two sides.
    pub fn max_side(self) -> u32 {
        self.width.max(self.height)
    }

    pub fn to_pair(self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn summary(self) -> DimensionsSummary {
        DimensionsSummary {
            width: self.width,
            height: self.height,
            area: self.area(),
            max: self.max_side(),
        }
    }
}

impl From<(u32, u32)> for Dimensions {
    fn from((width, height): (u32, u32)) -> Self {
        Self::new(width, height)
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Flattened view of [`Dimensions`] with derived values, for JSON output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DimensionsSummary {
    pub width: u32,
    pub height: u32,
    pub area: u64,
    pub max: u32,
}
