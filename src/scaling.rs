//! Pure scaling calculations for area-based and fixed-side resizing.
//!
//! All functions here are pure and testable without any I/O or images.
//!
//! ## Rounding policy
//!
//! The scale factor is `sqrt(target_area / current_area)`, with no bias and
//! no rounding of the factor itself. Direction is enforced when rounding the
//! resulting pixel dimensions instead:
//!
//! - **Upscaling** rounds both sides up, so the result meets or exceeds the
//!   target area.
//! - **Downscaling** truncates both sides, so the result never exceeds the
//!   target area.
//! - **Equal areas** return the input unchanged, with no rounding drift.
//!
//! Zero-sized input is not rejected: factors become infinite or NaN and the
//! saturating float-to-int casts turn those into `u32::MAX` or `0`.

use crate::dimensions::Dimensions;

/// Scale factor that maps `current` onto `target_area`, preserving aspect ratio.
///
/// Returns exactly `1.0` when the areas already match.
///
/// # Examples
/// ```
/// # use image_wrangler::dimensions::Dimensions;
/// # use image_wrangler::scaling::scaling_factor;
/// assert_eq!(scaling_factor(400, Dimensions::new(20, 20)), 1.0);
/// assert_eq!(scaling_factor(100, Dimensions::new(20, 20)), 0.5);
/// ```
pub fn scaling_factor(target_area: u64, current: Dimensions) -> f64 {
    let current_area = current.area();
    if current_area == target_area {
        return 1.0;
    }
    (target_area as f64 / current_area as f64).sqrt()
}

/// Dimensions whose area approximates `target_area` from the correct side.
///
/// # Arguments
/// * `target_area` - Desired pixel area
/// * `current` - Current dimensions
///
/// # Returns
/// * Dimensions with area `>= target_area` when upscaling, `<= target_area`
///   when downscaling, or `current` itself when the areas match.
///
/// # Examples
/// ```
/// # use image_wrangler::dimensions::Dimensions;
/// # use image_wrangler::scaling::dimensions_for_target_pixel_area;
/// let up = dimensions_for_target_pixel_area(5_230_000, Dimensions::new(990, 503));
/// assert_eq!(up, Dimensions::new(3209, 1631));
/// ```
pub fn dimensions_for_target_pixel_area(target_area: u64, current: Dimensions) -> Dimensions {
    let current_area = current.area();
    if current_area == target_area {
        return current;
    }

    let downscaling = current_area > target_area;
    let factor = scaling_factor(target_area, current);
    let width = f64::from(current.width) * factor;
    let height = f64::from(current.height) * factor;

    if downscaling {
        Dimensions::new(width.trunc() as u32, height.trunc() as u32)
    } else {
        Dimensions::new(width.ceil() as u32, height.ceil() as u32)
    }
}

fn fixed_side_factor(fixed_side: u32, current: Dimensions) -> f64 {
    f64::from(fixed_side) / f64::from(current.max_side())
}

/// Dimensions with the longer side scaled to `fixed_side`, both sides rounded up.
///
/// # Examples
/// ```
/// # use image_wrangler::dimensions::Dimensions;
/// # use image_wrangler::scaling::dimensions_for_fixed_side;
/// assert_eq!(dimensions_for_fixed_side(240, Dimensions::new(990, 503)), Dimensions::new(240, 122));
/// ```
pub fn dimensions_for_fixed_side(fixed_side: u32, current: Dimensions) -> Dimensions {
    let factor = fixed_side_factor(fixed_side, current);
    Dimensions::new(
        (f64::from(current.width) * factor).ceil() as u32,
        (f64::from(current.height) * factor).ceil() as u32,
    )
}

/// Pixel area a fixed-side resize would produce, without performing it.
pub fn pixel_area_for_fixed_side(fixed_side: u32, current: Dimensions) -> u64 {
    dimensions_for_fixed_side(fixed_side, current).area()
}

/// What a resize should aim for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleTarget {
    /// Total pixel area.
    PixelArea(u64),
    /// Length of the longer side.
    FixedSide(u32),
}

impl ScaleTarget {
    /// Resolve this target against `current` dimensions.
    pub fn dimensions(self, current: Dimensions) -> Dimensions {
        match self {
            Self::PixelArea(area) => dimensions_for_target_pixel_area(area, current),
            Self::FixedSide(side) => dimensions_for_fixed_side(side, current),
        }
    }
}
