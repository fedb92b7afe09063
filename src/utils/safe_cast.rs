//! Safe casting utilities for turning floating point positions into pixels

/// Round and clamp f64 to an i32 pixel coordinate
///
/// Non-finite values map to `min`.
#[must_use]
#[allow(clippy::cast_possible_truncation)] // Clamping ensures safe truncation
pub fn f64_to_i32_clamp(value: f64, min: i32, max: i32) -> i32 {
    let (min, max) = if min <= max { (min, max) } else { (max, min) };

    if !value.is_finite() {
        return min;
    }

    let clamped = value.round().clamp(f64::from(min), f64::from(max));
    (clamped as i32).clamp(min, max)
}

/// Clamp an i32 pixel coordinate into the i16 range used by the X11 protocol
#[must_use]
pub fn i32_to_i16_clamp(value: i32) -> i16 {
    i16::try_from(value).unwrap_or(if value < 0 { i16::MIN } else { i16::MAX })
}

/// Convert a screen dimension into the largest valid pixel index
#[must_use]
pub fn max_pixel_index(extent: u32) -> i32 {
    i32::try_from(extent.saturating_sub(1)).unwrap_or(i32::MAX)
}
