//! Numeric conversion helpers centralizing safe numeric casts and report rounding.

use num_traits::cast::cast;

/// Round `value` to `places` decimal digits.
///
/// Halfway cases round away from zero (the behaviour of [`f64::round`]), so
/// `0.125` becomes `0.13` at two places. Non-finite input yields `0.0`, and
/// small negatives that round to zero yield positive `0.0`.
#[must_use]
pub fn round_to(value: f64, places: i32) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    let factor = 10_f64.powi(places);
    let rounded = (value * factor).round() / factor;
    if rounded == 0.0 { 0.0 } else { rounded }
}

/// Divide by a count, returning 0.0 when the count is zero.
#[must_use]
pub fn guarded_ratio(numerator: f64, denominator: u32) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator / f64::from(denominator)
    }
}

/// Percentage of `part` over `whole`, rounded to two decimals.
#[must_use]
pub fn percentage(part: u32, whole: u32) -> f64 {
    round_to(guarded_ratio(f64::from(part), whole) * 100.0, 2)
}

/// Truncate a f64 toward zero into the i32 range, `None` when non-finite or out of range.
#[must_use]
pub fn truncate_f64_to_i32(value: f64) -> Option<i32> {
    if !value.is_finite() {
        return None;
    }
    cast::<f64, i32>(value.trunc())
}

/// Narrow an i64 into the i32 range.
#[must_use]
pub fn i64_to_i32(value: i64) -> Option<i32> {
    cast::<i64, i32>(value)
}
