//! Numeric conversion helpers centralizing safe numeric casts and angle math.

use num_traits::cast::cast;

/// Replace NaN/inf with `fallback` so model outputs never leak non-finite values.
#[must_use]
pub fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() { value } else { fallback }
}

/// Wrap an angle in degrees onto `[0, 360)`, returning 0.0 for non-finite values.
#[must_use]
pub fn wrap_degrees(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    let wrapped = value.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Smallest unsigned angle between two headings, in `[0, 180]`.
#[must_use]
pub fn angular_difference(a: f64, b: f64) -> f64 {
    let diff = wrap_degrees(a - b);
    if diff > 180.0 { 360.0 - diff } else { diff }
}

/// Convert usize to f64 while allowing precision loss in a single location.
#[must_use]
pub fn usize_to_f64(value: usize) -> f64 {
    cast::<usize, f64>(value).unwrap_or(0.0)
}

/// Ceil a f64 and clamp it into the usize range, returning 0 for non-finite or negative values.
#[must_use]
pub fn ceil_f64_to_usize(value: f64) -> usize {
    if !value.is_finite() || value <= 0.0 {
        return 0;
    }
    cast::<f64, usize>(value.ceil()).unwrap_or(usize::MAX)
}

/// Share of `part` in `total` as a percentage; an empty total counts as 0%.
#[must_use]
pub fn percent_of(part: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    usize_to_f64(part) / usize_to_f64(total) * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_handles_negative_and_non_finite() {
        assert!((wrap_degrees(-90.0) - 270.0).abs() < 1e-9);
        assert!((wrap_degrees(720.0)).abs() < 1e-9);
        assert!((wrap_degrees(f64::NAN)).abs() < f64::EPSILON);
        assert!(wrap_degrees(-1e-18) < 360.0);
    }

    #[test]
    fn angular_difference_takes_short_way_round() {
        assert!((angular_difference(350.0, 10.0) - 20.0).abs() < 1e-9);
        assert!((angular_difference(0.0, 180.0) - 180.0).abs() < 1e-9);
        assert!((angular_difference(90.0, -90.0) - 180.0).abs() < 1e-9);
    }

    #[test]
    fn ceil_and_percent_cover_edges() {
        assert_eq!(ceil_f64_to_usize(7.01), 8);
        assert_eq!(ceil_f64_to_usize(-3.0), 0);
        assert_eq!(ceil_f64_to_usize(f64::INFINITY), 0);
        assert!((percent_of(7, 10) - 70.0).abs() < 1e-9);
        assert!(percent_of(3, 0).abs() < f64::EPSILON);
    }
}
