//! Tolerance-bounded rounding shared by every rate and lag computation.
//!
//! All "is this ratio an integer" questions in the crate go through
//! [`is_close`] and [`round_half_even`] so that warning and failure
//! thresholds stay consistent.  Tolerances match numpy's `isclose` defaults
//! and rounding matches numpy's `round` (ties to even).

/// Relative tolerance for [`is_close`].
pub const RTOL: f64 = 1e-5;
/// Absolute tolerance for [`is_close`].
pub const ATOL: f64 = 1e-8;

/// `|a − b| <= ATOL + RTOL·|b|`.
pub fn is_close(a: f64, b: f64) -> bool {
    (a - b).abs() <= ATOL + RTOL * b.abs()
}

/// Round to the nearest integer, ties to even.
pub fn round_half_even(x: f64) -> i64 {
    x.round_ties_even() as i64
}

/// A ratio together with its rounded value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ratio {
    pub value: f64,
    pub rounded: i64,
}

impl Ratio {
    pub fn of(num: f64, den: f64) -> Self {
        let value = num / den;
        Self { value, rounded: round_half_even(value) }
    }

    /// Whether the ratio lies within tolerance of its rounded value.
    pub fn is_integral(&self) -> bool {
        is_close(self.value, self.rounded as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ties_round_to_even() {
        assert_eq!(round_half_even(0.5), 0);
        assert_eq!(round_half_even(1.5), 2);
        assert_eq!(round_half_even(2.5), 2);
        assert_eq!(round_half_even(-0.5), 0);
        assert_eq!(round_half_even(2.6), 3);
    }

    #[test]
    fn close_within_tolerance() {
        assert!(is_close(8.0, 8.0 + 1e-9));
        assert!(is_close(0.0, 1e-9));
        assert!(!is_close(8.0, 8.01));
    }

    #[test]
    fn ratio_integrality() {
        assert!(Ratio::of(2.0, 0.25).is_integral());
        assert_eq!(Ratio::of(2.0, 0.25).rounded, 8);
        let r = Ratio::of(2.0, 0.3);
        assert!(!r.is_integral());
        assert_eq!(r.rounded, 7);
        // Floating-point noise still counts as integral.
        assert!(Ratio::of(0.3, 0.1).is_integral());
    }
}
