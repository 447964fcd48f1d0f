//! Utilities for numerics.

use std::cmp::Ordering;

/// An `f32` that implements [`Ord`] according to the IEEE 754 totalOrder predicate.
#[derive(Debug, Clone, Copy)]
pub struct TotalF32(pub f32);

impl PartialEq for TotalF32 {
    fn eq(&self, other: &Self) -> bool {
        f32::total_cmp(&self.0, &other.0) == Ordering::Equal
    }
}

impl Eq for TotalF32 {}

impl PartialOrd for TotalF32 {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TotalF32 {
    fn cmp(&self, other: &Self) -> Ordering {
        f32::total_cmp(&self.0, &other.0)
    }
}

/// Returns whether `v` is a finite value in the closed range `0.0..=1.0`.
pub(crate) fn is_unit_fraction(v: f32) -> bool {
    v.is_finite() && (0.0..=1.0).contains(&v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_order_sorts_descending() {
        let mut values = vec![TotalF32(0.5), TotalF32(1.0), TotalF32(0.0), TotalF32(-0.0)];
        values.sort_by(|a, b| b.cmp(a));
        let raw = values.iter().map(|v| v.0).collect::<Vec<_>>();
        assert_eq!(raw, [1.0, 0.5, 0.0, -0.0]);
        assert!(raw[2].is_sign_positive());
    }

    #[test]
    fn unit_fraction() {
        assert!(is_unit_fraction(0.0));
        assert!(is_unit_fraction(0.6));
        assert!(is_unit_fraction(1.0));
        assert!(!is_unit_fraction(1.01));
        assert!(!is_unit_fraction(-0.1));
        assert!(!is_unit_fraction(f32::NAN));
    }
}
