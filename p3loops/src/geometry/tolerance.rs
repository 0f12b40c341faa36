// Identification tolerance for boundary parameters.

/// Two parameters on one class within this distance denote the same abstract point.
pub const EPS_PARAM: f64 = 1e-6;

// Widest tolerance accepted at runtime; beyond this a side holds at most two points.
pub const EPS_PARAM_MAX: f64 = 0.25;

#[inline]
pub fn approx_eq(a: f64, b: f64, eps: f64) -> bool {
    (a - b).abs() <= eps
}

#[inline]
pub fn valid_tolerance(eps: f64) -> bool {
    eps.is_finite() && (0.0..=EPS_PARAM_MAX).contains(&eps)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_exactly_at_tolerance() {
        // Binary-exact values so the difference is exactly the tolerance.
        assert!(approx_eq(0.5, 0.625, 0.125));
        assert!(approx_eq(0.625, 0.5, 0.125));
        assert!(!approx_eq(0.5, 0.6250001, 0.125));
    }

    #[test]
    fn tolerance_bounds() {
        assert!(valid_tolerance(0.0));
        assert!(valid_tolerance(EPS_PARAM));
        assert!(valid_tolerance(EPS_PARAM_MAX));
        assert!(!valid_tolerance(-1e-9));
        assert!(!valid_tolerance(f64::NAN));
        assert!(!valid_tolerance(0.5));
    }
}
