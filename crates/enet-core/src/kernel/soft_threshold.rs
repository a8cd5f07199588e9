//! The scalar soft-threshold operator and its positive-constrained variant.

/// `S(z, lambda) = sign(z) * max(|z| - lambda, 0)`, the proximal operator of
/// the scaled l1 norm.
#[inline]
pub fn soft_threshold(z: f64, lambda: f64) -> f64 {
    if z > lambda {
        z - lambda
    } else if z < -lambda {
        z + lambda
    } else {
        0.0
    }
}

/// `positive=true` variant: `max(z - lambda, 0)` (§4.1).
#[inline]
pub fn soft_threshold_positive(z: f64, lambda: f64) -> f64 {
    (z - lambda).max(0.0)
}
