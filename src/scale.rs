//! Continuous scales used by the radial charts.

use std::f64::consts::TAU;

#[inline]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

#[inline]
pub fn lerp_pair(a: [f64; 2], b: [f64; 2], t: f64) -> [f64; 2] {
    [lerp(a[0], b[0], t), lerp(a[1], b[1], t)]
}

/// Maps `domain` linearly onto `range`. Values outside the domain extrapolate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinearScale {
    pub domain: [f64; 2],
    pub range: [f64; 2],
}

impl LinearScale {
    pub fn new(domain: [f64; 2], range: [f64; 2]) -> Self {
        Self { domain, range }
    }

    /// Normalized breadth `[0, 1]` onto a full turn.
    pub fn angular() -> Self {
        Self::new([0.0, 1.0], [0.0, TAU])
    }

    pub fn apply(&self, x: f64) -> f64 {
        let [d0, d1] = self.domain;
        let t = if d1 != d0 { (x - d0) / (d1 - d0) } else { 0.0 };
        lerp(self.range[0], self.range[1], t)
    }
}

/// Power scale with exponent 0.5: equal area for equal weight on a disc.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SqrtScale {
    pub domain: [f64; 2],
    pub range: [f64; 2],
}

impl SqrtScale {
    pub fn new(domain: [f64; 2], range: [f64; 2]) -> Self {
        Self { domain, range }
    }

    pub fn radial(outer_radius: f64) -> Self {
        Self::new([0.0, 1.0], [0.0, outer_radius])
    }

    fn signed_sqrt(x: f64) -> f64 {
        x.abs().sqrt().copysign(x)
    }

    pub fn apply(&self, x: f64) -> f64 {
        let p0 = Self::signed_sqrt(self.domain[0]);
        let p1 = Self::signed_sqrt(self.domain[1]);
        let t = if p1 != p0 {
            (Self::signed_sqrt(x) - p0) / (p1 - p0)
        } else {
            0.0
        };
        lerp(self.range[0], self.range[1], t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn angular_scale_spans_full_turn() {
        let x = LinearScale::angular();
        assert_eq!(x.apply(0.0), 0.0);
        assert!((x.apply(0.5) - std::f64::consts::PI).abs() < 1e-12);
        assert!((x.apply(1.0) - TAU).abs() < 1e-12);
    }

    #[test]
    fn retargeted_domain_stretches_slice() {
        let x = LinearScale::new([0.25, 0.5], [0.0, TAU]);
        assert!((x.apply(0.5) - TAU).abs() < 1e-12);
        assert!(x.apply(0.75) > TAU);
    }

    #[test]
    fn sqrt_scale_keeps_area_proportional() {
        let y = SqrtScale::radial(100.0);
        assert_eq!(y.apply(0.0), 0.0);
        assert!((y.apply(0.25) - 50.0).abs() < 1e-9);
        assert!((y.apply(1.0) - 100.0).abs() < 1e-9);
        // area of the inner disc at 0.25 is a quarter of the whole
        let inner = y.apply(0.25).powi(2);
        assert!((inner / y.apply(1.0).powi(2) - 0.25).abs() < 1e-9);
    }

    #[test]
    fn sqrt_scale_below_domain_goes_below_range() {
        let y = SqrtScale::new([0.5, 1.0], [20.0, 100.0]);
        assert!(y.apply(0.25) < 20.0);
    }

    #[test]
    fn degenerate_domain_maps_to_range_start() {
        let y = SqrtScale::new([1.0, 1.0], [20.0, 100.0]);
        assert_eq!(y.apply(0.3), 20.0);
    }
}
