//! Time-based transitions driven by the host's frame clock.
//!
//! A transition never advances on its own: the owner samples it with the
//! current host time on every frame. Replacing a transition mid-flight is
//! how interruption works; the replacement starts from whatever values the
//! old one last produced.

use std::time::Duration;

/// Maps `t` in [0, 1] to output in [0, 1].
pub type EasingFn = fn(f64) -> f64;

#[inline]
pub fn linear(t: f64) -> f64 {
    t.clamp(0.0, 1.0)
}

/// Cubic ease-in-out (slow start and end).
#[inline]
pub fn cubic_in_out(t: f64) -> f64 {
    if t <= 0.0 {
        return 0.0;
    }
    if t >= 1.0 {
        return 1.0;
    }
    let t2 = t * t;
    let t3 = t2 * t;
    4.0 * if t < 0.5 { t3 } else { 3.0 * (t - t2) + t3 - 0.75 }
}

#[derive(Debug, Clone, Copy)]
pub struct Transition {
    started: Duration,
    duration: Duration,
    easing: EasingFn,
}

impl Transition {
    /// Starts at `started` on the host clock, eased cubic-in-out.
    pub fn new(started: Duration, duration: Duration) -> Self {
        Self {
            started,
            duration,
            easing: cubic_in_out,
        }
    }

    pub fn easing(mut self, easing: EasingFn) -> Self {
        self.easing = easing;
        self
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Linear progress in [0, 1]. Zero-length transitions are always done.
    pub fn progress(&self, now: Duration) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_sub(self.started);
        (elapsed.as_secs_f64() / self.duration.as_secs_f64()).clamp(0.0, 1.0)
    }

    /// Eased progress in [0, 1].
    pub fn value(&self, now: Duration) -> f64 {
        (self.easing)(self.progress(now))
    }

    pub fn is_complete(&self, now: Duration) -> bool {
        self.progress(now) >= 1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: fn(u64) -> Duration = Duration::from_millis;

    #[test]
    fn cubic_in_out_is_symmetric() {
        assert_eq!(cubic_in_out(0.0), 0.0);
        assert_eq!(cubic_in_out(1.0), 1.0);
        assert!((cubic_in_out(0.5) - 0.5).abs() < 1e-12);
        assert!((cubic_in_out(0.25) + cubic_in_out(0.75) - 1.0).abs() < 1e-12);
        assert!(cubic_in_out(0.25) < 0.25);
    }

    #[test]
    fn progress_follows_host_clock() {
        let t = Transition::new(MS(100), MS(500)).easing(linear);
        assert_eq!(t.progress(MS(50)), 0.0);
        assert!((t.value(MS(350)) - 0.5).abs() < 1e-12);
        assert!(!t.is_complete(MS(599)));
        assert!(t.is_complete(MS(600)));
        assert_eq!(t.value(MS(10_000)), 1.0);
    }

    #[test]
    fn zero_duration_is_instant() {
        let t = Transition::new(MS(100), Duration::ZERO);
        assert!(t.is_complete(MS(100)));
        assert_eq!(t.value(MS(0)), 1.0);
    }
}
