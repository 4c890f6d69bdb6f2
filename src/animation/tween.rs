use std::time::Duration;

use crate::animation::ease::{Ease, lerp};

/// Interpolation contract for tweened value types.
pub trait Lerp: Copy {
    /// Interpolate from `a` to `b` with eased factor `t`.
    fn lerp(a: Self, b: Self, t: f64) -> Self;
}

impl Lerp for f64 {
    fn lerp(a: Self, b: Self, t: f64) -> Self {
        lerp(a, b, t)
    }
}

/// A time-driven interpolation from `from` to `to`.
///
/// Times are offsets on a [`crate::Clock`] timeline. Progress is derived from elapsed time, so
/// the number of samples taken does not affect how long the tween lasts.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tween<T> {
    /// Value at `start`.
    pub from: T,
    /// Value at and after `start + duration`.
    pub to: T,
    /// Clock time the tween began.
    pub start: Duration,
    /// Total length of the tween.
    pub duration: Duration,
    /// Easing applied to linear progress.
    pub ease: Ease,
}

impl<T: Lerp> Tween<T> {
    /// Create a tween starting at `start`.
    pub fn new(from: T, to: T, start: Duration, duration: Duration, ease: Ease) -> Self {
        Self {
            from,
            to,
            start,
            duration,
            ease,
        }
    }

    /// Clock time at which the tween completes.
    pub fn end(&self) -> Duration {
        self.start.saturating_add(self.duration)
    }

    /// Linear progress in `[0, 1]`.
    pub fn progress(&self, now: Duration) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_sub(self.start);
        (elapsed.as_secs_f64() / self.duration.as_secs_f64()).clamp(0.0, 1.0)
    }

    /// `true` once `now` has reached the end of the tween.
    pub fn is_done(&self, now: Duration) -> bool {
        now >= self.end()
    }

    /// Value at `now`. Exactly `to` once the tween is done.
    pub fn sample(&self, now: Duration) -> T {
        if self.is_done(now) {
            return self.to;
        }
        T::lerp(self.from, self.to, self.ease.apply(self.progress(now)))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/tween.rs"]
mod tests;
