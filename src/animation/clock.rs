use std::future::Future;
use std::time::Duration;

/// Time source and scheduler injected into the engine.
///
/// `now` is a monotonic offset from an arbitrary origin. Every transition and the redraw loop
/// read time through this trait, so hosts can run on real time or on a virtual clock.
pub trait Clock: Send + Sync {
    /// Monotonic time since the clock's origin.
    fn now(&self) -> Duration;

    /// Suspend for `duration`.
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send;

    /// Suspend until `deadline` on this clock's timeline. Returns immediately if it has passed.
    fn sleep_until(&self, deadline: Duration) -> impl Future<Output = ()> + Send {
        self.sleep(deadline.saturating_sub(self.now()))
    }
}

/// [`Clock`] backed by the tokio timer.
///
/// Under a paused runtime (`tokio::time::pause`, `#[tokio::test(start_paused = true)]`) time
/// only advances when every task is idle, which makes playback deterministic and as fast as the
/// work allows. Create the clock inside the runtime that will drive it.
#[derive(Clone, Copy, Debug)]
pub struct TokioClock {
    origin: tokio::time::Instant,
}

impl TokioClock {
    /// Clock whose origin is the current tokio instant.
    pub fn new() -> Self {
        Self {
            origin: tokio::time::Instant::now(),
        }
    }
}

impl Default for TokioClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for TokioClock {
    fn now(&self) -> Duration {
        tokio::time::Instant::now().saturating_duration_since(self.origin)
    }

    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send {
        tokio::time::sleep(duration)
    }

    fn sleep_until(&self, deadline: Duration) -> impl Future<Output = ()> + Send {
        tokio::time::sleep_until(self.origin + deadline)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/clock.rs"]
mod tests;
