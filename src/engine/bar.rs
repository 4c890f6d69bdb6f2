use std::future::Future;
use std::time::Duration;

use parking_lot::Mutex;

use crate::animation::clock::Clock;
use crate::animation::ease::Ease;
use crate::animation::tween::{Lerp, Tween};
use crate::engine::frame::{BarLayout, BarView};
use crate::foundation::core::{Axis, Rect, Rgba8};
use crate::foundation::error::{RaceError, RaceResult};

/// Extent and represented value of a bar, animated together.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BarMetrics {
    /// Bar length in plot pixels.
    pub extent: f64,
    /// Represented value.
    pub value: f64,
}

impl Lerp for BarMetrics {
    fn lerp(a: Self, b: Self, t: f64) -> Self {
        Self {
            extent: f64::lerp(a.extent, b.extent, t),
            value: f64::lerp(a.value, b.value, t),
        }
    }
}

/// Read-only view of a bar's state at one instant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BarSample {
    /// Displayed extent.
    pub extent: f64,
    /// Displayed value; rounded to an integer while a value transition is in flight.
    pub value: f64,
    /// Logical slot (0 = top).
    pub slot: usize,
    /// Visual slot coordinate; fractional while a slot transition is in flight.
    pub position: f64,
    /// A value/extent transition is in flight.
    pub transitioning: bool,
    /// A slot transition is in flight.
    pub swapping: bool,
}

#[derive(Clone, Debug)]
struct BarState {
    metrics: BarMetrics,
    slot: usize,
    position: f64,
    metrics_tween: Option<Tween<BarMetrics>>,
    slot_tween: Option<Tween<f64>>,
}

impl BarState {
    /// Commit tweens that have reached their end. Returns `true` if anything was committed.
    fn settle(&mut self, now: Duration) -> bool {
        let mut settled = false;
        if let Some(t) = self.metrics_tween
            && t.is_done(now)
        {
            self.metrics = t.to;
            self.metrics_tween = None;
            settled = true;
        }
        if let Some(t) = self.slot_tween
            && t.is_done(now)
        {
            self.position = t.to;
            self.slot_tween = None;
            settled = true;
        }
        settled
    }

    fn sample(&self, now: Duration) -> BarSample {
        let (extent, value) = match self.metrics_tween {
            Some(t) => {
                let m = t.sample(now);
                (m.extent, m.value.round())
            }
            None => (self.metrics.extent, self.metrics.value),
        };
        BarSample {
            extent,
            value,
            slot: self.slot,
            position: self.slot_tween.map_or(self.position, |t| t.sample(now)),
            transitioning: self.metrics_tween.is_some(),
            swapping: self.slot_tween.is_some(),
        }
    }

    fn begin_slot(&mut self, now: Duration, slot: usize, duration: Duration, ease: Ease) {
        let from = self.slot_tween.map_or(self.position, |t| t.sample(now));
        self.slot_tween = Some(Tween::new(from, slot as f64, now, duration, ease));
        self.slot = slot;
    }
}

/// Owns one entity's visual state and animates it.
///
/// Two independent axes can be in flight at once: value/extent (driven by the step loop) and
/// slot (driven by rank reordering). Starting a second transition on a busy axis is rejected with
/// [`RaceError::TransitionConflict`].
#[derive(Debug)]
pub struct BarController {
    label: String,
    color: Rgba8,
    ease: Ease,
    state: Mutex<BarState>,
}

impl BarController {
    /// Bar at rest with `metrics`, in `slot`.
    pub fn new(label: impl Into<String>, color: Rgba8, metrics: BarMetrics, slot: usize, ease: Ease) -> Self {
        Self {
            label: label.into(),
            color,
            ease,
            state: Mutex::new(BarState {
                metrics,
                slot,
                position: slot as f64,
                metrics_tween: None,
                slot_tween: None,
            }),
        }
    }

    /// Entity label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Fill color.
    pub fn color(&self) -> Rgba8 {
        self.color
    }

    /// Commit finished transitions. Returns `true` if anything was committed.
    pub fn settle(&self, now: Duration) -> bool {
        self.state.lock().settle(now)
    }

    /// Current (possibly mid-transition) state.
    pub fn sample(&self, now: Duration) -> BarSample {
        let mut state = self.state.lock();
        state.settle(now);
        state.sample(now)
    }

    /// Renderer-facing geometry at `now`.
    pub fn view(&self, now: Duration, layout: &BarLayout) -> BarView {
        let s = self.sample(now);
        let y0 = layout.plot.y0 + s.position * layout.bar_height;
        BarView {
            label: self.label.clone(),
            color: self.color,
            rect: Rect::new(
                layout.plot.x0,
                y0,
                layout.plot.x0 + s.extent,
                y0 + layout.bar_height,
            ),
            value: s.value,
            slot: s.slot,
        }
    }

    /// Start a value/extent transition (and optionally a slot transition) at `now`.
    ///
    /// Returns the clock time at which the transition completes. Nothing is changed when either
    /// requested axis is already in flight.
    pub fn begin_transition(
        &self,
        now: Duration,
        target: BarMetrics,
        target_slot: Option<usize>,
        duration: Duration,
    ) -> RaceResult<Duration> {
        let mut state = self.state.lock();
        state.settle(now);
        if state.metrics_tween.is_some() {
            return Err(RaceError::transition_conflict(&self.label, Axis::Value));
        }
        let slot_change = target_slot.filter(|slot| *slot != state.slot);
        if slot_change.is_some() && state.slot_tween.is_some() {
            return Err(RaceError::transition_conflict(&self.label, Axis::Slot));
        }

        state.metrics_tween = Some(Tween::new(
            state.metrics,
            target,
            now,
            duration,
            self.ease,
        ));
        if let Some(slot) = slot_change {
            state.begin_slot(now, slot, duration, self.ease);
        }
        Ok(now.saturating_add(duration))
    }

    /// Animate extent and value (and optionally the slot) to the targets over `duration`.
    ///
    /// The transition starts immediately; the returned future resolves once the clock reaches
    /// the end, at which point the state holds exactly the targets.
    pub fn transition_to<'a, C: Clock>(
        &'a self,
        clock: &'a C,
        target_extent: f64,
        target_value: f64,
        target_slot: Option<usize>,
        duration: Duration,
    ) -> RaceResult<impl Future<Output = ()> + Send + 'a> {
        let target = BarMetrics {
            extent: target_extent,
            value: target_value,
        };
        let end = self.begin_transition(clock.now(), target, target_slot, duration)?;
        Ok(self.settled_at(clock, end))
    }

    /// Start a slot-only transition at `now`. Returns the completion time.
    pub fn begin_swap(&self, now: Duration, slot: usize, duration: Duration) -> RaceResult<Duration> {
        let mut state = self.state.lock();
        state.settle(now);
        if state.slot_tween.is_some() {
            return Err(RaceError::transition_conflict(&self.label, Axis::Slot));
        }
        state.begin_slot(now, slot, duration, self.ease);
        Ok(now.saturating_add(duration))
    }

    /// Animate only the vertical slot to `slot` over `duration`.
    pub fn swap_to<'a, C: Clock>(
        &'a self,
        clock: &'a C,
        slot: usize,
        duration: Duration,
    ) -> RaceResult<impl Future<Output = ()> + Send + 'a> {
        let end = self.begin_swap(clock.now(), slot, duration)?;
        Ok(self.settled_at(clock, end))
    }

    fn settled_at<'a, C: Clock>(
        &'a self,
        clock: &'a C,
        end: Duration,
    ) -> impl Future<Output = ()> + Send + 'a {
        async move {
            loop {
                let now = clock.now();
                if now >= end {
                    self.settle(now);
                    return;
                }
                clock.sleep_until(end).await;
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/engine/bar.rs"]
mod tests;
