use std::sync::Arc;
use std::time::Duration;

use futures::future;
use parking_lot::Mutex;

use crate::animation::clock::{Clock, TokioClock};
use crate::animation::ease::Ease;
use crate::animation::tween::Tween;
use crate::engine::bar::{BarController, BarMetrics};
use crate::engine::cancel::CancelToken;
use crate::engine::config::RaceConfig;
use crate::engine::frame::{BarLayout, Frame, TimelineView};
use crate::foundation::core::{FrameIndex, PALETTE};
use crate::foundation::error::{RaceError, RaceResult};
use crate::render::Renderer;
use crate::scene::series::{RaceData, Series, TimelineKey};
use crate::timeline::cursor::{Timeline, TimelineCursor};
use crate::timeline::snapshot::Snapshot;

/// Lifecycle of a [`RaceEngine`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RacePhase {
    /// Built and validated; no bars yet.
    Uninitialized,
    /// Bars laid out from the first key; cursor before the first key.
    Seeded,
    /// At least one key still ahead of the cursor.
    Stepping,
    /// Cursor at the final key.
    Settled,
}

/// Counters of a run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RaceStats {
    /// Completed steps (priming excluded).
    pub steps: u64,
    /// Frames handed to the renderer.
    pub frames: u64,
    /// Rank swaps started.
    pub swaps: u64,
    /// The run stopped because its [`CancelToken`] fired.
    pub cancelled: bool,
}

/// Result of one [`RaceEngine::step`] call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// Cursor moved onto the first key without a transition.
    Primed,
    /// Transitions toward this key settled and the cursor advanced onto it.
    Advanced(TimelineKey),
    /// No key left; nothing happened.
    Settled,
    /// Cancellation was observed; the cursor did not advance.
    Cancelled,
}

#[derive(Clone, Copy, Debug, Default)]
struct Pointer {
    at: f64,
    tween: Option<Tween<f64>>,
}

impl Pointer {
    fn sample(&self, now: Duration) -> f64 {
        self.tween.map_or(self.at, |t| t.sample(now))
    }

    fn is_moving(&self, now: Duration) -> bool {
        self.tween.is_some_and(|t| !t.is_done(now))
    }

    fn aim(&mut self, now: Duration, to: f64, duration: Duration, ease: Ease) -> Duration {
        let tween = Tween::new(self.sample(now), to, now, duration, ease);
        self.at = to;
        self.tween = Some(tween);
        tween.end()
    }
}

#[derive(Debug)]
struct Live {
    phase: RacePhase,
    cursor: TimelineCursor,
    /// `order[slot]` is the index of the bar shown in that slot.
    order: Vec<usize>,
    pointer: Pointer,
    stats: RaceStats,
}

/// Orchestrates a bar chart race: seeding, the step loop and the redraw loop.
///
/// ```text
/// seed -> prime -> [ fan-out transitions -> barrier -> dwell -> advance ]* -> settled
/// ```
///
/// All time is read through the injected [`Clock`]. Live state sits behind mutexes that are
/// never held across an await, so the step loop and the redraw loop can share `&self`.
pub struct RaceEngine<C: Clock = TokioClock> {
    config: RaceConfig,
    clock: C,
    layout: BarLayout,
    bars: Vec<BarController>,
    live: Mutex<Live>,
}

impl<C: Clock> std::fmt::Debug for RaceEngine<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RaceEngine")
            .field("config", &self.config)
            .field("bars", &self.bars.len())
            .field("phase", &self.phase())
            .finish_non_exhaustive()
    }
}

impl<C: Clock> RaceEngine<C> {
    /// Validate `config` and `data` and build an unseeded engine.
    pub fn new(config: RaceConfig, data: RaceData, clock: C) -> RaceResult<Self> {
        config.validate()?;
        let keys = data.validate()?;
        let series = data.into_series();
        let cursor = TimelineCursor::new(Timeline::new(keys), Arc::clone(&series));
        let layout = BarLayout::new(config.plot_rect(), series.len());
        Ok(Self {
            config,
            clock,
            layout,
            bars: Vec::new(),
            live: Mutex::new(Live {
                phase: RacePhase::Uninitialized,
                cursor,
                order: Vec::new(),
                pointer: Pointer::default(),
                stats: RaceStats::default(),
            }),
        })
    }

    /// Engine configuration.
    pub fn config(&self) -> &RaceConfig {
        &self.config
    }

    /// The injected clock.
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Slot geometry.
    pub fn layout(&self) -> BarLayout {
        self.layout
    }

    /// Bars in series order (empty before seeding).
    pub fn bars(&self) -> &[BarController] {
        &self.bars
    }

    /// Bar for `label`.
    pub fn bar(&self, label: &str) -> Option<&BarController> {
        self.bars.iter().find(|b| b.label() == label)
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> RacePhase {
        self.live.lock().phase
    }

    /// Raw cursor index (`-1` before the first key).
    pub fn cursor_index(&self) -> isize {
        self.live.lock().cursor.index()
    }

    /// Key at the cursor.
    pub fn current_key(&self) -> Option<TimelineKey> {
        self.live.lock().cursor.current().cloned()
    }

    /// Counters so far.
    pub fn stats(&self) -> RaceStats {
        self.live.lock().stats
    }

    /// Bar labels in live slot order.
    pub fn order(&self) -> Vec<String> {
        let live = self.live.lock();
        live.order
            .iter()
            .map(|&i| self.bars[i].label().to_owned())
            .collect()
    }

    /// Create one bar per series, laid out from the first key's snapshot.
    ///
    /// Extents are normalized against that snapshot, slots follow its ranking and colors come
    /// from [`PALETTE`] by series order. The cursor stays before the first key.
    #[tracing::instrument(skip(self))]
    pub fn seed(&mut self) -> RaceResult<()> {
        let live = self.live.get_mut();
        if live.phase != RacePhase::Uninitialized {
            return Err(RaceError::validation("race is already seeded"));
        }

        let first = live.cursor.snapshot_at(live.cursor.next());
        let denominator = first.normalization_denominator();
        let width = self.layout.plot.width();
        let ranked = first.ranked();

        let series: &[Series] = live.cursor.series();
        let bars: Vec<BarController> = series
            .iter()
            .enumerate()
            .map(|(i, s)| {
                let value = first.get(&s.label);
                BarController::new(
                    s.label.clone(),
                    PALETTE[i % PALETTE.len()],
                    BarMetrics {
                        extent: width * value / denominator,
                        value,
                    },
                    ranked.slot_of(&s.label).unwrap_or(i),
                    self.config.ease,
                )
            })
            .collect();

        live.order = order_from_slots(bars.iter().map(|b| b.sample(Duration::ZERO).slot));
        live.phase = RacePhase::Seeded;
        self.bars = bars;
        tracing::debug!(bars = self.bars.len(), "seeded");
        Ok(())
    }

    /// Run one step of the timeline.
    ///
    /// The first call primes the cursor onto the first key. Later calls start a transition on
    /// every bar toward the next key's snapshot, wait for all of them (and the timeline pointer)
    /// to settle, dwell and advance the cursor. Cancellation is checked before the barrier,
    /// raced against the barrier and the dwell, and checked again before advancing.
    #[tracing::instrument(skip_all)]
    pub async fn step(&self, cancel: &CancelToken) -> RaceResult<StepOutcome> {
        let (next, barrier) = {
            let mut live = self.live.lock();
            match live.phase {
                RacePhase::Uninitialized => {
                    return Err(RaceError::validation("race must be seeded before stepping"));
                }
                RacePhase::Settled => return Ok(StepOutcome::Settled),
                RacePhase::Seeded | RacePhase::Stepping => {}
            }
            if cancel.is_cancelled() {
                live.stats.cancelled = true;
                return Ok(StepOutcome::Cancelled);
            }

            if live.cursor.is_initial() {
                live.cursor.advance();
                live.phase = if live.cursor.next().is_some() {
                    RacePhase::Stepping
                } else {
                    tracing::info!("race settled");
                    RacePhase::Settled
                };
                tracing::debug!(key = ?live.cursor.current(), "primed");
                return Ok(StepOutcome::Primed);
            }

            let Some(next) = live.cursor.next().cloned() else {
                live.phase = RacePhase::Settled;
                return Ok(StepOutcome::Settled);
            };
            let target = live.cursor.snapshot_at(Some(&next));
            let now = self.clock.now();

            let pending = self.fan_out(&target, &mut live.order)?;
            let next_progress = live.cursor.progress_at(live.cursor.index() + 1);
            let pointer_end = live.pointer.aim(
                now,
                next_progress,
                self.config.transition(),
                self.config.ease,
            );

            tracing::debug!(key = %next, transitions = pending.len(), "step started");
            let barrier = future::join(
                future::join_all(pending),
                self.clock.sleep_until(pointer_end),
            );
            (next, barrier)
        };

        tokio::select! {
            _ = barrier => {}
            _ = cancel.cancelled() => return Ok(self.mark_cancelled()),
        }
        tokio::select! {
            _ = self.clock.sleep(self.config.dwell()) => {}
            _ = cancel.cancelled() => return Ok(self.mark_cancelled()),
        }
        if cancel.is_cancelled() {
            return Ok(self.mark_cancelled());
        }

        let mut live = self.live.lock();
        live.cursor.advance();
        live.stats.steps += 1;
        tracing::debug!(key = %next, "step settled");
        if live.cursor.next().is_none() {
            live.phase = RacePhase::Settled;
            tracing::info!(steps = live.stats.steps, "race settled");
        }
        Ok(StepOutcome::Advanced(next))
    }

    /// Issue every bar's transition toward `target` before anything is awaited.
    fn fan_out<'a>(
        &'a self,
        target: &Snapshot,
        order: &mut Vec<usize>,
    ) -> RaceResult<Vec<impl Future<Output = ()> + Send + use<'a, C>>> {
        let slots = self.config.rank_strategy.step_slots(target, &self.bars);
        if let Some(slots) = &slots {
            *order = order_from_slots(slots.iter().copied());
        }

        let denominator = target.normalization_denominator();
        let width = self.layout.plot.width();
        let mut pending = Vec::with_capacity(self.bars.len());
        for (i, bar) in self.bars.iter().enumerate() {
            let value = target.get(bar.label());
            let slot = slots.as_ref().map(|s| s[i]);
            let done = bar
                .transition_to(
                    &self.clock,
                    width * value / denominator,
                    value,
                    slot,
                    self.config.transition_for(bar.label()),
                )
                .inspect_err(|e| tracing::error!(error = %e, "step transition rejected"))?;
            pending.push(done);
        }
        Ok(pending)
    }

    fn mark_cancelled(&self) -> StepOutcome {
        self.live.lock().stats.cancelled = true;
        tracing::info!("race cancelled");
        StepOutcome::Cancelled
    }

    /// Step until the race settles or `cancel` fires.
    #[tracing::instrument(skip_all)]
    pub async fn run_steps(&self, cancel: &CancelToken) -> RaceResult<RaceStats> {
        loop {
            match self.step(cancel).await? {
                StepOutcome::Primed | StepOutcome::Advanced(_) => {}
                StepOutcome::Settled | StepOutcome::Cancelled => return Ok(self.stats()),
            }
        }
    }

    /// Immutable view of the race at `now`.
    pub fn frame_at(&self, index: FrameIndex, now: Duration) -> Frame {
        let live = self.live.lock();
        let bars: Vec<_> = live
            .order
            .iter()
            .map(|&i| self.bars[i].view(now, &self.layout))
            .collect();
        let total = bars.iter().map(|b| b.value).sum();
        Frame {
            index,
            time: now,
            canvas: self.config.canvas,
            plot: self.layout.plot,
            bars,
            current_key: live.cursor.current().cloned(),
            total,
            timeline: TimelineView {
                keys: Arc::clone(live.cursor.timeline().keys()),
                current: usize::try_from(live.cursor.index()).ok(),
                pointer: live.pointer.sample(now),
            },
        }
    }

    /// Immutable view of the race now.
    pub fn frame(&self) -> Frame {
        let index = FrameIndex(self.stats().frames);
        self.frame_at(index, self.clock.now())
    }

    /// Run the rank pass that follows a redraw. Returns the number of swaps started.
    pub fn reorder(&self, now: Duration) -> RaceResult<u64> {
        let mut live = self.live.lock();
        let swaps = self.config.rank_strategy.after_redraw(
            &self.bars,
            &mut live.order,
            now,
            self.config.swap(),
        )?;
        live.stats.swaps += swaps;
        Ok(swaps)
    }

    /// `true` when the race is settled and nothing is animating at `now`.
    pub fn is_at_rest(&self, now: Duration) -> bool {
        let live = self.live.lock();
        live.phase == RacePhase::Settled
            && !live.pointer.is_moving(now)
            && self.bars.iter().all(|b| {
                let s = b.sample(now);
                !s.transitioning && !s.swapping
            })
    }

    /// Draw one frame per display tick until cancelled (or until the configured hold after
    /// settling elapses), then finish the renderer.
    #[tracing::instrument(skip_all)]
    pub async fn redraw_loop<R: Renderer>(
        &self,
        renderer: &mut R,
        cancel: &CancelToken,
    ) -> RaceResult<()> {
        let fps = self.config.fps;
        let hold = self.config.hold_after_settle();
        let start = self.clock.now();
        let mut rest_since: Option<Duration> = None;
        let mut tick: u64 = 0;

        loop {
            let now = self.clock.now();
            let frame = self.frame_at(FrameIndex(tick), now);
            renderer.draw(&frame)?;
            self.live.lock().stats.frames += 1;
            self.reorder(now)?;
            tick += 1;

            if let Some(hold) = hold {
                if self.is_at_rest(now) {
                    let since = *rest_since.get_or_insert(now);
                    if now.saturating_sub(since) >= hold {
                        tracing::debug!(frames = tick, "hold elapsed; redraw stopped");
                        break;
                    }
                } else {
                    rest_since = None;
                }
            }

            tokio::select! {
                _ = self.clock.sleep_until(start + fps.frame_offset(tick)) => {}
                _ = cancel.cancelled() => {
                    self.live.lock().stats.cancelled = true;
                    break;
                }
            }
        }
        renderer.finish()
    }

    /// Seed if needed, then run the redraw loop and the step loop together.
    ///
    /// Returns when both loops have finished: the step loop at the final key (or on
    /// cancellation), the redraw loop on cancellation or after the post-settle hold.
    #[tracing::instrument(skip_all)]
    pub async fn init<R: Renderer>(
        &mut self,
        renderer: &mut R,
        cancel: &CancelToken,
    ) -> RaceResult<RaceStats> {
        if self.phase() == RacePhase::Uninitialized {
            self.seed()?;
        }
        let this = &*self;
        futures::try_join!(this.run_steps(cancel), this.redraw_loop(renderer, cancel))?;
        let stats = this.stats();
        tracing::info!(
            steps = stats.steps,
            frames = stats.frames,
            swaps = stats.swaps,
            cancelled = stats.cancelled,
            "race finished"
        );
        Ok(stats)
    }
}

/// Invert per-bar slots into a slot -> bar index table.
fn order_from_slots(slots: impl Iterator<Item = usize>) -> Vec<usize> {
    let mut pairs: Vec<(usize, usize)> = slots.enumerate().map(|(i, s)| (s, i)).collect();
    pairs.sort_unstable();
    pairs.into_iter().map(|(_, i)| i).collect()
}

#[cfg(test)]
#[path = "../../tests/unit/engine/race.rs"]
mod tests;
