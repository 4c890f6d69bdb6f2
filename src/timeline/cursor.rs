use std::sync::Arc;

use crate::scene::series::{Series, TimelineKey};
use crate::timeline::snapshot::Snapshot;

/// The ordered key sequence shared by every series.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Timeline {
    keys: Arc<[TimelineKey]>,
}

impl Timeline {
    /// Timeline over `keys`, in order.
    pub fn new(keys: impl Into<Arc<[TimelineKey]>>) -> Self {
        Self { keys: keys.into() }
    }

    /// Keys of the first series (the reference key sequence).
    pub fn from_series(series: &[Series]) -> Self {
        let keys: Vec<TimelineKey> = series
            .first()
            .map(|s| s.keys().cloned().collect())
            .unwrap_or_default();
        Self::new(keys)
    }

    /// Shared handle to the keys.
    pub fn keys(&self) -> &Arc<[TimelineKey]> {
        &self.keys
    }

    /// Key at `index`.
    pub fn get(&self, index: usize) -> Option<&TimelineKey> {
        self.keys.get(index)
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// `true` when the timeline has no keys.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Position of the race on its timeline.
///
/// The index starts at `-1` ("before the first key"); `current` is `None` there. `next` is
/// `None` at the final key, which is the terminal condition of the step loop.
#[derive(Clone, Debug)]
pub struct TimelineCursor {
    timeline: Timeline,
    series: Arc<[Series]>,
    index: isize,
}

impl TimelineCursor {
    /// Cursor at index -1.
    pub fn new(timeline: Timeline, series: Arc<[Series]>) -> Self {
        Self {
            timeline,
            series,
            index: -1,
        }
    }

    /// The underlying timeline.
    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// The series set, in input order.
    pub fn series(&self) -> &[Series] {
        &self.series
    }

    /// Raw cursor index (`-1` before the first key).
    pub fn index(&self) -> isize {
        self.index
    }

    /// `true` before the first key.
    pub fn is_initial(&self) -> bool {
        self.index < 0
    }

    /// Key at the cursor, `None` before the first key.
    pub fn current(&self) -> Option<&TimelineKey> {
        usize::try_from(self.index)
            .ok()
            .and_then(|i| self.timeline.get(i))
    }

    /// Key after the cursor, `None` at the final key.
    pub fn next(&self) -> Option<&TimelineKey> {
        usize::try_from(self.index + 1)
            .ok()
            .and_then(|i| self.timeline.get(i))
    }

    /// Final key of the timeline.
    pub fn last(&self) -> Option<&TimelineKey> {
        self.timeline.keys.last()
    }

    /// Snapshot at `key`; `None` yields the all-zero snapshot.
    pub fn snapshot_at(&self, key: Option<&TimelineKey>) -> Snapshot {
        Snapshot::from_series(&self.series, key)
    }

    /// Snapshot at the cursor (all zeros before the first key).
    pub fn current_snapshot(&self) -> Snapshot {
        self.snapshot_at(self.current())
    }

    /// Snapshot at the next key, if any.
    pub fn next_snapshot(&self) -> Option<Snapshot> {
        self.next().map(|k| self.snapshot_at(Some(k)))
    }

    /// `(label, value)` with the maximum value in `snapshot`; ties go to the first series.
    pub fn largest_in<'a>(&self, snapshot: &'a Snapshot) -> Option<(&'a str, f64)> {
        snapshot.largest()
    }

    /// Move to the next key. Callers must check [`Self::next`] first.
    pub fn advance(&mut self) {
        debug_assert!(self.next().is_some(), "advanced past the final timeline key");
        self.index += 1;
    }

    /// Fraction of the timeline covered at the cursor; see [`Self::progress_at`].
    pub fn progress(&self) -> f64 {
        self.progress_at(self.index)
    }

    /// Fraction of the timeline covered at `index`, `index / (len - 1)`.
    ///
    /// 0 for negative indices and single-key timelines; not clamped above 1.
    pub fn progress_at(&self, index: isize) -> f64 {
        let Ok(index) = usize::try_from(index) else {
            return 0.0;
        };
        let len = self.timeline.len();
        if len < 2 {
            return 0.0;
        }
        index as f64 / (len - 1) as f64
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/cursor.rs"]
mod tests;
