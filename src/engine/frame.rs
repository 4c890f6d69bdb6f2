use std::sync::Arc;
use std::time::Duration;

use crate::foundation::core::{Canvas, FrameIndex, Rect, Rgba8};
use crate::scene::series::TimelineKey;

/// Vertical layout shared by every bar of a race.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BarLayout {
    /// Plotting rectangle.
    pub plot: Rect,
    /// Height of one slot.
    pub bar_height: f64,
}

impl BarLayout {
    /// Split `plot` into `count` equal slots.
    pub fn new(plot: Rect, count: usize) -> Self {
        Self {
            plot,
            bar_height: plot.height() / count.max(1) as f64,
        }
    }
}

/// One bar as handed to a renderer.
#[derive(Clone, Debug, PartialEq)]
pub struct BarView {
    /// Entity label.
    pub label: String,
    /// Fill color.
    pub color: Rgba8,
    /// Bar body; `width()` is the displayed extent.
    pub rect: Rect,
    /// Displayed value.
    pub value: f64,
    /// Logical slot.
    pub slot: usize,
}

/// Timeline progress indicator state.
#[derive(Clone, Debug, PartialEq)]
pub struct TimelineView {
    /// Every key of the timeline.
    pub keys: Arc<[TimelineKey]>,
    /// Cursor index, `None` before the first key.
    pub current: Option<usize>,
    /// Animated pointer position as a fraction of the axis, in `[0, 1]`.
    pub pointer: f64,
}

/// Immutable view of the race at one redraw tick.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    /// Redraw tick number.
    pub index: FrameIndex,
    /// Clock time the frame was sampled at.
    pub time: Duration,
    /// Output canvas.
    pub canvas: Canvas,
    /// Plotting rectangle.
    pub plot: Rect,
    /// Bars in live order (top to bottom).
    pub bars: Vec<BarView>,
    /// Key at the cursor.
    pub current_key: Option<TimelineKey>,
    /// Sum of displayed values.
    pub total: f64,
    /// Progress indicator.
    pub timeline: TimelineView,
}

impl Frame {
    /// Bar for `label`.
    pub fn bar(&self, label: &str) -> Option<&BarView> {
        self.bars.iter().find(|b| b.label == label)
    }

    /// Labels in live order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.bars.iter().map(|b| b.label.as_str())
    }
}
