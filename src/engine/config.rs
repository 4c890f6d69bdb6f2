use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use crate::animation::ease::Ease;
use crate::engine::rank::RankStrategy;
use crate::foundation::core::{Canvas, Fps, Padding, Rect};
use crate::foundation::error::{RaceError, RaceResult};

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
/// Construction-time configuration of a race.
///
/// Every field has a default, so `{}` is a valid configuration document.
pub struct RaceConfig {
    /// Output canvas.
    pub canvas: Canvas,
    /// Insets around the plotting rectangle.
    pub padding: Padding,
    /// Redraw rate.
    pub fps: Fps,
    /// Step transition duration in milliseconds.
    pub transition_ms: u64,
    /// Rank swap duration in milliseconds.
    pub swap_ms: u64,
    /// Pause after each step settles, in milliseconds.
    pub dwell_ms: u64,
    /// Easing curve for every transition.
    pub ease: Ease,
    /// How bars are reordered by rank.
    pub rank_strategy: RankStrategy,
    /// Per-label overrides of `transition_ms`.
    pub entity_transition_ms: BTreeMap<String, u64>,
    /// Stop redrawing this long after the race settles and motion stops. `None` redraws until
    /// cancelled.
    pub hold_after_settle_ms: Option<u64>,
}

impl Default for RaceConfig {
    fn default() -> Self {
        Self {
            canvas: Canvas::default(),
            padding: Padding::default(),
            fps: Fps::default(),
            transition_ms: 750,
            swap_ms: 300,
            dwell_ms: 100,
            ease: Ease::default(),
            rank_strategy: RankStrategy::default(),
            entity_transition_ms: BTreeMap::new(),
            hold_after_settle_ms: None,
        }
    }
}

impl RaceConfig {
    /// Parse a JSON configuration document.
    pub fn from_reader<R: std::io::Read>(r: R) -> RaceResult<Self> {
        serde_json::from_reader(r).map_err(|e| RaceError::serde(format!("parse race config JSON: {e}")))
    }

    /// Parse a JSON configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> RaceResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            RaceError::validation(format!("open race config JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Reject configurations that cannot produce a drawable plot.
    pub fn validate(&self) -> RaceResult<()> {
        if self.canvas.width == 0 || self.canvas.height == 0 {
            return Err(RaceError::validation("canvas width/height must be > 0"));
        }
        self.fps.validate()?;
        let p = self.padding;
        if [p.top, p.right, p.bottom, p.left]
            .iter()
            .any(|v| !v.is_finite() || *v < 0.0)
        {
            return Err(RaceError::validation("padding must be finite and >= 0"));
        }
        let plot = self.plot_rect();
        if plot.width() <= 0.0 || plot.height() <= 0.0 {
            return Err(RaceError::validation(format!(
                "padding leaves an empty plot area on a {}x{} canvas",
                self.canvas.width, self.canvas.height
            )));
        }
        Ok(())
    }

    /// Plotting rectangle (canvas minus padding).
    pub fn plot_rect(&self) -> Rect {
        self.padding.plot_rect(self.canvas)
    }

    /// Step transition duration for `label`, honoring per-entity overrides.
    pub fn transition_for(&self, label: &str) -> Duration {
        let ms = self
            .entity_transition_ms
            .get(label)
            .copied()
            .unwrap_or(self.transition_ms);
        Duration::from_millis(ms)
    }

    /// Default step transition duration.
    pub fn transition(&self) -> Duration {
        Duration::from_millis(self.transition_ms)
    }

    /// Rank swap duration.
    pub fn swap(&self) -> Duration {
        Duration::from_millis(self.swap_ms)
    }

    /// Post-step dwell.
    pub fn dwell(&self) -> Duration {
        Duration::from_millis(self.dwell_ms)
    }

    /// Post-settle hold, when configured.
    pub fn hold_after_settle(&self) -> Option<Duration> {
        self.hold_after_settle_ms.map(Duration::from_millis)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/engine/config.rs"]
mod tests;
