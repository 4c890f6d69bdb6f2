use std::time::Duration;

use crate::engine::bar::BarController;
use crate::foundation::error::RaceResult;
use crate::timeline::snapshot::Snapshot;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
/// How bars are moved to their rank slots.
pub enum RankStrategy {
    /// After every redraw, swap adjacent bars whose displayed values are out of order.
    ///
    /// Reordering converges over several frames and follows the values as they animate.
    #[default]
    AdjacentSwap,
    /// Rank the target snapshot when a step starts and move every bar straight to its final
    /// slot together with the value transition.
    Precomputed,
}

impl RankStrategy {
    /// Target slot per bar (indexed like `bars`) for a step toward `target`.
    ///
    /// `None` when slots are left to the per-redraw pass.
    pub fn step_slots(self, target: &Snapshot, bars: &[BarController]) -> Option<Vec<usize>> {
        match self {
            Self::AdjacentSwap => None,
            Self::Precomputed => {
                let ranked = target.ranked();
                Some(
                    bars.iter()
                        .enumerate()
                        .map(|(i, bar)| ranked.slot_of(bar.label()).unwrap_or(i))
                        .collect(),
                )
            }
        }
    }

    /// Corrective pass run after a redraw. Returns the number of swaps started.
    pub fn after_redraw(
        self,
        bars: &[BarController],
        order: &mut [usize],
        now: Duration,
        swap: Duration,
    ) -> RaceResult<u64> {
        match self {
            Self::AdjacentSwap => adjacent_swap_pass(bars, order, now, swap),
            Self::Precomputed => Ok(0),
        }
    }
}

/// One top-to-bottom pass over the live order.
///
/// `order[slot]` is the index into `bars` of the bar shown in that slot. When a bar's displayed
/// value exceeds the one directly above and neither is mid-swap, the pair exchanges slots with a
/// swap transition and `order` is updated to match.
pub fn adjacent_swap_pass(
    bars: &[BarController],
    order: &mut [usize],
    now: Duration,
    swap: Duration,
) -> RaceResult<u64> {
    let mut swaps = 0;
    for pos in 1..order.len() {
        let upper = &bars[order[pos - 1]];
        let lower = &bars[order[pos]];
        let (u, l) = (upper.sample(now), lower.sample(now));
        if u.swapping || l.swapping || l.value <= u.value {
            continue;
        }
        upper.begin_swap(now, pos, swap)?;
        lower.begin_swap(now, pos - 1, swap)?;
        order.swap(pos - 1, pos);
        swaps += 1;
        tracing::trace!(up = lower.label(), down = upper.label(), slot = pos - 1, "rank swap");
    }
    Ok(swaps)
}

#[cfg(test)]
#[path = "../../tests/unit/engine/rank.rs"]
mod tests;
