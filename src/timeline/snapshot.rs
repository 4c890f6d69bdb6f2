use indexmap::IndexMap;

use crate::scene::series::{Series, TimelineKey};

/// Every entity's value at one timeline key, in series order.
///
/// Snapshots are pure derivations of the series data. A key without a sample (or no key at
/// all) yields 0 for that entity rather than an error.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Snapshot {
    values: IndexMap<String, f64>,
}

impl Snapshot {
    /// Derive the snapshot at `key`; `None`, or a key the series do not carry, maps every
    /// label to 0.
    ///
    /// The key is resolved once against the first series, which every validated series
    /// shares its key order with.
    pub fn from_series(series: &[Series], key: Option<&TimelineKey>) -> Self {
        let index = key.and_then(|k| series.first()?.keys().position(|sk| sk == k));
        Self::at_index(series, index)
    }

    /// Derive the snapshot at timeline position `index`; `None` maps every label to 0.
    pub fn at_index(series: &[Series], index: Option<usize>) -> Self {
        let values = series
            .iter()
            .map(|s| {
                let value = index.map_or(0.0, |i| s.value_at_index(i));
                (s.label.clone(), value)
            })
            .collect();
        Self { values }
    }

    /// Value for `label`, 0 when the label is unknown.
    pub fn get(&self, label: &str) -> f64 {
        self.values.get(label).copied().unwrap_or(0.0)
    }

    /// `(label, value)` pairs in series order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Number of entities.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// `true` when there are no entities.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Sum of all values.
    pub fn total(&self) -> f64 {
        self.values.values().sum()
    }

    /// Entry with the maximum value. Ties resolve to the first entry in series order.
    pub fn largest(&self) -> Option<(&str, f64)> {
        let mut best: Option<(&str, f64)> = None;
        for (label, value) in self.iter() {
            match best {
                Some((_, v)) if v >= value => {}
                _ => best = Some((label, value)),
            }
        }
        best
    }

    /// Divisor used to normalize extents: `max(largest, 1)`.
    pub fn normalization_denominator(&self) -> f64 {
        self.largest().map_or(0.0, |(_, v)| v).max(1.0)
    }

    /// Rank entries by value, descending. Ties keep series order.
    pub fn ranked(&self) -> RankedSnapshot {
        let mut entries = self.values.clone();
        entries.sort_by(|_, a, _, b| b.total_cmp(a));
        RankedSnapshot { entries }
    }
}

/// A [`Snapshot`] sorted by value descending; the index of an entry is its target slot.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RankedSnapshot {
    entries: IndexMap<String, f64>,
}

impl RankedSnapshot {
    /// Slot (0 = top) of `label`.
    pub fn slot_of(&self, label: &str) -> Option<usize> {
        self.entries.get_index_of(label)
    }

    /// Labels from top to bottom.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// `(label, value)` pairs from top to bottom.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(l, v)| (l.as_str(), *v))
    }

    /// Number of ranked entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` when nothing is ranked.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/snapshot.rs"]
mod tests;
