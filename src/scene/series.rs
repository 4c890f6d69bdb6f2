use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;

use crate::foundation::error::{RaceError, RaceResult};

/// Opaque, ordered timeline token such as `"2021"` or `"2021-03-01"`.
///
/// JSON strings and numbers are both accepted; numbers are kept in their textual form so that
/// `2021` and `"2021"` name the same key.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
#[serde(transparent)]
pub struct TimelineKey(pub String);

impl TimelineKey {
    /// Borrow the key text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TimelineKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TimelineKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for TimelineKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<i64> for TimelineKey {
    fn from(v: i64) -> Self {
        Self(v.to_string())
    }
}

impl From<i32> for TimelineKey {
    fn from(v: i32) -> Self {
        Self(v.to_string())
    }
}

impl<'de> serde::Deserialize<'de> for TimelineKey {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(serde::Deserialize)]
        #[serde(untagged)]
        enum RawKey {
            Text(String),
            Int(i64),
            Float(f64),
        }

        Ok(match RawKey::deserialize(deserializer)? {
            RawKey::Text(s) => Self(s),
            RawKey::Int(v) => Self(v.to_string()),
            RawKey::Float(v) => Self(v.to_string()),
        })
    }
}

/// One `(key, value)` sample of a series. A missing or `null` value counts as 0.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Sample {
    /// Timeline key of the sample.
    #[serde(alias = "date")]
    pub key: TimelineKey,
    /// Sample value.
    #[serde(default)]
    pub value: Option<f64>,
}

/// One entity's full value history across the timeline.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Series {
    /// Unique label; the entity's identity.
    pub label: String,
    /// Samples in timeline order.
    #[serde(rename = "series", alias = "datasets")]
    pub samples: Vec<Sample>,
}

impl Series {
    /// Build a series from `(key, value)` pairs.
    pub fn new<K: Into<TimelineKey>>(
        label: impl Into<String>,
        samples: impl IntoIterator<Item = (K, f64)>,
    ) -> Self {
        Self {
            label: label.into(),
            samples: samples
                .into_iter()
                .map(|(key, value)| Sample {
                    key: key.into(),
                    value: Some(value),
                })
                .collect(),
        }
    }

    /// Value of the sample at timeline position `index`, or 0 when it is absent or `null`.
    pub fn value_at_index(&self, index: usize) -> f64 {
        self.samples.get(index).and_then(|s| s.value).unwrap_or(0.0)
    }

    /// Sample keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &TimelineKey> {
        self.samples.iter().map(|s| &s.key)
    }
}

/// The race input: an ordered collection of series sharing one key sequence.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct RaceData {
    series: Vec<Series>,
}

impl RaceData {
    /// Wrap already-built series.
    pub fn new(series: Vec<Series>) -> Self {
        Self { series }
    }

    /// Parse race data from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> RaceResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| RaceError::serde(format!("parse race data JSON: {e}")))
    }

    /// Parse race data from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> RaceResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            RaceError::validation(format!("open race data JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Borrow the series in input order.
    pub fn series(&self) -> &[Series] {
        &self.series
    }

    /// Consume into shared, immutable series storage.
    pub fn into_series(self) -> Arc<[Series]> {
        self.series.into()
    }

    /// Check the structural invariants the engine relies on and return the timeline keys.
    ///
    /// Every series must carry the same key sequence, in the same order, as the first one.
    /// Labels must be unique and values finite.
    pub fn validate(&self) -> RaceResult<Vec<TimelineKey>> {
        let Some(first) = self.series.first() else {
            return Err(RaceError::empty_dataset("no series supplied"));
        };
        if first.samples.is_empty() {
            return Err(RaceError::empty_dataset(format!(
                "series '{}' has no samples, timeline is empty",
                first.label
            )));
        }

        let keys: Vec<TimelineKey> = first.keys().cloned().collect();
        let mut seen_keys = HashSet::with_capacity(keys.len());
        for key in &keys {
            if !seen_keys.insert(key) {
                return Err(RaceError::data_shape(format!(
                    "timeline key '{key}' appears more than once in series '{}'",
                    first.label
                )));
            }
        }

        let mut labels = HashSet::with_capacity(self.series.len());
        for series in &self.series {
            if !labels.insert(series.label.as_str()) {
                return Err(RaceError::validation(format!(
                    "duplicate series label '{}'",
                    series.label
                )));
            }
            if series.samples.len() != keys.len() {
                return Err(RaceError::data_shape(format!(
                    "series '{}' has {} samples, expected {} (same as '{}')",
                    series.label,
                    series.samples.len(),
                    keys.len(),
                    first.label
                )));
            }
            for (idx, (sample, key)) in series.samples.iter().zip(&keys).enumerate() {
                if &sample.key != key {
                    return Err(RaceError::data_shape(format!(
                        "series '{}' has key '{}' at index {idx}, expected '{key}'",
                        series.label, sample.key
                    )));
                }
                if let Some(v) = sample.value
                    && !v.is_finite()
                {
                    return Err(RaceError::validation(format!(
                        "series '{}' has a non-finite value at key '{key}'",
                        series.label
                    )));
                }
            }
        }

        Ok(keys)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/series.rs"]
mod tests;
