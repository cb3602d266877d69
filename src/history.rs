//! Rotation history recorded by the interaction layer.
//!
//! Samples are appended per element and bounded by a count window, with
//! optional age-based pruning. Discovery predicates only read it.

use std::collections::{HashMap, VecDeque};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::config::RotationHistoryConfig;

/// One recorded angle.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RotationSample {
    pub angle_deg: f64,
    pub recorded_at: DateTime<Utc>,
}

/// Per-element, append-only (within its window) angle samples.
#[derive(Debug, Clone, Default)]
pub struct RotationHistory {
    config: RotationHistoryConfig,
    samples: HashMap<String, VecDeque<RotationSample>>,
}

impl RotationHistory {
    /// Empty history bounded by `config`.
    #[must_use]
    pub fn new(config: RotationHistoryConfig) -> Self {
        Self {
            config,
            samples: HashMap::new(),
        }
    }

    /// Append a sample, evicting the oldest one when the window is full.
    ///
    /// Non-finite angles are dropped; returns whether the sample was kept.
    pub fn record(&mut self, element_id: &str, angle_deg: f64, at: DateTime<Utc>) -> bool {
        if !angle_deg.is_finite() {
            tracing::debug!(element_id, "dropping non-finite rotation sample");
            return false;
        }
        let cap = self.config.max_samples_per_element.max(1);
        let window = self.samples.entry(element_id.to_string()).or_default();
        while window.len() >= cap {
            window.pop_front();
        }
        window.push_back(RotationSample {
            angle_deg,
            recorded_at: at,
        });
        true
    }

    /// Samples for an element, oldest first.
    pub fn samples(&self, element_id: &str) -> impl Iterator<Item = &RotationSample> {
        self.samples.get(element_id).into_iter().flatten()
    }

    /// Number of retained samples for an element.
    #[must_use]
    pub fn sample_count(&self, element_id: &str) -> usize {
        self.samples.get(element_id).map_or(0, VecDeque::len)
    }

    /// `max - min` of the retained angles, `None` without samples.
    #[must_use]
    pub fn spread(&self, element_id: &str) -> Option<f64> {
        let mut iter = self.samples(element_id).map(|s| s.angle_deg);
        let first = iter.next()?;
        let (min, max) = iter.fold((first, first), |(lo, hi), a| (lo.min(a), hi.max(a)));
        Some(max - min)
    }

    /// Drop samples older than the configured age. No-op without an age bound.
    ///
    /// Returns the number of samples removed.
    pub fn prune_older_than(&mut self, now: DateTime<Utc>) -> usize {
        let Some(max_age) = self.config.max_sample_age_secs else {
            return 0;
        };
        let Some(cutoff) = i64::try_from(max_age)
            .ok()
            .and_then(Duration::try_seconds)
            .and_then(|age| now.checked_sub_signed(age))
        else {
            return 0;
        };
        let mut removed = 0;
        for window in self.samples.values_mut() {
            while window.front().is_some_and(|s| s.recorded_at < cutoff) {
                window.pop_front();
                removed += 1;
            }
        }
        self.samples.retain(|_, w| !w.is_empty());
        removed
    }

    /// Element ids with at least one sample.
    pub fn element_ids(&self) -> impl Iterator<Item = &str> {
        self.samples.keys().map(String::as_str)
    }

    /// True when no element has samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
