//! Transition timing metrics, global and per view

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use crate::view::ViewId;

/// Accumulated statistics for a series of transitions
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TransitionStats {
    /// Number of committed transitions
    pub count: u64,
    /// Running mean, in milliseconds
    pub average_ms: f64,
    /// Fastest transition, in milliseconds
    pub min_ms: f64,
    /// Slowest transition, in milliseconds
    pub max_ms: f64,
}

impl TransitionStats {
    pub fn record(&mut self, duration: Duration) {
        let ms = duration.as_secs_f64() * 1000.0;
        self.count += 1;
        if self.count == 1 {
            self.average_ms = ms;
            self.min_ms = ms;
            self.max_ms = ms;
            return;
        }
        self.average_ms += (ms - self.average_ms) / self.count as f64;
        self.min_ms = self.min_ms.min(ms);
        self.max_ms = self.max_ms.max(ms);
    }
}

/// Append-only transition metrics owned by the controller
#[derive(Debug, Clone, Default)]
pub struct TransitionMetrics {
    global: TransitionStats,
    per_view: HashMap<ViewId, TransitionStats>,
    failed: u64,
}

impl TransitionMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a committed transition into `view`
    pub fn record(&mut self, view: &ViewId, duration: Duration) {
        self.global.record(duration);
        self.per_view.entry(view.clone()).or_default().record(duration);
    }

    pub fn record_failure(&mut self) {
        self.failed += 1;
    }

    pub fn global(&self) -> &TransitionStats {
        &self.global
    }

    pub fn for_view(&self, view: &str) -> Option<&TransitionStats> {
        self.per_view.get(view)
    }

    pub fn failed(&self) -> u64 {
        self.failed
    }

    pub fn snapshot(&self, cached_views: Vec<ViewId>) -> MetricsSnapshot {
        MetricsSnapshot {
            global: self.global,
            per_view: self
                .per_view
                .iter()
                .map(|(id, stats)| (id.clone(), *stats))
                .collect(),
            failed_transitions: self.failed,
            cached_views,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Point-in-time copy of the metrics, ready for serialization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub global: TransitionStats,
    pub per_view: BTreeMap<ViewId, TransitionStats>,
    pub failed_transitions: u64,
    /// Ids held by the view cache, oldest first
    pub cached_views: Vec<ViewId>,
    /// Timestamp when snapshot was taken
    pub timestamp: String,
}
