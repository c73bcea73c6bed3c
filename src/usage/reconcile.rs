//! # Usage Reconciliation
//!
//! Android keeps two overlapping records of app usage: the raw event stream
//! (foreground/background transitions) and pre-aggregated per-package stats.
//! Either can be missing entries the other has, so the authoritative
//! "last used" time for a package is the maximum of both.

use std::collections::HashMap;

/// Kind of a usage event as reported by the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    MoveToForeground,
    MoveToBackground,
    Other(String),
}

impl EventKind {
    /// Map a `dumpsys usagestats` event type name to a kind.
    ///
    /// `ACTIVITY_RESUMED` and `ACTIVITY_PAUSED` are the names newer platform
    /// releases use for the same event codes.
    pub fn from_type_name(name: &str) -> Self {
        match name {
            "MOVE_TO_FOREGROUND" | "ACTIVITY_RESUMED" => EventKind::MoveToForeground,
            "MOVE_TO_BACKGROUND" | "ACTIVITY_PAUSED" => EventKind::MoveToBackground,
            other => EventKind::Other(other.to_string()),
        }
    }
}

/// A single entry from the usage event stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageEvent {
    pub package_id: String,
    pub kind: EventKind,
    pub timestamp_ms: u64,
}

impl UsageEvent {
    pub fn new(package_id: impl Into<String>, kind: EventKind, timestamp_ms: u64) -> Self {
        Self {
            package_id: package_id.into(),
            kind,
            timestamp_ms,
        }
    }
}

/// Reduce an event stream to the latest foreground time per package.
///
/// Only [`EventKind::MoveToForeground`] events count.
pub fn last_foreground_by_package(events: &[UsageEvent]) -> HashMap<String, u64> {
    let mut latest: HashMap<String, u64> = HashMap::new();
    for event in events {
        if event.kind != EventKind::MoveToForeground || event.package_id.is_empty() {
            continue;
        }
        let slot = latest.entry(event.package_id.clone()).or_insert(0);
        if event.timestamp_ms > *slot {
            *slot = event.timestamp_ms;
        }
    }
    latest
}

/// Best-available last-used time for `package_id`; missing keys count as `0`.
pub fn reconcile(
    event_timestamps: &HashMap<String, u64>,
    aggregated_timestamps: &HashMap<String, u64>,
    package_id: &str,
) -> u64 {
    let from_events = event_timestamps.get(package_id).copied().unwrap_or(0);
    let from_aggregated = aggregated_timestamps.get(package_id).copied().unwrap_or(0);
    from_events.max(from_aggregated)
}

/// Both usage sources for one scan.
#[derive(Debug, Clone, Default)]
pub struct UsageReconciler {
    from_events: HashMap<String, u64>,
    aggregated: HashMap<String, u64>,
}

impl UsageReconciler {
    pub fn new(from_events: HashMap<String, u64>, aggregated: HashMap<String, u64>) -> Self {
        Self {
            from_events,
            aggregated,
        }
    }

    /// Build from a raw event stream plus aggregated stats.
    pub fn from_events(events: &[UsageEvent], aggregated: HashMap<String, u64>) -> Self {
        Self::new(last_foreground_by_package(events), aggregated)
    }

    pub fn reconcile(&self, package_id: &str) -> u64 {
        reconcile(&self.from_events, &self.aggregated, package_id)
    }

    /// True when neither source carries a single non-zero timestamp.
    ///
    /// This almost always means the usage service is not reachable (missing
    /// authorisation, OEM restriction) rather than that every app is unused.
    pub fn is_unavailable(&self) -> bool {
        self.from_events.values().all(|&ts| ts == 0) && self.aggregated.values().all(|&ts| ts == 0)
    }

    /// Number of packages with a non-zero timestamp in either source.
    pub fn observed_packages(&self) -> usize {
        self.from_events
            .iter()
            .chain(self.aggregated.iter())
            .filter(|(_, &ts)| ts > 0)
            .map(|(pkg, _)| pkg.as_str())
            .collect::<std::collections::HashSet<_>>()
            .len()
    }
}
