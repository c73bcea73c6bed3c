//! # Scanner
//!
//! Runs one scan against a [`UsageSource`]: query both usage sources over the
//! history window, reconcile, decide whether usage data is available at all,
//! then filter the installed packages.

use super::filter::UnusedAppFilter;
use super::reconcile::UsageReconciler;
use super::record::{days_to_millis, AppRecord, ScanMode};
use crate::device::UsageSource;
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Default number of days without use before an app counts as unused.
pub const DEFAULT_THRESHOLD_DAYS: u64 = 30;

/// Default look-back window for usage history.
pub const DEFAULT_HISTORY_DAYS: u64 = 365;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanSettings {
    pub threshold_days: u64,
    pub history_days: u64,
    pub mode: ScanMode,
    pub self_package: Option<String>,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            threshold_days: DEFAULT_THRESHOLD_DAYS,
            history_days: DEFAULT_HISTORY_DAYS,
            mode: ScanMode::default(),
            self_package: None,
        }
    }
}

impl ScanSettings {
    fn filter(&self) -> UnusedAppFilter {
        UnusedAppFilter {
            threshold_days: self.threshold_days,
            mode: self.mode,
            self_package: self.self_package.clone(),
        }
    }
}

/// Result of a scan, ready for presentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    Completed {
        records: Vec<AppRecord>,
        /// False when both usage sources were empty and the scan went ahead
        /// anyway (aggressive mode).
        usage_available: bool,
    },
    /// No usage data and conservative mode: report the missing data instead
    /// of claiming every app is unused.
    UsageUnavailable,
    /// The installed packages could not be enumerated.
    DeviceUnavailable { reason: String },
}

pub fn scan(source: &dyn UsageSource, settings: &ScanSettings, now_ms: u64) -> ScanOutcome {
    let since = now_ms.saturating_sub(days_to_millis(settings.history_days));

    // An unreachable device fails here, before the usage sources can be
    // mistaken for merely empty.
    let installed = match source.installed_packages() {
        Ok(installed) => installed,
        Err(e) => {
            warn!("Failed to enumerate installed packages: {e:#}");
            return ScanOutcome::DeviceUnavailable {
                reason: format!("{e:#}"),
            };
        }
    };

    let events = source.events(since, now_ms).unwrap_or_else(|e| {
        warn!("Usage event query failed, treating as no signal: {e:#}");
        Vec::new()
    });
    let aggregated = source
        .aggregated_last_used(since, now_ms)
        .unwrap_or_else(|e| {
            warn!("Aggregated usage query failed, treating as no signal: {e:#}");
            HashMap::new()
        });
    debug!(
        events = events.len(),
        aggregated = aggregated.len(),
        "Collected usage data"
    );

    let usage = UsageReconciler::from_events(&events, aggregated);
    let usage_available = !usage.is_unavailable();
    if !usage_available {
        warn!("No usage data from either source");
        if settings.mode == ScanMode::Conservative {
            return ScanOutcome::UsageUnavailable;
        }
    }

    let records = settings.filter().apply(&installed, &usage, now_ms);
    info!(
        installed = installed.len(),
        observed = usage.observed_packages(),
        unused = records.len(),
        mode = %settings.mode,
        "Scan finished"
    );

    ScanOutcome::Completed {
        records,
        usage_available,
    }
}
