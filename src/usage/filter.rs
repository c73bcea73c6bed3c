//! # Unused App Filter
//!
//! Classifies installed packages as unused based on their reconciled
//! timestamps and returns them oldest first.

use super::reconcile::UsageReconciler;
use super::record::{days_to_millis, AppRecord, InstalledPackage, ScanMode};
use std::collections::HashSet;

/// Selection criteria for one scan.
#[derive(Debug, Clone)]
pub struct UnusedAppFilter {
    /// Packages last used more than this many days ago count as unused.
    pub threshold_days: u64,
    pub mode: ScanMode,
    /// The scanning app's own package, never reported.
    pub self_package: Option<String>,
}

impl UnusedAppFilter {
    pub fn new(threshold_days: u64, mode: ScanMode) -> Self {
        Self {
            threshold_days,
            mode,
            self_package: None,
        }
    }

    pub fn with_self_package(mut self, package_id: impl Into<String>) -> Self {
        self.self_package = Some(package_id.into());
        self
    }

    /// Boundary below which a timestamp is old enough to be unused.
    pub fn cutoff(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(days_to_millis(self.threshold_days))
    }

    /// Whether a reconciled timestamp qualifies as unused.
    pub fn is_unused(&self, last_used_ms: u64, cutoff_ms: u64) -> bool {
        let stale = last_used_ms > 0 && last_used_ms < cutoff_ms;
        match self.mode {
            ScanMode::Conservative => stale,
            ScanMode::Aggressive => stale || last_used_ms == 0,
        }
    }

    fn is_candidate(&self, package: &InstalledPackage) -> bool {
        if package.is_system || !package.is_enabled {
            return false;
        }
        self.self_package.as_deref() != Some(package.package_id.as_str())
    }

    /// Return the unused subset of `installed`, sorted ascending by last use.
    ///
    /// Never-used packages carry `0` and therefore sort first. Duplicate
    /// package ids are reported once.
    pub fn apply(
        &self,
        installed: &[InstalledPackage],
        usage: &UsageReconciler,
        now_ms: u64,
    ) -> Vec<AppRecord> {
        let cutoff = self.cutoff(now_ms);
        let mut seen: HashSet<&str> = HashSet::new();

        let mut unused: Vec<AppRecord> = installed
            .iter()
            .filter(|pkg| self.is_candidate(pkg))
            .filter(|pkg| seen.insert(pkg.package_id.as_str()))
            .filter_map(|pkg| {
                let last_used = usage.reconcile(&pkg.package_id);
                self.is_unused(last_used, cutoff)
                    .then(|| AppRecord::new(pkg.label(), pkg.package_id.clone(), last_used))
            })
            .collect();

        unused.sort_by(|a, b| {
            a.last_used_ms
                .cmp(&b.last_used_ms)
                .then_with(|| a.package_id.cmp(&b.package_id))
        });
        unused
    }
}
