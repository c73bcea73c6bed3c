//! Scan pipeline tests
//!
//! Runs `scan` end to end against in-memory usage sources, covering the
//! reconciliation scenarios and the degraded states.

use anyhow::Result;
use std::collections::HashMap;
use unused_apps::device::UsageSource;
use unused_apps::usage::{
    days_to_millis, scan, AppRecord, EventKind, InstalledPackage, ScanMode, ScanOutcome,
    ScanSettings, UsageEvent,
};

const NOW: u64 = 1_700_000_000_000;

fn days_ago(days: u64) -> u64 {
    NOW - days_to_millis(days)
}

/// In-memory source; `fail_*` flags make the matching query error out.
#[derive(Default)]
struct FakeSource {
    events: Vec<UsageEvent>,
    aggregated: HashMap<String, u64>,
    installed: Vec<InstalledPackage>,
    fail_events: bool,
    fail_aggregated: bool,
    fail_installed: bool,
}

impl FakeSource {
    fn with_installed(ids: &[&str]) -> Self {
        Self {
            installed: ids
                .iter()
                .map(|id| InstalledPackage::user(*id, None))
                .collect(),
            ..Self::default()
        }
    }

    fn foreground(mut self, package_id: &str, ts: u64) -> Self {
        self.events
            .push(UsageEvent::new(package_id, EventKind::MoveToForeground, ts));
        self
    }

    fn aggregated(mut self, package_id: &str, ts: u64) -> Self {
        self.aggregated.insert(package_id.to_string(), ts);
        self
    }
}

impl UsageSource for FakeSource {
    fn events(&self, since_ms: u64, until_ms: u64) -> Result<Vec<UsageEvent>> {
        if self.fail_events {
            anyhow::bail!("event query failed");
        }
        Ok(self
            .events
            .iter()
            .filter(|e| e.timestamp_ms >= since_ms && e.timestamp_ms <= until_ms)
            .cloned()
            .collect())
    }

    fn aggregated_last_used(&self, _since_ms: u64, _until_ms: u64) -> Result<HashMap<String, u64>> {
        if self.fail_aggregated {
            anyhow::bail!("aggregated query failed");
        }
        Ok(self.aggregated.clone())
    }

    fn installed_packages(&self) -> Result<Vec<InstalledPackage>> {
        if self.fail_installed {
            anyhow::bail!("device offline");
        }
        Ok(self.installed.clone())
    }

    fn request_uninstall(&self, _package_id: &str) -> Result<()> {
        Ok(())
    }
}

fn settings(mode: ScanMode) -> ScanSettings {
    ScanSettings {
        mode,
        ..ScanSettings::default()
    }
}

fn records(outcome: ScanOutcome) -> Vec<AppRecord> {
    match outcome {
        ScanOutcome::Completed { records, .. } => records,
        other => panic!("expected completed scan, got {other:?}"),
    }
}

#[test]
fn test_never_used_app_listed_in_aggressive_mode() {
    let source = FakeSource::with_installed(&["a"]);
    let outcome = scan(&source, &settings(ScanMode::Aggressive), NOW);

    assert_eq!(
        outcome,
        ScanOutcome::Completed {
            records: vec![AppRecord::new("a", "a", 0)],
            usage_available: false,
        }
    );
}

#[test]
fn test_recent_aggregate_wins_over_old_event() {
    let source = FakeSource::with_installed(&["b", "other"])
        .foreground("b", days_ago(40))
        .aggregated("b", days_ago(10))
        .aggregated("other", days_ago(2));

    for mode in [ScanMode::Conservative, ScanMode::Aggressive] {
        let result = records(scan(&source, &settings(mode), NOW));
        assert!(result.iter().all(|r| r.package_id != "b"));
    }
}

#[test]
fn test_old_event_without_aggregate_listed_in_both_modes() {
    let source = FakeSource::with_installed(&["c"]).foreground("c", days_ago(40));

    for mode in [ScanMode::Conservative, ScanMode::Aggressive] {
        let result = records(scan(&source, &settings(mode), NOW));
        assert_eq!(result, vec![AppRecord::new("c", "c", days_ago(40))]);
    }
}

#[test]
fn test_conservative_without_usage_reports_unavailable() {
    let source = FakeSource::with_installed(&["a", "b"]);
    let outcome = scan(&source, &settings(ScanMode::Conservative), NOW);
    assert_eq!(outcome, ScanOutcome::UsageUnavailable);
}

#[test]
fn test_zero_only_usage_counts_as_unavailable() {
    let source = FakeSource::with_installed(&["a"])
        .foreground("a", 0)
        .aggregated("a", 0);
    let outcome = scan(&source, &settings(ScanMode::Conservative), NOW);
    assert_eq!(outcome, ScanOutcome::UsageUnavailable);
}

#[test]
fn test_failed_usage_queries_degrade_to_no_signal() {
    let source = FakeSource {
        fail_events: true,
        fail_aggregated: true,
        ..FakeSource::with_installed(&["a"])
    };

    assert_eq!(
        scan(&source, &settings(ScanMode::Conservative), NOW),
        ScanOutcome::UsageUnavailable
    );
    assert_eq!(records(scan(&source, &settings(ScanMode::Aggressive), NOW)).len(), 1);
}

#[test]
fn test_event_failure_tolerated_when_aggregates_exist() {
    let source = FakeSource {
        fail_events: true,
        ..FakeSource::with_installed(&["old", "fresh"])
            .aggregated("old", days_ago(100))
            .aggregated("fresh", days_ago(1))
    };

    let result = records(scan(&source, &settings(ScanMode::Conservative), NOW));
    assert_eq!(result, vec![AppRecord::new("old", "old", days_ago(100))]);
}

#[test]
fn test_installed_failure_reports_device_unavailable() {
    let source = FakeSource {
        fail_installed: true,
        ..FakeSource::with_installed(&[]).aggregated("x", days_ago(50))
    };

    match scan(&source, &settings(ScanMode::Aggressive), NOW) {
        ScanOutcome::DeviceUnavailable { reason } => assert!(reason.contains("device offline")),
        other => panic!("expected device unavailable, got {other:?}"),
    }
}

#[test]
fn test_offline_device_conservative_reports_device_unavailable() {
    let source = FakeSource {
        fail_events: true,
        fail_aggregated: true,
        fail_installed: true,
        ..FakeSource::default()
    };

    let outcome = scan(&source, &settings(ScanMode::Conservative), NOW);
    assert!(
        matches!(outcome, ScanOutcome::DeviceUnavailable { .. }),
        "got {outcome:?}"
    );
}

#[test]
fn test_events_outside_history_window_ignored() {
    let source = FakeSource::with_installed(&["ancient", "seen"])
        .foreground("ancient", days_ago(400))
        .foreground("seen", days_ago(60));

    let result = records(scan(&source, &settings(ScanMode::Aggressive), NOW));
    let ancient = result
        .iter()
        .find(|r| r.package_id == "ancient")
        .expect("ancient listed");
    assert!(ancient.is_never_used());
}

#[test]
fn test_output_sorted_oldest_first() {
    let source = FakeSource::with_installed(&["m", "n", "o", "p"])
        .foreground("m", days_ago(45))
        .aggregated("o", days_ago(200))
        .aggregated("p", days_ago(90));

    let result = records(scan(&source, &settings(ScanMode::Aggressive), NOW));
    let ids: Vec<&str> = result.iter().map(|r| r.package_id.as_str()).collect();
    assert_eq!(ids, vec!["n", "o", "p", "m"]);
}

#[test]
fn test_self_package_and_system_apps_excluded() {
    let mut source = FakeSource::with_installed(&["org.example.unusedapps", "com.user.app"]);
    source.installed.push(InstalledPackage {
        is_system: true,
        ..InstalledPackage::user("com.android.settings", None)
    });
    source.installed.push(InstalledPackage {
        is_enabled: false,
        ..InstalledPackage::user("com.disabled.app", None)
    });

    let settings = ScanSettings {
        self_package: Some("org.example.unusedapps".to_string()),
        ..ScanSettings::default()
    };
    let result = records(scan(&source, &settings, NOW));
    let ids: Vec<&str> = result.iter().map(|r| r.package_id.as_str()).collect();
    assert_eq!(ids, vec!["com.user.app"]);
}
