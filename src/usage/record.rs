//! # Scan Records
//!
//! Plain data types shared by the reconciler, the filter and the UI.
//!
//! Timestamps are Unix epoch milliseconds stored as `u64`. The value `0` is
//! reserved for "no signal from either usage source" and never denotes a real
//! point in time.

use chrono::{DateTime, Local, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Milliseconds in one day.
pub const DAY_MS: u64 = 86_400_000;

/// One unused application as reported by a scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppRecord {
    /// Human-readable label.
    pub display_name: String,
    /// Stable package identifier, unique within a result set.
    pub package_id: String,
    /// Reconciled last-used time, `0` when neither source saw the package.
    pub last_used_ms: u64,
}

impl AppRecord {
    pub fn new(display_name: impl Into<String>, package_id: impl Into<String>, last_used_ms: u64) -> Self {
        Self {
            display_name: display_name.into(),
            package_id: package_id.into(),
            last_used_ms,
        }
    }

    pub fn is_never_used(&self) -> bool {
        self.last_used_ms == 0
    }
}

/// A package as enumerated from the device, before any filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledPackage {
    pub package_id: String,
    /// Label if one could be resolved. `None` falls back to the package id.
    pub display_name: Option<String>,
    pub is_system: bool,
    pub is_enabled: bool,
}

impl InstalledPackage {
    /// A user-installed, enabled package.
    pub fn user(package_id: impl Into<String>, display_name: Option<String>) -> Self {
        Self {
            package_id: package_id.into(),
            display_name,
            is_system: false,
            is_enabled: true,
        }
    }

    /// The label to show, falling back to the package id when none is known.
    pub fn label(&self) -> String {
        match self.display_name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => self.package_id.clone(),
        }
    }
}

/// How packages without any usage evidence are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanMode {
    /// Only timestamp-backed evidence counts as unused.
    Conservative,
    /// Packages never observed at all are reported as "never used" too.
    #[default]
    Aggressive,
}

impl fmt::Display for ScanMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanMode::Conservative => write!(f, "conservative"),
            ScanMode::Aggressive => write!(f, "aggressive"),
        }
    }
}

pub fn days_to_millis(days: u64) -> u64 {
    days.saturating_mul(DAY_MS)
}

/// Current wall-clock time in epoch milliseconds.
pub fn now_millis() -> u64 {
    u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0)
}

/// Whole days elapsed between `last_used_ms` and `now_ms`, `None` if never used.
pub fn days_since(last_used_ms: u64, now_ms: u64) -> Option<u64> {
    if last_used_ms == 0 {
        return None;
    }
    Some(now_ms.saturating_sub(last_used_ms) / DAY_MS)
}

/// Format a last-used timestamp for display, e.g. `"05 Mar 2024, 09:15 AM"`.
pub fn format_last_used(last_used_ms: u64) -> String {
    if last_used_ms == 0 {
        return "Never used".to_string();
    }
    let Ok(millis) = i64::try_from(last_used_ms) else {
        return "Never used".to_string();
    };
    match Local.timestamp_millis_opt(millis).single() {
        Some(dt) => format_local(&dt),
        None => "Never used".to_string(),
    }
}

fn format_local(dt: &DateTime<Local>) -> String {
    dt.format("%d %b %Y, %I:%M %p").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_falls_back_to_package_id() {
        let pkg = InstalledPackage::user("com.example.notes", None);
        assert_eq!(pkg.label(), "com.example.notes");

        let blank = InstalledPackage::user("com.example.notes", Some("   ".to_string()));
        assert_eq!(blank.label(), "com.example.notes");

        let named = InstalledPackage::user("com.example.notes", Some("Notes".to_string()));
        assert_eq!(named.label(), "Notes");
    }

    #[test]
    fn test_format_last_used_never() {
        assert_eq!(format_last_used(0), "Never used");
    }

    #[test]
    fn test_format_last_used_real_timestamp() {
        let ts = Local
            .with_ymd_and_hms(2024, 3, 5, 9, 15, 0)
            .single()
            .expect("valid local time");
        let ms = u64::try_from(ts.timestamp_millis()).expect("positive");
        assert_eq!(format_last_used(ms), "05 Mar 2024, 09:15 AM");
    }

    #[test]
    fn test_days_since() {
        let now = days_to_millis(100);
        assert_eq!(days_since(0, now), None);
        assert_eq!(days_since(days_to_millis(60), now), Some(40));
        assert_eq!(days_since(now + 5, now), Some(0));
    }

    #[test]
    fn test_scan_mode_serde_lowercase() {
        let json = serde_json::to_string(&ScanMode::Conservative).expect("serialize");
        assert_eq!(json, "\"conservative\"");
        let mode: ScanMode = serde_json::from_str("\"aggressive\"").expect("deserialize");
        assert_eq!(mode, ScanMode::Aggressive);
    }
}
