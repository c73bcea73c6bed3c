//! # Device Output Parsers
//!
//! Pure parsers for the text `dumpsys usagestats` and `pm list packages`
//! print. Kept separate from the process plumbing so they can be tested
//! against captured output.
//!
//! ## Shapes
//!
//! ```text
//! # event stream
//!         time="2024-03-05 09:15:02" type=ACTIVITY_RESUMED package=com.android.chrome class=...
//! # aggregated stats
//!       package=com.android.chrome totalTimeUsed="01:02:03" lastTimeUsed="2024-03-05 09:15:02" ...
//! # package list
//! package:com.android.chrome
//! ```

use crate::usage::{EventKind, UsageEvent};
use anyhow::{Context, Result};
use chrono::{Local, NaiveDateTime, TimeZone};
use regex::Regex;
use std::collections::{HashMap, HashSet};

const DUMPSYS_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parse a device-local `dumpsys` timestamp into epoch milliseconds.
///
/// Returns `None` for malformed input and for times at or before the epoch.
pub fn parse_dumpsys_time(text: &str) -> Option<u64> {
    let naive = NaiveDateTime::parse_from_str(text.trim(), DUMPSYS_TIME_FORMAT).ok()?;
    let local = Local.from_local_datetime(&naive).earliest()?;
    u64::try_from(local.timestamp_millis())
        .ok()
        .filter(|&ms| ms > 0)
}

fn in_window(ts: u64, since_ms: u64, until_ms: u64) -> bool {
    ts >= since_ms && ts <= until_ms
}

/// Extract usage events within `[since_ms, until_ms]` from `dumpsys usagestats`.
pub fn parse_usage_events(output: &str, since_ms: u64, until_ms: u64) -> Result<Vec<UsageEvent>> {
    let event_re = Regex::new(r#"time="([^"]+)"\s+type=(\S+)\s+package=(\S+)"#)
        .context("Failed to compile usage event regex pattern")?;

    let events = output
        .lines()
        .filter_map(|line| event_re.captures(line))
        .filter_map(|caps| {
            let ts = parse_dumpsys_time(&caps[1])?;
            in_window(ts, since_ms, until_ms).then(|| {
                UsageEvent::new(&caps[3], EventKind::from_type_name(&caps[2]), ts)
            })
        })
        .collect();

    Ok(events)
}

/// Extract the latest `lastTimeUsed` per package within the window.
///
/// `dumpsys` prints one stats block per interval (daily, weekly, monthly,
/// yearly); a package appearing in several keeps its maximum.
pub fn parse_aggregated_stats(
    output: &str,
    since_ms: u64,
    until_ms: u64,
) -> Result<HashMap<String, u64>> {
    let package_re =
        Regex::new(r"\bpackage=(\S+)").context("Failed to compile package regex pattern")?;
    let last_used_re = Regex::new(r#"\blastTimeUsed="([^"]+)""#)
        .context("Failed to compile lastTimeUsed regex pattern")?;

    let mut latest: HashMap<String, u64> = HashMap::new();
    for line in output.lines() {
        let Some(last_used) = last_used_re.captures(line) else {
            continue;
        };
        let Some(package) = package_re.captures(line) else {
            continue;
        };
        let Some(ts) = parse_dumpsys_time(&last_used[1]) else {
            continue;
        };
        if !in_window(ts, since_ms, until_ms) {
            continue;
        }
        let slot = latest.entry(package[1].to_string()).or_insert(0);
        *slot = (*slot).max(ts);
    }

    Ok(latest)
}

/// Parse `pm list packages` output into package ids, in listed order.
pub fn parse_package_list(output: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    output
        .lines()
        .filter_map(|line| line.trim().strip_prefix("package:"))
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .filter(|id| seen.insert((*id).to_string()))
        .map(str::to_string)
        .collect()
}

/// Derive a readable label from the last segment of a package id.
///
/// `com.android.calculator2` becomes `Calculator2`, `org.example.my_notes`
/// becomes `My Notes`. Returns `None` when no usable segment exists.
pub fn label_from_package_id(package_id: &str) -> Option<String> {
    let segment = package_id.rsplit('.').next()?;
    let label = segment
        .replace(['_', '-'], " ")
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(first) => {
                    let mut result = first.to_uppercase().to_string();
                    result.push_str(chars.as_str());
                    result
                }
            }
        })
        .collect::<Vec<_>>()
        .join(" ");

    (!label.is_empty()).then_some(label)
}

/// Check if a string is a valid Android package id.
///
/// A valid package id must:
/// - Contain at least two dot-separated segments
/// - Start every segment with an ASCII letter
/// - Contain only ASCII alphanumerics or underscores within segments
pub fn is_valid_package_id(package_id: &str) -> bool {
    let segments: Vec<&str> = package_id.split('.').collect();
    if segments.len() < 2 {
        return false;
    }

    segments.iter().all(|segment| {
        let Some(first_char) = segment.chars().next() else {
            return false;
        };
        first_char.is_ascii_alphabetic()
            && segment.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
    })
}
