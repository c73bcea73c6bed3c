//! # Device Module
//!
//! The boundary to the Android device. Everything the scan needs from the
//! platform goes through [`UsageSource`], so the core can be exercised with
//! an in-memory source in tests and with [`AdbDevice`] in production.
//!
//! | Operation | adb command |
//! |-----------|-------------|
//! | `events` / `aggregated_last_used` | `adb shell dumpsys usagestats` |
//! | `installed_packages` | `adb shell pm list packages [-s\|-d]` |
//! | `request_uninstall` | `adb shell am start -a android.intent.action.DELETE -d package:<id>` |

mod adb;
pub mod parser;

pub use adb::AdbDevice;

use crate::usage::{InstalledPackage, UsageEvent};
use anyhow::Result;
use std::collections::HashMap;

/// Read-only usage data plus the one side-effecting action the app needs.
pub trait UsageSource {
    /// Usage events between `since_ms` and `until_ms`, in device order.
    fn events(&self, since_ms: u64, until_ms: u64) -> Result<Vec<UsageEvent>>;

    /// Pre-aggregated last-used time per package for the same window.
    fn aggregated_last_used(&self, since_ms: u64, until_ms: u64) -> Result<HashMap<String, u64>>;

    /// Every installed package, read fresh.
    fn installed_packages(&self) -> Result<Vec<InstalledPackage>>;

    /// Ask the device to start its own uninstall flow for `package_id`.
    ///
    /// Fire-and-forget: success means the request was dispatched, not that
    /// the package was removed.
    fn request_uninstall(&self, package_id: &str) -> Result<()>;
}
