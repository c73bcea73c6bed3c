//! # Usage Module
//!
//! The platform-independent core: turning raw usage data into the list of
//! apps that have not been used recently.
//!
//! ## Pipeline
//!
//! ```text
//! events ──► last_foreground_by_package ─┐
//!                                        ├─► UsageReconciler ─► UnusedAppFilter ─► Vec<AppRecord>
//! aggregated stats ──────────────────────┘                                             │
//!                                                                                       ▼
//!                                                                                search(query)
//! ```
//!
//! [`scan`] runs the whole pipeline against a [`crate::device::UsageSource`].
//! Nothing here touches the terminal or the device directly.

mod filter;
mod reconcile;
mod record;
mod scan;
mod search;

pub use filter::UnusedAppFilter;
pub use reconcile::{last_foreground_by_package, reconcile, EventKind, UsageEvent, UsageReconciler};
pub use record::{
    days_since, days_to_millis, format_last_used, now_millis, AppRecord, InstalledPackage,
    ScanMode, DAY_MS,
};
pub use scan::{scan, ScanOutcome, ScanSettings, DEFAULT_HISTORY_DAYS, DEFAULT_THRESHOLD_DAYS};
pub use search::search;
