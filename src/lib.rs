//! Unused Apps - find Android apps you have not opened in a while
//!
//! This library provides the usage reconciliation and filtering core, the
//! `adb` device boundary, and the terminal UI built on top of them.

pub mod device;
pub mod ui;
pub mod usage;
