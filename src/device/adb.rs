//! # ADB Usage Source
//!
//! Implements [`UsageSource`] by shelling out to `adb`. All commands run with
//! stdin detached so they cannot interfere with the terminal UI.

use super::parser::{
    is_valid_package_id, label_from_package_id, parse_aggregated_stats, parse_package_list,
    parse_usage_events,
};
use super::UsageSource;
use crate::usage::{InstalledPackage, UsageEvent};
use anyhow::{Context, Result};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use tracing::{debug, warn};

/// `Intent.FLAG_ACTIVITY_NEW_TASK`
const FLAG_ACTIVITY_NEW_TASK: &str = "0x10000000";

/// A device reachable through `adb`.
#[derive(Debug, Clone)]
pub struct AdbDevice {
    adb: PathBuf,
    serial: Option<String>,
}

impl AdbDevice {
    pub fn new(adb: impl Into<PathBuf>) -> Self {
        Self {
            adb: adb.into(),
            serial: None,
        }
    }

    /// Target a specific device when several are attached.
    pub fn with_serial(mut self, serial: Option<String>) -> Self {
        self.serial = serial.filter(|s| !s.trim().is_empty());
        self
    }

    pub fn serial(&self) -> Option<&str> {
        self.serial.as_deref()
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.adb);
        if let Some(serial) = &self.serial {
            cmd.arg("-s").arg(serial);
        }
        cmd.stdin(Stdio::null());
        cmd
    }

    /// Verify that `adb` runs and a device is attached and authorised.
    pub fn check(&self) -> Result<()> {
        let output = self
            .command()
            .arg("get-state")
            .output()
            .with_context(|| format!("Failed to run adb at {}", self.adb.display()))?;

        let state = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if !output.status.success() || state != "device" {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!(
                "No usable device ({}). Connect a device and accept the USB debugging prompt.",
                if stderr.trim().is_empty() {
                    state
                } else {
                    stderr.trim().to_string()
                }
            );
        }
        Ok(())
    }

    /// Run `adb shell <args>` and return stdout.
    fn shell(&self, args: &[&str]) -> Result<String> {
        let joined = args.join(" ");
        debug!("adb shell {}", joined);

        let output = self
            .command()
            .arg("shell")
            .args(args)
            .output()
            .with_context(|| format!("Failed to run adb shell {joined}"))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("adb shell {} failed: {}", joined, stderr.trim());
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn package_set(&self, flag: &str) -> Result<HashSet<String>> {
        let output = self.shell(&["pm", "list", "packages", flag])?;
        Ok(parse_package_list(&output).into_iter().collect())
    }

    fn start_delete_intent(&self, package_id: &str, new_task: bool) -> Result<()> {
        let data = format!("package:{package_id}");
        let mut args = vec!["am", "start", "-a", "android.intent.action.DELETE", "-d", data.as_str()];
        if new_task {
            args.extend(["-f", FLAG_ACTIVITY_NEW_TASK]);
        }

        let output = self.shell(&args)?;
        // `am start` exits 0 even when the intent cannot be resolved.
        if output.contains("Error:") {
            anyhow::bail!("am start rejected the uninstall intent: {}", output.trim());
        }
        Ok(())
    }
}

impl UsageSource for AdbDevice {
    fn events(&self, since_ms: u64, until_ms: u64) -> Result<Vec<UsageEvent>> {
        let output = self.shell(&["dumpsys", "usagestats"])?;
        parse_usage_events(&output, since_ms, until_ms)
    }

    fn aggregated_last_used(&self, since_ms: u64, until_ms: u64) -> Result<HashMap<String, u64>> {
        let output = self.shell(&["dumpsys", "usagestats"])?;
        parse_aggregated_stats(&output, since_ms, until_ms)
    }

    fn installed_packages(&self) -> Result<Vec<InstalledPackage>> {
        let all = parse_package_list(&self.shell(&["pm", "list", "packages"])?);
        let system = self
            .package_set("-s")
            .context("Failed to list system packages")?;
        let disabled = self
            .package_set("-d")
            .context("Failed to list disabled packages")?;

        Ok(all
            .into_iter()
            .map(|package_id| InstalledPackage {
                display_name: label_from_package_id(&package_id),
                is_system: system.contains(&package_id),
                is_enabled: !disabled.contains(&package_id),
                package_id,
            })
            .collect())
    }

    fn request_uninstall(&self, package_id: &str) -> Result<()> {
        if !is_valid_package_id(package_id) {
            anyhow::bail!("Invalid package id '{}'", package_id);
        }

        match self.start_delete_intent(package_id, true) {
            Ok(()) => Ok(()),
            Err(e) => {
                warn!("Uninstall intent with NEW_TASK failed, retrying without: {e:#}");
                self.start_delete_intent(package_id, false)
            }
        }
    }
}
