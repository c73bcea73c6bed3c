use crate::ui::theme::Theme;
use crate::usage::{search, AppRecord, ScanOutcome, ScanSettings};

/// What the main panel is showing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    /// No scan has run yet.
    Idle,
    Scanning,
    Results,
    /// Neither usage source returned data (conservative mode).
    UsageUnavailable,
    DeviceUnavailable(String),
}

/// A confirmed request to open the device's uninstall flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UninstallRequest {
    pub package_id: String,
    pub display_name: String,
}

/// Side effects the event loop must carry out on behalf of the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Rescan,
    Uninstall(UninstallRequest),
}

pub struct App {
    pub view: View,
    /// Result of the last completed scan, unfiltered.
    pub records: Vec<AppRecord>,
    /// False when the last scan had no usage data and listed everything as
    /// never used.
    pub usage_available: bool,
    /// When the last scan finished, for "N days ago" labels.
    pub scanned_at_ms: Option<u64>,
    pub selected_index: usize,
    pub search_mode: bool,
    pub search_query: String,
    /// Record awaiting uninstall confirmation.
    pub confirm: Option<AppRecord>,
    pub show_info: bool,
    /// One-line message shown in the footer.
    pub status: Option<String>,
    pub should_quit: bool,
    pub theme: Theme,
    pub settings: ScanSettings,
    /// Device description for the header (serial or "default device").
    pub device_label: String,
}

impl App {
    pub fn new(theme: Theme, settings: ScanSettings, device_label: String) -> Self {
        Self {
            view: View::Idle,
            records: Vec::new(),
            usage_available: true,
            scanned_at_ms: None,
            selected_index: 0,
            search_mode: false,
            search_query: String::new(),
            confirm: None,
            show_info: false,
            status: None,
            should_quit: false,
            theme,
            settings,
            device_label,
        }
    }

    /// Records matching the current query, derived from the full scan result
    /// on every call.
    pub fn visible_records(&self) -> Vec<AppRecord> {
        search(&self.records, &self.search_query)
    }

    pub fn selected_record(&self) -> Option<AppRecord> {
        self.visible_records().get(self.selected_index).cloned()
    }

    pub fn is_scanning(&self) -> bool {
        self.view == View::Scanning
    }

    /// Switch to the scanning view. Returns `false` if a scan is already
    /// running, in which case nothing changes.
    pub fn begin_scan(&mut self) -> bool {
        if self.is_scanning() {
            return false;
        }
        self.view = View::Scanning;
        self.status = None;
        true
    }

    /// Replace the current result set with a finished scan.
    pub fn apply_scan(&mut self, outcome: ScanOutcome, now_ms: u64) {
        self.confirm = None;
        self.selected_index = 0;
        self.scanned_at_ms = Some(now_ms);

        match outcome {
            ScanOutcome::Completed {
                records,
                usage_available,
            } => {
                self.records = records;
                self.usage_available = usage_available;
                self.view = View::Results;
                self.status = if self.records.is_empty() {
                    Some(format!(
                        "No apps unused for {} days were found.",
                        self.settings.threshold_days
                    ))
                } else {
                    Some(format!("Found {} unused apps.", self.records.len()))
                };
            }
            ScanOutcome::UsageUnavailable => {
                self.records.clear();
                self.usage_available = false;
                self.view = View::UsageUnavailable;
            }
            ScanOutcome::DeviceUnavailable { reason } => {
                self.records.clear();
                self.view = View::DeviceUnavailable(reason);
            }
        }
    }

    pub fn next(&mut self) {
        let count = self.visible_records().len();
        if count > 0 {
            self.selected_index = (self.selected_index + 1) % count;
        }
    }

    pub fn previous(&mut self) {
        let count = self.visible_records().len();
        if count > 0 {
            if self.selected_index > 0 {
                self.selected_index -= 1;
            } else {
                self.selected_index = count - 1;
            }
        }
    }

    pub fn select_first(&mut self) {
        self.selected_index = 0;
    }

    pub fn select_last(&mut self) {
        self.selected_index = self.visible_records().len().saturating_sub(1);
    }

    /// Start editing the query. An existing query is kept so it can be refined.
    pub fn enter_search_mode(&mut self) {
        self.search_mode = true;
        self.selected_index = 0;
    }

    /// Stop editing. With `keep_query` false the filter is cleared too.
    pub fn exit_search_mode(&mut self, keep_query: bool) {
        self.search_mode = false;
        if !keep_query {
            self.search_query.clear();
        }
        self.selected_index = 0;
    }

    pub fn search_push_char(&mut self, c: char) {
        self.search_query.push(c);
        self.selected_index = 0; // Reset selection when search changes
    }

    pub fn search_pop_char(&mut self) {
        self.search_query.pop();
        self.selected_index = 0; // Reset selection when search changes
    }

    pub fn toggle_info(&mut self) {
        self.show_info = !self.show_info;
    }

    /// Open the confirmation dialog for the selected record.
    pub fn open_confirm(&mut self) {
        self.confirm = self.selected_record();
    }

    pub fn cancel_confirm(&mut self) {
        self.confirm = None;
    }

    /// Close the dialog and turn it into an uninstall request.
    pub fn confirm_uninstall(&mut self) -> Option<UninstallRequest> {
        let record = self.confirm.take()?;
        self.status = Some(format!(
            "Uninstall requested for {}. Confirm on the device, then press r to rescan.",
            record.display_name
        ));
        Some(UninstallRequest {
            package_id: record.package_id,
            display_name: record.display_name,
        })
    }
}
