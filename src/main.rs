//! # Unused Apps CLI Entry Point
//!
//! Finds apps on a connected Android device that have not been used for a
//! while and offers to uninstall them.
//!
//! ## Usage
//!
//! ```bash
//! # Interactive TUI against the only attached device
//! unused-apps
//!
//! # Apps unused for 90 days, only those with real usage evidence
//! unused-apps --days 90 --conservative
//!
//! # Pick a device and print the result instead of opening the TUI
//! unused-apps --serial emulator-5554 --list
//! ```
//!
//! ## Architecture
//!
//! 1. **Config**: `~/.config/unused-apps/config.json`, overridden by flags
//! 2. **Scan**: usage events + aggregated stats + installed packages over `adb`,
//!    run on a blocking worker so the UI keeps drawing
//! 3. **UI**: list of unused apps, oldest first, with search and an uninstall
//!    confirmation that opens the device's own uninstall dialog
//!
//! ## Key Bindings
//!
//! - `q` - Quit
//! - `j` / `Down`, `k` / `Up` - Move selection
//! - `/` - Filter by name or package id
//! - `Enter` / `u` - Uninstall selected app (asks for confirmation)
//! - `r` / `F5` - Rescan
//! - `i` - Show/hide info modal

use unused_apps::device::{AdbDevice, UsageSource};
use unused_apps::ui::{self, config::Config, theme::Theme, Action, App, UninstallRequest};
use unused_apps::usage::{
    self, days_since, format_last_used, now_millis, ScanMode, ScanOutcome, ScanSettings,
};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::fmt::Write as _;
use std::fs::{self, OpenOptions};
use std::io;
use std::panic;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter.
const LOG_ENV: &str = "UNUSED_APPS_LOG";

type SharedSource = Arc<dyn UsageSource + Send + Sync>;

/// Trait for reading terminal events (allows dependency injection for testing)
trait EventReader {
    fn read_event(&mut self, timeout: Duration) -> Result<Option<Event>>;
}

/// Production event reader that uses crossterm's event polling + read
struct CrosstermEventReader;

impl EventReader for CrosstermEventReader {
    fn read_event(&mut self, timeout: Duration) -> Result<Option<Event>> {
        if event::poll(timeout).context("Failed to poll for events")? {
            Ok(Some(
                event::read().context("Failed to read keyboard event")?,
            ))
        } else {
            Ok(None)
        }
    }
}

/// Find Android apps you have not used recently
#[derive(Parser, Debug, Default)]
#[command(name = "unused-apps")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Find Android apps you have not used recently and uninstall them", long_about = None)]
struct Args {
    /// List apps not used for more than this many days
    #[arg(short, long, value_name = "DAYS")]
    days: Option<u64>,

    /// How far back to read usage history
    #[arg(long, value_name = "DAYS")]
    history_days: Option<u64>,

    /// Only list apps with a recorded last-use time
    #[arg(long, conflicts_with = "aggressive")]
    conservative: bool,

    /// Also list apps with no usage record at all
    #[arg(long, conflicts_with = "conservative")]
    aggressive: bool,

    /// Serial of the device to scan (see `adb devices`)
    #[arg(short, long, value_name = "SERIAL")]
    serial: Option<String>,

    /// Path to the adb executable
    #[arg(long, value_name = "PATH")]
    adb: Option<PathBuf>,

    /// Package id never to list
    #[arg(long, value_name = "PACKAGE")]
    self_package: Option<String>,

    /// Color theme name
    #[arg(long, value_name = "NAME")]
    theme: Option<String>,

    /// Print the scan result and exit instead of opening the TUI
    #[arg(long)]
    list: bool,
}

impl Args {
    /// Overlay command-line flags on the loaded configuration.
    fn apply_to(&self, config: &mut Config) {
        if let Some(days) = self.days {
            config.threshold_days = days;
        }
        if let Some(days) = self.history_days {
            config.history_days = days;
        }
        if self.conservative {
            config.mode = ScanMode::Conservative;
        } else if self.aggressive {
            config.mode = ScanMode::Aggressive;
        }
        if let Some(serial) = &self.serial {
            config.serial = Some(serial.clone());
        }
        if let Some(adb) = &self.adb {
            config.adb_path = adb.clone();
        }
        if let Some(package) = &self.self_package {
            config.self_package = Some(package.clone());
        }
        if let Some(theme) = &self.theme {
            config.theme = theme.clone();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Set up panic hook to ensure terminal is restored on panic
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let result = run_application(args).await;

    // Restore panic hook
    let _ = panic::take_hook();

    result
}

/// Send `tracing` output to a log file; the terminal belongs to the TUI.
fn init_logging() -> Result<PathBuf> {
    let dir = Config::data_dir()?;
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;

    let path = dir.join("unused-apps.log");
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file: {}", path.display()))?;

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install log subscriber: {e}"))?;

    Ok(path)
}

async fn run_application(args: Args) -> Result<()> {
    // Logging first, so problems loading the config file end up in the log
    match init_logging() {
        Ok(path) => info!("Logging to {}", path.display()),
        Err(e) => eprintln!("Warning: logging disabled: {e:#}"),
    }

    let mut config = Config::load();
    args.apply_to(&mut config);

    let device = AdbDevice::new(config.adb_path.clone()).with_serial(config.serial.clone());
    let settings = config.scan_settings();
    info!(?settings, serial = ?device.serial(), "Starting");

    if args.list {
        return run_list(&device, &settings);
    }

    let device_label = device
        .serial()
        .map_or_else(|| "default device".to_string(), str::to_string);
    let mut app = App::new(Theme::resolve(&config.theme).clone(), settings, device_label);
    let source: SharedSource = Arc::new(device);

    // Setup terminal
    enable_raw_mode().context("Failed to enable raw mode for terminal")?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to setup terminal")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;

    // Run the app and ensure cleanup happens even on error
    let mut event_reader = CrosstermEventReader;
    let run_result = run_app(&mut terminal, &mut app, source, &mut event_reader).await;

    // Restore terminal (always runs, even if run_app failed)
    let cleanup_result = cleanup_terminal(&mut terminal);

    run_result?;
    cleanup_result?;

    Ok(())
}

/// Non-interactive mode: one scan, printed to stdout.
fn run_list(device: &AdbDevice, settings: &ScanSettings) -> Result<()> {
    device.check().context("adb is not ready")?;

    let now = now_millis();
    let outcome = usage::scan(device, settings, now);
    if let ScanOutcome::DeviceUnavailable { reason } = &outcome {
        anyhow::bail!("Failed to read installed packages: {reason}");
    }

    print!("{}", format_listing(&outcome, settings, now));
    Ok(())
}

fn format_listing(outcome: &ScanOutcome, settings: &ScanSettings, now_ms: u64) -> String {
    let mut out = String::new();
    match outcome {
        ScanOutcome::Completed {
            records,
            usage_available,
        } => {
            if !usage_available {
                let _ = writeln!(
                    out,
                    "Warning: no usage data available, every app is listed as never used."
                );
            }
            if records.is_empty() {
                let _ = writeln!(
                    out,
                    "No apps unused for {} days were found.",
                    settings.threshold_days
                );
            }
            for record in records {
                let age = days_since(record.last_used_ms, now_ms)
                    .map_or_else(|| "never".to_string(), |d| format!("{d}d"));
                let _ = writeln!(
                    out,
                    "{:>7}  {:<28}  {:<40}  {}",
                    age,
                    record.display_name,
                    record.package_id,
                    format_last_used(record.last_used_ms)
                );
            }
        }
        ScanOutcome::UsageUnavailable => {
            let _ = writeln!(
                out,
                "No usage data available. Make sure the device is unlocked and USB debugging is authorised; some OEMs require a reboot."
            );
        }
        ScanOutcome::DeviceUnavailable { reason } => {
            let _ = writeln!(out, "Device unavailable: {reason}");
        }
    }
    out
}

/// Clean up terminal state
fn cleanup_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("Failed to disable raw mode")?;

    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("Failed to restore terminal")?;

    terminal.show_cursor().context("Failed to show cursor")?;

    Ok(())
}

fn spawn_scan(source: SharedSource, settings: ScanSettings) -> JoinHandle<ScanOutcome> {
    tokio::task::spawn_blocking(move || usage::scan(source.as_ref(), &settings, now_millis()))
}

/// Dispatch an uninstall request without waiting for it. Failures are logged
/// and otherwise ignored.
fn dispatch_uninstall(source: SharedSource, request: UninstallRequest) {
    info!(package = %request.package_id, "Requesting uninstall");
    tokio::task::spawn_blocking(move || {
        if let Err(e) = source.request_uninstall(&request.package_id) {
            warn!(package = %request.package_id, "Uninstall request failed: {e:#}");
        }
    });
}

async fn run_app<B>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    source: SharedSource,
    event_reader: &mut dyn EventReader,
) -> Result<()>
where
    B: Backend,
    B::Error: Send + Sync + 'static,
{
    let mut pending_scan: Option<JoinHandle<ScanOutcome>> = None;
    if app.begin_scan() {
        pending_scan = Some(spawn_scan(source.clone(), app.settings.clone()));
    }

    loop {
        // Pick up a finished scan
        if pending_scan.as_ref().is_some_and(JoinHandle::is_finished) {
            if let Some(handle) = pending_scan.take() {
                let outcome = handle.await.unwrap_or_else(|e| {
                    warn!("Scan task failed: {e}");
                    ScanOutcome::DeviceUnavailable {
                        reason: format!("Scan task failed: {e}"),
                    }
                });
                app.apply_scan(outcome, now_millis());
            }
        }

        terminal
            .draw(|f| ui::render(f, app))
            .context("Failed to draw terminal UI")?;

        // Poll faster while a scan is running so the result shows promptly
        let poll_timeout = if pending_scan.is_some() {
            Duration::from_millis(50)
        } else {
            Duration::from_millis(100)
        };

        let Some(event) = event_reader.read_event(poll_timeout)? else {
            continue;
        };

        if let Event::Key(key) = event {
            match ui::handle_key(app, key) {
                Some(Action::Rescan) => {
                    pending_scan = Some(spawn_scan(source.clone(), app.settings.clone()));
                }
                Some(Action::Uninstall(request)) => {
                    dispatch_uninstall(source.clone(), request);
                }
                None => {}
            }
        }

        if app.should_quit {
            if let Some(handle) = pending_scan.take() {
                handle.abort();
            }
            break;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::backend::TestBackend;
    use std::collections::{HashMap, VecDeque};
    use unused_apps::usage::{AppRecord, InstalledPackage, UsageEvent, DAY_MS};

    /// Mock event reader: scripted events, `None` entries idle for the
    /// timeout, and a quit key once the script runs out.
    struct MockEventReader {
        events: VecDeque<Option<Event>>,
    }

    impl MockEventReader {
        fn new(events: Vec<Option<Event>>) -> Self {
            Self {
                events: VecDeque::from(events),
            }
        }
    }

    impl EventReader for MockEventReader {
        fn read_event(&mut self, timeout: Duration) -> Result<Option<Event>> {
            match self.events.pop_front() {
                Some(Some(event)) => Ok(Some(event)),
                Some(None) => {
                    std::thread::sleep(timeout);
                    Ok(None)
                }
                None => Ok(Some(key_event(KeyCode::Char('q')))),
            }
        }
    }

    #[derive(Default)]
    struct FakeSource {
        installed: Vec<InstalledPackage>,
        uninstalled: Mutex<Vec<String>>,
    }

    impl UsageSource for FakeSource {
        fn events(&self, _since_ms: u64, _until_ms: u64) -> Result<Vec<UsageEvent>> {
            Ok(Vec::new())
        }

        fn aggregated_last_used(&self, _since_ms: u64, _until_ms: u64) -> Result<HashMap<String, u64>> {
            Ok(HashMap::new())
        }

        fn installed_packages(&self) -> Result<Vec<InstalledPackage>> {
            Ok(self.installed.clone())
        }

        fn request_uninstall(&self, package_id: &str) -> Result<()> {
            if let Ok(mut guard) = self.uninstalled.lock() {
                guard.push(package_id.to_string());
            }
            Ok(())
        }
    }

    fn key_event(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::empty()))
    }

    fn test_app() -> App {
        App::new(
            Theme::default_theme().clone(),
            ScanSettings::default(),
            "test".to_string(),
        )
    }

    #[test]
    fn test_mock_event_reader() {
        let mut reader = MockEventReader::new(vec![Some(key_event(KeyCode::Char('a')))]);

        assert!(matches!(
            reader.read_event(Duration::from_millis(1)).unwrap(),
            Some(Event::Key(KeyEvent {
                code: KeyCode::Char('a'),
                ..
            }))
        ));
        // Falls back to quitting once the script is exhausted
        assert!(matches!(
            reader.read_event(Duration::from_millis(1)).unwrap(),
            Some(Event::Key(KeyEvent {
                code: KeyCode::Char('q'),
                ..
            }))
        ));
    }

    #[test]
    fn test_crossterm_event_reader_type() {
        let _reader: Box<dyn EventReader> = Box::new(CrosstermEventReader);
    }

    #[test]
    fn test_args_override_config() {
        let args = Args {
            days: Some(90),
            conservative: true,
            serial: Some("emulator-5554".to_string()),
            theme: Some("Nord".to_string()),
            ..Args::default()
        };
        let mut config = Config::default();
        args.apply_to(&mut config);

        assert_eq!(config.threshold_days, 90);
        assert_eq!(config.history_days, 365);
        assert_eq!(config.mode, ScanMode::Conservative);
        assert_eq!(config.serial.as_deref(), Some("emulator-5554"));
        assert_eq!(config.theme, "Nord");
    }

    #[test]
    fn test_args_without_flags_keep_config() {
        let mut config = Config {
            mode: ScanMode::Conservative,
            threshold_days: 10,
            ..Config::default()
        };
        Args::default().apply_to(&mut config);
        assert_eq!(config.mode, ScanMode::Conservative);
        assert_eq!(config.threshold_days, 10);
    }

    #[test]
    fn test_args_parse_conflicting_modes() {
        let result = Args::try_parse_from(["unused-apps", "--conservative", "--aggressive"]);
        assert!(result.is_err());

        let args = Args::try_parse_from(["unused-apps", "-d", "45", "--list"]).unwrap();
        assert_eq!(args.days, Some(45));
        assert!(args.list);
    }

    #[test]
    fn test_format_listing() {
        let settings = ScanSettings::default();
        let outcome = ScanOutcome::Completed {
            records: vec![
                AppRecord::new("Calculator", "com.android.calc", 0),
                AppRecord::new("Old Game", "org.example.game", 10 * DAY_MS),
            ],
            usage_available: true,
        };
        let text = format_listing(&outcome, &settings, 50 * DAY_MS);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("never"));
        assert!(lines[0].contains("Never used"));
        assert!(lines[1].contains("40d"));

        let empty = ScanOutcome::Completed {
            records: Vec::new(),
            usage_available: false,
        };
        let text = format_listing(&empty, &settings, 0);
        assert!(text.contains("Warning: no usage data"));
        assert!(text.contains("No apps unused for 30 days were found."));

        let text = format_listing(&ScanOutcome::UsageUnavailable, &settings, 0);
        assert!(text.starts_with("No usage data available."));
    }

    #[tokio::test]
    async fn test_run_app_quits_on_q() {
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        let mut app = test_app();
        let source: SharedSource = Arc::new(FakeSource::default());
        let mut reader = MockEventReader::new(vec![Some(key_event(KeyCode::Char('q')))]);

        run_app(&mut terminal, &mut app, source, &mut reader)
            .await
            .unwrap();
        assert!(app.should_quit);
    }

    #[tokio::test]
    async fn test_run_app_applies_scan_and_dispatches_uninstall() {
        let fake = Arc::new(FakeSource {
            installed: vec![InstalledPackage::user("org.example.game", None)],
            ..FakeSource::default()
        });
        let source: SharedSource = fake.clone();

        let mut script: Vec<Option<Event>> = vec![None; 20];
        script.push(Some(key_event(KeyCode::Enter)));
        script.push(Some(key_event(KeyCode::Char('y'))));
        script.extend(vec![None; 10]);

        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        let mut app = test_app();
        let mut reader = MockEventReader::new(script);

        run_app(&mut terminal, &mut app, source, &mut reader)
            .await
            .unwrap();

        assert_eq!(app.view, ui::View::Results);
        assert_eq!(app.records.len(), 1);
        assert!(!app.usage_available);
        assert_eq!(
            fake.uninstalled.lock().unwrap().as_slice(),
            ["org.example.game".to_string()]
        );
    }
}
