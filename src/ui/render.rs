use crate::ui::app::{App, View};
use crate::usage::{days_since, format_last_used, AppRecord};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

pub fn render(frame: &mut Frame, app: &App) {
    let theme = &app.theme;
    frame.render_widget(
        Block::default().style(Style::default().bg(theme.bg)),
        frame.area(),
    );

    // Header + Search + Body + Footer
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(frame.area());

    render_header(frame, app, main_chunks[0]);
    render_search_bar(frame, app, main_chunks[1]);

    match &app.view {
        View::Results => {
            let body_chunks = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
                .split(main_chunks[2]);
            render_app_list(frame, app, body_chunks[0]);
            render_details(frame, app, body_chunks[1]);
        }
        View::Idle => render_message(
            frame,
            app,
            main_chunks[2],
            "Ready",
            vec!["Press r to scan the device for unused apps.".to_string()],
        ),
        View::Scanning => render_message(
            frame,
            app,
            main_chunks[2],
            "Scanning",
            vec!["Reading usage statistics and installed packages...".to_string()],
        ),
        View::UsageUnavailable => render_message(
            frame,
            app,
            main_chunks[2],
            "No usage data",
            vec![
                "The device returned no usage statistics.".to_string(),
                String::new(),
                "Check that the device is unlocked and USB debugging is authorised.".to_string(),
                "Some OEMs only record usage after a reboot.".to_string(),
                "Try: adb shell dumpsys usagestats".to_string(),
                String::new(),
                "Press r to scan again.".to_string(),
            ],
        ),
        View::DeviceUnavailable(reason) => render_message(
            frame,
            app,
            main_chunks[2],
            "Device unavailable",
            vec![
                reason.clone(),
                String::new(),
                "Press r to scan again.".to_string(),
            ],
        ),
    }

    render_footer(frame, app, main_chunks[3]);

    if app.show_info {
        render_info_modal(frame, app);
    }
    if let Some(record) = &app.confirm {
        render_confirm_dialog(frame, app, record);
    }
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let header_text = Line::from(vec![
        Span::styled(
            "  Unused Apps  ",
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(
                "{}  |  unused > {} days  |  {} mode",
                app.device_label, app.settings.threshold_days, app.settings.mode
            ),
            Style::default().fg(theme.fg_dim),
        ),
    ]);

    let header = Paragraph::new(header_text).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.accent)),
    );

    frame.render_widget(header, area);
}

fn render_search_bar(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let border_color = if app.search_mode {
        theme.secondary
    } else {
        theme.fg_dim
    };

    let content = if app.search_query.is_empty() && !app.search_mode {
        Line::from(Span::styled(
            "Press / to filter by name or package",
            Style::default().fg(theme.fg_dim),
        ))
    } else {
        let cursor = if app.search_mode { "▏" } else { "" };
        Line::from(vec![
            Span::styled(app.search_query.clone(), Style::default().fg(theme.secondary)),
            Span::styled(cursor, Style::default().fg(theme.secondary)),
        ])
    };

    let search = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .title("🔍 Search")
            .border_style(Style::default().fg(border_color)),
    );

    frame.render_widget(search, area);
}

fn last_used_label(record: &AppRecord, now_ms: Option<u64>) -> String {
    match now_ms.and_then(|now| days_since(record.last_used_ms, now)) {
        Some(days) => format!("{days}d ago"),
        None => "never".to_string(),
    }
}

fn render_app_list(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let visible = app.visible_records();

    let items: Vec<ListItem> = visible
        .iter()
        .map(|record| {
            let age_style = if record.is_never_used() {
                Style::default().fg(theme.warning)
            } else {
                Style::default().fg(theme.fg_dim)
            };
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{:>10}  ", last_used_label(record, app.scanned_at_ms)),
                    age_style,
                ),
                Span::styled(record.display_name.clone(), Style::default().fg(theme.fg)),
                Span::styled(
                    format!("  {}", record.package_id),
                    Style::default().fg(theme.fg_dim),
                ),
            ]))
        })
        .collect();

    let title = if app.search_query.is_empty() {
        format!("📱 Unused apps ({})", app.records.len())
    } else {
        format!("📱 Unused apps ({} of {})", visible.len(), app.records.len())
    };

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(Style::default().fg(theme.accent)),
        )
        .highlight_style(
            Style::default()
                .fg(theme.bg)
                .bg(theme.accent)
                .add_modifier(Modifier::BOLD),
        );

    let mut state = ListState::default();
    if !visible.is_empty() {
        state.select(Some(app.selected_index.min(visible.len() - 1)));
    }

    frame.render_stateful_widget(list, area, &mut state);
}

fn render_details(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;

    let mut text = Vec::new();
    if !app.usage_available {
        text.push(Line::from(Span::styled(
            "⚠ No usage data: every app is listed as never used.",
            Style::default().fg(theme.warning),
        )));
        text.push(Line::from(""));
    }

    match app.selected_record() {
        Some(record) => {
            text.extend([
                Line::from(Span::styled(
                    record.display_name.clone(),
                    Style::default()
                        .fg(theme.secondary)
                        .add_modifier(Modifier::BOLD),
                )),
                Line::from(""),
                Line::from(vec![
                    Span::styled("Package: ", Style::default().fg(theme.fg_dim)),
                    Span::styled(record.package_id.clone(), Style::default().fg(theme.fg)),
                ]),
                Line::from(vec![
                    Span::styled("Last used: ", Style::default().fg(theme.fg_dim)),
                    Span::styled(
                        format_last_used(record.last_used_ms),
                        Style::default().fg(theme.fg),
                    ),
                ]),
                Line::from(""),
                Line::from(Span::styled(
                    "────────────────────────────────────────",
                    Style::default().fg(theme.fg_dim),
                )),
                Line::from(""),
                Line::from(Span::styled(
                    "Press Enter to uninstall",
                    Style::default().fg(theme.fg_dim),
                )),
            ]);
        }
        None if app.records.is_empty() => {
            text.push(Line::from(Span::styled(
                format!(
                    "No apps unused for {} days were found.",
                    app.settings.threshold_days
                ),
                Style::default().fg(theme.success),
            )));
        }
        None => {
            text.push(Line::from(Span::styled(
                "No app matches the filter.",
                Style::default().fg(theme.fg_dim),
            )));
        }
    }

    let paragraph = Paragraph::new(text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Details")
                .border_style(Style::default().fg(theme.fg_dim)),
        )
        .wrap(Wrap { trim: true });

    frame.render_widget(paragraph, area);
}

fn render_message(frame: &mut Frame, app: &App, area: Rect, title: &str, lines: Vec<String>) {
    let theme = &app.theme;
    let text: Vec<Line> = lines
        .into_iter()
        .map(|line| Line::from(Span::styled(line, Style::default().fg(theme.fg))))
        .collect();

    let border_color = match app.view {
        View::UsageUnavailable => theme.warning,
        View::DeviceUnavailable(_) => theme.error,
        _ => theme.accent,
    };

    let paragraph = Paragraph::new(text)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title.to_string())
                .border_style(Style::default().fg(border_color)),
        )
        .wrap(Wrap { trim: true });

    frame.render_widget(paragraph, area);
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;

    let line = if let Some(status) = &app.status {
        Line::from(Span::styled(status.clone(), Style::default().fg(theme.success)))
    } else {
        let help_text = if app.search_mode {
            "[type] Filter  [↑↓] Navigate  [Enter] Keep  [Esc] Clear"
        } else {
            "[↑↓/jk] Navigate  [/] Search  [Enter] Uninstall  [r] Rescan  [i] Info  [q] Quit"
        };
        Line::from(Span::styled(help_text, Style::default().fg(theme.fg_dim)))
    };

    frame.render_widget(Paragraph::new(line), area);
}

/// A rectangle of `width` x `height` centred in `area`, clamped to fit.
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn render_confirm_dialog(frame: &mut Frame, app: &App, record: &AppRecord) {
    let theme = &app.theme;
    let area = centered_rect(60, 10, frame.area());

    let text = vec![
        Line::from(Span::styled(
            record.display_name.clone(),
            Style::default()
                .fg(theme.secondary)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            record.package_id.clone(),
            Style::default().fg(theme.fg_dim),
        )),
        Line::from(Span::styled(
            format!("Last used: {}", format_last_used(record.last_used_ms)),
            Style::default().fg(theme.fg),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("[y] Uninstall", Style::default().fg(theme.error)),
            Span::raw("    "),
            Span::styled("[n] Cancel", Style::default().fg(theme.fg_dim)),
        ]),
    ];

    let dialog = Paragraph::new(text)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("🗑  Uninstall app?")
                .border_style(Style::default().fg(theme.error))
                .style(Style::default().bg(theme.bg)),
        )
        .wrap(Wrap { trim: true });

    frame.render_widget(Clear, area);
    frame.render_widget(dialog, area);
}

fn render_info_modal(frame: &mut Frame, app: &App) {
    let theme = &app.theme;
    let area = centered_rect(64, 16, frame.area());

    let key = |k: &'static str, desc: &'static str| {
        Line::from(vec![
            Span::styled(format!("{k:>10}  "), Style::default().fg(theme.accent)),
            Span::styled(desc, Style::default().fg(theme.fg)),
        ])
    };

    let text = vec![
        Line::from(Span::styled(
            format!(
                "Apps not opened for {} days (history: {} days, {} mode).",
                app.settings.threshold_days, app.settings.history_days, app.settings.mode
            ),
            Style::default().fg(theme.fg),
        )),
        Line::from(Span::styled(
            "Last use is the later of the event log and the aggregated stats.",
            Style::default().fg(theme.fg_dim),
        )),
        Line::from(""),
        key("↑↓ / jk", "Move selection"),
        key("g / G", "First / last"),
        key("/", "Filter by name or package"),
        key("Enter / u", "Uninstall selected app"),
        key("r / F5", "Rescan"),
        key("i / Esc", "Close this help"),
        key("q", "Quit"),
    ];

    let modal = Paragraph::new(text).block(
        Block::default()
            .borders(Borders::ALL)
            .title("ℹ Info")
            .border_style(Style::default().fg(theme.accent))
            .style(Style::default().bg(theme.bg)),
    );

    frame.render_widget(Clear, area);
    frame.render_widget(modal, area);
}
