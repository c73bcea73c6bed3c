//! # Key Handling
//!
//! Maps key presses to [`App`] state changes. Anything that needs the device
//! comes back as an [`Action`] for the event loop to run, so this module has
//! no side effects beyond `App` itself.
//!
//! Modal precedence: confirmation dialog, then info modal, then search input,
//! then the normal list bindings.

use crate::ui::app::{Action, App};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

pub fn handle_key(app: &mut App, key: KeyEvent) -> Option<Action> {
    if key.kind == KeyEventKind::Release {
        return None;
    }

    // A status message lasts until the next key; the footer then shows help again
    app.status = None;

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return None;
    }

    if app.confirm.is_some() {
        return handle_confirm_key(app, key);
    }

    if app.show_info {
        if matches!(key.code, KeyCode::Char('i') | KeyCode::Esc) {
            app.toggle_info();
        }
        return None;
    }

    if app.search_mode {
        handle_search_key(app, key);
        return None;
    }

    handle_list_key(app, key)
}

fn handle_confirm_key(app: &mut App, key: KeyEvent) -> Option<Action> {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
            app.confirm_uninstall().map(Action::Uninstall)
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            app.cancel_confirm();
            None
        }
        _ => None,
    }
}

fn handle_search_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.exit_search_mode(false),
        KeyCode::Enter => app.exit_search_mode(true),
        KeyCode::Down => app.next(),
        KeyCode::Up => app.previous(),
        KeyCode::Backspace => app.search_pop_char(),
        KeyCode::Char(c) => app.search_push_char(c),
        _ => {}
    }
}

fn handle_list_key(app: &mut App, key: KeyEvent) -> Option<Action> {
    match key.code {
        KeyCode::Char('q') | KeyCode::Char('Q') => {
            app.should_quit = true;
        }
        KeyCode::Esc if !app.search_query.is_empty() => {
            app.exit_search_mode(false);
        }
        KeyCode::Char('i') => app.toggle_info(),
        KeyCode::Char('/') => app.enter_search_mode(),
        KeyCode::Down | KeyCode::Char('j') => app.next(),
        KeyCode::Up | KeyCode::Char('k') => app.previous(),
        KeyCode::Home | KeyCode::Char('g') => app.select_first(),
        KeyCode::End | KeyCode::Char('G') => app.select_last(),
        KeyCode::Char('r') | KeyCode::F(5) => {
            if app.begin_scan() {
                return Some(Action::Rescan);
            }
        }
        KeyCode::Enter | KeyCode::Char('u') | KeyCode::Char('d') | KeyCode::Delete => {
            app.open_confirm();
        }
        _ => {}
    }
    None
}
