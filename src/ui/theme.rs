//! # Theme System
//!
//! Colors for the TUI, grouped by semantic role so rendering code never
//! hardcodes `ratatui::style::Color` values.
//!
//! ## Built-in Themes
//!
//! - **Catppuccin Mocha** (default)
//! - **Dracula**
//! - **Nord**
//! - **Gruvbox Dark**
//!
//! The active theme is chosen by name from the config file or `--theme`.

use ratatui::style::Color;

/// All colors used by the TUI.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Human-readable name, matched case-insensitively.
    pub name: &'static str,

    /// Main background for panels and modals.
    pub bg: Color,

    /// Primary text.
    pub fg: Color,
    /// Secondary text (hints, footer, package ids).
    pub fg_dim: Color,

    /// Branding, focused borders, selected-row background.
    pub accent: Color,
    /// Search text and highlighted names.
    pub secondary: Color,

    pub success: Color,
    /// Errors and the uninstall button.
    pub error: Color,
    /// "Never used" entries and degraded-data banners.
    pub warning: Color,

    /// Background of the selected row when the list is not focused.
    pub selection_bg: Color,
}

impl Theme {
    /// All built-in themes, default first.
    pub fn all() -> &'static [Theme] {
        &BUILT_IN_THEMES
    }

    pub fn by_name(name: &str) -> Option<&'static Theme> {
        BUILT_IN_THEMES
            .iter()
            .find(|t| t.name.eq_ignore_ascii_case(name))
    }

    pub fn default_theme() -> &'static Theme {
        &BUILT_IN_THEMES[0]
    }

    /// Resolve a configured name, falling back to the default theme.
    pub fn resolve(name: &str) -> &'static Theme {
        Self::by_name(name).unwrap_or_else(Self::default_theme)
    }
}

static BUILT_IN_THEMES: [Theme; 4] = [
    Theme {
        name: "Catppuccin Mocha",
        bg: Color::Rgb(30, 30, 46),           // base
        fg: Color::Rgb(205, 214, 244),        // text
        fg_dim: Color::Rgb(108, 112, 134),    // overlay0
        accent: Color::Rgb(137, 180, 250),    // blue
        secondary: Color::Rgb(249, 226, 175), // yellow
        success: Color::Rgb(166, 227, 161),   // green
        error: Color::Rgb(243, 139, 168),     // red
        warning: Color::Rgb(250, 179, 135),   // peach
        selection_bg: Color::Rgb(69, 71, 90), // surface1
    },
    Theme {
        name: "Dracula",
        bg: Color::Rgb(40, 42, 54),
        fg: Color::Rgb(248, 248, 242),
        fg_dim: Color::Rgb(98, 114, 164),
        accent: Color::Rgb(139, 233, 253),    // cyan
        secondary: Color::Rgb(241, 250, 140), // yellow
        success: Color::Rgb(80, 250, 123),
        error: Color::Rgb(255, 85, 85),
        warning: Color::Rgb(255, 184, 108), // orange
        selection_bg: Color::Rgb(68, 71, 90),
    },
    Theme {
        name: "Nord",
        bg: Color::Rgb(46, 52, 64),
        fg: Color::Rgb(216, 222, 233),
        fg_dim: Color::Rgb(76, 86, 106),
        accent: Color::Rgb(136, 192, 208),    // frost
        secondary: Color::Rgb(235, 203, 139), // yellow
        success: Color::Rgb(163, 190, 140),
        error: Color::Rgb(191, 97, 106),
        warning: Color::Rgb(208, 135, 112), // aurora orange
        selection_bg: Color::Rgb(67, 76, 94),
    },
    Theme {
        name: "Gruvbox Dark",
        bg: Color::Rgb(40, 40, 40),
        fg: Color::Rgb(235, 219, 178),
        fg_dim: Color::Rgb(146, 131, 116),
        accent: Color::Rgb(131, 165, 152),   // blue
        secondary: Color::Rgb(250, 189, 47), // yellow
        success: Color::Rgb(184, 187, 38),
        error: Color::Rgb(251, 73, 52),
        warning: Color::Rgb(254, 128, 25), // orange
        selection_bg: Color::Rgb(80, 73, 69),
    },
];
