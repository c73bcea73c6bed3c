//! # UI Module
//!
//! The terminal user interface: state, key handling, rendering, themes and
//! user configuration.
//!
//! ## Components
//!
//! - [`App`] - Application state (scan result, selection, search, dialogs)
//! - [`mod@input`] - Key handling, returning [`Action`]s for the event loop
//! - [`mod@render`] - Drawing functions
//!
//! ## Layout
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │  Header (device, threshold, mode)               │
//! ├─────────────────────────────────────────────────┤
//! │  Search                                         │
//! ├────────────────────────────┬────────────────────┤
//! │                            │                    │
//! │   Unused apps              │   Details          │
//! │   (oldest first)           │                    │
//! │                            │                    │
//! ├────────────────────────────┴────────────────────┤
//! │  Footer / status                                │
//! └─────────────────────────────────────────────────┘
//! ```

pub mod app;
pub mod config;
pub mod input;
pub mod render;
pub mod theme;

pub use app::{Action, App, UninstallRequest, View};
pub use input::handle_key;
pub use render::render;
