//! # UI Module
//!
//! Per-session interaction state and drawing.
//!
//! ## Components
//!
//! - [`App`] - focus/navigation state machine for one session
//! - [`layout`] - pane geometry derived from the terminal size
//! - [`viewport`] - scroll state of the content pane
//! - [`mod@render`] - draws an [`App`] into a ratatui frame
//! - [`theme`] - immutable color themes
//!
//! ## Layout
//!
//! ```text
//! ┌──────────────┬──────────────────────────────────┐
//! │              │                                  │
//! │  Page List   │          Viewport                │
//! │  (Home,      │   (content of the selected       │
//! │   About...)  │    page, scrollable)             │
//! │              │                                  │
//! └──────────────┴──────────────────────────────────┘
//! ```
//!
//! ## Keys
//!
//! - `Enter` / `Right` on the list - show the page and focus the viewport
//! - `Left` in the viewport - return to the list
//! - `q` / `Q` / `Ctrl+C` - quit
//! - anything else goes to the focused pane only

pub mod app;
pub mod layout;
pub mod render;
pub mod theme;
pub mod viewport;

pub use app::{Action, App, FocusPane};
pub use layout::PaneLayout;
pub use render::render;
pub use theme::Theme;
