//! Pane geometry.
//!
//! ```text
//!  ╭──────────╮ ╭──────────────────────────╮
//!  │ list     │ │  viewport                │
//!  │ 24%      │ │  65%                     │
//!  ╰──────────╯ ╰──────────────────────────╯
//! ```
//!
//! Widths are percentages of the terminal width; whatever is left over is
//! margin, border and padding. Both panes lose [`FRAME_ROWS`] rows to the
//! top margin, bottom margin and borders.

use ratatui::layout::{Rect, Size};

/// Terminal sizes below this are treated as this size.
pub const MIN_WIDTH: u16 = 20;
pub const MIN_HEIGHT: u16 = 8;

/// Largest terminal a session will render. Reported sizes beyond this are
/// cut down to it, since every cell of a frame is allocated up front.
pub const MAX_WIDTH: u16 = 500;
pub const MAX_HEIGHT: u16 = 200;

pub const LIST_PERCENT: u32 = 24;
pub const VIEWPORT_PERCENT: u32 = 65;

/// Rows taken by the vertical margin and borders around a pane.
pub const FRAME_ROWS: u16 = 4;

/// Margin to the left of the list pane and above both panes.
const MARGIN: u16 = 1;
/// Horizontal padding inside the viewport border.
const VIEWPORT_PADDING: u16 = 1;

/// Content dimensions of both panes, excluding borders and padding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaneLayout {
    pub list: Size,
    pub viewport: Size,
}

impl PaneLayout {
    /// Compute pane sizes for a terminal of `width` x `height` cells.
    ///
    /// Dimensions are clamped to [`MIN_WIDTH`] x [`MIN_HEIGHT`] and
    /// [`MAX_WIDTH`] x [`MAX_HEIGHT`] before any percentage math, so
    /// degenerate sizes still produce a usable layout.
    pub fn compute(width: u16, height: u16) -> Self {
        let width = u32::from(width.clamp(MIN_WIDTH, MAX_WIDTH));
        let height = height.clamp(MIN_HEIGHT, MAX_HEIGHT);
        let pane_height = height - FRAME_ROWS;

        Self {
            list: Size::new(percent_of(width, LIST_PERCENT), pane_height),
            viewport: Size::new(percent_of(width, VIEWPORT_PERCENT), pane_height),
        }
    }

    /// Bordered area of the list pane.
    pub fn list_area(&self) -> Rect {
        Rect::new(
            MARGIN,
            MARGIN,
            self.list.width.saturating_add(2),
            self.list.height.saturating_add(2),
        )
    }

    /// Bordered area of the viewport pane, including its padding.
    pub fn viewport_area(&self) -> Rect {
        let list = self.list_area();
        Rect::new(
            list.right().saturating_add(MARGIN),
            MARGIN,
            self.viewport
                .width
                .saturating_add(2 + 2 * VIEWPORT_PADDING),
            self.viewport.height.saturating_add(2),
        )
    }
}

/// Cut a reported terminal size down to [`MAX_WIDTH`] x [`MAX_HEIGHT`].
///
/// Small sizes pass through unchanged; only the layout math clamps those.
pub fn bounded(width: u16, height: u16) -> (u16, u16) {
    (width.min(MAX_WIDTH), height.min(MAX_HEIGHT))
}

fn percent_of(total: u32, percent: u32) -> u16 {
    // total <= u16::MAX and percent <= 100, so this fits
    u16::try_from(total * percent / 100).unwrap_or(u16::MAX)
}
