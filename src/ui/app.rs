use crate::pages::{CachePolicy, ContentCache, ContentProvider, Page};
use crate::ui::layout::PaneLayout;
use crate::ui::viewport::Viewport;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent, MouseEventKind};
use ratatui::layout::Size;
use ratatui::text::Text;
use std::sync::Arc;
use tracing::debug;

/// Lines scrolled per mouse wheel notch.
const WHEEL_LINES: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusPane {
    PageList,
    Viewport,
}

/// What the caller should do after an event has been handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// State may have changed; draw a new frame.
    Redraw,
    /// The event was not meant for anything; the last frame is still current.
    Ignored,
    /// The user asked to leave.
    Quit,
}

/// Interaction state of one session.
///
/// Exactly one pane has focus and receives every event that is not a quit,
/// activate or back transition.
pub struct App {
    focus: FocusPane,
    cursor: Page,
    selected: Page,
    ready: bool,
    layout: PaneLayout,
    viewport: Viewport,
    cache: ContentCache,
    provider: Arc<dyn ContentProvider>,
    should_quit: bool,
}

impl App {
    /// Create the state for a new session and produce every cache-once page.
    pub fn new(provider: Arc<dyn ContentProvider>) -> Self {
        let layout = PaneLayout::compute(0, 0);
        let mut cache = ContentCache::new();
        cache.warm(provider.as_ref(), layout.viewport);

        Self {
            focus: FocusPane::PageList,
            cursor: Page::LANDING,
            selected: Page::LANDING,
            ready: false,
            layout,
            viewport: Viewport::new(layout.viewport.height),
            cache,
            provider,
            should_quit: false,
        }
    }

    pub fn focus(&self) -> FocusPane {
        self.focus
    }

    /// Page under the list cursor.
    pub fn cursor(&self) -> Page {
        self.cursor
    }

    /// Page currently shown in the viewport.
    pub fn selected(&self) -> Page {
        self.selected
    }

    /// Whether the first resize has been seen.
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn layout(&self) -> PaneLayout {
        self.layout
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn cache(&self) -> &ContentCache {
        &self.cache
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Content of `page` at the current viewport size, through the session cache.
    pub fn content(&mut self, page: Page) -> Text<'static> {
        let viewport = self.viewport_size();
        self.cache.resolve(self.provider.as_ref(), page, viewport)
    }

    fn viewport_size(&self) -> Size {
        self.layout.viewport
    }

    pub fn handle_event(&mut self, event: &Event) -> Action {
        match event {
            Event::Key(key) if key.kind != KeyEventKind::Release => self.handle_key(*key),
            Event::Resize(width, height) => {
                self.resize(*width, *height);
                Action::Redraw
            }
            Event::Mouse(mouse) => self.handle_mouse(*mouse),
            _ => Action::Ignored,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Action {
        if is_quit(&key) {
            debug!("quit requested");
            self.should_quit = true;
            return Action::Quit;
        }

        match (self.focus, key.code) {
            (FocusPane::PageList, KeyCode::Enter | KeyCode::Right) => {
                self.activate();
                Action::Redraw
            }
            (FocusPane::Viewport, KeyCode::Left) => {
                self.focus = FocusPane::PageList;
                debug!(page = ?self.selected, "focus returned to page list");
                Action::Redraw
            }
            (FocusPane::PageList, _) => self.handle_list_key(key),
            (FocusPane::Viewport, _) => self.handle_viewport_key(key),
        }
    }

    /// Apply a new terminal size.
    ///
    /// The first call initializes the viewport with the selected page (the
    /// landing page unless something was activated earlier). Later calls only
    /// update dimensions, re-producing the shown page if it is laid out
    /// against the viewport size.
    pub fn resize(&mut self, width: u16, height: u16) -> PaneLayout {
        self.layout = PaneLayout::compute(width, height);
        self.viewport.set_height(self.layout.viewport.height);

        if !self.ready {
            self.ready = true;
            let content = self.content(self.selected);
            self.viewport.set_content(content);
            debug!(width, height, "layout initialized");
        } else if self.selected.policy() == CachePolicy::Recompute {
            let content = self.content(self.selected);
            self.viewport.refresh_content(content);
        }

        self.layout
    }

    /// Show the page under the cursor and move focus to the viewport.
    fn activate(&mut self) {
        self.selected = self.cursor;
        let content = self.content(self.selected);
        self.viewport.set_content(content);
        self.focus = FocusPane::Viewport;
        debug!(page = ?self.selected, "page activated");
    }

    fn handle_list_key(&mut self, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.cursor_previous(),
            KeyCode::Down | KeyCode::Char('j') => self.cursor_next(),
            KeyCode::Home | KeyCode::Char('g') => self.cursor = Page::ALL[0],
            KeyCode::End | KeyCode::Char('G') => self.cursor = Page::ALL[Page::ALL.len() - 1],
            _ => return Action::Ignored,
        }
        Action::Redraw
    }

    fn handle_viewport_key(&mut self, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.viewport.scroll_up(1),
            KeyCode::Down | KeyCode::Char('j') => self.viewport.scroll_down(1),
            KeyCode::PageUp | KeyCode::Char('b') => self.viewport.page_up(),
            KeyCode::PageDown | KeyCode::Char('f' | ' ') => self.viewport.page_down(),
            KeyCode::Char('u') => self.viewport.half_page_up(),
            KeyCode::Char('d') => self.viewport.half_page_down(),
            KeyCode::Home | KeyCode::Char('g') => self.viewport.goto_top(),
            KeyCode::End | KeyCode::Char('G') => self.viewport.goto_bottom(),
            _ => return Action::Ignored,
        }
        Action::Redraw
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) -> Action {
        match (self.focus, mouse.kind) {
            (FocusPane::PageList, MouseEventKind::ScrollUp) => self.cursor_previous(),
            (FocusPane::PageList, MouseEventKind::ScrollDown) => self.cursor_next(),
            (FocusPane::Viewport, MouseEventKind::ScrollUp) => self.viewport.scroll_up(WHEEL_LINES),
            (FocusPane::Viewport, MouseEventKind::ScrollDown) => {
                self.viewport.scroll_down(WHEEL_LINES);
            }
            _ => return Action::Ignored,
        }
        Action::Redraw
    }

    fn cursor_previous(&mut self) {
        if let Some(page) = self.cursor.index().checked_sub(1).and_then(Page::from_index) {
            self.cursor = page;
        }
    }

    fn cursor_next(&mut self) {
        if let Some(page) = Page::from_index(self.cursor.index() + 1) {
            self.cursor = page;
        }
    }
}

fn is_quit(key: &KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('q' | 'Q') => !key.modifiers.contains(KeyModifiers::CONTROL),
        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}
