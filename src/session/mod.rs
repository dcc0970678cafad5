//! # Sessions
//!
//! One [`SessionHandle`] per connection. The handle owns everything mutable
//! about that connection: the [`App`] state machine, its content cache and
//! its frame renderer. The [`SessionController`] holds only the immutable
//! pieces shared by every connection (the theme and the content provider), so
//! sessions never observe each other.
//!
//! The transport drives a session through three hooks:
//!
//! 1. [`SessionController::on_connect`] when a connection is accepted
//! 2. [`SessionController::on_event`] for every decoded input event
//! 3. [`SessionController::on_disconnect`] when the connection goes away

pub mod frame;

pub use frame::{FrameRenderer, RenderedFrame};

use crate::error::Result;
use crate::pages::{ContentProvider, PortfolioContent};
use crate::ui::{layout, Action, App, Theme};
use crossterm::event::Event;
use frame::{INITIAL_HEIGHT, INITIAL_WIDTH};
use ratatui::layout::Rect;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, trace};
use uuid::Uuid;

/// Result of feeding one event to a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventOutcome {
    /// Send this frame to the client.
    Frame(RenderedFrame),
    /// Nothing changed; the client's screen is still current.
    Unchanged,
    /// The session is over; close the connection.
    Quit,
}

/// All state belonging to one connection.
pub struct SessionHandle {
    id: Uuid,
    app: App,
    renderer: FrameRenderer,
    opened_at: Instant,
    events: u64,
}

impl SessionHandle {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn app(&self) -> &App {
        &self.app
    }

    pub fn is_ready(&self) -> bool {
        self.app.is_ready()
    }

    /// Number of events delivered so far.
    pub fn events(&self) -> u64 {
        self.events
    }

    /// Area of the frames currently being rendered.
    pub fn screen(&self) -> Rect {
        self.renderer.area()
    }
}

/// Creates sessions and routes events to them.
pub struct SessionController {
    theme: &'static Theme,
    provider: Arc<dyn ContentProvider>,
}

impl SessionController {
    pub fn new(theme: &'static Theme, provider: Arc<dyn ContentProvider>) -> Self {
        Self { theme, provider }
    }

    /// Controller serving the built-in portfolio pages.
    pub fn with_portfolio(theme: &'static Theme) -> Self {
        Self::new(theme, Arc::new(PortfolioContent::new(theme)))
    }

    pub fn on_connect(&self) -> Result<SessionHandle> {
        let handle = SessionHandle {
            id: Uuid::new_v4(),
            app: App::new(Arc::clone(&self.provider)),
            renderer: FrameRenderer::new(INITIAL_WIDTH, INITIAL_HEIGHT)?,
            opened_at: Instant::now(),
            events: 0,
        };
        info!(session = %handle.id, "session opened");
        Ok(handle)
    }

    /// Feed one event to the session that owns `handle`.
    ///
    /// Events the session has no use for produce [`EventOutcome::Unchanged`].
    /// An error means the frame could not be produced and the connection
    /// should be dropped.
    pub fn on_event(&self, handle: &mut SessionHandle, event: &Event) -> Result<EventOutcome> {
        handle.events += 1;

        let bounded_resize;
        let event = match event {
            Event::Resize(width, height) => {
                let (width, height) = layout::bounded(*width, *height);
                bounded_resize = Event::Resize(width, height);
                &bounded_resize
            }
            other => other,
        };

        match handle.app.handle_event(event) {
            Action::Quit => Ok(EventOutcome::Quit),
            Action::Ignored => {
                trace!(session = %handle.id, ?event, "event ignored");
                Ok(EventOutcome::Unchanged)
            }
            Action::Redraw => {
                if let Event::Resize(width, height) = event {
                    debug!(session = %handle.id, width, height, "terminal resized");
                    handle.renderer.resize(*width, *height)?;
                }
                self.render(handle).map(EventOutcome::Frame)
            }
        }
    }

    /// Draw the session's current state.
    pub fn render(&self, handle: &mut SessionHandle) -> Result<RenderedFrame> {
        handle.renderer.draw(&handle.app, self.theme)
    }

    /// Tear down a session. All of its state is dropped here.
    pub fn on_disconnect(&self, handle: SessionHandle) {
        info!(
            session = %handle.id,
            events = handle.events,
            duration_ms = u64::try_from(handle.opened_at.elapsed().as_millis()).unwrap_or(u64::MAX),
            "session closed"
        );
        drop(handle);
    }
}
