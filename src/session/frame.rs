//! Turning an [`App`] into a complete ANSI frame.
//!
//! Each session owns a ratatui terminal with a fixed viewport whose backend
//! writes into an in-memory sink instead of a tty. Every draw starts by
//! clearing the whole viewport, so a frame never depends on the one before it.

use crate::error::{Error, Result};
use crate::ui::layout::bounded;
use crate::ui::{render, App, Theme};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use ratatui::{Terminal, TerminalOptions, Viewport};
use std::borrow::Cow;
use std::io::{self, Write};
use std::sync::{Arc, Mutex, PoisonError};

/// Size assumed until the client reports its own.
pub const INITIAL_WIDTH: u16 = 80;
pub const INITIAL_HEIGHT: u16 = 24;

/// One complete rendered screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFrame {
    bytes: Vec<u8>,
}

impl RenderedFrame {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Lossy text view of the frame, escape sequences included.
    pub fn to_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.bytes)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Shared byte buffer the crossterm backend writes into.
#[derive(Debug, Clone, Default)]
struct FrameSink {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl FrameSink {
    fn take(&self) -> Vec<u8> {
        let mut buf = self.buf.lock().unwrap_or_else(PoisonError::into_inner);
        std::mem::take(&mut *buf)
    }
}

impl Write for FrameSink {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        let mut buf = self.buf.lock().unwrap_or_else(PoisonError::into_inner);
        buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Per-session terminal that renders into memory.
pub struct FrameRenderer {
    terminal: Terminal<CrosstermBackend<FrameSink>>,
    sink: FrameSink,
    area: Rect,
}

impl FrameRenderer {
    pub fn new(width: u16, height: u16) -> Result<Self> {
        let area = Rect::new(0, 0, width, height);
        let sink = FrameSink::default();
        let backend = CrosstermBackend::new(sink.clone());
        let terminal = Terminal::with_options(
            backend,
            TerminalOptions {
                viewport: Viewport::Fixed(area),
            },
        )?;
        Ok(Self {
            terminal,
            sink,
            area,
        })
    }

    /// Match the client's terminal size. Zero sizes are allowed; sizes past
    /// the layout maximum are cut down to it.
    pub fn resize(&mut self, width: u16, height: u16) -> Result<()> {
        let (width, height) = bounded(width, height);
        self.area = Rect::new(0, 0, width, height);
        self.terminal.resize(self.area)?;
        Ok(())
    }

    pub fn area(&self) -> Rect {
        self.area
    }

    pub fn draw(&mut self, app: &App, theme: &Theme) -> Result<RenderedFrame> {
        // drop output produced outside a draw (resize clears)
        self.sink.take();
        let area = self.area;
        let drawn = self.terminal.clear().and_then(|()| {
            self.terminal.draw(|frame| render(frame, app, theme))?;
            Ok(())
        });
        drawn.map_err(|e| Error::render(format!("{}x{} frame: {}", area.width, area.height, e)))?;
        Ok(RenderedFrame {
            bytes: self.sink.take(),
        })
    }
}
