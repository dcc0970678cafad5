//! One client connection, from handshake to teardown.
//!
//! The session loop here is shared by every transport. A transport only
//! turns its wire format into [`Input`] and carries frames back; key decoding,
//! the initial-size fallback, the idle timeout and frame batching live in
//! [`host_session`].

use super::input::InputDecoder;
use super::telnet::{self, TelnetChunk, TelnetParser};
use crate::error::Result;
use crate::session::{
    frame::{INITIAL_HEIGHT, INITIAL_WIDTH},
    EventOutcome, RenderedFrame, SessionController, SessionHandle,
};
use crossterm::cursor::{Hide, Show};
use crossterm::event::{DisableMouseCapture, EnableMouseCapture, Event};
use crossterm::queue;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, ReadHalf, WriteHalf};
use tokio::time::{sleep, sleep_until, Instant};
use tracing::{debug, info, warn};

const READ_BUFFER: usize = 4096;

/// How long a lone ESC waits for the rest of an escape sequence before it
/// counts as the Escape key.
const ESCAPE_TIMEOUT: Duration = Duration::from_millis(50);

/// Sent to clients turned away because the server is full.
pub const BUSY_NOTICE: &[u8] = b"\r\nToo many visitors right now. Please try again later.\r\n";

/// Per-connection timing knobs.
#[derive(Debug, Clone)]
pub struct ConnectionSettings {
    pub idle_timeout: Option<Duration>,
    pub initial_size_timeout: Duration,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            idle_timeout: None,
            initial_size_timeout: Duration::from_millis(500),
        }
    }
}

/// Why a session loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disconnect {
    Quit,
    Closed,
    Idle,
    /// The SSH client opened a shell without a PTY.
    NoPty,
}

/// Raw input from a transport, before key decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// Terminal bytes typed by the client.
    Bytes(Vec<u8>),
    /// The client's window is now `width` x `height`.
    Resize(u16, u16),
}

/// A client link the session loop reads input from and writes frames to.
pub(crate) trait Transport {
    /// Next batch of input. `None` once the client is gone.
    ///
    /// Must be cancel safe: the session loop polls it inside `select!`.
    async fn recv(&mut self) -> Result<Option<Vec<Input>>>;

    async fn send(&mut self, bytes: &[u8]) -> Result<()>;
}

/// Escape sequences that prepare the client's terminal.
pub fn terminal_setup() -> std::io::Result<Vec<u8>> {
    let mut out = Vec::new();
    queue!(out, EnterAlternateScreen, EnableMouseCapture, Hide)?;
    Ok(out)
}

/// Escape sequences that undo [`terminal_setup`].
pub fn terminal_restore() -> std::io::Result<Vec<u8>> {
    let mut out = Vec::new();
    queue!(out, Show, DisableMouseCapture, LeaveAlternateScreen)?;
    Ok(out)
}

/// Run one session over `transport` until the client quits, disconnects or
/// idles out.
///
/// `greeting` goes out before the terminal setup and the first frame. The
/// session is always torn down through [`SessionController::on_disconnect`],
/// including on error.
pub(crate) async fn host_session<T: Transport>(
    transport: &mut T,
    greeting: Vec<u8>,
    controller: &SessionController,
    settings: &ConnectionSettings,
) -> Result<Disconnect> {
    let mut handle = controller.on_connect()?;
    tracing::Span::current().record("session", tracing::field::display(handle.id()));

    let result = drive(transport, greeting, controller, &mut handle, settings).await;

    match &result {
        Ok(reason) => info!(?reason, "connection finished"),
        Err(e) => warn!(error = %e, "connection failed"),
    }

    // Best effort: the peer may already be gone.
    if let Ok(restore) = terminal_restore() {
        let _ = transport.send(&restore).await;
    }

    controller.on_disconnect(handle);
    result
}

async fn drive<T: Transport>(
    transport: &mut T,
    greeting: Vec<u8>,
    controller: &SessionController,
    handle: &mut SessionHandle,
    settings: &ConnectionSettings,
) -> Result<Disconnect> {
    let mut opening = greeting;
    opening.extend(terminal_setup()?);
    opening.extend_from_slice(controller.render(handle)?.as_bytes());
    transport.send(&opening).await?;

    let mut decoder = InputDecoder::new();
    let size_deadline = Instant::now() + settings.initial_size_timeout;
    let mut idle_deadline = settings.idle_timeout.map(|idle| Instant::now() + idle);

    loop {
        let mut events = Vec::new();

        tokio::select! {
            received = transport.recv() => {
                let Some(inputs) = received? else {
                    return Ok(Disconnect::Closed);
                };
                idle_deadline = settings.idle_timeout.map(|idle| Instant::now() + idle);

                for input in inputs {
                    match input {
                        Input::Bytes(bytes) => events.extend(decoder.feed(&bytes)),
                        Input::Resize(width, height) => events.push(Event::Resize(width, height)),
                    }
                }
            }
            () = sleep(ESCAPE_TIMEOUT), if decoder.waiting_on_escape() => {
                events.extend(decoder.flush());
            }
            () = sleep_until(size_deadline), if !handle.is_ready() => {
                debug!("no window size reported, assuming {INITIAL_WIDTH}x{INITIAL_HEIGHT}");
                events.push(Event::Resize(INITIAL_WIDTH, INITIAL_HEIGHT));
            }
            () = idle_expired(idle_deadline) => {
                return Ok(Disconnect::Idle);
            }
        }

        // Frames are complete screens, so only the newest one of a batch
        // needs to go out.
        let mut latest: Option<RenderedFrame> = None;
        for event in &events {
            match controller.on_event(handle, event)? {
                EventOutcome::Frame(frame) => latest = Some(frame),
                EventOutcome::Unchanged => {}
                EventOutcome::Quit => return Ok(Disconnect::Quit),
            }
        }

        if let Some(frame) = latest {
            transport.send(frame.as_bytes()).await?;
        }
    }
}

async fn idle_expired(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

/// Telnet over any byte stream: IAC commands are stripped, NAWS reports
/// become resizes.
struct TelnetLink<S> {
    reader: ReadHalf<S>,
    writer: WriteHalf<S>,
    parser: TelnetParser,
    buf: Vec<u8>,
}

impl<S: AsyncRead + AsyncWrite> TelnetLink<S> {
    fn new(stream: S) -> Self {
        let (reader, writer) = tokio::io::split(stream);
        Self {
            reader,
            writer,
            parser: TelnetParser::new(),
            buf: vec![0u8; READ_BUFFER],
        }
    }
}

impl<S: AsyncRead + AsyncWrite> Transport for TelnetLink<S> {
    async fn recv(&mut self) -> Result<Option<Vec<Input>>> {
        let n = self.reader.read(&mut self.buf).await?;
        if n == 0 {
            return Ok(None);
        }
        let inputs = self
            .parser
            .feed(&self.buf[..n])
            .into_iter()
            .map(|chunk| match chunk {
                TelnetChunk::Data(bytes) => Input::Bytes(bytes),
                TelnetChunk::WindowSize { width, height } => Input::Resize(width, height),
            })
            .collect();
        Ok(Some(inputs))
    }

    async fn send(&mut self, bytes: &[u8]) -> Result<()> {
        self.writer.write_all(bytes).await?;
        self.writer.flush().await?;
        Ok(())
    }
}

/// Serve a Telnet client on `stream`.
pub async fn serve_telnet<S>(
    stream: S,
    controller: &SessionController,
    settings: &ConnectionSettings,
) -> Result<Disconnect>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut link = TelnetLink::new(stream);
    let result = host_session(&mut link, telnet::negotiation(), controller, settings).await;
    let _ = link.writer.shutdown().await;
    result
}
