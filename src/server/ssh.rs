//! # SSH transport
//!
//! Every accepted TCP connection is handed to russh, which runs the SSH
//! protocol. [`SshHandler`] forwards what the client does on its session
//! channel into the session loop: the PTY size, window changes and typed
//! bytes. Frames go back out through the connection's [`Handle`].
//!
//! Any username is accepted without credentials. Only one session channel is
//! served per connection, and a client that asks for a shell without a PTY is
//! told so and disconnected.

use super::connection::{host_session, ConnectionSettings, Disconnect, Input, Transport};
use crate::error::{Error, Result};
use crate::session::SessionController;
use rand_core::OsRng;
use russh::keys::ssh_key::LineEnding;
use russh::keys::{Algorithm, PrivateKey};
use russh::server::{Auth, Handle, Msg, Session};
use russh::{Channel, ChannelId, CryptoVec, Pty};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tracing::{debug, info};

/// How long to wait for the client to hang up after the channel is closed.
const CLOSE_GRACE: Duration = Duration::from_secs(2);

/// Sent to clients that open a shell without a terminal.
pub const NO_PTY_NOTICE: &[u8] = b"Requires an active PTY\r\n";

/// Load the host key at `path`, or create an Ed25519 key there if the file
/// does not exist yet.
pub fn load_or_generate_host_key(path: &Path) -> Result<PrivateKey> {
    if path.exists() {
        return russh::keys::load_secret_key(path, None)
            .map_err(|e| Error::host_key(path, e.to_string()));
    }

    let key = PrivateKey::random(&mut OsRng, Algorithm::Ed25519)
        .map_err(|e| Error::host_key(path, e.to_string()))?;
    let encoded = key
        .to_openssh(LineEnding::LF)
        .map_err(|e| Error::host_key(path, e.to_string()))?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, encoded.as_bytes())?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    }

    info!(path = %path.display(), "generated host key");
    Ok(key)
}

/// russh server settings for a host key.
pub fn ssh_config(key: PrivateKey, settings: &ConnectionSettings) -> russh::server::Config {
    russh::server::Config {
        inactivity_timeout: settings.idle_timeout,
        auth_rejection_time: Duration::from_secs(1),
        auth_rejection_time_initial: Some(Duration::ZERO),
        keys: vec![key],
        ..Default::default()
    }
}

/// What the protocol side tells the session side.
///
/// The queue between the two is unbounded: the session loop may be waiting
/// on the protocol side to take a frame, so the protocol side must never wait
/// on the session loop.
enum Inbound {
    Opened(ChannelId, Handle),
    Pty { width: u16, height: u16 },
    Shell,
    Input(Input),
    Eof,
}

/// Clamp a 32-bit SSH dimension into a terminal size.
fn cells(value: u32) -> u16 {
    u16::try_from(value).unwrap_or(u16::MAX)
}

/// Per-connection russh handler.
pub struct SshHandler {
    inbound: mpsc::UnboundedSender<Inbound>,
    channel: Option<ChannelId>,
}

impl SshHandler {
    fn new(inbound: mpsc::UnboundedSender<Inbound>) -> Self {
        Self {
            inbound,
            channel: None,
        }
    }

    fn owns(&self, channel: ChannelId) -> bool {
        self.channel == Some(channel)
    }

    fn forward(&self, message: Inbound) {
        // The session loop may already be done with this connection.
        let _ = self.inbound.send(message);
    }
}

impl russh::server::Handler for SshHandler {
    type Error = Error;

    async fn auth_none(&mut self, user: &str) -> Result<Auth> {
        debug!(user, "login");
        Ok(Auth::Accept)
    }

    async fn channel_open_session(
        &mut self,
        channel: Channel<Msg>,
        session: &mut Session,
    ) -> Result<bool> {
        if self.channel.is_some() {
            debug!("refusing a second session channel");
            return Ok(false);
        }
        let id = channel.id();
        self.channel = Some(id);
        self.forward(Inbound::Opened(id, session.handle()));
        Ok(true)
    }

    async fn pty_request(
        &mut self,
        channel: ChannelId,
        term: &str,
        col_width: u32,
        row_height: u32,
        _pix_width: u32,
        _pix_height: u32,
        _modes: &[(Pty, u32)],
        session: &mut Session,
    ) -> Result<()> {
        if !self.owns(channel) {
            session.channel_failure(channel)?;
            return Ok(());
        }
        debug!(term, col_width, row_height, "pty requested");
        self.forward(Inbound::Pty {
            width: cells(col_width),
            height: cells(row_height),
        });
        session.channel_success(channel)?;
        Ok(())
    }

    async fn shell_request(&mut self, channel: ChannelId, session: &mut Session) -> Result<()> {
        if !self.owns(channel) {
            session.channel_failure(channel)?;
            return Ok(());
        }
        self.forward(Inbound::Shell);
        session.channel_success(channel)?;
        Ok(())
    }

    async fn data(&mut self, channel: ChannelId, data: &[u8], _session: &mut Session) -> Result<()> {
        if self.owns(channel) {
            self.forward(Inbound::Input(Input::Bytes(data.to_vec())));
        }
        Ok(())
    }

    async fn window_change_request(
        &mut self,
        channel: ChannelId,
        col_width: u32,
        row_height: u32,
        _pix_width: u32,
        _pix_height: u32,
        _session: &mut Session,
    ) -> Result<()> {
        if self.owns(channel) {
            self.forward(Inbound::Input(Input::Resize(cells(col_width), cells(row_height))));
        }
        Ok(())
    }

    async fn channel_eof(&mut self, channel: ChannelId, _session: &mut Session) -> Result<()> {
        if self.owns(channel) {
            self.forward(Inbound::Eof);
        }
        Ok(())
    }

    async fn channel_close(&mut self, channel: ChannelId, _session: &mut Session) -> Result<()> {
        if self.owns(channel) {
            self.forward(Inbound::Eof);
        }
        Ok(())
    }
}

/// Inbound messages turned into input batches for the session loop.
struct InboundQueue {
    messages: mpsc::UnboundedReceiver<Inbound>,
    queued: Vec<Input>,
    closed: bool,
}

impl InboundQueue {
    fn new(messages: mpsc::UnboundedReceiver<Inbound>) -> Self {
        Self {
            messages,
            queued: Vec::new(),
            closed: false,
        }
    }

    /// Wait for the client's shell request.
    ///
    /// Returns the channel and whether a PTY was granted first, or `None` if
    /// the client left before asking for a shell.
    async fn wait_for_shell(&mut self) -> Option<(ChannelId, Handle, bool)> {
        let mut opened = None;
        let mut pty = false;
        loop {
            match self.messages.recv().await? {
                Inbound::Opened(id, handle) => opened = Some((id, handle)),
                Inbound::Pty { width, height } => {
                    pty = true;
                    self.queued.push(Input::Resize(width, height));
                }
                Inbound::Input(input) => self.queued.push(input),
                Inbound::Shell => {
                    let (id, handle) = opened?;
                    return Some((id, handle, pty));
                }
                Inbound::Eof => return None,
            }
        }
    }

    /// Everything that has arrived, waiting for at least one message.
    async fn next_batch(&mut self) -> Option<Vec<Input>> {
        if !self.queued.is_empty() {
            return Some(std::mem::take(&mut self.queued));
        }
        if self.closed {
            return None;
        }

        let mut next = self.messages.recv().await;
        loop {
            match next {
                None | Some(Inbound::Eof) => {
                    self.closed = true;
                    break;
                }
                Some(Inbound::Input(input)) => self.queued.push(input),
                Some(Inbound::Pty { width, height }) => self.queued.push(Input::Resize(width, height)),
                Some(Inbound::Opened(..) | Inbound::Shell) => {}
            }
            match self.messages.try_recv() {
                Ok(message) => next = Some(message),
                Err(_) => break,
            }
        }

        if self.queued.is_empty() && self.closed {
            None
        } else {
            Some(std::mem::take(&mut self.queued))
        }
    }
}

/// The session channel of one SSH connection.
struct SshLink {
    inbound: InboundQueue,
    handle: Handle,
    channel: ChannelId,
}

impl Transport for SshLink {
    async fn recv(&mut self) -> Result<Option<Vec<Input>>> {
        Ok(self.inbound.next_batch().await)
    }

    async fn send(&mut self, bytes: &[u8]) -> Result<()> {
        self.handle
            .data(self.channel, CryptoVec::from_slice(bytes))
            .await
            .map_err(|_| {
                Error::Io(std::io::Error::new(
                    std::io::ErrorKind::BrokenPipe,
                    "ssh channel closed",
                ))
            })
    }
}

/// Serve an SSH client on `stream`.
pub async fn serve_ssh<S>(
    stream: S,
    config: Arc<russh::server::Config>,
    controller: &SessionController,
    settings: &ConnectionSettings,
) -> Result<Disconnect>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel();
    let mut inbound = InboundQueue::new(rx);

    let running = russh::server::run_stream(config, stream, SshHandler::new(tx)).await?;
    tokio::pin!(running);

    let shell = tokio::select! {
        shell = inbound.wait_for_shell() => shell,
        _ = &mut running => return Ok(Disconnect::Closed),
    };
    let Some((channel, handle, pty)) = shell else {
        return Ok(Disconnect::Closed);
    };

    if !pty {
        info!("shell requested without a pty");
        let _ = handle.data(channel, CryptoVec::from_slice(NO_PTY_NOTICE)).await;
        close_channel(&handle, channel, 1).await;
        let _ = tokio::time::timeout(CLOSE_GRACE, &mut running).await;
        return Ok(Disconnect::NoPty);
    }

    let mut link = SshLink {
        inbound,
        handle: handle.clone(),
        channel,
    };

    let mut connection_done = false;
    let result = {
        let session = host_session(&mut link, Vec::new(), controller, settings);
        tokio::pin!(session);
        tokio::select! {
            result = &mut session => result,
            _ = &mut running => {
                // The handler is gone, so the session sees end of input.
                connection_done = true;
                session.await
            }
        }
    };

    if !connection_done {
        close_channel(&handle, channel, 0).await;
        let _ = tokio::time::timeout(CLOSE_GRACE, &mut running).await;
    }
    result
}

async fn close_channel(handle: &Handle, channel: ChannelId, exit_status: u32) {
    let _ = handle.exit_status_request(channel, exit_status).await;
    let _ = handle.eof(channel).await;
    let _ = handle.close(channel).await;
}
