//! # Server
//!
//! Accepts SSH (or Telnet) connections and runs one session task per
//! connection.
//!
//! ## Lifecycle
//!
//! 1. Load the SSH host key, bind the listener and accept until the shutdown
//!    future resolves
//! 2. Each accepted connection runs [`ssh::serve_ssh`] or
//!    [`connection::serve_telnet`] inside a `session` span in a [`JoinSet`]
//! 3. On shutdown the listener is dropped and live sessions get the grace
//!    period to finish; whatever is left after that is aborted
//!
//! Connections beyond `max_sessions` get a short notice and are closed
//! without creating a session.

pub mod connection;
pub mod input;
pub mod ssh;
pub mod telnet;

use crate::config::{Config, TransportKind};
use crate::error::Result;
use crate::session::SessionController;
use connection::{serve_telnet, ConnectionSettings, BUSY_NOTICE};
use ssh::{load_or_generate_host_key, serve_ssh, ssh_config};
use std::future::Future;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinSet;
use tracing::{debug, error, info, info_span, warn, Instrument};

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub transport: TransportKind,
    pub host_key_path: PathBuf,
    pub shutdown_grace: Duration,
    pub max_sessions: usize,
    pub connection: ConnectionSettings,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for ServerConfig {
    fn from(config: &Config) -> Self {
        Self {
            host: config.host.clone(),
            port: config.port,
            transport: config.transport,
            host_key_path: config.host_key_path.clone(),
            shutdown_grace: config.shutdown_grace(),
            max_sessions: config.max_sessions,
            connection: ConnectionSettings {
                idle_timeout: config.idle_timeout(),
                initial_size_timeout: config.initial_size_timeout(),
            },
        }
    }
}

impl ServerConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Ready-to-serve form of [`TransportKind`].
#[derive(Clone)]
enum Protocol {
    Ssh(Arc<russh::server::Config>),
    Telnet,
}

pub struct Server {
    config: ServerConfig,
    controller: Arc<SessionController>,
}

impl Server {
    pub fn new(config: ServerConfig, controller: SessionController) -> Self {
        Self {
            config,
            controller: Arc::new(controller),
        }
    }

    /// Bind the configured address and serve until `shutdown` resolves.
    pub async fn run<F>(&self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let addr = self.config.addr();
        let listener = TcpListener::bind(&addr).await.map_err(|e| {
            error!("Failed to bind {}: {}", addr, e);
            e
        })?;
        self.serve(listener, shutdown).await
    }

    /// Serve on an already bound listener.
    pub async fn serve<F>(&self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let protocol = self.protocol()?;
        let local = listener.local_addr()?;
        info!(
            addr = %local,
            transport = ?self.config.transport,
            max_sessions = self.config.max_sessions,
            "listening"
        );

        let mut sessions = JoinSet::new();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                () = &mut shutdown => {
                    info!("shutdown requested, no longer accepting connections");
                    break;
                }
                Some(joined) = sessions.join_next(), if !sessions.is_empty() => {
                    if let Err(e) = joined {
                        error!("session task failed: {}", e);
                    }
                }
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer)) => self.accept(&mut sessions, &protocol, stream, peer),
                    Err(e) => error!("accept error: {}", e),
                },
            }
        }

        drop(listener);
        self.drain(sessions).await;
        Ok(())
    }

    fn protocol(&self) -> Result<Protocol> {
        Ok(match self.config.transport {
            TransportKind::Ssh => {
                let key = load_or_generate_host_key(&self.config.host_key_path)?;
                Protocol::Ssh(Arc::new(ssh_config(key, &self.config.connection)))
            }
            TransportKind::Telnet => Protocol::Telnet,
        })
    }

    fn accept(
        &self,
        sessions: &mut JoinSet<()>,
        protocol: &Protocol,
        stream: TcpStream,
        peer: SocketAddr,
    ) {
        if sessions.len() >= self.config.max_sessions {
            warn!(%peer, live = sessions.len(), "at capacity, turning connection away");
            tokio::spawn(turn_away(stream));
            return;
        }

        if let Err(e) = stream.set_nodelay(true) {
            debug!(%peer, "set_nodelay failed: {}", e);
        }

        let controller = Arc::clone(&self.controller);
        let settings = self.config.connection.clone();
        let protocol = protocol.clone();
        let span = info_span!("session", %peer, session = tracing::field::Empty);
        sessions.spawn(
            async move {
                let result = match protocol {
                    Protocol::Ssh(config) => serve_ssh(stream, config, &controller, &settings).await,
                    Protocol::Telnet => serve_telnet(stream, &controller, &settings).await,
                };
                // Failures inside a session were logged as a warning already.
                if let Err(e) = result {
                    debug!("connection ended with error: {}", e);
                }
            }
            .instrument(span),
        );
    }

    async fn drain(&self, mut sessions: JoinSet<()>) {
        if sessions.is_empty() {
            return;
        }

        let grace = self.config.shutdown_grace;
        info!(live = sessions.len(), grace_secs = grace.as_secs(), "draining sessions");

        let drained = tokio::time::timeout(grace, async {
            while sessions.join_next().await.is_some() {}
        })
        .await;

        if drained.is_err() {
            warn!(abandoned = sessions.len(), "grace period elapsed, closing remaining sessions");
            sessions.shutdown().await;
        } else {
            info!("all sessions closed");
        }
    }
}

async fn turn_away(mut stream: TcpStream) {
    if stream.write_all(BUSY_NOTICE).await.is_ok() {
        let _ = stream.shutdown().await;
    }
}
