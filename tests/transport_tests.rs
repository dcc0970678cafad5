//! End-to-end tests over a real TCP socket
//!
//! The Telnet client speaks the same bytes a Telnet client would: window size
//! subnegotiation, raw key sequences, and `q` to leave. The SSH client is a
//! russh client that asks for a PTY and a shell like `ssh` does.

use russh::client;
use russh::ChannelMsg;
use std::sync::Arc;
use std::time::Duration;
use termfolio::config::TransportKind;
use termfolio::server::connection::BUSY_NOTICE;
use termfolio::server::ssh::NO_PTY_NOTICE;
use termfolio::server::input::InputDecoder;
use termfolio::server::telnet::{TelnetChunk, TelnetParser, IAC, OPT_NAWS, SB, SE};
use termfolio::server::{Server, ServerConfig};
use termfolio::session::SessionController;
use termfolio::ui::Theme;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

struct TestServer {
    addr: std::net::SocketAddr,
    stop: oneshot::Sender<()>,
    task: JoinHandle<termfolio::Result<()>>,
}

async fn start(config: ServerConfig) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let server = Server::new(config, SessionController::with_portfolio(Theme::default_theme()));
    let (stop, rx) = oneshot::channel::<()>();
    let task = tokio::spawn(async move {
        server
            .serve(listener, async {
                let _ = rx.await;
            })
            .await
    });
    TestServer { addr, stop, task }
}

impl TestServer {
    async fn stop(self) {
        let _ = self.stop.send(());
        let result = tokio::time::timeout(Duration::from_secs(5), self.task)
            .await
            .expect("server did not stop")
            .expect("server task panicked");
        assert!(result.is_ok());
    }
}

fn telnet() -> ServerConfig {
    ServerConfig {
        transport: TransportKind::Telnet,
        ..ServerConfig::default()
    }
}

fn ssh(key_dir: &tempfile::TempDir) -> ServerConfig {
    ServerConfig {
        transport: TransportKind::Ssh,
        host_key_path: key_dir.path().join("id_ed25519"),
        ..ServerConfig::default()
    }
}

fn naws(width: u16, height: u16) -> Vec<u8> {
    let [w_hi, w_lo] = width.to_be_bytes();
    let [h_hi, h_lo] = height.to_be_bytes();
    vec![IAC, SB, OPT_NAWS, w_hi, w_lo, h_hi, h_lo, IAC, SE]
}

/// Read until `needle` shows up in the output received by this call.
async fn read_until(stream: &mut TcpStream, needle: &str) -> String {
    let mut seen = Vec::new();
    let mut buf = [0u8; 8192];
    loop {
        let n = tokio::time::timeout(Duration::from_secs(5), stream.read(&mut buf))
            .await
            .unwrap_or_else(|_| panic!("timed out waiting for {needle:?}"))
            .expect("read");
        assert!(n > 0, "connection closed before {needle:?} appeared");
        seen.extend_from_slice(&buf[..n]);
        let text = String::from_utf8_lossy(&seen).into_owned();
        if text.contains(needle) {
            return text;
        }
    }
}

#[tokio::test]
async fn test_browse_pages_and_quit() {
    let server = start(telnet()).await;
    let mut client = TcpStream::connect(server.addr).await.expect("connect");

    let greeting = read_until(&mut client, "Initializing").await;
    assert!(greeting.contains("\x1b[?1049h"), "alternate screen not entered");

    client.write_all(&naws(100, 30)).await.expect("write");
    read_until(&mut client, "Welcome").await;

    // Down, Down, Enter: open Projects
    client.write_all(b"\x1b[B\x1b[B\r").await.expect("write");
    read_until(&mut client, "DocConnect").await;

    // back to the list, then leave
    client.write_all(b"\x1b[Dq").await.expect("write");
    let mut rest = Vec::new();
    tokio::time::timeout(Duration::from_secs(5), client.read_to_end(&mut rest))
        .await
        .expect("connection not closed")
        .expect("read");
    assert!(String::from_utf8_lossy(&rest).contains("\x1b[?1049l"));

    server.stop().await;
}

#[tokio::test]
async fn test_raw_client_without_telnet_gets_default_size() {
    let server = start(ServerConfig {
        connection: termfolio::server::connection::ConnectionSettings {
            idle_timeout: None,
            initial_size_timeout: Duration::from_millis(50),
        },
        ..telnet()
    })
    .await;
    let mut client = TcpStream::connect(server.addr).await.expect("connect");

    read_until(&mut client, "Welcome").await;
    client.write_all(b"jjjj\r").await.expect("write");
    read_until(&mut client, "resume").await;

    drop(client);
    server.stop().await;
}

#[tokio::test]
async fn test_huge_window_size_is_capped() {
    let server = start(telnet()).await;
    let mut client = TcpStream::connect(server.addr).await.expect("connect");
    read_until(&mut client, "Initializing").await;

    client.write_all(&naws(u16::MAX, u16::MAX)).await.expect("write");
    read_until(&mut client, "Welcome").await;

    // the session and the server are both still alive
    client.write_all(b"j\r").await.expect("write");
    read_until(&mut client, "hackathons").await;
    let mut other = TcpStream::connect(server.addr).await.expect("connect");
    read_until(&mut other, "Initializing").await;

    drop(client);
    drop(other);
    server.stop().await;
}

#[tokio::test]
async fn test_concurrent_sessions_are_independent() {
    let server = start(telnet()).await;
    let mut a = TcpStream::connect(server.addr).await.expect("connect");
    let mut b = TcpStream::connect(server.addr).await.expect("connect");

    a.write_all(&naws(100, 30)).await.expect("write");
    b.write_all(&naws(100, 30)).await.expect("write");
    read_until(&mut a, "Welcome").await;
    read_until(&mut b, "Welcome").await;

    // a opens About; b moves its cursor only
    a.write_all(b"j\r").await.expect("write");
    read_until(&mut a, "hackathons").await;

    b.write_all(b"j").await.expect("write");
    let frame = read_until(&mut b, "Welcome").await;
    assert!(!frame.contains("hackathons"), "b must still show the landing page");

    a.write_all(b"q").await.expect("write");
    b.write_all(b"q").await.expect("write");
    server.stop().await;
}

#[tokio::test]
async fn test_capacity_limit() {
    let server = start(ServerConfig {
        max_sessions: 1,
        ..telnet()
    })
    .await;

    let mut first = TcpStream::connect(server.addr).await.expect("connect");
    read_until(&mut first, "Initializing").await;

    let mut second = TcpStream::connect(server.addr).await.expect("connect");
    let mut notice = Vec::new();
    tokio::time::timeout(Duration::from_secs(5), second.read_to_end(&mut notice))
        .await
        .expect("timed out")
        .expect("read");
    assert_eq!(notice, BUSY_NOTICE);

    first.write_all(b"q").await.expect("write");
    server.stop().await;
}

#[test]
fn test_telnet_and_decoder_pipeline() {
    let mut parser = TelnetParser::new();
    let mut decoder = InputDecoder::new();

    let mut wire = naws(120, 40);
    wire.extend_from_slice(b"\x1b[B\r\n");
    wire.extend_from_slice(&[IAC, IAC]);

    let mut sizes = Vec::new();
    let mut keys = Vec::new();
    for chunk in parser.feed(&wire) {
        match chunk {
            TelnetChunk::WindowSize { width, height } => sizes.push((width, height)),
            TelnetChunk::Data(bytes) => keys.extend(decoder.feed(&bytes)),
        }
    }

    assert_eq!(sizes, vec![(120, 40)]);
    // Down and a single Enter; the literal 0xFF byte is not valid input
    assert_eq!(keys.len(), 2);
}

/// Client handler that trusts any host key.
struct Visitor;

impl client::Handler for Visitor {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        _server_public_key: &russh::keys::PublicKey,
    ) -> Result<bool, Self::Error> {
        Ok(true)
    }
}

async fn ssh_connect(addr: std::net::SocketAddr) -> client::Handle<Visitor> {
    let config = Arc::new(client::Config::default());
    let mut session = client::connect(config, addr, Visitor).await.expect("connect");
    let auth = session.authenticate_none("visitor").await.expect("auth");
    assert!(auth.success(), "login without credentials is accepted");
    session
}

/// Collect channel output until `needle` shows up.
async fn read_channel_until(
    channel: &mut russh::Channel<client::Msg>,
    needle: &str,
) -> String {
    let mut seen = Vec::new();
    loop {
        let msg = tokio::time::timeout(Duration::from_secs(5), channel.wait())
            .await
            .unwrap_or_else(|_| panic!("timed out waiting for {needle:?}"));
        match msg {
            Some(ChannelMsg::Data { data }) => {
                seen.extend_from_slice(&data);
                let text = String::from_utf8_lossy(&seen).into_owned();
                if text.contains(needle) {
                    return text;
                }
            }
            Some(ChannelMsg::Eof | ChannelMsg::Close) | None => {
                panic!("channel closed before {needle:?} appeared")
            }
            Some(_) => {}
        }
    }
}

/// Wait for the server to end the channel, returning the exit status.
async fn wait_for_exit(channel: &mut russh::Channel<client::Msg>) -> Option<u32> {
    let mut status = None;
    loop {
        let msg = tokio::time::timeout(Duration::from_secs(5), channel.wait())
            .await
            .expect("channel not closed");
        match msg {
            Some(ChannelMsg::ExitStatus { exit_status }) => status = Some(exit_status),
            Some(ChannelMsg::Close) | None => return status,
            Some(_) => {}
        }
    }
}

#[tokio::test]
async fn test_ssh_browse_resize_and_quit() {
    let key_dir = tempfile::TempDir::new().expect("create temp dir");
    let server = start(ssh(&key_dir)).await;
    let session = ssh_connect(server.addr).await;

    let mut channel = session.channel_open_session().await.expect("channel");
    channel
        .request_pty(false, "xterm-256color", 100, 30, 0, 0, &[])
        .await
        .expect("pty");
    channel.request_shell(false).await.expect("shell");

    let greeting = read_channel_until(&mut channel, "Welcome").await;
    assert!(greeting.contains("\x1b[?1049h"), "alternate screen not entered");

    // Down, Down, Enter: open Projects
    channel.data(&b"\x1b[B\x1b[B\r"[..]).await.expect("write");
    read_channel_until(&mut channel, "DocConnect").await;

    // a window change redraws the open page
    channel.window_change(120, 40, 0, 0).await.expect("resize");
    read_channel_until(&mut channel, "DocConnect").await;

    channel.data(&b"q"[..]).await.expect("write");
    assert_eq!(wait_for_exit(&mut channel).await, Some(0));

    server.stop().await;
}

#[tokio::test]
async fn test_ssh_shell_without_pty_is_refused() {
    let key_dir = tempfile::TempDir::new().expect("create temp dir");
    let server = start(ssh(&key_dir)).await;
    let session = ssh_connect(server.addr).await;

    let mut channel = session.channel_open_session().await.expect("channel");
    channel.request_shell(false).await.expect("shell");

    let notice = read_channel_until(&mut channel, "PTY").await;
    assert_eq!(notice.as_bytes(), NO_PTY_NOTICE);
    assert_eq!(wait_for_exit(&mut channel).await, Some(1));

    server.stop().await;
}

#[tokio::test]
async fn test_ssh_oversized_pty_is_served() {
    let key_dir = tempfile::TempDir::new().expect("create temp dir");
    let server = start(ssh(&key_dir)).await;
    let session = ssh_connect(server.addr).await;

    let mut channel = session.channel_open_session().await.expect("channel");
    channel
        .request_pty(false, "xterm", u32::MAX, u32::MAX, 0, 0, &[])
        .await
        .expect("pty");
    channel.request_shell(false).await.expect("shell");

    read_channel_until(&mut channel, "Welcome").await;
    channel.data(&b"q"[..]).await.expect("write");
    assert_eq!(wait_for_exit(&mut channel).await, Some(0));

    server.stop().await;
}
