//! End-to-end client sessions against a scripted mock server.
//!
//! Exercises the full path: dial, inline negotiation, unattended login,
//! sanitized reads, window updates, and shutdown.

use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use telwire::protocol::{DO, ECHO, IAC, NAWS, SB, SE, TSPEED, TTYPE, WILL, WONT};
use telwire::{dial, Client, ClientConfig, ClientError, TerminalOptions};

/// Read from the client until exactly `want` bytes have arrived.
async fn read_all(client: &Client, want: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(want);
    let mut buf = [0u8; 256];
    while out.len() < want {
        let n = client.read(&mut buf).await.expect("client read");
        assert!(n > 0, "connection closed after {} bytes", out.len());
        out.extend_from_slice(&buf[..n]);
    }
    out
}

#[tokio::test]
async fn scripted_session_with_negotiation_login_and_resize() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();

        // Negotiation burst and the login prompt in one segment.
        let mut wire = vec![
            IAC, DO, ECHO, // refused
            IAC, DO, NAWS, // accepted, announces window
            IAC, WILL, ECHO, // accepted
            IAC, SB, TTYPE, 1, IAC, SE, // terminal type request
        ];
        wire.extend_from_slice(b"Welcome\r\nlogin: ");
        stream.write_all(&wire).await.unwrap();

        // WONT ECHO, WILL NAWS + 100x40 announcement, DO ECHO, TTYPE reply.
        let mut expected = vec![IAC, WONT, ECHO];
        expected.extend_from_slice(&[IAC, WILL, NAWS]);
        expected.extend_from_slice(&[IAC, SB, NAWS, 0, 100, 0, 40, IAC, SE]);
        expected.extend_from_slice(&[IAC, DO, ECHO]);
        expected.extend_from_slice(&[IAC, SB, TTYPE, 0]);
        expected.extend_from_slice(b"vt220");
        expected.extend_from_slice(&[IAC, SE]);

        let mut replies = vec![0u8; expected.len()];
        stream.read_exact(&mut replies).await.unwrap();
        assert_eq!(replies, expected);

        let mut username = [0u8; 5];
        stream.read_exact(&mut username).await.unwrap();
        assert_eq!(&username, b"ops\r\0");

        stream.write_all(b"Password: ").await.unwrap();
        let mut password = [0u8; 9];
        stream.read_exact(&mut password).await.unwrap();
        assert_eq!(&password, b"hunter2\r\0");

        stream.write_all(b"Last login: Fri Aug  7\r\n").await.unwrap();
        let mut flush = [0u8; 2];
        stream.read_exact(&mut flush).await.unwrap();
        assert_eq!(&flush, b"\r\n");

        // Authenticated traffic.
        stream.write_all(b"$ hello world\r\n").await.unwrap();

        let mut resize = [0u8; 9];
        stream.read_exact(&mut resize).await.unwrap();
        assert_eq!(resize, [IAC, SB, NAWS, 0, 120, 0, 40, IAC, SE]);

        let mut exit = [0u8; 6];
        stream.read_exact(&mut exit).await.unwrap();
        assert_eq!(&exit, b"exit\r\n");

        stream.shutdown().await.unwrap();
    });

    let config = ClientConfig {
        username: "ops".into(),
        password: "hunter2".into(),
        terminal: TerminalOptions {
            width: 100,
            height: 40,
            term_type: "vt220".into(),
        },
        ..ClientConfig::default()
    };

    let client = dial(addr, &config).await.expect("dial");

    let banner = read_all(&client, b"$ hello world\r\n".len()).await;
    assert_eq!(banner, b"$ hello world\r\n");

    client.window_change(120, 40).await.unwrap();
    client.write(b"exit\r\n").await.unwrap();

    let mut buf = [0u8; 16];
    let n = client.read(&mut buf).await.unwrap();
    assert_eq!(n, 0, "expected clean EOF after server shutdown");

    client.close().await.unwrap();
    server.await.unwrap();
}

#[tokio::test]
async fn dial_to_closed_port_is_a_connect_error() {
    // Bind then drop to get a port with no listener behind it.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let result = dial(addr, &ClientConfig::default()).await;
    assert!(matches!(result, Err(ClientError::ConnectFailed(_))));
}

#[tokio::test]
async fn caller_config_is_never_mutated() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = tokio::spawn(async move {
        let (_stream, _) = listener.accept().await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
    });

    let config = ClientConfig::default();
    let client = dial(addr, &config).await.expect("dial");

    // The clone was defaulted, not the original.
    assert_eq!(config.timeout, Duration::ZERO);
    assert_eq!(config.terminal.width, 0);
    assert!(config.username_prompt.is_none());

    client.close().await.unwrap();
    server.await.unwrap();
}

#[tokio::test]
async fn tspeed_request_answered_with_fixed_speed() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let mut wire = vec![IAC, DO, TSPEED, IAC, SB, TSPEED, 1, IAC, SE];
        wire.extend_from_slice(b"ok");
        stream.write_all(&wire).await.unwrap();

        let mut expected = vec![IAC, WILL, TSPEED, IAC, SB, TSPEED, 0];
        expected.extend_from_slice(b"38400,38400");
        expected.extend_from_slice(&[IAC, SE]);

        let mut replies = vec![0u8; expected.len()];
        stream.read_exact(&mut replies).await.unwrap();
        assert_eq!(replies, expected);
    });

    let client = dial(addr, &ClientConfig::default()).await.expect("dial");
    let mut buf = [0u8; 16];
    let n = client.read(&mut buf).await.unwrap();
    assert_eq!(&buf[..n], b"ok");
    server.await.unwrap();
}
