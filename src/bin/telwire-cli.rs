//! telwire-cli: interactive TELNET client for the telwire library.
//!
//! Dials a server, then pumps stdin to the connection and connection
//! output to stdout. Line-oriented on the input side; local raw-mode and
//! window-resize plumbing are left to real terminal frontends.

use std::process;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::EnvFilter;

use telwire::{ClientConfig, TerminalOptions};

#[derive(Parser)]
#[command(name = "telwire-cli", about = "Interactive TELNET client")]
struct Cli {
    /// Host to connect to.
    host: String,

    /// TELNET port.
    #[arg(short, long, default_value = "23")]
    port: u16,

    /// Username for automatic login.
    #[arg(short, long, default_value = "")]
    username: String,

    /// Password for automatic login (with --username).
    #[arg(long, default_value = "")]
    password: String,

    /// Connect timeout in seconds.
    #[arg(long, default_value = "15")]
    timeout: u64,

    /// Terminal type announced to the server.
    #[arg(long, default_value = "xterm")]
    term: String,

    /// Terminal width announced to the server.
    #[arg(long, default_value = "80")]
    width: u16,

    /// Terminal height announced to the server.
    #[arg(long, default_value = "24")]
    height: u16,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = ClientConfig {
        username: cli.username,
        password: cli.password,
        timeout: Duration::from_secs(cli.timeout),
        terminal: TerminalOptions {
            width: cli.width,
            height: cli.height,
            term_type: cli.term,
        },
        ..ClientConfig::default()
    };

    let addr = format!("{}:{}", cli.host, cli.port);
    let client = match telwire::dial(&addr, &config).await {
        Ok(client) => Arc::new(client),
        Err(err) => {
            eprintln!("telwire-cli: {addr}: {err}");
            process::exit(1);
        }
    };

    // Connection → stdout.
    let receiver = {
        let client = Arc::clone(&client);
        tokio::spawn(async move {
            let mut stdout = tokio::io::stdout();
            let mut buf = [0u8; 4096];
            loop {
                match client.read(&mut buf).await {
                    Ok(0) => break,
                    Ok(n) => {
                        if stdout.write_all(&buf[..n]).await.is_err() {
                            break;
                        }
                        let _ = stdout.flush().await;
                    }
                    Err(err) => {
                        eprintln!("telwire-cli: read: {err}");
                        break;
                    }
                }
            }
        })
    };

    // Stdin → connection, one line at a time.
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                let mut out = line.into_bytes();
                out.extend_from_slice(b"\r\n");
                if let Err(err) = client.write(&out).await {
                    eprintln!("telwire-cli: write: {err}");
                    break;
                }
            }
            Ok(None) | Err(_) => break,
        }
    }

    let _ = client.close().await;
    let _ = receiver.await;
}
