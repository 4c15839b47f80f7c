//! TELNET client: protocol-aware read path, handshake, and lifecycle.
//!
//! The client owns the socket and filters every read through the option
//! codec, answering negotiation inline so callers only ever see application
//! data. When credentials are configured, construction runs the login
//! automation to completion before handing the client back.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpStream, ToSocketAddrs};
use tokio::sync::Mutex;
use tracing::{debug, trace};

use crate::config::ClientConfig;
use crate::login::{LoginAutomaton, LoginStep};
use crate::negotiate::{window_payload, Negotiator};
use crate::packet::{decode, Decoded, OptionPacket};
use crate::protocol::{MAX_WINDOW_HEIGHT, MAX_WINDOW_WIDTH, NAWS};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from connecting, authenticating, or using a [`Client`].
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("connection failed: {0}")]
    ConnectFailed(String),
    #[error("login failed: authentication rejected by server")]
    AuthFailed,
    #[error("connection closed during login")]
    LoginEof,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("client is closed")]
    Closed,
}

// ---------------------------------------------------------------------------
// Receive buffer
// ---------------------------------------------------------------------------

/// Accumulation buffer with an explicit consumed-offset cursor.
///
/// Raw socket reads append at the tail; the packet scanner consumes from
/// the head. Consumed space is reclaimed before each append once it
/// dominates the buffer.
struct RecvBuffer {
    data: Vec<u8>,
    start: usize,
}

impl RecvBuffer {
    fn new() -> Self {
        Self {
            data: Vec::with_capacity(4096),
            start: 0,
        }
    }

    fn unconsumed(&self) -> &[u8] {
        &self.data[self.start..]
    }

    fn is_empty(&self) -> bool {
        self.start == self.data.len()
    }

    fn extend(&mut self, bytes: &[u8]) {
        if self.start > 0 && self.start * 2 >= self.data.len() {
            self.data.drain(..self.start);
            self.start = 0;
        }
        self.data.extend_from_slice(bytes);
    }

    fn consume(&mut self, n: usize) {
        self.start += n;
        if self.start == self.data.len() {
            self.data.clear();
            self.start = 0;
        }
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

struct ReadState {
    sock: OwnedReadHalf,
    acc: RecvBuffer,
    /// Sanitized application bytes not yet handed to the caller.
    literal: Vec<u8>,
}

/// A TELNET client connection.
///
/// `read` is serialized by an internal mutex; `write` may run concurrently
/// with `read` from another task (the protocol is full-duplex). Multiple
/// concurrent writers must coordinate message ordering themselves.
pub struct Client {
    reader: Mutex<ReadState>,
    writer: Mutex<OwnedWriteHalf>,
    negotiator: Mutex<Negotiator>,
    closed: AtomicBool,
}

/// Open a timed connection to `addr` and run the client handshake.
pub async fn dial<A>(addr: A, config: &ClientConfig) -> Result<Client, ClientError>
where
    A: ToSocketAddrs,
{
    let mut conf = config.clone();
    conf.set_defaults();
    let stream = tokio::time::timeout(conf.timeout, TcpStream::connect(addr))
        .await
        .map_err(|_| {
            ClientError::ConnectFailed(format!("connect timeout after {:?}", conf.timeout))
        })?
        .map_err(|e| ClientError::ConnectFailed(e.to_string()))?;
    Client::from_stream(stream, &conf).await
}

impl Client {
    /// Wrap an established connection in a client and run the handshake.
    ///
    /// The config is cloned and defaulted; the caller's value is never
    /// mutated. With both a username and a password configured, the login
    /// automation runs to completion before this returns; on any handshake
    /// error the connection is closed and construction fails.
    pub async fn from_stream(
        stream: TcpStream,
        config: &ClientConfig,
    ) -> Result<Self, ClientError> {
        let mut conf = config.clone();
        conf.set_defaults();
        let auto_login = !conf.username.is_empty() && !conf.password.is_empty();

        let (read_half, write_half) = stream.into_split();
        let client = Self {
            reader: Mutex::new(ReadState {
                sock: read_half,
                acc: RecvBuffer::new(),
                literal: Vec::new(),
            }),
            writer: Mutex::new(write_half),
            negotiator: Mutex::new(Negotiator::new(&conf)),
            closed: AtomicBool::new(false),
        };

        if auto_login {
            if let Err(err) = client.login(&conf).await {
                let _ = client.close().await;
                return Err(err);
            }
        } else {
            debug!("no credentials configured, manual login");
        }
        Ok(client)
    }

    /// Read application data, answering any protocol traffic inline.
    ///
    /// Returned bytes never contain control sequences; negotiation replies
    /// are already on the wire when this returns. A read that produced
    /// only negotiation traffic keeps blocking for literal data. Clean EOF
    /// returns `Ok(0)`.
    pub async fn read(&self, buf: &mut [u8]) -> Result<usize, ClientError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(ClientError::Closed);
        }
        let mut state = self.reader.lock().await;
        loop {
            if !state.literal.is_empty() {
                let n = buf.len().min(state.literal.len());
                buf[..n].copy_from_slice(&state.literal[..n]);
                state.literal.drain(..n);
                return Ok(n);
            }

            self.process_buffered(&mut state).await?;
            if !state.literal.is_empty() {
                continue;
            }

            let mut chunk = [0u8; 4096];
            let n = state.sock.read(&mut chunk).await?;
            if n == 0 {
                if !state.acc.is_empty() {
                    debug!(
                        "dropping {} unterminated control bytes at EOF",
                        state.acc.unconsumed().len()
                    );
                }
                return Ok(0);
            }
            state.acc.extend(&chunk[..n]);
        }
    }

    /// Scan the accumulation buffer: move literal data to the pending
    /// queue and answer every complete packet on the wire.
    async fn process_buffered(&self, state: &mut ReadState) -> Result<(), ClientError> {
        loop {
            match decode(state.acc.unconsumed()) {
                Decoded::Literal => {
                    let unconsumed = state.acc.unconsumed();
                    let n = unconsumed.len();
                    state.literal.extend_from_slice(unconsumed);
                    state.acc.consume(n);
                    return Ok(());
                }
                Decoded::Incomplete { literal_end } => {
                    let unconsumed = state.acc.unconsumed();
                    state.literal.extend_from_slice(&unconsumed[..literal_end]);
                    state.acc.consume(literal_end);
                    return Ok(());
                }
                Decoded::Skipped { literal_end, rest } => {
                    let unconsumed = state.acc.unconsumed();
                    state.literal.extend_from_slice(&unconsumed[..literal_end]);
                    state.acc.consume(rest);
                }
                Decoded::Packet {
                    packet,
                    literal_end,
                    rest,
                } => {
                    let unconsumed = state.acc.unconsumed();
                    state.literal.extend_from_slice(&unconsumed[..literal_end]);
                    state.acc.consume(rest);
                    self.reply(&packet).await?;
                }
            }
        }
    }

    /// Run the decision table for one packet and write the replies.
    async fn reply(&self, packet: &OptionPacket) -> Result<(), ClientError> {
        let replies = {
            let mut negotiator = self.negotiator.lock().await;
            negotiator.negotiate(packet)
        };
        if replies.is_empty() {
            return Ok(());
        }
        let mut wire = Vec::new();
        for reply in &replies {
            trace!("server {packet} -> client {reply}");
            wire.extend_from_slice(&reply.to_bytes());
        }
        let mut writer = self.writer.lock().await;
        writer.write_all(&wire).await?;
        Ok(())
    }

    /// Drive the login automation over the protocol-aware read path.
    async fn login(&self, conf: &ClientConfig) -> Result<(), ClientError> {
        let mut automaton = LoginAutomaton::new(conf);
        let mut buf = [0u8; 1024];
        loop {
            let n = self.read(&mut buf).await?;
            if n == 0 {
                return Err(ClientError::LoginEof);
            }
            match automaton.advance(&buf[..n]) {
                LoginStep::Send(line) => {
                    let mut writer = self.writer.lock().await;
                    writer.write_all(&line).await?;
                }
                LoginStep::Pending => {}
                LoginStep::Success => {
                    // Flush the remote shell prompt.
                    self.write(b"\r\n").await?;
                    return Ok(());
                }
                LoginStep::Failed => return Err(ClientError::AuthFailed),
            }
        }
    }

    /// Write application data straight through to the socket.
    pub async fn write(&self, buf: &[u8]) -> Result<usize, ClientError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(ClientError::Closed);
        }
        let mut writer = self.writer.lock().await;
        writer.write_all(buf).await?;
        Ok(buf.len())
    }

    /// Announce a new window size.
    ///
    /// A no-op until the peer has accepted NAWS. Dimensions are clamped to
    /// the 16-bit wire maximum; the stored size is updated only after a
    /// successful write.
    pub async fn window_change(&self, width: u32, height: u32) -> Result<(), ClientError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(ClientError::Closed);
        }
        if !self.negotiator.lock().await.naws_enabled() {
            return Ok(());
        }
        let width = width.min(MAX_WINDOW_WIDTH) as u16;
        let height = height.min(MAX_WINDOW_HEIGHT) as u16;
        let packet = OptionPacket::subnegotiation(NAWS, window_payload(width, height).to_vec());
        {
            let mut writer = self.writer.lock().await;
            writer.write_all(&packet.to_bytes()).await?;
        }
        self.negotiator.lock().await.set_window(width, height);
        Ok(())
    }

    /// Shut the connection down. The client is unusable afterwards: every
    /// operation, including another `close`, fails with
    /// [`ClientError::Closed`].
    pub async fn close(&self) -> Result<(), ClientError> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Err(ClientError::Closed);
        }
        let mut writer = self.writer.lock().await;
        writer.shutdown().await?;
        Ok(())
    }
}
