//! Client-side TELNET protocol engine.
//!
//! telwire wraps a TCP connection in the TELNET wire protocol (RFC 854):
//! every read runs through the option codec, negotiation is answered
//! inline (terminal type, terminal speed, window size, the USER
//! environment variable; everything else refused), and with credentials
//! configured the client logs in unattended by matching server prompts
//! against configurable patterns. Bytes surfaced by [`Client::read`] are
//! application data only; control sequences never reach the caller.

pub mod client;
pub mod config;
pub mod login;
pub mod negotiate;
pub mod packet;
pub mod protocol;

pub use client::{dial, Client, ClientError};
pub use config::{ClientConfig, TerminalOptions};
pub use login::{LoginAutomaton, LoginStep};
pub use negotiate::Negotiator;
pub use packet::{decode, Decoded, OptionPacket};
