//! Option negotiation state machine.
//!
//! Decides, per decoded peer command, what the client answers. The client
//! only advertises capabilities it can actually satisfy (terminal type,
//! terminal speed, window size, the USER environment variable) and refuses
//! everything else; refusing never requires further negotiation.

use tracing::debug;

use crate::config::ClientConfig;
use crate::packet::OptionPacket;
use crate::protocol::{
    DO, DONT, NAWS, NEW_ENVIRON, OLD_ENVIRON, SB, TSPEED, TTYPE, WILL, WONT, XDISPLOC,
};

/// Subnegotiation sub-command: the peer asks us to send a value.
const SUB_SEND: u8 = 1;
/// Subnegotiation sub-command: here is the value.
const SUB_IS: u8 = 0;

/// Fixed terminal speed announced for TSPEED; there is no real line behind it.
const TERMINAL_SPEED: &str = "38400,38400";

// ---------------------------------------------------------------------------
// Negotiator
// ---------------------------------------------------------------------------

/// Reply state for option negotiation.
///
/// Owns the terminal metadata announced to the peer and the NAWS window
/// state shared with `Client::window_change`.
#[derive(Debug)]
pub struct Negotiator {
    username: String,
    term_type: String,
    width: u16,
    height: u16,
    naws_enabled: bool,
}

impl Negotiator {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            username: config.username.clone(),
            term_type: config.terminal.term_type.clone(),
            width: config.terminal.width,
            height: config.terminal.height,
            naws_enabled: false,
        }
    }

    /// True once the peer has asked for (and we have accepted) NAWS.
    pub fn naws_enabled(&self) -> bool {
        self.naws_enabled
    }

    /// Current window dimensions.
    pub fn window(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    pub fn set_window(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
    }

    /// Compute the replies for one decoded packet.
    ///
    /// Usually one packet; NAWS acceptance additionally announces the
    /// current window size, and malformed input yields nothing.
    pub fn negotiate(&mut self, packet: &OptionPacket) -> Vec<OptionPacket> {
        let reply = match packet.verb {
            SB => self.subnegotiate(packet),
            DO => match packet.option {
                TTYPE | TSPEED => OptionPacket::new(WILL, packet.option),
                NAWS => {
                    self.naws_enabled = true;
                    return vec![
                        OptionPacket::new(WILL, NAWS),
                        OptionPacket::subnegotiation(
                            NAWS,
                            window_payload(self.width, self.height).to_vec(),
                        ),
                    ];
                }
                _ => OptionPacket::new(WONT, packet.option),
            },
            WILL => match packet.option {
                XDISPLOC => OptionPacket::new(DONT, packet.option),
                _ => OptionPacket::new(DO, packet.option),
            },
            DONT => OptionPacket::new(WONT, packet.option),
            WONT => OptionPacket::new(DONT, packet.option),
            verb => {
                debug!("no reply for unknown negotiation verb 0x{verb:02x}");
                return Vec::new();
            }
        };
        vec![reply]
    }

    /// Answer a subnegotiation request. Only SEND requests for the options
    /// we can satisfy get a value; everything else is refused.
    fn subnegotiate(&self, packet: &OptionPacket) -> OptionPacket {
        let params = packet.parameters.as_deref().unwrap_or_default();
        if params.first() != Some(&SUB_SEND) {
            return OptionPacket::new(WONT, packet.option);
        }
        match packet.option {
            OLD_ENVIRON | NEW_ENVIRON => {
                // Single-variable form: VALUE "USER" IS <username>.
                let mut value = Vec::new();
                if !self.username.is_empty() {
                    value.push(0x00);
                    value.extend_from_slice(b"USER");
                    value.push(0x01);
                    value.extend_from_slice(self.username.as_bytes());
                }
                OptionPacket::subnegotiation(packet.option, value)
            }
            TSPEED => {
                let mut value = vec![SUB_IS];
                value.extend_from_slice(TERMINAL_SPEED.as_bytes());
                OptionPacket::subnegotiation(TSPEED, value)
            }
            TTYPE => {
                let mut value = vec![SUB_IS];
                value.extend_from_slice(self.term_type.as_bytes());
                OptionPacket::subnegotiation(TTYPE, value)
            }
            _ => OptionPacket::new(WONT, packet.option),
        }
    }
}

/// 4-byte big-endian width/height payload for SB NAWS.
pub fn window_payload(width: u16, height: u16) -> [u8; 4] {
    let w = width.to_be_bytes();
    let h = height.to_be_bytes();
    [w[0], w[1], h[0], h[1]]
}
