//! Option packet codec.
//!
//! Frames TELNET command sequences out of an arbitrary byte stream. TCP
//! segmentation can split a command across reads, so the decoder reports
//! incomplete sequences and the caller retains those bytes until more
//! input arrives. Unrecognized IAC commands are skipped, not fatal; real
//! servers are not always strictly conformant.

use std::fmt;

use tracing::debug;

use crate::protocol::{self, DO, DONT, IAC, NAWS, SB, SE, WILL, WONT};

// ---------------------------------------------------------------------------
// OptionPacket
// ---------------------------------------------------------------------------

/// One decoded TELNET command.
///
/// `verb` is one of WILL/WONT/DO/DONT/SB; `option` is the capability being
/// negotiated. For subnegotiation, `parameters` holds the payload between
/// the option byte and the terminating IAC SE, exclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionPacket {
    pub verb: u8,
    pub option: u8,
    pub parameters: Option<Vec<u8>>,
}

impl OptionPacket {
    /// A simple negotiation triplet (no parameters).
    pub fn new(verb: u8, option: u8) -> Self {
        Self {
            verb,
            option,
            parameters: None,
        }
    }

    /// A subnegotiation packet carrying a payload.
    pub fn subnegotiation(option: u8, parameters: Vec<u8>) -> Self {
        Self {
            verb: SB,
            option,
            parameters: Some(parameters),
        }
    }

    /// Wire encoding: `IAC verb option`, plus `parameters… IAC SE` when
    /// parameters are present.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(5 + self.parameters.as_ref().map_or(0, Vec::len));
        buf.push(IAC);
        buf.push(self.verb);
        buf.push(self.option);
        if let Some(params) = &self.parameters {
            buf.extend_from_slice(params);
            buf.push(IAC);
            buf.push(SE);
        }
        buf
    }
}

impl fmt::Display for OptionPacket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("IAC ")?;
        write_code(f, self.verb)?;
        f.write_str(" ")?;
        write_code(f, self.option)?;
        if let Some(params) = &self.parameters {
            f.write_str(" ")?;
            write_parameters(f, self.option, params)?;
            f.write_str(" IAC SE")?;
        }
        Ok(())
    }
}

fn write_code(f: &mut fmt::Formatter<'_>, code: u8) -> fmt::Result {
    match protocol::name(code) {
        Some(name) => f.write_str(name),
        None => write!(f, "{code}"),
    }
}

/// NAWS payloads render as decoded big-endian dimensions; everything else
/// byte by byte.
fn write_parameters(f: &mut fmt::Formatter<'_>, option: u8, params: &[u8]) -> fmt::Result {
    if option == NAWS && params.len() == 4 {
        let width = u16::from_be_bytes([params[0], params[1]]);
        let height = u16::from_be_bytes([params[2], params[3]]);
        return write!(
            f,
            "{} {} ({width}) {} {} ({height})",
            params[0], params[1], params[2], params[3]
        );
    }
    for (i, b) in params.iter().enumerate() {
        if i > 0 {
            f.write_str(" ")?;
        }
        write!(f, "{:?}", *b as char)?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Result of scanning a buffer for the next command packet.
///
/// Positions are offsets into the scanned buffer. Bytes before
/// `literal_end` are always literal application data and safe to flush to
/// the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded {
    /// No IAC anywhere: the whole buffer is literal data.
    Literal,
    /// A command sequence starts at `literal_end` but is not complete in
    /// the buffered bytes; everything from there on must be retained until
    /// more input arrives.
    Incomplete { literal_end: usize },
    /// An unrecognized or two-byte IAC command was skipped; scanning
    /// resumes at `rest`.
    Skipped { literal_end: usize, rest: usize },
    /// A complete packet; scanning resumes at `rest`.
    Packet {
        packet: OptionPacket,
        literal_end: usize,
        rest: usize,
    },
}

/// Scan `buf` for the next complete command packet.
///
/// An IAC with fewer than three bytes remaining is reported as
/// [`Decoded::Incomplete`] rather than consumed, so a packet split across
/// network reads is never mistaken for literal data. A subnegotiation is
/// complete only once its terminating IAC SE pair is buffered.
pub fn decode(buf: &[u8]) -> Decoded {
    let Some(start) = buf.iter().position(|&b| b == IAC) else {
        return Decoded::Literal;
    };
    if buf.len() - start < 3 {
        return Decoded::Incomplete { literal_end: start };
    }

    let verb = buf[start + 1];
    let option = buf[start + 2];
    match verb {
        WILL | WONT | DO | DONT => Decoded::Packet {
            packet: OptionPacket::new(verb, option),
            literal_end: start,
            rest: start + 3,
        },
        SB => {
            let params_start = start + 3;
            let mut i = params_start;
            loop {
                if i + 1 >= buf.len() {
                    // No IAC SE yet; the block may still be in flight.
                    return Decoded::Incomplete { literal_end: start };
                }
                match (buf[i], buf[i + 1]) {
                    (IAC, SE) => break,
                    (IAC, IAC) => i += 2,
                    _ => i += 1,
                }
            }
            Decoded::Packet {
                packet: OptionPacket::subnegotiation(option, buf[params_start..i].to_vec()),
                literal_end: start,
                rest: i + 2,
            }
        }
        cmd => {
            debug!("skipping unrecognized telnet command 0x{cmd:02x}");
            Decoded::Skipped {
                literal_end: start,
                rest: start + 2,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{ECHO, NOP, TTYPE};

    #[test]
    fn literal_only() {
        assert_eq!(decode(b"hello world"), Decoded::Literal);
        assert_eq!(decode(b""), Decoded::Literal);
    }

    #[test]
    fn simple_negotiation_triplet() {
        let buf = [IAC, DO, ECHO, b'h', b'i'];
        match decode(&buf) {
            Decoded::Packet {
                packet,
                literal_end,
                rest,
            } => {
                assert_eq!(packet, OptionPacket::new(DO, ECHO));
                assert_eq!(literal_end, 0);
                assert_eq!(rest, 3);
            }
            other => panic!("expected packet, got {other:?}"),
        }
    }

    #[test]
    fn literal_prefix_before_packet() {
        let buf = [b'a', b'b', IAC, WILL, ECHO];
        match decode(&buf) {
            Decoded::Packet {
                packet,
                literal_end,
                rest,
            } => {
                assert_eq!(packet, OptionPacket::new(WILL, ECHO));
                assert_eq!(literal_end, 2);
                assert_eq!(rest, 5);
            }
            other => panic!("expected packet, got {other:?}"),
        }
    }

    #[test]
    fn truncated_triplet_is_incomplete() {
        assert_eq!(decode(&[IAC]), Decoded::Incomplete { literal_end: 0 });
        assert_eq!(decode(&[IAC, DO]), Decoded::Incomplete { literal_end: 0 });
        assert_eq!(
            decode(&[b'x', IAC, DO]),
            Decoded::Incomplete { literal_end: 1 }
        );
    }

    #[test]
    fn subnegotiation_with_payload() {
        // IAC SB TTYPE 1 IAC SE
        let buf = [IAC, SB, TTYPE, 1, IAC, SE];
        match decode(&buf) {
            Decoded::Packet { packet, rest, .. } => {
                assert_eq!(packet, OptionPacket::subnegotiation(TTYPE, vec![1]));
                assert_eq!(rest, 6);
            }
            other => panic!("expected packet, got {other:?}"),
        }
    }

    #[test]
    fn subnegotiation_without_terminator_is_incomplete() {
        let buf = [IAC, SB, TTYPE, 1, b'x', b'y'];
        assert_eq!(decode(&buf), Decoded::Incomplete { literal_end: 0 });
    }

    #[test]
    fn subnegotiation_bare_se_is_not_a_terminator() {
        // A lone SE byte inside the payload must not end the block.
        let buf = [IAC, SB, TTYPE, SE, 1, IAC, SE];
        match decode(&buf) {
            Decoded::Packet { packet, .. } => {
                assert_eq!(packet.parameters, Some(vec![SE, 1]));
            }
            other => panic!("expected packet, got {other:?}"),
        }
    }

    #[test]
    fn escaped_iac_inside_subnegotiation_payload() {
        let buf = [IAC, SB, TTYPE, IAC, IAC, 7, IAC, SE];
        match decode(&buf) {
            Decoded::Packet { packet, rest, .. } => {
                assert_eq!(packet.parameters, Some(vec![IAC, IAC, 7]));
                assert_eq!(rest, 8);
            }
            other => panic!("expected packet, got {other:?}"),
        }
    }

    #[test]
    fn unrecognized_command_is_skipped() {
        let buf = [b'a', IAC, NOP, b'b'];
        assert_eq!(
            decode(&buf),
            Decoded::Skipped {
                literal_end: 1,
                rest: 3
            }
        );
    }

    #[test]
    fn round_trip_simple() {
        let packet = OptionPacket::new(DONT, ECHO);
        match decode(&packet.to_bytes()) {
            Decoded::Packet {
                packet: decoded,
                rest,
                ..
            } => {
                assert_eq!(decoded, packet);
                assert_eq!(rest, 3);
            }
            other => panic!("expected packet, got {other:?}"),
        }
    }

    #[test]
    fn round_trip_subnegotiation() {
        let packet = OptionPacket::subnegotiation(NAWS, vec![0, 80, 0, 24]);
        let wire = packet.to_bytes();
        assert_eq!(wire.len(), 3 + 4 + 2);
        match decode(&wire) {
            Decoded::Packet {
                packet: decoded,
                rest,
                ..
            } => {
                assert_eq!(decoded, packet);
                assert_eq!(rest, wire.len());
            }
            other => panic!("expected packet, got {other:?}"),
        }
    }

    #[test]
    fn split_feed_never_yields_premature_packet() {
        let wire = OptionPacket::subnegotiation(TTYPE, vec![1, b'x']).to_bytes();
        for end in 1..wire.len() {
            match decode(&wire[..end]) {
                Decoded::Incomplete { literal_end: 0 } => {}
                other => panic!("prefix of {end} bytes decoded as {other:?}"),
            }
        }
        assert!(matches!(decode(&wire), Decoded::Packet { .. }));
    }

    #[test]
    fn display_renders_names() {
        assert_eq!(OptionPacket::new(DO, ECHO).to_string(), "IAC DO ECHO");
        let naws = OptionPacket::subnegotiation(NAWS, vec![0, 80, 0, 24]);
        assert_eq!(naws.to_string(), "IAC SB NAWS 0 80 (80) 0 24 (24) IAC SE");
    }
}
