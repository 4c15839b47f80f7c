//! TELNET protocol vocabulary.
//!
//! Command bytes and option codes per RFC 854 and the IANA telnet-options
//! registry, plus a name table for rendering control traffic in traces.
//! Pure data; the codec and negotiator give these meaning.

/// "Interpret As Command", the escape byte introducing every control sequence.
pub const IAC: u8 = 255;
/// "You should not enable this option."
pub const DONT: u8 = 254;
/// "You should enable this option."
pub const DO: u8 = 253;
/// "I will not enable this option."
pub const WONT: u8 = 252;
/// "I will enable this option."
pub const WILL: u8 = 251;
/// Subnegotiation Begin.
pub const SB: u8 = 250;
/// Subnegotiation End (always preceded by IAC).
pub const SE: u8 = 240;

// Two-byte IAC commands. Not negotiation packets; the codec skips them.
pub const NOP: u8 = 241; // no operation
pub const DM: u8 = 242; // data mark
pub const BRK: u8 = 243; // break
pub const IP: u8 = 244; // interrupt process
pub const AO: u8 = 245; // abort output
pub const AYT: u8 = 246; // are you there
pub const EC: u8 = 247; // erase character
pub const EL: u8 = 248; // erase line
pub const GA: u8 = 249; // go ahead

// Option codes, per https://www.iana.org/assignments/telnet-options/
pub const BINARY: u8 = 0; // 8-bit data path
pub const ECHO: u8 = 1; // echo
pub const RCP: u8 = 2; // prepare to reconnect
pub const SGA: u8 = 3; // suppress go ahead
pub const NAMS: u8 = 4; // approximate message size
pub const STATUS: u8 = 5; // give status
pub const TM: u8 = 6; // timing mark
pub const RCTE: u8 = 7; // remote controlled transmission and echo
pub const NAOL: u8 = 8; // negotiate about output line width
pub const NAOP: u8 = 9; // negotiate about output page size
pub const NAOCRD: u8 = 10; // negotiate about CR disposition
pub const NAOHTS: u8 = 11; // negotiate about horizontal tabstops
pub const NAOHTD: u8 = 12; // negotiate about horizontal tab disposition
pub const NAOFFD: u8 = 13; // negotiate about formfeed disposition
pub const NAOVTS: u8 = 14; // negotiate about vertical tab stops
pub const NAOVTD: u8 = 15; // negotiate about vertical tab disposition
pub const NAOLFD: u8 = 16; // negotiate about output LF disposition
pub const XASCII: u8 = 17; // extended ascii character set
pub const LOGOUT: u8 = 18; // force logout
pub const BM: u8 = 19; // byte macro
pub const DET: u8 = 20; // data entry terminal
pub const SUPDUP: u8 = 21; // supdup protocol
pub const SUPDUPOUTPUT: u8 = 22; // supdup output
pub const SNDLOC: u8 = 23; // send location
pub const TTYPE: u8 = 24; // terminal type
pub const EOR: u8 = 25; // end of record
pub const TUID: u8 = 26; // TACACS user identification
pub const OUTMRK: u8 = 27; // output marking
pub const TTYLOC: u8 = 28; // terminal location number
pub const VT3270REGIME: u8 = 29; // 3270 regime
pub const X3PAD: u8 = 30; // X.3 PAD
pub const NAWS: u8 = 31; // negotiate about window size
pub const TSPEED: u8 = 32; // terminal speed
pub const LFLOW: u8 = 33; // remote flow control
pub const LINEMODE: u8 = 34; // linemode
pub const XDISPLOC: u8 = 35; // X display location
pub const OLD_ENVIRON: u8 = 36; // environment variables (old)
pub const AUTHENTICATION: u8 = 37; // authenticate
pub const ENCRYPT: u8 = 38; // encryption
pub const NEW_ENVIRON: u8 = 39; // environment variables (new)

/// NAWS dimensions are 16-bit on the wire; larger values are clamped.
pub const MAX_WINDOW_WIDTH: u32 = u16::MAX as u32;
pub const MAX_WINDOW_HEIGHT: u32 = u16::MAX as u32;

/// Human-readable name for a command byte or option code, if it has one.
pub fn name(code: u8) -> Option<&'static str> {
    let name = match code {
        IAC => "IAC",
        DONT => "DONT",
        DO => "DO",
        WONT => "WONT",
        WILL => "WILL",
        SB => "SB",
        SE => "SE",
        NOP => "NOP",
        DM => "DM",
        BRK => "BRK",
        IP => "IP",
        AO => "AO",
        AYT => "AYT",
        EC => "EC",
        EL => "EL",
        GA => "GA",
        BINARY => "BINARY",
        ECHO => "ECHO",
        RCP => "RCP",
        SGA => "SGA",
        NAMS => "NAMS",
        STATUS => "STATUS",
        TM => "TM",
        RCTE => "RCTE",
        NAOL => "NAOL",
        NAOP => "NAOP",
        NAOCRD => "NAOCRD",
        NAOHTS => "NAOHTS",
        NAOHTD => "NAOHTD",
        NAOFFD => "NAOFFD",
        NAOVTS => "NAOVTS",
        NAOVTD => "NAOVTD",
        NAOLFD => "NAOLFD",
        XASCII => "XASCII",
        LOGOUT => "LOGOUT",
        BM => "BM",
        DET => "DET",
        SUPDUP => "SUPDUP",
        SUPDUPOUTPUT => "SUPDUPOUTPUT",
        SNDLOC => "SNDLOC",
        TTYPE => "TTYPE",
        EOR => "EOR",
        TUID => "TUID",
        OUTMRK => "OUTMRK",
        TTYLOC => "TTYLOC",
        VT3270REGIME => "VT3270REGIME",
        X3PAD => "X3PAD",
        NAWS => "NAWS",
        TSPEED => "TSPEED",
        LFLOW => "LFLOW",
        LINEMODE => "LINEMODE",
        XDISPLOC => "XDISPLOC",
        OLD_ENVIRON => "OLD_ENVIRON",
        AUTHENTICATION => "AUTHENTICATION",
        ENCRYPT => "ENCRYPT",
        NEW_ENVIRON => "NEW_ENVIRON",
        _ => return None,
    };
    Some(name)
}
