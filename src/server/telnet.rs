//! Minimal Telnet option handling.
//!
//! The server asks the client for character-at-a-time input with no local
//! echo and for window size reports (NAWS, RFC 1073). Everything else the
//! client negotiates is accepted silently and dropped.

/// Interpret As Command.
pub const IAC: u8 = 0xFF;
pub const DONT: u8 = 0xFE;
pub const DO: u8 = 0xFD;
pub const WONT: u8 = 0xFC;
pub const WILL: u8 = 0xFB;
/// Subnegotiation begin.
pub const SB: u8 = 0xFA;
/// Subnegotiation end.
pub const SE: u8 = 0xF0;

pub const OPT_ECHO: u8 = 1;
pub const OPT_SGA: u8 = 3;
/// Negotiate About Window Size.
pub const OPT_NAWS: u8 = 31;

const MAX_SUBNEGOTIATION: usize = 64;

/// Bytes the server sends right after accepting a connection.
pub fn negotiation() -> Vec<u8> {
    vec![
        IAC, WILL, OPT_ECHO, //
        IAC, WILL, OPT_SGA, //
        IAC, DO, OPT_SGA, //
        IAC, DO, OPT_NAWS,
    ]
}

/// A piece of the client's stream with Telnet framing removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TelnetChunk {
    /// Raw terminal input.
    Data(Vec<u8>),
    /// The client reported its window size.
    WindowSize { width: u16, height: u16 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Data,
    Iac,
    Negotiate,
    Sub,
    SubIac,
}

/// Incremental parser for the client side of a Telnet stream.
///
/// Commands may be split across reads; the parser keeps its state between
/// calls to [`TelnetParser::feed`].
#[derive(Debug)]
pub struct TelnetParser {
    state: State,
    sub: Vec<u8>,
}

impl Default for TelnetParser {
    fn default() -> Self {
        Self::new()
    }
}

impl TelnetParser {
    pub fn new() -> Self {
        Self {
            state: State::Data,
            sub: Vec::new(),
        }
    }

    pub fn feed(&mut self, input: &[u8]) -> Vec<TelnetChunk> {
        let mut chunks = Vec::new();
        let mut data = Vec::new();

        for &byte in input {
            match self.state {
                State::Data => {
                    if byte == IAC {
                        self.state = State::Iac;
                    } else {
                        data.push(byte);
                    }
                }
                State::Iac => {
                    self.state = match byte {
                        IAC => {
                            data.push(IAC);
                            State::Data
                        }
                        DO | DONT | WILL | WONT => State::Negotiate,
                        SB => {
                            self.sub.clear();
                            State::Sub
                        }
                        // NOP, GA, AYT and friends carry no payload.
                        _ => State::Data,
                    };
                }
                State::Negotiate => self.state = State::Data,
                State::Sub => {
                    if byte == IAC {
                        self.state = State::SubIac;
                    } else if self.sub.len() < MAX_SUBNEGOTIATION {
                        self.sub.push(byte);
                    }
                }
                State::SubIac => match byte {
                    SE => {
                        self.state = State::Data;
                        if let Some(size) = self.window_size() {
                            if !data.is_empty() {
                                chunks.push(TelnetChunk::Data(std::mem::take(&mut data)));
                            }
                            chunks.push(size);
                        }
                        self.sub.clear();
                    }
                    IAC => {
                        if self.sub.len() < MAX_SUBNEGOTIATION {
                            self.sub.push(IAC);
                        }
                        self.state = State::Sub;
                    }
                    _ => self.state = State::Sub,
                },
            }
        }

        if !data.is_empty() {
            chunks.push(TelnetChunk::Data(data));
        }
        chunks
    }

    fn window_size(&self) -> Option<TelnetChunk> {
        match self.sub.as_slice() {
            [OPT_NAWS, w_hi, w_lo, h_hi, h_lo] => Some(TelnetChunk::WindowSize {
                width: u16::from_be_bytes([*w_hi, *w_lo]),
                height: u16::from_be_bytes([*h_hi, *h_lo]),
            }),
            _ => None,
        }
    }
}
