//! Decoding raw terminal bytes into crossterm events.
//!
//! This is the reverse of what a terminal emulator does with key presses:
//! printable UTF-8, C0 control characters, CSI/SS3 escape sequences for the
//! navigation keys, and SGR mouse reports. Sequences split across reads are
//! buffered until the rest arrives. That includes a lone ESC, which only
//! becomes the Escape key once the caller gives up waiting and calls
//! [`InputDecoder::flush`].

use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

const ESC: u8 = 0x1b;

/// Longest escape sequence kept while waiting for its final byte.
const MAX_SEQUENCE: usize = 32;

/// Outcome of looking at the start of the pending buffer.
enum Parsed {
    /// Consumed `n` bytes, optionally producing an event.
    Consumed(usize, Option<Event>),
    /// The buffer holds the beginning of a sequence; wait for more input.
    Incomplete,
}

/// Stateful byte-to-event decoder for one connection.
#[derive(Debug, Default)]
pub struct InputDecoder {
    pending: Vec<u8>,
    /// Last byte seen was a carriage return, so a following LF or NUL is
    /// part of the same Enter.
    after_cr: bool,
}

impl InputDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes held back waiting for the rest of a sequence.
    pub fn pending(&self) -> &[u8] {
        &self.pending
    }

    /// The only byte held back is an ESC that may start a sequence.
    pub fn waiting_on_escape(&self) -> bool {
        self.pending == [ESC]
    }

    /// Resolve a held-back lone ESC as the Escape key.
    ///
    /// Partial sequences that already have more than the ESC stay buffered.
    pub fn flush(&mut self) -> Vec<Event> {
        if self.waiting_on_escape() {
            self.pending.clear();
            vec![key(KeyCode::Esc)]
        } else {
            Vec::new()
        }
    }

    pub fn feed(&mut self, input: &[u8]) -> Vec<Event> {
        self.pending.extend_from_slice(input);

        let mut events = Vec::new();
        let mut pos = 0;
        while pos < self.pending.len() {
            match self.parse(pos) {
                Parsed::Consumed(n, event) => {
                    pos += n;
                    events.extend(event);
                }
                Parsed::Incomplete => break,
            }
        }
        self.pending.drain(..pos);
        events
    }

    fn parse(&mut self, pos: usize) -> Parsed {
        let buf = &self.pending[pos..];
        let byte = buf[0];
        let after_cr = std::mem::replace(&mut self.after_cr, false);

        match byte {
            b'\r' => {
                self.after_cr = true;
                Parsed::Consumed(1, Some(key(KeyCode::Enter)))
            }
            b'\n' | 0x00 if after_cr => Parsed::Consumed(1, None),
            b'\n' => Parsed::Consumed(1, Some(key(KeyCode::Enter))),
            b'\t' => Parsed::Consumed(1, Some(key(KeyCode::Tab))),
            0x7f | 0x08 => Parsed::Consumed(1, Some(key(KeyCode::Backspace))),
            ESC => parse_escape(buf),
            0x01..=0x1a => {
                let letter = char::from(b'a' + byte - 1);
                Parsed::Consumed(1, Some(key_with(KeyCode::Char(letter), KeyModifiers::CONTROL)))
            }
            0x00..=0x1f => Parsed::Consumed(1, None),
            _ => parse_utf8(buf),
        }
    }
}

fn key(code: KeyCode) -> Event {
    key_with(code, KeyModifiers::NONE)
}

fn key_with(code: KeyCode, modifiers: KeyModifiers) -> Event {
    Event::Key(KeyEvent::new(code, modifiers))
}

fn char_event(c: char, modifiers: KeyModifiers) -> Event {
    let modifiers = if c.is_ascii_uppercase() {
        modifiers | KeyModifiers::SHIFT
    } else {
        modifiers
    };
    key_with(KeyCode::Char(c), modifiers)
}

fn parse_utf8(buf: &[u8]) -> Parsed {
    let width = match buf[0] {
        0x00..=0x7f => 1,
        0xc0..=0xdf => 2,
        0xe0..=0xef => 3,
        0xf0..=0xf7 => 4,
        // stray continuation or invalid lead byte
        _ => return Parsed::Consumed(1, None),
    };
    if buf.len() < width {
        return Parsed::Incomplete;
    }
    match std::str::from_utf8(&buf[..width])
        .ok()
        .and_then(|s| s.chars().next())
    {
        Some(c) => Parsed::Consumed(width, Some(char_event(c, KeyModifiers::NONE))),
        None => Parsed::Consumed(1, None),
    }
}

fn parse_escape(buf: &[u8]) -> Parsed {
    match buf.get(1) {
        // The rest of the sequence may still be in flight.
        None => Parsed::Incomplete,
        Some(b'[') => parse_csi(buf),
        Some(b'O') => match buf.get(2) {
            None => Parsed::Incomplete,
            Some(&final_byte) => Parsed::Consumed(3, ss3_key(final_byte).map(key)),
        },
        Some(&ESC) => Parsed::Consumed(1, Some(key(KeyCode::Esc))),
        Some(&next) if (0x20..0x7f).contains(&next) => Parsed::Consumed(
            2,
            Some(char_event(char::from(next), KeyModifiers::ALT)),
        ),
        Some(_) => Parsed::Consumed(1, Some(key(KeyCode::Esc))),
    }
}

fn ss3_key(final_byte: u8) -> Option<KeyCode> {
    Some(match final_byte {
        b'A' => KeyCode::Up,
        b'B' => KeyCode::Down,
        b'C' => KeyCode::Right,
        b'D' => KeyCode::Left,
        b'H' => KeyCode::Home,
        b'F' => KeyCode::End,
        b'P'..=b'S' => KeyCode::F(final_byte - b'P' + 1),
        _ => return None,
    })
}

fn parse_csi(buf: &[u8]) -> Parsed {
    let Some(end) = buf[2..]
        .iter()
        .position(|b| (0x40..=0x7e).contains(b))
        .map(|i| i + 2)
    else {
        return if buf.len() < MAX_SEQUENCE {
            Parsed::Incomplete
        } else {
            Parsed::Consumed(buf.len(), None)
        };
    };

    let params = &buf[2..end];
    let final_byte = buf[end];
    let len = end + 1;

    // X10 mouse report: ESC [ M followed by three raw bytes
    if final_byte == b'M' && params.is_empty() {
        if buf.len() < len + 3 {
            return Parsed::Incomplete;
        }
        let report = &buf[len..len + 3];
        let event = mouse_event(
            u16::from(report[0].saturating_sub(32)),
            u16::from(report[1].saturating_sub(32)),
            u16::from(report[2].saturating_sub(32)),
            true,
        );
        return Parsed::Consumed(len + 3, event);
    }

    let Ok(params) = std::str::from_utf8(params) else {
        return Parsed::Consumed(len, None);
    };

    if let Some(sgr) = params.strip_prefix('<') {
        return Parsed::Consumed(len, sgr_mouse(sgr, final_byte == b'M'));
    }

    let mut fields = params.split(';');
    let first: Option<u16> = fields.next().and_then(|f| f.parse().ok());
    let modifiers = fields
        .next()
        .and_then(|f| f.parse::<u8>().ok())
        .map(modifiers_from_param)
        .unwrap_or(KeyModifiers::NONE);

    let code = match final_byte {
        b'A' => Some(KeyCode::Up),
        b'B' => Some(KeyCode::Down),
        b'C' => Some(KeyCode::Right),
        b'D' => Some(KeyCode::Left),
        b'H' => Some(KeyCode::Home),
        b'F' => Some(KeyCode::End),
        b'Z' => Some(KeyCode::BackTab),
        b'~' => match first {
            Some(1 | 7) => Some(KeyCode::Home),
            Some(2) => Some(KeyCode::Insert),
            Some(3) => Some(KeyCode::Delete),
            Some(4 | 8) => Some(KeyCode::End),
            Some(5) => Some(KeyCode::PageUp),
            Some(6) => Some(KeyCode::PageDown),
            _ => None,
        },
        _ => None,
    };

    let modifiers = if code == Some(KeyCode::BackTab) {
        modifiers | KeyModifiers::SHIFT
    } else {
        modifiers
    };
    Parsed::Consumed(len, code.map(|code| key_with(code, modifiers)))
}

/// xterm modifier parameter: 1 + (shift | alt << 1 | ctrl << 2).
fn modifiers_from_param(param: u8) -> KeyModifiers {
    let bits = param.saturating_sub(1);
    let mut modifiers = KeyModifiers::NONE;
    if bits & 1 != 0 {
        modifiers |= KeyModifiers::SHIFT;
    }
    if bits & 2 != 0 {
        modifiers |= KeyModifiers::ALT;
    }
    if bits & 4 != 0 {
        modifiers |= KeyModifiers::CONTROL;
    }
    modifiers
}

fn sgr_mouse(params: &str, pressed: bool) -> Option<Event> {
    let mut fields = params.split(';').map(|f| f.parse::<u16>().ok());
    let button = fields.next()??;
    let column = fields.next()??;
    let row = fields.next()??;
    mouse_event(button, column, row, pressed)
}

/// Build a mouse event from a 1-based report.
fn mouse_event(button: u16, column: u16, row: u16, pressed: bool) -> Option<Event> {
    let mut modifiers = KeyModifiers::NONE;
    if button & 4 != 0 {
        modifiers |= KeyModifiers::SHIFT;
    }
    if button & 8 != 0 {
        modifiers |= KeyModifiers::ALT;
    }
    if button & 16 != 0 {
        modifiers |= KeyModifiers::CONTROL;
    }

    let which = match button & 0b11 {
        0 => Some(MouseButton::Left),
        1 => Some(MouseButton::Middle),
        2 => Some(MouseButton::Right),
        _ => None,
    };

    let kind = if button & 64 != 0 {
        match button & 0b11 {
            0 => MouseEventKind::ScrollUp,
            1 => MouseEventKind::ScrollDown,
            2 => MouseEventKind::ScrollLeft,
            _ => MouseEventKind::ScrollRight,
        }
    } else if button & 32 != 0 {
        match which {
            Some(b) => MouseEventKind::Drag(b),
            None => MouseEventKind::Moved,
        }
    } else if pressed {
        MouseEventKind::Down(which?)
    } else {
        // X10 reports every release as button 3
        MouseEventKind::Up(which.unwrap_or(MouseButton::Left))
    };

    Some(Event::Mouse(MouseEvent {
        kind,
        column: column.saturating_sub(1),
        row: row.saturating_sub(1),
        modifiers,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(events: &[Event]) -> Vec<(KeyCode, KeyModifiers)> {
        events
            .iter()
            .filter_map(|e| match e {
                Event::Key(k) => Some((k.code, k.modifiers)),
                _ => None,
            })
            .collect()
    }

    fn codes(events: &[Event]) -> Vec<KeyCode> {
        keys(events).into_iter().map(|(code, _)| code).collect()
    }

    #[test]
    fn test_printable_characters() {
        let mut decoder = InputDecoder::new();
        let events = decoder.feed(b"jkG");
        assert_eq!(
            keys(&events),
            vec![
                (KeyCode::Char('j'), KeyModifiers::NONE),
                (KeyCode::Char('k'), KeyModifiers::NONE),
                (KeyCode::Char('G'), KeyModifiers::SHIFT),
            ]
        );
    }

    #[test]
    fn test_enter_variants_produce_one_key() {
        for input in [&b"\r"[..], b"\r\n", b"\r\0", b"\n"] {
            let mut decoder = InputDecoder::new();
            assert_eq!(codes(&decoder.feed(input)), vec![KeyCode::Enter], "{input:?}");
        }
    }

    #[test]
    fn test_cr_lf_split_across_reads() {
        let mut decoder = InputDecoder::new();
        assert_eq!(codes(&decoder.feed(b"\r")), vec![KeyCode::Enter]);
        assert!(decoder.feed(b"\n").is_empty());
        assert_eq!(codes(&decoder.feed(b"\n")), vec![KeyCode::Enter]);
    }

    #[test]
    fn test_control_characters() {
        let mut decoder = InputDecoder::new();
        let events = decoder.feed(&[0x03, 0x7f, 0x08, b'\t']);
        assert_eq!(
            keys(&events),
            vec![
                (KeyCode::Char('c'), KeyModifiers::CONTROL),
                (KeyCode::Backspace, KeyModifiers::NONE),
                (KeyCode::Backspace, KeyModifiers::NONE),
                (KeyCode::Tab, KeyModifiers::NONE),
            ]
        );
    }

    #[test]
    fn test_arrow_keys_csi_and_ss3() {
        let mut decoder = InputDecoder::new();
        let events = decoder.feed(b"\x1b[A\x1b[B\x1bOC\x1bOD");
        assert_eq!(
            codes(&events),
            vec![KeyCode::Up, KeyCode::Down, KeyCode::Right, KeyCode::Left]
        );
    }

    #[test]
    fn test_navigation_keys() {
        let mut decoder = InputDecoder::new();
        let events = decoder.feed(b"\x1b[H\x1b[F\x1b[1~\x1b[4~\x1b[5~\x1b[6~\x1b[2~\x1b[3~");
        assert_eq!(
            codes(&events),
            vec![
                KeyCode::Home,
                KeyCode::End,
                KeyCode::Home,
                KeyCode::End,
                KeyCode::PageUp,
                KeyCode::PageDown,
                KeyCode::Insert,
                KeyCode::Delete,
            ]
        );
    }

    #[test]
    fn test_modified_arrow() {
        let mut decoder = InputDecoder::new();
        assert_eq!(
            keys(&decoder.feed(b"\x1b[1;5A")),
            vec![(KeyCode::Up, KeyModifiers::CONTROL)]
        );
    }

    #[test]
    fn test_lone_escape_waits_for_flush() {
        let mut decoder = InputDecoder::new();
        assert!(decoder.feed(b"\x1b").is_empty());
        assert!(decoder.waiting_on_escape());
        assert_eq!(codes(&decoder.flush()), vec![KeyCode::Esc]);
        assert!(decoder.pending().is_empty());
        assert!(decoder.flush().is_empty());
    }

    #[test]
    fn test_escape_split_from_its_sequence() {
        let mut decoder = InputDecoder::new();
        assert!(decoder.feed(b"\x1b").is_empty());
        assert_eq!(
            keys(&decoder.feed(b"[B")),
            vec![(KeyCode::Down, KeyModifiers::NONE)]
        );
        assert!(decoder.pending().is_empty());
    }

    #[test]
    fn test_flush_keeps_partial_sequence() {
        let mut decoder = InputDecoder::new();
        assert!(decoder.feed(b"\x1b[").is_empty());
        assert!(!decoder.waiting_on_escape());
        assert!(decoder.flush().is_empty());
        assert_eq!(codes(&decoder.feed(b"A")), vec![KeyCode::Up]);
    }

    #[test]
    fn test_double_escape() {
        let mut decoder = InputDecoder::new();
        assert_eq!(codes(&decoder.feed(b"\x1b\x1b")), vec![KeyCode::Esc]);
        assert!(decoder.waiting_on_escape());
    }

    #[test]
    fn test_alt_character() {
        let mut decoder = InputDecoder::new();
        assert_eq!(
            keys(&decoder.feed(b"\x1bx")),
            vec![(KeyCode::Char('x'), KeyModifiers::ALT)]
        );
    }

    #[test]
    fn test_sequence_split_across_reads() {
        let mut decoder = InputDecoder::new();
        assert!(decoder.feed(b"\x1b[").is_empty());
        assert_eq!(decoder.pending(), b"\x1b[");
        assert!(decoder.feed(b"5").is_empty());
        assert_eq!(codes(&decoder.feed(b"~")), vec![KeyCode::PageUp]);
        assert!(decoder.pending().is_empty());
    }

    #[test]
    fn test_utf8_split_across_reads() {
        let mut decoder = InputDecoder::new();
        let bytes = "é".as_bytes();
        assert!(decoder.feed(&bytes[..1]).is_empty());
        assert_eq!(codes(&decoder.feed(&bytes[1..])), vec![KeyCode::Char('é')]);
    }

    #[test]
    fn test_invalid_bytes_are_skipped() {
        let mut decoder = InputDecoder::new();
        assert_eq!(codes(&decoder.feed(&[0x80, 0xff, b'q'])), vec![KeyCode::Char('q')]);
    }

    #[test]
    fn test_sgr_mouse_wheel() {
        let mut decoder = InputDecoder::new();
        let events = decoder.feed(b"\x1b[<64;10;5M\x1b[<65;10;5M");
        assert_eq!(events.len(), 2);
        match &events[0] {
            Event::Mouse(m) => {
                assert_eq!(m.kind, MouseEventKind::ScrollUp);
                assert_eq!((m.column, m.row), (9, 4));
            }
            other => panic!("expected mouse event, got {other:?}"),
        }
        assert!(matches!(
            &events[1],
            Event::Mouse(m) if m.kind == MouseEventKind::ScrollDown
        ));
    }

    #[test]
    fn test_sgr_mouse_click_and_release() {
        let mut decoder = InputDecoder::new();
        let events = decoder.feed(b"\x1b[<0;3;4M\x1b[<0;3;4m");
        let kinds: Vec<MouseEventKind> = events
            .iter()
            .filter_map(|e| match e {
                Event::Mouse(m) => Some(m.kind),
                _ => None,
            })
            .collect();
        assert_eq!(
            kinds,
            vec![
                MouseEventKind::Down(MouseButton::Left),
                MouseEventKind::Up(MouseButton::Left)
            ]
        );
    }

    #[test]
    fn test_unknown_sequence_is_dropped() {
        let mut decoder = InputDecoder::new();
        assert_eq!(codes(&decoder.feed(b"\x1b[99xq")), vec![KeyCode::Char('q')]);
    }

    #[test]
    fn test_runaway_sequence_is_discarded() {
        let mut decoder = InputDecoder::new();
        let mut input = b"\x1b[".to_vec();
        input.extend_from_slice(&[b'1'; 40]);
        assert!(decoder.feed(&input).is_empty());
        assert!(decoder.pending().is_empty());
        assert_eq!(codes(&decoder.feed(b"j")), vec![KeyCode::Char('j')]);
    }
}
