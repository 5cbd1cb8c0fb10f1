//! Crossterm-backed key source.
//!
//! Terminal events are flattened into the byte/extended unit model consumed
//! by the reader: typed characters become their UTF-8 bytes, control chords
//! become the corresponding control byte (`Ctrl-A` → `0x01`), non-character
//! keys become extended codes. Key releases and unrelated terminal events
//! are discarded.

use std::collections::VecDeque;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode as CtKey, KeyEvent, KeyEventKind, KeyModifiers};

use core_keys::codec::{
    key_f, ESCAPE, KEY_BTAB, KEY_DELETE, KEY_DOWN, KEY_END, KEY_HOME, KEY_INSERT, KEY_LEFT,
    KEY_PAGE_DOWN, KEY_PAGE_UP, KEY_RESIZE, KEY_RIGHT, KEY_UP, RETURN, TAB,
};

use crate::{KeySource, RawUnit};

/// Blocking terminal source over `crossterm::event::read`.
#[derive(Debug, Default)]
pub struct TermSource {
    queue: VecDeque<RawUnit>,
}

impl TermSource {
    pub fn new() -> Self {
        Self::default()
    }

    fn enqueue(&mut self, key: KeyEvent) {
        match key.code {
            CtKey::Char(c) if key.modifiers.contains(KeyModifiers::CONTROL) => {
                if c.is_ascii() {
                    self.queue
                        .push_back(RawUnit::Byte(c.to_ascii_uppercase() as u8 & 0x1F));
                }
            }
            CtKey::Char(c) => {
                let mut buf = [0u8; 4];
                for b in c.encode_utf8(&mut buf).bytes() {
                    self.queue.push_back(RawUnit::Byte(b));
                }
            }
            CtKey::Enter => self.queue.push_back(RawUnit::Byte(RETURN as u8)),
            CtKey::Tab => self.queue.push_back(RawUnit::Byte(TAB as u8)),
            CtKey::Esc => self.queue.push_back(RawUnit::Byte(ESCAPE as u8)),
            CtKey::Backspace => self.queue.push_back(RawUnit::Byte(0x7F)),
            CtKey::BackTab => self.queue.push_back(RawUnit::Special(KEY_BTAB)),
            CtKey::Up => self.queue.push_back(RawUnit::Special(KEY_UP)),
            CtKey::Down => self.queue.push_back(RawUnit::Special(KEY_DOWN)),
            CtKey::Left => self.queue.push_back(RawUnit::Special(KEY_LEFT)),
            CtKey::Right => self.queue.push_back(RawUnit::Special(KEY_RIGHT)),
            CtKey::Home => self.queue.push_back(RawUnit::Special(KEY_HOME)),
            CtKey::End => self.queue.push_back(RawUnit::Special(KEY_END)),
            CtKey::PageUp => self.queue.push_back(RawUnit::Special(KEY_PAGE_UP)),
            CtKey::PageDown => self.queue.push_back(RawUnit::Special(KEY_PAGE_DOWN)),
            CtKey::Insert => self.queue.push_back(RawUnit::Special(KEY_INSERT)),
            CtKey::Delete => self.queue.push_back(RawUnit::Special(KEY_DELETE)),
            CtKey::F(n) if (1..=12).contains(&n) => {
                self.queue.push_back(RawUnit::Special(key_f(n as u32)));
            }
            _ => {}
        }
    }
}

impl KeySource for TermSource {
    fn next_unit(&mut self) -> Result<RawUnit> {
        loop {
            if let Some(unit) = self.queue.pop_front() {
                return Ok(unit);
            }
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => self.enqueue(key),
                Event::Resize(..) => return Ok(RawUnit::Special(KEY_RESIZE)),
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_keys::codec::UNICODE_BASE;
    use core_keys::KeyCode;
    use pretty_assertions::assert_eq;

    fn press(code: CtKey, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    fn drain(source: &mut TermSource) -> Vec<RawUnit> {
        let mut out = Vec::new();
        while let Some(unit) = source.queue.pop_front() {
            out.push(unit);
        }
        out
    }

    #[test]
    fn plain_characters_become_utf8_bytes() {
        let mut source = TermSource::new();
        source.enqueue(press(CtKey::Char('a'), KeyModifiers::NONE));
        assert_eq!(drain(&mut source), vec![RawUnit::Byte(b'a')]);

        source.enqueue(press(CtKey::Char('é'), KeyModifiers::NONE));
        assert_eq!(
            drain(&mut source),
            vec![RawUnit::Byte(0xC3), RawUnit::Byte(0xA9)]
        );
    }

    #[test]
    fn control_chords_become_control_bytes() {
        let mut source = TermSource::new();
        source.enqueue(press(CtKey::Char('a'), KeyModifiers::CONTROL));
        assert_eq!(drain(&mut source), vec![RawUnit::Byte(0x01)]);
    }

    #[test]
    fn non_character_keys_become_extended_codes() {
        let mut source = TermSource::new();
        source.enqueue(press(CtKey::Up, KeyModifiers::NONE));
        source.enqueue(press(CtKey::F(5), KeyModifiers::NONE));
        source.enqueue(press(CtKey::BackTab, KeyModifiers::SHIFT));
        assert_eq!(
            drain(&mut source),
            vec![
                RawUnit::Special(KEY_UP),
                RawUnit::Special(key_f(5)),
                RawUnit::Special(KEY_BTAB),
            ]
        );
    }

    #[test]
    fn multibyte_enqueue_round_trips_through_the_reader() {
        let mut source = TermSource::new();
        source.enqueue(press(CtKey::Char('√'), KeyModifiers::NONE));
        let units = drain(&mut source);
        let mut reader = crate::InputReader::new(crate::ScriptedSource::new(units));
        assert_eq!(reader.read_key().unwrap(), '√' as KeyCode + UNICODE_BASE);
    }
}
