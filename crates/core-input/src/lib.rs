//! core-input: blocking key input resolution.
//!
//! One logical key event is read from a [`KeySource`] as either an extended
//! non-character unit (arrow keys, resize) or a stream of bytes. Multi-byte
//! UTF-8 sequences are reassembled here with the total length derived solely
//! from the leading byte, then offset into the Unicode key range.
//! [`InputReader::read_command`] additionally consumes vi-style count and
//! register prefixes before resolving the final key through the registry.
//!
//! Everything blocks the calling thread until input arrives; tests inject a
//! finite [`ScriptedSource`] to stay deterministic.

mod term_source;
pub use term_source::TermSource;

use std::collections::VecDeque;

use anyhow::{bail, Result};
use tracing::{debug, trace};

use core_keys::codec::{utf8_decode, utf8_length, KEY_RESIZE, UNICODE_BASE};
use core_keys::{Action, KeyCode, KeyRegistry};

/// One unit delivered by a key source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawUnit {
    /// A single byte of character input; multi-byte sequences arrive as
    /// consecutive `Byte` units.
    Byte(u8),
    /// A fully resolved extended key code (arrows, function keys, resize).
    Special(KeyCode),
}

/// Blocking source of input units. The terminal implementation is
/// [`TermSource`]; test harnesses use [`ScriptedSource`].
pub trait KeySource {
    fn next_unit(&mut self) -> Result<RawUnit>;
}

/// Result of [`InputReader::read_command`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Key {
        /// The bound action, or `None` for an unbound key.
        action: Option<Action>,
        /// Repeat count, defaulting to 1 when no prefix was given.
        count: u32,
        /// Register selector: 0 is the default register, 1-9 from digit
        /// selectors, 10-35 from letter selectors.
        register: u8,
    },
    /// Terminal resize, surfaced without virtual-key resolution.
    Resize,
}

pub struct InputReader<S> {
    source: S,
    /// A special unit that interrupted a multi-byte sequence, replayed on
    /// the next read.
    pending: Option<RawUnit>,
}

impl<S: KeySource> InputReader<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            pending: None,
        }
    }

    /// Read one logical key.
    ///
    /// Extended units and complete single-byte sequences pass through
    /// directly. A multi-byte leading byte pulls its continuation bytes from
    /// the same source and decodes leniently: a sequence cut short by a
    /// special unit decodes from whatever arrived, never fails.
    pub fn read_key(&mut self) -> Result<KeyCode> {
        let unit = match self.pending.take() {
            Some(unit) => unit,
            None => self.source.next_unit()?,
        };
        match unit {
            RawUnit::Special(code) => Ok(code),
            RawUnit::Byte(lead) => {
                let len = utf8_length(lead);
                if len == 1 {
                    return Ok(lead as KeyCode);
                }
                let mut buf = [0u8; 4];
                buf[0] = lead;
                let mut have = 1;
                while have < len {
                    match self.source.next_unit()? {
                        RawUnit::Byte(b) => {
                            buf[have] = b;
                            have += 1;
                        }
                        special @ RawUnit::Special(_) => {
                            self.pending = Some(special);
                            break;
                        }
                    }
                }
                let cp = utf8_decode(&buf[..have]);
                trace!(target: "input.read", code_point = cp, bytes = have, "multibyte_key");
                Ok(cp + UNICODE_BASE)
            }
        }
    }

    /// Read one command: optional count prefix, optional register selector,
    /// then the command key resolved through `registry`.
    ///
    /// A lone `0` is not a count — `0` is itself a bindable key ("start of
    /// week") — so the count loop only treats `0` as a digit once a nonzero
    /// count has accumulated. A `"` introduces the register selector;
    /// anything other than `1`-`9` or `a`-`z` after it silently aborts the
    /// selection. A resize event bypasses resolution entirely.
    pub fn read_command(&mut self, registry: &KeyRegistry) -> Result<Command> {
        const ZERO: KeyCode = '0' as KeyCode;

        let mut count: u32 = 0;
        let mut ch: KeyCode = ZERO;
        loop {
            count = count.saturating_mul(10).saturating_add(ch - ZERO);
            ch = self.read_key()?;
            let extends =
                (ch == ZERO && count > 0) || ('1' as KeyCode..='9' as KeyCode).contains(&ch);
            if !extends {
                break;
            }
        }
        if count == 0 {
            count = 1;
        }

        let mut register = 0u8;
        if ch == '"' as KeyCode {
            let selector = self.read_key()?;
            if ('1' as KeyCode..='9' as KeyCode).contains(&selector) {
                register = (selector - '1' as KeyCode) as u8 + 1;
            } else if ('a' as KeyCode..='z' as KeyCode).contains(&selector) {
                register = (selector - 'a' as KeyCode) as u8 + 10;
            }
            ch = self.read_key()?;
        }

        if ch == KEY_RESIZE {
            return Ok(Command::Resize);
        }
        let action = registry.lookup(ch);
        debug!(
            target: "input.read",
            key = ch,
            action = action.map(Action::label),
            count,
            register,
            "command"
        );
        Ok(Command::Key {
            action,
            count,
            register,
        })
    }

    /// Block until any key arrives, discarding it.
    pub fn wait_for_any_key(&mut self) -> Result<()> {
        self.read_key().map(drop)
    }
}

/// Finite, pre-scripted key source for tests and harnesses. Reading past
/// the end is an error rather than a block.
#[derive(Debug, Default)]
pub struct ScriptedSource {
    units: VecDeque<RawUnit>,
}

impl ScriptedSource {
    pub fn new(units: impl IntoIterator<Item = RawUnit>) -> Self {
        Self {
            units: units.into_iter().collect(),
        }
    }

    /// Script the UTF-8 bytes of `text`, exactly as a terminal would deliver
    /// typed characters.
    pub fn from_text(text: &str) -> Self {
        Self::new(text.bytes().map(RawUnit::Byte))
    }

    pub fn push(&mut self, unit: RawUnit) {
        self.units.push_back(unit);
    }
}

impl KeySource for ScriptedSource {
    fn next_unit(&mut self) -> Result<RawUnit> {
        match self.units.pop_front() {
            Some(unit) => Ok(unit),
            None => bail!("scripted input exhausted"),
        }
    }
}
