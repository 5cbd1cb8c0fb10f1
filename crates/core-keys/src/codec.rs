//! Physical-key identity and its human-readable name.
//!
//! A physical key is a `u32` partitioned into three disjoint ranges:
//!
//! 1. ordinary single-byte codes `0..=127`;
//! 2. extended non-character events (arrows, paging, function keys, resize)
//!    in `128..UNICODE_BASE`;
//! 3. multi-byte characters as `UNICODE_BASE + code point`, which cannot
//!    collide with the first two ranges.
//!
//! Ranges 1-2 carry a cached display name built once at construction, with
//! short forms substituted for the verbose defaults (TAB, RET, ESC, SPC, the
//! arrow keys, paging, F1-F12). Range 3 names are the UTF-8 character itself.

use crate::KeyCode;

pub const TAB: KeyCode = 9;
pub const RETURN: KeyCode = 10;
pub const ESCAPE: KeyCode = 27;
pub const SPACE: KeyCode = 32;

/// First extended (non-character) code, immediately above the byte range.
pub const EXTENDED_BASE: KeyCode = 128;

pub const KEY_UP: KeyCode = 128;
pub const KEY_DOWN: KeyCode = 129;
pub const KEY_LEFT: KeyCode = 130;
pub const KEY_RIGHT: KeyCode = 131;
pub const KEY_HOME: KeyCode = 132;
pub const KEY_END: KeyCode = 133;
pub const KEY_PAGE_UP: KeyCode = 134;
pub const KEY_PAGE_DOWN: KeyCode = 135;
pub const KEY_INSERT: KeyCode = 136;
pub const KEY_DELETE: KeyCode = 137;
pub const KEY_BTAB: KeyCode = 138;
/// Function keys: `key_f(1)` through `key_f(12)`.
pub const fn key_f(n: u32) -> KeyCode {
    138 + n
}
/// Terminal resize event. Has no display name and cannot be bound.
pub const KEY_RESIZE: KeyCode = 151;

/// Everything at or above this code is a Unicode code point plus the offset.
pub const UNICODE_BASE: KeyCode = 152;

/// Expected total length of a UTF-8 sequence, derived solely from the
/// leading byte. Continuation or invalid leading bytes count as one.
pub fn utf8_length(lead: u8) -> usize {
    if lead >= 0xF0 {
        4
    } else if lead >= 0xE0 {
        3
    } else if lead >= 0xC0 {
        2
    } else {
        1
    }
}

/// Lenient UTF-8 decode. The sequence length comes from the leading byte
/// only; missing continuation bytes simply stop the accumulation, so a
/// truncated or invalid sequence yields a (possibly nonsensical) code point
/// instead of a failure.
pub fn utf8_decode(bytes: &[u8]) -> u32 {
    let Some(&lead) = bytes.first() else {
        return 0;
    };
    let len = utf8_length(lead);
    let mut cp = match len {
        2 => (lead & 0x1F) as u32,
        3 => (lead & 0x0F) as u32,
        4 => (lead & 0x07) as u32,
        _ => lead as u32,
    };
    for &b in bytes.iter().skip(1).take(len - 1) {
        cp = (cp << 6) | (b & 0x3F) as u32;
    }
    cp
}

/// Converts between a physical key's integer identity and its display name.
///
/// The name table for ranges 1-2 is built once; multiple alias names may
/// resolve to the same code (canonicalization, not a bijection), but every
/// named code round-trips: `name_to_code(code_to_name(c)) == c`.
#[derive(Debug)]
pub struct KeyCodec {
    names: Vec<Option<String>>,
}

impl Default for KeyCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyCodec {
    pub fn new() -> Self {
        let mut names: Vec<Option<String>> = vec![None; UNICODE_BASE as usize];

        // Conventional names for the byte range: control keys in caret
        // notation, printable characters as themselves. Code 0 stays unnamed.
        for c in 1u32..128 {
            names[c as usize] = Some(match c {
                1..=31 => format!("^{}", char::from_u32(c + 64).unwrap_or('?')),
                127 => "^?".to_string(),
                _ => char::from_u32(c).unwrap_or('?').to_string(),
            });
        }

        // Short forms replacing the verbose defaults.
        let short: &[(KeyCode, &str)] = &[
            (TAB, "TAB"),
            (RETURN, "RET"),
            (ESCAPE, "ESC"),
            (SPACE, "SPC"),
            (KEY_UP, "UP"),
            (KEY_DOWN, "DWN"),
            (KEY_LEFT, "LFT"),
            (KEY_RIGHT, "RGT"),
            (KEY_HOME, "HOM"),
            (KEY_END, "END"),
            (KEY_PAGE_DOWN, "PgD"),
            (KEY_PAGE_UP, "PgU"),
            (KEY_INSERT, "INS"),
            (KEY_DELETE, "DEL"),
            (KEY_BTAB, "KEY_BTAB"),
        ];
        for &(code, name) in short {
            names[code as usize] = Some(name.to_string());
        }
        for n in 1..=12 {
            names[key_f(n) as usize] = Some(format!("F{n}"));
        }

        Self { names }
    }

    /// Resolve a key name to its code.
    ///
    /// Legacy aliases are checked first for backwards compatibility with
    /// bindings files written by old releases; then the name table; any
    /// remaining name is decoded as a UTF-8 character into range 3. An empty
    /// name yields `None`.
    pub fn name_to_code(&self, name: &str) -> Option<KeyCode> {
        if name.is_empty() {
            return None;
        }

        match name {
            "^J" => return Some(RETURN),
            "KEY_HOME" => return Some(KEY_HOME),
            "KEY_END" => return Some(KEY_END),
            _ => {}
        }

        for (code, entry) in self.names.iter().enumerate() {
            if entry.as_deref() == Some(name) {
                return Some(code as KeyCode);
            }
        }

        name.chars().next().map(|c| c as KeyCode + UNICODE_BASE)
    }

    /// Display name for a code: the cached table entry for ranges 1-2 (or
    /// `None` for slots without a printable name, such as resize), the UTF-8
    /// character itself for range 3.
    pub fn code_to_name(&self, code: KeyCode) -> Option<String> {
        if code >= UNICODE_BASE {
            char::from_u32(code - UNICODE_BASE).map(|c| c.to_string())
        } else {
            self.names[code as usize].clone()
        }
    }
}
