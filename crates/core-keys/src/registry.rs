//! Bidirectional binding registry.
//!
//! Forward direction: per-action ordered binding lists (first entry is the
//! primary display key, save order is insertion order). Reverse direction:
//! which action a physical key is bound to, held as a dense slot table for
//! the byte + extended ranges and a hash map for the Unicode range. Every
//! mutation updates both directions together; a key appears in at most one
//! binding at any time.

use std::collections::HashMap;

use smallvec::SmallVec;
use thiserror::Error;
use tracing::debug;

use crate::codec::{KeyCodec, UNICODE_BASE};
use crate::{Action, KeyCode};

/// Ordered display names bound to one action. Almost always one or two.
pub type BindingList = SmallVec<[String; 2]>;

/// Placeholder shown for the primary key of an action without bindings.
pub const NO_KEY: &str = "XXX";

/// Literal token representing the explicitly-cleared state in the persisted
/// format and in [`KeyRegistry::all`].
pub const UNDEFINED: &str = "UNDEFINED";

/// Per-action binding state.
///
/// `Uninitialized` means no entry was ever recorded for the action (e.g. the
/// catalog grew after the user's file was written); `Undefined` means the
/// user explicitly cleared every binding. The two must stay distinguishable
/// across a save/reload cycle.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum BindingState {
    #[default]
    Uninitialized,
    Undefined,
    Bound(BindingList),
}

/// Returned by [`KeyRegistry::assign`] when the key is already taken.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("key {key} is already bound to {}", .bound_to.label())]
pub struct Conflict {
    pub key: KeyCode,
    pub bound_to: Action,
}

#[derive(Debug)]
pub struct KeyRegistry {
    codec: KeyCodec,
    states: Vec<BindingState>,
    /// Reverse map for the byte + extended ranges, indexed by code.
    low: Vec<Option<Action>>,
    /// Reverse map for the Unicode range.
    high: HashMap<KeyCode, Action>,
}

impl Default for KeyRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyRegistry {
    /// Fresh registry: every action `Uninitialized`, both reverse maps empty.
    pub fn new() -> Self {
        Self {
            codec: KeyCodec::new(),
            states: vec![BindingState::default(); Action::COUNT],
            low: vec![None; UNICODE_BASE as usize],
            high: HashMap::new(),
        }
    }

    pub fn codec(&self) -> &KeyCodec {
        &self.codec
    }

    /// The action a physical key is bound to, if any. O(1) for the dense
    /// ranges, hash lookup for the Unicode range.
    pub fn lookup(&self, code: KeyCode) -> Option<Action> {
        if code >= UNICODE_BASE {
            self.high.get(&code).copied()
        } else {
            self.low[code as usize]
        }
    }

    /// Bind `code` to `action`.
    ///
    /// Fails without any change when the key is already bound. A code with
    /// no display name cannot appear in the persisted format and is ignored
    /// (succeeds without binding anything).
    pub fn assign(&mut self, code: KeyCode, action: Action) -> Result<(), Conflict> {
        let Some(name) = self.codec.code_to_name(code) else {
            return Ok(());
        };

        if let Some(bound_to) = self.lookup(code) {
            return Err(Conflict { key: code, bound_to });
        }
        if code >= UNICODE_BASE {
            self.high.insert(code, action);
        } else {
            self.low[code as usize] = Some(action);
        }

        debug!(target: "keys.registry", key = %name, action = action.label(), "assign");
        let state = &mut self.states[action.index()];
        match state {
            BindingState::Bound(list) => list.push(name),
            _ => *state = BindingState::Bound(SmallVec::from_elem(name, 1)),
        }
        Ok(())
    }

    /// Unbind `code` from `action`.
    ///
    /// Clearing the reverse map is unconditional (idempotent when the key is
    /// not bound); the matching list entry is removed by name equality. An
    /// action whose last binding is removed becomes `Undefined`, never
    /// `Uninitialized`.
    pub fn remove(&mut self, code: KeyCode, action: Action) {
        if code >= UNICODE_BASE {
            self.high.remove(&code);
        } else {
            self.low[code as usize] = None;
        }

        let Some(name) = self.codec.code_to_name(code) else {
            return;
        };
        let state = &mut self.states[action.index()];
        if let BindingState::Bound(list) = state {
            if let Some(pos) = list.iter().position(|entry| *entry == name) {
                list.remove(pos);
                debug!(target: "keys.registry", key = %name, action = action.label(), "remove");
            }
            if list.is_empty() {
                *state = BindingState::Undefined;
            }
        }
    }

    /// Record that an action was explicitly cleared. Used when replaying a
    /// persisted `UNDEFINED` entry; an action that already holds bindings is
    /// left untouched.
    pub fn mark_undefined(&mut self, action: Action) {
        let state = &mut self.states[action.index()];
        if *state == BindingState::Uninitialized {
            *state = BindingState::Undefined;
        }
    }

    pub fn state(&self, action: Action) -> &BindingState {
        &self.states[action.index()]
    }

    /// Number of live bindings (0 when undefined or uninitialized).
    pub fn count(&self, action: Action) -> usize {
        match self.state(action) {
            BindingState::Bound(list) => list.len(),
            _ => 0,
        }
    }

    /// Primary display key, or the [`NO_KEY`] placeholder.
    pub fn first(&self, action: Action) -> &str {
        match self.state(action) {
            BindingState::Bound(list) => list.first().map(String::as_str).unwrap_or(NO_KEY),
            _ => NO_KEY,
        }
    }

    /// The `n`-th bound key name, in insertion order.
    pub fn nth(&self, action: Action, n: usize) -> Option<&str> {
        match self.state(action) {
            BindingState::Bound(list) => list.get(n).map(String::as_str),
            _ => None,
        }
    }

    /// All bound key names space-joined, or the literal [`UNDEFINED`] token
    /// when the action has no bindings.
    pub fn all(&self, action: Action) -> String {
        match self.state(action) {
            BindingState::Bound(list) => list.join(" "),
            _ => UNDEFINED.to_string(),
        }
    }

    /// True when at least one action was explicitly cleared.
    pub fn is_undefined_any(&self) -> bool {
        self.states
            .iter()
            .any(|s| *s == BindingState::Undefined)
    }

    /// True when at least one action never received an entry.
    pub fn is_uninitialized_any(&self) -> bool {
        self.states
            .iter()
            .any(|s| *s == BindingState::Uninitialized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{KEY_RESIZE, KEY_UP};
    use pretty_assertions::assert_eq;

    fn code(reg: &KeyRegistry, name: &str) -> KeyCode {
        reg.codec().name_to_code(name).unwrap()
    }

    #[test]
    fn assign_then_lookup_then_remove() {
        let mut reg = KeyRegistry::new();
        let a = code(&reg, "a");
        reg.assign(a, Action::AddItem).unwrap();
        assert_eq!(reg.lookup(a), Some(Action::AddItem));
        reg.remove(a, Action::AddItem);
        assert_eq!(reg.lookup(a), None);
    }

    #[test]
    fn conflicting_assign_leaves_first_binding_in_place() {
        let mut reg = KeyRegistry::new();
        let a = code(&reg, "a");
        reg.assign(a, Action::AddItem).unwrap();
        let err = reg.assign(a, Action::DelItem).unwrap_err();
        assert_eq!(
            err,
            Conflict {
                key: a,
                bound_to: Action::AddItem
            }
        );
        assert_eq!(reg.lookup(a), Some(Action::AddItem));
        assert_eq!(reg.count(Action::DelItem), 0);
    }

    #[test]
    fn removing_one_of_two_keys_keeps_the_other_primary() {
        let mut reg = KeyRegistry::new();
        let lower = code(&reg, "a");
        let upper = code(&reg, "A");
        reg.assign(lower, Action::AddItem).unwrap();
        reg.assign(upper, Action::AddItem).unwrap();
        reg.remove(upper, Action::AddItem);
        assert_eq!(reg.count(Action::AddItem), 1);
        assert_eq!(reg.first(Action::AddItem), "a");
    }

    #[test]
    fn removing_the_last_binding_leaves_undefined_not_uninitialized() {
        let mut reg = KeyRegistry::new();
        let q = code(&reg, "q");
        reg.assign(q, Action::Quit).unwrap();
        reg.remove(q, Action::Quit);
        assert_eq!(*reg.state(Action::Quit), BindingState::Undefined);
        assert_eq!(reg.first(Action::Quit), NO_KEY);
        assert_eq!(reg.all(Action::Quit), UNDEFINED);
        assert!(reg.is_undefined_any());
    }

    #[test]
    fn remove_is_idempotent_for_unbound_keys() {
        let mut reg = KeyRegistry::new();
        let z = code(&reg, "z");
        reg.remove(z, Action::Quit);
        assert_eq!(reg.lookup(z), None);
        assert_eq!(*reg.state(Action::Quit), BindingState::Uninitialized);
    }

    #[test]
    fn binding_order_is_insertion_order() {
        let mut reg = KeyRegistry::new();
        for name in ["s", "S", "^S"] {
            let c = code(&reg, name);
            reg.assign(c, Action::Save).unwrap();
        }
        assert_eq!(reg.count(Action::Save), 3);
        assert_eq!(reg.first(Action::Save), "s");
        assert_eq!(reg.nth(Action::Save, 1), Some("S"));
        assert_eq!(reg.nth(Action::Save, 2), Some("^S"));
        assert_eq!(reg.nth(Action::Save, 3), None);
        assert_eq!(reg.all(Action::Save), "s S ^S");
    }

    #[test]
    fn unicode_keys_use_the_extended_map() {
        let mut reg = KeyRegistry::new();
        let euro = reg.codec().name_to_code("€").unwrap();
        assert!(euro >= UNICODE_BASE);
        reg.assign(euro, Action::Help).unwrap();
        assert_eq!(reg.lookup(euro), Some(Action::Help));
        assert_eq!(reg.first(Action::Help), "€");
        reg.remove(euro, Action::Help);
        assert_eq!(reg.lookup(euro), None);
    }

    #[test]
    fn extended_event_keys_bind_like_any_other() {
        let mut reg = KeyRegistry::new();
        reg.assign(KEY_UP, Action::MoveUp).unwrap();
        assert_eq!(reg.lookup(KEY_UP), Some(Action::MoveUp));
        assert_eq!(reg.first(Action::MoveUp), "UP");
    }

    #[test]
    fn unnamed_codes_are_ignored() {
        let mut reg = KeyRegistry::new();
        assert_eq!(reg.assign(KEY_RESIZE, Action::Redraw), Ok(()));
        assert_eq!(reg.lookup(KEY_RESIZE), None);
        assert_eq!(*reg.state(Action::Redraw), BindingState::Uninitialized);
    }

    #[test]
    fn global_scans_distinguish_the_three_states() {
        let mut reg = KeyRegistry::new();
        assert!(reg.is_uninitialized_any());
        assert!(!reg.is_undefined_any());

        let q = code(&reg, "q");
        reg.assign(q, Action::Quit).unwrap();
        reg.remove(q, Action::Quit);
        assert!(reg.is_undefined_any());

        reg.mark_undefined(Action::Help);
        assert_eq!(*reg.state(Action::Help), BindingState::Undefined);
    }
}
