//! Persistence of key bindings and default-binding bootstrap.
//!
//! The persisted format is plain text: a fixed comment header reproduced
//! verbatim on every regeneration, then one record per catalog entry in
//! catalog order: `<label>  <space-separated key-name tokens>`. An action
//! without bindings is serialized as the literal `UNDEFINED` token. The
//! line-oriented parser replaying such a file lives with the embedding
//! program; this module only writes the format and fills gaps from the
//! built-in defaults.

use std::io::{self, Write};

use thiserror::Error;
use tracing::{debug, info};

use crate::registry::{BindingState, Conflict, KeyRegistry};
use crate::Action;

/// Comment header written at the top of every generated bindings file.
pub const KEYS_FILE_HEADER: &str = "#\n\
# Almanac keys configuration file\n\
#\n\
# In this file the keybindings used by Almanac are defined.\n\
# It is generated automatically by Almanac and is maintained\n\
# via the key configuration menu of the interactive user\n\
# interface. It should not be edited directly.\n";

/// Returned by [`fill_missing`] when a default key is already taken.
///
/// Bindings applied before the failing token remain applied; the catalog
/// index of the failing action is surfaced so the caller can tell the user
/// exactly which action needs manual resolution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot apply defaults for {} (catalog entry {index}): {source}", .action.label())]
pub struct FillConflict {
    pub action: Action,
    pub index: usize,
    #[source]
    pub source: Conflict,
}

fn dump_header(sink: &mut impl Write) -> io::Result<()> {
    writeln!(sink, "{KEYS_FILE_HEADER}")
}

/// Write the built-in default bindings, one line per catalog entry.
pub fn dump_defaults(sink: &mut impl Write) -> io::Result<()> {
    dump_header(sink)?;
    for action in Action::ALL {
        writeln!(sink, "{}  {}", action.label(), action.default_binding())?;
    }
    Ok(())
}

/// Write the live bindings of `registry` in the persisted format.
pub fn save(registry: &KeyRegistry, sink: &mut impl Write) -> io::Result<()> {
    dump_header(sink)?;
    for action in Action::ALL {
        writeln!(sink, "{}  {}", action.label(), registry.all(action))?;
    }
    Ok(())
}

/// True when at least one action was explicitly cleared by the user.
/// Callers typically warn before overwriting the file.
pub fn check_undefined(registry: &KeyRegistry) -> bool {
    registry.is_undefined_any()
}

/// True when at least one action never received an entry, i.e. the catalog
/// grew after the loaded file was written. Callers decide whether to prompt
/// or to auto-fill via [`fill_missing`].
pub fn check_missing(registry: &KeyRegistry) -> bool {
    registry.is_uninitialized_any()
}

/// Assign built-in defaults to every uninitialized action, in catalog order
/// and token order.
///
/// Stops at the first conflicting token without rolling back bindings
/// already applied. Returns the number of actions that received at least
/// one default assignment.
pub fn fill_missing(registry: &mut KeyRegistry) -> Result<usize, FillConflict> {
    let mut assigned = 0;
    for (index, action) in Action::ALL.into_iter().enumerate() {
        if *registry.state(action) != BindingState::Uninitialized {
            continue;
        }

        let mut any = false;
        for token in action.default_binding().split_whitespace() {
            let Some(code) = registry.codec().name_to_code(token) else {
                continue;
            };
            match registry.assign(code, action) {
                Ok(()) => any = true,
                Err(source) => {
                    debug!(
                        target: "keys.persist",
                        action = action.label(),
                        token,
                        "default_binding_conflict"
                    );
                    return Err(FillConflict {
                        action,
                        index,
                        source,
                    });
                }
            }
        }
        if any {
            assigned += 1;
        }
    }

    if assigned > 0 {
        info!(target: "keys.persist", assigned, "default_bindings_filled");
    }
    Ok(assigned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn fresh_registry_fills_every_action() {
        let mut reg = KeyRegistry::new();
        assert_eq!(fill_missing(&mut reg), Ok(Action::COUNT));
        assert!(!check_missing(&reg));
        assert!(!check_undefined(&reg));

        // Defaults land in declaration order of the binding string.
        assert_eq!(reg.all(Action::Quit), "q Q");
        assert_eq!(reg.all(Action::Save), "s S ^S");
        assert_eq!(reg.first(Action::StartOfWeek), "0");
    }

    #[test]
    fn fill_skips_initialized_actions() {
        let mut reg = KeyRegistry::new();
        let z = reg.codec().name_to_code("z").unwrap();
        reg.assign(z, Action::Quit).unwrap();
        let filled = fill_missing(&mut reg).unwrap();
        assert_eq!(filled, Action::COUNT - 1);
        // The pre-existing binding is untouched; defaults were not appended.
        assert_eq!(reg.all(Action::Quit), "z");
    }

    #[test]
    fn fill_also_skips_explicitly_cleared_actions() {
        let mut reg = KeyRegistry::new();
        reg.mark_undefined(Action::Credits);
        let filled = fill_missing(&mut reg).unwrap();
        assert_eq!(filled, Action::COUNT - 1);
        assert_eq!(*reg.state(Action::Credits), BindingState::Undefined);
    }

    #[test]
    fn fill_conflict_stops_without_rollback() {
        let mut reg = KeyRegistry::new();
        // Steal '0' so the start-of-week default collides.
        let zero = reg.codec().name_to_code("0").unwrap();
        reg.assign(zero, Action::Quit).unwrap();

        let err = fill_missing(&mut reg).unwrap_err();
        assert_eq!(err.action, Action::StartOfWeek);
        assert_eq!(err.index, Action::StartOfWeek.index());
        assert_eq!(err.source.bound_to, Action::Quit);

        // Everything before the failing entry stayed applied.
        assert_eq!(reg.all(Action::Cancel), "ESC");
        assert_eq!(reg.all(Action::MoveUp), "k K UP");
        // Everything after it was never reached.
        assert_eq!(*reg.state(Action::EndOfWeek), BindingState::Uninitialized);
        assert_eq!(*reg.state(Action::AddItem), BindingState::Uninitialized);
    }

    #[test]
    fn dump_defaults_writes_header_and_catalog_lines() {
        let mut out = Vec::new();
        dump_defaults(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with(KEYS_FILE_HEADER));
        assert!(text.contains("generic-quit  q Q\n"));
        assert!(text.contains("start-of-week  0\n"));
        assert!(text.contains("lower-priority  -\n"));
        let records = text.lines().filter(|l| !l.starts_with('#') && !l.is_empty());
        assert_eq!(records.count(), Action::COUNT);
    }

    #[test]
    fn save_serializes_live_and_undefined_states() {
        let mut reg = KeyRegistry::new();
        fill_missing(&mut reg).unwrap();
        let q = reg.codec().name_to_code("q").unwrap();
        let upper_q = reg.codec().name_to_code("Q").unwrap();
        reg.remove(q, Action::Quit);
        reg.remove(upper_q, Action::Quit);

        let mut out = Vec::new();
        save(&reg, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("generic-quit  UNDEFINED\n"));
        assert!(text.contains("generic-save  s S ^S\n"));
    }
}
