//! Line-oriented bindings-file access.
//!
//! The on-disk format is written by `core_keys::persist`; this module is the
//! collaborator that replays it back into a registry at startup. Each record
//! line is `<label> <key-name tokens...>`; comment and blank lines are
//! skipped. Labels unknown to the running catalog are reported and skipped
//! so files written by newer releases still load. The literal `UNDEFINED`
//! token records an explicitly cleared action, which must stay
//! distinguishable from an action missing from the file entirely.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::warn;

use core_keys::persist;
use core_keys::registry::UNDEFINED;
use core_keys::{Action, KeyRegistry};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LoadStats {
    /// Keys bound while replaying.
    pub bound: usize,
    /// Actions recorded as explicitly cleared.
    pub undefined: usize,
    /// Record lines whose label is not in the catalog.
    pub unknown_labels: usize,
    /// Tokens that lost against an existing binding.
    pub conflicts: usize,
}

/// Replay the persisted content into `registry`.
pub fn replay(registry: &mut KeyRegistry, content: &str) -> LoadStats {
    let mut stats = LoadStats::default();
    for (lineno, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut tokens = line.split_whitespace();
        let Some(label) = tokens.next() else {
            continue;
        };
        let Some(action) = Action::from_label(label) else {
            warn!(target: "keys.file", line = lineno + 1, label, "unknown_action");
            stats.unknown_labels += 1;
            continue;
        };
        for token in tokens {
            if token == UNDEFINED {
                registry.mark_undefined(action);
                stats.undefined += 1;
                continue;
            }
            let Some(code) = registry.codec().name_to_code(token) else {
                continue;
            };
            match registry.assign(code, action) {
                Ok(()) => stats.bound += 1,
                Err(err) => {
                    warn!(
                        target: "keys.file",
                        line = lineno + 1,
                        token,
                        bound_to = err.bound_to.label(),
                        "binding_conflict"
                    );
                    stats.conflicts += 1;
                }
            }
        }
    }
    stats
}

/// Load the bindings file at `path` into `registry`.
pub fn load(registry: &mut KeyRegistry, path: &Path) -> Result<LoadStats> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("cannot read bindings file {}", path.display()))?;
    Ok(replay(registry, &content))
}

/// First-run bootstrap: write the built-in defaults to `path`. The caller
/// treats failure as fatal — the configuration directory is assumed
/// writable.
pub fn create_default(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("cannot create directory {}", parent.display()))?;
    }
    let mut file = fs::File::create(path)
        .with_context(|| format!("could not create default keys file {}", path.display()))?;
    persist::dump_defaults(&mut file)?;
    Ok(())
}

/// Write the live bindings of `registry` to `path`.
pub fn save(registry: &KeyRegistry, path: &Path) -> Result<()> {
    let mut file = fs::File::create(path)
        .with_context(|| format!("could not write keys file {}", path.display()))?;
    persist::save(registry, &mut file)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_keys::BindingState;

    #[test]
    fn replay_binds_tokens_in_order() {
        let mut reg = KeyRegistry::new();
        let stats = replay(&mut reg, "generic-quit  q Q\nmove-down  j DWN\n");
        assert_eq!(stats.bound, 4);
        assert_eq!(reg.all(Action::Quit), "q Q");
        assert_eq!(reg.all(Action::MoveDown), "j DWN");
    }

    #[test]
    fn replay_skips_comments_blanks_and_unknown_labels() {
        let mut reg = KeyRegistry::new();
        let stats = replay(
            &mut reg,
            "# header\n\nno-such-action  z\ngeneric-help  ?\n",
        );
        assert_eq!(stats.unknown_labels, 1);
        assert_eq!(stats.bound, 1);
        assert_eq!(reg.all(Action::Help), "?");
    }

    #[test]
    fn replay_records_explicit_undefined() {
        let mut reg = KeyRegistry::new();
        let stats = replay(&mut reg, "generic-credits  UNDEFINED\n");
        assert_eq!(stats.undefined, 1);
        assert_eq!(*reg.state(Action::Credits), BindingState::Undefined);
        assert!(reg.is_undefined_any());
    }

    #[test]
    fn replay_reports_conflicts_and_keeps_the_first_binding() {
        let mut reg = KeyRegistry::new();
        let stats = replay(&mut reg, "generic-quit  q\nadd-item  q a\n");
        assert_eq!(stats.conflicts, 1);
        assert_eq!(stats.bound, 2);
        let q = reg.codec().name_to_code("q").unwrap();
        assert_eq!(reg.lookup(q), Some(Action::Quit));
        assert_eq!(reg.all(Action::AddItem), "a");
    }

    #[test]
    fn save_then_load_preserves_cleared_actions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keys");

        let mut reg = KeyRegistry::new();
        persist::fill_missing(&mut reg).unwrap();
        let q = reg.codec().name_to_code("q").unwrap();
        let upper_q = reg.codec().name_to_code("Q").unwrap();
        reg.remove(q, Action::Quit);
        reg.remove(upper_q, Action::Quit);
        save(&reg, &path).unwrap();

        let mut loaded = KeyRegistry::new();
        let stats = load(&mut loaded, &path).unwrap();
        assert_eq!(stats.undefined, 1);
        // Explicitly cleared, not merely absent from the file.
        assert_eq!(*loaded.state(Action::Quit), BindingState::Undefined);
        assert_eq!(loaded.all(Action::Save), reg.all(Action::Save));
        assert_eq!(loaded.all(Action::MoveDown), reg.all(Action::MoveDown));
        assert!(!persist::check_missing(&loaded));
    }

    #[test]
    fn create_default_writes_a_loadable_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conf").join("keys");

        create_default(&path).unwrap();
        let mut reg = KeyRegistry::new();
        let stats = load(&mut reg, &path).unwrap();
        assert_eq!(stats.unknown_labels, 0);
        assert_eq!(stats.conflicts, 0);
        assert!(!persist::check_missing(&reg));
        assert_eq!(reg.all(Action::Quit), "q Q");
    }

    #[test]
    fn actions_missing_from_an_old_file_stay_fillable() {
        let mut reg = KeyRegistry::new();
        // A file from a release that predates the paste action.
        replay(&mut reg, "generic-quit  q Q\n");
        assert_eq!(*reg.state(Action::Paste), BindingState::Uninitialized);
        assert!(persist::check_missing(&reg));

        persist::fill_missing(&mut reg).unwrap();
        assert_eq!(reg.all(Action::Paste), "p ^V");
        // The bindings from the file were kept, not replaced.
        assert_eq!(reg.all(Action::Quit), "q Q");
    }
}
