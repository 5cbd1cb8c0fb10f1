//! Almanac binary entry point.
//!
//! Bootstraps logging and the bindings file, then runs the interactive
//! session: a two-row key-hint bar at the bottom of the terminal, vi-style
//! count/register command reading, and a help popup per action. Bindings
//! are written back on exit.

mod keyfile;
mod term;

use std::io::stdout;
use std::path::{Path, PathBuf};
use std::sync::Once;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use core_input::{Command, InputReader, TermSource};
use core_keys::{persist, Action, KeyRegistry};
use core_status::{render_hint_bar, render_info_popup, CrosstermSurface};
use term::TermSession;

/// Actions shown in the bottom hint bar, in page order.
const BAR_ACTIONS: [Action; 22] = [
    Action::Help,
    Action::Quit,
    Action::Save,
    Action::Reload,
    Action::ChangeView,
    Action::Import,
    Action::Export,
    Action::Goto,
    Action::OtherCmd,
    Action::ConfigMenu,
    Action::Redraw,
    Action::AddAppt,
    Action::AddTodo,
    Action::AddItem,
    Action::DelItem,
    Action::EditItem,
    Action::ViewItem,
    Action::MoveUp,
    Action::MoveDown,
    Action::MoveLeft,
    Action::MoveRight,
    Action::GotoToday,
];

/// Visible slots per hint-bar page (the pager indicator takes one of them
/// on full pages).
const PAGE_SLOTS: usize = 8;

#[derive(Parser, Debug)]
#[command(name = "almanac", about = "Interactive terminal organizer")]
struct Args {
    /// Configuration directory holding the keys file.
    #[arg(long, value_name = "DIR")]
    directory: Option<PathBuf>,

    /// Print the built-in default key bindings and exit.
    #[arg(long)]
    dump_defaults: bool,
}

/// File logging via the env-filtered subscriber. Returns the worker guard
/// keeping the non-blocking writer alive, or `None` when a subscriber was
/// already installed.
fn configure_logging() -> Option<WorkerGuard> {
    let appender = tracing_appender::rolling::never(".", "almanac.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let result = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(writer)
        .with_ansi(false)
        .try_init();
    match result {
        Ok(()) => Some(guard),
        Err(_) => None,
    }
}

/// Panics inside the raw-mode session would otherwise vanish with the
/// alternate screen; log them before unwinding.
fn install_panic_hook() {
    static HOOK: Once = Once::new();
    HOOK.call_once(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            error!(target: "runtime.panic", %info, "panic");
            previous(info);
        }));
    });
}

fn keys_file_path(args: &Args) -> PathBuf {
    if let Some(dir) = &args.directory {
        return dir.join("keys");
    }
    match dirs::config_dir() {
        Some(base) => base.join("almanac").join("keys"),
        None => PathBuf::from("keys"),
    }
}

/// Load the bindings file, creating it from the defaults on first run, and
/// backfill any actions a stale file does not mention.
fn bootstrap(path: &Path) -> Result<KeyRegistry> {
    if !path.exists() {
        keyfile::create_default(path)
            .with_context(|| format!("first-run setup failed for {}", path.display()))?;
        info!(target: "runtime.init", path = %path.display(), "default_keys_file_created");
    }

    let mut registry = KeyRegistry::new();
    let stats = keyfile::load(&mut registry, path)?;
    info!(
        target: "runtime.init",
        bound = stats.bound,
        undefined = stats.undefined,
        unknown = stats.unknown_labels,
        conflicts = stats.conflicts,
        "keys_file_loaded"
    );

    if persist::check_undefined(&registry) {
        warn!(target: "runtime.init", "some_actions_have_no_binding");
    }
    if persist::check_missing(&registry) {
        match persist::fill_missing(&mut registry) {
            Ok(assigned) => {
                info!(target: "runtime.init", assigned, "missing_defaults_applied")
            }
            Err(err) => warn!(target: "runtime.init", %err, "default_fill_incomplete"),
        }
    }
    Ok(registry)
}

fn run(registry: &mut KeyRegistry, path: &Path) -> Result<()> {
    let mut session = TermSession::new();
    session.enter()?;

    let mut reader = InputReader::new(TermSource::new());
    let mut page_base = 0usize;
    let outcome = (|| -> Result<()> {
        loop {
            let (cols, rows) = session.size()?;
            let mut bar = CrosstermSurface::new(
                stdout(),
                (0, rows.saturating_sub(2)),
                (cols, 2),
            );
            render_hint_bar(&mut bar, registry, &BAR_ACTIONS, page_base, PAGE_SLOTS)?;

            match reader.read_command(registry)? {
                Command::Resize => continue,
                Command::Key {
                    action: Some(Action::Quit),
                    ..
                } => break,
                Command::Key {
                    action: Some(Action::Save),
                    ..
                } => {
                    keyfile::save(registry, path)?;
                    info!(target: "runtime.main", path = %path.display(), "bindings_saved");
                }
                Command::Key {
                    action: Some(Action::OtherCmd),
                    ..
                } => {
                    // Each full page repeats nothing; the pager slot replaces
                    // the last real entry, so advance by one less.
                    page_base += PAGE_SLOTS - 1;
                    if page_base >= BAR_ACTIONS.len() {
                        page_base = 0;
                    }
                }
                Command::Key {
                    action: Some(Action::Help),
                    ..
                } => {
                    let mut screen = CrosstermSurface::new(stdout(), (0, 0), (cols, rows));
                    render_info_popup(&mut screen, &mut reader, Action::Help)?;
                }
                Command::Key {
                    action: Some(action),
                    count,
                    register,
                } => {
                    info!(
                        target: "runtime.main",
                        action = action.label(),
                        count,
                        register,
                        "dispatch"
                    );
                }
                Command::Key { action: None, .. } => {}
            }
        }
        Ok(())
    })();

    session.leave()?;
    outcome?;

    keyfile::save(registry, path)?;
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    let _guard = configure_logging();
    install_panic_hook();

    if args.dump_defaults {
        persist::dump_defaults(&mut stdout())?;
        return Ok(());
    }

    let path = keys_file_path(&args);
    let mut registry = bootstrap(&path)?;
    run(&mut registry, &path)
}
