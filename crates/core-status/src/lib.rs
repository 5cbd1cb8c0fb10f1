//! core-status: status-bar hints and the per-action info popup.
//!
//! Both helpers consume catalog metadata and registry queries only; they
//! never mutate bindings. Rendering goes through the [`Surface`] trait so
//! tests draw into an in-memory grid.

pub mod surface;

pub use surface::{chop_to_width, CrosstermSurface, GridSurface, Surface};

use anyhow::Result;
use tracing::trace;

use core_input::{InputReader, KeySource};
use core_keys::{Action, KeyRegistry};

/// Display columns reserved for a key name in the hint bar.
pub const KEY_WIDTH: usize = 3;
/// Display columns reserved for the action label next to it.
pub const LABEL_WIDTH: usize = 8;

/// Rows of the info popup window.
pub const POPUP_ROWS: u16 = 10;

/// Lay out up to `page_size` (key, label) pairs from `actions` in a two-row
/// grid filling the surface width.
///
/// Entries flow top-to-bottom then left-to-right. Key names are chopped to
/// [`KEY_WIDTH`] columns and right-aligned within their column. On a full
/// page that is not the last one, the final slot shows the "other commands"
/// indicator instead of the next real binding, so the user can page on.
pub fn render_hint_bar<S: Surface>(
    surface: &mut S,
    registry: &KeyRegistry,
    actions: &[Action],
    page_base: usize,
    page_size: usize,
) -> Result<()> {
    let count = actions.len();
    let page_size = page_size.min(count.saturating_sub(page_base));
    surface.clear_rows(0, 2)?;
    if page_size == 0 {
        return surface.flush();
    }

    let columns = surface.columns() as usize;
    // Padding between two slots, from distributing both rows over the page.
    let slot = KEY_WIDTH + LABEL_WIDTH + 1;
    let padding = (columns * 2 / page_size).saturating_sub(slot);
    let slot_len = slot + padding;

    for i in 0..page_size {
        let key_x = (i / 2) * slot_len;
        let row = (i % 2) as u16;

        let action = if i < page_size - 1 || page_base + i == count - 1 {
            actions[page_base + i]
        } else {
            Action::OtherCmd
        };

        let (key, width) = chop_to_width(registry.first(action), KEY_WIDTH);
        let shift = KEY_WIDTH - width;
        surface.put((key_x + shift) as u16, row, &key, true)?;
        surface.put((key_x + KEY_WIDTH + 1) as u16, row, action.bar_label(), false)?;
    }
    trace!(target: "status.hints", page_base, page_size, "hint_bar_rendered");
    surface.flush()
}

fn wrap_words(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    for word in text.split_whitespace() {
        if !line.is_empty() && line.len() + 1 + word.len() > width {
            lines.push(std::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(word);
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

/// Show a centered modal describing `action`, then block until any key is
/// read and clear the modal's rows.
pub fn render_info_popup<S: Surface, R: KeySource>(
    surface: &mut S,
    reader: &mut InputReader<R>,
    action: Action,
) -> Result<()> {
    let columns = surface.columns();
    let rows = surface.rows();
    let win_w = columns.saturating_sub(4);
    let win_h = POPUP_ROWS.min(rows);
    if win_w < 6 || win_h < 4 {
        // Terminal too small for a modal; still honor the blocking contract.
        return reader.wait_for_any_key();
    }
    let top = (rows - win_h) / 2;
    let left = (columns - win_w) / 2;

    surface.clear_rows(top, win_h)?;

    let horizontal: String = "-".repeat(win_w as usize - 2);
    surface.put(left, top, &format!("+{horizontal}+"), false)?;
    for row in top + 1..top + win_h - 1 {
        surface.put(left, row, "|", false)?;
        surface.put(left + win_w - 1, row, "|", false)?;
    }
    surface.put(left, top + win_h - 1, &format!("+{horizontal}+"), false)?;

    surface.put(left + 2, top + 1, action.label(), true)?;
    for (i, line) in wrap_words(action.description(), win_w as usize - 4)
        .iter()
        .take(win_h as usize - 4)
        .enumerate()
    {
        surface.put(left + 2, top + 3 + i as u16, line, false)?;
    }
    surface.flush()?;

    reader.wait_for_any_key()?;
    surface.clear_rows(top, win_h)?;
    surface.flush()
}
