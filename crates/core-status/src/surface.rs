//! Render surface abstraction.
//!
//! The presentation helpers draw through the small [`Surface`] trait so the
//! interactive binary can hand them a crossterm-backed region of the real
//! terminal while tests render into an in-memory grid.

use std::io::Write;

use anyhow::Result;
use crossterm::{
    cursor::MoveTo,
    queue,
    style::{Attribute, Print, SetAttribute},
    terminal::{Clear, ClearType},
};
use unicode_width::UnicodeWidthChar;

/// A rectangular character region with (0, 0) at its top-left corner.
pub trait Surface {
    fn columns(&self) -> u16;
    fn rows(&self) -> u16;
    /// Clear `height` rows starting at row `y`.
    fn clear_rows(&mut self, y: u16, height: u16) -> Result<()>;
    /// Write `text` at (`x`, `y`); `emphasized` requests the highlight
    /// attribute used for key names.
    fn put(&mut self, x: u16, y: u16, text: &str, emphasized: bool) -> Result<()>;
    fn flush(&mut self) -> Result<()>;
}

/// Crossterm surface over a writer, offset to a region of the terminal.
pub struct CrosstermSurface<W: Write> {
    out: W,
    origin: (u16, u16),
    size: (u16, u16),
}

impl<W: Write> CrosstermSurface<W> {
    pub fn new(out: W, origin: (u16, u16), size: (u16, u16)) -> Self {
        Self { out, origin, size }
    }
}

impl<W: Write> Surface for CrosstermSurface<W> {
    fn columns(&self) -> u16 {
        self.size.0
    }

    fn rows(&self) -> u16 {
        self.size.1
    }

    fn clear_rows(&mut self, y: u16, height: u16) -> Result<()> {
        for row in y..y.saturating_add(height).min(self.size.1) {
            queue!(
                self.out,
                MoveTo(self.origin.0, self.origin.1 + row),
                Clear(ClearType::UntilNewLine)
            )?;
        }
        Ok(())
    }

    fn put(&mut self, x: u16, y: u16, text: &str, emphasized: bool) -> Result<()> {
        if x >= self.size.0 || y >= self.size.1 {
            return Ok(());
        }
        queue!(self.out, MoveTo(self.origin.0 + x, self.origin.1 + y))?;
        if emphasized {
            queue!(
                self.out,
                SetAttribute(Attribute::Reverse),
                Print(text),
                SetAttribute(Attribute::NoReverse)
            )?;
        } else {
            queue!(self.out, Print(text))?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}

/// In-memory surface recording characters and emphasis, for tests and
/// headless harnesses. Wide characters occupy a single cell here; width
/// handling is exercised by the chopping helpers, not the grid.
#[derive(Debug)]
pub struct GridSurface {
    columns: u16,
    rows: u16,
    cells: Vec<Vec<char>>,
    emphasis: Vec<Vec<bool>>,
}

impl GridSurface {
    pub fn new(columns: u16, rows: u16) -> Self {
        Self {
            columns,
            rows,
            cells: vec![vec![' '; columns as usize]; rows as usize],
            emphasis: vec![vec![false; columns as usize]; rows as usize],
        }
    }

    /// Row content with trailing blanks removed.
    pub fn row_text(&self, y: u16) -> String {
        let row: String = self.cells[y as usize].iter().collect();
        row.trim_end().to_string()
    }

    pub fn is_emphasized(&self, x: u16, y: u16) -> bool {
        self.emphasis[y as usize][x as usize]
    }
}

impl Surface for GridSurface {
    fn columns(&self) -> u16 {
        self.columns
    }

    fn rows(&self) -> u16 {
        self.rows
    }

    fn clear_rows(&mut self, y: u16, height: u16) -> Result<()> {
        for row in y..y.saturating_add(height).min(self.rows) {
            self.cells[row as usize].fill(' ');
            self.emphasis[row as usize].fill(false);
        }
        Ok(())
    }

    fn put(&mut self, x: u16, y: u16, text: &str, emphasized: bool) -> Result<()> {
        if y >= self.rows {
            return Ok(());
        }
        let mut col = x as usize;
        for ch in text.chars() {
            if col >= self.columns as usize {
                break;
            }
            self.cells[y as usize][col] = ch;
            self.emphasis[y as usize][col] = emphasized;
            col += 1;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Chop `text` to at most `width` display columns (no ellipsis), returning
/// the chopped string and its display width.
pub fn chop_to_width(text: &str, width: usize) -> (String, usize) {
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + w > width {
            break;
        }
        out.push(ch);
        used += w;
    }
    (out, used)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn chop_keeps_short_names_intact() {
        assert_eq!(chop_to_width("TAB", 3), ("TAB".to_string(), 3));
        assert_eq!(chop_to_width("q", 3), ("q".to_string(), 1));
    }

    #[test]
    fn chop_cuts_long_names_without_ellipsis() {
        assert_eq!(chop_to_width("KEY_BTAB", 3), ("KEY".to_string(), 3));
    }

    #[test]
    fn chop_counts_display_columns_not_chars() {
        // Fullwidth character is two columns wide.
        assert_eq!(chop_to_width("全角", 3), ("全".to_string(), 2));
    }

    #[test]
    fn grid_records_text_and_emphasis() {
        let mut grid = GridSurface::new(10, 2);
        grid.put(2, 0, "abc", true).unwrap();
        grid.put(0, 1, "x", false).unwrap();
        assert_eq!(grid.row_text(0), "  abc");
        assert_eq!(grid.row_text(1), "x");
        assert!(grid.is_emphasized(2, 0));
        assert!(!grid.is_emphasized(0, 1));
    }

    #[test]
    fn grid_clips_at_the_right_edge() {
        let mut grid = GridSurface::new(4, 1);
        grid.put(2, 0, "abcdef", false).unwrap();
        assert_eq!(grid.row_text(0), "  ab");
    }
}
