//! Terminal session handling: raw mode + alternate screen with restoration
//! on drop, so the terminal is left sane even on early return or panic.

use std::io::stdout;

use anyhow::Result;
use crossterm::{
    cursor::{Hide, Show},
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, size, EnterAlternateScreen, LeaveAlternateScreen,
        SetTitle,
    },
};

pub struct TermSession {
    entered: bool,
}

impl Default for TermSession {
    fn default() -> Self {
        Self::new()
    }
}

impl TermSession {
    pub fn new() -> Self {
        Self { entered: false }
    }

    pub fn enter(&mut self) -> Result<()> {
        if !self.entered {
            enable_raw_mode()?;
            execute!(stdout(), EnterAlternateScreen, Hide, SetTitle("Almanac"))?;
            self.entered = true;
        }
        Ok(())
    }

    pub fn leave(&mut self) -> Result<()> {
        if self.entered {
            execute!(stdout(), LeaveAlternateScreen, Show)?;
            disable_raw_mode()?;
            self.entered = false;
        }
        Ok(())
    }

    /// Current terminal size as (columns, rows).
    pub fn size(&self) -> Result<(u16, u16)> {
        Ok(size()?)
    }
}

impl Drop for TermSession {
    fn drop(&mut self) {
        let _ = self.leave();
    }
}
