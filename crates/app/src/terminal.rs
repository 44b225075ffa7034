//! Crossterm implementation of the core drawing contract, plus the scoped
//! terminal acquisition the control loop runs inside.

use std::io::{self, Stdout, Write};
use std::time::Duration;

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::style::{Attribute, Print, SetAttribute};
use crossterm::terminal::{
    self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::{execute, queue};
use rhythm_trainer_core::{CellPos, Result, Style, Surface};

/// Scoped acquisition of the terminal: raw mode, alternate screen, hidden
/// cursor. Dropping the guard restores the caller's terminal on every exit
/// path, including error exits.
pub struct TerminalGuard;

impl TerminalGuard {
    pub fn acquire() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        execute!(
            io::stdout(),
            EnterAlternateScreen,
            Hide,
            Clear(ClearType::All)
        )?;
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = execute!(io::stdout(), Show, LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

/// Cell-addressed terminal surface over crossterm. Draw calls are queued
/// and become visible on `refresh`.
pub struct TerminalSurface {
    out: Stdout,
}

impl TerminalSurface {
    pub fn new() -> Self {
        Self { out: io::stdout() }
    }

    /// Non-blocking key poll; returns the pressed character, if any.
    pub fn poll_key(&mut self) -> io::Result<Option<char>> {
        if event::poll(Duration::ZERO)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    if let KeyCode::Char(pressed) = key.code {
                        return Ok(Some(pressed));
                    }
                }
            }
        }
        Ok(None)
    }
}

impl Default for TerminalSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl Surface for TerminalSurface {
    fn move_to(&mut self, cell: CellPos) -> Result<()> {
        queue!(self.out, MoveTo(cell.col, cell.row))?;
        Ok(())
    }

    fn draw_char(&mut self, glyph: char, style: Style) -> Result<()> {
        match style {
            Style::Bold => queue!(
                self.out,
                SetAttribute(Attribute::Bold),
                Print(glyph),
                SetAttribute(Attribute::Reset)
            )?,
            Style::Plain => queue!(self.out, Print(glyph))?,
        }
        Ok(())
    }

    fn erase_char(&mut self) -> Result<()> {
        queue!(self.out, Print(' '))?;
        Ok(())
    }

    fn draw_text(&mut self, text: &str) -> Result<()> {
        queue!(self.out, Print(text))?;
        Ok(())
    }

    fn refresh(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }

    fn dimensions(&self) -> Result<(u16, u16)> {
        let (cols, rows) = terminal::size()?;
        Ok((rows, cols))
    }
}
