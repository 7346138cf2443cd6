use crate::color::Rgb;
use crate::graphics::Frame;
use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::style::{Print, ResetColor, SetBackgroundColor, SetForegroundColor};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::{execute, queue};
use std::io::{self, Write};
use tracing::warn;

/// Fallback when the terminal size cannot be queried
pub const DEFAULT_SIZE: (u16, u16) = (80, 24);

/// Puts the terminal into full-screen raw mode and restores it on drop
pub struct TerminalGuard {
    _private: (),
}

impl TerminalGuard {
    pub fn new() -> io::Result<Self> {
        enable_raw_mode()?;
        let guard = TerminalGuard { _private: () };
        execute!(io::stdout(), EnterAlternateScreen, EnableMouseCapture, Hide)?;
        Ok(guard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if let Err(e) = execute!(io::stdout(), Show, DisableMouseCapture, LeaveAlternateScreen) {
            warn!("failed to leave alternate screen: {e}");
        }
        if let Err(e) = disable_raw_mode() {
            warn!("failed to disable raw mode: {e}");
        }
    }
}

/// Current terminal size as `(cols, rows)`
pub fn terminal_size() -> (u16, u16) {
    if let Some(size) = termsize::get() {
        if size.cols > 0 && size.rows > 0 {
            return (size.cols, size.rows);
        }
    }
    crossterm::terminal::size().unwrap_or(DEFAULT_SIZE)
}

/// Draws a frame over the whole alternate screen
pub fn draw_frame<W: Write>(out: &mut W, frame: &Frame) -> io::Result<()> {
    for row in 0..frame.rows() {
        queue!(out, MoveTo(0, row))?;
        write_row(out, frame, row)?;
    }
    queue!(out, ResetColor)?;
    out.flush()
}

/// Writes a frame as plain lines of colored text
pub fn write_snapshot<W: Write>(out: &mut W, frame: &Frame) -> io::Result<()> {
    for row in 0..frame.rows() {
        write_row(out, frame, row)?;
        queue!(out, ResetColor, Print('\n'))?;
    }
    out.flush()
}

/// Emits one row, only switching colors when they change
fn write_row<W: Write>(out: &mut W, frame: &Frame, row: u16) -> io::Result<()> {
    let mut current: Option<(Rgb, Rgb)> = None;
    for col in 0..frame.cols() {
        let cell = frame.cell(col, row);
        let (fg, bg) = current.unwrap_or((cell.fg, cell.bg));
        if current.is_none() || fg != cell.fg {
            queue!(out, SetForegroundColor(cell.fg.into()))?;
        }
        if current.is_none() || bg != cell.bg {
            queue!(out, SetBackgroundColor(cell.bg.into()))?;
        }
        current = Some((cell.fg, cell.bg));
        queue!(out, Print(cell.symbol))?;
    }
    Ok(())
}
