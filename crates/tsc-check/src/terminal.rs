//! Terminal session control.

use std::io::{self, IsTerminal, Write};
use std::sync::{Arc, Mutex};

const HIDE_CURSOR: &str = "\x1B[?25l";
const SHOW_CURSOR: &str = "\x1B[?25h";
const CLEAR_LINE: &str = "\r\x1B[2K";
const CLEAR_SCREEN: &str = "\x1B[2J\x1B[0;0H";

/// The terminal operations the progress indicator needs.
pub trait Terminal: Send + 'static {
    fn hide_cursor(&mut self) -> io::Result<()>;
    fn show_cursor(&mut self) -> io::Result<()>;
    /// Clears the current line and returns to column 0.
    fn clear_line(&mut self) -> io::Result<()>;
    /// Clears the screen and moves the cursor home.
    fn clear_screen(&mut self) -> io::Result<()>;
    /// Redraws the current line with `text`.
    fn draw_status(&mut self, text: &str) -> io::Result<()>;
    fn newline(&mut self) -> io::Result<()>;
}

/// A terminal driven by ANSI escape sequences.
pub struct AnsiTerminal<W> {
    out: W,
}

impl AnsiTerminal<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> AnsiTerminal<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, seq: &str) -> io::Result<()> {
        self.out.write_all(seq.as_bytes())?;
        self.out.flush()
    }
}

impl<W: Write + Send + 'static> Terminal for AnsiTerminal<W> {
    fn hide_cursor(&mut self) -> io::Result<()> {
        self.emit(HIDE_CURSOR)
    }

    fn show_cursor(&mut self) -> io::Result<()> {
        self.emit(SHOW_CURSOR)
    }

    fn clear_line(&mut self) -> io::Result<()> {
        self.emit(CLEAR_LINE)
    }

    fn clear_screen(&mut self) -> io::Result<()> {
        self.emit(CLEAR_SCREEN)
    }

    fn draw_status(&mut self, text: &str) -> io::Result<()> {
        self.out.write_all(b"\r")?;
        self.out.write_all(text.as_bytes())?;
        self.out.flush()
    }

    fn newline(&mut self) -> io::Result<()> {
        self.emit("\n")
    }
}

/// Writes the show-cursor sequence, but only to a real terminal.
fn restore_cursor<W: Write>(out: &mut W, is_terminal: bool) -> io::Result<()> {
    if !is_terminal {
        return Ok(());
    }
    out.write_all(SHOW_CURSOR.as_bytes())?;
    out.flush()
}

/// Shows the cursor from a panic before the default hook prints.
pub fn install_panic_hook() {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let stdout = io::stdout();
        let is_terminal = stdout.is_terminal();
        let _ = restore_cursor(&mut stdout.lock(), is_terminal);
        previous(info);
    }));
}

/// Terminal operations recorded by [`RecordingTerminal`].
#[cfg(test)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TermEvent {
    HideCursor,
    ShowCursor,
    ClearLine,
    ClearScreen,
    Status(String),
    Newline,
}

/// A terminal that records operations instead of writing them.
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub struct RecordingTerminal {
    events: Arc<Mutex<Vec<TermEvent>>>,
}

#[cfg(test)]
impl RecordingTerminal {
    pub fn events(&self) -> Vec<TermEvent> {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn push(&mut self, event: TermEvent) -> io::Result<()> {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(event);
        Ok(())
    }
}

#[cfg(test)]
impl Terminal for RecordingTerminal {
    fn hide_cursor(&mut self) -> io::Result<()> {
        self.push(TermEvent::HideCursor)
    }

    fn show_cursor(&mut self) -> io::Result<()> {
        self.push(TermEvent::ShowCursor)
    }

    fn clear_line(&mut self) -> io::Result<()> {
        self.push(TermEvent::ClearLine)
    }

    fn clear_screen(&mut self) -> io::Result<()> {
        self.push(TermEvent::ClearScreen)
    }

    fn draw_status(&mut self, text: &str) -> io::Result<()> {
        self.push(TermEvent::Status(text.to_string()))
    }

    fn newline(&mut self) -> io::Result<()> {
        self.push(TermEvent::Newline)
    }
}

/// A terminal handle shared between the indicator and its tick task.
pub type SharedTerminal<T> = Arc<Mutex<T>>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_ansi_sequences() {
        let mut term = AnsiTerminal::new(Vec::new());
        term.hide_cursor().unwrap();
        term.draw_status("working").unwrap();
        term.clear_line().unwrap();
        term.show_cursor().unwrap();
        term.clear_screen().unwrap();

        let written = String::from_utf8(term.into_inner()).unwrap();
        assert_eq!(
            written,
            "\x1B[?25l\rworking\r\x1B[2K\x1B[?25h\x1B[2J\x1B[0;0H"
        );
    }

    #[test]
    fn test_restore_cursor_skips_pipes() {
        let mut piped = Vec::new();
        restore_cursor(&mut piped, false).unwrap();
        assert!(piped.is_empty());

        let mut tty = Vec::new();
        restore_cursor(&mut tty, true).unwrap();
        assert_eq!(String::from_utf8(tty).unwrap(), "\x1B[?25h");
    }

    #[test]
    fn test_recording_terminal_shares_events() {
        let term = RecordingTerminal::default();
        let mut clone = term.clone();
        clone.hide_cursor().unwrap();
        clone.draw_status("x").unwrap();
        assert_eq!(
            term.events(),
            vec![TermEvent::HideCursor, TermEvent::Status("x".to_string())]
        );
    }
}
