//! Progress indicator shown while the compiler runs.

use crate::output::Palette;
use crate::terminal::{SharedTerminal, Terminal};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// Spinner glyphs, drawn in order and wrapping.
pub const FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Redraw period.
pub const TICK: Duration = Duration::from_millis(100);

const LABEL: &str = "🚀 TS Validation Checker";

/// Builds the status line for the given frame index.
pub fn status_line(frame: usize, palette: Palette) -> String {
    format!(
        "{} is validating your project {}",
        palette.accent(LABEL),
        palette.accent(FRAMES[frame % FRAMES.len()])
    )
}

fn lock<T>(terminal: &Mutex<T>) -> MutexGuard<'_, T> {
    terminal.lock().unwrap_or_else(|e| e.into_inner())
}

/// A spinner redrawn on a single terminal line.
///
/// The cursor is hidden for as long as the indicator is alive. Dropping the
/// indicator without calling [`stop`](Self::stop) still shows the cursor.
pub struct ProgressIndicator<T: Terminal> {
    terminal: SharedTerminal<T>,
    task: Option<JoinHandle<()>>,
    stop_tx: Option<oneshot::Sender<()>>,
    cursor_hidden: bool,
}

impl<T: Terminal> ProgressIndicator<T> {
    /// Hides the cursor and starts redrawing the status line every [`TICK`].
    pub fn start(terminal: T, palette: Palette) -> Self {
        let terminal = Arc::new(Mutex::new(terminal));
        {
            let mut term = lock(&terminal);
            if let Err(e) = term.hide_cursor().and_then(|_| term.newline()) {
                tracing::warn!("failed to prepare terminal: {}", e);
            }
        }

        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();
        let tick_terminal = Arc::clone(&terminal);
        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(TICK);
            let mut frame = 0usize;
            loop {
                tokio::select! {
                    _ = &mut stop_rx => break,
                    _ = interval.tick() => {
                        let text = status_line(frame, palette);
                        if let Err(e) = lock(&tick_terminal).draw_status(&text) {
                            tracing::warn!("failed to draw progress: {}", e);
                        }
                        frame = (frame + 1) % FRAMES.len();
                    }
                }
            }
        });

        Self {
            terminal,
            task: Some(task),
            stop_tx: Some(stop_tx),
            cursor_hidden: true,
        }
    }

    /// Cancels the redraw, clears the status line and shows the cursor.
    pub async fn stop(mut self) {
        self.finish(false).await;
    }

    /// Like [`stop`](Self::stop), but also clears the screen.
    pub async fn interrupt(mut self) {
        self.finish(true).await;
    }

    async fn finish(&mut self, clear_screen: bool) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }

        let mut term = lock(&self.terminal);
        let result = term.clear_line().and_then(|_| {
            if clear_screen {
                term.clear_screen()?;
            }
            term.show_cursor()
        });
        if let Err(e) = result {
            tracing::warn!("failed to restore terminal: {}", e);
        }
        self.cursor_hidden = false;
    }
}

impl<T: Terminal> Drop for ProgressIndicator<T> {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        if self.cursor_hidden {
            let _ = lock(&self.terminal).show_cursor();
        }
    }
}
