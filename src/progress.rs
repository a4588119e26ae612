//! Progress reporting for long-running operations.
//!
//! The agent loop and tool handlers publish status text through the
//! [`Progress`] trait. [`Spinner`] renders that text on a fixed tick from a
//! dedicated task, so blocking on a network call never stalls the display.

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing_subscriber::fmt::MakeWriter;

/// Interval between spinner redraws.
pub const TICK_INTERVAL: Duration = Duration::from_millis(80);

/// Bar currently on screen, if any. Log output is drawn around it.
static ACTIVE_BAR: Mutex<Option<ProgressBar>> = Mutex::new(None);

fn set_active_bar(bar: Option<ProgressBar>) {
    *ACTIVE_BAR.lock().unwrap_or_else(PoisonError::into_inner) = bar;
}

fn active_bar() -> Option<ProgressBar> {
    ACTIVE_BAR
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

const FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Sink for human-facing status updates.
pub trait Progress: Send + Sync {
    /// Replace the current status text.
    fn update(&self, status: &str);
}

/// Progress sink that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl Progress for NoProgress {
    fn update(&self, _status: &str) {}
}

/// Shared status text. The only state crossing into the render task.
#[derive(Debug, Clone, Default)]
struct StatusCell(Arc<Mutex<String>>);

impl StatusCell {
    fn set(&self, text: &str) {
        let mut guard = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        guard.clear();
        guard.push_str(text);
    }

    fn get(&self) -> String {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

/// Terminal spinner driven by its own render task.
///
/// Must be started from within a tokio runtime.
pub struct Spinner {
    status: StatusCell,
    stop: Option<oneshot::Sender<()>>,
    render: Option<JoinHandle<()>>,
}

impl Spinner {
    /// Start rendering with an initial status.
    pub fn start(initial: &str) -> Self {
        let bar = ProgressBar::new_spinner();
        if let Ok(spinner_style) = ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .map(|s| s.tick_strings(&with_final_frame(FRAMES)))
        {
            bar.set_style(spinner_style);
        }
        Self::with_bar(initial, bar)
    }

    /// Start rendering onto a caller-supplied bar (hidden bars are useful in tests).
    pub fn with_bar(initial: &str, bar: ProgressBar) -> Self {
        let status = StatusCell::default();
        status.set(initial);

        set_active_bar(Some(bar.clone()));
        let (stop_tx, stop_rx) = oneshot::channel();
        let render = tokio::spawn(render_loop(status.clone(), bar, stop_rx));

        Self {
            status,
            stop: Some(stop_tx),
            render: Some(render),
        }
    }

    /// Stop rendering, clear the line, and print `summary` once if given.
    pub async fn finish(mut self, summary: Option<&str>) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Some(render) = self.render.take() {
            let _ = render.await;
        }
        if let Some(line) = summary.filter(|s| !s.trim().is_empty()) {
            println!("{}", style(line).dim());
        }
    }
}

impl Progress for Spinner {
    fn update(&self, status: &str) {
        self.status.set(status);
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
    }
}

async fn render_loop(status: StatusCell, bar: ProgressBar, mut stop: oneshot::Receiver<()>) {
    let mut ticker = tokio::time::interval(TICK_INTERVAL);
    loop {
        tokio::select! {
            _ = &mut stop => break,
            _ = ticker.tick() => {
                bar.set_message(status.get());
                bar.tick();
            }
        }
    }
    set_active_bar(None);
    bar.finish_and_clear();
}

/// Log writer for `tracing_subscriber::fmt` that writes to stderr and hides
/// the running spinner while each line is printed.
#[derive(Debug, Default, Clone, Copy)]
pub struct SpinnerAwareWriter;

impl<'a> MakeWriter<'a> for SpinnerAwareWriter {
    type Writer = LogLine;

    fn make_writer(&'a self) -> Self::Writer {
        LogLine::default()
    }
}

/// One buffered log event, emitted when dropped.
#[derive(Debug, Default)]
pub struct LogLine(Vec<u8>);

impl Write for LogLine {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for LogLine {
    fn drop(&mut self) {
        if self.0.is_empty() {
            return;
        }
        let emit = || {
            let _ = io::stderr().lock().write_all(&self.0);
        };
        match active_bar() {
            Some(bar) => bar.suspend(emit),
            None => emit(),
        }
    }
}

/// indicatif shows the last tick string once finished; repeat the first frame there.
fn with_final_frame<'a>(frames: &[&'a str]) -> Vec<&'a str> {
    let mut all = frames.to_vec();
    if let Some(first) = frames.first() {
        all.push(first);
    }
    all
}

#[cfg(test)]
mod tests {
    use super::*;
    use indicatif::ProgressDrawTarget;

    #[test]
    fn test_status_cell_replaces_text() {
        let cell = StatusCell::default();
        cell.set("thinking…");
        cell.set("polling job abc…");
        assert_eq!(cell.get(), "polling job abc…");
    }

    #[test]
    fn test_final_frame_appended() {
        assert_eq!(with_final_frame(&["a", "b"]), vec!["a", "b", "a"]);
    }

    #[tokio::test]
    async fn test_spinner_renders_latest_status_and_stops() {
        let bar = ProgressBar::with_draw_target(None, ProgressDrawTarget::hidden());
        let spinner = Spinner::with_bar("thinking…", bar.clone());

        spinner.update("calling lookup_kpi(\"MRR\")…");
        tokio::time::sleep(TICK_INTERVAL * 3).await;
        assert_eq!(bar.message(), "calling lookup_kpi(\"MRR\")…");

        spinner.finish(None).await;
        assert!(bar.is_finished());
    }

    #[test]
    fn test_log_line_buffers_until_dropped() {
        let mut line = SpinnerAwareWriter.make_writer();
        line.write_all(b"WARN tool failed\n").unwrap();
        assert_eq!(line.0, b"WARN tool failed\n");
    }

    #[tokio::test]
    async fn test_log_lines_are_drawn_around_running_spinner() {
        let bar = ProgressBar::with_draw_target(None, ProgressDrawTarget::hidden());
        let spinner = Spinner::with_bar("thinking…", bar.clone());

        let mut line = SpinnerAwareWriter.make_writer();
        line.write_all(b"WARN model call failed\n").unwrap();
        drop(line);

        spinner.finish(None).await;
        assert!(bar.is_finished());
    }
}
