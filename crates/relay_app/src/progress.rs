use std::io::{self, Write};
use std::sync::Mutex;

use relay_core::{render_progress_bar, DEFAULT_BAR_WIDTH};
use relay_engine::{EngineEvent, ProgressSink};

/// Redraws a single progress line on stdout per phase.
pub struct TerminalProgress {
    out: Mutex<io::Stdout>,
}

impl TerminalProgress {
    pub fn new() -> Self {
        Self {
            out: Mutex::new(io::stdout()),
        }
    }
}

impl Default for TerminalProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for TerminalProgress {
    fn emit(&self, event: EngineEvent) {
        let Some(line) = progress_line(&event) else {
            return;
        };
        let Ok(mut out) = self.out.lock() else {
            return;
        };
        let _ = write!(out, "{line}");
        let _ = out.flush();
    }
}

fn progress_line(event: &EngineEvent) -> Option<String> {
    match event {
        EngineEvent::PhaseStarted { phase, total } => Some(format!(
            "\r{phase} {}",
            render_progress_bar(0, *total, DEFAULT_BAR_WIDTH)
        )),
        EngineEvent::Progress(progress) => Some(format!(
            "\r{} {}",
            progress.phase,
            render_progress_bar(progress.done, progress.total, DEFAULT_BAR_WIDTH)
        )),
        EngineEvent::PhaseFinished { .. } => Some("\n".to_string()),
    }
}
