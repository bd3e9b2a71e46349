//! Console progress bar.
//! Implements the engine's ProgressSink on top of indicatif; the bar is
//! created lazily on the first event (that is when the total is known) and
//! finishes itself on the last one.

use std::sync::Mutex;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use pattern_move::{ProgressEvent, ProgressSink};

pub struct BarSink {
    bar: Mutex<Option<ProgressBar>>,
    verb: &'static str,
}

impl BarSink {
    pub fn new(verb: &'static str) -> Self {
        Self {
            bar: Mutex::new(None),
            verb,
        }
    }

    fn make_bar(&self, total: u64) -> ProgressBar {
        let bar = ProgressBar::new(total);
        let template = format!(
            "  {{spinner:.cyan}} {} [{{bar:30.cyan/dim}}] {{pos}}/{{len}} files",
            self.verb
        );
        if let Ok(style) = ProgressStyle::with_template(&template) {
            bar.set_style(style.progress_chars("━╸─").tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
        }
        bar.enable_steady_tick(Duration::from_millis(80));
        bar
    }

    /// Clear the bar early (e.g. on cancellation) so the summary prints on
    /// a clean line.
    pub fn finish(&self) {
        if let Ok(mut guard) = self.bar.lock() {
            if let Some(bar) = guard.take() {
                bar.finish_and_clear();
            }
        }
    }
}

impl ProgressSink for BarSink {
    fn on_progress(&self, event: ProgressEvent) {
        let Ok(mut guard) = self.bar.lock() else {
            return;
        };
        let bar = guard.get_or_insert_with(|| self.make_bar(event.total as u64));
        bar.set_position(event.completed as u64);
        if event.completed >= event.total {
            if let Some(bar) = guard.take() {
                bar.finish_and_clear();
            }
        }
    }
}
