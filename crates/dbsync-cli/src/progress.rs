//! Progress bar sink

use dbsync_core::{ProgressCounter, ProgressSink, ProgressTick};
use indicatif::{ProgressBar, ProgressStyle};

const TEMPLATE: &str = "{bar:40.cyan/blue} {pos}/{len} {msg}";

/// Draws sync progress on stderr.
pub struct ProgressReporter {
    bar: Option<ProgressBar>,
    counter: ProgressCounter,
}

impl ProgressReporter {
    pub fn new(enabled: bool) -> Self {
        let bar = enabled.then(|| {
            let bar = ProgressBar::new(0);
            bar.set_style(ProgressStyle::with_template(TEMPLATE).unwrap_or_else(|_| ProgressStyle::default_bar()));
            bar.set_message("scripting objects");
            bar
        });
        Self {
            bar,
            counter: ProgressCounter::new(),
        }
    }

    pub fn finish(&self) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
    }
}

impl ProgressSink for ProgressReporter {
    fn report(&mut self, tick: ProgressTick) {
        self.counter.apply(tick);
        if let Some(bar) = &self.bar {
            bar.set_length(self.counter.maximum() as u64);
            bar.set_position(self.counter.position() as u64);
        }
    }
}
