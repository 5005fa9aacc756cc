//! Progress bar over (strategy, query) pairs.

use evaldiv_core::evaluation::StrategyResult;
use evaldiv_core::{EvalObserver, QueryId};
use indicatif::{ProgressBar, ProgressStyle};

pub struct ProgressObserver {
    bar: ProgressBar,
}

impl ProgressObserver {
    pub fn new(total: usize) -> Self {
        let bar = ProgressBar::new(total as u64);
        if let Ok(style) = ProgressStyle::default_bar().template("{msg} [{bar:40}] {pos}/{len}") {
            bar.set_style(style);
        }
        Self { bar }
    }
}

impl EvalObserver for ProgressObserver {
    fn on_strategy_start(&self, index: usize, description: &str, _num_queries: usize) {
        self.bar.set_message(format!("{}. {}", index, description));
    }

    fn on_query_complete(&self, _index: usize, _query_id: &QueryId) {
        self.bar.inc(1);
    }

    fn on_strategy_complete(&self, result: &StrategyResult) {
        if self.bar.length() == Some(self.bar.position()) {
            self.bar.finish_with_message(format!("{} strategies", result.index));
        }
    }
}

impl Drop for ProgressObserver {
    fn drop(&mut self) {
        // Aborted runs leave the bar where it stopped
        if !self.bar.is_finished() {
            self.bar.abandon();
        }
    }
}
