//! Progress bar wrapper around indicatif

use indicatif::{ProgressBar, ProgressStyle};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

#[derive(Clone)]
pub struct ProgressTracker {
    bar: ProgressBar,
    found: Arc<AtomicU64>,
    errors: Arc<AtomicU64>,
}

impl ProgressTracker {
    pub fn new(total: u64, hidden: bool) -> Self {
        let bar = if hidden {
            ProgressBar::hidden()
        } else {
            let bar = ProgressBar::new(total);
            let style = ProgressStyle::with_template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec}) {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> ");
            bar.set_style(style);
            bar
        };

        Self {
            bar,
            found: Arc::new(AtomicU64::new(0)),
            errors: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn inc(&self) {
        self.bar.inc(1);
    }

    pub fn inc_found(&self) {
        self.found.fetch_add(1, Ordering::Relaxed);
        self.refresh_message();
    }

    pub fn inc_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
        self.refresh_message();
    }

    fn refresh_message(&self) {
        self.bar.set_message(format!(
            "found: {}, errors: {}",
            self.found.load(Ordering::Relaxed),
            self.errors.load(Ordering::Relaxed)
        ));
    }

    /// Print above the bar; a hidden bar would swallow the line.
    pub fn println(&self, line: &str) {
        if self.bar.is_hidden() {
            println!("{}", line);
        } else {
            self.bar.println(line);
        }
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}
