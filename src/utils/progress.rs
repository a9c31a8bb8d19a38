//! Progress bar utilities using indicatif
//!
//! Large exports can take minutes to stream; commands report byte progress
//! when the input size is known and fall back to a record-count spinner for
//! stdin.

use indicatif::{ProgressBar as IndicatifBar, ProgressStyle};

/// Progress bar wrapper for displaying processing status
pub struct ProgressBar {
    bar: IndicatifBar,
}

impl ProgressBar {
    /// Byte-based bar for an input of known size
    pub fn new(total_bytes: u64, label: &str) -> Self {
        let bar = IndicatifBar::new(total_bytes);
        bar.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{msg} [{bar:40.cyan/blue}] {percent:>3}% ({bytes}/{total_bytes}) ({bytes_per_sec}) {eta}",
                )
                .expect("Invalid progress bar template")
                .progress_chars("█░"),
        );
        bar.set_message(label.to_string());

        Self { bar }
    }

    /// Counter spinner for inputs of unknown size
    pub fn new_spinner(label: &str) -> Self {
        let bar = IndicatifBar::new_spinner();
        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{msg} {spinner} {pos} records")
                .expect("Invalid spinner template"),
        );
        bar.set_message(label.to_string());

        Self { bar }
    }

    /// A bar that never draws (`--no-progress`, tests)
    pub fn hidden() -> Self {
        Self {
            bar: IndicatifBar::hidden(),
        }
    }

    /// Bar sized to `total_bytes` when known, spinner otherwise
    pub fn for_input(total_bytes: Option<u64>, label: &str) -> Self {
        match total_bytes {
            Some(size) => Self::new(size, label),
            None => Self::new_spinner(label),
        }
    }

    pub fn update(&self, current: u64) {
        self.bar.set_position(current.min(self.bar.length().unwrap_or(u64::MAX)));
    }

    pub fn inc(&self, delta: u64) {
        self.bar.inc(delta);
    }

    pub fn finish(&self) {
        self.bar.finish();
    }

    pub fn finish_with_message(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }
}
