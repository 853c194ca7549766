//! Progress bar with ETA estimation

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

const BAR_LENGTH: usize = 40;

/// Thread-safe progress tracker drawing a single-line bar on stderr
pub struct ProgressTracker {
    total: u64,
    processed: AtomicU64,
    start_time: Instant,
    label: String,
}

impl ProgressTracker {
    /// Creates a new progress tracker
    pub fn new(total: u64, label: &str) -> Self {
        Self {
            total,
            processed: AtomicU64::new(0),
            start_time: Instant::now(),
            label: label.to_string(),
        }
    }

    /// Increments the processed count by one and redraws the bar
    pub fn increment(&self) -> u64 {
        let current = self.processed.fetch_add(1, Ordering::Relaxed) + 1;
        eprint!("\r{}", self.render(current));
        if current == self.total {
            eprintln!();
        }
        current
    }

    /// Renders the progress line for `current` processed items
    fn render(&self, current: u64) -> String {
        let elapsed_secs = self.start_time.elapsed().as_secs_f64();
        let line = format!(
            "{}: |{}| {}/{} files ({:.1}%)",
            self.label,
            render_bar(current, self.total, BAR_LENGTH),
            current,
            self.total,
            percent(current, self.total),
        );

        if current > 0 && current < self.total {
            let rate = current as f64 / elapsed_secs;
            let remaining = (self.total - current) as f64 / rate;
            format!("{line} - ETA: {}", format_duration(remaining))
        } else if current == self.total {
            format!("{line} - completed in {}", format_duration(elapsed_secs))
        } else {
            line
        }
    }
}

fn percent(current: u64, total: u64) -> f64 {
    if total > 0 {
        (current as f64 / total as f64) * 100.0
    } else {
        0.0
    }
}

/// Draws `length` cells, filled in proportion to `current / total`
fn render_bar(current: u64, total: u64, length: usize) -> String {
    let filled = if total > 0 {
        (length as u64 * current.min(total) / total) as usize
    } else {
        0
    };
    format!("{}{}", "█".repeat(filled), "-".repeat(length - filled))
}

/// Formats seconds into a human-readable duration string
fn format_duration(secs: f64) -> String {
    if secs < 60.0 {
        return format!("{secs:.1}s");
    }

    // Round to whole seconds first so 119.7 reads "2m 0s", not "1m 60s"
    let total = secs.round() as u64;
    let (hours, mins, rest) = (total / 3600, total / 60 % 60, total % 60);
    match hours {
        0 => format!("{mins}m {rest}s"),
        _ => format!("{hours}h {mins}m {rest}s"),
    }
}
