use crate::common::{format_hashrate, format_large_number};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::{Duration, Instant};

/// Progress display manager
pub struct ProgressDisplay {
    bar: ProgressBar,
    start_time: Instant,
    estimated_attempts: u64,
}

impl ProgressDisplay {
    pub fn new(estimated_attempts: u64, difficulty: usize) -> Self {
        let bar = ProgressBar::new(estimated_attempts);

        // Template is a constant, only a malformed literal could fail here
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
        {
            bar.set_style(style.tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ "));
        }
        bar.set_message(format!(
            "Mining difficulty {} | 0 H/s | 0 attempts",
            difficulty
        ));

        Self {
            bar,
            start_time: Instant::now(),
            estimated_attempts,
        }
    }

    /// A display that draws nothing, for `--no-progress` and JSON output
    pub fn hidden() -> Self {
        let bar = ProgressBar::with_draw_target(None, ProgressDrawTarget::hidden());
        Self {
            bar,
            start_time: Instant::now(),
            estimated_attempts: 0,
        }
    }

    pub fn update(&self, attempts: u64) {
        let hashrate = self.hashrate(attempts);

        let eta = if hashrate > 0.0 {
            let remaining = self.estimated_attempts.saturating_sub(attempts);
            let eta_secs = remaining as f64 / hashrate;
            format_duration(Duration::try_from_secs_f64(eta_secs).unwrap_or(Duration::MAX))
        } else {
            "calculating...".to_string()
        };

        self.bar.set_message(format!(
            "{} | {} attempts | ETA: {}",
            format_hashrate(hashrate),
            format_large_number(attempts),
            eta
        ));
        self.bar.tick();
    }

    pub fn finish_with_success(&self, attempts: u64) {
        let elapsed = self.start_time.elapsed();

        self.bar.finish_with_message(format!(
            "✅ Found in {} ({} attempts, {})",
            format_duration(elapsed),
            format_large_number(attempts),
            format_hashrate(self.hashrate(attempts))
        ));
    }

    pub fn finish_with_message(&self, msg: &str) {
        self.bar.finish_with_message(msg.to_string());
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn hashrate(&self, attempts: u64) -> f64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            attempts as f64 / elapsed
        } else {
            0.0
        }
    }
}

fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs >= 3600 {
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    } else if secs >= 60 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}s", secs)
    }
}
