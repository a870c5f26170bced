use std::{
    sync::Mutex,
    time::{Duration, Instant},
};

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use scriptwright_core::{RunObserver, Stage};

pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        let total = d.as_secs();
        format!("{}m {}s", total / 60, total % 60)
    }
}

pub fn create_spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

struct Step {
    spinner: ProgressBar,
    label: String,
    started: Instant,
}

/// One spinner per pipeline stage; the previous one is ticked off when the
/// next stage starts.
pub struct SpinnerProgress {
    current: Mutex<Option<Step>>,
}

impl SpinnerProgress {
    pub fn new() -> Self {
        Self {
            current: Mutex::new(None),
        }
    }

    /// Mark the running stage as done.
    pub fn finish(&self) {
        if let Some(step) = self.take() {
            step.spinner.finish_with_message(format!(
                "{} {} {}",
                style("✓").green().bold(),
                step.label.trim_end_matches("..."),
                style(format!("[{}]", format_duration(step.started.elapsed()))).dim()
            ));
        }
    }

    /// Mark the running stage as failed.
    pub fn abandon(&self) {
        if let Some(step) = self.take() {
            step.spinner.abandon_with_message(format!(
                "{} {}",
                style("✗").red().bold(),
                step.label.trim_end_matches("...")
            ));
        }
    }

    fn take(&self) -> Option<Step> {
        self.current.lock().ok().and_then(|mut guard| guard.take())
    }
}

impl Default for SpinnerProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl RunObserver for SpinnerProgress {
    fn on_stage(&self, stage: &Stage<'_>) {
        self.finish();
        let label = stage.to_string();
        let step = Step {
            spinner: create_spinner(&label),
            label,
            started: Instant::now(),
        };
        if let Ok(mut guard) = self.current.lock() {
            *guard = Some(step);
        }
    }
}
