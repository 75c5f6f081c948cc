use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration;

const SPINNER_TICK_MS: u64 = 80;

/// Stderr spinner shown while a phase diagram is built or an analysis runs.
pub struct Spinner {
    pb: ProgressBar,
}

impl Spinner {
    pub fn new(message: impl Into<String>) -> Self {
        Self::with_target(message, ProgressDrawTarget::stderr())
    }

    fn with_target(message: impl Into<String>, target: ProgressDrawTarget) -> Self {
        let pb = ProgressBar::with_draw_target(None, target)
            .with_style(Self::spinner_style())
            .with_message(message.into());
        pb.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
        Self { pb }
    }

    pub fn finish(&self, message: impl Into<String>) {
        self.pb.disable_steady_tick();
        self.pb.finish_with_message(format!("✓ {}", message.into()));
    }

    pub fn fail(&self) {
        self.pb.disable_steady_tick();
        self.pb.finish_and_clear();
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }
}

/// Runs `task` behind a spinner, finishing it with `done` on success and clearing it
/// on failure.
pub fn with_spinner<T, E>(
    message: &str,
    done: &str,
    task: impl FnOnce() -> Result<T, E>,
) -> Result<T, E> {
    let spinner = Spinner::new(message);
    let result = task();
    match &result {
        Ok(_) => spinner.finish(done),
        Err(_) => spinner.fail(),
    }
    result
}
