use crate::output::Output;
use indicatif::{ProgressBar, ProgressStyle};
use std::future::Future;
use std::io::IsTerminal;
use std::time::Duration;

fn is_interactive() -> bool {
    std::io::stderr().is_terminal()
}

/// Spinner shown while a request is outstanding. Hidden for JSON output,
/// `--quiet` and non-terminal stderr, where logging already covers progress.
pub struct Spinner {
    bar: Option<ProgressBar>,
}

impl Spinner {
    pub fn start(output: &Output, message: impl Into<String>) -> Self {
        if !output.is_human() || output.is_quiet() || !is_interactive() {
            return Self { bar: None };
        }

        let bar = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .map(|style| style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"))
        {
            bar.set_style(style);
        }
        bar.set_message(message.into());
        bar.enable_steady_tick(Duration::from_millis(80));
        Self { bar: Some(bar) }
    }

    pub fn set_message(&self, message: impl Into<String>) {
        if let Some(bar) = &self.bar {
            bar.set_message(message.into());
        }
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}

/// Run `fut` with a spinner, clearing it whatever the outcome.
pub async fn with_spinner<T>(output: &Output, message: impl Into<String>, fut: impl Future<Output = T>) -> T {
    let _spinner = Spinner::start(output, message);
    fut.await
}
