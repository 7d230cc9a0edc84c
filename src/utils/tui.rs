use std::future::Future;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

const TICK: Duration = Duration::from_millis(100);

/// Await `work` behind a spinner, clearing it once `work` resolves.
pub async fn while_spinning<F, T>(message: &str, work: F) -> T
where
    F: Future<Output = T>,
{
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("   {spinner:.cyan} {msg:.dim}") {
        spinner.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ "));
    }
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(TICK);

    let output = work.await;
    spinner.finish_and_clear();
    output
}
