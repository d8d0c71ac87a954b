//! Command implementations for wsa CLI.
//!
//! Each submodule implements the logic for one subcommand.

pub mod call;
pub mod doctor;
pub mod feedback;
pub mod log;
pub mod nudge;
pub mod patterns;
pub mod remind;
pub mod run;
pub mod similar;
pub mod stats;

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Spinner shown while waiting on the language-model agent.
pub(crate) fn spinner(message: &str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
        bar.set_style(style);
    }
    bar.set_message(message.to_string());
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}
