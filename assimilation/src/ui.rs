//! Terminal prompts and progress bars.
use assimilation_core::confirm::{ConfirmationGate, Decision, QUESTION, is_affirmative};
use assimilation_core::device::TargetDevice;
use assimilation_core::transfer::TransferProgress;
use console::style;
use dialoguer::{Input, theme::ColorfulTheme};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::time::Duration;

const TICKS: &[&str] = &[
    "■      ", " ■     ", "  ■    ", "   ■   ", "    ■  ", "     ■ ", "      ■", "     ■ ",
    "    ■  ", "   ■   ", "  ■    ", " ■     ", "■■■■■■■",
];

/// Spinner shown on stderr while discovery tools run.
pub fn scan_spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("[{spinner:.blue}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS),
    );
    pb.set_message("Scanning hardware...");
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Asks for a typed `yes`/`y` on the terminal.
pub struct TermPrompt;

impl ConfirmationGate for TermPrompt {
    fn confirm(&mut self, device: &TargetDevice) -> io::Result<Decision> {
        println!(
            "{} This will erase all data on {}",
            style("WARNING:").red().bold(),
            style(device).cyan(),
        );

        let answer: String = Input::with_theme(&ColorfulTheme::default())
            .with_prompt(QUESTION)
            .allow_empty(true)
            .interact_text()
            .map_err(io::Error::other)?;

        Ok(if is_affirmative(&answer) {
            Decision::Confirmed
        } else {
            Decision::Declined
        })
    }
}

/// Connects transfer callbacks to an indicatif bar. A source of unknown
/// length, such as a compressed image, gets a byte counter spinner instead.
pub struct BarProgress {
    label: &'static str,
    copy: ProgressBar,
}

impl BarProgress {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            copy: ProgressBar::hidden(),
        }
    }

    pub fn finish(&self, message: &'static str) {
        self.copy.finish_with_message(message);
    }

    pub fn fail(&self) {
        if !self.copy.is_hidden() {
            self.copy.abandon_with_message("❌ Operation failed.");
        }
    }
}

impl TransferProgress for BarProgress {
    fn copy_started(&mut self, total: Option<u64>) {
        self.copy = match total {
            Some(total) => {
                let pb = ProgressBar::new(total);
                pb.set_style(
                    ProgressStyle::default_bar()
                        .template(
                            "{prefix:12} [{elapsed_precise}] [{bar:40.green/black}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta}) {msg}",
                        )
                        .unwrap_or_else(|_| ProgressStyle::default_bar())
                        .progress_chars("■ "),
                );
                pb
            }
            None => {
                let pb = ProgressBar::new_spinner();
                pb.set_style(
                    ProgressStyle::default_spinner()
                        .template("{prefix:12} [{elapsed_precise}] [{spinner:.blue}] {bytes} ({bytes_per_sec}) {msg}")
                        .unwrap_or_else(|_| ProgressStyle::default_spinner())
                        .tick_strings(TICKS),
                );
                pb.enable_steady_tick(Duration::from_millis(100));
                pb
            }
        };
        self.copy.set_prefix(self.label);
    }

    fn copied(&mut self, bytes: u64) {
        self.copy.set_position(bytes);
    }
}
