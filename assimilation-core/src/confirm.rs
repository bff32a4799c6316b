//! The operator confirmation guarding every destructive write.
use crate::device::TargetDevice;
use std::io::{self, BufRead, Write};
use tracing::warn;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    Confirmed,
    Declined,
}

/// Answers accepted as "go ahead", compared case-insensitively.
pub const AFFIRMATIVE: [&str; 2] = ["yes", "y"];

pub fn is_affirmative(answer: &str) -> bool {
    let answer = answer.trim();
    AFFIRMATIVE.iter().any(|yes| answer.eq_ignore_ascii_case(yes))
}

pub fn warning(device: &TargetDevice) -> String {
    format!("WARNING: This will erase all data on {device}")
}

pub const QUESTION: &str = "Are you sure you want to continue? (yes/no)";

pub trait ConfirmationGate {
    fn confirm(&mut self, device: &TargetDevice) -> io::Result<Decision>;
}

/// Skips the prompt entirely. Only ever constructed from an explicit
/// `--force`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Forced;

impl ConfirmationGate for Forced {
    fn confirm(&mut self, device: &TargetDevice) -> io::Result<Decision> {
        warn!(device = %device.path.display(), "confirmation bypassed by --force");
        Ok(Decision::Confirmed)
    }
}

/// Prints the warning to `output` and reads one answer line from `input`.
/// End of input counts as a refusal.
pub struct LinePrompt<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> LinePrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: BufRead, W: Write> ConfirmationGate for LinePrompt<R, W> {
    fn confirm(&mut self, device: &TargetDevice) -> io::Result<Decision> {
        writeln!(self.output, "{}", warning(device))?;
        write!(self.output, "{QUESTION}: ")?;
        self.output.flush()?;

        let mut answer = String::new();
        self.input.read_line(&mut answer)?;

        Ok(if is_affirmative(&answer) {
            Decision::Confirmed
        } else {
            Decision::Declined
        })
    }
}
