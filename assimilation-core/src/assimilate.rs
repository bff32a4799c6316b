//! The destructive workflow: validate the target, confirm, then write.
use crate::command::CommandRunner;
use crate::config::ConfigError;
use crate::confirm::{ConfirmationGate, Decision};
use crate::device::{DeviceValidator, ValidationError};
use crate::transfer::{
    CopyOptions, Executor, Mode, Plan, TransferError, TransferProgress, UsageError,
};
use std::io;
use std::path::PathBuf;
use thiserror::Error;
use tracing::info;

#[derive(Clone, Debug)]
pub struct Request {
    pub device: PathBuf,
    pub mode: Mode,
    /// Source device (clone) or image file (install).
    pub source: Option<PathBuf>,
    pub ventoy_dir: PathBuf,
    pub copy: CopyOptions,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    Cancelled,
}

#[derive(Debug, Error)]
pub enum AssimilateError {
    #[error(transparent)]
    Usage(#[from] UsageError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Rejected(#[from] ValidationError),
    #[error("failed to read confirmation: {0}")]
    Prompt(#[source] io::Error),
    #[error(transparent)]
    Transfer(#[from] TransferError),
}

/// Runs one assimilation.
///
/// Usage errors and rejected devices stop the run before the operator is
/// asked anything; a declined confirmation stops it before any write.
pub fn run<R, G>(
    request: &Request,
    validator: &DeviceValidator,
    gate: &mut G,
    runner: &R,
    progress: &mut dyn TransferProgress,
) -> Result<Outcome, AssimilateError>
where
    R: CommandRunner,
    G: ConfirmationGate + ?Sized,
{
    let plan = Plan::new(request.mode, request.source.clone(), &request.ventoy_dir)?;
    let target = validator.validate(&request.device)?;

    if gate.confirm(&target).map_err(AssimilateError::Prompt)? == Decision::Declined {
        info!(device = %target.path.display(), "operation cancelled by operator");
        return Ok(Outcome::Cancelled);
    }

    Executor::new(runner, request.copy).execute(&plan, &target, progress)?;
    Ok(Outcome::Completed)
}
