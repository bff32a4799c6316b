//! Running external programs.
//!
//! Every discovery tool and the Ventoy installer are reached through the
//! [`CommandRunner`] trait so that callers (and tests) can substitute the
//! real process spawner.
use std::io;
use std::process::{Command, Stdio};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("{program} not found")]
    NotFound { program: String },
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("{program} exited with {status}{}", stderr_suffix(.stderr))]
    Failed {
        program: String,
        status: String,
        stderr: String,
    },
}

fn stderr_suffix(stderr: &str) -> String {
    let first = stderr.lines().next().unwrap_or("").trim();
    if first.is_empty() {
        String::new()
    } else {
        format!(": {first}")
    }
}

pub trait CommandRunner {
    /// Runs `program` to completion and returns its stdout.
    fn output(&self, program: &str, args: &[&str]) -> Result<String, CommandError>;

    /// Runs `program` attached to the controlling terminal, reporting only
    /// whether it succeeded.
    fn status(&self, program: &str, args: &[&str]) -> Result<(), CommandError>;
}

/// Spawns real child processes with [`std::process::Command`].
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemRunner;

impl SystemRunner {
    fn spawn_error(program: &str, source: io::Error) -> CommandError {
        if source.kind() == io::ErrorKind::NotFound {
            CommandError::NotFound {
                program: program.to_string(),
            }
        } else {
            CommandError::Spawn {
                program: program.to_string(),
                source,
            }
        }
    }
}

impl CommandRunner for SystemRunner {
    fn output(&self, program: &str, args: &[&str]) -> Result<String, CommandError> {
        debug!(program, ?args, "running command");
        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| Self::spawn_error(program, e))?;

        if !output.status.success() {
            return Err(CommandError::Failed {
                program: program.to_string(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn status(&self, program: &str, args: &[&str]) -> Result<(), CommandError> {
        debug!(program, ?args, "running interactive command");
        let status = Command::new(program)
            .args(args)
            .status()
            .map_err(|e| Self::spawn_error(program, e))?;

        if status.success() {
            Ok(())
        } else {
            Err(CommandError::Failed {
                program: program.to_string(),
                status: status.to_string(),
                stderr: String::new(),
            })
        }
    }
}
