//! The irreversible write onto a validated target.
//!
//! Three mutually exclusive modes exist:
//! - **clone**: copy a source block device onto the target.
//! - **install**: copy an image file (optionally compressed) onto the target.
//! - **ventoy**: hand the target to the bundled `Ventoy2Disk.sh` installer.
//!
//! Each performs exactly one write per invocation. There is no read-back
//! verification and an interrupted copy leaves the target in an unspecified
//! state.
pub mod copy;
pub mod decompress;

use crate::command::{CommandError, CommandRunner};
use crate::device::TargetDevice;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

pub use copy::CopyOptions;

/// Where the bundled Ventoy installer lives unless configured otherwise.
pub const DEFAULT_VENTOY_DIR: &str = "/usr/share/assimilation-tools/ventoy";

const VENTOY_SCRIPT: &str = "Ventoy2Disk.sh";

/// Stage notifications from a transfer. Every method defaults to a no-op.
pub trait TransferProgress {
    /// `total` is `None` when the source is decoded on the fly.
    fn copy_started(&mut self, _total: Option<u64>) {}
    fn copied(&mut self, _bytes: u64) {}
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    Clone,
    #[default]
    Install,
    Ventoy,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Mode::Clone => "clone",
            Mode::Install => "install",
            Mode::Ventoy => "ventoy",
        })
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UsageError {
    #[error("source device not specified for clone mode")]
    MissingCloneSource,
    #[error("ISO file not specified for install mode")]
    MissingImage,
}

#[derive(Debug, Error)]
pub enum TransferError {
    #[error("failed to {action} {}: {source}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{}: source is empty", .0.display())]
    EmptySource(PathBuf),
    #[error("failed to decompress {}: {source}", .path.display())]
    Decompress {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Ventoy installer failed: {0}")]
    Ventoy(#[source] CommandError),
}

impl TransferError {
    pub(crate) fn io(action: &'static str, path: &Path, source: io::Error) -> Self {
        TransferError::Io {
            action,
            path: path.to_path_buf(),
            source,
        }
    }
}

/// A fully specified transfer, checked for its required inputs before any
/// device is touched.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Plan {
    Clone { source: PathBuf },
    Install { image: PathBuf },
    Ventoy { script: PathBuf },
}

impl Plan {
    pub fn new(mode: Mode, source: Option<PathBuf>, ventoy_dir: &Path) -> Result<Self, UsageError> {
        match mode {
            Mode::Clone => source
                .map(|source| Plan::Clone { source })
                .ok_or(UsageError::MissingCloneSource),
            Mode::Install => source
                .map(|image| Plan::Install { image })
                .ok_or(UsageError::MissingImage),
            Mode::Ventoy => Ok(Plan::Ventoy {
                script: ventoy_dir.join(VENTOY_SCRIPT),
            }),
        }
    }
}

pub struct Executor<'a, R> {
    runner: &'a R,
    options: CopyOptions,
}

impl<'a, R: CommandRunner> Executor<'a, R> {
    pub fn new(runner: &'a R, options: CopyOptions) -> Self {
        Self { runner, options }
    }

    /// Performs the plan's single write onto `target`.
    pub fn execute(
        &self,
        plan: &Plan,
        target: &TargetDevice,
        progress: &mut dyn TransferProgress,
    ) -> Result<(), TransferError> {
        match plan {
            Plan::Clone { source } => {
                info!(source = %source.display(), target = %target.path.display(), "cloning");
                copy::run(copy::Source::open(source)?, &target.path, &self.options, progress)?;
            }
            Plan::Install { image } => {
                info!(image = %image.display(), target = %target.path.display(), "installing");
                let source = decompress::open_image(image)?;
                copy::run(source, &target.path, &self.options, progress)?;
            }
            Plan::Ventoy { script } => {
                info!(target = %target.path.display(), "setting up Ventoy");
                let device = target.path.to_string_lossy().into_owned();
                self.runner
                    .status(&script.to_string_lossy(), &["-i", device.as_str()])
                    .map_err(TransferError::Ventoy)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::fake::FakeRunner;

    struct Silent;
    impl TransferProgress for Silent {}

    fn target(path: &str) -> TargetDevice {
        TargetDevice {
            path: PathBuf::from(path),
            name: "sdb".to_string(),
            removable: true,
            size_gb: 0.0,
        }
    }

    #[test]
    fn copy_modes_need_a_source() {
        let dir = Path::new(DEFAULT_VENTOY_DIR);
        assert_eq!(Plan::new(Mode::Clone, None, dir), Err(UsageError::MissingCloneSource));
        assert_eq!(Plan::new(Mode::Install, None, dir), Err(UsageError::MissingImage));
        assert!(matches!(
            Plan::new(Mode::Install, Some("starfleet.iso".into()), dir),
            Ok(Plan::Install { .. })
        ));
    }

    #[test]
    fn ventoy_ignores_the_source() {
        let plan = Plan::new(Mode::Ventoy, None, Path::new("/opt/ventoy")).unwrap();
        assert_eq!(
            plan,
            Plan::Ventoy {
                script: PathBuf::from("/opt/ventoy/Ventoy2Disk.sh")
            }
        );
    }

    #[test]
    fn ventoy_runs_the_installer_against_the_target() {
        let runner = FakeRunner::default().with("/opt/ventoy/Ventoy2Disk.sh", "");
        let plan = Plan::new(Mode::Ventoy, None, Path::new("/opt/ventoy")).unwrap();

        Executor::new(&runner, CopyOptions::default())
            .execute(&plan, &target("/dev/sdb"), &mut Silent)
            .unwrap();

        assert_eq!(
            *runner.calls.borrow(),
            vec!["/opt/ventoy/Ventoy2Disk.sh -i /dev/sdb"]
        );
    }

    #[test]
    fn install_streams_a_compressed_image_onto_the_target() {
        use flate2::Compression;
        use flate2::write::GzEncoder;
        use std::fs;
        use std::io::Write;

        let tmp = tempfile::TempDir::new().unwrap();
        let image = tmp.path().join("starfleet.img.gz");
        let device = tmp.path().join("sdb");
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b"resistance is futile").unwrap();
        fs::write(&image, encoder.finish().unwrap()).unwrap();
        fs::write(&device, vec![0u8; 64]).unwrap();

        let plan = Plan::new(Mode::Install, Some(image), Path::new(DEFAULT_VENTOY_DIR)).unwrap();
        Executor::new(&FakeRunner::default(), CopyOptions { direct_io: false })
            .execute(&plan, &target(device.to_str().unwrap()), &mut Silent)
            .unwrap();

        let written = fs::read(&device).unwrap();
        assert_eq!(&written[..20], b"resistance is futile");
        assert_eq!(written.len(), 64);
    }

    #[test]
    fn ventoy_failure_is_reported() {
        let runner = FakeRunner::default();
        let plan = Plan::new(Mode::Ventoy, None, Path::new("/opt/ventoy")).unwrap();

        let err = Executor::new(&runner, CopyOptions::default())
            .execute(&plan, &target("/dev/sdb"), &mut Silent)
            .unwrap_err();
        assert!(matches!(err, TransferError::Ventoy(CommandError::NotFound { .. })));
    }
}
