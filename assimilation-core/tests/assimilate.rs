use assimilation_core::assimilate::{self, AssimilateError, Outcome, Request};
use assimilation_core::command::{CommandError, CommandRunner};
use assimilation_core::confirm::{ConfirmationGate, Decision, Forced, LinePrompt};
use assimilation_core::device::{DeviceValidator, TargetDevice, ValidationError};
use assimilation_core::transfer::{CopyOptions, Mode, TransferProgress, UsageError};
use std::cell::{Cell, RefCell};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const IMAGE: &[u8] = b"STARFLEET-OS boot image, resistance is futile";

/// Records installer invocations instead of spawning them.
#[derive(Default)]
struct RecordingRunner {
    calls: RefCell<Vec<Vec<String>>>,
}

impl CommandRunner for RecordingRunner {
    fn output(&self, program: &str, _args: &[&str]) -> Result<String, CommandError> {
        Err(CommandError::NotFound {
            program: program.to_string(),
        })
    }

    fn status(&self, program: &str, args: &[&str]) -> Result<(), CommandError> {
        let mut call = vec![program.to_string()];
        call.extend(args.iter().map(|a| a.to_string()));
        self.calls.borrow_mut().push(call);
        Ok(())
    }
}

/// Wraps a gate and counts how often the operator was asked.
struct Counting<G> {
    inner: G,
    asked: Cell<usize>,
}

impl<G: ConfirmationGate> ConfirmationGate for Counting<G> {
    fn confirm(&mut self, device: &TargetDevice) -> io::Result<Decision> {
        self.asked.set(self.asked.get() + 1);
        self.inner.confirm(device)
    }
}

#[derive(Default)]
struct Progress {
    total: Option<Option<u64>>,
}

impl TransferProgress for Progress {
    fn copy_started(&mut self, total: Option<u64>) {
        self.total = Some(total);
    }
}

struct Fixture {
    tmp: TempDir,
    device: PathBuf,
    image: PathBuf,
}

impl Fixture {
    fn new(removable: &str) -> Self {
        let tmp = TempDir::new().unwrap();
        let dev = tmp.path().join("dev");
        let sys = tmp.path().join("sys/block/sdb");
        fs::create_dir_all(&dev).unwrap();
        fs::create_dir_all(&sys).unwrap();
        fs::write(sys.join("removable"), format!("{removable}\n")).unwrap();

        let device = dev.join("sdb");
        fs::write(&device, vec![0u8; 64]).unwrap();
        let image = tmp.path().join("starfleet.iso");
        fs::write(&image, IMAGE).unwrap();

        Self { tmp, device, image }
    }

    fn validator(&self) -> DeviceValidator {
        DeviceValidator::with_sys_block(self.tmp.path().join("sys/block"))
    }

    fn request(&self, mode: Mode, source: Option<&Path>) -> Request {
        Request {
            device: self.device.clone(),
            mode,
            source: source.map(Path::to_path_buf),
            ventoy_dir: self.tmp.path().join("ventoy"),
            copy: CopyOptions { direct_io: false },
        }
    }

    fn device_bytes(&self) -> Vec<u8> {
        fs::read(&self.device).unwrap()
    }
}

fn prompt(answer: &str) -> Counting<LinePrompt<&[u8], Vec<u8>>> {
    Counting {
        inner: LinePrompt::new(answer.as_bytes(), Vec::new()),
        asked: Cell::new(0),
    }
}

#[test]
fn confirmed_install_writes_the_image() {
    let fx = Fixture::new("1");
    let mut gate = prompt("yes\n");
    let mut progress = Progress::default();

    let outcome = assimilate::run(
        &fx.request(Mode::Install, Some(&fx.image)),
        &fx.validator(),
        &mut gate,
        &RecordingRunner::default(),
        &mut progress,
    )
    .unwrap();

    assert_eq!(outcome, Outcome::Completed);
    assert_eq!(gate.asked.get(), 1);
    assert_eq!(progress.total, Some(Some(IMAGE.len() as u64)));
    assert_eq!(&fx.device_bytes()[..IMAGE.len()], IMAGE);
}

#[test]
fn declined_prompt_cancels_without_writing() {
    for answer in ["no\n", "\n", ""] {
        let fx = Fixture::new("1");
        let outcome = assimilate::run(
            &fx.request(Mode::Install, Some(&fx.image)),
            &fx.validator(),
            &mut prompt(answer),
            &RecordingRunner::default(),
            &mut Progress::default(),
        )
        .unwrap();

        assert_eq!(outcome, Outcome::Cancelled);
        assert_eq!(fx.device_bytes(), vec![0u8; 64]);
    }
}

#[test]
fn clone_copies_from_the_source_device() {
    let fx = Fixture::new("1");
    let source = fx.tmp.path().join("dev/sdc");
    fs::write(&source, b"golden master stick").unwrap();

    let outcome = assimilate::run(
        &fx.request(Mode::Clone, Some(&source)),
        &fx.validator(),
        &mut Forced,
        &RecordingRunner::default(),
        &mut Progress::default(),
    )
    .unwrap();

    assert_eq!(outcome, Outcome::Completed);
    assert!(fx.device_bytes().starts_with(b"golden master stick"));
}

#[test]
fn missing_source_is_a_usage_error_before_any_prompt() {
    for (mode, expected) in [
        (Mode::Clone, UsageError::MissingCloneSource),
        (Mode::Install, UsageError::MissingImage),
    ] {
        let fx = Fixture::new("1");
        let mut gate = prompt("yes\n");

        let err = assimilate::run(
            &fx.request(mode, None),
            &fx.validator(),
            &mut gate,
            &RecordingRunner::default(),
            &mut Progress::default(),
        )
        .unwrap_err();

        assert!(matches!(err, AssimilateError::Usage(ref e) if *e == expected));
        assert_eq!(gate.asked.get(), 0);
        assert_eq!(fx.device_bytes(), vec![0u8; 64]);
    }
}

#[test]
fn fixed_disk_is_rejected_before_any_prompt() {
    let fx = Fixture::new("0");
    let mut gate = prompt("yes\n");

    let err = assimilate::run(
        &fx.request(Mode::Install, Some(&fx.image)),
        &fx.validator(),
        &mut gate,
        &RecordingRunner::default(),
        &mut Progress::default(),
    )
    .unwrap_err();

    assert!(matches!(
        err,
        AssimilateError::Rejected(ValidationError::NotRemovable(_))
    ));
    assert_eq!(gate.asked.get(), 0);
    assert_eq!(fx.device_bytes(), vec![0u8; 64]);
}

#[test]
fn forced_ventoy_setup_runs_the_installer_without_asking() {
    let fx = Fixture::new("1");
    let runner = RecordingRunner::default();
    let mut gate = Counting {
        inner: Forced,
        asked: Cell::new(0),
    };

    let outcome = assimilate::run(
        &fx.request(Mode::Ventoy, None),
        &fx.validator(),
        &mut gate,
        &runner,
        &mut Progress::default(),
    )
    .unwrap();

    assert_eq!(outcome, Outcome::Completed);
    let script = fx.tmp.path().join("ventoy/Ventoy2Disk.sh");
    assert_eq!(
        *runner.calls.borrow(),
        vec![vec![
            script.to_string_lossy().into_owned(),
            "-i".to_string(),
            fx.device.to_string_lossy().into_owned(),
        ]]
    );
}
