use assimilation::{logging, ui};
use assimilation_core::assimilate::{self, AssimilateError, Outcome, Request};
use assimilation_core::command::SystemRunner;
use assimilation_core::config::AssimilatorConfig;
use assimilation_core::confirm::{ConfirmationGate, Forced, LinePrompt};
use assimilation_core::device::DeviceValidator;
use assimilation_core::transfer::{CopyOptions, Mode};
use clap::{Parser, ValueEnum};
use console::style;
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Clone,
    Install,
    Ventoy,
}

impl From<ModeArg> for Mode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Clone => Mode::Clone,
            ModeArg::Install => Mode::Install,
            ModeArg::Ventoy => Mode::Ventoy,
        }
    }
}

#[derive(Parser)]
#[command(name = "usb-assimilate")]
#[command(about = "Write an image, a cloned stick or Ventoy onto a USB device", version)]
struct Cli {
    /// USB device to assimilate (e.g., /dev/sdb)
    #[arg(short, long, required = true)]
    device: PathBuf,

    /// Assimilation mode
    #[arg(short, long, value_enum, default_value = "install")]
    mode: ModeArg,

    /// ISO file (install) or source device (clone)
    #[arg(short, long)]
    iso: Option<PathBuf>,

    /// Configuration file for customization
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Force operation without confirmation
    #[arg(short, long)]
    force: bool,
}

fn gate(force: bool) -> Box<dyn ConfirmationGate> {
    if force {
        Box::new(Forced)
    } else if io::stdin().is_terminal() {
        Box::new(ui::TermPrompt)
    } else {
        Box::new(LinePrompt::new(io::stdin().lock(), io::stdout()))
    }
}

fn run(cli: Cli) -> Result<Outcome, AssimilateError> {
    let config = match &cli.config {
        Some(path) => AssimilatorConfig::load(path)?,
        None => AssimilatorConfig::default(),
    };

    let mode = Mode::from(cli.mode);
    let request = Request {
        device: cli.device,
        mode,
        source: cli.iso,
        ventoy_dir: config.ventoy_dir,
        copy: CopyOptions::default(),
    };

    let label = match mode {
        Mode::Clone => "Cloning",
        _ => "Installing",
    };
    let mut progress = ui::BarProgress::new(label);
    let mut gate = gate(cli.force);

    let result = assimilate::run(
        &request,
        &DeviceValidator::new(),
        gate.as_mut(),
        &SystemRunner,
        &mut progress,
    );

    match &result {
        Ok(Outcome::Completed) => progress.finish("Write complete."),
        Ok(Outcome::Cancelled) => {}
        Err(_) => progress.fail(),
    }
    result
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    logging::init("warn");

    let device = cli.device.clone();
    let mode = Mode::from(cli.mode);

    match run(cli) {
        Ok(Outcome::Completed) => {
            println!(
                "\n✨ USB assimilation complete: {} ({mode}).",
                style(device.display()).cyan()
            );
            ExitCode::SUCCESS
        }
        Ok(Outcome::Cancelled) => {
            println!("Operation cancelled");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{} {e}", style("Error:").red().bold());
            ExitCode::FAILURE
        }
    }
}
