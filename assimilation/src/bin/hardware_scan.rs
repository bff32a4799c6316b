use anyhow::{Context, Result};
use assimilation::{logging, ui};
use assimilation_core::collect::Collector;
use assimilation_core::command::SystemRunner;
use assimilation_core::render::{self, Format};
use assimilation_core::report::ScanType;
use clap::{Parser, ValueEnum};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Json,
    Yaml,
    Text,
}

impl From<FormatArg> for Format {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Json => Format::Json,
            FormatArg::Yaml => Format::Yaml,
            FormatArg::Text => Format::Text,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum ScanArg {
    Full,
    Quick,
    Network,
    Usb,
    Pci,
}

impl From<ScanArg> for ScanType {
    fn from(arg: ScanArg) -> Self {
        match arg {
            ScanArg::Full => ScanType::Full,
            ScanArg::Quick => ScanType::Quick,
            ScanArg::Network => ScanType::Network,
            ScanArg::Usb => ScanType::Usb,
            ScanArg::Pci => ScanType::Pci,
        }
    }
}

#[derive(Parser)]
#[command(name = "hardware-scan")]
#[command(about = "Scan host hardware and report what was found", version)]
struct Cli {
    /// Output file for scan results (default: standard output)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: FormatArg,

    /// Scan type
    #[arg(short, long, value_enum, default_value = "quick")]
    scan: ScanArg,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn run(cli: Cli) -> Result<()> {
    let spinner = ui::scan_spinner();
    let report = Collector::new(SystemRunner).scan(cli.scan.into());
    spinner.finish_and_clear();

    let output = render::render(&report, cli.format.into())?;

    match cli.output {
        Some(path) => {
            fs::write(&path, &output)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("Scan results written to {}", path.display());
        }
        None => println!("{output}"),
    }
    Ok(())
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

    logging::init(if cli.verbose { "debug" } else { "warn" });

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
