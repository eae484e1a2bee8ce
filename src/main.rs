//! `svm-fixup`: export the SVM ports of an HLS-generated kernel project.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;

use svm_fixup::config::loader::{project_name_from_source, resolve_config};
use svm_fixup::{FixupConfig, FixupOrchestrator, LogCollector};

#[derive(Debug, Parser)]
#[command(name = "svm-fixup", version)]
#[command(about = "Adds shared-virtual-memory ports to the RTL and Qsys files of an HLS kernel project")]
struct Args {
    /// Path to the kernel source (.cl) the project was generated from.
    cl_file: PathBuf,

    /// Config file; defaults to <config dir>/svm-fixup/config.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Trace every rewritten line.
    #[arg(short, long)]
    verbose: bool,

    /// Print the run report as JSON on stdout.
    #[arg(long)]
    json: bool,

    /// Directory holding the generated <project>/ tree.
    #[arg(long, default_value = ".")]
    work_dir: PathBuf,
}

fn load_config(args: &Args) -> svm_fixup::Result<FixupConfig> {
    let mut config = resolve_config(args.config.as_deref())?;
    if args.verbose {
        config.verbose = true;
    }
    Ok(config)
}

fn print_report(orchestrator: &FixupOrchestrator) {
    match serde_json::to_string_pretty(&orchestrator.report()) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("[Main] Failed to serialize report: {}", e),
    }
}

fn run(args: &Args, work_dir: &Path) -> svm_fixup::Result<()> {
    let project = project_name_from_source(&args.cl_file)?;
    let config = load_config(args)?;

    if let Err(e) = LogCollector::install(&config) {
        eprintln!("[Main] WARNING: Log file unavailable, logging to stderr only: {}", e);
        if let Err(e) = LogCollector::install(&FixupConfig {
            log_file: None,
            ..config.clone()
        }) {
            eprintln!("[Main] WARNING: Logger unavailable: {}", e);
        }
    }

    let mut orchestrator = FixupOrchestrator::new(config, work_dir, &project);
    let result = orchestrator.run();
    if args.json {
        print_report(&orchestrator);
    }
    result.map(|report| {
        log::info!(
            "[Main] {} SVM and {} lock-service ports added across {} kernels",
            report.totals.svm,
            report.totals.lock_service,
            report.kernels.len()
        );
    })
}

fn main() -> ExitCode {
    let args = Args::parse();

    match run(&args, &args.work_dir) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            let mut source = std::error::Error::source(&e);
            while let Some(cause) = source {
                eprintln!("  caused by: {}", cause);
                source = cause.source();
            }
            ExitCode::from(e.exit_code() as u8)
        }
    }
}
