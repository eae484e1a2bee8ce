//! `svm-postprocess`: prepare a fixed-up project for an incremental system update.
//!
//! Removes the cached interface partition and strips `add_` directives from
//! `<project>/system.tcl`. The full `svm-fixup` pipeline runs the same step.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use svm_fixup::config::loader::{project_name_from_source, resolve_config};
use svm_fixup::orchestrator::phases::postprocess_project;
use svm_fixup::LogCollector;

#[derive(Debug, Parser)]
#[command(name = "svm-postprocess", version)]
#[command(about = "Drops the stale interface partition and add_ directives of an HLS kernel project")]
struct Args {
    /// Path to the kernel source (.cl) the project was generated from.
    cl_file: PathBuf,

    /// Config file; only logging settings are used.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(short, long)]
    verbose: bool,

    /// Directory holding the generated <project>/ tree.
    #[arg(long, default_value = ".")]
    work_dir: PathBuf,
}

fn run(args: &Args) -> svm_fixup::Result<()> {
    let project = project_name_from_source(&args.cl_file)?;
    let mut config = resolve_config(args.config.as_deref())?;
    config.verbose |= args.verbose;
    if let Err(e) = LogCollector::install(&config) {
        eprintln!("[Main] WARNING: Logger unavailable: {}", e);
    }

    let summary = postprocess_project(&args.work_dir.join(&project))?;
    log::info!(
        "[Main] Postprocessed '{}': partition removed: {}, directives dropped: {}",
        project,
        summary.partition_removed,
        summary.directives_stripped
    );
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::from(e.exit_code() as u8)
        }
    }
}
