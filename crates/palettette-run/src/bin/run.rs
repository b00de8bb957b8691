//!
//! Loads and executes a Palettette program manifest.
//!
//! Usage: `palettette-run <manifest> [--steps N] [--input TEXT] [--trace] [--dump]`

use std::io::Write;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing::{error, info};

use palettette_run::{DriveError, ProgramManifest, drive};

#[derive(Parser, Debug)]
#[command(name = "palettette-run")]
#[command(about = "Execute a Palettette program from a YAML manifest")]
struct Args {
    /// Path to the program manifest (YAML)
    manifest: PathBuf,

    /// Maximum number of steps before giving up (0 = unbounded)
    #[arg(long = "steps", default_value = "10000")]
    steps: u64,

    /// Input characters, overriding the manifest's `input`
    #[arg(long)]
    input: Option<String>,

    /// Log every executed instruction
    #[arg(long)]
    trace: bool,

    /// Print the final interpreter snapshot as JSON
    #[arg(long)]
    dump: bool,
}

fn main() {
    let args = Args::parse();
    palettette_run::init_logging(args.trace);

    let manifest = match ProgramManifest::load(&args.manifest) {
        Ok(m) => m,
        Err(e) => {
            error!(
                "Failed to load manifest '{}': {}",
                args.manifest.display(),
                e
            );
            process::exit(1);
        }
    };
    info!(
        "Loaded program: {} ({})",
        manifest.metadata.name,
        args.manifest.display()
    );

    let mut vm = match manifest.interpreter(args.input.as_deref()) {
        Ok(vm) => vm,
        Err(e) => {
            error!("Invalid program '{}': {}", manifest.metadata.name, e);
            process::exit(1);
        }
    };
    info!("  Grid: {}x{}", vm.grid().width(), vm.grid().height());

    let result = drive(&mut vm, args.steps);

    let mut stdout = std::io::stdout().lock();
    if let Err(e) = writeln!(stdout, "{}", vm.output()) {
        error!("Failed to write output: {}", e);
        process::exit(1);
    }

    if args.dump {
        match serde_json::to_string_pretty(&vm.snapshot()) {
            Ok(json) => {
                if let Err(e) = writeln!(stdout, "{json}") {
                    error!("Failed to write snapshot: {}", e);
                    process::exit(1);
                }
            }
            Err(e) => {
                error!("Failed to encode snapshot: {}", e);
                process::exit(1);
            }
        }
    }

    match result {
        Ok(report) => info!("Halted after {} steps", report.steps),
        Err(DriveError::StepLimit { limit }) => {
            error!("Program did not halt within {} steps", limit);
            process::exit(1);
        }
        Err(e) => {
            error!("Program failed: {}", e);
            process::exit(1);
        }
    }
}
