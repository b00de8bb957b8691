//! Palettette Run
//!
//! Host tooling for the Palettette VM: YAML program manifests, a bounded
//! driver loop and logging setup for the `palettette-run` binary.

use tracing_subscriber::{EnvFilter, fmt};

pub mod driver;
pub mod manifest;

pub use driver::{DriveError, RunReport, drive};
pub use manifest::{ManifestError, ProgramManifest};

/// Initialize logging with a default filter.
///
/// Use `RUST_LOG` environment variable to override the default filter.
/// `trace_vm` raises the VM to `trace`, logging every executed instruction.
/// Logs go to stderr so program output on stdout stays clean.
pub fn init_logging(trace_vm: bool) {
    let default = if trace_vm {
        "info,palettette_vm=trace,palettette_run=debug"
    } else {
        "info,palettette_vm=info,palettette_run=debug"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
