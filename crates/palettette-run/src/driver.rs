//! Bounded run loop.
//!
//! [`drive`] starts an interpreter and steps it until it halts, fails fatally,
//! or exhausts its step budget. Pacing between steps is left to callers that
//! need it.

use palettette_vm::{Interpreter, VmError};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

/// Outcome of a program that halted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    /// Instructions executed, including the final `Halt`.
    pub steps: u64,
    /// Characters produced by `Output`.
    pub output: String,
}

#[derive(Debug, Error)]
pub enum DriveError {
    #[error(transparent)]
    Vm(#[from] VmError),

    /// The budget ran out while the program was still running.
    #[error("step limit of {limit} reached without halting")]
    StepLimit { limit: u64 },
}

/// Runs `vm` from the origin. A `max_steps` of 0 means no bound.
///
/// # Errors
///
/// Returns [`DriveError::Vm`] for an uncaught fault and
/// [`DriveError::StepLimit`] if the program is still running after
/// `max_steps` steps. Output produced before either remains readable on `vm`.
pub fn drive(vm: &mut Interpreter, max_steps: u64) -> Result<RunReport, DriveError> {
    vm.run();
    debug!(
        max_steps,
        width = vm.grid().width(),
        height = vm.grid().height(),
        "starting program"
    );

    while vm.is_running() {
        if max_steps != 0 && vm.steps() >= max_steps {
            return Err(DriveError::StepLimit { limit: max_steps });
        }
        vm.step()?;
    }

    info!(steps = vm.steps(), "program halted");
    Ok(RunReport {
        steps: vm.steps(),
        output: vm.output().to_string(),
    })
}
