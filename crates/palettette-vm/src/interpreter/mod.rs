//! Fetch-decode-execute stepper.
//!
//! The interpreter owns one immutable [`Grid`] and the mutable
//! [`ExecutionState`] that runs against it. Each call to [`Interpreter::step`]
//! performs exactly one cycle:
//!
//! 1. Fetch the pixel under the cursor.
//! 2. Decode its red channel into an opcode.
//! 3. Dispatch to the registered handler.
//! 4. On failure, recover through the pending try-handler or stop fatally.
//! 5. Advance the cursor along the current direction: past the operand pixel
//!    for instructions that consumed one, otherwise by a single cell.
//!
//! # Recovery Model
//!
//! At most one try-handler is pending. A raised fault consumes it: the cursor
//! jumps to the handler's location, the fault code lands in its destination
//! register, and the slot is cleared. The advance in step 5 then runs from the
//! recovered location, so execution resumes one cell past the try. With no
//! handler pending the fault escapes as [`VmError::Uncaught`] and the
//! interpreter enters [`Status::Faulted`].

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::error::{Fault, VmError};
use crate::grid::{Direction, Grid, Location};
use crate::handlers::Control;
use crate::io::InputStream;
use crate::opcode::Instruction;
use crate::registry::handler_for;
use crate::snapshot::Snapshot;
use crate::state::ExecutionState;

/// Lifecycle of an interpreter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    /// Constructed or reset, not started.
    Idle,
    /// Between `run()` and a halt or fatal fault.
    Running,
    /// Stopped by a `Halt` instruction.
    Halted,
    /// Stopped by an uncaught fault.
    Faulted { code: u8 },
}

/// A single-cursor VM bound to one program grid.
///
/// A new program needs a new interpreter; `run()` and `reset()` only
/// reinitialise mutable state against the same grid.
#[derive(Debug, Clone)]
pub struct Interpreter {
    grid: Grid,
    state: ExecutionState,
    status: Status,
    steps: u64,
}

impl Interpreter {
    /// Creates an idle interpreter for `grid` with the given input characters.
    pub fn new(grid: Grid, input: impl Into<InputStream>) -> Self {
        Self {
            grid,
            state: ExecutionState::new(input.into()),
            status: Status::Idle,
            steps: 0,
        }
    }

    /// Clears all mutable state and stops running.
    pub fn reset(&mut self) {
        self.state.reset();
        self.status = Status::Idle;
        self.steps = 0;
        debug!(
            width = self.grid.width(),
            height = self.grid.height(),
            "interpreter reset"
        );
    }

    /// Resets and starts running from the origin.
    pub fn run(&mut self) {
        self.reset();
        self.status = Status::Running;
        debug!("interpreter running");
    }

    /// Executes one instruction. A no-op unless running.
    ///
    /// # Errors
    ///
    /// Returns [`VmError::Uncaught`] when an instruction fails with no
    /// try-handler pending. The interpreter is then [`Status::Faulted`] and
    /// further steps do nothing until `run()`.
    pub fn step(&mut self) -> Result<(), VmError> {
        if self.status != Status::Running {
            return Ok(());
        }

        let at = self.state.location;
        let pixel = self.grid.get(at);
        let outcome = Instruction::decode(pixel).and_then(|instruction| {
            trace!(step = self.steps, location = %at, %instruction, "execute");
            let handler = handler_for(instruction.kind);
            let control = handler(&instruction, &mut self.state, &self.grid)?;
            Ok((control, instruction.width()))
        });
        self.steps += 1;

        let advance = match outcome {
            Ok((Control::Continue, width)) => width,
            Ok((Control::Halt, width)) => {
                self.status = Status::Halted;
                debug!(location = %at, steps = self.steps, "halted");
                width
            }
            Err(fault) => {
                self.raise(fault, at)?;
                1
            }
        };

        self.state.location = self
            .grid
            .offset(self.state.location, self.state.direction, advance);
        Ok(())
    }

    /// Routes a fault to the pending try-handler, or fails fatally.
    fn raise(&mut self, fault: Fault, at: Location) -> Result<(), VmError> {
        let code = fault.code();
        match self.state.try_handler.take() {
            Some(handler) => {
                debug!(
                    %fault,
                    code,
                    from = %at,
                    to = %handler.location,
                    dest = handler.dest,
                    "fault recovered"
                );
                self.state.location = handler.location;
                self.state.set_register(handler.dest, code);
                Ok(())
            }
            None => {
                self.status = Status::Faulted { code };
                warn!(%fault, code, location = %at, "uncaught fault");
                Err(VmError::Uncaught {
                    code,
                    fault,
                    location: at,
                })
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.status == Status::Running
    }

    pub fn status(&self) -> Status {
        self.status
    }

    /// Characters produced by `Output` so far.
    pub fn output(&self) -> &str {
        self.state.output.as_str()
    }

    pub fn location(&self) -> Location {
        self.state.location
    }

    pub fn direction(&self) -> Direction {
        self.state.direction
    }

    pub fn register(&self, index: u8) -> u8 {
        self.state.register(index)
    }

    /// Number of steps executed since the last reset.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn state(&self) -> &ExecutionState {
        &self.state
    }

    /// Captures a serialisable view of the current state.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(self.status, self.steps, &self.state)
    }
}
