//! Palettette VM
//!
//! Executes programs painted as a 2D grid of colour triples. A cursor walks
//! the grid on a torus; the red channel of each visited pixel selects an
//! opcode and the green and blue channels are its operand bytes.
//!
//! # Architecture
//!
//! - [`grid`] - immutable program pixels and wrapped addressing
//! - [`state`] - registers, function table, try slot, call stack
//! - [`opcode`] - opcode byte values, metadata and decoding
//! - [`handlers`] / [`registry`] - per-opcode execution, table dispatched
//! - [`interpreter`] - the stepper and the try/throw recovery model
//! - [`snapshot`] - serialisable state for external visualisation

pub mod error;
pub mod grid;
pub mod handlers;
pub mod interpreter;
pub mod io;
pub mod opcode;
pub mod registry;
pub mod snapshot;
pub mod state;

pub use error::{Fault, FaultKind, GridError, VmError};
pub use grid::{Direction, Grid, Location, Pixel};
pub use interpreter::{Interpreter, Status};
pub use io::InputStream;
pub use opcode::{CalcOp, Instruction, OpcodeKind};
pub use snapshot::Snapshot;
pub use state::{ExecutionState, FunctionSlot, TryHandler};
