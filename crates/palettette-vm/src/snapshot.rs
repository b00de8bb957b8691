//! Serialisable state snapshots for visualisation and inspection.

use serde::{Deserialize, Serialize};

use crate::grid::{Direction, Location};
use crate::interpreter::Status;
use crate::state::{ExecutionState, FunctionSlot, TryHandler};

/// A bound function slot together with its id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundFunction {
    pub id: u8,
    #[serde(flatten)]
    pub slot: FunctionSlot,
}

/// Point-in-time view of an interpreter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub status: Status,
    pub steps: u64,
    pub location: Location,
    pub direction: Direction,
    /// All 256 registers, indexed by register id.
    pub registers: Vec<u8>,
    /// Bound function slots only, in id order.
    pub functions: Vec<BoundFunction>,
    pub try_handler: Option<TryHandler>,
    pub call_depth: usize,
    pub input_position: usize,
    pub output: String,
}

impl Snapshot {
    pub(crate) fn capture(status: Status, steps: u64, state: &ExecutionState) -> Self {
        let functions = state
            .functions
            .iter()
            .copied()
            .enumerate()
            .filter_map(|(id, slot)| {
                slot.map(|slot| BoundFunction {
                    id: id as u8,
                    slot,
                })
            })
            .collect();
        Self {
            status,
            steps,
            location: state.location,
            direction: state.direction,
            registers: state.registers.to_vec(),
            functions,
            try_handler: state.try_handler,
            call_depth: state.call_stack.len(),
            input_position: state.input.position(),
            output: state.output.as_str().to_string(),
        }
    }
}
