//! Mutable execution state of a running program.
//!
//! Everything the stepper mutates lives here; the [`Grid`](crate::Grid) is
//! held separately and never written to.

use serde::{Deserialize, Serialize};

use crate::grid::{Direction, Location};
use crate::io::{InputStream, OutputBuffer};

/// Number of byte registers, and of function slots.
pub const REGISTER_COUNT: usize = 256;

/// A bound function slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionSlot {
    /// Location of the defining instruction; calls jump here.
    pub location: Location,
    /// Register that receives the call argument.
    pub param: u8,
}

/// The single pending recovery target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TryHandler {
    /// Location of the defining instruction; recovery resumes one cell past it.
    pub location: Location,
    /// Register that receives the failure code.
    pub dest: u8,
}

/// Registers, function table, try slot, call stack, cursor and I/O.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionState {
    pub location: Location,
    pub direction: Direction,
    pub registers: [u8; REGISTER_COUNT],
    pub functions: [Option<FunctionSlot>; REGISTER_COUNT],
    pub try_handler: Option<TryHandler>,
    pub call_stack: Vec<Location>,
    pub input: InputStream,
    pub output: OutputBuffer,
}

impl ExecutionState {
    pub fn new(input: InputStream) -> Self {
        Self {
            location: Location::ORIGIN,
            direction: Direction::EAST,
            registers: [0; REGISTER_COUNT],
            functions: [None; REGISTER_COUNT],
            try_handler: None,
            call_stack: Vec::new(),
            input,
            output: OutputBuffer::default(),
        }
    }

    /// Restores the initial state, keeping the input characters but
    /// rewinding their cursor.
    pub fn reset(&mut self) {
        self.location = Location::ORIGIN;
        self.direction = Direction::EAST;
        self.registers = [0; REGISTER_COUNT];
        self.functions = [None; REGISTER_COUNT];
        self.try_handler = None;
        self.call_stack.clear();
        self.input.rewind();
        self.output.clear();
    }

    pub fn register(&self, index: u8) -> u8 {
        self.registers[index as usize]
    }

    pub fn set_register(&mut self, index: u8, value: u8) {
        self.registers[index as usize] = value;
    }

    pub fn function(&self, id: u8) -> Option<FunctionSlot> {
        self.functions[id as usize]
    }

    pub fn bind_function(&mut self, id: u8, slot: FunctionSlot) {
        self.functions[id as usize] = Some(slot);
    }
}
