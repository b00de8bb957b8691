//! Failure taxonomy for the Palettette VM.
//!
//! Every failable instruction raises a [`Fault`]. The interpreter first offers
//! the fault to the pending try-handler; only when none is pending does it
//! escalate to a [`VmError`], which is the single caller-visible failure.
//!
//! # Error Categories
//!
//! - **Raisable faults**: [`FaultKind`] built-ins and user codes from `Throw`
//! - **Fatal errors**: [`VmError::Uncaught`], a fault with no handler
//! - **Construction errors**: [`GridError`], raised before any execution

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::grid::Location;

/// Built-in failure kinds with their fixed numeric codes.
///
/// The discriminant is the code written into the try-handler's destination
/// register, so these values are part of the program-visible contract.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FaultKind {
    /// An operand byte did not map to a valid channel or operator.
    InvalidParameter = 0,
    /// Calculate divided by a zero channel value.
    DivideByZero = 1,
    /// Input was requested after the input sequence was exhausted.
    InputStreamEmpty = 2,
    /// Output was requested for a byte outside printable ASCII.
    OutputNonAscii = 3,
    /// Call targeted an unbound function slot.
    FunctionUndefined = 4,
    /// The red channel did not decode to any opcode.
    InvalidInstruction = 5,
    /// Return was executed with an empty call stack.
    NoFunctionCalled = 6,
}

impl FaultKind {
    /// Numeric code carried by the recovery mechanism.
    pub const fn code(self) -> u8 {
        self as u8
    }
}

/// A raised failure, either built-in or thrown by the program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
pub enum Fault {
    #[error("{0:?}")]
    Builtin(FaultKind),

    #[error("thrown code {0}")]
    User(u8),
}

impl Fault {
    /// The code written to the handler register or exposed when uncaught.
    pub const fn code(self) -> u8 {
        match self {
            Fault::Builtin(kind) => kind.code(),
            Fault::User(code) => code,
        }
    }
}

impl From<FaultKind> for Fault {
    fn from(kind: FaultKind) -> Self {
        Fault::Builtin(kind)
    }
}

/// Fatal, caller-visible VM error.
///
/// Once returned from [`crate::Interpreter::step`], the interpreter is in a
/// terminal state and further steps are no-ops until the next `run()`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VmError {
    /// A fault was raised while no try-handler was pending.
    #[error("uncaught Palettette error {code} ({fault}) at {location}")]
    Uncaught {
        /// Numeric failure code.
        code: u8,
        /// The fault that escaped.
        fault: Fault,
        /// Cursor location of the failing instruction.
        location: Location,
    },
}

impl VmError {
    /// Numeric code of the uncaught failure.
    pub fn code(&self) -> u8 {
        match self {
            VmError::Uncaught { code, .. } => *code,
        }
    }
}

/// Errors raised while materialising a [`crate::Grid`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("grid dimensions must be non-zero, got {width}x{height}")]
    EmptyDimensions { width: usize, height: usize },

    #[error("grid of {width}x{height} cells is too large to address")]
    TooLarge { width: usize, height: usize },

    #[error("expected {expected} cells for the grid, got {found}")]
    CellCountMismatch { expected: usize, found: usize },

    #[error("row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_codes_are_stable() {
        assert_eq!(FaultKind::InvalidParameter.code(), 0);
        assert_eq!(FaultKind::DivideByZero.code(), 1);
        assert_eq!(FaultKind::InputStreamEmpty.code(), 2);
        assert_eq!(FaultKind::OutputNonAscii.code(), 3);
        assert_eq!(FaultKind::FunctionUndefined.code(), 4);
        assert_eq!(FaultKind::InvalidInstruction.code(), 5);
        assert_eq!(FaultKind::NoFunctionCalled.code(), 6);
    }

    #[test]
    fn user_fault_carries_raw_code() {
        assert_eq!(Fault::User(200).code(), 200);
        assert_eq!(Fault::from(FaultKind::DivideByZero).code(), 1);
    }

    #[test]
    fn uncaught_error_exposes_code() {
        let err = VmError::Uncaught {
            code: 4,
            fault: Fault::Builtin(FaultKind::FunctionUndefined),
            location: Location::new(2, 3),
        };
        assert_eq!(err.code(), 4);
        assert!(err.to_string().contains("uncaught Palettette error 4"));
    }
}
