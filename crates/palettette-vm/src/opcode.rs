//! Opcode definitions and instruction decoding.
//!
//! The red channel of the instruction pixel selects the opcode; green and
//! blue are raw operand bytes interpreted by each handler. Byte values are
//! fixed: programs are painted against them, so they must never be
//! renumbered.
//!
//! # Opcode Table
//!
//! | r   | Opcode           | g                     | b                  |
//! |-----|------------------|-----------------------|--------------------|
//! | 0   | `Halt`           | -                     | -                  |
//! | 1   | `SetVar`         | channel selector      | destination reg    |
//! | 2   | `Calculate`      | `op << 5 \| channel`  | accumulator reg    |
//! | 3   | `DefineFunction` | parameter reg         | function id        |
//! | 4   | `DefineTry`      | -                     | destination reg    |
//! | 5   | `Return`         | -                     | -                  |
//! | 6   | `Branch`         | left reg              | right reg          |
//! | 7   | `Throw`          | code reg              | -                  |
//! | 8   | `Output`         | -                     | source reg         |
//! | 9   | `Input`          | -                     | destination reg    |
//! | 10  | `Call`           | argument reg          | function id        |
//! | 255 | `Nop`            | -                     | -                  |

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Fault, FaultKind};
use crate::grid::Pixel;

/// Instruction kind, discriminant equal to its red-channel byte.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OpcodeKind {
    /// Stops execution until the next `run()`.
    Halt = 0,
    /// Copies one channel of the lookahead pixel into a register.
    SetVar = 1,
    /// Wrapping arithmetic between a register and a lookahead channel.
    Calculate = 2,
    /// Binds a function slot to the current location.
    DefineFunction = 3,
    /// Installs the single pending try-handler at the current location.
    DefineTry = 4,
    /// Pops the call stack into the cursor.
    Return = 5,
    /// Turns a quarter turn when two registers are equal.
    Branch = 6,
    /// Raises the code held in a register.
    Throw = 7,
    /// Appends a register as a printable ASCII character.
    Output = 8,
    /// Reads the next input character into a register.
    Input = 9,
    /// Calls a bound function slot.
    Call = 10,
    /// Does nothing.
    Nop = 255,
}

/// Number of opcode kinds. Sizes the dense handler table.
pub const OPCODE_COUNT: usize = 12;

/// Static metadata for an opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpcodeMetadata {
    /// Assembly-style name used in traces and disassembly.
    pub mnemonic: &'static str,
    /// Whether the opcode reads the operand pixel one cell ahead.
    pub reads_lookahead: bool,
}

impl OpcodeKind {
    /// All opcode kinds in dense-index order.
    pub const ALL: [OpcodeKind; OPCODE_COUNT] = [
        OpcodeKind::Halt,
        OpcodeKind::SetVar,
        OpcodeKind::Calculate,
        OpcodeKind::DefineFunction,
        OpcodeKind::DefineTry,
        OpcodeKind::Return,
        OpcodeKind::Branch,
        OpcodeKind::Throw,
        OpcodeKind::Output,
        OpcodeKind::Input,
        OpcodeKind::Call,
        OpcodeKind::Nop,
    ];

    /// The red-channel byte encoding this opcode.
    pub const fn byte(self) -> u8 {
        self as u8
    }

    /// Dense index into per-opcode tables.
    pub const fn index(self) -> usize {
        match self {
            OpcodeKind::Nop => OPCODE_COUNT - 1,
            other => other as usize,
        }
    }

    pub const fn metadata(self) -> OpcodeMetadata {
        let (mnemonic, reads_lookahead) = match self {
            OpcodeKind::Halt => ("HALT", false),
            OpcodeKind::SetVar => ("SET", true),
            OpcodeKind::Calculate => ("CALC", true),
            OpcodeKind::DefineFunction => ("DEFN", false),
            OpcodeKind::DefineTry => ("TRY", false),
            OpcodeKind::Return => ("RET", false),
            OpcodeKind::Branch => ("BEQ", false),
            OpcodeKind::Throw => ("THROW", false),
            OpcodeKind::Output => ("OUT", false),
            OpcodeKind::Input => ("IN", false),
            OpcodeKind::Call => ("CALL", false),
            OpcodeKind::Nop => ("NOP", false),
        };
        OpcodeMetadata {
            mnemonic,
            reads_lookahead,
        }
    }
}

impl TryFrom<u8> for OpcodeKind {
    type Error = Fault;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        match byte {
            0 => Ok(OpcodeKind::Halt),
            1 => Ok(OpcodeKind::SetVar),
            2 => Ok(OpcodeKind::Calculate),
            3 => Ok(OpcodeKind::DefineFunction),
            4 => Ok(OpcodeKind::DefineTry),
            5 => Ok(OpcodeKind::Return),
            6 => Ok(OpcodeKind::Branch),
            7 => Ok(OpcodeKind::Throw),
            8 => Ok(OpcodeKind::Output),
            9 => Ok(OpcodeKind::Input),
            10 => Ok(OpcodeKind::Call),
            255 => Ok(OpcodeKind::Nop),
            _ => Err(FaultKind::InvalidInstruction.into()),
        }
    }
}

/// A decoded instruction: opcode plus its two raw operand bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Instruction {
    pub kind: OpcodeKind,
    pub g: u8,
    pub b: u8,
}

impl Instruction {
    pub const fn new(kind: OpcodeKind, g: u8, b: u8) -> Self {
        Self { kind, g, b }
    }

    /// Decodes an instruction pixel.
    ///
    /// # Errors
    ///
    /// Returns [`FaultKind::InvalidInstruction`] if the red channel does not
    /// name an opcode.
    pub fn decode(pixel: Pixel) -> Result<Self, Fault> {
        let kind = OpcodeKind::try_from(pixel.r())?;
        Ok(Self::new(kind, pixel.g(), pixel.b()))
    }

    /// Cells the cursor advances after this instruction completes: the
    /// lookahead operand pixel is consumed along with the instruction.
    pub const fn width(self) -> usize {
        if self.kind.metadata().reads_lookahead { 2 } else { 1 }
    }

    /// Encodes back to the pixel that decodes to this instruction.
    pub const fn to_pixel(self) -> Pixel {
        Pixel::new(self.kind.byte(), self.g, self.b)
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.kind.metadata().mnemonic, self.g, self.b)
    }
}

/// Channel selector values accepted by `SetVar`'s green byte.
pub mod selector {
    pub const RED: u8 = 1;
    pub const GREEN: u8 = 2;
    pub const BLUE: u8 = 3;

    /// Maps a selector byte to a 1-based channel index.
    pub const fn channel(g: u8) -> Option<u8> {
        match g {
            RED => Some(1),
            GREEN => Some(2),
            BLUE => Some(3),
            _ => None,
        }
    }
}

/// Arithmetic operators encoded in the top bits of `Calculate`'s green byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CalcOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl CalcOp {
    /// Decodes `g >> 5`.
    pub const fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            1 => Some(CalcOp::Add),
            2 => Some(CalcOp::Sub),
            3 => Some(CalcOp::Mul),
            4 => Some(CalcOp::Div),
            _ => None,
        }
    }

    pub const fn bits(self) -> u8 {
        match self {
            CalcOp::Add => 1,
            CalcOp::Sub => 2,
            CalcOp::Mul => 3,
            CalcOp::Div => 4,
        }
    }

    /// Builds the green byte for this operator reading `channel` (1..=3).
    pub const fn encode(self, channel: u8) -> u8 {
        (self.bits() << 5) | (channel & 0b11)
    }
}
