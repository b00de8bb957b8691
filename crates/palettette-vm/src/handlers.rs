//! Opcode handlers.
//!
//! Each handler applies one instruction's effect to the [`ExecutionState`].
//! A handler that fails returns the [`Fault`] before mutating anything, so a
//! recovered failure never leaves a half-applied instruction behind. Cursor
//! advance is the interpreter's job and never happens here, except for the
//! jumps performed by `Call` and `Return`.

use tracing::debug;

use crate::error::{Fault, FaultKind};
use crate::grid::Grid;
use crate::opcode::{CalcOp, Instruction, selector};
use crate::state::{ExecutionState, FunctionSlot, TryHandler};

/// What the interpreter does after a handler succeeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    /// Advance the cursor and keep running.
    Continue,
    /// Stop running after this step's advance.
    Halt,
}

/// Functional interface for an opcode execution handler.
pub type Handler = fn(&Instruction, &mut ExecutionState, &Grid) -> Result<Control, Fault>;

pub(crate) fn handle_halt(
    _instruction: &Instruction,
    _state: &mut ExecutionState,
    _grid: &Grid,
) -> Result<Control, Fault> {
    Ok(Control::Halt)
}

pub(crate) fn handle_noop(
    _instruction: &Instruction,
    _state: &mut ExecutionState,
    _grid: &Grid,
) -> Result<Control, Fault> {
    Ok(Control::Continue)
}

/// Copies one channel of the lookahead pixel into register `b`.
///
/// # Operands
/// - g: channel selector (see [`selector`])
/// - b: destination register
pub(crate) fn handle_set_var(
    instruction: &Instruction,
    state: &mut ExecutionState,
    grid: &Grid,
) -> Result<Control, Fault> {
    let channel = selector::channel(instruction.g).ok_or(FaultKind::InvalidParameter)?;
    let operand = grid.read(state.location, state.direction, 1);
    let value = operand
        .channel(channel)
        .ok_or(FaultKind::InvalidParameter)?;
    state.set_register(instruction.b, value);
    Ok(Control::Continue)
}

/// `registers[b] := registers[b] OP lookahead[channel]`, wrapping at 256.
///
/// # Operands
/// - g: `operator << 5 | channel`
/// - b: accumulator register
pub(crate) fn handle_calculate(
    instruction: &Instruction,
    state: &mut ExecutionState,
    grid: &Grid,
) -> Result<Control, Fault> {
    let channel = instruction.g & 0b11;
    let op = CalcOp::from_bits(instruction.g >> 5);
    let (Some(op), 1..=3) = (op, channel) else {
        return Err(FaultKind::InvalidParameter.into());
    };

    let rhs = grid
        .read(state.location, state.direction, 1)
        .channel(channel)
        .ok_or(FaultKind::InvalidParameter)?;
    let lhs = state.register(instruction.b);
    let result = match op {
        CalcOp::Add => lhs.wrapping_add(rhs),
        CalcOp::Sub => lhs.wrapping_sub(rhs),
        CalcOp::Mul => lhs.wrapping_mul(rhs),
        CalcOp::Div => lhs
            .checked_div(rhs)
            .ok_or(FaultKind::DivideByZero)?,
    };
    state.set_register(instruction.b, result);
    Ok(Control::Continue)
}

/// Binds function `b` to the current location with parameter register `g`.
pub(crate) fn handle_define_function(
    instruction: &Instruction,
    state: &mut ExecutionState,
    _grid: &Grid,
) -> Result<Control, Fault> {
    let slot = FunctionSlot {
        location: state.location,
        param: instruction.g,
    };
    debug!(id = instruction.b, param = slot.param, location = %slot.location, "function bound");
    state.bind_function(instruction.b, slot);
    Ok(Control::Continue)
}

/// Replaces the pending try-handler with one at the current location.
pub(crate) fn handle_define_try(
    instruction: &Instruction,
    state: &mut ExecutionState,
    _grid: &Grid,
) -> Result<Control, Fault> {
    let handler = TryHandler {
        location: state.location,
        dest: instruction.b,
    };
    if state.try_handler.is_some() {
        debug!(location = %handler.location, "pending try-handler replaced");
    } else {
        debug!(location = %handler.location, dest = handler.dest, "try-handler installed");
    }
    state.try_handler = Some(handler);
    Ok(Control::Continue)
}

pub(crate) fn handle_return(
    _instruction: &Instruction,
    state: &mut ExecutionState,
    _grid: &Grid,
) -> Result<Control, Fault> {
    let caller = state
        .call_stack
        .pop()
        .ok_or(FaultKind::NoFunctionCalled)?;
    debug!(to = %caller, depth = state.call_stack.len(), "return");
    state.location = caller;
    Ok(Control::Continue)
}

/// Turns a quarter turn when `registers[g] == registers[b]`.
pub(crate) fn handle_branch(
    instruction: &Instruction,
    state: &mut ExecutionState,
    _grid: &Grid,
) -> Result<Control, Fault> {
    if state.register(instruction.g) == state.register(instruction.b) {
        state.direction = state.direction.rotated();
    }
    Ok(Control::Continue)
}

pub(crate) fn handle_throw(
    instruction: &Instruction,
    state: &mut ExecutionState,
    _grid: &Grid,
) -> Result<Control, Fault> {
    Err(Fault::User(state.register(instruction.g)))
}

pub(crate) fn handle_output(
    instruction: &Instruction,
    state: &mut ExecutionState,
    _grid: &Grid,
) -> Result<Control, Fault> {
    let code = state.register(instruction.b);
    state.output.push(code)?;
    Ok(Control::Continue)
}

pub(crate) fn handle_input(
    instruction: &Instruction,
    state: &mut ExecutionState,
    _grid: &Grid,
) -> Result<Control, Fault> {
    let code = state.input.next_code()?;
    state.set_register(instruction.b, code);
    Ok(Control::Continue)
}

/// Calls function `b`, passing `registers[g]` into its parameter register.
pub(crate) fn handle_call(
    instruction: &Instruction,
    state: &mut ExecutionState,
    _grid: &Grid,
) -> Result<Control, Fault> {
    let function = state
        .function(instruction.b)
        .ok_or(FaultKind::FunctionUndefined)?;
    let argument = state.register(instruction.g);
    state.set_register(function.param, argument);
    state.call_stack.push(state.location);
    debug!(
        id = instruction.b,
        to = %function.location,
        depth = state.call_stack.len(),
        "call"
    );
    state.location = function.location;
    Ok(Control::Continue)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{Direction, Location, Pixel};
    use crate::io::InputStream;
    use crate::opcode::OpcodeKind;

    fn grid_with_operand(operand: Pixel) -> Grid {
        Grid::new(2, 1, vec![Pixel::new(255, 255, 255), operand]).unwrap()
    }

    fn calc(op: CalcOp, channel: u8, reg: u8) -> Instruction {
        Instruction::new(OpcodeKind::Calculate, op.encode(channel), reg)
    }

    #[test]
    fn set_var_reads_selected_channel() {
        let grid = grid_with_operand(Pixel::new(10, 20, 30));
        let mut state = ExecutionState::new(InputStream::default());
        let instr = Instruction::new(OpcodeKind::SetVar, selector::GREEN, 4);
        handle_set_var(&instr, &mut state, &grid).unwrap();
        assert_eq!(state.register(4), 20);
    }

    #[test]
    fn set_var_rejects_unknown_selector_without_writing() {
        let grid = grid_with_operand(Pixel::new(10, 20, 30));
        let mut state = ExecutionState::new(InputStream::default());
        state.set_register(4, 77);
        let instr = Instruction::new(OpcodeKind::SetVar, 0, 4);
        assert_eq!(
            handle_set_var(&instr, &mut state, &grid),
            Err(Fault::Builtin(FaultKind::InvalidParameter))
        );
        assert_eq!(state.register(4), 77);
    }

    #[test]
    fn calculate_wraps_modulo_256() {
        let grid = grid_with_operand(Pixel::new(200, 3, 7));
        let mut state = ExecutionState::new(InputStream::default());

        state.set_register(0, 100);
        handle_calculate(&calc(CalcOp::Add, 1, 0), &mut state, &grid).unwrap();
        assert_eq!(state.register(0), 44);

        state.set_register(1, 2);
        handle_calculate(&calc(CalcOp::Sub, 2, 1), &mut state, &grid).unwrap();
        assert_eq!(state.register(1), 255);

        state.set_register(2, 100);
        handle_calculate(&calc(CalcOp::Mul, 2, 2), &mut state, &grid).unwrap();
        assert_eq!(state.register(2), 44);

        state.set_register(3, 50);
        handle_calculate(&calc(CalcOp::Div, 3, 3), &mut state, &grid).unwrap();
        assert_eq!(state.register(3), 7);
    }

    #[test]
    fn calculate_division_by_zero_faults() {
        let grid = grid_with_operand(Pixel::new(0, 0, 0));
        let mut state = ExecutionState::new(InputStream::default());
        state.set_register(5, 9);
        assert_eq!(
            handle_calculate(&calc(CalcOp::Div, 1, 5), &mut state, &grid),
            Err(Fault::Builtin(FaultKind::DivideByZero))
        );
        assert_eq!(state.register(5), 9);
    }

    #[test]
    fn calculate_rejects_bad_channel_or_operator() {
        let grid = grid_with_operand(Pixel::new(1, 1, 1));
        let mut state = ExecutionState::new(InputStream::default());
        for g in [CalcOp::Add.encode(0), 0b0000_0001, 5 << 5 | 1, 7 << 5 | 3] {
            let instr = Instruction::new(OpcodeKind::Calculate, g, 0);
            assert_eq!(
                handle_calculate(&instr, &mut state, &grid),
                Err(Fault::Builtin(FaultKind::InvalidParameter)),
                "g = {g:#010b}"
            );
        }
        assert_eq!(state.register(0), 0);
    }

    #[test]
    fn lookahead_follows_direction() {
        let grid = Grid::new(
            3,
            1,
            vec![
                Pixel::new(255, 255, 255),
                Pixel::new(1, 1, 1),
                Pixel::new(9, 9, 9),
            ],
        )
        .unwrap();
        let mut state = ExecutionState::new(InputStream::default());
        state.direction = Direction::WEST;
        let instr = Instruction::new(OpcodeKind::SetVar, selector::RED, 0);
        handle_set_var(&instr, &mut state, &grid).unwrap();
        assert_eq!(state.register(0), 9);
    }

    #[test]
    fn call_then_return_restores_caller() {
        let grid = grid_with_operand(Pixel::default());
        let mut state = ExecutionState::new(InputStream::default());
        state.bind_function(
            7,
            FunctionSlot {
                location: Location::new(1, 0),
                param: 2,
            },
        );
        state.set_register(3, 99);

        let call = Instruction::new(OpcodeKind::Call, 3, 7);
        handle_call(&call, &mut state, &grid).unwrap();
        assert_eq!(state.location, Location::new(1, 0));
        assert_eq!(state.register(2), 99);
        assert_eq!(state.call_stack, vec![Location::ORIGIN]);

        let ret = Instruction::new(OpcodeKind::Return, 0, 0);
        handle_return(&ret, &mut state, &grid).unwrap();
        assert_eq!(state.location, Location::ORIGIN);
        assert!(state.call_stack.is_empty());
    }

    #[test]
    fn call_to_unbound_slot_faults() {
        let grid = grid_with_operand(Pixel::default());
        let mut state = ExecutionState::new(InputStream::default());
        let call = Instruction::new(OpcodeKind::Call, 0, 1);
        assert_eq!(
            handle_call(&call, &mut state, &grid),
            Err(Fault::Builtin(FaultKind::FunctionUndefined))
        );
        assert!(state.call_stack.is_empty());
    }

    #[test]
    fn return_with_empty_stack_faults() {
        let grid = grid_with_operand(Pixel::default());
        let mut state = ExecutionState::new(InputStream::default());
        let ret = Instruction::new(OpcodeKind::Return, 0, 0);
        assert_eq!(
            handle_return(&ret, &mut state, &grid),
            Err(Fault::Builtin(FaultKind::NoFunctionCalled))
        );
    }

    #[test]
    fn branch_rotates_only_on_equality() {
        let grid = grid_with_operand(Pixel::default());
        let mut state = ExecutionState::new(InputStream::default());
        state.set_register(1, 5);
        let branch = Instruction::new(OpcodeKind::Branch, 1, 2);
        handle_branch(&branch, &mut state, &grid).unwrap();
        assert_eq!(state.direction, Direction::EAST);

        state.set_register(2, 5);
        handle_branch(&branch, &mut state, &grid).unwrap();
        assert_eq!(state.direction, Direction::SOUTH);
    }

    #[test]
    fn throw_raises_register_value() {
        let grid = grid_with_operand(Pixel::default());
        let mut state = ExecutionState::new(InputStream::default());
        state.set_register(8, 201);
        let throw = Instruction::new(OpcodeKind::Throw, 8, 0);
        assert_eq!(
            handle_throw(&throw, &mut state, &grid),
            Err(Fault::User(201))
        );
    }
}
