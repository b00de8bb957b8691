//! Opcode registry linking metadata to handlers.

use std::sync::OnceLock;

use super::handlers::{
    Handler, handle_branch, handle_calculate, handle_call, handle_define_function,
    handle_define_try, handle_halt, handle_input, handle_noop, handle_output, handle_return,
    handle_set_var, handle_throw,
};
use super::opcode::{OPCODE_COUNT, OpcodeKind, OpcodeMetadata};

/// Metadata and handler specification for an opcode.
#[derive(Debug, Clone)]
pub struct OpcodeSpec {
    pub kind: OpcodeKind,
    pub metadata: OpcodeMetadata,
    pub handler: Handler,
}

/// Retrieves the global list of all registered opcode specifications.
///
/// The list is lazily initialized on the first call.
pub fn opcode_specs() -> &'static [OpcodeSpec] {
    static SPECS: OnceLock<Vec<OpcodeSpec>> = OnceLock::new();
    SPECS.get_or_init(build_specs)
}

/// Retrieves the execution handler for a specific opcode kind in O(1) time.
///
/// # Panics
///
/// Panics if the opcode kind has not been registered in `build_specs`.
pub fn handler_for(kind: OpcodeKind) -> Handler {
    static HANDLERS: OnceLock<[Handler; OPCODE_COUNT]> = OnceLock::new();
    HANDLERS.get_or_init(|| {
        let mut table: [Option<Handler>; OPCODE_COUNT] = [None; OPCODE_COUNT];
        for spec in opcode_specs() {
            table[spec.kind.index()] = Some(spec.handler);
        }
        std::array::from_fn(|index| {
            table[index]
                .unwrap_or_else(|| panic!("Missing opcode handler for opcode index {}", index))
        })
    })[kind.index()]
}

/// Master list of opcode specifications.
fn build_specs() -> Vec<OpcodeSpec> {
    use OpcodeKind::*;

    macro_rules! op {
        ($kind:ident, $handler:ident) => {
            OpcodeSpec {
                kind: $kind,
                metadata: $kind.metadata(),
                handler: $handler,
            }
        };
    }

    vec![
        op!(Halt, handle_halt),
        op!(SetVar, handle_set_var),
        op!(Calculate, handle_calculate),
        op!(DefineFunction, handle_define_function),
        op!(DefineTry, handle_define_try),
        op!(Return, handle_return),
        op!(Branch, handle_branch),
        op!(Throw, handle_throw),
        op!(Output, handle_output),
        op!(Input, handle_input),
        op!(Call, handle_call),
        op!(Nop, handle_noop),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_opcode_has_exactly_one_spec() {
        let specs = opcode_specs();
        assert_eq!(specs.len(), OPCODE_COUNT);
        for kind in OpcodeKind::ALL {
            assert_eq!(specs.iter().filter(|s| s.kind == kind).count(), 1);
        }
    }

    #[test]
    fn handler_table_is_complete() {
        for kind in OpcodeKind::ALL {
            let _ = handler_for(kind);
        }
    }
}
