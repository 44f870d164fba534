use crate::memory::Addr;

/// Faults that end execution of the loaded program.
///
/// None of these are retried. `step` returns the fault to the host, which
/// decides whether to reset and reload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Fault {
    #[error("program image is {size} bytes, only {max} fit above 0x200")]
    ProgramTooLarge { size: usize, max: usize },

    #[error("return with an empty call stack (instruction at {at:#05X})")]
    StackUnderflow { at: Addr },

    #[error("call depth exceeded {max} frames (instruction at {at:#05X})")]
    StackOverflow { max: usize, at: Addr },

    #[error("unknown opcode {opcode:#06X} at {at:#05X}")]
    UnknownOpcode { opcode: u16, at: Addr },

    #[error("memory access out of bounds: address {address:#06X} (instruction at {at:#05X})")]
    MemoryOutOfBounds { address: Addr, at: Addr },
}
