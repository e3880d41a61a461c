//! User Trap Handling
//!
//! Entry point for traps raised by user code once the architecture glue
//! has saved the interrupted registers.
//!
//! # Trap Kinds
//! - Syscall: `int $0x30`, served by [`Syscalls::dispatch`]
//! - PageFault: a user access to an unmapped or protected page
//! - Other: any other exception taken from user mode
//!
//! # Security Considerations
//! - A fault from user mode kills the process, never the kernel
//! - The trap frame is only written on the resume path

use crate::console::Console;
use crate::fs::FileSystem;
use crate::mm::VirtAddr;
use crate::process::{Scheduler, UserProcess, EXIT_FAILURE};
use crate::syscall::{Disposition, Syscalls};

/// User registers the syscall layer reads or writes.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrapFrame {
    /// Instruction pointer to resume at.
    pub eip: u32,
    /// User stack pointer: points at the call number.
    pub esp: u32,
    /// Return value register.
    pub eax: u32,
}

impl TrapFrame {
    /// Frame for a trap taken with the user stack at `esp`.
    pub const fn new(eip: u32, esp: u32) -> Self {
        Self { eip, esp, eax: 0 }
    }
}

/// Why user code entered the kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrapKind {
    /// System call.
    Syscall,
    /// Page fault at `addr`.
    PageFault {
        /// Faulting address.
        addr: VirtAddr,
        /// The access was a write.
        write: bool,
    },
    /// Any other exception, by vector.
    Other(u8),
}

/// Handle a trap taken from user mode.
pub fn handle_user_trap<F, C, S, P>(
    syscalls: &Syscalls<F, C, S>,
    process: &P,
    frame: &mut TrapFrame,
    kind: TrapKind,
) -> Disposition
where
    F: FileSystem,
    C: Console,
    S: Scheduler,
    P: UserProcess,
{
    match kind {
        TrapKind::Syscall => syscalls.dispatch(process, frame),
        TrapKind::PageFault { addr, write } => {
            log::warn!(
                "pid {}: page fault at {} ({}) eip {:#010x}",
                process.pid(),
                addr,
                if write { "write" } else { "read" },
                frame.eip
            );
            syscalls.terminate(process, EXIT_FAILURE)
        }
        TrapKind::Other(vector) => {
            log::warn!(
                "pid {}: unhandled exception {:#04x} at eip {:#010x}",
                process.pid(),
                vector,
                frame.eip
            );
            syscalls.terminate(process, EXIT_FAILURE)
        }
    }
}
