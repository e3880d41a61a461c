//! Processes as seen from the syscall layer
//!
//! The scheduler and process lifecycle belong to the thread subsystem.
//! Here we only need to know who is calling, where their memory is, and
//! how to tell the scheduler that a process is finished.

mod exit;
mod fd_table;

use core::fmt;

use crate::mm::AddressSpace;

pub use exit::{ExitBoard, ExitRecord};
pub use fd_table::{Fd, FdTable};

/// Status reported for a process killed by the kernel.
pub const EXIT_FAILURE: i32 = -1;

/// Process identifier.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[repr(transparent)]
pub struct Pid(pub u32);

impl fmt::Display for Pid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The process on whose behalf a syscall runs.
///
/// Several threads of one process may be inside the kernel at once, so
/// implementations are shared by reference.
pub trait UserProcess: Sync {
    /// User address space type.
    type Space: AddressSpace;

    /// Identity of the process.
    fn pid(&self) -> Pid;

    /// Name printed in the exit status line.
    fn name(&self) -> &str;

    /// The process's user memory.
    fn address_space(&self) -> &Self::Space;
}

/// The part of the scheduler the syscall layer drives.
pub trait Scheduler: Sync {
    /// Stop scheduling `pid` and free its thread resources.
    ///
    /// Called after the syscall layer has released everything it owns for
    /// the process. The trap glue must not resume the process afterwards.
    fn terminate(&self, pid: Pid, status: i32);
}
