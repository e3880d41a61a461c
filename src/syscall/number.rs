//! System call numbers and their argument layouts

use super::args::ArgKind;
use super::handler::SyscallError;

/// System call numbers
pub mod numbers {
    pub const SYS_EXIT: u32 = 1;
    pub const SYS_CREATE: u32 = 4;
    pub const SYS_OPEN: u32 = 6;
    pub const SYS_FILESIZE: u32 = 7;
    pub const SYS_READ: u32 = 8;
    pub const SYS_WRITE: u32 = 9;
    pub const SYS_SEEK: u32 = 10;
    pub const SYS_TELL: u32 = 11;
    pub const SYS_CLOSE: u32 = 12;
}

/// A supported system call.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Syscall {
    /// Terminate the calling process.
    Exit = numbers::SYS_EXIT,
    /// Create a file.
    Create = numbers::SYS_CREATE,
    /// Open a file and return a descriptor.
    Open = numbers::SYS_OPEN,
    /// Size of an open file.
    Filesize = numbers::SYS_FILESIZE,
    /// Read from a descriptor.
    Read = numbers::SYS_READ,
    /// Write to a descriptor.
    Write = numbers::SYS_WRITE,
    /// Move the position of an open file.
    Seek = numbers::SYS_SEEK,
    /// Position of an open file.
    Tell = numbers::SYS_TELL,
    /// Close a descriptor.
    Close = numbers::SYS_CLOSE,
}

impl TryFrom<u32> for Syscall {
    type Error = SyscallError;

    fn try_from(nr: u32) -> Result<Self, Self::Error> {
        use numbers::*;
        match nr {
            SYS_EXIT => Ok(Self::Exit),
            SYS_CREATE => Ok(Self::Create),
            SYS_OPEN => Ok(Self::Open),
            SYS_FILESIZE => Ok(Self::Filesize),
            SYS_READ => Ok(Self::Read),
            SYS_WRITE => Ok(Self::Write),
            SYS_SEEK => Ok(Self::Seek),
            SYS_TELL => Ok(Self::Tell),
            SYS_CLOSE => Ok(Self::Close),
            _ => Err(SyscallError::Enosys),
        }
    }
}

impl Syscall {
    /// Argument layout on the user stack, in order.
    pub const fn args(self) -> &'static [ArgKind] {
        use ArgKind::*;
        match self {
            Self::Exit => &[Int],
            Self::Create => &[Ptr, Uint],
            Self::Open => &[Ptr],
            Self::Filesize | Self::Tell | Self::Close => &[Int],
            Self::Read => &[Int, Ptr, Int],
            Self::Write => &[Int, Ptr, Uint],
            Self::Seek => &[Int, Uint],
        }
    }

    /// Whether the call stores a result in the trap frame.
    pub const fn returns_value(self) -> bool {
        !matches!(self, Self::Exit | Self::Seek | Self::Close)
    }

    /// Value stored in the trap frame when the call fails in an ordinary
    /// way: `false` for create, -1 for everything else.
    pub const fn failure_value(self) -> u32 {
        match self {
            Self::Create => 0,
            _ => -1i32 as u32,
        }
    }
}
