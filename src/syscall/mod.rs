//! System Call Interface
//!
//! Provides the system call interface for user-mode programs.
//!
//! # Security Model
//! - Whitelist approach: only explicitly implemented syscalls are allowed
//! - All user addresses are validated before use
//! - Bad addresses kill the caller; other failures return -1 (or false)
//! - Invalid inputs never panic the kernel
//!
//! # Current Syscalls
//! - 1: exit(status)
//! - 4: create(name, initial_size) -> bool
//! - 6: open(name) -> fd
//! - 7: filesize(fd) -> length
//! - 8: read(fd, buf, size) -> count
//! - 9: write(fd, buf, size) -> count
//! - 10: seek(fd, position)
//! - 11: tell(fd) -> position
//! - 12: close(fd)

mod args;
mod dispatch;
mod handler;
mod number;
mod validate;


pub use args::{ArgKind, Args, MAX_ARGS, SLOT_SIZE};
pub use dispatch::{Disposition, Syscalls};
pub use handler::{SyscallError, SyscallResult};
pub use number::{numbers, Syscall};
pub use validate::{
    check_user_range, read_user_str, read_user_u32, validate_user_read, validate_user_write,
    UserBuffer, UserBufferMut,
};
