//! PantherOS userprog - the user/kernel boundary
//!
//! Everything a user process can ask of the kernel passes through this
//! crate. A trap delivers the caller's stack pointer; the dispatcher
//! decodes the call number and arguments from that stack, proves every
//! user address it is about to touch, runs exactly one handler and
//! writes the result back into the trap frame.
//!
//! # Security Model
//! - No user pointer is dereferenced before it is validated
//! - A bad pointer kills the offending process, never the kernel
//! - All filesystem access is serialized by one scoped lock that also
//!   guards every process's descriptor table
//! - Process teardown always closes every descriptor the process held
//!
//! # Collaborators
//! The scheduler, paging, program loading, trap entry and the on-disk
//! filesystem live elsewhere in the kernel. They are reached through the
//! traits in [`mm`], [`fs`], [`console`] and [`process`].

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_op_in_unsafe_fn)]

extern crate alloc;

pub mod config;
pub mod console;
pub mod fs;
pub mod logger;
pub mod mm;
pub mod process;
pub mod syscall;
pub mod trap;

#[cfg(test)]
mod testing;

pub use config::Config;
pub use syscall::{Disposition, Syscalls};
