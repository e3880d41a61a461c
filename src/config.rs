//! Runtime configuration for the syscall layer
//!
//! Compile-time constants stay next to the code they govern
//! ([`crate::mm::PAGE_SIZE`], [`crate::process::Fd::FIRST`],
//! [`crate::process::EXIT_FAILURE`]). The knobs here are the ones a kernel
//! may reasonably want to tune at boot.

use log::LevelFilter;

use crate::mm::PAGE_SIZE;

/// Boot-time settings handed to [`crate::Syscalls::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Longest file name (excluding the NUL) scanned out of user memory.
    pub max_name_len: usize,
    /// Size of the kernel bounce buffer used for read/write/console I/O.
    pub io_chunk: usize,
    /// Maximum level installed by [`crate::logger::init`].
    pub log_level: LevelFilter,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_name_len: PAGE_SIZE,
            io_chunk: 512,
            log_level: LevelFilter::Info,
        }
    }
}

impl Config {
    /// Bounce buffer size, never zero.
    #[inline]
    pub(crate) fn chunk(&self) -> usize {
        self.io_chunk.max(1)
    }
}
