//! User address spaces as seen from the syscall layer
//!
//! Paging and page-fault handling live in the VM subsystem. This module
//! only describes what the syscall layer needs from it: which user pages
//! are mapped with which permissions, and a raw copy primitive that is
//! used after [`crate::syscall`] validation has proven a range.
//!
//! # Security Principles
//! - Permission queries are side-effect free
//! - Raw copies are `unsafe` and never reachable with an unchecked range

mod address;

use bitflags::bitflags;

pub use address::{VirtAddr, PAGE_MASK, PAGE_SIZE, PHYS_BASE};

bitflags! {
    /// Permissions of a mapped user page.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PageFlags: u32 {
        /// Page is mapped.
        const PRESENT = 1 << 0;
        /// Page may be written.
        const WRITABLE = 1 << 1;
        /// Page is accessible from user mode.
        const USER = 1 << 2;

        /// Ordinary read-only user page (code, rodata).
        const USER_RO = Self::PRESENT.bits() | Self::USER.bits();
        /// Ordinary read/write user page (data, heap, stack).
        const USER_RW = Self::USER_RO.bits() | Self::WRITABLE.bits();
    }
}

/// How the kernel intends to touch user memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Kernel reads from user memory (copy-in).
    Read,
    /// Kernel writes into user memory (copy-out).
    Write,
}

impl Access {
    /// Page flags a page must carry for this access.
    #[inline]
    pub const fn required(self) -> PageFlags {
        match self {
            Access::Read => PageFlags::USER_RO,
            Access::Write => PageFlags::USER_RW,
        }
    }
}

/// A process's user address space.
///
/// # Safety contract
/// `read_unchecked`/`write_unchecked` may assume every page of the range
/// was reported present by `page_flags` with the matching permission and
/// that the range lies below [`PHYS_BASE`].
pub trait AddressSpace: Sync {
    /// Flags of the page starting at `page`, or `None` if it is unmapped.
    ///
    /// `page` is always page-aligned.
    fn page_flags(&self, page: VirtAddr) -> Option<PageFlags>;

    /// Copy `dst.len()` bytes from user address `src`.
    ///
    /// # Safety
    /// The range must have been validated for [`Access::Read`].
    unsafe fn read_unchecked(&self, src: VirtAddr, dst: &mut [u8]);

    /// Copy `src` to user address `dst`.
    ///
    /// # Safety
    /// The range must have been validated for [`Access::Write`].
    unsafe fn write_unchecked(&self, dst: VirtAddr, src: &[u8]);
}
