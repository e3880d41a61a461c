//! Syscall Argument Decoding
//!
//! Arguments sit in 4-byte slots above the call number on the user
//! stack:
//!
//! ```text
//! esp + 12 │ arg 2 │
//! esp +  8 │ arg 1 │
//! esp +  4 │ arg 0 │
//! esp      │  nr   │
//! ```
//!
//! Every slot is validated before its bytes are read.

use super::handler::SyscallError;
use super::validate;
use crate::mm::{AddressSpace, VirtAddr};

/// Size of one argument slot.
pub const SLOT_SIZE: usize = 4;

/// Most arguments any call takes.
pub const MAX_ARGS: usize = 3;

/// How a slot is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    /// Signed integer (descriptors, statuses, signed sizes).
    Int,
    /// Unsigned integer (sizes, positions).
    Uint,
    /// User pointer.
    Ptr,
}

/// Decoded arguments of one call.
#[derive(Debug, Clone, Copy)]
pub struct Args {
    kinds: &'static [ArgKind],
    raw: [u32; MAX_ARGS],
}

impl Args {
    /// Read `layout.len()` slots above `esp`.
    pub fn decode<S: AddressSpace + ?Sized>(
        space: &S,
        esp: VirtAddr,
        layout: &'static [ArgKind],
    ) -> Result<Self, SyscallError> {
        debug_assert!(layout.len() <= MAX_ARGS);
        let mut raw = [0u32; MAX_ARGS];
        for (i, slot) in raw.iter_mut().enumerate().take(layout.len()) {
            let addr = esp
                .checked_add(SLOT_SIZE * (i + 1))
                .ok_or(SyscallError::Efault)?;
            *slot = validate::read_user_u32(space, addr)?;
        }
        Ok(Self { kinds: layout, raw })
    }

    /// Number of decoded arguments.
    #[inline]
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    /// Whether the call takes no arguments.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    /// Argument `i` as a signed integer.
    #[inline]
    pub fn int(&self, i: usize) -> i32 {
        debug_assert_eq!(self.kinds[i], ArgKind::Int);
        self.raw[i] as i32
    }

    /// Argument `i` as an unsigned integer.
    #[inline]
    pub fn uint(&self, i: usize) -> u32 {
        debug_assert_eq!(self.kinds[i], ArgKind::Uint);
        self.raw[i]
    }

    /// Argument `i` as a user pointer.
    #[inline]
    pub fn ptr(&self, i: usize) -> VirtAddr {
        debug_assert_eq!(self.kinds[i], ArgKind::Ptr);
        VirtAddr::from_u32(self.raw[i])
    }
}
