//! User Memory Validation
//!
//! Proves that user-supplied addresses are safe to touch before the kernel
//! touches them.
//!
//! # Security Principles
//! - Validate ALL user addresses before use
//! - Fail-secure: an unmapped or kernel address is a fault, and a fault
//!   kills the caller (see [`SyscallError::is_fatal`])
//! - Every page of a range is checked, so a buffer that starts in valid
//!   memory and runs off the end is caught
//! - Data is copied through kernel buffers; the filesystem never sees a
//!   user pointer

use alloc::string::String;
use alloc::vec::Vec;

use super::handler::SyscallError;
use crate::mm::{Access, AddressSpace, VirtAddr, PAGE_SIZE};

/// Check that `[addr, addr + len)` is user memory mapped for `access`.
///
/// # Security Checks
/// 1. Pointer is not null
/// 2. Pointer + length doesn't overflow
/// 3. First and last byte are below `PHYS_BASE`
/// 4. Every page in between is present, user-accessible and, for
///    writes, writable
pub fn check_user_range<S: AddressSpace + ?Sized>(
    space: &S,
    addr: VirtAddr,
    len: usize,
    access: Access,
) -> Result<(), SyscallError> {
    // Zero-length ranges are never dereferenced
    if len == 0 {
        return Ok(());
    }

    if addr.is_null() {
        log::warn!("null user pointer ({:?})", access);
        return Err(SyscallError::Efault);
    }

    let last = addr.checked_add(len - 1).ok_or(SyscallError::Efault)?;
    if !last.is_user() {
        log::warn!("user range {}..={} reaches kernel memory", addr, last);
        return Err(SyscallError::Efault);
    }

    let required = access.required();
    let mut page = addr.page_down();
    loop {
        match space.page_flags(page) {
            Some(flags) if flags.contains(required) => {}
            flags => {
                log::warn!(
                    "user page {} not accessible for {:?} (flags {:?})",
                    page,
                    access,
                    flags
                );
                return Err(SyscallError::Efault);
            }
        }
        if page == last.page_down() {
            return Ok(());
        }
        page = VirtAddr::new(page.as_usize() + PAGE_SIZE);
    }
}

/// A validated user-space buffer the kernel may read.
///
/// Only constructed by [`validate_user_read`].
#[derive(Debug)]
pub struct UserBuffer<'a, S: AddressSpace + ?Sized> {
    space: &'a S,
    addr: VirtAddr,
    len: usize,
}

impl<S: AddressSpace + ?Sized> UserBuffer<'_, S> {
    /// Buffer length in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the buffer is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Copy bytes starting at `offset` into `dst`.
    ///
    /// Returns the number of bytes copied, which is short once the end of
    /// the buffer is reached.
    pub fn copy_to(&self, offset: usize, dst: &mut [u8]) -> usize {
        let count = dst.len().min(self.len.saturating_sub(offset));
        if count == 0 {
            return 0;
        }
        // SAFETY: offset + count <= len and the whole range was validated
        // for reading when this buffer was built.
        unsafe {
            self.space
                .read_unchecked(VirtAddr::new(self.addr.as_usize() + offset), &mut dst[..count]);
        }
        count
    }
}

/// Validate a user-space buffer the kernel will read from.
pub fn validate_user_read<S: AddressSpace + ?Sized>(
    space: &S,
    ptr: VirtAddr,
    len: usize,
) -> Result<UserBuffer<'_, S>, SyscallError> {
    check_user_range(space, ptr, len, Access::Read)?;
    Ok(UserBuffer {
        space,
        addr: ptr,
        len,
    })
}

/// A validated user-space buffer the kernel may write.
///
/// Only constructed by [`validate_user_write`].
#[derive(Debug)]
pub struct UserBufferMut<'a, S: AddressSpace + ?Sized> {
    space: &'a S,
    addr: VirtAddr,
    len: usize,
}

impl<S: AddressSpace + ?Sized> UserBufferMut<'_, S> {
    /// Buffer length in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the buffer is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Copy `src` into the buffer at `offset`.
    ///
    /// Returns the number of bytes copied; anything past the end of the
    /// buffer is dropped.
    pub fn copy_from(&self, offset: usize, src: &[u8]) -> usize {
        let count = src.len().min(self.len.saturating_sub(offset));
        if count == 0 {
            return 0;
        }
        // SAFETY: offset + count <= len and the whole range was validated
        // for writing when this buffer was built.
        unsafe {
            self.space
                .write_unchecked(VirtAddr::new(self.addr.as_usize() + offset), &src[..count]);
        }
        count
    }
}

/// Validate a user-space buffer the kernel will write into.
pub fn validate_user_write<S: AddressSpace + ?Sized>(
    space: &S,
    ptr: VirtAddr,
    len: usize,
) -> Result<UserBufferMut<'_, S>, SyscallError> {
    check_user_range(space, ptr, len, Access::Write)?;
    Ok(UserBufferMut {
        space,
        addr: ptr,
        len,
    })
}

/// Read one little-endian 32-bit word from user memory.
pub fn read_user_u32<S: AddressSpace + ?Sized>(
    space: &S,
    addr: VirtAddr,
) -> Result<u32, SyscallError> {
    let mut bytes = [0u8; 4];
    validate_user_read(space, addr, bytes.len())?.copy_to(0, &mut bytes);
    Ok(u32::from_le_bytes(bytes))
}

/// Copy a NUL-terminated string out of user memory.
///
/// Each page is validated as the scan reaches it, so a string running
/// into an unmapped page faults. A string with no NUL within `max_len`
/// bytes is `Enametoolong`; one that is not UTF-8 is `Einval`. Neither
/// of those is fatal.
pub fn read_user_str<S: AddressSpace + ?Sized>(
    space: &S,
    addr: VirtAddr,
    max_len: usize,
) -> Result<String, SyscallError> {
    let mut bytes = Vec::new();
    let mut cursor = addr;
    loop {
        if cursor == addr || cursor.is_aligned() {
            check_user_range(space, cursor, 1, Access::Read)?;
        }
        let mut byte = [0u8; 1];
        // SAFETY: the page holding `cursor` was validated above, either on
        // this iteration or when the scan entered the page.
        unsafe { space.read_unchecked(cursor, &mut byte) };
        if byte[0] == 0 {
            break;
        }
        if bytes.len() == max_len {
            return Err(SyscallError::Enametoolong);
        }
        bytes.push(byte[0]);
        cursor = cursor.checked_add(1).ok_or(SyscallError::Efault)?;
    }
    String::from_utf8(bytes).map_err(|_| SyscallError::Einval)
}
