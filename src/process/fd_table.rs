//! Per-process File Descriptor Table
//!
//! Maps small integer descriptors to open file handles.
//!
//! # Design
//! - Descriptors 0, 1 and 2 are reserved for the console and never stored
//! - Allocation is monotonic: the n-th open of a process gets `3 + n`
//! - A descriptor is never handed out twice while the process runs
//! - Only open descriptors occupy memory; a closed id leaves nothing behind

use alloc::collections::BTreeMap;
use core::fmt;

use super::Pid;

/// A file descriptor as seen by user code.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[repr(transparent)]
pub struct Fd(i32);

impl Fd {
    /// Console input.
    pub const STDIN: Self = Self(0);
    /// Console output.
    pub const STDOUT: Self = Self(1);
    /// Console error.
    pub const STDERR: Self = Self(2);
    /// First descriptor handed out by `open`.
    pub const FIRST: Self = Self(3);

    /// Wrap a raw descriptor taken from a syscall argument.
    #[inline]
    pub const fn new(raw: i32) -> Self {
        Self(raw)
    }

    /// The raw descriptor value.
    #[inline]
    pub const fn raw(self) -> i32 {
        self.0
    }
}

impl fmt::Display for Fd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Descriptor table of one process.
#[derive(Debug)]
pub struct FdTable<H> {
    owner: Pid,
    files: BTreeMap<Fd, H>,
    next: i32,
}

impl<H> FdTable<H> {
    /// Create an empty table for `owner`.
    pub fn new(owner: Pid) -> Self {
        Self {
            owner,
            files: BTreeMap::new(),
            next: Fd::FIRST.0,
        }
    }

    /// The process this table belongs to.
    #[inline]
    pub fn owner(&self) -> Pid {
        self.owner
    }

    /// Number of open descriptors.
    #[inline]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether no descriptor is open.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// The descriptor the next `insert` will return.
    #[inline]
    pub fn next_fd(&self) -> Fd {
        Fd(self.next)
    }

    /// Insert an open file and allocate its descriptor.
    ///
    /// Hands the file back if the process has used up every id.
    pub fn insert(&mut self, file: H) -> Result<Fd, H> {
        if self.next == i32::MAX {
            return Err(file);
        }
        let fd = Fd(self.next);
        self.files.insert(fd, file);
        self.next += 1;
        Ok(fd)
    }

    /// Look up a descriptor.
    #[inline]
    pub fn get(&self, fd: Fd) -> Option<&H> {
        self.files.get(&fd)
    }

    /// Look up a descriptor for mutation.
    #[inline]
    pub fn get_mut(&mut self, fd: Fd) -> Option<&mut H> {
        self.files.get_mut(&fd)
    }

    /// Whether `fd` is open.
    #[inline]
    pub fn contains(&self, fd: Fd) -> bool {
        self.files.contains_key(&fd)
    }

    /// Remove a descriptor, returning its file.
    pub fn remove(&mut self, fd: Fd) -> Option<H> {
        self.files.remove(&fd)
    }

    /// Remove every open descriptor, lowest first.
    ///
    /// Ids stay retired: the next `insert` continues after the last one.
    pub fn drain(&mut self) -> impl Iterator<Item = (Fd, H)> {
        core::mem::take(&mut self.files).into_iter()
    }
}
