//! Filesystem Serialization Lock
//!
//! One instance per kernel, created at boot by [`crate::Syscalls::new`].
//! The lock is scoped: [`FsLock::lock`] hands out a guard and the lock is
//! released when the guard drops, on every return path. It is not
//! reentrant; holding a guard while calling `lock` again spins forever.

use alloc::collections::BTreeMap;
use core::sync::atomic::{AtomicU64, Ordering};

use spin::{Mutex, MutexGuard};

use super::FileSystem;
use crate::process::{Fd, FdTable, Pid};

/// State reachable only with the lock held.
pub struct FsState<F: FileSystem> {
    /// The shared filesystem.
    pub fs: F,
    /// Descriptor tables of live processes, keyed by owner.
    tables: BTreeMap<Pid, FdTable<F::File>>,
}

impl<F: FileSystem> FsState<F> {
    /// Split into the filesystem and `owner`'s descriptor table.
    ///
    /// The table is created on first use.
    pub fn split(&mut self, owner: Pid) -> (&mut F, &mut FdTable<F::File>) {
        let table = self
            .tables
            .entry(owner)
            .or_insert_with(|| FdTable::new(owner));
        (&mut self.fs, table)
    }

    /// `owner`'s table, if it has one.
    pub fn table(&self, owner: Pid) -> Option<&FdTable<F::File>> {
        self.tables.get(&owner)
    }

    /// The filesystem together with `owner`'s open file `fd`.
    pub fn lookup(&mut self, owner: Pid, fd: Fd) -> Option<(&mut F, &mut F::File)> {
        let file = self.tables.get_mut(&owner)?.get_mut(fd)?;
        Some((&mut self.fs, file))
    }

    /// Close `owner`'s `fd`. Returns `false` if it was not open.
    pub fn close(&mut self, owner: Pid, fd: Fd) -> bool {
        let Some(file) = self.tables.get_mut(&owner).and_then(|t| t.remove(fd)) else {
            return false;
        };
        self.fs.close(file);
        true
    }

    /// Close every file `owner` still has open and drop its table.
    ///
    /// Returns the number of files closed.
    pub fn release(&mut self, owner: Pid) -> usize {
        let Some(mut table) = self.tables.remove(&owner) else {
            return 0;
        };
        let mut closed = 0;
        for (fd, file) in table.drain() {
            log::debug!("pid {}: closing fd {} on teardown", owner, fd);
            self.fs.close(file);
            closed += 1;
        }
        closed
    }
}

/// Guard returned by [`FsLock::lock`].
pub type FsGuard<'a, F> = MutexGuard<'a, FsState<F>>;

/// The kernel-wide filesystem lock.
pub struct FsLock<F: FileSystem> {
    state: Mutex<FsState<F>>,
    acquisitions: AtomicU64,
}

impl<F: FileSystem> FsLock<F> {
    /// Take ownership of the filesystem.
    pub fn new(fs: F) -> Self {
        Self {
            state: Mutex::new(FsState {
                fs,
                tables: BTreeMap::new(),
            }),
            acquisitions: AtomicU64::new(0),
        }
    }

    /// Acquire the lock. Released when the guard drops.
    pub fn lock(&self) -> FsGuard<'_, F> {
        let guard = self.state.lock();
        self.acquisitions.fetch_add(1, Ordering::Relaxed);
        guard
    }

    /// Whether some thread currently holds the lock.
    pub fn is_locked(&self) -> bool {
        self.state.is_locked()
    }

    /// Number of times the lock has been acquired since boot.
    pub fn acquisitions(&self) -> u64 {
        self.acquisitions.load(Ordering::Relaxed)
    }
}
