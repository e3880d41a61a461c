//! Filesystem interface and its serialization lock
//!
//! The on-disk filesystem (inodes, directories, buffer cache) is not safe
//! for concurrent use. Every call into it goes through [`FsLock`], which
//! also owns each process's descriptor table so that descriptor
//! bookkeeping and the filesystem are always updated together.

mod lock;

pub use lock::{FsGuard, FsLock, FsState};

/// The filesystem as consumed by the syscall layer.
///
/// Only ever called with the [`FsLock`] held, so methods take `&mut self`.
pub trait FileSystem: Send {
    /// An open file: owns a position and a reference to the inode.
    type File: Send;

    /// Create a file (or directory) of `initial_size` bytes.
    ///
    /// Returns `false` if `name` already exists or cannot be created.
    fn create(&mut self, name: &str, initial_size: u32, is_dir: bool) -> bool;

    /// Open `name`, or `None` if it does not exist.
    fn open(&mut self, name: &str) -> Option<Self::File>;

    /// Read into `buf` from the file position; returns bytes read.
    fn read(&mut self, file: &mut Self::File, buf: &mut [u8]) -> usize;

    /// Write `buf` at the file position; returns bytes written.
    fn write(&mut self, file: &mut Self::File, buf: &[u8]) -> usize;

    /// File length in bytes.
    fn length(&mut self, file: &Self::File) -> u32;

    /// Move the file position.
    fn seek(&mut self, file: &mut Self::File, pos: u32);

    /// Current file position.
    fn tell(&mut self, file: &Self::File) -> u32;

    /// Close the file, releasing the handle.
    fn close(&mut self, file: Self::File);
}
