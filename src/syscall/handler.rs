//! System Call Handlers
//!
//! One method per call. Handlers never call each other and never touch
//! the trap frame; they return a value or an error and
//! [`Syscalls::dispatch`] decides what the user sees.
//!
//! # Security Considerations
//! - User buffers are validated before any descriptor or filesystem work,
//!   so a bad pointer kills the process before the filesystem is touched
//! - The filesystem lock is held through a scoped guard, released on
//!   every return path including `?`
//! - Descriptor lookups only ever see the caller's own table

use alloc::vec;
use core::fmt;

use super::dispatch::Syscalls;
use super::validate;
use crate::console::Console;
use crate::fs::FileSystem;
use crate::mm::VirtAddr;
use crate::process::{Fd, Scheduler, UserProcess};

/// System call error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyscallError {
    /// Invalid system call number
    Enosys,
    /// Bad file descriptor
    Ebadf,
    /// Bad address (invalid pointer)
    Efault,
    /// Invalid argument
    Einval,
    /// No such file
    Enoent,
    /// File name too long
    Enametoolong,
    /// Too many open files
    Emfile,
}

impl SyscallError {
    /// Whether this error kills the calling process.
    ///
    /// A bad pointer or an unknown call number means the program cannot
    /// be trusted to continue. Everything else is reported back.
    pub const fn is_fatal(self) -> bool {
        matches!(self, Self::Efault | Self::Enosys)
    }
}

impl fmt::Display for SyscallError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Enosys => write!(f, "unknown system call"),
            Self::Ebadf => write!(f, "bad file descriptor"),
            Self::Efault => write!(f, "bad user address"),
            Self::Einval => write!(f, "invalid argument"),
            Self::Enoent => write!(f, "no such file"),
            Self::Enametoolong => write!(f, "file name too long"),
            Self::Emfile => write!(f, "too many open files"),
        }
    }
}

/// Result of a handler: the value for `eax`, or why there is none.
pub type SyscallResult = Result<u32, SyscallError>;

impl<F, C, S> Syscalls<F, C, S>
where
    F: FileSystem,
    C: Console,
    S: Scheduler,
{
    /// create(name, initial_size) -> bool
    pub(super) fn sys_create<P: UserProcess>(
        &self,
        process: &P,
        name: VirtAddr,
        initial_size: u32,
    ) -> SyscallResult {
        let name =
            validate::read_user_str(process.address_space(), name, self.config.max_name_len)?;
        let created = self.fs.lock().fs.create(&name, initial_size, false);
        log::debug!(
            "pid {}: create({:?}, {}) -> {}",
            process.pid(),
            name,
            initial_size,
            created
        );
        Ok(u32::from(created))
    }

    /// open(name) -> fd
    pub(super) fn sys_open<P: UserProcess>(&self, process: &P, name: VirtAddr) -> SyscallResult {
        let name =
            validate::read_user_str(process.address_space(), name, self.config.max_name_len)?;
        let pid = process.pid();

        let mut state = self.fs.lock();
        let file = state.fs.open(&name).ok_or(SyscallError::Enoent)?;
        let (fs, table) = state.split(pid);
        match table.insert(file) {
            Ok(fd) => {
                log::debug!("pid {}: open({:?}) -> fd {}", pid, name, fd);
                Ok(fd.raw() as u32)
            }
            Err(file) => {
                fs.close(file);
                Err(SyscallError::Emfile)
            }
        }
    }

    /// read(fd, buffer, size) -> bytes read
    pub(super) fn sys_read<P: UserProcess>(
        &self,
        process: &P,
        fd: i32,
        buffer: VirtAddr,
        size: i32,
    ) -> SyscallResult {
        let len = usize::try_from(size).map_err(|_| SyscallError::Einval)?;
        let user = validate::validate_user_write(process.address_space(), buffer, len)?;

        let mut state = self.fs.lock();
        let (fs, file) = state
            .lookup(process.pid(), Fd::new(fd))
            .ok_or(SyscallError::Ebadf)?;

        let mut chunk = vec![0u8; self.config.chunk().min(len)];
        let mut total = 0;
        while total < len {
            let want = (len - total).min(chunk.len());
            let got = fs.read(file, &mut chunk[..want]).min(want);
            user.copy_from(total, &chunk[..got]);
            total += got;
            if got < want {
                break;
            }
        }
        log::trace!("pid {}: read(fd {}, {}) -> {}", process.pid(), fd, len, total);
        Ok(total as u32)
    }

    /// write(fd, buffer, size) -> bytes written
    pub(super) fn sys_write<P: UserProcess>(
        &self,
        process: &P,
        fd: i32,
        buffer: VirtAddr,
        size: u32,
    ) -> SyscallResult {
        let len = size as usize;
        let user = validate::validate_user_read(process.address_space(), buffer, len)?;
        let mut chunk = vec![0u8; self.config.chunk().min(len)];
        let fd = Fd::new(fd);

        if fd == Fd::STDOUT {
            let mut done = 0;
            while done < len {
                let n = user.copy_to(done, &mut chunk);
                self.console.write_bytes(&chunk[..n]);
                done += n;
            }
            return Ok(size);
        }

        let mut state = self.fs.lock();
        let (fs, file) = state
            .lookup(process.pid(), fd)
            .ok_or(SyscallError::Ebadf)?;

        let mut total = 0;
        while total < len {
            let n = user.copy_to(total, &mut chunk);
            let written = fs.write(file, &chunk[..n]).min(n);
            total += written;
            if written < n {
                break;
            }
        }
        log::trace!("pid {}: write(fd {}, {}) -> {}", process.pid(), fd, len, total);
        Ok(total as u32)
    }

    /// filesize(fd) -> length
    pub(super) fn sys_filesize<P: UserProcess>(&self, process: &P, fd: i32) -> SyscallResult {
        let mut state = self.fs.lock();
        let (fs, file) = state
            .lookup(process.pid(), Fd::new(fd))
            .ok_or(SyscallError::Ebadf)?;
        Ok(fs.length(file))
    }

    /// seek(fd, position)
    pub(super) fn sys_seek<P: UserProcess>(
        &self,
        process: &P,
        fd: i32,
        position: u32,
    ) -> SyscallResult {
        let mut state = self.fs.lock();
        let (fs, file) = state
            .lookup(process.pid(), Fd::new(fd))
            .ok_or(SyscallError::Ebadf)?;
        fs.seek(file, position);
        Ok(0)
    }

    /// tell(fd) -> position
    pub(super) fn sys_tell<P: UserProcess>(&self, process: &P, fd: i32) -> SyscallResult {
        let mut state = self.fs.lock();
        let (fs, file) = state
            .lookup(process.pid(), Fd::new(fd))
            .ok_or(SyscallError::Ebadf)?;
        Ok(fs.tell(file))
    }

    /// close(fd)
    pub(super) fn sys_close<P: UserProcess>(&self, process: &P, fd: i32) -> SyscallResult {
        if !self.fs.lock().close(process.pid(), Fd::new(fd)) {
            return Err(SyscallError::Ebadf);
        }
        log::debug!("pid {}: close(fd {})", process.pid(), fd);
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classes() {
        assert!(SyscallError::Efault.is_fatal());
        assert!(SyscallError::Enosys.is_fatal());
        for err in [
            SyscallError::Ebadf,
            SyscallError::Einval,
            SyscallError::Enoent,
            SyscallError::Enametoolong,
            SyscallError::Emfile,
        ] {
            assert!(!err.is_fatal(), "{} must not kill the caller", err);
        }
    }
}
