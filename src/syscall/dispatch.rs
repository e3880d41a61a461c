//! System Call Dispatch
//!
//! Each trap runs `Decode -> Execute -> WriteResult`:
//! - Decode reads the call number and arguments off the user stack,
//!   validating every slot. A bad slot or unknown number kills the caller.
//! - Execute runs exactly one handler.
//! - WriteResult stores the handler's value (or the call's failure value)
//!   in `eax`. `exit` and fatal errors never get here.

use alloc::string::String;

use super::args::Args;
use super::handler::{SyscallError, SyscallResult};
use super::number::Syscall;
use super::validate;
use crate::config::Config;
use crate::console::Console;
use crate::fs::{FileSystem, FsLock};
use crate::kprintln;
use crate::mm::VirtAddr;
use crate::process::{ExitBoard, ExitRecord, Scheduler, UserProcess, EXIT_FAILURE};
use crate::trap::TrapFrame;

/// What the trap glue must do after a syscall.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum Disposition {
    /// Return to user mode; `eax` holds the result.
    Resume,
    /// The process is gone. Never return to it.
    Exit(i32),
}

/// The syscall layer. One instance per kernel, built at boot.
pub struct Syscalls<F: FileSystem, C: Console, S: Scheduler> {
    pub(super) fs: FsLock<F>,
    pub(super) console: C,
    pub(super) scheduler: S,
    pub(super) exits: ExitBoard,
    pub(super) config: Config,
}

impl<F, C, S> Syscalls<F, C, S>
where
    F: FileSystem,
    C: Console,
    S: Scheduler,
{
    /// Take ownership of the filesystem and set up the lock around it.
    pub fn new(fs: F, console: C, scheduler: S, config: Config) -> Self {
        log::info!(
            "syscall layer up (name limit {}, io chunk {})",
            config.max_name_len,
            config.chunk()
        );
        Self {
            fs: FsLock::new(fs),
            console,
            scheduler,
            exits: ExitBoard::new(),
            config,
        }
    }

    /// The filesystem lock.
    pub fn filesystem(&self) -> &FsLock<F> {
        &self.fs
    }

    /// Statuses of exited processes.
    pub fn exits(&self) -> &ExitBoard {
        &self.exits
    }

    /// The console.
    pub fn console(&self) -> &C {
        &self.console
    }

    /// The scheduler processes are handed to on exit.
    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    /// Active configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Serve the syscall described by `frame` for `process`.
    pub fn dispatch<P: UserProcess>(&self, process: &P, frame: &mut TrapFrame) -> Disposition {
        let esp = VirtAddr::from_u32(frame.esp);
        let (call, args) = match Self::decode(process, esp) {
            Ok(decoded) => decoded,
            Err(err) => {
                log::warn!("pid {}: bad syscall at esp {}: {}", process.pid(), esp, err);
                return self.terminate(process, EXIT_FAILURE);
            }
        };

        let result = match call {
            Syscall::Exit => return self.exit(process, args.int(0)),
            Syscall::Create => self.sys_create(process, args.ptr(0), args.uint(1)),
            Syscall::Open => self.sys_open(process, args.ptr(0)),
            Syscall::Filesize => self.sys_filesize(process, args.int(0)),
            Syscall::Read => self.sys_read(process, args.int(0), args.ptr(1), args.int(2)),
            Syscall::Write => self.sys_write(process, args.int(0), args.ptr(1), args.uint(2)),
            Syscall::Seek => self.sys_seek(process, args.int(0), args.uint(1)),
            Syscall::Tell => self.sys_tell(process, args.int(0)),
            Syscall::Close => self.sys_close(process, args.int(0)),
        };

        self.write_result(process, call, result, frame)
    }

    fn decode<P: UserProcess>(process: &P, esp: VirtAddr) -> Result<(Syscall, Args), SyscallError> {
        let space = process.address_space();
        let nr = validate::read_user_u32(space, esp)?;
        let call = Syscall::try_from(nr)?;
        let args = Args::decode(space, esp, call.args())?;
        log::trace!("pid {}: {:?} {:?}", process.pid(), call, args);
        Ok((call, args))
    }

    fn write_result<P: UserProcess>(
        &self,
        process: &P,
        call: Syscall,
        result: SyscallResult,
        frame: &mut TrapFrame,
    ) -> Disposition {
        let value = match result {
            Ok(value) => value,
            Err(err) if err.is_fatal() => {
                log::warn!("pid {}: {:?} killed: {}", process.pid(), call, err);
                return self.terminate(process, EXIT_FAILURE);
            }
            Err(err) => {
                log::debug!("pid {}: {:?} failed: {}", process.pid(), call, err);
                call.failure_value()
            }
        };
        if call.returns_value() {
            frame.eax = value;
        }
        Disposition::Resume
    }

    /// exit(status)
    pub fn exit<P: UserProcess>(&self, process: &P, status: i32) -> Disposition {
        self.terminate(process, status)
    }

    /// End `process` with `status`.
    ///
    /// The only teardown path: explicit exit, bad pointers and faults
    /// raised elsewhere in the kernel all come through here. Prints the
    /// status line, closes every descriptor, publishes the status and
    /// hands the process to the scheduler. Must not be called with the
    /// filesystem lock held.
    pub fn terminate<P: UserProcess>(&self, process: &P, status: i32) -> Disposition {
        let pid = process.pid();
        kprintln!(self.console, "{}: exit({})", process.name(), status);

        let closed = self.fs.lock().release(pid);
        self.exits.publish(
            pid,
            ExitRecord {
                name: String::from(process.name()),
                status,
            },
        );
        log::info!(
            "pid {} ({}) exited with {}, {} files closed",
            pid,
            process.name(),
            status,
            closed
        );

        self.scheduler.terminate(pid, status);
        Disposition::Exit(status)
    }
}
