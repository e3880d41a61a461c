//! In-memory stand-ins for the kernel subsystems the syscall layer talks
//! to, plus a harness that builds user stacks and runs traps.

use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;

use spin::Mutex;

use crate::config::Config;
use crate::console::Console;
use crate::fs::FileSystem;
use crate::mm::{AddressSpace, PageFlags, VirtAddr, PAGE_SIZE, PHYS_BASE};
use crate::process::{Pid, Scheduler, UserProcess};
use crate::syscall::{Disposition, Syscalls};
use crate::trap::TrapFrame;

/// Base of the user data region.
pub const DATA: usize = 0x0804_8000;
/// Pages mapped at [`DATA`].
pub const DATA_PAGES: usize = 2;
/// Lowest address of the single stack page.
pub const STACK: usize = PHYS_BASE - PAGE_SIZE;

// ---------------------------------------------------------------------------
// Filesystem

/// Longest name the in-memory filesystem accepts.
pub const NAME_MAX: usize = 14;

type Contents = Arc<Mutex<Vec<u8>>>;

/// Flat in-memory filesystem that counts calls.
#[derive(Debug, Default)]
pub struct MemFs {
    files: BTreeMap<String, Contents>,
    reads: usize,
    writes: usize,
    closes: usize,
}

/// An open [`MemFs`] file.
#[derive(Debug)]
pub struct MemFile {
    data: Contents,
    pos: usize,
}

impl MemFs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reads(&self) -> usize {
        self.reads
    }

    pub fn writes(&self) -> usize {
        self.writes
    }

    pub fn closes(&self) -> usize {
        self.closes
    }

    /// Contents of `name`, if it exists.
    pub fn contents(&self, name: &str) -> Option<Vec<u8>> {
        self.files.get(name).map(|data| data.lock().clone())
    }
}

impl FileSystem for MemFs {
    type File = MemFile;

    fn create(&mut self, name: &str, initial_size: u32, _is_dir: bool) -> bool {
        if name.is_empty() || name.len() > NAME_MAX || self.files.contains_key(name) {
            return false;
        }
        let data = alloc::vec![0u8; initial_size as usize];
        self.files.insert(String::from(name), Arc::new(Mutex::new(data)));
        true
    }

    fn open(&mut self, name: &str) -> Option<MemFile> {
        let data = self.files.get(name)?.clone();
        Some(MemFile { data, pos: 0 })
    }

    fn read(&mut self, file: &mut MemFile, buf: &mut [u8]) -> usize {
        self.reads += 1;
        let data = file.data.lock();
        let start = file.pos.min(data.len());
        let n = buf.len().min(data.len() - start);
        buf[..n].copy_from_slice(&data[start..start + n]);
        file.pos += n;
        n
    }

    fn write(&mut self, file: &mut MemFile, buf: &[u8]) -> usize {
        self.writes += 1;
        let mut data = file.data.lock();
        let end = file.pos + buf.len();
        if data.len() < end {
            data.resize(end, 0);
        }
        data[file.pos..end].copy_from_slice(buf);
        file.pos = end;
        buf.len()
    }

    fn length(&mut self, file: &MemFile) -> u32 {
        file.data.lock().len() as u32
    }

    fn seek(&mut self, file: &mut MemFile, pos: u32) {
        file.pos = pos as usize;
    }

    fn tell(&mut self, file: &MemFile) -> u32 {
        file.pos as u32
    }

    fn close(&mut self, _file: MemFile) {
        self.closes += 1;
    }
}

// ---------------------------------------------------------------------------
// Memory

type Page = Box<[u8; PAGE_SIZE]>;

/// Sparse page map standing in for a process's page directory.
#[derive(Debug, Default)]
pub struct FakeSpace {
    pages: Mutex<BTreeMap<usize, (PageFlags, Page)>>,
}

impl FakeSpace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map zeroed pages covering `[start, start + len)`.
    pub fn map(&self, start: VirtAddr, len: usize, flags: PageFlags) {
        let mut pages = self.pages.lock();
        let mut page = start.page_down().as_usize();
        while page < start.as_usize() + len {
            pages.insert(page, (flags, Box::new([0u8; PAGE_SIZE])));
            page += PAGE_SIZE;
        }
    }

    /// Store `bytes` at `addr`, ignoring permissions. Panics if unmapped.
    pub fn poke(&self, addr: VirtAddr, bytes: &[u8]) {
        let mut pages = self.pages.lock();
        for (i, byte) in bytes.iter().enumerate() {
            let at = VirtAddr::new(addr.as_usize() + i);
            let (_, page) = pages
                .get_mut(&at.page_down().as_usize())
                .expect("poke into unmapped page");
            page[at.page_offset()] = *byte;
        }
    }

    /// Load `len` bytes from `addr`, ignoring permissions. Panics if unmapped.
    pub fn peek(&self, addr: VirtAddr, len: usize) -> Vec<u8> {
        let pages = self.pages.lock();
        (0..len)
            .map(|i| {
                let at = VirtAddr::new(addr.as_usize() + i);
                let (_, page) = pages
                    .get(&at.page_down().as_usize())
                    .expect("peek into unmapped page");
                page[at.page_offset()]
            })
            .collect()
    }
}

impl AddressSpace for FakeSpace {
    fn page_flags(&self, page: VirtAddr) -> Option<PageFlags> {
        assert!(page.is_aligned(), "unaligned page query {}", page);
        self.pages.lock().get(&page.as_usize()).map(|(flags, _)| *flags)
    }

    unsafe fn read_unchecked(&self, src: VirtAddr, dst: &mut [u8]) {
        dst.copy_from_slice(&self.peek(src, dst.len()));
    }

    unsafe fn write_unchecked(&self, dst: VirtAddr, src: &[u8]) {
        self.poke(dst, src);
    }
}

// ---------------------------------------------------------------------------
// Console and scheduler

/// Console that keeps everything written to it.
#[derive(Debug)]
pub struct RecordingConsole {
    bytes: Mutex<Vec<u8>>,
}

impl RecordingConsole {
    pub const fn new() -> Self {
        Self {
            bytes: Mutex::new(Vec::new()),
        }
    }

    pub fn output(&self) -> String {
        String::from_utf8_lossy(&self.bytes.lock()).into_owned()
    }
}

impl Console for RecordingConsole {
    fn write_bytes(&self, bytes: &[u8]) {
        self.bytes.lock().extend_from_slice(bytes);
    }
}

/// Scheduler that remembers who it was asked to stop.
#[derive(Debug, Default)]
pub struct RecordingScheduler {
    terminated: Mutex<Vec<(Pid, i32)>>,
}

impl Scheduler for RecordingScheduler {
    fn terminate(&self, pid: Pid, status: i32) {
        self.terminated.lock().push((pid, status));
    }
}

// ---------------------------------------------------------------------------
// Processes

/// A user process with one stack page and a small data region.
#[derive(Debug)]
pub struct FakeProcess {
    pid: Pid,
    name: String,
    space: FakeSpace,
    brk: Mutex<usize>,
}

impl FakeProcess {
    pub fn new(pid: u32, name: &str) -> Self {
        let space = FakeSpace::new();
        space.map(VirtAddr::new(DATA), DATA_PAGES * PAGE_SIZE, PageFlags::USER_RW);
        space.map(VirtAddr::new(STACK), PAGE_SIZE, PageFlags::USER_RW);
        Self {
            pid: Pid(pid),
            name: String::from(name),
            space,
            brk: Mutex::new(DATA),
        }
    }

    /// Copy `bytes` into the data region and return their address.
    pub fn place(&self, bytes: &[u8]) -> u32 {
        let addr = self.alloc(bytes.len());
        self.space.poke(VirtAddr::new(addr as usize), bytes);
        addr
    }

    /// NUL-terminated copy of `s` in the data region.
    pub fn string(&self, s: &str) -> u32 {
        let mut bytes = Vec::from(s.as_bytes());
        bytes.push(0);
        self.place(&bytes)
    }

    /// `len` zeroed bytes in the data region.
    pub fn alloc(&self, len: usize) -> u32 {
        let mut brk = self.brk.lock();
        let addr = *brk;
        *brk += len.max(1);
        assert!(*brk <= DATA + DATA_PAGES * PAGE_SIZE, "data region exhausted");
        addr as u32
    }

    /// Push `words` (call number first) near the top of the stack.
    pub fn call(&self, words: &[u32]) -> TrapFrame {
        self.call_at(PHYS_BASE - 64, words)
    }

    /// Like [`FakeProcess::call`] with an explicit stack pointer.
    pub fn call_at(&self, esp: usize, words: &[u32]) -> TrapFrame {
        for (i, word) in words.iter().enumerate() {
            self.space
                .poke(VirtAddr::new(esp + 4 * i), &word.to_le_bytes());
        }
        TrapFrame::new(DATA as u32, esp as u32)
    }

    pub fn space(&self) -> &FakeSpace {
        &self.space
    }
}

impl UserProcess for FakeProcess {
    type Space = FakeSpace;

    fn pid(&self) -> Pid {
        self.pid
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn address_space(&self) -> &FakeSpace {
        &self.space
    }
}

// ---------------------------------------------------------------------------
// Harness

pub type TestSyscalls = Syscalls<MemFs, RecordingConsole, RecordingScheduler>;

/// A syscall layer wired to in-memory collaborators.
pub struct Harness {
    pub syscalls: TestSyscalls,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        Self {
            syscalls: Syscalls::new(
                MemFs::new(),
                RecordingConsole::new(),
                RecordingScheduler::default(),
                config,
            ),
        }
    }

    pub fn process(&self, pid: u32, name: &str) -> FakeProcess {
        FakeProcess::new(pid, name)
    }

    /// Run one syscall; returns the disposition and `eax` as signed.
    pub fn syscall(&self, process: &FakeProcess, words: &[u32]) -> (Disposition, i32) {
        let mut frame = process.call(words);
        frame.eax = 0xdead_beef;
        let disposition = self.syscalls.dispatch(process, &mut frame);
        (disposition, frame.eax as i32)
    }

    /// Like [`Harness::syscall`] but expects the process to survive.
    pub fn ok(&self, process: &FakeProcess, words: &[u32]) -> i32 {
        let (disposition, eax) = self.syscall(process, words);
        assert_eq!(disposition, Disposition::Resume, "call {:?} killed", words);
        eax
    }

    /// Everyone the scheduler was told to stop, as `(pid, status)`.
    pub fn terminated(&self) -> Vec<(u32, i32)> {
        self.syscalls
            .scheduler()
            .terminated
            .lock()
            .iter()
            .map(|(pid, status)| (pid.0, *status))
            .collect()
    }

    pub fn fs<R>(&self, f: impl FnOnce(&MemFs) -> R) -> R {
        f(&self.syscalls.filesystem().lock().fs)
    }
}
