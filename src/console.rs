//! Kernel console
//!
//! The console device itself (UART, VGA text buffer) belongs to the rest
//! of the kernel. The syscall layer only needs to push bytes at it: user
//! writes to descriptor 1, exit status lines and log records.
//!
//! # Security Considerations
//! - Console writes never take the filesystem lock
//! - Bytes are passed through untouched; no formatting of user data

use core::fmt;

/// Byte sink for console output.
///
/// Implementations must be callable from any thread serving a syscall.
pub trait Console: Sync {
    /// Write all of `bytes` to the console.
    fn write_bytes(&self, bytes: &[u8]);
}

impl<C: Console + ?Sized> Console for &C {
    fn write_bytes(&self, bytes: &[u8]) {
        (**self).write_bytes(bytes)
    }
}

/// Adapter that lets `write!` target a [`Console`].
pub struct ConsoleWriter<'a, C: Console + ?Sized>(pub &'a C);

impl<C: Console + ?Sized> fmt::Write for ConsoleWriter<'_, C> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.0.write_bytes(s.as_bytes());
        Ok(())
    }
}

/// Print to a console without a trailing newline.
#[macro_export]
macro_rules! kprint {
    ($console:expr, $($arg:tt)*) => {{
        use core::fmt::Write;
        let _ = write!($crate::console::ConsoleWriter(&$console), $($arg)*);
    }};
}

/// Print a line to a console.
#[macro_export]
macro_rules! kprintln {
    ($console:expr) => {
        $crate::kprint!($console, "\n")
    };
    ($console:expr, $($arg:tt)*) => {{
        $crate::kprint!($console, $($arg)*);
        $crate::kprint!($console, "\n");
    }};
}
