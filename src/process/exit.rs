//! Exit status board
//!
//! Publishes the termination status of exited processes so a waiting
//! parent can collect it.

use alloc::collections::BTreeMap;
use alloc::string::String;

use spin::Mutex;

use super::Pid;

/// How a process ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExitRecord {
    /// Process name at exit.
    pub name: String,
    /// Reported status.
    pub status: i32,
}

/// Statuses of processes that have exited but not been reaped.
#[derive(Debug, Default)]
pub struct ExitBoard {
    records: Mutex<BTreeMap<Pid, ExitRecord>>,
}

impl ExitBoard {
    /// Create an empty board.
    pub const fn new() -> Self {
        Self {
            records: Mutex::new(BTreeMap::new()),
        }
    }

    /// Record that `pid` exited.
    ///
    /// A process exits once; a second publish overwrites the first.
    pub fn publish(&self, pid: Pid, record: ExitRecord) {
        self.records.lock().insert(pid, record);
    }

    /// Status of `pid` if it has exited and not been reaped.
    pub fn exit_status(&self, pid: Pid) -> Option<i32> {
        self.records.lock().get(&pid).map(|r| r.status)
    }

    /// Collect and forget `pid`'s record. Only the first call succeeds.
    pub fn reap(&self, pid: Pid) -> Option<ExitRecord> {
        self.records.lock().remove(&pid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(status: i32) -> ExitRecord {
        ExitRecord {
            name: String::from("child-simple"),
            status,
        }
    }

    #[test]
    fn test_publish_then_peek() {
        let board = ExitBoard::new();
        assert_eq!(board.exit_status(Pid(4)), None);
        board.publish(Pid(4), record(81));
        assert_eq!(board.exit_status(Pid(4)), Some(81));
        assert_eq!(board.exit_status(Pid(4)), Some(81));
    }

    #[test]
    fn test_reap_once() {
        let board = ExitBoard::new();
        board.publish(Pid(4), record(-1));
        assert_eq!(board.reap(Pid(4)), Some(record(-1)));
        assert_eq!(board.reap(Pid(4)), None);
        assert_eq!(board.exit_status(Pid(4)), None);
    }
}
