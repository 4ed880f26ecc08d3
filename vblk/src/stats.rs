/// Per-device I/O counters.
use core::sync::atomic::{AtomicU64, Ordering};

use crate::request::Completion;
use crate::segment::Direction;

/// Point-in-time copy of the counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IoStats {
    pub reads: u64,
    pub writes: u64,
    pub bytes_read: u64,
    pub bytes_written: u64,
    /// Requests that completed with `IoError`.
    pub errors: u64,
    /// Most transfers ever seen inside the critical section at once.
    pub peak_in_flight: usize,
}

#[derive(Default)]
pub struct IoCounters {
    reads: AtomicU64,
    writes: AtomicU64,
    bytes_read: AtomicU64,
    bytes_written: AtomicU64,
    errors: AtomicU64,
}

impl IoCounters {
    pub const fn new() -> Self {
        Self {
            reads: AtomicU64::new(0),
            writes: AtomicU64::new(0),
            bytes_read: AtomicU64::new(0),
            bytes_written: AtomicU64::new(0),
            errors: AtomicU64::new(0),
        }
    }

    /// Count one finished request. Bytes moved before a copy failure still count.
    pub fn record(&self, direction: Direction, completion: &Completion) {
        let (requests, bytes) = match direction {
            Direction::Read => (&self.reads, &self.bytes_read),
            Direction::Write => (&self.writes, &self.bytes_written),
        };
        if completion.is_ok() {
            requests.fetch_add(1, Ordering::Relaxed);
        } else {
            self.errors.fetch_add(1, Ordering::Relaxed);
        }
        bytes.fetch_add(completion.bytes_transferred, Ordering::Relaxed);
    }

    pub fn snapshot(&self, peak_in_flight: usize) -> IoStats {
        IoStats {
            reads: self.reads.load(Ordering::Relaxed),
            writes: self.writes.load(Ordering::Relaxed),
            bytes_read: self.bytes_read.load(Ordering::Relaxed),
            bytes_written: self.bytes_written.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
            peak_in_flight,
        }
    }
}
