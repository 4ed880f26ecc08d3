/// Requests and completions exchanged with the host.
use alloc::vec::Vec;

use crate::error::DeviceError;
use crate::segment::{self, Direction, Segment};

/// One sector-addressed scatter-gather I/O operation.
#[derive(Debug)]
pub struct Request<'a> {
    pub starting_sector: u64,
    pub direction: Direction,
    pub segments: Vec<Segment<'a>>,
}

impl<'a> Request<'a> {
    pub fn new(direction: Direction, starting_sector: u64) -> Self {
        Self {
            starting_sector,
            direction,
            segments: Vec::new(),
        }
    }

    pub fn read(starting_sector: u64) -> Self {
        Self::new(Direction::Read, starting_sector)
    }

    pub fn write(starting_sector: u64) -> Self {
        Self::new(Direction::Write, starting_sector)
    }

    /// Append a segment; segments are transferred in the order added.
    pub fn segment(mut self, segment: Segment<'a>) -> Self {
        self.segments.push(segment);
        self
    }

    pub fn push(&mut self, segment: Segment<'a>) {
        self.segments.push(segment);
    }

    /// Total bytes the request covers, or None on overflow.
    pub fn total_len(&self) -> Option<u64> {
        segment::total_len(&self.segments)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    IoError,
}

/// Outcome of exactly one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Completion {
    pub status: Status,
    pub bytes_transferred: u64,
    /// Why the request failed; None on success.
    pub error: Option<DeviceError>,
}

impl Completion {
    pub fn ok(bytes_transferred: u64) -> Self {
        Self {
            status: Status::Ok,
            bytes_transferred,
            error: None,
        }
    }

    /// Failed request; `bytes_transferred` counts segments copied before the failure.
    pub fn io_error(error: DeviceError, bytes_transferred: u64) -> Self {
        Self {
            status: Status::IoError,
            bytes_transferred,
            error: Some(error),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == Status::Ok
    }

    pub fn into_result(self) -> Result<u64, DeviceError> {
        match self.error {
            None => Ok(self.bytes_transferred),
            Some(error) => Err(error),
        }
    }
}
