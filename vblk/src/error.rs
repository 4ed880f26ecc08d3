/// Error types for the virtual block device.
use core::fmt;

use crate::lifecycle::{LifecycleState, Stage};

/// Device-level errors surfaced to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceError {
    /// Request addresses bytes beyond the end of the device.
    /// Rejected before any byte is copied.
    OutOfRange { offset: u64, len: u64, capacity: u64 },
    /// A startup resource could not be acquired.
    AllocationFailure(Stage),
    /// Segment `segment` of the request could not be accessed.
    /// Segments before it have already been copied.
    CopyFailure { segment: usize },
    /// Sector size or capacity is unusable.
    InvalidGeometry,
    /// The device is not accepting I/O in its current state.
    NotPublished(LifecycleState),
    /// Lifecycle step requested out of order.
    InvalidState(LifecycleState),
    /// Whole-block access with a buffer that is not a multiple of the sector size.
    Misaligned { len: usize, sector_size: u32 },
    /// Write submitted to a read-only device.
    ReadOnly,
    /// A request handle is already attached.
    AlreadyAttached,
    /// Teardown has already run.
    AlreadyTornDown,
}

impl fmt::Display for DeviceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceError::OutOfRange { offset, len, capacity } => write!(
                f,
                "request out of range: {} bytes at offset {} (capacity {})",
                len, offset, capacity
            ),
            DeviceError::AllocationFailure(stage) => write!(f, "allocation failed at {}", stage),
            DeviceError::CopyFailure { segment } => {
                write!(f, "segment {} could not be accessed", segment)
            }
            DeviceError::InvalidGeometry => write!(f, "invalid device geometry"),
            DeviceError::NotPublished(state) => write!(f, "device not published (state: {:?})", state),
            DeviceError::InvalidState(state) => write!(f, "invalid lifecycle state: {:?}", state),
            DeviceError::Misaligned { len, sector_size } => write!(
                f,
                "buffer of {} bytes is not a multiple of the {}-byte sector",
                len, sector_size
            ),
            DeviceError::ReadOnly => write!(f, "device is read-only"),
            DeviceError::AlreadyAttached => write!(f, "request handle already attached"),
            DeviceError::AlreadyTornDown => write!(f, "device already torn down"),
        }
    }
}

/// Host allocation errors reported by a [`Platform`](crate::platform::Platform).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocError {
    OutOfMemory,
    /// The host refused the resource (or returned one of the wrong size).
    Refused,
}

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AllocError::OutOfMemory => write!(f, "out of memory"),
            AllocError::Refused => write!(f, "resource refused by host"),
        }
    }
}

/// Errors reported by the host's request-processing handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueError {
    /// The host could not create or bind its queue.
    Unavailable,
    /// The host rejected the advertised limits.
    UnsupportedLimits,
}

impl fmt::Display for QueueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueueError::Unavailable => write!(f, "request queue unavailable"),
            QueueError::UnsupportedLimits => write!(f, "queue limits not supported by host"),
        }
    }
}
