//! vblk — virtual in-memory block device core.
//!
//! A RAM-backed block device that services sector-addressed scatter-gather
//! requests from a host queue. The host supplies resources through
//! [`Platform`] and its request-processing handle through [`QueueHandle`];
//! the device owns its backing store for its whole lifetime and serializes
//! every transfer against it.
#![no_std]

extern crate alloc;

pub mod block_device;
pub mod config;
pub mod device;
pub mod error;
pub mod geometry;
pub mod lifecycle;
pub mod platform;
pub mod queue;
pub mod request;
pub mod segment;
pub mod serializer;
pub mod stats;
pub mod store;

pub use block_device::BlockDevice;
pub use config::{DeviceConfig, DeviceFlags, KERNEL_SECTOR_SIZE};
pub use device::Device;
pub use error::{AllocError, DeviceError, QueueError};
pub use geometry::Geometry;
pub use lifecycle::{LifecycleState, Stage};
pub use platform::{Heap, Platform};
pub use queue::{QueueHandle, QueueLimits};
pub use request::{Completion, Request, Status};
pub use segment::{Direction, Segment, TransferFault};
pub use stats::IoStats;
