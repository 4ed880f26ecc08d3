/// Host request-processing handle.
///
/// The host owns the queue requests arrive on. The device only binds to it
/// during bring-up and unbinds during teardown; what flows through it is the
/// host's business.
use crate::config::{DeviceConfig, DeviceFlags};
use crate::error::QueueError;

/// Limits advertised to the host when the handle is attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueLimits {
    pub name: &'static str,
    pub logical_block_size: u32,
    pub physical_block_size: u32,
    pub max_hw_sectors: u32,
    pub capacity_sectors: u64,
    pub flags: DeviceFlags,
}

impl QueueLimits {
    pub fn from_config(config: &DeviceConfig) -> Self {
        Self {
            name: config.name,
            logical_block_size: config.sector_size,
            physical_block_size: config.sector_size,
            max_hw_sectors: config.max_hw_sectors,
            capacity_sectors: config.capacity_sectors(),
            flags: config.flags,
        }
    }

    /// Largest single request the host should build, in bytes.
    pub fn max_transfer_bytes(&self) -> u64 {
        self.max_hw_sectors as u64 * self.logical_block_size as u64
    }
}

pub trait QueueHandle: Send + Sync {
    /// Bind the host queue to this device.
    fn attach(&mut self, limits: &QueueLimits) -> Result<(), QueueError>;

    /// Unbind. Called exactly once for every successful `attach`.
    fn detach(&mut self);
}
