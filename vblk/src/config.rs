/// Device configuration supplied by the host at creation time.
///
/// Capacity and sector size are fixed for the lifetime of a device.
use crate::error::DeviceError;

/// Standard kernel sector size in bytes.
pub const KERNEL_SECTOR_SIZE: u32 = 512;

/// Default capacity: 1 MiB.
pub const DEFAULT_CAPACITY: u64 = 1024 * 1024;

/// Default per-request transfer limit advertised to the host, in sectors.
pub const DEFAULT_MAX_HW_SECTORS: u32 = 128;

/// Default device name.
pub const DEFAULT_NAME: &str = "vblk";

static_assertions::const_assert!(KERNEL_SECTOR_SIZE.is_power_of_two());
static_assertions::const_assert_eq!(DEFAULT_CAPACITY % KERNEL_SECTOR_SIZE as u64, 0);

bitflags::bitflags! {
    /// Device properties advertised to the host queue.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct DeviceFlags: u32 {
        /// Reject all writes.
        const READ_ONLY = 0x0001;
        /// No seek penalty (memory-backed).
        const NONROTATIONAL = 0x0002;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceConfig {
    pub name: &'static str,
    pub capacity_bytes: u64,
    pub sector_size: u32,
    pub max_hw_sectors: u32,
    pub flags: DeviceFlags,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME,
            capacity_bytes: DEFAULT_CAPACITY,
            sector_size: KERNEL_SECTOR_SIZE,
            max_hw_sectors: DEFAULT_MAX_HW_SECTORS,
            flags: DeviceFlags::NONROTATIONAL,
        }
    }
}

impl DeviceConfig {
    pub fn new(capacity_bytes: u64, sector_size: u32) -> Self {
        Self {
            capacity_bytes,
            sector_size,
            ..Self::default()
        }
    }

    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    pub fn with_max_hw_sectors(mut self, sectors: u32) -> Self {
        self.max_hw_sectors = sectors;
        self
    }

    pub fn with_flags(mut self, flags: DeviceFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn read_only(&self) -> bool {
        self.flags.contains(DeviceFlags::READ_ONLY)
    }

    /// Number of addressable sectors.
    pub fn capacity_sectors(&self) -> u64 {
        self.capacity_bytes / self.sector_size as u64
    }

    /// Check sector size and capacity before anything is allocated.
    pub fn validate(&self) -> Result<(), DeviceError> {
        if self.sector_size == 0 || !self.sector_size.is_power_of_two() {
            return Err(DeviceError::InvalidGeometry);
        }
        if self.capacity_bytes == 0 || self.capacity_bytes % self.sector_size as u64 != 0 {
            return Err(DeviceError::InvalidGeometry);
        }
        // The whole store has to be addressable as one slice.
        if usize::try_from(self.capacity_bytes).is_err() {
            return Err(DeviceError::InvalidGeometry);
        }
        if self.max_hw_sectors == 0 {
            return Err(DeviceError::InvalidGeometry);
        }
        Ok(())
    }
}
