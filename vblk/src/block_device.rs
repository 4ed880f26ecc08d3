/// BlockDevice trait — whole-block I/O on top of the request path.
///
/// Storage layers above the raw sector interface want `read_blocks` /
/// `write_blocks` rather than scatter-gather requests. Each call becomes a
/// single-segment request through `Device::submit`, so it gets the same
/// bounds checks and locking.
use crate::device::Device;
use crate::error::DeviceError;
use crate::lifecycle::LifecycleState;
use crate::platform::Platform;
use crate::request::Request;
use crate::segment::Segment;

/// Abstract block device for storage operations.
pub trait BlockDevice {
    /// Read `buf.len() / block_size` blocks starting at `lba` into `buf`.
    fn read_blocks(&self, lba: u64, buf: &mut [u8]) -> Result<usize, DeviceError>;

    /// Write `data.len() / block_size` blocks starting at `lba`.
    fn write_blocks(&self, lba: u64, data: &[u8]) -> Result<usize, DeviceError>;

    /// Flush all writes to stable storage.
    fn flush(&self) -> Result<(), DeviceError>;

    /// Block size in bytes.
    fn block_size(&self) -> u32;

    /// Total number of blocks on device.
    fn total_blocks(&self) -> u64;
}

impl<P: Platform> Device<P> {
    fn check_aligned(&self, len: usize) -> Result<(), DeviceError> {
        let sector_size = self.sector_size();
        if len % sector_size as usize != 0 {
            return Err(DeviceError::Misaligned { len, sector_size });
        }
        Ok(())
    }
}

impl<P: Platform> BlockDevice for Device<P> {
    fn read_blocks(&self, lba: u64, buf: &mut [u8]) -> Result<usize, DeviceError> {
        self.check_aligned(buf.len())?;
        let blocks = buf.len() / self.sector_size() as usize;
        self.submit(Request::read(lba).segment(Segment::sink(buf)))
            .into_result()?;
        Ok(blocks)
    }

    fn write_blocks(&self, lba: u64, data: &[u8]) -> Result<usize, DeviceError> {
        self.check_aligned(data.len())?;
        let blocks = data.len() / self.sector_size() as usize;
        self.submit(Request::write(lba).segment(Segment::source(data)))
            .into_result()?;
        Ok(blocks)
    }

    /// Memory-backed: nothing to flush once the device is live.
    fn flush(&self) -> Result<(), DeviceError> {
        match self.state() {
            LifecycleState::Published => Ok(()),
            state => Err(DeviceError::NotPublished(state)),
        }
    }

    fn block_size(&self) -> u32 {
        self.sector_size()
    }

    fn total_blocks(&self) -> u64 {
        self.capacity_sectors()
    }
}
