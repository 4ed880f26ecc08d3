/// Backing store — the device's bytes, held in one flat buffer.
///
/// Sized to the device capacity at creation and never resized. Only the
/// transfer engine reads or writes it, and only while the access serializer
/// is held.
use alloc::vec::Vec;

use crate::error::AllocError;
use crate::platform::Platform;

pub struct BackingStore {
    data: Vec<u8>,
}

impl BackingStore {
    /// Allocate a zeroed store of `bytes` bytes through the host platform.
    pub fn allocate<P: Platform>(platform: &P, bytes: usize) -> Result<Self, AllocError> {
        let data = platform.alloc_store(bytes)?;
        if data.len() != bytes {
            // Wrong-sized buffers go straight back to the host.
            platform.free_store(data);
            return Err(AllocError::Refused);
        }
        Ok(Self { data })
    }

    /// Hand the buffer back to the host platform.
    pub fn release<P: Platform>(self, platform: &P) {
        platform.free_store(self.data);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Bytes `[offset, offset + len)`, or None if the range leaves the store.
    pub fn range(&self, offset: usize, len: usize) -> Option<&[u8]> {
        let end = offset.checked_add(len)?;
        self.data.get(offset..end)
    }

    pub fn range_mut(&mut self, offset: usize, len: usize) -> Option<&mut [u8]> {
        let end = offset.checked_add(len)?;
        self.data.get_mut(offset..end)
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }
}
