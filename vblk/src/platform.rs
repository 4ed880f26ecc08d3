/// Host resource services consumed during bring-up and teardown.
///
/// A device never allocates behind the host's back: the backing store and
/// the lock resource are requested through this trait, and handed back
/// through it at teardown. Tests implement it to count live resources and to
/// fail a chosen step.
use alloc::vec::Vec;

use crate::error::AllocError;

pub trait Platform: Send + Sync {
    /// Allocate a zero-filled buffer of exactly `bytes` bytes.
    fn alloc_store(&self, bytes: usize) -> Result<Vec<u8>, AllocError> {
        let mut data = Vec::new();
        data.try_reserve_exact(bytes)
            .map_err(|_| AllocError::OutOfMemory)?;
        data.resize(bytes, 0);
        Ok(data)
    }

    /// Return a buffer obtained from `alloc_store`.
    fn free_store(&self, store: Vec<u8>) {
        drop(store);
    }

    /// Acquire the lock resource that guards the store.
    fn init_lock(&self) -> Result<(), AllocError> {
        Ok(())
    }

    /// Release the lock resource acquired by `init_lock`.
    fn release_lock(&self) {}
}

/// Kernel-heap platform: fallible allocation from the global allocator.
#[derive(Debug, Default, Clone, Copy)]
pub struct Heap;

impl Platform for Heap {}
