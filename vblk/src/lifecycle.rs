/// Device lifecycle — ordered bring-up and exact-reverse teardown.
///
/// Bring-up:
///   Uninitialized → StoreAllocated → LockReady → QueueAttached → Published
/// Teardown (from any of those):
///   unpublish → detach queue (Detached) → release lock → free store → TornDown
///
/// Every step records the new state before returning. `unwind` reads that
/// record to undo exactly the steps that completed, so a failed bring-up and
/// a normal shutdown take the same path.
use alloc::boxed::Box;
use core::fmt;

use crate::error::DeviceError;
use crate::platform::Platform;
use crate::queue::{QueueHandle, QueueLimits};
use crate::serializer::AccessSerializer;
use crate::store::BackingStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Uninitialized,
    StoreAllocated,
    LockReady,
    QueueAttached,
    Published,
    Detached,
    TornDown,
}

/// Bring-up step that acquires a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    StoreAllocation,
    LockInit,
    QueueAttach,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::StoreAllocation => write!(f, "store allocation"),
            Stage::LockInit => write!(f, "lock init"),
            Stage::QueueAttach => write!(f, "queue attach"),
        }
    }
}

/// Recorded state plus the resources each completed step holds.
pub struct Lifecycle {
    name: &'static str,
    state: LifecycleState,
    /// Held from StoreAllocated until the lock takes ownership of it.
    store: Option<BackingStore>,
    /// Held from LockReady; owns the store.
    serializer: Option<AccessSerializer>,
    /// Held from QueueAttached until Detached.
    queue: Option<Box<dyn QueueHandle>>,
}

impl Lifecycle {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            state: LifecycleState::Uninitialized,
            store: None,
            serializer: None,
            queue: None,
        }
    }

    #[inline]
    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// The serializer, once the lock step has completed.
    pub fn serializer(&self) -> Option<&AccessSerializer> {
        self.serializer.as_ref()
    }

    fn expect(&self, want: LifecycleState) -> Result<(), DeviceError> {
        match self.state {
            s if s == want => Ok(()),
            LifecycleState::TornDown => Err(DeviceError::AlreadyTornDown),
            s => Err(DeviceError::InvalidState(s)),
        }
    }

    /// Step 1: allocate the zeroed backing store.
    pub fn allocate_store<P: Platform>(&mut self, platform: &P, bytes: usize) -> Result<(), DeviceError> {
        self.expect(LifecycleState::Uninitialized)?;
        let store = BackingStore::allocate(platform, bytes).map_err(|e| {
            log::error!("[{}] backing store allocation ({} bytes) failed: {}", self.name, bytes, e);
            DeviceError::AllocationFailure(Stage::StoreAllocation)
        })?;
        self.store = Some(store);
        self.state = LifecycleState::StoreAllocated;
        log::debug!("[{}] backing store allocated: {} bytes", self.name, bytes);
        Ok(())
    }

    /// Step 2: acquire the lock resource and move the store behind it.
    pub fn init_lock<P: Platform>(&mut self, platform: &P) -> Result<(), DeviceError> {
        self.expect(LifecycleState::StoreAllocated)?;
        platform.init_lock().map_err(|e| {
            log::error!("[{}] lock init failed: {}", self.name, e);
            DeviceError::AllocationFailure(Stage::LockInit)
        })?;
        let Some(store) = self.store.take() else {
            // Recorded state says the store exists; give the lock back.
            platform.release_lock();
            return Err(DeviceError::AllocationFailure(Stage::LockInit));
        };
        self.serializer = Some(AccessSerializer::new(store));
        self.state = LifecycleState::LockReady;
        log::debug!("[{}] lock ready", self.name);
        Ok(())
    }

    /// Step 3: bind the host's request-processing handle.
    pub fn attach_queue(
        &mut self,
        mut handle: Box<dyn QueueHandle>,
        limits: &QueueLimits,
    ) -> Result<(), DeviceError> {
        match self.state {
            LifecycleState::LockReady => {}
            LifecycleState::QueueAttached | LifecycleState::Published => {
                return Err(DeviceError::AlreadyAttached)
            }
            _ => self.expect(LifecycleState::LockReady)?,
        }
        handle.attach(limits).map_err(|e| {
            log::error!("[{}] queue attach failed: {}", self.name, e);
            DeviceError::AllocationFailure(Stage::QueueAttach)
        })?;
        self.queue = Some(handle);
        self.state = LifecycleState::QueueAttached;
        log::debug!("[{}] queue attached", self.name);
        Ok(())
    }

    /// Step 4: start accepting requests.
    pub fn publish(&mut self) -> Result<(), DeviceError> {
        self.expect(LifecycleState::QueueAttached)?;
        self.state = LifecycleState::Published;
        Ok(())
    }

    /// Undo every completed step, newest first, ending in `TornDown`.
    ///
    /// Safe to call from any state; a second call is a no-op.
    pub fn unwind<P: Platform>(&mut self, platform: &P) {
        loop {
            self.state = match self.state {
                LifecycleState::Published => {
                    log::debug!("[{}] unpublished", self.name);
                    LifecycleState::QueueAttached
                }
                LifecycleState::QueueAttached => {
                    if let Some(mut queue) = self.queue.take() {
                        queue.detach();
                    }
                    log::debug!("[{}] queue detached", self.name);
                    LifecycleState::Detached
                }
                LifecycleState::Detached | LifecycleState::LockReady => {
                    if let Some(serializer) = self.serializer.take() {
                        self.store = Some(serializer.into_store());
                        platform.release_lock();
                        log::debug!("[{}] lock released", self.name);
                    }
                    LifecycleState::StoreAllocated
                }
                LifecycleState::StoreAllocated => {
                    if let Some(store) = self.store.take() {
                        let bytes = store.len();
                        store.release(platform);
                        log::debug!("[{}] backing store freed: {} bytes", self.name, bytes);
                    }
                    LifecycleState::TornDown
                }
                LifecycleState::Uninitialized => LifecycleState::TornDown,
                LifecycleState::TornDown => return,
            };
        }
    }
}
