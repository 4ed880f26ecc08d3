/// The virtual block device handle.
///
/// `create` allocates the store and lock; `attach` binds the host queue and
/// publishes; `submit` services requests from any number of threads through
/// a shared reference; `teardown` reverses everything. There is no global
/// instance: the handle returned by `create` is threaded through every call.
use alloc::boxed::Box;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicUsize, Ordering};

use crate::config::DeviceConfig;
use crate::error::DeviceError;
use crate::geometry::Geometry;
use crate::lifecycle::{Lifecycle, LifecycleState};
use crate::platform::{Heap, Platform};
use crate::queue::{QueueHandle, QueueLimits};
use crate::request::{Completion, Request};
use crate::segment::{self, Direction};
use crate::stats::{IoCounters, IoStats};

pub struct Device<P: Platform = Heap> {
    config: DeviceConfig,
    platform: P,
    lifecycle: Lifecycle,
    openers: AtomicUsize,
    counters: IoCounters,
}

impl Device<Heap> {
    /// Create a device of `capacity_bytes` with `sector_size`-byte sectors on
    /// the kernel heap. The device is not published until `attach`.
    pub fn create(capacity_bytes: u64, sector_size: u32) -> Result<Self, DeviceError> {
        Self::with_config(DeviceConfig::new(capacity_bytes, sector_size), Heap)
    }
}

impl<P: Platform> Device<P> {
    /// Run bring-up steps 1-2 (store, lock). On failure the completed steps
    /// are unwound and the error returned.
    pub fn with_config(config: DeviceConfig, platform: P) -> Result<Self, DeviceError> {
        config.validate()?;

        let mut device = Self {
            lifecycle: Lifecycle::new(config.name),
            config,
            platform,
            openers: AtomicUsize::new(0),
            counters: IoCounters::new(),
        };

        if let Err(e) = device.start() {
            log::error!("[{}] create failed: {}", device.config.name, e);
            device.lifecycle.unwind(&device.platform);
            return Err(e);
        }

        log::info!(
            "[{}] created: {} sectors x {} bytes",
            device.config.name,
            device.config.capacity_sectors(),
            device.config.sector_size
        );
        Ok(device)
    }

    /// Create, then attach `handle`, as one operation.
    pub fn bring_up<H>(config: DeviceConfig, platform: P, handle: H) -> Result<Self, DeviceError>
    where
        H: QueueHandle + 'static,
    {
        let mut device = Self::with_config(config, platform)?;
        device.attach(handle)?;
        Ok(device)
    }

    fn start(&mut self) -> Result<(), DeviceError> {
        // validate() guarantees the capacity fits in usize.
        let bytes = usize::try_from(self.config.capacity_bytes)
            .map_err(|_| DeviceError::InvalidGeometry)?;
        self.lifecycle.allocate_store(&self.platform, bytes)?;
        self.lifecycle.init_lock(&self.platform)
    }

    /// Run bring-up steps 3-4: bind the host queue, then publish.
    ///
    /// If the host refuses the handle, the lock and store are released and
    /// the device is left `TornDown`.
    pub fn attach<H>(&mut self, handle: H) -> Result<(), DeviceError>
    where
        H: QueueHandle + 'static,
    {
        let limits = QueueLimits::from_config(&self.config);
        match self.lifecycle.attach_queue(Box::new(handle), &limits) {
            Ok(()) => {}
            Err(e @ DeviceError::AllocationFailure(_)) => {
                self.lifecycle.unwind(&self.platform);
                return Err(e);
            }
            Err(e) => return Err(e),
        }
        self.lifecycle.publish()?;
        log::info!(
            "[{}] published: {} KiB, max {} sectors per request",
            self.config.name,
            self.config.capacity_bytes / 1024,
            limits.max_hw_sectors
        );
        Ok(())
    }

    /// Detach from the host queue, release the lock, free the store.
    ///
    /// Runs unconditionally, even with openers outstanding. A second call
    /// returns `AlreadyTornDown`.
    pub fn teardown(&mut self) -> Result<(), DeviceError> {
        if self.lifecycle.state() == LifecycleState::TornDown {
            return Err(DeviceError::AlreadyTornDown);
        }
        let openers = self.openers.load(Ordering::Acquire);
        if openers > 0 {
            log::warn!("[{}] tearing down with {} openers", self.config.name, openers);
        }
        self.lifecycle.unwind(&self.platform);
        log::info!("[{}] torn down", self.config.name);
        Ok(())
    }

    // ---- Requests ----

    /// Service one request and report its outcome.
    ///
    /// Range and state checks run before the lock is taken; a rejected
    /// request never touches the store.
    pub fn submit(&self, mut request: Request<'_>) -> Completion {
        let direction = request.direction;

        let completion = match self.check(&request) {
            Err(error) => {
                log::warn!("[{}] rejected {:?} at sector {}: {}",
                    self.config.name, direction, request.starting_sector, error);
                Completion::io_error(error, 0)
            }
            Ok(offset) => match self.lifecycle.serializer() {
                Some(serializer) => {
                    let result = serializer.with_exclusive(|store| {
                        segment::transfer(store, offset, direction, &mut request.segments)
                    });
                    match result {
                        Ok(bytes) => {
                            log::debug!("[{}] {:?} sector {}, {} bytes",
                                self.config.name, direction, request.starting_sector, bytes);
                            Completion::ok(bytes)
                        }
                        Err(fault) => {
                            log::warn!("[{}] {:?} at sector {} failed after {} bytes: {}",
                                self.config.name, direction, request.starting_sector,
                                fault.transferred, fault.error);
                            Completion::io_error(fault.error, fault.transferred)
                        }
                    }
                }
                None => Completion::io_error(DeviceError::NotPublished(self.state()), 0),
            },
        };

        self.counters.record(direction, &completion);
        completion
    }

    /// Service requests in order, one completion each.
    pub fn submit_all<'a, I>(&self, requests: I) -> Vec<Completion>
    where
        I: IntoIterator<Item = Request<'a>>,
    {
        requests.into_iter().map(|request| self.submit(request)).collect()
    }

    /// Validate a request and return its starting byte offset.
    fn check(&self, request: &Request<'_>) -> Result<u64, DeviceError> {
        let state = self.lifecycle.state();
        if state != LifecycleState::Published {
            return Err(DeviceError::NotPublished(state));
        }
        if request.direction == Direction::Write && self.config.read_only() {
            return Err(DeviceError::ReadOnly);
        }

        let capacity = self.config.capacity_bytes;
        let sector_size = self.config.sector_size as u64;
        let len = request.total_len();
        let out_of_range = DeviceError::OutOfRange {
            offset: request.starting_sector.saturating_mul(sector_size),
            len: len.unwrap_or(u64::MAX),
            capacity,
        };

        if request.starting_sector >= self.config.capacity_sectors() {
            return Err(out_of_range);
        }
        // starting_sector < capacity_sectors, so this cannot overflow.
        let offset = request.starting_sector * sector_size;
        let end = len
            .and_then(|len| offset.checked_add(len))
            .ok_or(out_of_range)?;
        if end > capacity {
            return Err(out_of_range);
        }
        Ok(offset)
    }

    // ---- Open / release ----

    /// Register an opener. Only a published device can be opened.
    pub fn open(&self) -> Result<usize, DeviceError> {
        let state = self.lifecycle.state();
        if state != LifecycleState::Published {
            return Err(DeviceError::NotPublished(state));
        }
        let openers = self.openers.fetch_add(1, Ordering::AcqRel) + 1;
        log::debug!("[{}] opened ({} openers)", self.config.name, openers);
        Ok(openers)
    }

    /// Drop an opener. Returns the remaining count.
    pub fn release(&self) -> usize {
        let previous = self
            .openers
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
            .unwrap_or(0);
        let remaining = previous.saturating_sub(1);
        log::debug!("[{}] released ({} openers)", self.config.name, remaining);
        remaining
    }

    pub fn openers(&self) -> usize {
        self.openers.load(Ordering::Acquire)
    }

    // ---- Introspection ----

    pub fn state(&self) -> LifecycleState {
        self.lifecycle.state()
    }

    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn capacity_bytes(&self) -> u64 {
        self.config.capacity_bytes
    }

    pub fn sector_size(&self) -> u32 {
        self.config.sector_size
    }

    pub fn capacity_sectors(&self) -> u64 {
        self.config.capacity_sectors()
    }

    pub fn geometry(&self) -> Geometry {
        Geometry::for_sectors(self.config.capacity_sectors())
    }

    /// Counter snapshot. `peak_in_flight` reads 0 once the lock is released.
    pub fn stats(&self) -> IoStats {
        let peak = self
            .lifecycle
            .serializer()
            .map_or(0, |s| s.peak_in_flight());
        self.counters.snapshot(peak)
    }
}

impl<P: Platform> Drop for Device<P> {
    fn drop(&mut self) {
        if self.lifecycle.state() != LifecycleState::TornDown {
            log::warn!("[{}] dropped without teardown", self.config.name);
            self.lifecycle.unwind(&self.platform);
        }
    }
}
