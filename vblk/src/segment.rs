/// Segment transfer engine — scatter-gather copies against the backing store.
///
/// A request carries an ordered list of segments, each a borrowed window into
/// a host buffer. The engine validates the whole range up front, then walks
/// the list in order with a cursor into the store:
///   Write: segment window → store
///   Read:  store → segment window
use core::fmt;

use crate::error::DeviceError;
use crate::store::BackingStore;

/// Transfer direction, from the host's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Read,
    Write,
}

enum View<'a> {
    /// Read-only host buffer; may only feed writes.
    Source(&'a [u8]),
    /// Writable host buffer; may feed writes or receive reads.
    Sink(&'a mut [u8]),
}

/// One contiguous window `[offset, offset + len)` of a host buffer.
///
/// The window is not checked against its buffer at construction. A window
/// that leaves its buffer is an inaccessible segment and fails the copy when
/// the engine reaches it.
pub struct Segment<'a> {
    view: View<'a>,
    offset: usize,
    len: usize,
}

impl<'a> Segment<'a> {
    /// The whole of `buf`, as write data.
    pub fn source(buf: &'a [u8]) -> Self {
        let len = buf.len();
        Self { view: View::Source(buf), offset: 0, len }
    }

    /// The whole of `buf`, as a read target (or write data).
    pub fn sink(buf: &'a mut [u8]) -> Self {
        let len = buf.len();
        Self { view: View::Sink(buf), offset: 0, len }
    }

    /// `len` bytes of `buf` starting at `offset`.
    pub fn source_window(buf: &'a [u8], offset: usize, len: usize) -> Self {
        Self { view: View::Source(buf), offset, len }
    }

    pub fn sink_window(buf: &'a mut [u8], offset: usize, len: usize) -> Self {
        Self { view: View::Sink(buf), offset, len }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether the engine can copy out of this segment (Write direction).
    pub fn is_readable(&self) -> bool {
        self.window().is_some()
    }

    fn window(&self) -> Option<&[u8]> {
        let end = self.offset.checked_add(self.len)?;
        match &self.view {
            View::Source(buf) => buf.get(self.offset..end),
            View::Sink(buf) => buf.get(self.offset..end),
        }
    }

    fn window_mut(&mut self) -> Option<&mut [u8]> {
        let start = self.offset;
        let end = start.checked_add(self.len)?;
        match &mut self.view {
            View::Sink(buf) => buf.get_mut(start..end),
            View::Source(_) => None,
        }
    }
}

impl fmt::Debug for Segment<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.view {
            View::Source(_) => "source",
            View::Sink(_) => "sink",
        };
        f.debug_struct("Segment")
            .field("kind", &kind)
            .field("offset", &self.offset)
            .field("len", &self.len)
            .finish()
    }
}

/// Sum of segment lengths, or None on overflow.
pub fn total_len(segments: &[Segment<'_>]) -> Option<u64> {
    segments
        .iter()
        .try_fold(0u64, |acc, seg| acc.checked_add(seg.len() as u64))
}

/// A failed transfer and how many bytes were copied before it stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferFault {
    pub error: DeviceError,
    pub transferred: u64,
}

/// Copy between `store` and `segments`, starting at byte `offset`.
///
/// Fails with zero bytes transferred if the segments do not fit between
/// `offset` and the end of the store. A segment that cannot be accessed
/// stops the walk with `CopyFailure`; segments copied before it stay copied.
pub fn transfer(
    store: &mut BackingStore,
    offset: u64,
    direction: Direction,
    segments: &mut [Segment<'_>],
) -> Result<u64, TransferFault> {
    let capacity = store.len() as u64;
    let total = total_len(segments);

    let fits = total
        .and_then(|len| offset.checked_add(len))
        .map_or(false, |end| end <= capacity);
    if !fits {
        return Err(TransferFault {
            error: DeviceError::OutOfRange {
                offset,
                len: total.unwrap_or(u64::MAX),
                capacity,
            },
            transferred: 0,
        });
    }

    // offset <= capacity == store.len(), so it fits in usize.
    let mut cursor = offset as usize;
    let mut copied = 0u64;

    for (index, segment) in segments.iter_mut().enumerate() {
        let len = segment.len();
        let inaccessible = TransferFault {
            error: DeviceError::CopyFailure { segment: index },
            transferred: copied,
        };
        let out_of_range = TransferFault {
            error: DeviceError::OutOfRange { offset, len: total.unwrap_or(0), capacity },
            transferred: copied,
        };

        match direction {
            Direction::Write => {
                let src = segment.window().ok_or(inaccessible)?;
                let dst = store.range_mut(cursor, len).ok_or(out_of_range)?;
                dst.copy_from_slice(src);
            }
            Direction::Read => {
                let src = store.range(cursor, len).ok_or(out_of_range)?;
                let dst = segment.window_mut().ok_or(inaccessible)?;
                dst.copy_from_slice(src);
            }
        }

        log::trace!("[vblk] {:?} segment {} at offset {}, len {}", direction, index, cursor, len);
        cursor += len;
        copied += len as u64;
    }

    Ok(copied)
}
