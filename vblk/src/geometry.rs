/// Legacy CHS geometry reported to partitioning tools.
///
/// A memory device has no cylinders; this is the conventional fake of
/// 4 heads x 16 sectors per track (64 sectors per cylinder).
pub const HEADS: u8 = 4;
pub const SECTORS_PER_TRACK: u8 = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub cylinders: u16,
    pub heads: u8,
    pub sectors: u8,
    pub start: u64,
}

impl Geometry {
    pub fn for_sectors(capacity_sectors: u64) -> Self {
        let cylinders = (capacity_sectors & !0x3f) >> 6;
        Self {
            cylinders: u16::try_from(cylinders).unwrap_or(u16::MAX),
            heads: HEADS,
            sectors: SECTORS_PER_TRACK,
            start: 0,
        }
    }
}
