//! Pinned DMA memory
//!
//! The driver never allocates DMA memory itself. A [`BusTransaction`] token
//! pins a contiguous region and hands back a [`PinnedBuffer`], which exposes
//! the CPU mapping, physical address translation and cache maintenance the
//! rings need.

use core::ptr::NonNull;

use crate::error::{DmaError, DmaResult};

/// Cache attributes requested for a pinned region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CachePolicy {
    /// Normal cached memory; the owner performs cache maintenance
    Cached,
    /// Uncached memory; CPU and DMA views are always coherent
    Uncached,
}

/// Cache maintenance operation over a byte range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CacheOp {
    /// Write dirty lines back to memory (before the device reads)
    Clean,
    /// Write back and discard lines (before the device writes)
    CleanInvalidate,
}

/// A region pinned for bus-master DMA.
///
/// The mapping returned by [`virt`](Self::virt) stays valid until the buffer
/// is dropped, even after [`unpin`](Self::unpin).
pub trait PinnedBuffer: Send + Sync {
    /// CPU-visible base of the region
    fn virt(&self) -> NonNull<u8>;

    /// Length of the region in bytes
    fn len(&self) -> usize;

    /// Check if the region is empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Physical address of the byte at `offset`
    fn lookup_phys(&self, offset: usize) -> DmaResult<u64>;

    /// Perform cache maintenance on `len` bytes starting at `offset`
    fn cache_flush(&self, offset: usize, len: usize, op: CacheOp);

    /// Release the pin. The device must no longer access the region.
    fn unpin(&self) -> DmaResult<()>;
}

/// Capability to pin memory for DMA on behalf of one device
pub trait BusTransaction: Send + Sync {
    /// Buffer type produced by [`pin`](Self::pin)
    type Buffer: PinnedBuffer;

    /// Allocate and pin a contiguous region of `size` bytes
    fn pin(&self, size: usize, policy: CachePolicy) -> DmaResult<Self::Buffer>;
}

/// Translate `offset` to a physical address the 32-bit descriptor fields can
/// hold.
pub fn phys32<B: PinnedBuffer + ?Sized>(buffer: &B, offset: usize) -> DmaResult<u32> {
    let phys = buffer.lookup_phys(offset)?;
    u32::try_from(phys).map_err(|_| DmaError::AddressOutOfRange)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockBti;

    #[test]
    fn phys32_accepts_low_addresses() {
        let bti = MockBti::new();
        let buf = bti.pin(4096, CachePolicy::Uncached).unwrap();
        let base = phys32(&buf, 0).unwrap();
        assert_eq!(phys32(&buf, 16).unwrap(), base + 16);
    }

    #[test]
    fn phys32_rejects_high_addresses() {
        let bti = MockBti::with_phys_base(0x1_0000_0000);
        let buf = bti.pin(4096, CachePolicy::Uncached).unwrap();
        assert_eq!(phys32(&buf, 0), Err(DmaError::AddressOutOfRange));
    }

    #[test]
    fn lookup_past_end_fails() {
        let bti = MockBti::new();
        let buf = bti.pin(64, CachePolicy::Cached).unwrap();
        assert_eq!(buf.lookup_phys(64), Err(DmaError::AddressTranslation));
    }
}
