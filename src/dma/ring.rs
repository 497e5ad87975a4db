//! Descriptor ring geometry over pinned memory.
//!
//! Both rings share two pinned regions. The uncached descriptor region holds
//! the TX descriptors at indices `[0, N)` followed by the RX descriptors at
//! `[N, 2N)`. The cached transaction region holds the matching buffer slots,
//! `TXN_BUF_SIZE` bytes each, in the same order.

use alloc::sync::Arc;
use core::ptr::NonNull;

use super::buffer::{CacheOp, PinnedBuffer, phys32};
use super::rx::RxRing;
use super::tx::TxRing;
use crate::constants::{PAGE_SIZE, TXN_BUF_SIZE, round_up};
use crate::descriptor::{Descriptor, RX_CONTROL, TX_CONTROL_IDLE};
use crate::error::{DmaError, DmaResult};

/// Size of the descriptor region for rings of `n` descriptors
#[must_use]
pub const fn desc_region_size(n: usize) -> usize {
    round_up(2 * n * Descriptor::SIZE, PAGE_SIZE)
}

/// Size of the transaction buffer region for rings of `n` descriptors
#[must_use]
pub const fn txn_region_size(n: usize) -> usize {
    2 * n * TXN_BUF_SIZE
}

/// Circular descriptor ring with wraparound index.
///
/// Descriptor `i` is paired with buffer slot `i`; both live in pinned memory
/// kept alive by the shared region handles.
pub struct DescriptorRing<B: PinnedBuffer, const N: usize> {
    descs: Arc<B>,
    desc_base: usize,
    slots: Arc<B>,
    slot_base: usize,
    base_phys: u32,
    current: usize,
}

impl<B: PinnedBuffer, const N: usize> DescriptorRing<B, N> {
    /// Get the number of descriptors in the ring
    #[inline(always)]
    #[must_use]
    pub const fn len(&self) -> usize {
        N
    }

    /// Check if the ring is empty (always false for fixed-size ring)
    #[inline(always)]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        N == 0
    }

    /// Get the current index
    #[inline(always)]
    #[must_use]
    pub const fn current_index(&self) -> usize {
        self.current
    }

    /// Advance the current index by one, wrapping around
    #[inline(always)]
    pub fn advance(&mut self) {
        self.current = (self.current + 1) % N;
    }

    /// Physical address of descriptor 0, for the list base register
    #[inline(always)]
    #[must_use]
    pub const fn base_phys(&self) -> u32 {
        self.base_phys
    }

    /// Get a reference to a descriptor at a specific index
    #[inline]
    pub fn descriptor(&self, index: usize) -> &Descriptor {
        let offset = self.desc_base + (index % N) * Descriptor::SIZE;
        // SAFETY: `init` checked the region holds every descriptor of both
        // rings; the region is 4-byte aligned and outlives `self` through the
        // Arc. Descriptor fields are volatile cells, so shared references are
        // sound while the DMA engine writes them.
        unsafe { &*self.descs.virt().as_ptr().add(offset).cast::<Descriptor>() }
    }

    /// Get a reference to the current descriptor
    #[inline(always)]
    pub fn current(&self) -> &Descriptor {
        self.descriptor(self.current)
    }

    /// Byte offset of slot `index` within the transaction region
    #[inline(always)]
    #[must_use]
    pub fn slot_offset(&self, index: usize) -> usize {
        self.slot_base + (index % N) * TXN_BUF_SIZE
    }

    /// CPU pointer to the first byte of slot `index`
    #[inline(always)]
    pub(crate) fn slot_ptr(&self, index: usize) -> NonNull<u8> {
        // SAFETY: `init` checked the region covers every slot of both rings.
        unsafe { self.slots.virt().add(self.slot_offset(index)) }
    }

    /// Contents of slot `index`.
    ///
    /// Only meaningful while the paired descriptor is software-owned.
    #[inline]
    pub fn slot(&self, index: usize) -> &[u8] {
        // SAFETY: the slot lies inside the pinned region kept alive by the Arc.
        unsafe { core::slice::from_raw_parts(self.slot_ptr(index).as_ptr(), TXN_BUF_SIZE) }
    }

    /// Cache maintenance over the first `len` bytes of slot `index`
    #[inline]
    pub fn flush_slot(&self, index: usize, len: usize, op: CacheOp) {
        self.slots
            .cache_flush(self.slot_offset(index), len.min(TXN_BUF_SIZE), op);
    }
}

/// The TX/RX ring pair built over one descriptor region and one transaction
/// region.
pub struct DmaRings<B: PinnedBuffer, const N: usize> {
    /// Transmit ring
    pub tx: TxRing<B, N>,
    /// Receive ring
    pub rx: RxRing<B, N>,
}

impl<B: PinnedBuffer, const N: usize> DmaRings<B, N> {
    /// Build both rings in one pass over the pinned regions.
    ///
    /// Each descriptor is pointed at its paired slot and at its successor
    /// within its own ring, closing the chain at `N - 1 -> 0`. TX descriptors
    /// start software-owned and empty; RX descriptors start hardware-owned
    /// and sized for a full frame.
    pub fn init(descs: Arc<B>, slots: Arc<B>) -> DmaResult<Self> {
        const { assert!(N > 0, "descriptor rings need at least one entry") };

        if descs.len() < 2 * N * Descriptor::SIZE || slots.len() < txn_region_size(N) {
            return Err(DmaError::RegionTooSmall);
        }

        slots.cache_flush(0, txn_region_size(N), CacheOp::CleanInvalidate);

        let tx = DescriptorRing::<B, N> {
            descs: Arc::clone(&descs),
            desc_base: 0,
            slots: Arc::clone(&slots),
            slot_base: 0,
            base_phys: phys32(&*descs, 0)?,
            current: 0,
        };
        let rx = DescriptorRing::<B, N> {
            descs: Arc::clone(&descs),
            desc_base: N * Descriptor::SIZE,
            slots: Arc::clone(&slots),
            slot_base: N * TXN_BUF_SIZE,
            base_phys: phys32(&*descs, N * Descriptor::SIZE)?,
            current: 0,
        };

        for i in 0..N {
            let next = (i + 1) % N;

            let tx_desc = tx.descriptor(i);
            tx_desc.link(
                phys32(&*slots, tx.slot_offset(i))?,
                phys32(&*descs, next * Descriptor::SIZE)?,
            );
            tx_desc.reset_software(TX_CONTROL_IDLE);

            let rx_desc = rx.descriptor(i);
            rx_desc.link(
                phys32(&*slots, rx.slot_offset(i))?,
                phys32(&*descs, (N + next) * Descriptor::SIZE)?,
            );
            rx_desc.hand_to_hardware(RX_CONTROL);
        }

        Ok(Self {
            tx: TxRing::new(tx),
            rx: RxRing::new(rx),
        })
    }
}
