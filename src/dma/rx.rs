//! Receive ring servicing.

use super::buffer::{CacheOp, PinnedBuffer};
use super::ring::DescriptorRing;
use crate::constants::{FCS_SIZE, TXN_BUF_SIZE};
use crate::descriptor::{RX_CONTROL, frame_length, has_error};

/// Receive side of the ring pair.
///
/// Owned by the interrupt service thread; the single owner is the only code
/// that moves the RX cursor.
pub struct RxRing<B: PinnedBuffer, const N: usize> {
    ring: DescriptorRing<B, N>,
}

impl<B: PinnedBuffer, const N: usize> RxRing<B, N> {
    pub(crate) fn new(ring: DescriptorRing<B, N>) -> Self {
        Self { ring }
    }

    /// The underlying descriptor ring
    #[must_use]
    pub fn ring(&self) -> &DescriptorRing<B, N> {
        &self.ring
    }

    #[cfg(test)]
    pub(crate) fn ring_mut(&mut self) -> &mut DescriptorRing<B, N> {
        &mut self.ring
    }

    /// Drain every frame the DMA engine has completed.
    ///
    /// Starting at the cursor, each software-owned descriptor has its payload
    /// (frame length minus FCS) passed to `deliver`, its slot invalidated,
    /// and is handed back to the hardware before the cursor moves on. Stops
    /// at the first descriptor the hardware still owns. Returns the number
    /// of descriptors drained.
    ///
    /// `deliver` runs once per frame and may drop it; the descriptor is
    /// re-armed either way. At most `N` descriptors are visited per call.
    pub fn drain<F>(&mut self, mut deliver: F) -> usize
    where
        F: FnMut(&[u8]),
    {
        let mut drained = 0;

        while drained < N {
            let index = self.ring.current_index();
            let Some(word) = self.ring.descriptor(index).take_from_hardware() else {
                break;
            };

            if has_error(word) {
                log::warn!("rx frame error: slot={index} status={word:#010x}");
            }

            let len = frame_length(word)
                .saturating_sub(FCS_SIZE)
                .min(TXN_BUF_SIZE);
            deliver(&self.ring.slot(index)[..len]);

            self.ring
                .flush_slot(index, TXN_BUF_SIZE, CacheOp::CleanInvalidate);
            self.ring.descriptor(index).hand_to_hardware(RX_CONTROL);
            self.ring.advance();
            drained += 1;
        }

        drained
    }
}
