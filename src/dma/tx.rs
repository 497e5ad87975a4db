//! Transmit ring submission.

use super::buffer::{CacheOp, PinnedBuffer};
use super::ring::DescriptorRing;
use crate::constants::TXN_BUF_SIZE;
use crate::descriptor::{Ownership, bits::control};
use crate::error::{DmaError, DmaResult};
use crate::register::RegisterIo;
use crate::register::dma::DmaRegs;

/// Transmit side of the ring pair.
///
/// Callers serialize access (the device keeps it under its state lock), so
/// the TX cursor has exactly one writer at a time.
pub struct TxRing<B: PinnedBuffer, const N: usize> {
    ring: DescriptorRing<B, N>,
}

impl<B: PinnedBuffer, const N: usize> TxRing<B, N> {
    pub(crate) fn new(ring: DescriptorRing<B, N>) -> Self {
        Self { ring }
    }

    /// The underlying descriptor ring
    #[must_use]
    pub fn ring(&self) -> &DescriptorRing<B, N> {
        &self.ring
    }

    /// Copy `frame` into the slot at the cursor and hand it to the DMA engine.
    ///
    /// Returns the ring index used. Frames longer than one slot are rejected
    /// before anything is touched.
    ///
    /// The target descriptor is not checked for an unfinished transmission:
    /// submitting faster than the engine drains overwrites queued frames.
    /// [`pending`](Self::pending) reports how many descriptors the engine
    /// still holds.
    pub fn submit<R: RegisterIo>(&mut self, regs: &R, frame: &[u8]) -> DmaResult<usize> {
        if frame.len() > TXN_BUF_SIZE {
            return Err(DmaError::FrameTooLarge);
        }

        let index = self.ring.current_index();
        // SAFETY: the slot is TXN_BUF_SIZE bytes inside the pinned region and
        // `frame` was checked to fit. `frame` cannot alias pinned DMA memory
        // the ring owns.
        unsafe {
            core::ptr::copy_nonoverlapping(
                frame.as_ptr(),
                self.ring.slot_ptr(index).as_ptr(),
                frame.len(),
            );
        }
        self.ring.flush_slot(index, frame.len(), CacheOp::Clean);

        self.ring
            .descriptor(index)
            .hand_to_hardware(control::tx_frame(frame.len()));
        self.ring.advance();

        DmaRegs::new(regs).tx_poll_demand();
        Ok(index)
    }

    /// Number of descriptors the DMA engine still owns
    #[must_use]
    pub fn pending(&self) -> usize {
        (0..N)
            .filter(|&i| self.ring.descriptor(i).ownership() == Ownership::Hardware)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::DMA_BLOCK_OFFSET;
    use crate::descriptor::bits::status;
    use crate::register::dma::DMATXPOLLDEMAND_OFFSET;
    use crate::testing::{MockRegisters, test_rings};

    const N: usize = 4;

    #[test]
    fn submit_copies_and_hands_off() {
        let (bti, mut rings) = test_rings::<N>();
        let regs = MockRegisters::new();
        let frame: Vec<u8> = (0..200u8).collect();

        assert_eq!(rings.tx.submit(&regs, &frame), Ok(0));

        let d = rings.tx.ring().descriptor(0);
        assert_eq!(d.ownership(), Ownership::Hardware);
        assert_eq!(d.status(), status::OWN);
        assert_eq!(d.control(), control::tx_frame(200));
        assert_eq!(rings.tx.ring().slot(0)[..200], frame[..]);
        assert_eq!(bti.pinned(1).read(0, 200), frame);
        assert_eq!(rings.tx.ring().current_index(), 1);
        assert_eq!(regs.writes_to(DMA_BLOCK_OFFSET + DMATXPOLLDEMAND_OFFSET), 1);
    }

    #[test]
    fn submit_flushes_only_copied_range() {
        let (bti, mut rings) = test_rings::<N>();
        let regs = MockRegisters::new();
        let slots = bti.pinned(1);
        slots.clear_cache_log();

        rings.tx.submit(&regs, &[1u8; 60]).unwrap();
        rings.tx.submit(&regs, &[2u8; 70]).unwrap();

        assert_eq!(
            slots.cache_log(),
            vec![(0, 60, CacheOp::Clean), (TXN_BUF_SIZE, 70, CacheOp::Clean)]
        );
    }

    #[test]
    fn full_slot_frame_accepted() {
        let (_bti, mut rings) = test_rings::<N>();
        let regs = MockRegisters::new();
        let frame = vec![0x5A; TXN_BUF_SIZE];

        assert!(rings.tx.submit(&regs, &frame).is_ok());
        assert_eq!(rings.tx.ring().slot(0), &frame[..]);
    }

    #[test]
    fn oversized_frame_leaves_ring_untouched() {
        let (_bti, mut rings) = test_rings::<N>();
        let regs = MockRegisters::new();

        let result = rings.tx.submit(&regs, &vec![0; TXN_BUF_SIZE + 1]);

        assert_eq!(result, Err(DmaError::FrameTooLarge));
        assert_eq!(rings.tx.ring().current_index(), 0);
        assert_eq!(rings.tx.pending(), 0);
        assert_eq!(regs.writes_to(DMA_BLOCK_OFFSET + DMATXPOLLDEMAND_OFFSET), 0);
    }

    #[test]
    fn cursor_wraps_without_waiting_for_completion() {
        let (_bti, mut rings) = test_rings::<N>();
        let regs = MockRegisters::new();

        for i in 0..N {
            assert_eq!(rings.tx.submit(&regs, &[i as u8; 16]), Ok(i));
        }
        assert_eq!(rings.tx.pending(), N);

        // Slot 0 is still owned by the engine and gets overwritten.
        assert_eq!(rings.tx.submit(&regs, &[0xFF; 16]), Ok(0));
        assert_eq!(rings.tx.ring().slot(0)[..16], [0xFF; 16]);
    }

    #[test]
    fn pending_drops_as_engine_completes() {
        let (_bti, mut rings) = test_rings::<N>();
        let regs = MockRegisters::new();
        rings.tx.submit(&regs, &[0; 10]).unwrap();
        rings.tx.submit(&regs, &[0; 10]).unwrap();
        assert_eq!(rings.tx.pending(), 2);

        rings.tx.ring().descriptor(0).complete_tx();
        assert_eq!(rings.tx.pending(), 1);
    }
}
