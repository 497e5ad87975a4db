//! Descriptor bit field constants.
//!
//! The DWMAC "normal" descriptor layout in chained mode. TX and RX share the
//! word positions; only the control flags differ.

/// Word 0 (status) bit field constants
pub mod status {
    /// Error Summary - logical OR of the per-frame error bits
    pub const ERR_SUMMARY: u32 = 1 << 15;
    /// Frame Length shift (RX, 14 bits)
    pub const FRAME_LEN_SHIFT: u32 = 16;
    /// Frame Length mask (RX)
    pub const FRAME_LEN_MASK: u32 = 0x3FFF << 16;
    /// OWN - when set, descriptor owned by DMA; when clear, owned by CPU
    pub const OWN: u32 = 1 << 31;
}

/// Word 1 (control) bit field constants
pub mod control {
    /// Buffer 1 Size mask (13 bits)
    pub const BUFFER1_SIZE_MASK: u32 = 0x1FFF;
    /// Second Address Chained - word 3 holds the next descriptor address
    pub const CHAINED: u32 = 1 << 24;
    /// First Segment (TX) - buffer holds the start of a frame
    pub const FIRST_SEGMENT: u32 = 1 << 29;
    /// Last Segment (TX) - buffer holds the end of a frame
    pub const LAST_SEGMENT: u32 = 1 << 30;
    /// Interrupt on Completion (TX)
    pub const INTERRUPT_ON_COMPLETE: u32 = 1 << 31;

    /// Control word for a single-buffer TX frame of `len` bytes
    #[inline(always)]
    #[must_use]
    pub const fn tx_frame(len: usize) -> u32 {
        INTERRUPT_ON_COMPLETE
            | LAST_SEGMENT
            | FIRST_SEGMENT
            | CHAINED
            | (len as u32 & BUFFER1_SIZE_MASK)
    }

    /// Control word for an RX buffer able to take `size` bytes
    #[inline(always)]
    #[must_use]
    pub const fn rx_buffer(size: usize) -> u32 {
        (size as u32 & BUFFER1_SIZE_MASK) | CHAINED
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tx_control_carries_all_flags() {
        let c = control::tx_frame(60);
        assert_eq!(c & control::BUFFER1_SIZE_MASK, 60);
        assert_ne!(c & control::FIRST_SEGMENT, 0);
        assert_ne!(c & control::LAST_SEGMENT, 0);
        assert_ne!(c & control::CHAINED, 0);
        assert_ne!(c & control::INTERRUPT_ON_COMPLETE, 0);
    }

    #[test]
    fn size_field_fits_full_slot() {
        let c = control::tx_frame(crate::constants::TXN_BUF_SIZE);
        assert_eq!(
            (c & control::BUFFER1_SIZE_MASK) as usize,
            crate::constants::TXN_BUF_SIZE
        );
    }

    #[test]
    fn rx_control_is_chained_max_frame() {
        let c = control::rx_buffer(crate::constants::MAX_FRAME_SIZE);
        assert_eq!(c, 1600 | control::CHAINED);
    }
}
