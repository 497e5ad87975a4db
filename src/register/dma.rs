//! DMA Controller Register Definitions
//!
//! The DMA controller moves frames between the MAC FIFOs and system memory by
//! walking the chained descriptor rings.

use super::{DMA_BLOCK_OFFSET, RegisterIo, reg_bit_ops, reg_ro, reg_rw};

// =============================================================================
// Register Offsets (relative to the DMA block)
// =============================================================================

/// Bus Mode Register offset
pub const DMABUSMODE_OFFSET: usize = 0x00;
/// TX Poll Demand Register offset
pub const DMATXPOLLDEMAND_OFFSET: usize = 0x04;
/// RX Poll Demand Register offset
pub const DMARXPOLLDEMAND_OFFSET: usize = 0x08;
/// RX Descriptor List Address Register offset
pub const DMARXBASEADDR_OFFSET: usize = 0x0C;
/// TX Descriptor List Address Register offset
pub const DMATXBASEADDR_OFFSET: usize = 0x10;
/// Status Register offset
pub const DMASTATUS_OFFSET: usize = 0x14;
/// Operation Mode Register offset
pub const DMAOPERATION_OFFSET: usize = 0x18;
/// Interrupt Enable Register offset
pub const DMAINTENABLE_OFFSET: usize = 0x1C;
/// Missed Frame and Buffer Overflow Counter Register offset
pub const DMAMISSEDFR_OFFSET: usize = 0x20;

// =============================================================================
// Bus Mode Register (DMABUSMODE) Bits
// =============================================================================

/// Software Reset - resets all MAC and DMA logic, cleared by hardware
pub const DMABUSMODE_SW_RST: u32 = 1 << 0;
/// Programmable Burst Length shift
pub const DMABUSMODE_PBL_SHIFT: u32 = 8;
/// Programmable Burst Length mask
pub const DMABUSMODE_PBL_MASK: u32 = 0x3F << 8;
/// Burst length of 8 beats
pub const DMABUSMODE_PBL_8: u32 = 8 << DMABUSMODE_PBL_SHIFT;
/// RX:TX priority ratio 4:1
pub const DMABUSMODE_PR_4_1: u32 = 3 << 14;
/// Fixed Burst
pub const DMABUSMODE_FB: u32 = 1 << 16;

/// Bus mode programmed at bring-up
pub const DMABUSMODE_DEFAULT: u32 = DMABUSMODE_FB | DMABUSMODE_PR_4_1 | DMABUSMODE_PBL_8;

// =============================================================================
// Status Register (DMASTATUS) Bits
// =============================================================================

/// Transmit Interrupt - frame transmission complete
pub const DMASTATUS_TI: u32 = 1 << 0;
/// Transmit Process Stopped
pub const DMASTATUS_TPS: u32 = 1 << 1;
/// Transmit Buffer Unavailable
pub const DMASTATUS_TU: u32 = 1 << 2;
/// Receive Overflow
pub const DMASTATUS_OVF: u32 = 1 << 4;
/// Transmit Underflow
pub const DMASTATUS_UNF: u32 = 1 << 5;
/// Receive Interrupt - frame reception complete
pub const DMASTATUS_RI: u32 = 1 << 6;
/// Receive Buffer Unavailable
pub const DMASTATUS_RU: u32 = 1 << 7;
/// Fatal Bus Error Interrupt
pub const DMASTATUS_FBI: u32 = 1 << 13;
/// Abnormal Interrupt Summary
pub const DMASTATUS_AIS: u32 = 1 << 15;
/// Normal Interrupt Summary
pub const DMASTATUS_NIS: u32 = 1 << 16;
/// GMAC Line Interface Interrupt (link status change)
pub const DMASTATUS_GLI: u32 = 1 << 26;

// =============================================================================
// Operation Mode Register (DMAOPERATION) Bits
// =============================================================================

/// Start/Stop Receive
pub const DMAOPERATION_SR: u32 = 1 << 1;
/// Start/Stop Transmission
pub const DMAOPERATION_ST: u32 = 1 << 13;
/// Transmit Store and Forward
pub const DMAOPERATION_TSF: u32 = 1 << 21;
/// Receive Store and Forward
pub const DMAOPERATION_RSF: u32 = 1 << 25;

// =============================================================================
// Interrupt Enable Register (DMAINTENABLE) Bits
// =============================================================================

/// Transmit Interrupt Enable
pub const DMAINTEN_TIE: u32 = 1 << 0;
/// Receive Interrupt Enable
pub const DMAINTEN_RIE: u32 = 1 << 6;
/// Fatal Bus Error Enable
pub const DMAINTEN_FBE: u32 = 1 << 13;
/// Abnormal Interrupt Summary Enable
pub const DMAINTEN_AIE: u32 = 1 << 15;
/// Normal Interrupt Summary Enable
pub const DMAINTEN_NIE: u32 = 1 << 16;

/// Interrupt enable mask for normal operation
pub const DMAINTEN_DEFAULT: u32 =
    DMAINTEN_NIE | DMAINTEN_TIE | DMAINTEN_AIE | DMAINTEN_FBE | DMAINTEN_RIE;

// =============================================================================
// DMA Register Access
// =============================================================================

/// Typed view of the DMA register block
pub struct DmaRegs<'a, R: RegisterIo> {
    io: &'a R,
}

impl<'a, R: RegisterIo> DmaRegs<'a, R> {
    const BASE: usize = DMA_BLOCK_OFFSET;

    /// View the DMA block of the given register window
    #[inline(always)]
    pub fn new(io: &'a R) -> Self {
        Self { io }
    }

    reg_rw!(bus_mode, set_bus_mode, DMABUSMODE_OFFSET, "Bus Mode register");
    reg_rw!(status, set_status, DMASTATUS_OFFSET, "Status register");
    reg_rw!(operation_mode, set_operation_mode, DMAOPERATION_OFFSET, "Operation Mode register");
    reg_rw!(interrupt_enable, set_interrupt_enable, DMAINTENABLE_OFFSET, "Interrupt Enable register");
    reg_rw!(rx_desc_list_addr, set_rx_desc_list_addr, DMARXBASEADDR_OFFSET, "RX Descriptor List Address");
    reg_rw!(tx_desc_list_addr, set_tx_desc_list_addr, DMATXBASEADDR_OFFSET, "TX Descriptor List Address");

    reg_ro!(missed_frames, DMAMISSEDFR_OFFSET, "Missed Frame counter");

    reg_bit_ops!(start_tx, stop_tx, DMAOPERATION_OFFSET, DMAOPERATION_ST, "TX DMA", "Start", "Stop");
    reg_bit_ops!(start_rx, stop_rx, DMAOPERATION_OFFSET, DMAOPERATION_SR, "RX DMA", "Start", "Stop");

    /// Issue TX poll demand (any value wakes a suspended TX DMA)
    #[inline(always)]
    pub fn tx_poll_demand(&self) {
        self.io.write32(Self::BASE + DMATXPOLLDEMAND_OFFSET, !0);
    }

    /// Read the status register and acknowledge every bit that was set.
    ///
    /// Status bits are write-one-to-clear, so writing back the value just read
    /// clears exactly the events being handled.
    #[inline]
    pub fn take_status(&self) -> u32 {
        let status = self.status();
        self.set_status(status);
        status
    }

    /// Set the software reset bit
    #[inline(always)]
    pub fn request_soft_reset(&self) {
        self.io.modify32(Self::BASE + DMABUSMODE_OFFSET, |v| v | DMABUSMODE_SW_RST);
    }

    /// Check if the software reset is still in progress
    #[inline(always)]
    pub fn is_reset_in_progress(&self) -> bool {
        self.bus_mode() & DMABUSMODE_SW_RST != 0
    }
}
