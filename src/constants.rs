//! Centralized Constants
//!
//! Single source of truth for the sizes, timeouts and polling intervals used
//! throughout the driver.
//!
//! # Organization
//!
//! - **Frame/Buffer sizes**: Ethernet frame dimensions and ring slot sizes
//! - **Ring geometry**: Default descriptor count, page rounding
//! - **Timing**: MDIO deadline, soft reset retry budget, PHY reset pulse
//!
//! # Note
//!
//! Hardware register bit definitions remain in their respective modules
//! (`register/dma.rs`, `register/mac.rs`, `descriptor/bits.rs`).

// =============================================================================
// Frame and Buffer Sizes
// =============================================================================

/// Standard Ethernet MTU reported by `query`
pub const MTU: u32 = 1500;

/// Largest frame the MAC is programmed to receive into one RX slot
pub const MAX_FRAME_SIZE: usize = 1600;

/// Size of one TX/RX buffer slot in the pinned transaction region
pub const TXN_BUF_SIZE: usize = 2048;

/// Frame check sequence trailing every received frame
pub const FCS_SIZE: usize = 4;

/// MAC address length in bytes
pub const MAC_ADDR_LEN: usize = 6;

// =============================================================================
// Ring Geometry
// =============================================================================

/// Default number of descriptors per ring
pub const DEFAULT_NUM_DESC: usize = 32;

/// Page size used to round the descriptor region
pub const PAGE_SIZE: usize = 4096;

/// Offset of the DMA register block within the register window
pub const DMA_BLOCK_OFFSET: usize = 0x1000;

// =============================================================================
// Timing Constants
// =============================================================================

/// MDIO operation deadline in microseconds
pub const MDIO_TIMEOUT_US: u32 = 3_000;

/// Busy-bit poll interval for MDIO operations in microseconds
pub const MDIO_POLL_INTERVAL_US: u32 = 10;

/// Number of polls waiting for the DMA soft reset bit to clear
pub const SOFT_RESET_ATTEMPTS: u32 = 10;

/// Interval between soft reset polls in milliseconds
pub const SOFT_RESET_POLL_MS: u32 = 10;

/// Hold and settle time for the PHY reset pulse in milliseconds
pub const PHY_RESET_PULSE_MS: u32 = 100;

/// Default PHY address on the MDIO bus
pub const DEFAULT_PHY_ADDR: u8 = 0;

/// Name given to the interrupt service thread
pub const SERVICE_THREAD_NAME: &str = "dwmac-service";

/// Round `value` up to the next multiple of `align` (power of two)
pub const fn round_up(value: usize, align: usize) -> usize {
    (value + align - 1) & !(align - 1)
}
