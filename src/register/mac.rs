//! MAC Core Register Definitions
//!
//! Configuration, frame filter, MII management, station address and
//! line-interface status registers of the GMAC core.

use super::{RegisterIo, reg_bit_ops, reg_rw};

// =============================================================================
// Register Offsets
// =============================================================================

/// GMAC Configuration Register offset
pub const GMACCONFIG_OFFSET: usize = 0x00;
/// GMAC Frame Filter Register offset
pub const GMACFF_OFFSET: usize = 0x04;
/// GMAC MII Address Register offset
pub const GMACMIIADDR_OFFSET: usize = 0x10;
/// GMAC MII Data Register offset
pub const GMACMIIDATA_OFFSET: usize = 0x14;
/// GMAC Address 0 High Register offset
pub const GMACADDR0H_OFFSET: usize = 0x40;
/// GMAC Address 0 Low Register offset
pub const GMACADDR0L_OFFSET: usize = 0x44;
/// GMAC RGMII/SGMII Status Register offset
pub const GMACRGMIIS_OFFSET: usize = 0xD8;

// =============================================================================
// GMAC Configuration Register (GMACCONFIG) Bits
// =============================================================================

/// Receiver Enable
pub const GMACCONFIG_RE: u32 = 1 << 2;
/// Transmitter Enable
pub const GMACCONFIG_TE: u32 = 1 << 3;
/// Duplex Mode (full duplex if set)
pub const GMACCONFIG_DM: u32 = 1 << 11;
/// Port Select (0 = GMII 1000 Mbps, 1 = MII 10/100 Mbps)
pub const GMACCONFIG_PS: u32 = 1 << 15;
/// Jabber Disable
pub const GMACCONFIG_JD: u32 = 1 << 22;
/// Watchdog Disable
pub const GMACCONFIG_WD: u32 = 1 << 23;

/// Core settings applied at bring-up alongside TE/RE
pub const GMACCONFIG_CORE_INIT: u32 = GMACCONFIG_JD | GMACCONFIG_WD | GMACCONFIG_DM;

// =============================================================================
// GMAC Frame Filter Register (GMACFF) Bits
// =============================================================================

/// Receive All - pass every frame regardless of filter result
pub const GMACFF_RA: u32 = 1 << 31;

// =============================================================================
// GMAC MII Address Register (GMACMIIADDR) Bits
// =============================================================================

/// MII Busy - set by software to start a transaction, cleared by hardware
pub const GMACMIIADDR_GB: u32 = 1 << 0;
/// MII Write - 1 = write, 0 = read
pub const GMACMIIADDR_GW: u32 = 1 << 1;
/// CSR Clock Range shift
pub const GMACMIIADDR_CR_SHIFT: u32 = 2;
/// CSR Clock Range mask
pub const GMACMIIADDR_CR_MASK: u32 = 0xF << 2;
/// MII Register shift
pub const GMACMIIADDR_GR_SHIFT: u32 = 6;
/// MII Register mask
pub const GMACMIIADDR_GR_MASK: u32 = 0x1F << 6;
/// Physical Layer Address shift
pub const GMACMIIADDR_PA_SHIFT: u32 = 11;
/// Physical Layer Address mask
pub const GMACMIIADDR_PA_MASK: u32 = 0x1F << 11;

// =============================================================================
// GMAC RGMII Status Register Bits
// =============================================================================

/// Link Status - 1 = link up
pub const GMACRGMIIS_LNKSTS: u32 = 1 << 3;

// =============================================================================
// MAC Register Access
// =============================================================================

/// Typed view of the MAC core register block
pub struct MacRegs<'a, R: RegisterIo> {
    io: &'a R,
}

impl<'a, R: RegisterIo> MacRegs<'a, R> {
    const BASE: usize = 0;

    /// View the MAC block of the given register window
    #[inline(always)]
    pub fn new(io: &'a R) -> Self {
        Self { io }
    }

    reg_rw!(config, set_config, GMACCONFIG_OFFSET, "GMAC Configuration register");
    reg_rw!(frame_filter, set_frame_filter, GMACFF_OFFSET, "Frame Filter register");
    reg_rw!(mii_address, set_mii_address, GMACMIIADDR_OFFSET, "MII Address register");
    reg_rw!(mii_data, set_mii_data, GMACMIIDATA_OFFSET, "MII Data register");
    reg_rw!(addr0_high, set_addr0_high, GMACADDR0H_OFFSET, "MAC Address 0 High register");
    reg_rw!(addr0_low, set_addr0_low, GMACADDR0L_OFFSET, "MAC Address 0 Low register");
    reg_rw!(rgmii_status, set_rgmii_status, GMACRGMIIS_OFFSET, "RGMII Status register");

    reg_bit_ops!(enable_tx, disable_tx, GMACCONFIG_OFFSET, GMACCONFIG_TE, "transmitter", "Enable", "Disable");
    reg_bit_ops!(enable_rx, disable_rx, GMACCONFIG_OFFSET, GMACCONFIG_RE, "receiver", "Enable", "Disable");

    /// Check the line-interface link status bit
    #[inline]
    pub fn link_up(&self) -> bool {
        self.rgmii_status() & GMACRGMIIS_LNKSTS != 0
    }

    /// Check if an MII management transaction is in flight
    #[inline]
    pub fn mii_busy(&self) -> bool {
        self.mii_address() & GMACMIIADDR_GB != 0
    }

    /// Read the station address from the address-0 registers.
    ///
    /// The low word holds bytes 0..=3, the high word bytes 4..=5.
    pub fn mac_address(&self) -> [u8; 6] {
        let lo = self.addr0_low().to_le_bytes();
        let hi = self.addr0_high().to_le_bytes();
        [lo[0], lo[1], lo[2], lo[3], hi[0], hi[1]]
    }

    /// Raw (high, low) address words, for save/restore across a soft reset
    pub fn mac_address_words(&self) -> (u32, u32) {
        (self.addr0_high(), self.addr0_low())
    }

    /// Restore raw (high, low) address words
    pub fn set_mac_address_words(&self, words: (u32, u32)) {
        self.set_addr0_high(words.0);
        self.set_addr0_low(words.1);
    }
}
