//! MDIO (Management Data Input/Output) HAL
//!
//! Clause 22 PHY register access through the MAC's MII address/data
//! registers. Every transaction is a bounded busy-bit poll: the calling thread
//! sleeps in short intervals until the hardware clears the busy bit or the
//! deadline, measured on the delay provider's [`Clock`], passes.

use embedded_hal::delay::DelayNs;

use super::delay::Clock;

use crate::constants::{MDIO_POLL_INTERVAL_US, MDIO_TIMEOUT_US};
use crate::error::{ConfigError, IoError, Result};
use crate::register::RegisterIo;
use crate::register::mac::{
    GMACMIIADDR_CR_MASK, GMACMIIADDR_CR_SHIFT, GMACMIIADDR_GB, GMACMIIADDR_GR_MASK,
    GMACMIIADDR_GR_SHIFT, GMACMIIADDR_GW, GMACMIIADDR_PA_MASK, GMACMIIADDR_PA_SHIFT, MacRegs,
};

/// Maximum valid PHY address (5-bit field)
pub const MAX_PHY_ADDR: u8 = 31;

/// Maximum valid register address (5-bit field)
pub const MAX_REG_ADDR: u8 = 31;

/// MDC clock divider values based on the CSR clock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum MdcClockDivider {
    /// Clock/42 (60-100 MHz)
    Div42 = 0,
    /// Clock/62 (100-150 MHz)
    Div62 = 1,
    /// Clock/16 (20-35 MHz)
    Div16 = 2,
    /// Clock/26 (35-60 MHz)
    Div26 = 3,
    /// Clock/102 (150-250 MHz)
    #[default]
    Div102 = 4,
    /// Clock/124 (250-300 MHz)
    Div124 = 5,
}

impl MdcClockDivider {
    /// Get the divider value for register programming
    pub const fn to_reg_value(self) -> u32 {
        self as u32
    }
}

// =============================================================================
// MDIO Bus Trait
// =============================================================================

/// Trait for MDIO bus operations
pub trait MdioBus {
    /// Read a PHY register
    fn read(&mut self, phy_addr: u8, reg_addr: u8) -> Result<u16>;

    /// Write a PHY register
    fn write(&mut self, phy_addr: u8, reg_addr: u8, value: u16) -> Result<()>;

    /// Check if the MDIO bus is busy
    fn is_busy(&self) -> bool;
}

// =============================================================================
// MDIO Controller
// =============================================================================

/// MDIO controller over the MAC's MII management registers
#[derive(Debug)]
pub struct MdioController<'a, R: RegisterIo, D: DelayNs + Clock> {
    regs: &'a R,
    clock_divider: MdcClockDivider,
    delay: D,
    timeout_us: u32,
    poll_interval_us: u32,
}

impl<'a, R: RegisterIo, D: DelayNs + Clock> MdioController<'a, R, D> {
    /// Create a controller with the default divider and deadline
    pub fn new(regs: &'a R, delay: D) -> Self {
        Self {
            regs,
            clock_divider: MdcClockDivider::default(),
            delay,
            timeout_us: MDIO_TIMEOUT_US,
            poll_interval_us: MDIO_POLL_INTERVAL_US,
        }
    }

    /// Use a specific MDC clock divider
    #[must_use]
    pub fn with_clock_divider(mut self, divider: MdcClockDivider) -> Self {
        self.clock_divider = divider;
        self
    }

    /// Use a specific deadline and poll interval
    #[must_use]
    pub fn with_timing(mut self, timeout_us: u32, poll_interval_us: u32) -> Self {
        self.timeout_us = timeout_us;
        self.poll_interval_us = poll_interval_us.max(1);
        self
    }

    /// Wait for the busy bit to clear
    fn wait_not_busy(&mut self) -> Result<()> {
        let mac = MacRegs::new(self.regs);
        let deadline = self
            .delay
            .now_us()
            .saturating_add(u64::from(self.timeout_us));
        while mac.mii_busy() {
            if self.delay.now_us() >= deadline {
                return Err(IoError::Timeout.into());
            }
            self.delay.delay_us(self.poll_interval_us);
        }
        Ok(())
    }

    /// Build the GMACMIIADDR register value
    fn build_mii_addr(&self, phy_addr: u8, reg_addr: u8, is_write: bool) -> u32 {
        let mut addr = 0u32;

        addr |= (u32::from(phy_addr) << GMACMIIADDR_PA_SHIFT) & GMACMIIADDR_PA_MASK;
        addr |= (u32::from(reg_addr) << GMACMIIADDR_GR_SHIFT) & GMACMIIADDR_GR_MASK;
        addr |= (self.clock_divider.to_reg_value() << GMACMIIADDR_CR_SHIFT) & GMACMIIADDR_CR_MASK;

        if is_write {
            addr |= GMACMIIADDR_GW;
        }

        // Busy flag triggers the operation
        addr | GMACMIIADDR_GB
    }

    fn validate(phy_addr: u8, reg_addr: u8) -> Result<()> {
        if phy_addr > MAX_PHY_ADDR {
            return Err(ConfigError::InvalidPhyAddress.into());
        }
        if reg_addr > MAX_REG_ADDR {
            return Err(ConfigError::InvalidConfig.into());
        }
        Ok(())
    }
}

impl<R: RegisterIo, D: DelayNs + Clock> MdioBus for MdioController<'_, R, D> {
    fn read(&mut self, phy_addr: u8, reg_addr: u8) -> Result<u16> {
        Self::validate(phy_addr, reg_addr)?;

        let mac = MacRegs::new(self.regs);
        mac.set_mii_address(self.build_mii_addr(phy_addr, reg_addr, false));
        self.wait_not_busy()?;

        Ok((mac.mii_data() & 0xFFFF) as u16)
    }

    fn write(&mut self, phy_addr: u8, reg_addr: u8, value: u16) -> Result<()> {
        Self::validate(phy_addr, reg_addr)?;

        let mac = MacRegs::new(self.regs);
        mac.set_mii_data(u32::from(value));
        mac.set_mii_address(self.build_mii_addr(phy_addr, reg_addr, true));
        self.wait_not_busy()
    }

    fn is_busy(&self) -> bool {
        MacRegs::new(self.regs).mii_busy()
    }
}

// =============================================================================
// PHY Register Definitions (IEEE 802.3 standard registers)
// =============================================================================

/// Standard PHY register addresses (IEEE 802.3 Clause 22)
pub mod phy_reg {
    /// Basic Mode Control Register
    pub const BMCR: u8 = 0;
    /// Basic Mode Status Register
    pub const BMSR: u8 = 1;
    /// 1000BASE-T Control Register
    pub const GBCR: u8 = 9;
}

/// BMCR (Basic Mode Control Register) bits
pub mod bmcr {
    /// Soft reset
    pub const RESET: u16 = 1 << 15;
    /// Auto-negotiation enable
    pub const AN_ENABLE: u16 = 1 << 12;
    /// Isolate
    pub const ISOLATE: u16 = 1 << 10;
    /// Restart auto-negotiation
    pub const AN_RESTART: u16 = 1 << 9;
}

/// GBCR (1000BASE-T Control Register) bits
pub mod gbcr {
    /// Advertise 1000BASE-T full duplex
    pub const ADV_1000_FULL: u16 = 1 << 9;
}

// =============================================================================
// PHY Helper Functions
// =============================================================================

/// Advertise 1000BASE-T full duplex
pub fn advertise_gigabit<M: MdioBus>(mdio: &mut M, phy_addr: u8) -> Result<()> {
    mdio.write(phy_addr, phy_reg::GBCR, gbcr::ADV_1000_FULL)
}

/// Enable and restart auto-negotiation, taking the PHY out of isolation
pub fn restart_auto_negotiation<M: MdioBus>(mdio: &mut M, phy_addr: u8) -> Result<()> {
    let ctrl = mdio.read(phy_addr, phy_reg::BMCR)?;
    mdio.write(
        phy_addr,
        phy_reg::BMCR,
        (ctrl | bmcr::AN_ENABLE | bmcr::AN_RESTART) & !bmcr::ISOLATE,
    )
}

// =============================================================================
// Unit Tests
// =============================================================================
