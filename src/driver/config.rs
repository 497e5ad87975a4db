//! Configuration types for the DWMAC driver

use crate::constants::{
    DEFAULT_PHY_ADDR, FCS_SIZE, MAX_FRAME_SIZE, MDIO_POLL_INTERVAL_US, MDIO_TIMEOUT_US, MTU,
    PHY_RESET_PULSE_MS, SERVICE_THREAD_NAME, SOFT_RESET_ATTEMPTS, SOFT_RESET_POLL_MS,
};
use crate::error::{ConfigError, ConfigResult};
use crate::hal::mdio::{MAX_PHY_ADDR, MdcClockDivider};

/// Ethernet header length, used to bound the reported MTU
const ETH_HEADER_LEN: usize = 14;

/// Device configuration
///
/// Build with [`DeviceConfig::new`] and the `with_*` methods:
///
/// ```ignore
/// let config = DeviceConfig::new()
///     .with_phy_addr(1)
///     .with_mac_address([0x02, 0x00, 0x00, 0x12, 0x34, 0x56]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceConfig {
    /// PHY address on the MDIO bus (0-31)
    pub phy_addr: u8,
    /// MAC address reported by `query`; read from the MAC registers if `None`
    pub mac_address: Option<[u8; 6]>,
    /// MDC clock divider
    pub mdc_divider: MdcClockDivider,
    /// MDIO busy-bit deadline in microseconds
    pub mdio_timeout_us: u32,
    /// MDIO busy-bit poll interval in microseconds
    pub mdio_poll_interval_us: u32,
    /// Number of polls waiting for the DMA soft reset to finish
    pub reset_attempts: u32,
    /// Interval between soft reset polls in milliseconds
    pub reset_poll_ms: u32,
    /// PHY reset hold and settle time in milliseconds
    pub phy_reset_pulse_ms: u32,
    /// MTU reported by `query`
    pub mtu: u32,
    /// Name of the interrupt service thread
    pub thread_name: &'static str,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceConfig {
    /// Create a configuration with default values
    #[must_use]
    pub const fn new() -> Self {
        Self {
            phy_addr: DEFAULT_PHY_ADDR,
            mac_address: None,
            mdc_divider: MdcClockDivider::Div102,
            mdio_timeout_us: MDIO_TIMEOUT_US,
            mdio_poll_interval_us: MDIO_POLL_INTERVAL_US,
            reset_attempts: SOFT_RESET_ATTEMPTS,
            reset_poll_ms: SOFT_RESET_POLL_MS,
            phy_reset_pulse_ms: PHY_RESET_PULSE_MS,
            mtu: MTU,
            thread_name: SERVICE_THREAD_NAME,
        }
    }

    /// Set the PHY address
    #[must_use]
    pub const fn with_phy_addr(mut self, addr: u8) -> Self {
        self.phy_addr = addr;
        self
    }

    /// Override the MAC address reported by `query`
    #[must_use]
    pub const fn with_mac_address(mut self, addr: [u8; 6]) -> Self {
        self.mac_address = Some(addr);
        self
    }

    /// Set the MDC clock divider
    #[must_use]
    pub const fn with_mdc_divider(mut self, divider: MdcClockDivider) -> Self {
        self.mdc_divider = divider;
        self
    }

    /// Set the MDIO deadline and poll interval
    #[must_use]
    pub const fn with_mdio_timing(mut self, timeout_us: u32, poll_interval_us: u32) -> Self {
        self.mdio_timeout_us = timeout_us;
        self.mdio_poll_interval_us = poll_interval_us;
        self
    }

    /// Set the soft reset retry budget
    #[must_use]
    pub const fn with_reset_polling(mut self, attempts: u32, interval_ms: u32) -> Self {
        self.reset_attempts = attempts;
        self.reset_poll_ms = interval_ms;
        self
    }

    /// Set the PHY reset pulse duration
    #[must_use]
    pub const fn with_phy_reset_pulse_ms(mut self, ms: u32) -> Self {
        self.phy_reset_pulse_ms = ms;
        self
    }

    /// Set the MTU reported by `query`
    #[must_use]
    pub const fn with_mtu(mut self, mtu: u32) -> Self {
        self.mtu = mtu;
        self
    }

    /// Set the interrupt service thread name
    #[must_use]
    pub const fn with_thread_name(mut self, name: &'static str) -> Self {
        self.thread_name = name;
        self
    }

    /// Check the configuration for values the driver cannot honor
    pub fn validate(&self) -> ConfigResult<()> {
        if self.phy_addr > MAX_PHY_ADDR {
            return Err(ConfigError::InvalidPhyAddress);
        }
        if self.mdio_timeout_us == 0 || self.mdio_poll_interval_us == 0 {
            return Err(ConfigError::InvalidConfig);
        }
        if self.reset_attempts == 0 {
            return Err(ConfigError::InvalidConfig);
        }
        if self.mtu == 0 || self.mtu as usize + ETH_HEADER_LEN + FCS_SIZE > MAX_FRAME_SIZE {
            return Err(ConfigError::InvalidConfig);
        }
        if self.thread_name.is_empty() {
            return Err(ConfigError::InvalidConfig);
        }
        Ok(())
    }
}
