//! Client binding seam
//!
//! A network stack binds to the device with [`EthmacClient`] and receives
//! link changes and inbound frames through it.

use super::link::LinkState;
use crate::constants::MAC_ADDR_LEN;

/// Feature bits reported by `query`
pub mod features {
    /// Wireless device
    pub const WLAN: u32 = 1 << 0;
    /// Synthetic (non-hardware) device
    pub const SYNTH: u32 = 1 << 1;
    /// Device performs bus-master DMA through its bus transaction token
    pub const DMA: u32 = 1 << 2;
}

/// Callbacks from the device to its bound client.
///
/// Both callbacks run with the device state lock held, from the interrupt
/// service thread or from the thread calling `start`. They must not call
/// back into the same device: the lock is not reentrant and the call deadlocks.
pub trait EthmacClient: Send {
    /// The link went up or down
    fn status(&mut self, state: LinkState);

    /// A frame arrived. The slice is only valid for the duration of the call.
    fn recv(&mut self, frame: &[u8]);
}

/// Device description returned by `query`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EthmacInfo {
    /// [`features`] bits
    pub features: u32,
    /// Maximum payload size
    pub mtu: u32,
    /// Station address
    pub mac: [u8; MAC_ADDR_LEN],
}

impl EthmacInfo {
    /// Check whether a feature bit is set
    #[inline]
    pub const fn has_feature(&self, feature: u32) -> bool {
        self.features & feature != 0
    }
}
