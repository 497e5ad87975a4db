//! Link state tracking
//!
//! The MAC reports the PHY link through the RGMII status register. The
//! device caches the last state it told its client about and only notifies
//! on a real transition.

use super::client::EthmacClient;
use crate::register::RegisterIo;
use crate::register::mac::MacRegs;

/// Link state as reported to the client
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkState {
    /// No carrier
    #[default]
    Down,
    /// Carrier present, frames can be queued
    Up,
}

impl LinkState {
    /// Map the hardware link bit to a state
    #[inline]
    pub const fn from_bool(up: bool) -> Self {
        if up { LinkState::Up } else { LinkState::Down }
    }

    /// Check if the link is up
    #[inline]
    pub const fn is_up(self) -> bool {
        matches!(self, LinkState::Up)
    }
}

/// Sample the link bit from the MAC
pub fn observe<R: RegisterIo>(regs: &R) -> LinkState {
    LinkState::from_bool(MacRegs::new(regs).link_up())
}

/// Bring the cached state in line with `observed`.
///
/// On a transition the cache is updated and the bound client, if any, is
/// told the new state. Returns `true` if the state changed.
pub fn reconcile(
    cached: &mut LinkState,
    observed: LinkState,
    client: Option<&mut (dyn EthmacClient + '_)>,
) -> bool {
    if *cached == observed {
        log::debug!("link unchanged ({observed:?})");
        return false;
    }

    *cached = observed;
    if let Some(client) = client {
        client.status(observed);
    }
    match observed {
        LinkState::Up => log::info!("link is now up"),
        LinkState::Down => log::info!("link is now down"),
    }
    true
}
