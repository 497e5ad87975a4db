//! Hardware Abstraction Layer
//!
//! Higher-level operations over the raw registers and board signals.
//!
//! # Modules
//!
//! - [`delay`]: `DelayNs` provider and monotonic [`Clock`] for hosted targets
//! - [`mdio`]: MDIO bus for PHY communication
//! - [`reset`]: DMA soft reset and PHY reset line
//!
//! # Delay Integration
//!
//! All timed polls sleep through `embedded_hal::delay::DelayNs`. MDIO
//! deadlines are measured on a [`Clock`]; [`StdDelay`] provides both on a
//! hosted target.

pub mod delay;
pub mod mdio;
pub mod reset;

pub use delay::{Clock, StdDelay};
pub use mdio::{MdcClockDivider, MdioBus, MdioController};
pub use reset::{hold_phy_reset, pulse_phy_reset, soft_reset};
