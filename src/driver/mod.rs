//! Device-level driver components.
//!
//! - [`config`] - Configuration types and builder patterns
//! - [`interrupt`] - Interrupt status decoding, interrupt line, shutdown token
//! - [`link`] - Link state and reconciliation
//! - [`client`] - The client callback seam and `query` results
//! - [`device`] - The [`DwMac`] device, its bring-up and teardown
//!
//! The interrupt service loop and the shared device state are internal.
//!
//! # Example
//!
//! ```ignore
//! use dwmac_ethmac::driver::{DeviceConfig, DwMac, EthMac, Resources, Teardown};
//!
//! let config = DeviceConfig::new()
//!     .with_mac_address([0x02, 0x00, 0x00, 0x00, 0x00, 0x01]);
//! let mut mac = DwMac::<Board>::create(resources, config)?;
//! ```

pub mod client;
pub mod config;
pub mod device;
pub mod interrupt;
pub mod link;
mod service;
mod state;

pub use client::{EthmacClient, EthmacInfo, features};
pub use config::DeviceConfig;
pub use device::{DwMac, EthMac, Platform, Resources, Teardown};
pub use interrupt::{InterruptLine, InterruptStatus, ShutdownToken, SoftInterrupt};
pub use link::LinkState;
pub use state::{DeviceStats, ServiceState};
