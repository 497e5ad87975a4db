//! DWMAC Ethernet MAC Driver
//!
//! Data path for Synopsys DesignWare Ethernet MAC (DWMAC) controllers: the
//! descriptor ring engine, receive servicing, transmit submission, the
//! interrupt service loop, link state tracking over MDIO, and the device
//! lifecycle.
//!
//! The driver runs hosted. Each device owns one interrupt service thread;
//! any number of caller threads may queue frames.
//!
//! # Architecture
//!
//! 1. **Register Layer** ([`register`]): typed views over the MAC and DMA
//!    register blocks through the [`RegisterIo`] seam
//! 2. **Descriptor Layer** ([`descriptor`]): the 16-byte DMA descriptor and
//!    its ownership handoff
//! 3. **DMA Layer** ([`dma`]): pinned memory and the TX/RX descriptor rings
//! 4. **HAL Layer** ([`hal`]): MDIO, soft reset, PHY reset line, delays
//! 5. **Driver Layer** ([`driver`]): configuration, interrupt service, link
//!    state, client binding and the [`DwMac`] device
//!
//! # Platform seams
//!
//! Everything board-specific comes in through traits: [`RegisterIo`] for the
//! register window, [`BusTransaction`]/[`PinnedBuffer`] for DMA memory,
//! [`InterruptLine`] for the interrupt, and `embedded-hal`'s `DelayNs` and
//! `OutputPin` for timed polls and the PHY reset line. A [`Platform`] impl
//! bundles the concrete types.
//!
//! # Features
//!
//! - `defmt`: Enable defmt formatting for error and status types
//!
//! # Example
//!
//! ```ignore
//! use dwmac_ethmac::{DeviceConfig, DwMac, EthMac, Resources, Teardown};
//!
//! let resources = Resources::<Board> { regs, bti, irq, delay, phy_reset };
//! let mut mac = DwMac::<Board>::create(resources, DeviceConfig::new())?;
//!
//! mac.start(Box::new(stack))?;
//! let info = mac.query(0)?;
//! mac.queue_tx(0, &frame)?;
//!
//! mac.shutdown()?;
//! ```
//!
//! # Memory Requirements
//!
//! With the default 32 descriptors per ring:
//! - Descriptor region: 1 KiB used, one 4 KiB page pinned uncached
//! - Buffer region: 64 slots of 2 KiB = 128 KiB pinned cached

#![deny(missing_docs)]
#![allow(unsafe_code)]
#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::correctness)]
#![warn(
    clippy::suspicious,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::cloned_instead_of_copied,
    clippy::explicit_iter_loop,
    clippy::implicit_clone,
    clippy::inconsistent_struct_constructor,
    clippy::manual_assert,
    clippy::manual_let_else,
    clippy::match_same_arms,
    clippy::needless_pass_by_value,
    clippy::semicolon_if_nothing_returned,
    clippy::uninlined_format_args,
    clippy::unnested_or_patterns
)]
#![allow(
    clippy::mod_module_files,
    clippy::self_named_module_files,
    clippy::similar_names,
    clippy::too_many_arguments,
    clippy::struct_excessive_bools,
    clippy::type_complexity,
    clippy::must_use_candidate,
    clippy::assertions_on_constants,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss,
    clippy::cast_lossless,
    clippy::panic_in_result_fn,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::module_name_repetitions,
    clippy::wildcard_imports,
    clippy::items_after_statements
)]

extern crate alloc;

// =============================================================================
// Modules
// =============================================================================

pub mod constants;
pub mod descriptor;
pub mod dma;
pub mod driver;
pub mod error;
pub mod hal;
pub mod register;
pub mod sync;

// Test doubles (only available during testing)
#[cfg(test)]
#[allow(missing_docs)]
pub(crate) mod testing;

// =============================================================================
// Re-exports
// =============================================================================

pub use dma::{BusTransaction, CacheOp, CachePolicy, PinnedBuffer};
pub use driver::{
    DeviceConfig, DeviceStats, DwMac, EthMac, EthmacClient, EthmacInfo, InterruptLine,
    InterruptStatus, LinkState, Platform, Resources, ServiceState, ShutdownToken, SoftInterrupt,
    Teardown,
};
pub use error::{
    ConfigError, ConfigResult, DmaError, DmaResult, Error, ErrorKind, IoError, IoResult, Result,
};
pub use hal::{Clock, MdcClockDivider, MdioBus, MdioController, StdDelay};
pub use register::{MmioRegion, RegisterIo};
