//! DMA Ring Engine
//!
//! Manages the TX and RX descriptor rings and their buffer slots over pinned
//! memory supplied by a [`BusTransaction`].
//!
//! # Architecture
//!
//! - [`buffer`]: the pinned-memory seam ([`PinnedBuffer`], [`BusTransaction`])
//! - [`DescriptorRing`]: circular ring geometry and slot access
//! - [`DmaRings`]: one-pass construction of both rings
//! - [`RxRing`]: drain, deliver and re-arm received frames
//! - [`TxRing`]: copy, flush and hand off outgoing frames
//!
//! # Example
//!
//! ```ignore
//! let descs = Arc::new(bti.pin(desc_region_size(32), CachePolicy::Uncached)?);
//! let slots = Arc::new(bti.pin(txn_region_size(32), CachePolicy::Cached)?);
//! let DmaRings { mut tx, mut rx } = DmaRings::<_, 32>::init(descs, slots)?;
//!
//! tx.submit(&regs, &frame)?;
//! rx.drain(|frame| stack.receive(frame));
//! ```

pub mod buffer;
mod ring;
mod rx;
mod tx;

pub use buffer::{BusTransaction, CacheOp, CachePolicy, PinnedBuffer};
pub use ring::{DescriptorRing, DmaRings, desc_region_size, txn_region_size};
pub use rx::RxRing;
pub use tx::TxRing;
