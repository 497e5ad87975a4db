//! Synchronization Support
//!
//! - [`LockedCell`]: the per-device lock guarding the shared state
//!   (link flag, client binding, TX ring)

mod primitives;

pub use primitives::LockedCell;
