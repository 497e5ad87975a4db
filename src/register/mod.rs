//! Memory-mapped register definitions for the DWMAC
//!
//! The MAC and DMA blocks share one register window: MAC registers start at
//! offset 0, DMA registers at [`DMA_BLOCK_OFFSET`]. All access goes through
//! [`RegisterIo`] so the same typed views ([`dma::DmaRegs`], [`mac::MacRegs`])
//! work over a real mapping ([`MmioRegion`]) or a test double.

pub mod dma;
pub mod mac;

use core::ptr::NonNull;

pub use crate::constants::DMA_BLOCK_OFFSET;

/// 32-bit register window access.
///
/// Implementations must perform each access exactly once and in program
/// order (volatile semantics).
pub trait RegisterIo: Send + Sync {
    /// Read the 32-bit register at `offset` bytes into the window
    fn read32(&self, offset: usize) -> u32;

    /// Write the 32-bit register at `offset` bytes into the window
    fn write32(&self, offset: usize, value: u32);

    /// Read-modify-write the register at `offset`
    #[inline(always)]
    fn modify32<F>(&self, offset: usize, f: F)
    where
        F: FnOnce(u32) -> u32,
        Self: Sized,
    {
        let value = self.read32(offset);
        self.write32(offset, f(value));
    }
}

/// A mapped register window accessed with volatile loads and stores.
#[derive(Debug)]
pub struct MmioRegion {
    base: NonNull<u32>,
    len: usize,
}

impl MmioRegion {
    /// Wrap an already-mapped, uncached register window.
    ///
    /// # Safety
    ///
    /// `base` must point to a device register window of at least `len` bytes,
    /// 4-byte aligned, mapped for the lifetime of the returned value, and not
    /// accessed through any other path that assumes exclusive ownership.
    pub unsafe fn new(base: NonNull<u8>, len: usize) -> Self {
        Self {
            base: base.cast(),
            len,
        }
    }

    /// Length of the window in bytes
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Check if the window is empty
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline(always)]
    fn reg(&self, offset: usize) -> *mut u32 {
        assert!(
            offset % 4 == 0 && offset + 4 <= self.len,
            "register offset {offset:#x} outside window"
        );
        // SAFETY: offset is in bounds and aligned (checked above).
        unsafe { self.base.as_ptr().byte_add(offset) }
    }
}

impl RegisterIo for MmioRegion {
    #[inline(always)]
    fn read32(&self, offset: usize) -> u32 {
        // SAFETY: `reg` validated the offset; the window is mapped per `new`.
        unsafe { core::ptr::read_volatile(self.reg(offset)) }
    }

    #[inline(always)]
    fn write32(&self, offset: usize, value: u32) {
        // SAFETY: `reg` validated the offset; the window is mapped per `new`.
        unsafe { core::ptr::write_volatile(self.reg(offset), value) }
    }
}

// SAFETY: registers are accessed only via volatile 32-bit operations, which the
// hardware treats as independent transactions.
unsafe impl Send for MmioRegion {}
unsafe impl Sync for MmioRegion {}

// =============================================================================
// Register Access Macros
// =============================================================================

/// Generate read/write accessor methods for a register.
///
/// # Example
/// ```ignore
/// impl<R: RegisterIo> DmaRegs<'_, R> {
///     reg_rw!(bus_mode, set_bus_mode, DMABUSMODE_OFFSET, "Bus Mode register");
/// }
/// ```
macro_rules! reg_rw {
    ($read_fn:ident, $write_fn:ident, $offset:expr, $doc:expr) => {
        #[doc = concat!("Read ", $doc)]
        #[inline(always)]
        pub fn $read_fn(&self) -> u32 {
            self.io.read32(Self::BASE + $offset)
        }

        #[doc = concat!("Write ", $doc)]
        #[inline(always)]
        pub fn $write_fn(&self, value: u32) {
            self.io.write32(Self::BASE + $offset, value)
        }
    };
}

/// Generate a read-only accessor method for a register.
macro_rules! reg_ro {
    ($read_fn:ident, $offset:expr, $doc:expr) => {
        #[doc = concat!("Read ", $doc)]
        #[inline(always)]
        pub fn $read_fn(&self) -> u32 {
            self.io.read32(Self::BASE + $offset)
        }
    };
}

/// Generate set/clear bit operation methods for a register.
macro_rules! reg_bit_ops {
    ($set_fn:ident, $clear_fn:ident, $offset:expr, $bit:expr, $what:expr, $set_verb:expr, $clear_verb:expr) => {
        #[doc = concat!($set_verb, " ", $what)]
        #[inline(always)]
        pub fn $set_fn(&self) {
            self.io.modify32(Self::BASE + $offset, |v| v | $bit)
        }

        #[doc = concat!($clear_verb, " ", $what)]
        #[inline(always)]
        pub fn $clear_fn(&self) {
            self.io.modify32(Self::BASE + $offset, |v| v & !$bit)
        }
    };
}

// Export macros for use in submodules
pub(crate) use reg_bit_ops;
pub(crate) use reg_ro;
pub(crate) use reg_rw;
