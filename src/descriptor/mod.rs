//! DMA descriptor definitions
//!
//! One descriptor layout serves both rings. Each descriptor points to a fixed
//! buffer slot and to the next descriptor (chained mode), and its status word
//! carries the OWN bit that hands the slot back and forth between the CPU and
//! the DMA engine.
//!
//! # Ownership handoff
//!
//! Descriptors live in memory the DMA engine reads and writes concurrently, so
//! ownership is never flipped with a bare store:
//!
//! - [`Descriptor::hand_to_hardware`] writes the control word, issues a
//!   release fence, and only then sets OWN.
//! - [`Descriptor::take_from_hardware`] observes OWN clear and issues an
//!   acquire fence before the status word and buffer are trusted.

pub mod bits;

use core::sync::atomic::{Ordering, fence};

use bits::{control, status};

/// Volatile cell wrapper for descriptor fields
///
/// Ensures all accesses are volatile to prevent compiler optimization
/// from reordering or caching descriptor field accesses.
#[repr(transparent)]
pub(crate) struct VolatileCell<T: Copy> {
    value: core::cell::UnsafeCell<T>,
}

// Safety: every access is a single volatile 32-bit load or store.
unsafe impl<T: Copy> Sync for VolatileCell<T> {}

impl<T: Copy> VolatileCell<T> {
    /// Create a new volatile cell with the given initial value
    #[inline(always)]
    pub const fn new(value: T) -> Self {
        Self {
            value: core::cell::UnsafeCell::new(value),
        }
    }

    /// Read the value (volatile read)
    #[inline(always)]
    pub fn get(&self) -> T {
        // SAFETY: the cell owns a valid, aligned T.
        unsafe { core::ptr::read_volatile(self.value.get()) }
    }

    /// Write a value (volatile write)
    #[inline(always)]
    pub fn set(&self, value: T) {
        // SAFETY: the cell owns a valid, aligned T.
        unsafe { core::ptr::write_volatile(self.value.get(), value) }
    }
}

/// Which side may touch a descriptor and its buffer slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Ownership {
    /// DMA engine owns it; software must not read or write the slot
    Hardware,
    /// Software owns it
    Software,
}

/// DWMAC normal descriptor (16 bytes, chained mode).
#[repr(C, align(4))]
pub struct Descriptor {
    /// Word 0: status and OWN
    status: VolatileCell<u32>,
    /// Word 1: buffer size and control flags
    control: VolatileCell<u32>,
    /// Word 2: buffer physical address
    buffer_addr: VolatileCell<u32>,
    /// Word 3: next descriptor physical address
    next_addr: VolatileCell<u32>,
}

impl Descriptor {
    /// Size of the descriptor in bytes
    pub const SIZE: usize = 16;

    /// Create a zeroed, software-owned descriptor
    #[must_use]
    pub const fn new() -> Self {
        Self {
            status: VolatileCell::new(0),
            control: VolatileCell::new(0),
            buffer_addr: VolatileCell::new(0),
            next_addr: VolatileCell::new(0),
        }
    }

    /// Current owner according to the OWN bit
    #[inline(always)]
    #[must_use]
    pub fn ownership(&self) -> Ownership {
        if self.status.get() & status::OWN != 0 {
            Ownership::Hardware
        } else {
            Ownership::Software
        }
    }

    /// Raw status word
    #[inline(always)]
    #[must_use]
    pub fn status(&self) -> u32 {
        self.status.get()
    }

    /// Raw control word
    #[inline(always)]
    #[must_use]
    pub fn control(&self) -> u32 {
        self.control.get()
    }

    /// Buffer physical address
    #[inline(always)]
    #[must_use]
    pub fn buffer_addr(&self) -> u32 {
        self.buffer_addr.get()
    }

    /// Next descriptor physical address
    #[inline(always)]
    #[must_use]
    pub fn next_addr(&self) -> u32 {
        self.next_addr.get()
    }

    /// Point the descriptor at its buffer slot and successor.
    ///
    /// Only valid while the ring is not yet handed to the DMA engine.
    pub fn link(&self, buffer: u32, next: u32) {
        self.buffer_addr.set(buffer);
        self.next_addr.set(next);
    }

    /// Reset to software-owned with the given control word
    pub fn reset_software(&self, ctrl: u32) {
        self.status.set(0);
        self.control.set(ctrl);
    }

    /// Received frame length from the status word (includes FCS)
    #[inline(always)]
    #[must_use]
    pub fn frame_length(&self) -> usize {
        frame_length(self.status.get())
    }

    /// Program `ctrl` and give the descriptor to the DMA engine.
    ///
    /// The release fence orders every prior write to the slot and to the
    /// control word before the OWN store the engine polls for.
    #[inline]
    pub fn hand_to_hardware(&self, ctrl: u32) {
        self.control.set(ctrl);
        fence(Ordering::Release);
        self.status.set(status::OWN);
    }

    /// Claim a descriptor the DMA engine has released.
    ///
    /// Returns the status word when OWN is clear, `None` while the engine
    /// still owns it.
    #[inline]
    pub fn take_from_hardware(&self) -> Option<u32> {
        let word = self.status.get();
        if word & status::OWN != 0 {
            return None;
        }
        fence(Ordering::Acquire);
        Some(word)
    }

    /// Simulate the DMA engine completing this descriptor (test only)
    #[cfg(test)]
    pub(crate) fn complete_rx(&self, len: usize) {
        self.status
            .set(((len as u32) << status::FRAME_LEN_SHIFT) & status::FRAME_LEN_MASK);
    }

    /// Simulate the DMA engine finishing a transmission (test only)
    #[cfg(test)]
    pub(crate) fn complete_tx(&self) {
        self.status.set(self.status.get() & !status::OWN);
    }
}

impl Default for Descriptor {
    fn default() -> Self {
        Self::new()
    }
}

/// Extract the frame length field from an RX status word
#[inline(always)]
#[must_use]
pub const fn frame_length(word: u32) -> usize {
    ((word & status::FRAME_LEN_MASK) >> status::FRAME_LEN_SHIFT) as usize
}

/// Check the error summary bit of an RX status word
#[inline(always)]
#[must_use]
pub const fn has_error(word: u32) -> bool {
    word & status::ERR_SUMMARY != 0
}

/// Default RX control word: full-size buffer, chained
pub const RX_CONTROL: u32 = control::rx_buffer(crate::constants::MAX_FRAME_SIZE);

/// Default TX control word at rest: chained, empty
pub const TX_CONTROL_IDLE: u32 = control::CHAINED;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_layout_is_sixteen_bytes() {
        assert_eq!(core::mem::size_of::<Descriptor>(), Descriptor::SIZE);
        assert_eq!(core::mem::align_of::<Descriptor>(), 4);
    }

    #[test]
    fn new_descriptor_is_software_owned() {
        let d = Descriptor::new();
        assert_eq!(d.ownership(), Ownership::Software);
        assert_eq!(d.take_from_hardware(), Some(0));
    }

    #[test]
    fn hand_to_hardware_sets_control_then_own() {
        let d = Descriptor::new();
        d.hand_to_hardware(RX_CONTROL);

        assert_eq!(d.ownership(), Ownership::Hardware);
        assert_eq!(d.control(), RX_CONTROL);
        assert_eq!(d.status(), status::OWN);
        assert_eq!(d.take_from_hardware(), None);
    }

    #[test]
    fn completed_rx_reports_length() {
        let d = Descriptor::new();
        d.hand_to_hardware(RX_CONTROL);
        d.complete_rx(64);

        let word = d.take_from_hardware().unwrap();
        assert_eq!(d.frame_length(), 64);
        assert!(!has_error(word));
    }

    #[test]
    fn link_sets_addresses() {
        let d = Descriptor::new();
        d.link(0x1000_0000, 0x2000_0010);
        assert_eq!(d.buffer_addr(), 0x1000_0000);
        assert_eq!(d.next_addr(), 0x2000_0010);
    }

    #[test]
    fn frame_length_masks_neighbouring_bits() {
        let word = status::OWN | status::ERR_SUMMARY | (1514 << status::FRAME_LEN_SHIFT);
        assert_eq!(frame_length(word), 1514);
        assert!(has_error(word));
    }

    #[test]
    fn reset_software_clears_status() {
        let d = Descriptor::new();
        d.hand_to_hardware(control::tx_frame(100));
        d.reset_software(TX_CONTROL_IDLE);
        assert_eq!(d.ownership(), Ownership::Software);
        assert_eq!(d.control(), TX_CONTROL_IDLE);
    }
}
