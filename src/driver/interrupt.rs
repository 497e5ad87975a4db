//! Interrupt status decoding and the interrupt wait primitive.
//!
//! The service thread blocks in [`InterruptLine::wait`]. Shutdown sets a
//! [`ShutdownToken`] and then calls [`InterruptLine::unblock`], so a wait
//! that returns (with or without error) after the token is set is the normal
//! exit path rather than a failure.

use alloc::sync::Arc;
use core::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

use crate::error::{IoError, IoResult};
use crate::register::dma::{
    DMASTATUS_AIS, DMASTATUS_FBI, DMASTATUS_GLI, DMASTATUS_OVF, DMASTATUS_RI, DMASTATUS_RU,
    DMASTATUS_TI, DMASTATUS_UNF,
};

// =============================================================================
// Interrupt Status
// =============================================================================

/// Interrupt status flags parsed from the DMA status register.
///
/// The first four drive dispatch; the rest only qualify an abnormal summary
/// when it is logged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InterruptStatus {
    /// Line interface interrupt - link status changed
    pub link_changed: bool,
    /// RX complete - at least one frame received
    pub rx_complete: bool,
    /// Abnormal interrupt summary
    pub abnormal_summary: bool,
    /// TX complete - at least one frame transmitted
    pub tx_complete: bool,
    /// Fatal bus error
    pub fatal_bus_error: bool,
    /// RX buffer unavailable - DMA engine found no hardware-owned descriptor
    pub rx_buf_unavailable: bool,
    /// RX FIFO overflow
    pub rx_overflow: bool,
    /// TX FIFO underflow
    pub tx_underflow: bool,
}

impl InterruptStatus {
    /// Create from raw DMA status register value
    #[inline]
    pub fn from_raw(status: u32) -> Self {
        Self {
            link_changed: (status & DMASTATUS_GLI) != 0,
            rx_complete: (status & DMASTATUS_RI) != 0,
            abnormal_summary: (status & DMASTATUS_AIS) != 0,
            tx_complete: (status & DMASTATUS_TI) != 0,
            fatal_bus_error: (status & DMASTATUS_FBI) != 0,
            rx_buf_unavailable: (status & DMASTATUS_RU) != 0,
            rx_overflow: (status & DMASTATUS_OVF) != 0,
            tx_underflow: (status & DMASTATUS_UNF) != 0,
        }
    }
}

// =============================================================================
// Interrupt Line
// =============================================================================

/// Blocking interrupt primitive the service thread waits on
pub trait InterruptLine: Send + Sync {
    /// Block until the interrupt fires.
    ///
    /// Returns an error if the wait failed or was cancelled by
    /// [`unblock`](Self::unblock).
    fn wait(&self) -> IoResult<()>;

    /// Wake any current or future waiter with [`IoError::Canceled`].
    fn unblock(&self);
}

impl<T: InterruptLine + ?Sized> InterruptLine for Arc<T> {
    fn wait(&self) -> IoResult<()> {
        (**self).wait()
    }

    fn unblock(&self) {
        (**self).unblock();
    }
}

/// Cooperative shutdown flag shared with the service thread
#[derive(Debug, Clone, Default)]
pub struct ShutdownToken {
    requested: Arc<AtomicBool>,
}

impl ShutdownToken {
    /// Create a token with no shutdown requested
    pub fn new() -> Self {
        Self::default()
    }

    /// Request shutdown
    pub fn request(&self) {
        self.requested.store(true, Ordering::Release);
    }

    /// Check whether shutdown was requested
    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::Acquire)
    }
}

#[derive(Debug, Default)]
struct SoftIrqState {
    pending: bool,
    cancelled: bool,
    failed: bool,
}

/// Software-signalled interrupt line.
///
/// Platform glue calls [`trigger`](Self::trigger) from its real interrupt
/// handler (or a test calls it directly). Triggers that arrive while nobody
/// waits are latched, and several triggers before the next wait coalesce
/// into one wake, like a level-sensitive line.
#[derive(Debug, Default)]
pub struct SoftInterrupt {
    state: Mutex<SoftIrqState>,
    signal: Condvar,
}

impl SoftInterrupt {
    /// Create an idle line
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, SoftIrqState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Signal the interrupt
    pub fn trigger(&self) {
        self.lock().pending = true;
        self.signal.notify_all();
    }

    /// Make the next wait fail as if the kernel object broke
    pub fn fail(&self) {
        self.lock().failed = true;
        self.signal.notify_all();
    }

    /// Check whether the line has been cancelled
    pub fn is_cancelled(&self) -> bool {
        self.lock().cancelled
    }
}

impl InterruptLine for SoftInterrupt {
    fn wait(&self) -> IoResult<()> {
        let mut state = self.lock();
        loop {
            if state.cancelled {
                return Err(IoError::Canceled);
            }
            if state.failed {
                return Err(IoError::InterruptFailed);
            }
            if state.pending {
                state.pending = false;
                return Ok(());
            }
            state = self
                .signal
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    fn unblock(&self) {
        self.lock().cancelled = true;
        self.signal.notify_all();
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn interrupt_status_from_raw_zero() {
        assert_eq!(InterruptStatus::from_raw(0), InterruptStatus::default());
    }

    #[test]
    fn interrupt_status_decodes_dispatch_bits() {
        let status = InterruptStatus::from_raw(DMASTATUS_GLI | DMASTATUS_RI | DMASTATUS_AIS);

        assert!(status.link_changed);
        assert!(status.rx_complete);
        assert!(status.abnormal_summary);
        assert!(!status.tx_complete);
        assert!(!status.fatal_bus_error);
    }

    #[test]
    fn interrupt_status_abnormal_causes() {
        let status = InterruptStatus::from_raw(DMASTATUS_AIS | DMASTATUS_FBI | DMASTATUS_OVF);
        assert!(status.fatal_bus_error);
        assert!(status.rx_overflow);
        assert!(!status.tx_underflow);
        assert!(!status.rx_buf_unavailable);

        assert!(InterruptStatus::from_raw(DMASTATUS_UNF).tx_underflow);
        assert!(InterruptStatus::from_raw(DMASTATUS_RU).rx_buf_unavailable);
    }

    #[test]
    fn shutdown_token_shared_between_clones() {
        let token = ShutdownToken::new();
        let clone = token.clone();
        assert!(!clone.is_requested());
        token.request();
        assert!(clone.is_requested());
    }

    #[test]
    fn latched_trigger_wakes_next_wait() {
        let irq = SoftInterrupt::new();
        irq.trigger();
        irq.trigger();
        assert_eq!(irq.wait(), Ok(()));
    }

    #[test]
    fn trigger_wakes_blocked_waiter() {
        let irq = Arc::new(SoftInterrupt::new());
        let (tx, rx) = mpsc::channel();
        let waiter = {
            let irq = Arc::clone(&irq);
            thread::spawn(move || tx.send(irq.wait()).unwrap())
        };

        thread::sleep(Duration::from_millis(10));
        irq.trigger();

        assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), Ok(()));
        waiter.join().unwrap();
    }

    #[test]
    fn unblock_cancels_current_and_future_waits() {
        let irq = Arc::new(SoftInterrupt::new());
        let (tx, rx) = mpsc::channel();
        let waiter = {
            let irq = Arc::clone(&irq);
            thread::spawn(move || tx.send(irq.wait()).unwrap())
        };

        thread::sleep(Duration::from_millis(10));
        irq.unblock();

        assert_eq!(
            rx.recv_timeout(Duration::from_secs(5)).unwrap(),
            Err(IoError::Canceled)
        );
        waiter.join().unwrap();
        assert!(irq.is_cancelled());
        assert_eq!(irq.wait(), Err(IoError::Canceled));
    }

    #[test]
    fn fail_reports_interrupt_failure() {
        let irq = SoftInterrupt::new();
        irq.fail();
        assert_eq!(irq.wait(), Err(IoError::InterruptFailed));
    }
}
