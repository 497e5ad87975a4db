//! State shared between caller threads and the interrupt service thread.

use alloc::boxed::Box;
use core::sync::atomic::{AtomicU8, AtomicU64, Ordering};

use super::client::EthmacClient;
use super::link::{self, LinkState};
use crate::dma::{PinnedBuffer, TxRing};
use crate::register::RegisterIo;
use crate::sync::LockedCell;

/// Lifecycle of the interrupt service thread
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum ServiceState {
    /// Not started, or exited after a shutdown request
    Stopped = 0,
    /// Waiting for and dispatching interrupts
    Running = 1,
    /// Exited because the interrupt wait failed
    Failed = 2,
}

impl ServiceState {
    const fn from_u8(value: u8) -> Self {
        match value {
            1 => ServiceState::Running,
            2 => ServiceState::Failed,
            _ => ServiceState::Stopped,
        }
    }
}

/// Snapshot of the device counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceStats {
    /// Abnormal interrupt summaries seen
    pub bus_errors: u64,
    /// Frames handed to the bound client
    pub rx_delivered: u64,
    /// Frames drained while no client was bound
    pub rx_dropped: u64,
    /// Frames accepted by `queue_tx`
    pub tx_queued: u64,
}

#[derive(Debug, Default)]
pub(crate) struct Counters {
    pub(crate) bus_errors: AtomicU64,
    pub(crate) rx_delivered: AtomicU64,
    pub(crate) rx_dropped: AtomicU64,
    pub(crate) tx_queued: AtomicU64,
}

impl Counters {
    pub(crate) fn bump(counter: &AtomicU64) -> u64 {
        counter.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub(crate) fn snapshot(&self) -> DeviceStats {
        DeviceStats {
            bus_errors: self.bus_errors.load(Ordering::Relaxed),
            rx_delivered: self.rx_delivered.load(Ordering::Relaxed),
            rx_dropped: self.rx_dropped.load(Ordering::Relaxed),
            tx_queued: self.tx_queued.load(Ordering::Relaxed),
        }
    }
}

/// Everything guarded by the device lock
pub(crate) struct DeviceState<B: PinnedBuffer, const N: usize> {
    pub(crate) link: LinkState,
    pub(crate) client: Option<Box<dyn EthmacClient>>,
    /// `None` once the device has been shut down
    pub(crate) tx: Option<TxRing<B, N>>,
}

impl<B: PinnedBuffer, const N: usize> DeviceState<B, N> {
    pub(crate) fn new(tx: Option<TxRing<B, N>>) -> Self {
        Self {
            link: LinkState::Down,
            client: None,
            tx,
        }
    }

    /// Re-read the link bit and notify the client on a transition
    pub(crate) fn reconcile_link<R: RegisterIo>(&mut self, regs: &R) -> bool {
        link::reconcile(&mut self.link, link::observe(regs), self.client.as_deref_mut())
    }
}

pub(crate) struct Shared<R: RegisterIo, B: PinnedBuffer, const N: usize> {
    pub(crate) regs: R,
    pub(crate) state: LockedCell<DeviceState<B, N>>,
    pub(crate) counters: Counters,
    service: AtomicU8,
}

impl<R: RegisterIo, B: PinnedBuffer, const N: usize> Shared<R, B, N> {
    pub(crate) fn new(regs: R, tx: Option<TxRing<B, N>>) -> Self {
        Self {
            regs,
            state: LockedCell::new(DeviceState::new(tx)),
            counters: Counters::default(),
            service: AtomicU8::new(ServiceState::Stopped as u8),
        }
    }

    pub(crate) fn service_state(&self) -> ServiceState {
        ServiceState::from_u8(self.service.load(Ordering::Acquire))
    }

    pub(crate) fn set_service_state(&self, state: ServiceState) {
        self.service.store(state as u8, Ordering::Release);
    }
}
