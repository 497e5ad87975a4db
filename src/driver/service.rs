//! Interrupt service loop
//!
//! One dedicated thread per device waits on the interrupt line, acknowledges
//! the DMA status register and dispatches each event class in a fixed order:
//!
//! 1. Link change: reconcile link state, notify the client on a transition
//! 2. RX complete: drain the RX ring, delivering each frame
//! 3. Abnormal summary: count and log a bus error
//! 4. TX complete: nothing to reclaim, descriptors return through OWN
//!
//! The loop exits cleanly when a wait returns after shutdown was requested,
//! and exits with [`ServiceState::Failed`] when a wait fails on its own.

use alloc::sync::Arc;

use super::interrupt::{InterruptLine, InterruptStatus, ShutdownToken};
use super::state::{Counters, ServiceState, Shared};
use crate::dma::{PinnedBuffer, RxRing};
use crate::error::IoResult;
use crate::register::RegisterIo;
use crate::register::dma::DmaRegs;

pub(crate) struct ServiceLoop<R, B, I, const N: usize>
where
    R: RegisterIo,
    B: PinnedBuffer,
    I: InterruptLine,
{
    shared: Arc<Shared<R, B, N>>,
    rx: RxRing<B, N>,
    irq: I,
    shutdown: ShutdownToken,
}

impl<R, B, I, const N: usize> ServiceLoop<R, B, I, N>
where
    R: RegisterIo,
    B: PinnedBuffer,
    I: InterruptLine,
{
    pub(crate) fn new(
        shared: Arc<Shared<R, B, N>>,
        rx: RxRing<B, N>,
        irq: I,
        shutdown: ShutdownToken,
    ) -> Self {
        Self {
            shared,
            rx,
            irq,
            shutdown,
        }
    }

    /// Wait and dispatch until shutdown or a failed wait.
    pub(crate) fn run(mut self) -> IoResult<()> {
        log::debug!("interrupt service running");

        loop {
            let waited = self.irq.wait();

            if self.shutdown.is_requested() {
                log::debug!("interrupt service stopping");
                self.shared.set_service_state(ServiceState::Stopped);
                return Ok(());
            }

            if let Err(e) = waited {
                log::error!("interrupt wait failed: {e}");
                self.shared.set_service_state(ServiceState::Failed);
                return Err(e);
            }

            let raw = DmaRegs::new(&self.shared.regs).take_status();
            self.dispatch(raw);
        }
    }

    /// Handle one acknowledged DMA status word
    pub(crate) fn dispatch(&mut self, raw: u32) {
        let status = InterruptStatus::from_raw(raw);
        let shared = &*self.shared;

        if status.link_changed {
            shared.state.with(|s| s.reconcile_link(&shared.regs));
        }

        if status.rx_complete {
            self.rx.drain(|frame| {
                let delivered = shared.state.with(|s| match s.client.as_mut() {
                    Some(client) => {
                        client.recv(frame);
                        true
                    }
                    None => false,
                });

                if delivered {
                    Counters::bump(&shared.counters.rx_delivered);
                } else {
                    Counters::bump(&shared.counters.rx_dropped);
                    log::trace!("no client bound, dropped {} byte frame", frame.len());
                }
            });
        }

        if status.abnormal_summary {
            let count = Counters::bump(&shared.counters.bus_errors);
            log::error!(
                "abnormal interrupt: status={raw:#010x} fatal_bus={} rx_overflow={} \
                 tx_underflow={} rx_unavailable={} bus_errors={count}",
                status.fatal_bus_error,
                status.rx_overflow,
                status.tx_underflow,
                status.rx_buf_unavailable,
            );
        }

        if status.tx_complete {
            log::trace!("tx complete");
        }
    }
}
