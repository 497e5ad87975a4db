//! The DWMAC device
//!
//! [`DwMac`] owns every resource of one controller: the register window, the
//! pinned descriptor and buffer regions, the interrupt line, the PHY reset
//! line and the interrupt service thread. Clients drive it through
//! [`EthMac`]; [`Teardown::shutdown`] (or dropping the device) releases it.
//!
//! # Bring-up
//!
//! [`DwMac::create`] runs the full sequence and returns either a running
//! device or an error. Nothing is published on failure, and once memory has
//! been pinned every failure path quiesces the hardware and unpins again.
//!
//! # Example
//!
//! ```ignore
//! let resources = Resources::<Board> { regs, bti, irq, delay, phy_reset };
//! let mut mac = DwMac::<Board>::create(resources, DeviceConfig::new())?;
//!
//! mac.start(Box::new(stack))?;
//! mac.queue_tx(0, &frame)?;
//! mac.shutdown()?;
//! ```

use alloc::boxed::Box;
use alloc::sync::Arc;
use std::thread::{self, JoinHandle};

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use super::client::{EthmacClient, EthmacInfo, features};
use super::config::DeviceConfig;
use super::interrupt::{InterruptLine, ShutdownToken};
use super::link::LinkState;
use super::service::ServiceLoop;
use super::state::{Counters, DeviceStats, ServiceState, Shared};
use crate::constants::{DEFAULT_NUM_DESC, MAC_ADDR_LEN};
use crate::dma::{
    BusTransaction, CachePolicy, DmaRings, PinnedBuffer, TxRing, desc_region_size,
    txn_region_size,
};
use crate::error::{ConfigError, DmaResult, IoError, IoResult, Result};
use crate::hal::delay::Clock;
use crate::hal::mdio::{MdioController, advertise_gigabit, restart_auto_negotiation};
use crate::hal::reset::{hold_phy_reset, pulse_phy_reset, soft_reset};
use crate::register::RegisterIo;
use crate::register::dma::{
    DMABUSMODE_DEFAULT, DMAINTEN_DEFAULT, DMAOPERATION_RSF, DMAOPERATION_TSF, DmaRegs,
};
use crate::register::mac::{
    GMACCONFIG_CORE_INIT, GMACCONFIG_PS, GMACCONFIG_RE, GMACCONFIG_TE, GMACFF_RA, MacRegs,
};

// =============================================================================
// Platform Seams
// =============================================================================

/// Bundles the concrete types one board provides
pub trait Platform: 'static {
    /// Register window
    type Regs: RegisterIo + 'static;
    /// Pinned memory handle
    type Buffer: PinnedBuffer + 'static;
    /// Bus transaction token producing [`Self::Buffer`]
    type Bti: BusTransaction<Buffer = Self::Buffer>;
    /// Interrupt line of the controller
    type Irq: InterruptLine + 'static;
    /// Delay source and deadline clock for bounded polls
    type Delay: DelayNs + Clock + Clone + Send + Sync + 'static;
    /// Active-low PHY reset line
    type PhyReset: OutputPin + Send + Sync;
}

/// Hardware handed to [`DwMac::create`]
pub struct Resources<P: Platform> {
    /// Register window
    pub regs: P::Regs,
    /// Bus transaction token
    pub bti: P::Bti,
    /// Interrupt line
    pub irq: P::Irq,
    /// Delay source
    pub delay: P::Delay,
    /// PHY reset line
    pub phy_reset: P::PhyReset,
}

/// Client-facing operations of an Ethernet MAC
pub trait EthMac {
    /// Bus transaction token type
    type Bti: BusTransaction;

    /// Describe the device. `options` is reserved.
    fn query(&self, options: u32) -> Result<EthmacInfo>;

    /// Bind `client` and report the current link state to it.
    ///
    /// Fails with [`IoError::AlreadyBound`] if a client is bound.
    fn start(&self, client: Box<dyn EthmacClient>) -> Result<()>;

    /// Unbind the client, if any
    fn stop(&self);

    /// Queue one frame for transmission. `options` is reserved.
    fn queue_tx(&self, options: u32, frame: &[u8]) -> Result<()>;

    /// Set a device parameter
    fn set_param(&self, param: u32, value: i32, data: &[u8]) -> Result<()>;

    /// The token used to pin this device's DMA memory
    fn bus_transaction(&self) -> &Self::Bti;
}

/// Release hook, separate from the data-path operations
pub trait Teardown {
    /// Stop the service thread, quiesce the hardware and unpin all memory.
    ///
    /// Idempotent; a second call does nothing.
    fn shutdown(&mut self) -> Result<()>;
}

// =============================================================================
// Pinned Regions
// =============================================================================

struct Regions<B: PinnedBuffer> {
    descs: Arc<B>,
    slots: Arc<B>,
}

impl<B: PinnedBuffer> Regions<B> {
    fn pin<T: BusTransaction<Buffer = B>>(bti: &T, n: usize) -> DmaResult<Self> {
        let descs = bti.pin(desc_region_size(n), CachePolicy::Uncached)?;
        let slots = match bti.pin(txn_region_size(n), CachePolicy::Cached) {
            Ok(slots) => slots,
            Err(e) => {
                if let Err(unpin) = descs.unpin() {
                    log::error!("could not unpin descriptor region: {unpin}");
                }
                return Err(e);
            }
        };

        Ok(Self {
            descs: Arc::new(descs),
            slots: Arc::new(slots),
        })
    }

    /// Unpin both regions, attempting the second even if the first fails
    fn release(&self) -> DmaResult<()> {
        let descs = self.descs.unpin();
        if let Err(e) = descs {
            log::error!("could not unpin descriptor region: {e}");
        }
        let slots = self.slots.unpin();
        if let Err(e) = slots {
            log::error!("could not unpin buffer region: {e}");
        }
        descs.and(slots)
    }
}

// =============================================================================
// Hardware Sequences
// =============================================================================

fn configure_phy<R: RegisterIo, D: DelayNs + Clock>(regs: &R, delay: D, config: &DeviceConfig) {
    let mut mdio = MdioController::new(regs, delay)
        .with_clock_divider(config.mdc_divider)
        .with_timing(config.mdio_timeout_us, config.mdio_poll_interval_us);

    if let Err(e) = advertise_gigabit(&mut mdio, config.phy_addr) {
        log::warn!("PHY {}: could not advertise 1000BASE-T: {e}", config.phy_addr);
    }
    if let Err(e) = restart_auto_negotiation(&mut mdio, config.phy_addr) {
        log::warn!("PHY {}: could not restart autonegotiation: {e}", config.phy_addr);
    }
}

fn init_device<R: RegisterIo>(regs: &R) {
    let dma = DmaRegs::new(regs);
    let mac = MacRegs::new(regs);

    dma.set_interrupt_enable(0);
    dma.set_bus_mode(DMABUSMODE_DEFAULT);

    dma.set_operation_mode(DMAOPERATION_TSF | DMAOPERATION_RSF);
    dma.start_rx();
    dma.start_tx();

    // Pass all frames; no address filtering.
    mac.set_frame_filter(mac.frame_filter() | GMACFF_RA);

    dma.set_interrupt_enable(DMAINTEN_DEFAULT);

    let config = mac.config() | GMACCONFIG_CORE_INIT | GMACCONFIG_TE | GMACCONFIG_RE;
    mac.set_config(config & !GMACCONFIG_PS);
}

fn deinit_device<R: RegisterIo, P: OutputPin>(regs: &R, phy_reset: &mut P) {
    let dma = DmaRegs::new(regs);
    let mac = MacRegs::new(regs);

    dma.set_interrupt_enable(0);
    mac.disable_tx();
    mac.disable_rx();

    if let Err(e) = hold_phy_reset(phy_reset) {
        log::warn!("could not hold PHY in reset: {e}");
    }

    // TX and RX are off, the engine no longer walks the lists.
    dma.set_tx_desc_list_addr(0);
    dma.set_rx_desc_list_addr(0);
}

// =============================================================================
// Device
// =============================================================================

/// A running DWMAC controller with `N` descriptors per ring
pub struct DwMac<P: Platform, const N: usize = DEFAULT_NUM_DESC> {
    shared: Arc<Shared<P::Regs, P::Buffer, N>>,
    bti: P::Bti,
    irq: Arc<P::Irq>,
    delay: P::Delay,
    phy_reset: P::PhyReset,
    config: DeviceConfig,
    /// `None` once shut down
    regions: Option<Regions<P::Buffer>>,
    shutdown: ShutdownToken,
    service: Option<JoinHandle<IoResult<()>>>,
}

impl<P: Platform, const N: usize> DwMac<P, N> {
    /// Bring the controller up and start its interrupt service thread.
    ///
    /// Sequence: PHY reset pulse, gigabit advertisement and autonegotiation
    /// restart (failures logged only), DMA soft reset, pin and build the
    /// rings, program the list bases, program the MAC and DMA, spawn the
    /// service thread.
    pub fn create(resources: Resources<P>, config: DeviceConfig) -> Result<Self> {
        config.validate()?;

        let Resources {
            regs,
            bti,
            irq,
            mut delay,
            mut phy_reset,
        } = resources;

        pulse_phy_reset(&mut phy_reset, &mut delay, config.phy_reset_pulse_ms)?;
        configure_phy(&regs, delay.clone(), &config);
        soft_reset(&regs, &mut delay, config.reset_attempts, config.reset_poll_ms)?;

        let regions = Regions::pin(&bti, N)?;
        let rings = match DmaRings::<P::Buffer, N>::init(
            Arc::clone(&regions.descs),
            Arc::clone(&regions.slots),
        ) {
            Ok(rings) => rings,
            Err(e) => {
                log::error!("could not build descriptor rings: {e}");
                deinit_device(&regs, &mut phy_reset);
                // The ring failure is what the caller sees.
                if let Err(unpin) = regions.release() {
                    log::debug!("unwind after ring failure: {unpin}");
                }
                return Err(e.into());
            }
        };

        let dma = DmaRegs::new(&regs);
        dma.set_tx_desc_list_addr(rings.tx.ring().base_phys());
        dma.set_rx_desc_list_addr(rings.rx.ring().base_phys());
        init_device(&regs);

        let DmaRings { tx, rx } = rings;
        let shared = Arc::new(Shared::new(regs, Some(tx)));
        let irq = Arc::new(irq);
        let shutdown = ShutdownToken::new();
        let service = ServiceLoop::new(
            Arc::clone(&shared),
            rx,
            Arc::clone(&irq),
            shutdown.clone(),
        );

        shared.set_service_state(ServiceState::Running);
        let spawned = thread::Builder::new()
            .name(config.thread_name.into())
            .spawn(move || service.run());
        let handle = match spawned {
            Ok(handle) => handle,
            Err(e) => {
                log::error!("could not spawn {}: {e}", config.thread_name);
                shared.set_service_state(ServiceState::Stopped);
                deinit_device(&shared.regs, &mut phy_reset);
                if let Err(unpin) = regions.release() {
                    log::debug!("unwind after spawn failure: {unpin}");
                }
                return Err(ConfigError::ThreadSpawnFailed.into());
            }
        };

        log::info!("dwmac up: {N} descriptors per ring, phy {}", config.phy_addr);

        Ok(Self {
            shared,
            bti,
            irq,
            delay,
            phy_reset,
            config,
            regions: Some(regions),
            shutdown,
            service: Some(handle),
        })
    }

    /// Counter snapshot
    pub fn stats(&self) -> DeviceStats {
        self.shared.counters.snapshot()
    }

    /// State of the interrupt service thread
    pub fn service_state(&self) -> ServiceState {
        self.shared.service_state()
    }

    /// Last link state reported to the client
    pub fn link_state(&self) -> LinkState {
        self.shared.state.with(|s| s.link)
    }

    /// Number of TX descriptors the DMA engine still owns
    pub fn tx_pending(&self) -> usize {
        self.shared
            .state
            .with(|s| s.tx.as_ref().map_or(0, TxRing::pending))
    }

    /// MDIO access to the PHY, using the configured timing
    pub fn mdio(&self) -> MdioController<'_, P::Regs, P::Delay> {
        MdioController::new(&self.shared.regs, self.delay.clone())
            .with_clock_divider(self.config.mdc_divider)
            .with_timing(self.config.mdio_timeout_us, self.config.mdio_poll_interval_us)
    }

    /// The device configuration
    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    fn mac_address(&self) -> [u8; MAC_ADDR_LEN] {
        self.config
            .mac_address
            .unwrap_or_else(|| MacRegs::new(&self.shared.regs).mac_address())
    }
}

impl<P: Platform, const N: usize> EthMac for DwMac<P, N> {
    type Bti = P::Bti;

    fn query(&self, _options: u32) -> Result<EthmacInfo> {
        Ok(EthmacInfo {
            features: features::DMA,
            mtu: self.config.mtu,
            mac: self.mac_address(),
        })
    }

    fn start(&self, client: Box<dyn EthmacClient>) -> Result<()> {
        let regs = &self.shared.regs;
        self.shared.state.with(|s| -> Result<()> {
            if s.client.is_some() {
                log::error!("start: client already bound");
                return Err(IoError::AlreadyBound.into());
            }

            s.client = Some(client);
            s.reconcile_link(regs);
            log::info!("client bound, link {:?}", s.link);
            Ok(())
        })
    }

    fn stop(&self) {
        log::info!("stopping");
        self.shared.state.with(|s| s.client = None);
    }

    fn queue_tx(&self, _options: u32, frame: &[u8]) -> Result<()> {
        let regs = &self.shared.regs;
        self.shared.state.with(|s| -> Result<()> {
            if !s.link.is_up() {
                return Err(IoError::LinkDown.into());
            }
            let tx = s.tx.as_mut().ok_or(IoError::LinkDown)?;
            tx.submit(regs, frame)?;
            Counters::bump(&self.shared.counters.tx_queued);
            Ok(())
        })
    }

    fn set_param(&self, _param: u32, _value: i32, _data: &[u8]) -> Result<()> {
        Err(IoError::NotSupported.into())
    }

    fn bus_transaction(&self) -> &Self::Bti {
        &self.bti
    }
}

impl<P: Platform, const N: usize> Teardown for DwMac<P, N> {
    fn shutdown(&mut self) -> Result<()> {
        let Some(regions) = self.regions.take() else {
            return Ok(());
        };

        log::info!("shutting down");

        self.shutdown.request();
        self.irq.unblock();
        if let Some(handle) = self.service.take() {
            match handle.join() {
                Ok(Ok(())) => {}
                Ok(Err(e)) => log::warn!("service thread had already failed: {e}"),
                Err(_) => log::error!("service thread panicked"),
            }
        }

        // Dropping the TX ring here leaves only the region handles alive.
        self.shared.state.with(|s| {
            s.link = LinkState::Down;
            s.client = None;
            s.tx = None;
        });

        deinit_device(&self.shared.regs, &mut self.phy_reset);
        regions.release()?;
        Ok(())
    }
}

impl<P: Platform, const N: usize> Drop for DwMac<P, N> {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            log::error!("shutdown on drop failed: {e}");
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
