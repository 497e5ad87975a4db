//! Test doubles for the hardware seams
//!
//! Every mock is a cheap handle over shared state, so a test can keep one
//! clone for assertions while the code under test owns another.

use alloc::sync::Arc;
use core::ptr::NonNull;
use core::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::collections::HashMap;
use std::sync::mpsc;
use std::sync::{Mutex, MutexGuard, PoisonError};

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{self, ErrorType, OutputPin};

use crate::constants::{DMA_BLOCK_OFFSET, PAGE_SIZE, round_up};
use crate::driver::client::EthmacClient;
use crate::driver::device::{Platform, Resources};
use crate::driver::interrupt::SoftInterrupt;
use crate::driver::link::LinkState;
use crate::dma::{BusTransaction, CacheOp, CachePolicy, DmaRings, PinnedBuffer};
use crate::dma::{desc_region_size, txn_region_size};
use crate::error::{DmaError, DmaResult};
use crate::hal::Clock;
use crate::register::RegisterIo;
use crate::register::dma::{DMABUSMODE_OFFSET, DMABUSMODE_SW_RST, DMASTATUS_OFFSET};
use crate::register::mac::{
    GMACADDR0H_OFFSET, GMACADDR0L_OFFSET, GMACMIIADDR_GB, GMACMIIADDR_GR_MASK,
    GMACMIIADDR_GR_SHIFT, GMACMIIADDR_GW, GMACMIIADDR_OFFSET, GMACMIIADDR_PA_MASK,
    GMACMIIADDR_PA_SHIFT, GMACMIIDATA_OFFSET, GMACRGMIIS_LNKSTS, GMACRGMIIS_OFFSET,
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// =============================================================================
// Registers
// =============================================================================

const DMA_STATUS: usize = DMA_BLOCK_OFFSET + DMASTATUS_OFFSET;
const DMA_BUS_MODE: usize = DMA_BLOCK_OFFSET + DMABUSMODE_OFFSET;

#[derive(Debug, Default)]
struct RegisterFile {
    values: HashMap<usize, u32>,
    writes: Vec<(usize, u32)>,
    phy: HashMap<(u8, u8), u16>,
    mdio_stuck: bool,
    reset_stuck: bool,
}

impl RegisterFile {
    fn get(&self, offset: usize) -> u32 {
        self.values.get(&offset).copied().unwrap_or(0)
    }

    /// Emulate a write the way the DWMAC register file reacts to it
    fn write(&mut self, offset: usize, value: u32) {
        self.writes.push((offset, value));

        match offset {
            DMA_STATUS => {
                let cleared = self.get(DMA_STATUS) & !value;
                self.values.insert(offset, cleared);
            }
            DMA_BUS_MODE if value & DMABUSMODE_SW_RST != 0 && !self.reset_stuck => {
                // Reset completes at once and wipes the station address.
                self.values.insert(offset, value & !DMABUSMODE_SW_RST);
                self.values.insert(GMACADDR0H_OFFSET, 0x0000_FFFF);
                self.values.insert(GMACADDR0L_OFFSET, 0xFFFF_FFFF);
            }
            GMACMIIADDR_OFFSET if value & GMACMIIADDR_GB != 0 && !self.mdio_stuck => {
                let phy = ((value & GMACMIIADDR_PA_MASK) >> GMACMIIADDR_PA_SHIFT) as u8;
                let reg = ((value & GMACMIIADDR_GR_MASK) >> GMACMIIADDR_GR_SHIFT) as u8;
                if value & GMACMIIADDR_GW != 0 {
                    let data = self.get(GMACMIIDATA_OFFSET) as u16;
                    self.phy.insert((phy, reg), data);
                } else {
                    let data = self.phy.get(&(phy, reg)).copied().unwrap_or(0);
                    self.values.insert(GMACMIIDATA_OFFSET, u32::from(data));
                }
                self.values.insert(offset, value & !GMACMIIADDR_GB);
            }
            _ => {
                self.values.insert(offset, value);
            }
        }
    }
}

/// Register window backed by a map, with DWMAC side effects:
/// write-one-to-clear DMA status, self-clearing soft reset and MDIO busy
/// bits (each can be made to stick), and a PHY register file behind MDIO.
#[derive(Debug, Clone, Default)]
pub struct MockRegisters {
    inner: Arc<Mutex<RegisterFile>>,
}

impl MockRegisters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a register without side effects
    pub fn set(&self, offset: usize, value: u32) {
        lock(&self.inner).values.insert(offset, value);
    }

    pub fn get(&self, offset: usize) -> u32 {
        lock(&self.inner).get(offset)
    }

    /// Number of writes the driver made to `offset`
    pub fn writes_to(&self, offset: usize) -> usize {
        lock(&self.inner)
            .writes
            .iter()
            .filter(|(o, _)| *o == offset)
            .count()
    }

    pub fn last_write(&self, offset: usize) -> Option<u32> {
        lock(&self.inner)
            .writes
            .iter()
            .rev()
            .find(|(o, _)| *o == offset)
            .map(|&(_, v)| v)
    }

    /// Latch interrupt status bits as the DMA engine would
    pub fn raise_dma_status(&self, bits: u32) {
        let mut file = lock(&self.inner);
        let value = file.get(DMA_STATUS) | bits;
        file.values.insert(DMA_STATUS, value);
    }

    pub fn set_link(&self, up: bool) {
        let value = if up { GMACRGMIIS_LNKSTS } else { 0 };
        self.set(GMACRGMIIS_OFFSET, value);
    }

    pub fn set_phy_reg(&self, phy: u8, reg: u8, value: u16) {
        lock(&self.inner).phy.insert((phy, reg), value);
    }

    pub fn phy_reg(&self, phy: u8, reg: u8) -> u16 {
        lock(&self.inner).phy.get(&(phy, reg)).copied().unwrap_or(0)
    }

    /// Keep the MDIO busy bit set after every command
    pub fn set_mdio_stuck(&self, stuck: bool) {
        lock(&self.inner).mdio_stuck = stuck;
    }

    /// Keep the DMA soft reset bit set
    pub fn set_reset_stuck(&self, stuck: bool) {
        lock(&self.inner).reset_stuck = stuck;
    }
}

impl RegisterIo for MockRegisters {
    fn read32(&self, offset: usize) -> u32 {
        self.get(offset)
    }

    fn write32(&self, offset: usize, value: u32) {
        lock(&self.inner).write(offset, value);
    }
}

// =============================================================================
// Delay
// =============================================================================

/// Delay that records requested time instead of sleeping
#[derive(Debug, Clone, Default)]
pub struct MockDelay {
    total_ns: Arc<AtomicU64>,
}

impl MockDelay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total_ns(&self) -> u64 {
        self.total_ns.load(Ordering::Relaxed)
    }

    pub fn total_us(&self) -> u64 {
        self.total_ns() / 1_000
    }

    pub fn total_ms(&self) -> u64 {
        self.total_ns() / 1_000_000
    }
}

/// Time only moves when the code under test sleeps
impl Clock for MockDelay {
    fn now_us(&self) -> u64 {
        self.total_us()
    }
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns.fetch_add(u64::from(ns), Ordering::Relaxed);
    }

    fn delay_us(&mut self, us: u32) {
        self.total_ns
            .fetch_add(u64::from(us) * 1_000, Ordering::Relaxed);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.total_ns
            .fetch_add(u64::from(ms) * 1_000_000, Ordering::Relaxed);
    }
}

// =============================================================================
// Pinned Memory
// =============================================================================

struct Region {
    /// u64 words keep the base 8-byte aligned
    mem: NonNull<u64>,
    words: usize,
    len: usize,
    policy: CachePolicy,
    phys_base: u64,
    cache_log: Mutex<Vec<(usize, usize, CacheOp)>>,
    unpinned: AtomicBool,
    fail_unpin: AtomicBool,
}

// SAFETY: the region is plain heap memory; the driver coordinates access
// through descriptor ownership, tests through the call order.
unsafe impl Send for Region {}
unsafe impl Sync for Region {}

impl Drop for Region {
    fn drop(&mut self) {
        let slice = core::ptr::slice_from_raw_parts_mut(self.mem.as_ptr(), self.words);
        // SAFETY: `mem` came from `Box::into_raw` of a slice of `words` u64s.
        drop(unsafe { Box::from_raw(slice) });
    }
}

/// Heap-backed pinned region with a fake physical address
#[derive(Clone)]
pub struct MockBuffer {
    region: Arc<Region>,
}

impl MockBuffer {
    fn new(len: usize, policy: CachePolicy, phys_base: u64) -> Self {
        let words = len.div_ceil(8).max(1);
        let boxed: Box<[u64]> = vec![0u64; words].into_boxed_slice();
        let raw = Box::into_raw(boxed).cast::<u64>();
        let mem = NonNull::new(raw).unwrap_or(NonNull::dangling());
        Self {
            region: Arc::new(Region {
                mem,
                words,
                len,
                policy,
                phys_base,
                cache_log: Mutex::new(Vec::new()),
                unpinned: AtomicBool::new(false),
                fail_unpin: AtomicBool::new(false),
            }),
        }
    }

    pub fn phys_base(&self) -> u64 {
        self.region.phys_base
    }

    pub fn policy(&self) -> CachePolicy {
        self.region.policy
    }

    /// Copy `data` into the region at `offset`
    pub fn write(&self, offset: usize, data: &[u8]) {
        assert!(offset + data.len() <= self.region.len, "write past region end");
        // SAFETY: bounds checked above.
        unsafe {
            core::ptr::copy_nonoverlapping(
                data.as_ptr(),
                self.virt().as_ptr().add(offset),
                data.len(),
            );
        }
    }

    pub fn read(&self, offset: usize, len: usize) -> Vec<u8> {
        assert!(offset + len <= self.region.len, "read past region end");
        // SAFETY: bounds checked above.
        unsafe { core::slice::from_raw_parts(self.virt().as_ptr().add(offset), len).to_vec() }
    }

    pub fn cache_log(&self) -> Vec<(usize, usize, CacheOp)> {
        lock(&self.region.cache_log).clone()
    }

    pub fn clear_cache_log(&self) {
        lock(&self.region.cache_log).clear();
    }

    pub fn is_unpinned(&self) -> bool {
        self.region.unpinned.load(Ordering::Acquire)
    }

    /// Make the next unpin fail
    pub fn fail_unpin(&self) {
        self.region.fail_unpin.store(true, Ordering::Release);
    }
}

impl PinnedBuffer for MockBuffer {
    fn virt(&self) -> NonNull<u8> {
        self.region.mem.cast()
    }

    fn len(&self) -> usize {
        self.region.len
    }

    fn lookup_phys(&self, offset: usize) -> DmaResult<u64> {
        if offset >= self.region.len {
            return Err(DmaError::AddressTranslation);
        }
        Ok(self.region.phys_base + offset as u64)
    }

    fn cache_flush(&self, offset: usize, len: usize, op: CacheOp) {
        lock(&self.region.cache_log).push((offset, len, op));
    }

    fn unpin(&self) -> DmaResult<()> {
        if self.region.fail_unpin.swap(false, Ordering::AcqRel) {
            return Err(DmaError::UnpinFailed);
        }
        if self.region.unpinned.swap(true, Ordering::AcqRel) {
            return Err(DmaError::UnpinFailed);
        }
        Ok(())
    }
}

#[derive(Default)]
struct BtiState {
    pinned: Vec<MockBuffer>,
    fail_at: Option<usize>,
    fail_unpin_at: Option<usize>,
}

/// Bus transaction token handing out [`MockBuffer`]s at increasing fake
/// physical addresses
#[derive(Clone)]
pub struct MockBti {
    state: Arc<Mutex<BtiState>>,
    next_phys: Arc<AtomicU64>,
}

impl MockBti {
    pub fn new() -> Self {
        Self::with_phys_base(0x1000_0000)
    }

    pub fn with_phys_base(base: u64) -> Self {
        Self {
            state: Arc::default(),
            next_phys: Arc::new(AtomicU64::new(base)),
        }
    }

    /// The `index`th region pinned so far
    pub fn pinned(&self, index: usize) -> MockBuffer {
        lock(&self.state).pinned[index].clone()
    }

    pub fn pin_count(&self) -> usize {
        lock(&self.state).pinned.len()
    }

    /// Refuse the pin request with this index
    pub fn fail_pin_at(&self, index: usize) {
        lock(&self.state).fail_at = Some(index);
    }

    /// Make the region pinned with this index refuse its first unpin
    pub fn fail_unpin_at(&self, index: usize) {
        lock(&self.state).fail_unpin_at = Some(index);
    }
}

impl Default for MockBti {
    fn default() -> Self {
        Self::new()
    }
}

impl BusTransaction for MockBti {
    type Buffer = MockBuffer;

    fn pin(&self, size: usize, policy: CachePolicy) -> DmaResult<MockBuffer> {
        let mut state = lock(&self.state);
        if state.fail_at == Some(state.pinned.len()) {
            return Err(DmaError::PinFailed);
        }

        let span = round_up(size.max(1), PAGE_SIZE) as u64;
        let phys = self.next_phys.fetch_add(span + PAGE_SIZE as u64, Ordering::Relaxed);
        let buffer = MockBuffer::new(size, policy, phys);
        if state.fail_unpin_at == Some(state.pinned.len()) {
            buffer.fail_unpin();
        }
        state.pinned.push(buffer.clone());
        Ok(buffer)
    }
}

/// Pin both regions for `N`-entry rings and build them. The descriptor
/// region is `pinned(0)`, the buffer region `pinned(1)`.
pub fn test_rings<const N: usize>() -> (MockBti, DmaRings<MockBuffer, N>) {
    let bti = MockBti::new();
    let descs = bti.pin(desc_region_size(N), CachePolicy::Uncached).unwrap();
    let slots = bti.pin(txn_region_size(N), CachePolicy::Cached).unwrap();
    let rings = DmaRings::init(Arc::new(descs), Arc::new(slots)).unwrap();
    (bti, rings)
}

// =============================================================================
// PHY Reset Pin
// =============================================================================

/// Output level driven on a [`MockPin`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinLevel {
    Low,
    High,
}

#[derive(Debug)]
pub struct PinFault;

impl digital::Error for PinFault {
    fn kind(&self) -> digital::ErrorKind {
        digital::ErrorKind::Other
    }
}

#[derive(Debug, Default)]
struct PinState {
    history: Vec<PinLevel>,
    failing: bool,
}

/// Output pin recording every level driven
#[derive(Debug, Clone, Default)]
pub struct MockPin {
    state: Arc<Mutex<PinState>>,
}

impl MockPin {
    pub fn new() -> Self {
        Self::default()
    }

    /// A pin whose every operation fails
    pub fn failing() -> Self {
        let pin = Self::default();
        lock(&pin.state).failing = true;
        pin
    }

    pub fn history(&self) -> Vec<PinLevel> {
        lock(&self.state).history.clone()
    }

    pub fn level(&self) -> Option<PinLevel> {
        lock(&self.state).history.last().copied()
    }

    fn drive(&self, level: PinLevel) -> Result<(), PinFault> {
        let mut state = lock(&self.state);
        if state.failing {
            return Err(PinFault);
        }
        state.history.push(level);
        Ok(())
    }
}

impl ErrorType for MockPin {
    type Error = PinFault;
}

impl OutputPin for MockPin {
    fn set_low(&mut self) -> Result<(), PinFault> {
        self.drive(PinLevel::Low)
    }

    fn set_high(&mut self) -> Result<(), PinFault> {
        self.drive(PinLevel::High)
    }
}

// =============================================================================
// Client
// =============================================================================

/// Callback observed by a [`RecordingClient`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    Status(LinkState),
    Frame(Vec<u8>),
}

/// Client forwarding every callback to a channel
pub struct RecordingClient {
    events: mpsc::Sender<ClientEvent>,
}

impl RecordingClient {
    pub fn new() -> (Self, mpsc::Receiver<ClientEvent>) {
        let (events, rx) = mpsc::channel();
        (Self { events }, rx)
    }
}

impl EthmacClient for RecordingClient {
    fn status(&mut self, state: LinkState) {
        // The test may have stopped listening.
        let _ = self.events.send(ClientEvent::Status(state));
    }

    fn recv(&mut self, frame: &[u8]) {
        let _ = self.events.send(ClientEvent::Frame(frame.to_vec()));
    }
}

// =============================================================================
// Platform
// =============================================================================

pub struct MockPlatform;

impl Platform for MockPlatform {
    type Regs = MockRegisters;
    type Buffer = MockBuffer;
    type Bti = MockBti;
    type Irq = Arc<SoftInterrupt>;
    type Delay = MockDelay;
    type PhyReset = MockPin;
}

/// Fresh resources plus the handles a test keeps for assertions
pub fn mock_resources() -> (
    Resources<MockPlatform>,
    MockRegisters,
    MockBti,
    Arc<SoftInterrupt>,
    MockPin,
) {
    let regs = MockRegisters::new();
    let bti = MockBti::new();
    let irq = Arc::new(SoftInterrupt::new());
    let pin = MockPin::new();
    let resources = Resources {
        regs: regs.clone(),
        bti: bti.clone(),
        irq: Arc::clone(&irq),
        delay: MockDelay::new(),
        phy_reset: pin.clone(),
    };
    (resources, regs, bti, irq, pin)
}
