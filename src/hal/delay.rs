//! Thread-sleep delay provider and the monotonic clock behind poll deadlines.

use std::sync::OnceLock;
use std::time::{Duration, Instant};

use embedded_hal::delay::DelayNs;

/// Monotonic microsecond time source.
///
/// Bounded polls take their deadline from this clock rather than adding up
/// the requested sleep lengths, since a hosted sleep may run long.
pub trait Clock {
    /// Microseconds since an arbitrary fixed origin
    fn now_us(&self) -> u64;
}

/// [`DelayNs`] backed by [`std::thread::sleep`].
///
/// Sleeps for at least the requested time; the OS scheduler may round up.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdDelay;

impl StdDelay {
    /// Create a new delay provider
    pub const fn new() -> Self {
        Self
    }
}

impl Clock for StdDelay {
    fn now_us(&self) -> u64 {
        static ORIGIN: OnceLock<Instant> = OnceLock::new();
        let origin = *ORIGIN.get_or_init(Instant::now);
        u64::try_from(origin.elapsed().as_micros()).unwrap_or(u64::MAX)
    }
}

impl DelayNs for StdDelay {
    fn delay_ns(&mut self, ns: u32) {
        std::thread::sleep(Duration::from_nanos(u64::from(ns)));
    }

    fn delay_us(&mut self, us: u32) {
        std::thread::sleep(Duration::from_micros(u64::from(us)));
    }

    fn delay_ms(&mut self, ms: u32) {
        std::thread::sleep(Duration::from_millis(u64::from(ms)));
    }
}
