//! Reset HAL
//!
//! DMA soft reset with a bounded wait, and the active-low PHY reset line.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::error::{ConfigError, ConfigResult};
use crate::register::RegisterIo;
use crate::register::dma::DmaRegs;
use crate::register::mac::MacRegs;

/// Perform a DMA soft reset
///
/// Sets the software reset bit, then checks it up to `attempts` times,
/// sleeping `interval_ms` before each check. The reset wipes the station
/// address registers, so they are saved before and restored after.
///
/// Returns [`ConfigError::ResetFailed`] if the bit is still set after the
/// last attempt.
pub fn soft_reset<R: RegisterIo, D: DelayNs>(
    regs: &R,
    delay: &mut D,
    attempts: u32,
    interval_ms: u32,
) -> ConfigResult<()> {
    let mac = MacRegs::new(regs);
    let dma = DmaRegs::new(regs);

    let saved = mac.mac_address_words();
    dma.request_soft_reset();

    for _ in 0..attempts {
        delay.delay_ms(interval_ms);
        if !dma.is_reset_in_progress() {
            mac.set_mac_address_words(saved);
            return Ok(());
        }
    }

    log::error!("DMA soft reset did not complete after {attempts} polls");
    Err(ConfigError::ResetFailed)
}

/// Pulse the PHY reset line: hold low for `pulse_ms`, release, settle for
/// `pulse_ms`
pub fn pulse_phy_reset<P: OutputPin, D: DelayNs>(
    pin: &mut P,
    delay: &mut D,
    pulse_ms: u32,
) -> ConfigResult<()> {
    pin.set_low().map_err(|_| ConfigError::GpioError)?;
    delay.delay_ms(pulse_ms);

    pin.set_high().map_err(|_| ConfigError::GpioError)?;
    delay.delay_ms(pulse_ms);

    Ok(())
}

/// Hold the PHY in reset
pub fn hold_phy_reset<P: OutputPin>(pin: &mut P) -> ConfigResult<()> {
    pin.set_low().map_err(|_| ConfigError::GpioError)
}
