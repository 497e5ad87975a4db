//! Error types for the DWMAC driver
//!
//! Errors are organized by domain for better diagnostics:
//! - [`ConfigError`]: Bring-up and configuration failures
//! - [`DmaError`]: Pinned memory and descriptor ring issues
//! - [`IoError`]: Runtime TX, MDIO, client and interrupt failures
//!
//! The unified [`Error`] enum wraps all domain errors and is returned
//! by most driver methods. [`Error::kind`] folds every error into the
//! status classes a network stack sees ([`ErrorKind`]).

// =============================================================================
// Configuration Errors
// =============================================================================

/// Bring-up and configuration errors
///
/// These abort device creation; no partially initialized device is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Invalid configuration parameter
    InvalidConfig,
    /// Invalid PHY address (must be 0-31)
    InvalidPhyAddress,
    /// DMA soft reset did not complete within its retry budget
    ResetFailed,
    /// PHY reset line could not be driven
    GpioError,
    /// Interrupt service thread could not be spawned
    ThreadSpawnFailed,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ConfigError {
    /// Returns a human-readable description of the error
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ConfigError::InvalidConfig => "invalid configuration",
            ConfigError::InvalidPhyAddress => "invalid PHY address",
            ConfigError::ResetFailed => "DMA soft reset timed out",
            ConfigError::GpioError => "PHY reset line error",
            ConfigError::ThreadSpawnFailed => "could not spawn service thread",
        }
    }
}

// =============================================================================
// DMA Errors
// =============================================================================

/// Pinned memory and descriptor ring errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DmaError {
    /// The bus transaction token refused to pin the region
    PinFailed,
    /// Offset could not be translated to a physical address
    AddressTranslation,
    /// Physical address does not fit the 32-bit descriptor fields
    AddressOutOfRange,
    /// Region could not be unpinned
    UnpinFailed,
    /// Pinned region smaller than the ring layout needs
    RegionTooSmall,
    /// Frame larger than one ring slot
    FrameTooLarge,
}

impl core::fmt::Display for DmaError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl DmaError {
    /// Returns a human-readable description of the error
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            DmaError::PinFailed => "could not pin DMA region",
            DmaError::AddressTranslation => "physical address lookup failed",
            DmaError::AddressOutOfRange => "physical address above 4 GiB",
            DmaError::UnpinFailed => "could not unpin DMA region",
            DmaError::RegionTooSmall => "pinned region too small for rings",
            DmaError::FrameTooLarge => "frame too large for ring slot",
        }
    }
}

// =============================================================================
// I/O Errors
// =============================================================================

/// Runtime errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IoError {
    /// MDIO busy bit never cleared
    Timeout,
    /// Link is down, frame not queued
    LinkDown,
    /// A client is already bound
    AlreadyBound,
    /// Operation not supported by this driver
    NotSupported,
    /// The interrupt wait failed
    InterruptFailed,
    /// The interrupt wait was cancelled
    Canceled,
}

impl core::fmt::Display for IoError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl IoError {
    /// Returns a human-readable description of the error
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            IoError::Timeout => "operation timed out",
            IoError::LinkDown => "link is down",
            IoError::AlreadyBound => "client already bound",
            IoError::NotSupported => "operation not supported",
            IoError::InterruptFailed => "interrupt wait failed",
            IoError::Canceled => "interrupt wait cancelled",
        }
    }
}

// =============================================================================
// Unified Error Type
// =============================================================================

/// Client-facing status class of an [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ErrorKind {
    /// Fatal during device creation
    BringUp,
    /// A bounded poll expired
    Timeout,
    /// Caller passed something the driver cannot accept
    InvalidArgument,
    /// Device state does not allow the operation right now
    Unavailable,
    /// A client is already registered
    AlreadyBound,
    /// Operation is not implemented
    NotSupported,
    /// The interrupt primitive failed or was cancelled
    Interrupt,
}

/// Wraps all domain-specific errors for unified error handling.
///
/// Match on the inner domain error for specific handling:
/// ```ignore
/// match device.queue_tx(0, &frame) {
///     Err(Error::Io(IoError::LinkDown)) => { /* retry later */ }
///     Err(Error::Dma(DmaError::FrameTooLarge)) => { /* drop */ }
///     _ => {}
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Configuration error
    Config(ConfigError),
    /// DMA error
    Dma(DmaError),
    /// I/O error
    Io(IoError),
}

impl Error {
    /// Status class of this error
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Error::Config(ConfigError::InvalidConfig | ConfigError::InvalidPhyAddress)
            | Error::Dma(DmaError::FrameTooLarge) => ErrorKind::InvalidArgument,
            Error::Config(_)
            | Error::Dma(
                DmaError::PinFailed
                | DmaError::AddressTranslation
                | DmaError::AddressOutOfRange
                | DmaError::UnpinFailed
                | DmaError::RegionTooSmall,
            ) => ErrorKind::BringUp,
            Error::Io(IoError::Timeout) => ErrorKind::Timeout,
            Error::Io(IoError::LinkDown) => ErrorKind::Unavailable,
            Error::Io(IoError::AlreadyBound) => ErrorKind::AlreadyBound,
            Error::Io(IoError::NotSupported) => ErrorKind::NotSupported,
            Error::Io(IoError::InterruptFailed | IoError::Canceled) => ErrorKind::Interrupt,
        }
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Config(e) => write!(f, "config: {}", e.as_str()),
            Error::Dma(e) => write!(f, "dma: {}", e.as_str()),
            Error::Io(e) => write!(f, "io: {}", e.as_str()),
        }
    }
}

impl core::error::Error for Error {}

// From impls for automatic conversion
impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl From<DmaError> for Error {
    fn from(e: DmaError) -> Self {
        Error::Dma(e)
    }
}

impl From<IoError> for Error {
    fn from(e: IoError) -> Self {
        Error::Io(e)
    }
}

/// Result type alias for driver operations
pub type Result<T> = core::result::Result<T, Error>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = core::result::Result<T, ConfigError>;

/// Result type alias for DMA operations
pub type DmaResult<T> = core::result::Result<T, DmaError>;

/// Result type alias for I/O operations
pub type IoResult<T> = core::result::Result<T, IoError>;

// =============================================================================
// Unit Tests
// =============================================================================
