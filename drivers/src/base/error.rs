//! Error codes shared by the driver core.

use core::fmt;

/// Errors returned by registry, platform, pin-control and GPIO operations.
///
/// A failed `probe()` during an attach scan is not one of these: the scan
/// simply moves on to the next driver and reports [`Attach::NoMatch`] when
/// nothing binds.
///
/// [`Attach::NoMatch`]: super::Attach::NoMatch
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DriverError {
    /// Malformed descriptor, missing name, wrong lifecycle state or an
    /// out-of-range port/pin/field.
    InvalidArgument,
    /// No matching driver, pin group, bus, device or resource.
    NotFound,
    /// The operation is absent from the active backend, or no backend is
    /// registered.
    NotSupported,
    /// The resource is already claimed.
    Busy,
    /// A hardware wait did not complete within its poll budget.
    Timeout,
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            DriverError::InvalidArgument => "invalid argument",
            DriverError::NotFound => "not found",
            DriverError::NotSupported => "operation not supported",
            DriverError::Busy => "resource busy",
            DriverError::Timeout => "hardware wait timed out",
        };
        f.write_str(msg)
    }
}

/// Result type used throughout the driver core.
pub type Result<T> = core::result::Result<T, DriverError>;
