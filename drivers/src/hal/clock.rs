//! Clock controller Hardware Abstraction Layer.

use crate::base::DriverError;
use core::fmt;

/// Clock domain whose frequency can be queried.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ClockDomain {
    /// System (core) clock.
    Core,
    Ahb,
    Apb1,
    Apb2,
}

/// Hardware wait that can expire during clock bring-up.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum WaitStage {
    /// External oscillator ready.
    HseReady,
    /// PLL locked.
    PllReady,
    /// System clock switched to the PLL.
    SysclkSwitch,
}

/// Clock errors.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ClockError {
    /// A ready flag did not assert within the wait budget.
    Timeout(WaitStage),
    /// The address belongs to no gated peripheral bus.
    InvalidAddress(u32),
    /// The PLL parameters for the requested frequency are out of range.
    InvalidProfile,
}

impl fmt::Display for ClockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClockError::Timeout(stage) => write!(f, "timed out waiting for {:?}", stage),
            ClockError::InvalidAddress(addr) => {
                write!(f, "no clock gate for address {:#010x}", addr)
            }
            ClockError::InvalidProfile => f.write_str("invalid PLL profile"),
        }
    }
}

impl From<ClockError> for DriverError {
    fn from(err: ClockError) -> Self {
        match err {
            ClockError::Timeout(_) => DriverError::Timeout,
            ClockError::InvalidAddress(_) | ClockError::InvalidProfile => {
                DriverError::InvalidArgument
            }
        }
    }
}

/// System clock controller.
pub trait ClockController: Send + Sync {
    /// Current frequency of `domain` in Hz, 0 if the system clock is not
    /// running from the PLL.
    fn rate(&self, domain: ClockDomain) -> u32;

    /// Enable the clock of the peripheral whose registers start at `addr`.
    /// Enabling an already running clock is a no-op.
    fn enable_periph(&self, addr: u32) -> Result<(), ClockError>;

    /// Bring the system clock up to `target_hz` from the PLL.
    fn update(&self, target_hz: u32) -> Result<(), ClockError>;
}
