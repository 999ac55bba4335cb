//! GPIO (General Purpose Input/Output) Hardware Abstraction Layer.
//!
//! GPIOs are numbered globally as `port * 16 + pin`, ports A through I.
//! A backend implements [`GpioOps`]; the dispatch layer in [`crate::gpio`]
//! forwards to whichever backend is active.

use crate::base::{DriverError, Result};
use core::fmt;
use core::ops::Not;

/// Pins per port.
pub const PINS_PER_PORT: u32 = 16;

/// Pin logic level.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PinLevel {
    /// Logic low (0V or ground).
    Low,
    /// Logic high (VDD).
    High,
}

impl From<bool> for PinLevel {
    fn from(value: bool) -> Self {
        if value {
            PinLevel::High
        } else {
            PinLevel::Low
        }
    }
}

impl From<PinLevel> for bool {
    fn from(level: PinLevel) -> bool {
        matches!(level, PinLevel::High)
    }
}

impl Not for PinLevel {
    type Output = PinLevel;

    fn not(self) -> PinLevel {
        match self {
            PinLevel::Low => PinLevel::High,
            PinLevel::High => PinLevel::Low,
        }
    }
}

/// Internal pull resistor configuration.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PullMode {
    /// No pull resistor (high impedance).
    None,
    /// Enable internal pull-up resistor.
    Up,
    /// Enable internal pull-down resistor.
    Down,
}

/// Edge that raises a GPIO interrupt.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EdgeDetect {
    /// Detect rising edge (low-to-high transition).
    Rising,
    /// Detect falling edge (high-to-low transition).
    Falling,
    /// Detect both rising and falling edges.
    Both,
}

/// GPIO port letter.
#[repr(u32)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Port {
    A = 0,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
}

impl Port {
    pub const COUNT: u32 = 9;

    pub const fn from_index(index: u32) -> Option<Port> {
        Some(match index {
            0 => Port::A,
            1 => Port::B,
            2 => Port::C,
            3 => Port::D,
            4 => Port::E,
            5 => Port::F,
            6 => Port::G,
            7 => Port::H,
            8 => Port::I,
            _ => return None,
        })
    }

    pub const fn index(self) -> u32 {
        self as u32
    }
}

/// Global GPIO number.
///
/// Any `u32` can be carried; backends reject numbers outside their ports.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GpioNum(u32);

impl GpioNum {
    /// GPIO `pin` of `port`. Panics (at compile time in const context) if
    /// `pin` is not below 16.
    pub const fn of(port: Port, pin: u32) -> Self {
        assert!(pin < PINS_PER_PORT);
        Self(port.index() * PINS_PER_PORT + pin)
    }

    pub fn new(port: Port, pin: u32) -> Result<Self> {
        if pin < PINS_PER_PORT {
            Ok(Self::of(port, pin))
        } else {
            Err(DriverError::InvalidArgument)
        }
    }

    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Port index, unchecked.
    pub const fn port_index(self) -> u32 {
        self.0 / PINS_PER_PORT
    }

    pub const fn pin(self) -> u32 {
        self.0 % PINS_PER_PORT
    }

    pub const fn port(self) -> Option<Port> {
        Port::from_index(self.port_index())
    }
}

impl fmt::Debug for GpioNum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.port() {
            Some(port) => write!(f, "P{:?}{}", port, self.pin()),
            None => write!(f, "GPIO#{}", self.0),
        }
    }
}

/// GPIO backend operations.
///
/// Every operation defaults to [`DriverError::NotSupported`], so a backend
/// implements only what its hardware offers.
pub trait GpioOps: Send + Sync {
    fn direction_input(&self, gpio: GpioNum) -> Result<()> {
        let _ = gpio;
        Err(DriverError::NotSupported)
    }

    /// Make `gpio` a push-pull output driving `level`.
    fn direction_output(&self, gpio: GpioNum, level: PinLevel) -> Result<()> {
        let _ = (gpio, level);
        Err(DriverError::NotSupported)
    }

    fn get_value(&self, gpio: GpioNum) -> Result<PinLevel> {
        let _ = gpio;
        Err(DriverError::NotSupported)
    }

    fn set_value(&self, gpio: GpioNum, level: PinLevel) -> Result<()> {
        let _ = (gpio, level);
        Err(DriverError::NotSupported)
    }

    /// Claim `gpio`; Busy if it is already claimed.
    fn request(&self, gpio: GpioNum) -> Result<()> {
        let _ = gpio;
        Err(DriverError::NotSupported)
    }

    fn free(&self, gpio: GpioNum) -> Result<()> {
        let _ = gpio;
        Err(DriverError::NotSupported)
    }

    /// Select the interrupt trigger edge.
    fn irq_set(&self, gpio: GpioNum, edge: EdgeDetect) -> Result<()> {
        let _ = (gpio, edge);
        Err(DriverError::NotSupported)
    }

    fn irq_enable(&self, gpio: GpioNum, enable: bool) -> Result<()> {
        let _ = (gpio, enable);
        Err(DriverError::NotSupported)
    }

    fn irq_pend_clear(&self, gpio: GpioNum) -> Result<()> {
        let _ = gpio;
        Err(DriverError::NotSupported)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gpio_numbering() {
        let pi10 = GpioNum::of(Port::I, 10);
        assert_eq!(pi10.raw(), 8 * 16 + 10);
        assert_eq!(pi10.port(), Some(Port::I));
        assert_eq!(pi10.pin(), 10);
        assert_eq!(GpioNum::new(Port::A, 16), Err(DriverError::InvalidArgument));
        assert_eq!(GpioNum::from_raw(9 * 16).port(), None);
    }

    #[test]
    fn level_inverts() {
        assert_eq!(!PinLevel::Low, PinLevel::High);
        assert!(bool::from(PinLevel::from(true)));
    }
}
