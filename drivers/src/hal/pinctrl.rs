//! Pin-control Hardware Abstraction Layer.
//!
//! A pin controller multiplexes pins between GPIO and peripheral functions.
//! Boards describe pins in named [`PinGroup`]s, each carrying one
//! configuration word applied to every pin in the group.

use super::gpio::{GpioNum, GpioOps, PinLevel, PullMode};
use crate::base::{DriverError, Result};
use alloc::sync::Arc;
use core::fmt;

/// Pin function.
#[repr(u32)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PinMode {
    Input = 0,
    Output = 1,
    /// Routed to a peripheral through the alternate-function mux.
    Alternate = 2,
    Analog = 3,
}

/// Output driver type.
#[repr(u32)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum OutputType {
    PushPull = 0,
    OpenDrain = 1,
}

/// Packed pin configuration word.
///
/// ```text
/// bits 0-3  alternate function number
/// bits 4-5  mode (input, output, alternate, analog)
/// bits 6-7  pull (none, up, down)
/// bit  8    output type (push-pull, open-drain)
/// bit  9    output level
/// ```
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct PinConfig(u32);

impl PinConfig {
    const AF_MASK: u32 = 0xf;
    const MODE_SHIFT: u32 = 4;
    const MODE_MASK: u32 = 0x3 << Self::MODE_SHIFT;
    const PULL_SHIFT: u32 = 6;
    const PULL_MASK: u32 = 0x3 << Self::PULL_SHIFT;
    const OTYPE_SHIFT: u32 = 8;
    const LEVEL_SHIFT: u32 = 9;

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn new(mode: PinMode, pull: PullMode, otype: OutputType) -> Self {
        Self(
            ((mode as u32) << Self::MODE_SHIFT)
                | (Self::pull_code(pull) << Self::PULL_SHIFT)
                | ((otype as u32) << Self::OTYPE_SHIFT),
        )
    }

    pub const fn input(pull: PullMode) -> Self {
        Self::new(PinMode::Input, pull, OutputType::PushPull)
    }

    /// Output driving `level` once configured.
    pub const fn output(otype: OutputType, level: PinLevel) -> Self {
        Self::new(PinMode::Output, PullMode::None, otype).with_level(level)
    }

    /// Alternate function `af` (0..=15).
    pub const fn alternate(af: u32, pull: PullMode, otype: OutputType) -> Self {
        Self(Self::new(PinMode::Alternate, pull, otype).0 | (af & Self::AF_MASK))
    }

    pub const fn with_level(self, level: PinLevel) -> Self {
        let bit = match level {
            PinLevel::Low => 0,
            PinLevel::High => 1,
        };
        Self((self.0 & !(1 << Self::LEVEL_SHIFT)) | (bit << Self::LEVEL_SHIFT))
    }

    const fn pull_code(pull: PullMode) -> u32 {
        match pull {
            PullMode::None => 0,
            PullMode::Up => 1,
            PullMode::Down => 2,
        }
    }

    pub const fn af(self) -> u32 {
        self.0 & Self::AF_MASK
    }

    pub const fn mode(self) -> PinMode {
        match (self.0 & Self::MODE_MASK) >> Self::MODE_SHIFT {
            0 => PinMode::Input,
            1 => PinMode::Output,
            2 => PinMode::Alternate,
            _ => PinMode::Analog,
        }
    }

    /// Pull setting; InvalidArgument for the reserved encoding.
    pub fn pull(self) -> Result<PullMode> {
        match (self.0 & Self::PULL_MASK) >> Self::PULL_SHIFT {
            0 => Ok(PullMode::None),
            1 => Ok(PullMode::Up),
            2 => Ok(PullMode::Down),
            _ => Err(DriverError::InvalidArgument),
        }
    }

    pub const fn output_type(self) -> OutputType {
        if self.0 & (1 << Self::OTYPE_SHIFT) != 0 {
            OutputType::OpenDrain
        } else {
            OutputType::PushPull
        }
    }

    pub const fn level(self) -> PinLevel {
        if self.0 & (1 << Self::LEVEL_SHIFT) != 0 {
            PinLevel::High
        } else {
            PinLevel::Low
        }
    }
}

impl fmt::Debug for PinConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PinConfig")
            .field("mode", &self.mode())
            .field("af", &self.af())
            .field("pull", &self.pull())
            .field("otype", &self.output_type())
            .field("level", &self.level())
            .finish()
    }
}

/// Named set of pins sharing one configuration.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PinGroup {
    pub name: &'static str,
    pub pins: &'static [GpioNum],
    pub config: PinConfig,
}

/// Static table of the pin groups a board defines.
#[derive(Debug, Copy, Clone)]
pub struct PinGroupCatalog {
    groups: &'static [PinGroup],
}

impl PinGroupCatalog {
    pub const fn new(groups: &'static [PinGroup]) -> Self {
        Self { groups }
    }

    /// Exact, case-sensitive lookup in table order.
    pub fn find(&self, name: &str) -> Option<&'static PinGroup> {
        self.groups.iter().find(|group| group.name == name)
    }

    pub fn groups(&self) -> &'static [PinGroup] {
        self.groups
    }
}

/// Per-pin configuration access.
pub trait PinconfOps: Send + Sync {
    fn pin_config_set(&self, pin: GpioNum, config: PinConfig) -> Result<()>;

    /// Read the configuration back from the hardware.
    fn pin_config_get(&self, pin: GpioNum) -> Result<PinConfig>;
}

/// What a pin controller registers with the pin-control core.
#[derive(Clone)]
pub struct PinctrlDesc {
    pub name: &'static str,
    pub npins: u32,
    pub catalog: PinGroupCatalog,
    pub conf_ops: Option<Arc<dyn PinconfOps>>,
    /// GPIO operations exported to the GPIO driver.
    pub gpio_ops: Option<Arc<dyn GpioOps>>,
}

impl fmt::Debug for PinctrlDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PinctrlDesc")
            .field("name", &self.name)
            .field("npins", &self.npins)
            .field("groups", &self.catalog.groups().len())
            .field("conf_ops", &self.conf_ops.is_some())
            .field("gpio_ops", &self.gpio_ops.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::gpio::Port;

    #[test]
    fn config_word_layout() {
        let uart = PinConfig::alternate(7, PullMode::Up, OutputType::PushPull);
        assert_eq!(uart.bits(), 0x07 | (2 << 4) | (1 << 6));
        assert_eq!(uart.af(), 7);
        assert_eq!(uart.mode(), PinMode::Alternate);
        assert_eq!(uart.pull(), Ok(PullMode::Up));

        let led = PinConfig::output(OutputType::OpenDrain, PinLevel::High);
        assert_eq!(led.bits(), (1 << 4) | (1 << 8) | (1 << 9));
        assert_eq!(led.level(), PinLevel::High);
        assert_eq!(led.with_level(PinLevel::Low).level(), PinLevel::Low);

        assert_eq!(PinConfig::from_bits(3 << 6).pull(), Err(DriverError::InvalidArgument));
    }

    #[test]
    fn catalog_lookup_is_exact() {
        static GROUPS: [PinGroup; 2] = [
            PinGroup {
                name: "uart1",
                pins: &[GpioNum::of(Port::A, 9), GpioNum::of(Port::A, 10)],
                config: PinConfig::alternate(7, PullMode::Up, OutputType::PushPull),
            },
            PinGroup {
                name: "gpio",
                pins: &[],
                config: PinConfig::input(PullMode::None),
            },
        ];
        let catalog = PinGroupCatalog::new(&GROUPS);

        assert_eq!(catalog.find("uart1").map(|g| g.pins.len()), Some(2));
        assert!(catalog.find("UART1").is_none());
        assert!(catalog.find("uart").is_none());
    }
}
