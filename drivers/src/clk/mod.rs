//! Clock subsystem helpers shared by clock-controller backends.
//!
//! Peripheral clocks are gated per bus. A peripheral's enable bit is derived
//! from its register address: `(addr - bus_base) >> 10`, one bit per 1 KiB
//! slot. Backends describe their bus layout with a [`PeripheralMap`].

pub mod profile;

use crate::base::PlatformInfo;
use crate::base::ResourceFlags;
use crate::hal::clock::{ClockController, ClockDomain, ClockError, WaitStage};
use log::debug;

/// Peripheral bus a clock gate belongs to.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ClockBus {
    Apb1,
    Apb2,
    Ahb1,
    Ahb2,
    Ahb3,
}

/// Base addresses of the gated peripheral buses, in ascending order.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PeripheralMap {
    pub apb1: u32,
    pub apb2: u32,
    pub ahb1: u32,
    pub ahb2: u32,
    pub ahb3: u32,
}

impl PeripheralMap {
    /// Bus and enable-bit index for the peripheral at `addr`.
    ///
    /// AHB3 holds a single controller, so it always maps to bit 0.
    pub fn classify(&self, addr: u32) -> Result<(ClockBus, u32), ClockError> {
        let (bus, base) = if addr < self.apb1 {
            return Err(ClockError::InvalidAddress(addr));
        } else if addr < self.apb2 {
            (ClockBus::Apb1, self.apb1)
        } else if addr < self.ahb1 {
            (ClockBus::Apb2, self.apb2)
        } else if addr < self.ahb2 {
            (ClockBus::Ahb1, self.ahb1)
        } else if addr < self.ahb3 {
            (ClockBus::Ahb2, self.ahb2)
        } else {
            return Ok((ClockBus::Ahb3, 0));
        };

        let bit = (addr - base) >> 10;
        if bit >= 32 {
            return Err(ClockError::InvalidAddress(addr));
        }
        Ok((bus, bit))
    }
}

/// How long to poll a hardware ready flag.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum WaitPolicy {
    /// Give up after this many polls.
    Polls(u32),
    /// Poll until the flag asserts.
    Forever,
}

impl WaitPolicy {
    pub const DEFAULT_POLLS: u32 = 0x10_0000;
}

impl Default for WaitPolicy {
    fn default() -> Self {
        WaitPolicy::Polls(Self::DEFAULT_POLLS)
    }
}

/// Poll `ready` under `policy`.
pub fn wait_until(
    policy: WaitPolicy,
    stage: WaitStage,
    mut ready: impl FnMut() -> bool,
) -> Result<(), ClockError> {
    match policy {
        WaitPolicy::Forever => {
            while !ready() {
                core::hint::spin_loop();
            }
            Ok(())
        }
        WaitPolicy::Polls(budget) => {
            for _ in 0..budget {
                if ready() {
                    return Ok(());
                }
                core::hint::spin_loop();
            }
            if ready() {
                Ok(())
            } else {
                Err(ClockError::Timeout(stage))
            }
        }
    }
}

/// Enable the clock gate of the peripheral at `addr`. Idempotent.
pub fn clk_setup_periph(clock: &dyn ClockController, addr: u32) -> Result<(), ClockError> {
    clock.enable_periph(addr)
}

/// Current frequency of `domain`, 0 unless the PLL drives the system clock.
pub fn clk_get(clock: &dyn ClockController, domain: ClockDomain) -> u32 {
    clock.rate(domain)
}

/// Reprogram the clock tree for a `target_hz` system clock.
pub fn clk_update(clock: &dyn ClockController, target_hz: u32) -> Result<(), ClockError> {
    clock.update(target_hz)
}

/// Enable the clock of every register window (IO or REG resource) of a
/// platform device.
pub fn clk_setup_dev(clock: &dyn ClockController, dev: &PlatformInfo) -> Result<(), ClockError> {
    for res in dev
        .resources()
        .iter()
        .filter(|res| res.is_type(ResourceFlags::IO | ResourceFlags::REG))
    {
        debug!("clk: enabling clock for {:#010x}", res.start);
        clk_setup_periph(clock, res.start)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAP: PeripheralMap = PeripheralMap {
        apb1: 0x4000_0000,
        apb2: 0x4001_0000,
        ahb1: 0x4002_0000,
        ahb2: 0x5000_0000,
        ahb3: 0x6000_0000,
    };

    #[test]
    fn classify_by_bus_window() {
        assert_eq!(MAP.classify(0x4000_7000), Ok((ClockBus::Apb1, 28)));
        assert_eq!(MAP.classify(0x4001_1000), Ok((ClockBus::Apb2, 4)));
        assert_eq!(MAP.classify(0x4002_0000), Ok((ClockBus::Ahb1, 0)));
        assert_eq!(MAP.classify(0x4002_2000), Ok((ClockBus::Ahb1, 8)));
        assert_eq!(MAP.classify(0x5000_0000), Ok((ClockBus::Ahb2, 0)));
        assert_eq!(MAP.classify(0x6c00_0000), Ok((ClockBus::Ahb3, 0)));
    }

    #[test]
    fn classify_rejects_unmapped_addresses() {
        assert_eq!(
            MAP.classify(0x2000_0000),
            Err(ClockError::InvalidAddress(0x2000_0000))
        );
        // 32 KiB past the AHB1 base has no enable bit.
        assert_eq!(
            MAP.classify(0x4002_8000),
            Err(ClockError::InvalidAddress(0x4002_8000))
        );
    }

    #[test]
    fn bounded_wait_expires() {
        let mut polls = 0;
        let res = wait_until(WaitPolicy::Polls(10), WaitStage::PllReady, || {
            polls += 1;
            false
        });
        assert_eq!(res, Err(ClockError::Timeout(WaitStage::PllReady)));
        assert_eq!(polls, 11);
    }

    #[test]
    fn wait_returns_once_ready() {
        let mut polls = 0;
        let res = wait_until(WaitPolicy::Forever, WaitStage::HseReady, || {
            polls += 1;
            polls == 3
        });
        assert_eq!(res, Ok(()));
        assert_eq!(polls, 3);
    }
}
