pub mod clock;
pub mod gpio;
pub mod pinctrl;
pub mod sim;

use super::Platform;
use crate::base::{Registry, Result};
use crate::clk::PeripheralMap;
use crate::hal::clock::ClockController;
use crate::hw::stm32f4::{
    AHB1PERIPH_BASE, AHB2PERIPH_BASE, AHB3PERIPH_BASE, APB1PERIPH_BASE, APB2PERIPH_BASE,
};
use crate::mmio::RegisterBus;
use alloc::sync::Arc;
use clock::Stm32Clock;
use gpio::Stm32GpioDriver;
use log::debug;
use pinctrl::Stm32PinctrlDriver;

/// Clock-gated bus windows of the STM32F4.
pub const PERIPHERAL_MAP: PeripheralMap = PeripheralMap {
    apb1: APB1PERIPH_BASE as u32,
    apb2: APB2PERIPH_BASE as u32,
    ahb1: AHB1PERIPH_BASE as u32,
    ahb2: AHB2PERIPH_BASE as u32,
    ahb3: AHB3PERIPH_BASE as u32,
};

pub struct Stm32f4Platform;

impl Platform for Stm32f4Platform {
    fn name() -> &'static str {
        "STM32F4"
    }

    fn clock(bus: Arc<dyn RegisterBus>) -> Arc<dyn ClockController> {
        Arc::new(Stm32Clock::new(bus))
    }

    fn register_drivers(
        registry: &mut Registry,
        bus: Arc<dyn RegisterBus>,
        clock: Arc<dyn ClockController>,
    ) -> Result<()> {
        registry.platform_driver_register(Arc::new(Stm32PinctrlDriver::new(bus, clock.clone())))?;
        registry.platform_driver_register(Arc::new(Stm32GpioDriver::new(clock)))?;
        debug!("{}: platform drivers registered", Self::name());
        Ok(())
    }
}
