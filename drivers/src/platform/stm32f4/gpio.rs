//! `stm32-gpio` platform driver.
//!
//! Publishes the pin controller's GPIO operations to the GPIO dispatch and
//! turns on the clocks of the GPIO ports listed in its device's resources.

use crate::base::{DeviceId, Driver, DriverError, Registry, Result};
use crate::clk::clk_setup_dev;
use crate::hal::clock::ClockController;
use alloc::sync::Arc;
use log::info;

pub const GPIO_DRIVER_NAME: &str = "stm32-gpio";

pub struct Stm32GpioDriver {
    clock: Arc<dyn ClockController>,
}

impl Stm32GpioDriver {
    pub fn new(clock: Arc<dyn ClockController>) -> Self {
        Self { clock }
    }
}

impl Driver for Stm32GpioDriver {
    fn name(&self) -> &'static str {
        GPIO_DRIVER_NAME
    }

    fn probe(&self, registry: &mut Registry, dev: DeviceId) -> Result<()> {
        if registry.platform_device(dev)?.pin_group().is_none() {
            return Err(DriverError::NotFound);
        }
        let ops = registry.pinctrl().gpio_ops().ok_or(DriverError::NotFound)?;
        registry.gpio_mut().register(ops);

        let info = registry.platform_device(dev)?;
        clk_setup_dev(&*self.clock, info)?;
        info!(
            "device '{}': {} port clocks enabled",
            registry.device(dev)?.name(),
            info.resources().len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::{DeviceState, PlatformDevice, Resource};
    use crate::hal::gpio::{GpioNum, PinLevel, Port, PullMode};
    use crate::hal::pinctrl::{OutputType, PinConfig, PinGroup, PinGroupCatalog};
    use crate::hw::stm32f4::{GPIOA_BASE, rcc};
    use crate::mmio::{RegisterBus, SimBus};
    use crate::platform::stm32f4::clock::Stm32Clock;
    use crate::platform::stm32f4::pinctrl::Stm32PinctrlDriver;
    use crate::platform::stm32f4::sim;

    static LED_PINS: [GpioNum; 1] = [GpioNum::of(Port::F, 7)];
    static GROUPS: [PinGroup; 2] = [
        PinGroup {
            name: "gpio",
            pins: &LED_PINS,
            config: PinConfig::output(OutputType::PushPull, PinLevel::High),
        },
        PinGroup {
            name: "key",
            pins: &[],
            config: PinConfig::input(PullMode::Up),
        },
    ];
    static CATALOG: PinGroupCatalog = PinGroupCatalog::new(&GROUPS);
    static PORTS: [Resource; 2] = [
        Resource::io(GPIOA_BASE as u32, 0x400),
        Resource::io(GPIOA_BASE as u32 + 0x1400, 0x400),
    ];

    fn setup() -> (Arc<SimBus>, Arc<Stm32Clock>, Registry) {
        let bus = Arc::new(SimBus::with_write_hook(sim::write_hook));
        let clock = Arc::new(Stm32Clock::new(bus.clone()));
        let mut registry = Registry::new();
        registry.platform_bus_init().unwrap();
        (bus, clock, registry)
    }

    #[test]
    fn publishes_gpio_ops_and_enables_port_clocks() {
        let (bus, clock, mut registry) = setup();
        registry
            .platform_driver_register(Arc::new(Stm32PinctrlDriver::new(bus.clone(), clock.clone())))
            .unwrap();
        registry
            .platform_driver_register(Arc::new(Stm32GpioDriver::new(clock)))
            .unwrap();

        registry
            .platform_device_register(PlatformDevice::new("stm32-pctrl").with_platform_data(&CATALOG))
            .unwrap();
        let gpio = registry
            .platform_device_register(
                PlatformDevice::new("stm32-gpio")
                    .with_resources(&PORTS)
                    .with_pinctrl("gpio"),
            )
            .unwrap();

        assert_eq!(registry.device(gpio).unwrap().state(), DeviceState::Bound);
        assert!(registry.gpio().is_registered());
        assert_eq!(bus.read32(rcc::AHB1ENR), (1 << 0) | (1 << 5));

        // The group drove PF7 high before probe.
        let portf = GPIOA_BASE + 5 * 0x400;
        assert_eq!(bus.read32(portf + crate::hw::stm32f4::gpio::ODR), 1 << 7);
    }

    #[test]
    fn probe_needs_a_pin_controller() {
        let (_bus, clock, mut registry) = setup();
        registry
            .platform_driver_register(Arc::new(Stm32GpioDriver::new(clock)))
            .unwrap();
        let gpio = registry
            .platform_device_register(PlatformDevice::new("stm32-gpio").with_pinctrl("gpio"))
            .unwrap();

        assert_eq!(registry.device(gpio).unwrap().state(), DeviceState::Registered);
        assert!(!registry.gpio().is_registered());
    }

    #[test]
    fn pinctrl_probe_needs_a_catalog() {
        let (bus, clock, mut registry) = setup();
        registry
            .platform_driver_register(Arc::new(Stm32PinctrlDriver::new(bus, clock)))
            .unwrap();
        let pctrl = registry
            .platform_device_register(PlatformDevice::new("stm32-pctrl"))
            .unwrap();

        assert!(!registry.device(pctrl).unwrap().is_bound());
        assert!(!registry.pinctrl().is_registered());
    }
}
