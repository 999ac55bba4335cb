//! STM32F4 pin controller.
//!
//! [`Stm32Pinmux`] programs the GPIO port registers and serves both the
//! pin-configuration and the GPIO operations. The `stm32-pctrl` platform
//! driver registers it with the pin-control core, taking the board's pin
//! group catalog from its device's platform data.

use crate::base::{DeviceId, Driver, DriverError, Registry, Result};
use crate::hal::clock::ClockController;
use crate::hal::gpio::{EdgeDetect, GpioNum, GpioOps, PinLevel, PullMode};
use crate::hal::pinctrl::{OutputType, PinConfig, PinGroupCatalog, PinconfOps, PinctrlDesc};
use crate::hw::stm32f4::{GPIO_NUM, GPIO_PORT_COUNT, exti, gpio, gpio_port_base};
use crate::mmio::RegisterBus;
use alloc::sync::Arc;
use log::{debug, info};
use spin::Mutex;

pub const PCTRL_DRIVER_NAME: &str = "stm32-pctrl";

/// Port and pin of a GPIO number, or InvalidArgument past port I.
fn split(gpio: GpioNum) -> Result<(usize, u32)> {
    let port = gpio.port_index() as usize;
    if port >= GPIO_PORT_COUNT {
        return Err(DriverError::InvalidArgument);
    }
    Ok((port, gpio.pin()))
}

const fn pull_field(pull: PullMode) -> u32 {
    match pull {
        PullMode::None => 0,
        PullMode::Up => 1,
        PullMode::Down => 2,
    }
}

pub struct Stm32Pinmux {
    bus: Arc<dyn RegisterBus>,
    clock: Arc<dyn ClockController>,
    /// Requested pins, one bit per pin, per port.
    requested: Mutex<[u16; GPIO_PORT_COUNT]>,
}

impl Stm32Pinmux {
    pub fn new(bus: Arc<dyn RegisterBus>, clock: Arc<dyn ClockController>) -> Self {
        Self {
            bus,
            clock,
            requested: Mutex::new([0; GPIO_PORT_COUNT]),
        }
    }

    pub fn is_requested(&self, gpio: GpioNum) -> bool {
        match split(gpio) {
            Ok((port, pin)) => self.requested.lock()[port] & (1 << pin) != 0,
            Err(_) => false,
        }
    }

    fn requested_pin(&self, gpio: GpioNum) -> Result<(usize, u32)> {
        let (port, pin) = split(gpio)?;
        if self.requested.lock()[port] & (1 << pin) == 0 {
            return Err(DriverError::InvalidArgument);
        }
        Ok((port, pin))
    }

    fn write_level(&self, port: usize, pin: u32, level: PinLevel) {
        let word = match level {
            PinLevel::High => gpio::bsrr_set(pin),
            PinLevel::Low => gpio::bsrr_reset(pin),
        };
        self.bus.write32(gpio_port_base(port) + gpio::BSRR, word);
    }

    fn configure(&self, port: usize, pin: u32, config: PinConfig) -> Result<()> {
        let pull = pull_field(config.pull()?);
        let base = gpio_port_base(port);

        self.clock.enable_periph(base as u32)?;

        let afr = if pin < 8 { gpio::AFRL } else { gpio::AFRH };
        let shift = (pin & 0x7) * 4;
        self.bus
            .clear_set_bits(base + afr, 0xf << shift, config.af() << shift);

        self.bus.clear_set_bits(
            base + gpio::OTYPER,
            1 << pin,
            (config.output_type() as u32) << pin,
        );

        let shift = pin * 2;
        self.bus
            .clear_set_bits(base + gpio::MODER, 0x3 << shift, (config.mode() as u32) << shift);
        self.bus.clear_set_bits(
            base + gpio::OSPEEDR,
            0x3 << shift,
            (gpio::Speed::Fast50M as u32) << shift,
        );
        self.bus
            .clear_set_bits(base + gpio::PUPDR, 0x3 << shift, pull << shift);

        self.write_level(port, pin, config.level());
        Ok(())
    }

    fn read_config(&self, port: usize, pin: u32) -> PinConfig {
        let base = gpio_port_base(port);
        let afr = if pin < 8 { gpio::AFRL } else { gpio::AFRH };

        let af = (self.bus.read32(base + afr) >> ((pin & 0x7) * 4)) & 0xf;
        let mode = (self.bus.read32(base + gpio::MODER) >> (pin * 2)) & 0x3;
        let pull = (self.bus.read32(base + gpio::PUPDR) >> (pin * 2)) & 0x3;
        let otype = (self.bus.read32(base + gpio::OTYPER) >> pin) & 0x1;
        let level = (self.bus.read32(base + gpio::ODR) >> pin) & 0x1;

        PinConfig::from_bits(af | (mode << 4) | (pull << 6) | (otype << 8) | (level << 9))
    }
}

impl PinconfOps for Stm32Pinmux {
    fn pin_config_set(&self, pin: GpioNum, config: PinConfig) -> Result<()> {
        let (port, pin) = split(pin)?;
        self.configure(port, pin, config)
    }

    fn pin_config_get(&self, pin: GpioNum) -> Result<PinConfig> {
        let (port, pin) = split(pin)?;
        Ok(self.read_config(port, pin))
    }
}

impl GpioOps for Stm32Pinmux {
    fn direction_input(&self, gpio: GpioNum) -> Result<()> {
        let (port, pin) = self.requested_pin(gpio)?;
        self.configure(port, pin, PinConfig::input(PullMode::None))
    }

    fn direction_output(&self, gpio: GpioNum, level: PinLevel) -> Result<()> {
        let (port, pin) = self.requested_pin(gpio)?;
        self.configure(port, pin, PinConfig::output(OutputType::PushPull, level))
    }

    fn get_value(&self, gpio: GpioNum) -> Result<PinLevel> {
        let (port, pin) = self.requested_pin(gpio)?;
        let idr = self.bus.read32(gpio_port_base(port) + gpio::IDR);
        Ok(PinLevel::from(idr & (1 << pin) != 0))
    }

    fn set_value(&self, gpio: GpioNum, level: PinLevel) -> Result<()> {
        let (port, pin) = self.requested_pin(gpio)?;
        self.write_level(port, pin, level);
        Ok(())
    }

    fn request(&self, gpio: GpioNum) -> Result<()> {
        let (port, pin) = split(gpio)?;
        let mut requested = self.requested.lock();
        if requested[port] & (1 << pin) != 0 {
            return Err(DriverError::Busy);
        }
        requested[port] |= 1 << pin;
        Ok(())
    }

    fn free(&self, gpio: GpioNum) -> Result<()> {
        let (port, pin) = split(gpio)?;
        self.requested.lock()[port] &= !(1 << pin);
        Ok(())
    }

    /// Select the EXTI edge for the line of `gpio`'s pin number.
    fn irq_set(&self, gpio: GpioNum, edge: EdgeDetect) -> Result<()> {
        let (_, pin) = split(gpio)?;
        let line = 1 << pin;
        match edge {
            EdgeDetect::Rising => {
                self.bus.set_bits(exti::RTSR, line);
                self.bus.clear_bits(exti::FTSR, line);
            }
            EdgeDetect::Falling => {
                self.bus.clear_bits(exti::RTSR, line);
                self.bus.set_bits(exti::FTSR, line);
            }
            EdgeDetect::Both => {
                self.bus.set_bits(exti::RTSR, line);
                self.bus.set_bits(exti::FTSR, line);
            }
        }
        Ok(())
    }

    fn irq_enable(&self, gpio: GpioNum, enable: bool) -> Result<()> {
        let (_, pin) = split(gpio)?;
        if enable {
            self.bus.set_bits(exti::IMR, 1 << pin);
        } else {
            self.bus.clear_bits(exti::IMR, 1 << pin);
        }
        Ok(())
    }

    fn irq_pend_clear(&self, gpio: GpioNum) -> Result<()> {
        let (_, pin) = split(gpio)?;
        self.bus.write32(exti::PR, 1 << pin);
        Ok(())
    }
}

/// `stm32-pctrl` platform driver.
pub struct Stm32PinctrlDriver {
    bus: Arc<dyn RegisterBus>,
    clock: Arc<dyn ClockController>,
}

impl Stm32PinctrlDriver {
    pub fn new(bus: Arc<dyn RegisterBus>, clock: Arc<dyn ClockController>) -> Self {
        Self { bus, clock }
    }
}

impl Driver for Stm32PinctrlDriver {
    fn name(&self) -> &'static str {
        PCTRL_DRIVER_NAME
    }

    fn probe(&self, registry: &mut Registry, dev: DeviceId) -> Result<()> {
        let info = registry.platform_device(dev)?;
        let catalog = *info
            .platform_data::<PinGroupCatalog>()
            .ok_or(DriverError::InvalidArgument)?;

        let name = registry.device(dev)?.name();
        info!("device '{}': {} pins", name, GPIO_NUM);
        debug!("device '{}': {} pin groups", name, catalog.groups().len());

        let pinmux = Arc::new(Stm32Pinmux::new(self.bus.clone(), self.clock.clone()));
        let conf_ops: Arc<dyn PinconfOps> = pinmux.clone();
        let gpio_ops: Arc<dyn GpioOps> = pinmux;
        registry.pinctrl_mut().register(PinctrlDesc {
            name,
            npins: GPIO_NUM,
            catalog,
            conf_ops: Some(conf_ops),
            gpio_ops: Some(gpio_ops),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::gpio::Port;
    use crate::hal::pinctrl::PinMode;
    use crate::hw::stm32f4::{GPIOA_BASE, GPIOI_BASE, rcc};
    use crate::mmio::SimBus;
    use crate::platform::stm32f4::clock::Stm32Clock;
    use crate::platform::stm32f4::sim;

    fn pinmux() -> (Arc<SimBus>, Stm32Pinmux) {
        let bus = Arc::new(SimBus::with_write_hook(sim::write_hook));
        let clock = Arc::new(Stm32Clock::new(bus.clone()));
        (bus.clone(), Stm32Pinmux::new(bus, clock))
    }

    #[test]
    fn alternate_function_programming() {
        let (bus, mux) = pinmux();
        let cfg = PinConfig::alternate(gpio::af::USART1, PullMode::Up, OutputType::PushPull);
        mux.pin_config_set(GpioNum::of(Port::A, 10), cfg).unwrap();

        assert_eq!(bus.read32(rcc::AHB1ENR) & 1, 1);
        assert_eq!(bus.read32(GPIOA_BASE + gpio::AFRH), 7 << 8);
        assert_eq!(bus.read32(GPIOA_BASE + gpio::MODER), 2 << 20);
        assert_eq!(bus.read32(GPIOA_BASE + gpio::OSPEEDR), 2 << 20);
        assert_eq!(bus.read32(GPIOA_BASE + gpio::PUPDR), 1 << 20);
        assert_eq!(bus.read32(GPIOA_BASE + gpio::OTYPER), 0);

        let back = mux.pin_config_get(GpioNum::of(Port::A, 10)).unwrap();
        assert_eq!(back.af(), 7);
        assert_eq!(back.mode(), PinMode::Alternate);
        assert_eq!(back.pull(), Ok(PullMode::Up));
    }

    #[test]
    fn config_clears_previous_fields() {
        let (bus, mux) = pinmux();
        let pin = GpioNum::of(Port::I, 10);
        mux.pin_config_set(pin, PinConfig::alternate(15, PullMode::Down, OutputType::OpenDrain))
            .unwrap();
        mux.pin_config_set(pin, PinConfig::output(OutputType::PushPull, PinLevel::High))
            .unwrap();

        assert_eq!(bus.read32(GPIOI_BASE + gpio::AFRH), 0);
        assert_eq!(bus.read32(GPIOI_BASE + gpio::MODER), 1 << 20);
        assert_eq!(bus.read32(GPIOI_BASE + gpio::PUPDR), 0);
        assert_eq!(bus.read32(GPIOI_BASE + gpio::OTYPER), 0);
        assert_eq!(bus.read32(GPIOI_BASE + gpio::ODR), 1 << 10);
        assert_eq!(mux.pin_config_get(pin).unwrap().level(), PinLevel::High);
    }

    #[test]
    fn invalid_port_and_pull_rejected() {
        let (bus, mux) = pinmux();
        assert_eq!(
            mux.pin_config_set(GpioNum::from_raw(9 * 16), PinConfig::input(PullMode::None)),
            Err(DriverError::InvalidArgument)
        );
        assert_eq!(
            mux.pin_config_set(GpioNum::of(Port::B, 0), PinConfig::from_bits(3 << 6)),
            Err(DriverError::InvalidArgument)
        );
        assert!(bus.writes().is_empty());
    }

    #[test]
    fn request_free_and_use_checks() {
        let (_bus, mux) = pinmux();
        let led = GpioNum::of(Port::F, 7);

        assert_eq!(mux.set_value(led, PinLevel::High), Err(DriverError::InvalidArgument));
        mux.request(led).unwrap();
        assert!(mux.is_requested(led));
        assert_eq!(mux.request(led), Err(DriverError::Busy));
        mux.free(led).unwrap();
        assert!(!mux.is_requested(led));
        mux.request(led).unwrap();
        assert_eq!(mux.request(GpioNum::from_raw(200)), Err(DriverError::InvalidArgument));
    }

    #[test]
    fn output_drives_requested_level() {
        let (bus, mux) = pinmux();
        let led = GpioNum::of(Port::C, 2);
        mux.request(led).unwrap();
        mux.direction_output(led, PinLevel::High).unwrap();

        let base = gpio_port_base(2);
        assert_eq!((bus.read32(base + gpio::MODER) >> 4) & 0x3, 1);
        assert_eq!(bus.read32(base + gpio::OTYPER) & (1 << 2), 0);
        assert_eq!(bus.read32(base + gpio::ODR), 1 << 2);

        mux.set_value(led, PinLevel::Low).unwrap();
        assert_eq!(bus.read32(base + gpio::ODR), 0);
    }

    #[test]
    fn input_reads_idr() {
        let (bus, mux) = pinmux();
        let key = GpioNum::of(Port::I, 8);
        mux.request(key).unwrap();
        mux.direction_input(key).unwrap();
        assert_eq!((bus.read32(GPIOI_BASE + gpio::MODER) >> 16) & 0x3, 0);

        bus.preset(GPIOI_BASE + gpio::IDR, 1 << 8);
        assert_eq!(mux.get_value(key), Ok(PinLevel::High));
        bus.preset(GPIOI_BASE + gpio::IDR, 0);
        assert_eq!(mux.get_value(key), Ok(PinLevel::Low));
    }

    #[test]
    fn exti_trigger_enable_and_clear() {
        let (bus, mux) = pinmux();
        let key = GpioNum::of(Port::I, 11);

        mux.irq_set(key, EdgeDetect::Falling).unwrap();
        mux.irq_enable(key, true).unwrap();
        mux.irq_enable(GpioNum::of(Port::A, 0), true).unwrap();
        assert_eq!(bus.read32(exti::FTSR), 1 << 11);
        assert_eq!(bus.read32(exti::RTSR), 0);
        assert_eq!(bus.read32(exti::IMR), (1 << 11) | 1);

        mux.irq_set(key, EdgeDetect::Both).unwrap();
        assert_eq!(bus.read32(exti::RTSR), 1 << 11);

        mux.irq_enable(key, false).unwrap();
        assert_eq!(bus.read32(exti::IMR), 1);

        sim::raise_exti(&bus, 11);
        sim::raise_exti(&bus, 3);
        mux.irq_pend_clear(key).unwrap();
        assert_eq!(bus.read32(exti::PR), 1 << 3);
    }
}
