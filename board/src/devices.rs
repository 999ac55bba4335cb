//! Static device table and pin groups.

use crate::config::{
    DM9000_ADDR, DM9000_DATA, DM9000_IRQ, LEDS, UART1_RX, UART1_TX,
};
use drivers::base::{PlatformDevice, Resource};
use drivers::hal::gpio::{GpioNum, PinLevel, PullMode};
use drivers::hal::pinctrl::{OutputType, PinConfig, PinGroup, PinGroupCatalog};
use drivers::hw::stm32f4::{
    GPIO_PORT_COUNT, GPIO_PORT_STRIDE, USART1_BASE, gpio, gpio_port_base,
};
use drivers::platform::stm32f4::gpio::GPIO_DRIVER_NAME;
use drivers::platform::stm32f4::pinctrl::PCTRL_DRIVER_NAME;

static GPIO_PINS: [GpioNum; 4] = LEDS;
static UART1_PINS: [GpioNum; 2] = [UART1_TX, UART1_RX];

static PIN_GROUPS: [PinGroup; 2] = [
    PinGroup {
        name: "gpio",
        pins: &GPIO_PINS,
        config: PinConfig::output(OutputType::PushPull, PinLevel::High),
    },
    PinGroup {
        name: "uart1",
        pins: &UART1_PINS,
        config: PinConfig::alternate(gpio::af::USART1, PullMode::Up, OutputType::PushPull),
    },
];

pub static PIN_CATALOG: PinGroupCatalog = PinGroupCatalog::new(&PIN_GROUPS);

const fn gpio_ports() -> [Resource; GPIO_PORT_COUNT] {
    let mut ports = [Resource::io(0, 0); GPIO_PORT_COUNT];
    let mut port = 0;
    while port < GPIO_PORT_COUNT {
        ports[port] = Resource::io(gpio_port_base(port) as u32, GPIO_PORT_STRIDE as u32);
        port += 1;
    }
    ports
}

static GPIO_RESOURCES: [Resource; GPIO_PORT_COUNT] = gpio_ports();

static DM9000_RESOURCES: [Resource; 3] = [
    Resource::mem(DM9000_ADDR, 4),
    Resource::mem(DM9000_DATA, 4),
    Resource::irq(DM9000_IRQ, true),
];

static USART1_RESOURCES: [Resource; 1] = [Resource::io(USART1_BASE as u32, 0x400)];

/// Devices registered at boot, in order.
///
/// The pin controller comes first so the groups it exports are known by
/// the time the GPIO device binds.
pub static DEVICE_TABLE: [PlatformDevice; 4] = [
    PlatformDevice::new(PCTRL_DRIVER_NAME).with_platform_data(&PIN_CATALOG),
    PlatformDevice::new(GPIO_DRIVER_NAME)
        .with_resources(&GPIO_RESOURCES)
        .with_pinctrl("gpio"),
    PlatformDevice::new("usart1")
        .with_resources(&USART1_RESOURCES)
        .with_pinctrl("uart1"),
    PlatformDevice::new("dm9000").with_resources(&DM9000_RESOURCES),
];

#[cfg(test)]
mod tests {
    use super::*;
    use drivers::base::ResourceFlags;
    use drivers::hw::stm32f4::{GPIOA_BASE, GPIOI_BASE};

    #[test]
    fn every_device_group_exists() {
        for dev in &DEVICE_TABLE {
            if let Some(group) = dev.pinctrl {
                assert!(PIN_CATALOG.find(group).is_some(), "{}", group);
            }
        }
    }

    #[test]
    fn gpio_device_covers_all_ports() {
        assert_eq!(GPIO_RESOURCES[0].start, GPIOA_BASE as u32);
        assert_eq!(GPIO_RESOURCES[8].start, GPIOI_BASE as u32);
        assert!(GPIO_RESOURCES.iter().all(|res| res.size() == 0x400));
        assert!(GPIO_RESOURCES.iter().all(|res| res.is_type(ResourceFlags::IO)));
    }

    #[test]
    fn uart_pins_use_usart_function() {
        let usart1 = DEVICE_TABLE.iter().find(|dev| dev.name == "usart1").unwrap();
        assert_eq!(usart1.pinctrl, Some("uart1"));
        let uart = PIN_CATALOG.find("uart1").unwrap();
        assert_eq!(uart.pins, [UART1_TX, UART1_RX]);
        assert_eq!(uart.config.af(), 7);
        assert_eq!(uart.config.pull(), Ok(PullMode::Up));
    }
}
