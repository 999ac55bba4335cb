//! STM32F4 memory map.

pub mod exti;
pub mod flash;
pub mod gpio;
pub mod pwr;
pub mod rcc;

pub const PERIPH_BASE: usize = 0x4000_0000;

pub const APB1PERIPH_BASE: usize = PERIPH_BASE;
pub const APB2PERIPH_BASE: usize = PERIPH_BASE + 0x0001_0000;
pub const AHB1PERIPH_BASE: usize = PERIPH_BASE + 0x0002_0000;
pub const AHB2PERIPH_BASE: usize = PERIPH_BASE + 0x1000_0000;
pub const AHB3PERIPH_BASE: usize = PERIPH_BASE + 0x2000_0000;

// APB1
pub const PWR_BASE: usize = APB1PERIPH_BASE + 0x7000;

// APB2
pub const USART1_BASE: usize = APB2PERIPH_BASE + 0x1000;
pub const EXTI_BASE: usize = APB2PERIPH_BASE + 0x3c00;

// AHB1
pub const GPIOA_BASE: usize = AHB1PERIPH_BASE;
pub const GPIOI_BASE: usize = AHB1PERIPH_BASE + 0x2000;
pub const RCC_BASE: usize = AHB1PERIPH_BASE + 0x3800;
pub const FLASH_R_BASE: usize = AHB1PERIPH_BASE + 0x3c00;

/// Number of GPIO ports, A through I.
pub const GPIO_PORT_COUNT: usize = 9;

/// Stride between GPIO port register blocks.
pub const GPIO_PORT_STRIDE: usize = 0x400;

/// Total GPIO count.
pub const GPIO_NUM: u32 = (GPIO_PORT_COUNT * 16) as u32;

/// Register block of GPIO port `port` (0 = A).
pub const fn gpio_port_base(port: usize) -> usize {
    GPIOA_BASE + port * GPIO_PORT_STRIDE
}
