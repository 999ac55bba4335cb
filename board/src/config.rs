//! Board configuration.

use drivers::hal::gpio::{GpioNum, Port};

pub use drivers::clk::profile::{HSE_HZ, SYS_CLK_FREQ};

pub const BOARD_NAME: &str = "armfly-stm32f407ig";

// User LEDs, active high.
pub const LED1: GpioNum = GpioNum::of(Port::I, 10);
pub const LED2: GpioNum = GpioNum::of(Port::F, 7);
pub const LED3: GpioNum = GpioNum::of(Port::F, 8);
pub const LED4: GpioNum = GpioNum::of(Port::C, 2);

pub const LEDS: [GpioNum; 4] = [LED1, LED2, LED3, LED4];

/// USART1 console pins.
pub const UART1_TX: GpioNum = GpioNum::of(Port::A, 9);
pub const UART1_RX: GpioNum = GpioNum::of(Port::A, 10);

/// DM9000 Ethernet controller on FMC bank 1, NE4.
pub const DM9000_ADDR: u32 = 0x6c00_0000;
pub const DM9000_DATA: u32 = 0x6c00_0008;
/// EXTI9_5, shared by the DM9000 interrupt pin.
pub const DM9000_IRQ: u32 = 23;
