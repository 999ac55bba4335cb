//! Register-level model of the STM32F4 for [`SimBus`].
//!
//! Oscillators and the PLL become ready as soon as they are switched on, the
//! clock switch status follows the switch request, GPIO BSRR writes update
//! ODR, and EXTI pending bits clear on a written one.

use crate::hw::stm32f4::{GPIO_PORT_COUNT, GPIO_PORT_STRIDE, GPIOA_BASE, exti, gpio, rcc};
use crate::mmio::{RegisterBus, SimBus};
use alloc::collections::BTreeMap;

/// Write hook for [`SimBus::with_write_hook`].
pub fn write_hook(regs: &mut BTreeMap<usize, u32>, addr: usize, value: u32) {
    match addr {
        rcc::CR => {
            let ready = [
                (rcc::CR_HSION, rcc::CR_HSIRDY),
                (rcc::CR_HSEON, rcc::CR_HSERDY),
                (rcc::CR_PLLON, rcc::CR_PLLRDY),
            ];
            let mut cr = value;
            for (on, rdy) in ready {
                if cr & on != 0 {
                    cr |= rdy;
                } else {
                    cr &= !rdy;
                }
            }
            regs.insert(addr, cr);
        }
        rcc::CFGR => {
            let sws = (value & rcc::CFGR_SW_MASK) << 2;
            regs.insert(addr, (value & !rcc::CFGR_SWS_MASK) | sws);
        }
        exti::PR => {
            let pending = regs.get(&addr).copied().unwrap_or(0);
            regs.insert(addr, pending & !value);
        }
        _ if is_gpio_bsrr(addr) => {
            let odr = addr - gpio::BSRR + gpio::ODR;
            let level = regs.get(&odr).copied().unwrap_or(0);
            regs.insert(odr, (level | (value & 0xffff)) & !(value >> 16));
        }
        _ => {
            regs.insert(addr, value);
        }
    }
}

fn is_gpio_bsrr(addr: usize) -> bool {
    let end = GPIOA_BASE + GPIO_PORT_COUNT * GPIO_PORT_STRIDE;
    (GPIOA_BASE..end).contains(&addr) && (addr - GPIOA_BASE) % GPIO_PORT_STRIDE == gpio::BSRR
}

/// Latch an EXTI pending bit, as an edge on `line` would.
pub fn raise_exti(bus: &SimBus, line: u32) {
    let pending = bus.read32(exti::PR);
    bus.preset(exti::PR, pending | (1 << line));
}
