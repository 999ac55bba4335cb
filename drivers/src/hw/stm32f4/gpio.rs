//! GPIO port registers.
//!
//! Offsets are relative to a port base, see [`super::gpio_port_base`].

use core::mem::{offset_of, size_of};
use static_assertions::const_assert_eq;

#[repr(C)]
struct Registers {
    moder: u32,
    otyper: u32,
    ospeedr: u32,
    pupdr: u32,
    idr: u32,
    odr: u32,
    bsrr: u32,
    lckr: u32,
    afr: [u32; 2],
}

const_assert_eq!(size_of::<Registers>(), 0x28);

pub const MODER: usize = offset_of!(Registers, moder);
pub const OTYPER: usize = offset_of!(Registers, otyper);
pub const OSPEEDR: usize = offset_of!(Registers, ospeedr);
pub const PUPDR: usize = offset_of!(Registers, pupdr);
pub const IDR: usize = offset_of!(Registers, idr);
pub const ODR: usize = offset_of!(Registers, odr);
pub const BSRR: usize = offset_of!(Registers, bsrr);
pub const AFRL: usize = offset_of!(Registers, afr);
pub const AFRH: usize = AFRL + 4;

/// Output speed field values.
#[repr(u32)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Speed {
    Fast50M = 2,
}

/// BSRR word driving `pin` high.
pub const fn bsrr_set(pin: u32) -> u32 {
    1 << pin
}

/// BSRR word driving `pin` low.
pub const fn bsrr_reset(pin: u32) -> u32 {
    1 << (pin + 16)
}

/// Alternate function numbers by peripheral.
pub mod af {
    pub const USART1: u32 = 7;
}
