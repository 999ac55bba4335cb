//! Reset and clock control (RCC) registers.

use super::RCC_BASE;
use core::mem::{offset_of, size_of};
use static_assertions::const_assert_eq;

/// Memory-mapped register layout.
#[repr(C)]
struct Registers {
    cr: u32,
    pllcfgr: u32,
    cfgr: u32,
    cir: u32,
    ahb1rstr: u32,
    ahb2rstr: u32,
    ahb3rstr: u32,
    _r0: u32,
    apb1rstr: u32,
    apb2rstr: u32,
    _r1: [u32; 2],
    ahb1enr: u32,
    ahb2enr: u32,
    ahb3enr: u32,
    _r2: u32,
    apb1enr: u32,
    apb2enr: u32,
    _r3: [u32; 2],
    ahb1lpenr: u32,
    ahb2lpenr: u32,
    ahb3lpenr: u32,
    _r4: u32,
    apb1lpenr: u32,
    apb2lpenr: u32,
    _r5: [u32; 2],
    bdcr: u32,
    csr: u32,
    _r6: [u32; 2],
    sscgr: u32,
    plli2scfgr: u32,
    pllsaicfgr: u32,
    dckcfgr: u32,
}

const_assert_eq!(size_of::<Registers>(), 0x90);

pub const CR: usize = RCC_BASE + offset_of!(Registers, cr);
pub const PLLCFGR: usize = RCC_BASE + offset_of!(Registers, pllcfgr);
pub const CFGR: usize = RCC_BASE + offset_of!(Registers, cfgr);
pub const CIR: usize = RCC_BASE + offset_of!(Registers, cir);
pub const AHB1ENR: usize = RCC_BASE + offset_of!(Registers, ahb1enr);
pub const AHB2ENR: usize = RCC_BASE + offset_of!(Registers, ahb2enr);
pub const AHB3ENR: usize = RCC_BASE + offset_of!(Registers, ahb3enr);
pub const APB1ENR: usize = RCC_BASE + offset_of!(Registers, apb1enr);
pub const APB2ENR: usize = RCC_BASE + offset_of!(Registers, apb2enr);

const_assert_eq!(AHB1ENR - RCC_BASE, 0x30);
const_assert_eq!(APB1ENR - RCC_BASE, 0x40);

pub const CR_HSION: u32 = 1 << 0;
pub const CR_HSIRDY: u32 = 1 << 1;
pub const CR_HSEON: u32 = 1 << 16;
pub const CR_HSERDY: u32 = 1 << 17;
pub const CR_HSEBYP: u32 = 1 << 18;
pub const CR_CSSON: u32 = 1 << 19;
pub const CR_PLLON: u32 = 1 << 24;
pub const CR_PLLRDY: u32 = 1 << 25;

/// PLLCFGR value after reset.
pub const PLLCFGR_RESET: u32 = 0x2400_3010;
pub const PLLCFGR_PLLM_MASK: u32 = 0x3f;
pub const PLLCFGR_PLLN_MASK: u32 = 0x7fc0;
pub const PLLCFGR_PLLN_SHIFT: u32 = 6;
pub const PLLCFGR_PLLP_MASK: u32 = 0x3_0000;
pub const PLLCFGR_PLLP_SHIFT: u32 = 16;
pub const PLLCFGR_PLLSRC_HSE: u32 = 1 << 22;
pub const PLLCFGR_PLLQ_MASK: u32 = 0xf00_0000;
pub const PLLCFGR_PLLQ_SHIFT: u32 = 24;

pub const CFGR_SW_MASK: u32 = 0x3;
pub const CFGR_SW_PLL: u32 = 0x2;
pub const CFGR_SWS_MASK: u32 = 0xc;
pub const CFGR_SWS_PLL: u32 = 0x8;
pub const CFGR_HPRE_MASK: u32 = 0xf0;
pub const CFGR_HPRE_SHIFT: u32 = 4;
pub const CFGR_PPRE1_MASK: u32 = 0x1c00;
pub const CFGR_PPRE1_SHIFT: u32 = 10;
pub const CFGR_PPRE2_MASK: u32 = 0xe000;
pub const CFGR_PPRE2_SHIFT: u32 = 13;

pub const APB1ENR_PWREN: u32 = 1 << 28;
