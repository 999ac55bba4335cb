//! Power controller registers.

use super::PWR_BASE;

pub const CR: usize = PWR_BASE;

/// Regulator voltage scale 1, required above 144 MHz.
pub const CR_VOS_SCALE1: u32 = 0xc000;
