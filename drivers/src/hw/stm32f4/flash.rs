//! Flash interface registers.

use super::FLASH_R_BASE;

/// Access control register.
pub const ACR: usize = FLASH_R_BASE;

pub const ACR_LATENCY_MASK: u32 = 0xf;
pub const ACR_PRFTEN: u32 = 1 << 8;
pub const ACR_ICEN: u32 = 1 << 9;
pub const ACR_DCEN: u32 = 1 << 10;
