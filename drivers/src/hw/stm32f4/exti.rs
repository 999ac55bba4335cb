//! External interrupt/event controller (EXTI) registers.

use super::EXTI_BASE;
use core::mem::offset_of;

#[repr(C)]
struct Registers {
    imr: u32,
    emr: u32,
    rtsr: u32,
    ftsr: u32,
    swier: u32,
    pr: u32,
}

/// Interrupt mask.
pub const IMR: usize = EXTI_BASE + offset_of!(Registers, imr);
/// Rising trigger selection.
pub const RTSR: usize = EXTI_BASE + offset_of!(Registers, rtsr);
/// Falling trigger selection.
pub const FTSR: usize = EXTI_BASE + offset_of!(Registers, ftsr);
/// Pending, write 1 to clear.
pub const PR: usize = EXTI_BASE + offset_of!(Registers, pr);
