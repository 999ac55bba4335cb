//! 32-bit register access.
//!
//! Backends program hardware through a [`RegisterBus`] instead of raw
//! pointers so the same register sequences run against [`Mmio`] on the
//! target and [`SimBus`] on the host.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;
use core::ptr::{read_volatile, write_volatile};
use spin::Mutex;

/// Word-wide register access by absolute address.
pub trait RegisterBus: Send + Sync {
    fn read32(&self, addr: usize) -> u32;

    fn write32(&self, addr: usize, value: u32);

    fn set_bits(&self, addr: usize, bits: u32) {
        self.write32(addr, self.read32(addr) | bits);
    }

    fn clear_bits(&self, addr: usize, bits: u32) {
        self.write32(addr, self.read32(addr) & !bits);
    }

    /// Clear `clear`, then set `set`, in one write.
    fn clear_set_bits(&self, addr: usize, clear: u32, set: u32) {
        self.write32(addr, (self.read32(addr) & !clear) | set);
    }
}

/// Memory-mapped I/O.
pub struct Mmio {
    _private: (),
}

impl Mmio {
    /// Create the MMIO bus.
    ///
    /// # Safety
    /// Every address later passed to it must be a valid, mapped device
    /// register for the running SoC.
    pub const unsafe fn new() -> Self {
        Self { _private: () }
    }
}

impl RegisterBus for Mmio {
    #[inline(always)]
    fn read32(&self, addr: usize) -> u32 {
        unsafe { read_volatile(addr as *const u32) }
    }

    #[inline(always)]
    fn write32(&self, addr: usize, value: u32) {
        unsafe { write_volatile(addr as *mut u32, value) }
    }
}

/// Applies a register write to the simulated register file.
///
/// Lets a model react to writes, e.g. raise a ready flag when its enable
/// bit is set.
pub type WriteHook = fn(regs: &mut BTreeMap<usize, u32>, addr: usize, value: u32);

/// In-memory register file. Unwritten registers read as zero.
///
/// Every write is appended to a log, in order, before the hook runs.
pub struct SimBus {
    regs: Mutex<BTreeMap<usize, u32>>,
    log: Mutex<Vec<(usize, u32)>>,
    hook: Option<WriteHook>,
}

impl SimBus {
    pub const fn new() -> Self {
        Self {
            regs: Mutex::new(BTreeMap::new()),
            log: Mutex::new(Vec::new()),
            hook: None,
        }
    }

    pub const fn with_write_hook(hook: WriteHook) -> Self {
        Self {
            regs: Mutex::new(BTreeMap::new()),
            log: Mutex::new(Vec::new()),
            hook: Some(hook),
        }
    }

    /// Set a register without logging or running the hook.
    pub fn preset(&self, addr: usize, value: u32) {
        self.regs.lock().insert(addr, value);
    }

    /// Copy of the write log.
    pub fn writes(&self) -> Vec<(usize, u32)> {
        self.log.lock().clone()
    }

    /// Values written to `addr`, in order.
    pub fn writes_to(&self, addr: usize) -> Vec<u32> {
        self.log
            .lock()
            .iter()
            .filter(|(a, _)| *a == addr)
            .map(|(_, v)| *v)
            .collect()
    }

    /// Index in the write log of the first write matching `pred`.
    pub fn first_write(&self, pred: impl Fn(usize, u32) -> bool) -> Option<usize> {
        self.log.lock().iter().position(|&(a, v)| pred(a, v))
    }
}

impl Default for SimBus {
    fn default() -> Self {
        Self::new()
    }
}

impl RegisterBus for SimBus {
    fn read32(&self, addr: usize) -> u32 {
        self.regs.lock().get(&addr).copied().unwrap_or(0)
    }

    fn write32(&self, addr: usize, value: u32) {
        self.log.lock().push((addr, value));

        let mut regs = self.regs.lock();
        match self.hook {
            Some(hook) => hook(&mut regs, addr, value),
            None => {
                regs.insert(addr, value);
            }
        }
    }
}
