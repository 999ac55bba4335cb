//! Hardware resources owned by a platform device.
//!
//! The flag word keeps the historical layout:
//!
//! ```text
//! | reserved | reserved | 15 - 8 | 7 - 0 |
//! 15 - 08: resource types
//! 07 - 00: resource offsets or attribute
//! ```

use bitflags::bitflags;

bitflags! {
    /// Resource type and attribute bits.
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
    pub struct ResourceFlags: u32 {
        /// Peripheral I/O register window.
        const IO = 0x0000_0100;
        /// Memory window (external bus, SRAM, ...).
        const MEM = 0x0000_0200;
        /// Register region.
        const REG = 0x0000_0400;
        /// Interrupt line; `start` holds the IRQ number.
        const IRQ = 0x0000_0800;
        /// DMA channel.
        const DMA = 0x0000_1000;
        /// Bus number.
        const BUS = 0x0000_2000;

        /// IRQ attribute: trigger on the falling edge (rising otherwise).
        const IRQ_FALLING = 0x0000_0001;
    }
}

/// Mask of the attribute byte.
pub const RESOURCE_ATTR_MASK: u32 = 0x0000_00ff;

/// Mask of the type byte.
pub const RESOURCE_TYPE_MASK: u32 = 0x0000_ff00;

/// A typed hardware range: `[start, end)` for windows, `start == end == irq`
/// for interrupt lines.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Resource {
    pub start: u32,
    pub end: u32,
    pub flags: ResourceFlags,
}

impl Resource {
    pub const fn new(start: u32, end: u32, flags: ResourceFlags) -> Self {
        Self { start, end, flags }
    }

    /// Peripheral register window of `size` bytes at `start`.
    pub const fn io(start: u32, size: u32) -> Self {
        Self::new(start, start + size, ResourceFlags::IO)
    }

    /// Memory window of `size` bytes at `start`.
    pub const fn mem(start: u32, size: u32) -> Self {
        Self::new(start, start + size, ResourceFlags::MEM)
    }

    /// Interrupt line.
    pub const fn irq(irq: u32, falling: bool) -> Self {
        let flags = if falling {
            ResourceFlags::IRQ.union(ResourceFlags::IRQ_FALLING)
        } else {
            ResourceFlags::IRQ
        };
        Self::new(irq, irq, flags)
    }

    /// Size of the window in bytes. Zero for IRQ lines.
    pub const fn size(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    /// True if any of the type bits in `ty` is set on this resource.
    pub fn is_type(&self, ty: ResourceFlags) -> bool {
        let ty = ResourceFlags::from_bits_retain(ty.bits() & RESOURCE_TYPE_MASK);
        self.flags.intersects(ty)
    }

    /// The attribute byte.
    pub fn attr(&self) -> u32 {
        self.flags.bits() & RESOURCE_ATTR_MASK
    }
}
