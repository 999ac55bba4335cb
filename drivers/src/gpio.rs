//! GPIO dispatch.
//!
//! Forwards generic GPIO calls to the single active [`GpioOps`] backend.

use crate::base::{DriverError, Result};
use crate::hal::gpio::{EdgeDetect, GpioNum, GpioOps, PinLevel};
use alloc::sync::Arc;
use core::fmt;
use log::info;

pub struct GpioDispatch {
    active: Option<Arc<dyn GpioOps>>,
}

impl GpioDispatch {
    pub const fn new() -> Self {
        Self { active: None }
    }

    /// Make `ops` the active backend, replacing any previous one.
    pub fn register(&mut self, ops: Arc<dyn GpioOps>) {
        if self.active.replace(ops).is_some() {
            info!("gpio: backend replaced");
        } else {
            info!("gpio: backend registered");
        }
    }

    pub fn is_registered(&self) -> bool {
        self.active.is_some()
    }

    fn ops(&self) -> Result<&dyn GpioOps> {
        self.active.as_deref().ok_or(DriverError::NotSupported)
    }

    pub fn set_input(&self, gpio: GpioNum) -> Result<()> {
        self.ops()?.direction_input(gpio)
    }

    pub fn set_output(&self, gpio: GpioNum, level: PinLevel) -> Result<()> {
        self.ops()?.direction_output(gpio, level)
    }

    pub fn get(&self, gpio: GpioNum) -> Result<PinLevel> {
        self.ops()?.get_value(gpio)
    }

    pub fn set(&self, gpio: GpioNum, level: PinLevel) -> Result<()> {
        self.ops()?.set_value(gpio, level)
    }

    pub fn request(&self, gpio: GpioNum) -> Result<()> {
        self.ops()?.request(gpio)
    }

    pub fn free(&self, gpio: GpioNum) -> Result<()> {
        self.ops()?.free(gpio)
    }

    pub fn irq_set(&self, gpio: GpioNum, edge: EdgeDetect) -> Result<()> {
        self.ops()?.irq_set(gpio, edge)
    }

    pub fn irq_enable(&self, gpio: GpioNum, enable: bool) -> Result<()> {
        self.ops()?.irq_enable(gpio, enable)
    }

    pub fn irq_pend_clear(&self, gpio: GpioNum) -> Result<()> {
        self.ops()?.irq_pend_clear(gpio)
    }
}

impl Default for GpioDispatch {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for GpioDispatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GpioDispatch")
            .field("registered", &self.is_registered())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::gpio::Port;
    use spin::Mutex;

    /// Backend with one output latch shared by every pin.
    struct Latch {
        level: Mutex<PinLevel>,
    }

    impl GpioOps for Latch {
        fn set_value(&self, _gpio: GpioNum, level: PinLevel) -> Result<()> {
            *self.level.lock() = level;
            Ok(())
        }

        fn get_value(&self, _gpio: GpioNum) -> Result<PinLevel> {
            Ok(*self.level.lock())
        }
    }

    #[test]
    fn no_backend_is_not_supported() {
        let gpio = GpioDispatch::new();
        let pa0 = GpioNum::of(Port::A, 0);
        assert_eq!(gpio.request(pa0), Err(DriverError::NotSupported));
        assert_eq!(gpio.get(pa0), Err(DriverError::NotSupported));
    }

    #[test]
    fn missing_capability_is_not_supported() {
        let mut gpio = GpioDispatch::new();
        gpio.register(Arc::new(Latch {
            level: Mutex::new(PinLevel::Low),
        }));
        let pb3 = GpioNum::of(Port::B, 3);

        gpio.set(pb3, PinLevel::High).unwrap();
        assert_eq!(gpio.get(pb3), Ok(PinLevel::High));
        assert_eq!(gpio.irq_set(pb3, EdgeDetect::Falling), Err(DriverError::NotSupported));
        assert_eq!(gpio.set_input(pb3), Err(DriverError::NotSupported));
    }

    #[test]
    fn register_replaces_backend() {
        let mut gpio = GpioDispatch::new();
        let pc2 = GpioNum::of(Port::C, 2);
        gpio.register(Arc::new(Latch {
            level: Mutex::new(PinLevel::Low),
        }));
        gpio.register(Arc::new(Latch {
            level: Mutex::new(PinLevel::High),
        }));
        assert_eq!(gpio.get(pc2), Ok(PinLevel::High));
    }
}
