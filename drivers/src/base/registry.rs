//! The registry owning every bus, device and driver.

use super::{Bus, BusId, Device, DeviceId, DriverError, DriverId, DriverNode, Result};
use crate::gpio::GpioDispatch;
use crate::pinctrl::Pinctrl;
use alloc::vec::Vec;

/// All device-model state for one board.
///
/// Nodes live in arenas and are referred to by copyable handles. Devices and
/// drivers are never freed: unregistering only changes their state, so a
/// handle stays valid for the lifetime of the registry.
#[derive(Debug)]
pub struct Registry {
    pub(super) buses: Vec<Bus>,
    pub(super) devices: Vec<Device>,
    pub(super) drivers: Vec<DriverNode>,
    pub(super) platform_bus: Option<BusId>,
    pinctrl: Pinctrl,
    gpio: GpioDispatch,
}

impl Registry {
    pub const fn new() -> Self {
        Self {
            buses: Vec::new(),
            devices: Vec::new(),
            drivers: Vec::new(),
            platform_bus: None,
            pinctrl: Pinctrl::new(),
            gpio: GpioDispatch::new(),
        }
    }

    pub fn device(&self, id: DeviceId) -> Result<&Device> {
        self.devices.get(id.0).ok_or(DriverError::InvalidArgument)
    }

    pub fn device_mut(&mut self, id: DeviceId) -> Result<&mut Device> {
        self.devices.get_mut(id.0).ok_or(DriverError::InvalidArgument)
    }

    pub fn driver(&self, id: DriverId) -> Result<&DriverNode> {
        self.drivers.get(id.0).ok_or(DriverError::InvalidArgument)
    }

    pub fn bus(&self, id: BusId) -> Result<&Bus> {
        self.buses.get(id.0).ok_or(DriverError::InvalidArgument)
    }

    pub(crate) fn bus_mut(&mut self, id: BusId) -> Result<&mut Bus> {
        self.buses.get_mut(id.0).ok_or(DriverError::InvalidArgument)
    }

    /// Look a device up by name. Bus root devices are included.
    pub fn device_find(&self, name: &str) -> Option<DeviceId> {
        self.devices
            .iter()
            .position(|dev| dev.name() == name)
            .map(DeviceId)
    }

    /// Every device ever initialized, in creation order.
    pub fn devices(&self) -> impl Iterator<Item = (DeviceId, &Device)> {
        self.devices.iter().enumerate().map(|(i, dev)| (DeviceId(i), dev))
    }

    pub fn pinctrl(&self) -> &Pinctrl {
        &self.pinctrl
    }

    pub fn pinctrl_mut(&mut self) -> &mut Pinctrl {
        &mut self.pinctrl
    }

    pub fn gpio(&self) -> &GpioDispatch {
        &self.gpio
    }

    pub fn gpio_mut(&mut self) -> &mut GpioDispatch {
        &mut self.gpio
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
