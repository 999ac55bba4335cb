//! Devices and their attach/detach lifecycle.

use super::{BusId, DriverError, DriverId, PlatformInfo, Registry, Result};
use alloc::boxed::Box;
use core::any::Any;
use core::fmt;
use core::ops::ControlFlow;
use log::{debug, warn};

/// Handle to a device registered in a [`Registry`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DeviceId(pub(crate) usize);

impl DeviceId {
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Where a device is in its lifecycle.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DeviceState {
    /// In the registry but not yet added to its bus.
    Initialized,
    /// On its bus, no driver bound.
    Registered,
    /// A driver probed it successfully.
    Bound,
    /// Unregistered. The handle stays valid but the device is inert.
    Removed,
}

/// Outcome of an attach scan.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Attach {
    /// The device is bound to this driver.
    Bound(DriverId),
    /// No driver matched, or every matching probe failed.
    NoMatch,
}

/// A generic device node.
pub struct Device {
    name: &'static str,
    pub(crate) bus: Option<BusId>,
    pub(crate) driver: Option<DriverId>,
    pub(crate) state: DeviceState,
    pub(crate) platform: Option<PlatformInfo>,
    driver_data: Option<Box<dyn Any + Send>>,
}

impl Device {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            bus: None,
            driver: None,
            state: DeviceState::Initialized,
            platform: None,
            driver_data: None,
        }
    }

    pub(crate) fn with_platform(name: &'static str, info: PlatformInfo) -> Self {
        Self {
            platform: Some(info),
            ..Self::new(name)
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn bus(&self) -> Option<BusId> {
        self.bus
    }

    /// The bound driver, if a probe succeeded.
    pub fn driver(&self) -> Option<DriverId> {
        self.driver
    }

    pub fn state(&self) -> DeviceState {
        self.state
    }

    pub fn is_bound(&self) -> bool {
        self.state == DeviceState::Bound
    }

    /// Platform descriptor for devices registered on the platform bus.
    pub fn platform(&self) -> Option<&PlatformInfo> {
        self.platform.as_ref()
    }

    pub(crate) fn platform_mut(&mut self) -> Option<&mut PlatformInfo> {
        self.platform.as_mut()
    }

    /// Attach driver-private state to the device, replacing any previous value.
    pub fn set_driver_data<T: Any + Send>(&mut self, data: T) {
        self.driver_data = Some(Box::new(data));
    }

    pub fn driver_data<T: Any>(&self) -> Option<&T> {
        self.driver_data.as_ref()?.downcast_ref()
    }

    pub fn driver_data_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.driver_data.as_mut()?.downcast_mut()
    }
}

impl fmt::Debug for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Device")
            .field("name", &self.name)
            .field("bus", &self.bus)
            .field("driver", &self.driver)
            .field("state", &self.state)
            .field("platform", &self.platform)
            .field("driver_data", &self.driver_data.is_some())
            .finish()
    }
}

impl Registry {
    /// Take ownership of `dev` and return its handle.
    ///
    /// Bus and driver references are cleared; the device starts
    /// [`DeviceState::Initialized`].
    pub fn device_initialize(&mut self, mut dev: Device) -> DeviceId {
        dev.bus = None;
        dev.driver = None;
        dev.state = DeviceState::Initialized;

        let id = DeviceId(self.devices.len());
        self.devices.push(dev);
        id
    }

    /// Set the bus a device will be added to. Only legal before
    /// [`Registry::device_add`].
    pub fn device_set_bus(&mut self, dev: DeviceId, bus: BusId) -> Result<()> {
        self.bus(bus)?;

        let device = self.device_mut(dev)?;
        if device.state != DeviceState::Initialized {
            return Err(DriverError::InvalidArgument);
        }
        device.bus = Some(bus);
        Ok(())
    }

    /// Put an initialized device on its bus and try to bind it.
    pub fn device_add(&mut self, dev: DeviceId) -> Result<()> {
        let device = self.device(dev)?;
        if device.name.is_empty() || device.state != DeviceState::Initialized {
            return Err(DriverError::InvalidArgument);
        }

        self.bus_add_device(dev)?;
        self.device_mut(dev)?.state = DeviceState::Registered;
        self.bus_probe_device(dev);
        Ok(())
    }

    /// [`Registry::device_initialize`] followed by [`Registry::device_add`].
    pub fn device_register(&mut self, dev: Device) -> Result<DeviceId> {
        let id = self.device_initialize(dev);
        self.device_add(id)?;
        Ok(id)
    }

    /// Detach the device's driver, take it off its bus and mark it removed.
    pub fn device_unregister(&mut self, dev: DeviceId) -> Result<()> {
        if self.device(dev)?.state == DeviceState::Removed {
            return Err(DriverError::InvalidArgument);
        }

        self.bus_remove_device(dev)?;
        let device = self.device_mut(dev)?;
        device.state = DeviceState::Removed;
        debug!("device '{}': removed", device.name);
        Ok(())
    }

    /// Bind the device to the first matching driver on its bus whose probe
    /// succeeds.
    pub fn device_attach(&mut self, dev: DeviceId) -> Result<Attach> {
        let device = self.device(dev)?;
        if let Some(drv) = device.driver {
            return Ok(Attach::Bound(drv));
        }
        if device.state == DeviceState::Removed {
            return Err(DriverError::InvalidArgument);
        }
        let bus = device.bus.ok_or(DriverError::InvalidArgument)?;

        let bound = self.bus_for_each_drv(bus, None, |reg, drv| {
            if !reg.driver_match_device(drv, dev) {
                return ControlFlow::Continue(());
            }
            match reg.driver_probe_device(drv, dev) {
                Ok(()) => ControlFlow::Break(drv),
                Err(_) => ControlFlow::Continue(()),
            }
        })?;

        Ok(bound.map_or(Attach::NoMatch, Attach::Bound))
    }

    /// Run the bound driver's `remove` and clear the binding.
    ///
    /// A failing `remove` is logged; the binding is cleared regardless.
    pub fn device_release_driver(&mut self, dev: DeviceId) -> Result<()> {
        let Some(drv) = self.device(dev)?.driver else {
            return Ok(());
        };

        let driver = self.driver(drv)?.driver().clone();
        if let Err(err) = driver.remove(self, dev) {
            warn!("device '{}': {} remove failed: {}", self.device(dev)?.name, driver.name(), err);
        }

        let device = self.device_mut(dev)?;
        device.driver = None;
        device.state = DeviceState::Registered;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::test_util::{TestDriver, platform_registry};
    use crate::base::{NodeType, PlatformDevice};

    #[test]
    fn device_add_requires_a_name() {
        let mut reg = platform_registry();
        assert_eq!(
            reg.device_register(Device::new("")),
            Err(DriverError::InvalidArgument)
        );
    }

    #[test]
    fn device_add_is_only_legal_once() {
        let mut reg = platform_registry();
        let bus = reg.platform_bus().unwrap();
        let id = reg.device_initialize(Device::new("led"));
        reg.device_set_bus(id, bus).unwrap();
        reg.device_add(id).unwrap();

        assert_eq!(reg.device(id).unwrap().state(), DeviceState::Registered);
        assert_eq!(reg.device_add(id), Err(DriverError::InvalidArgument));
        assert_eq!(reg.device_set_bus(id, bus), Err(DriverError::InvalidArgument));
    }

    #[test]
    fn attach_stops_at_first_successful_probe() {
        let mut reg = Registry::new();
        let bus = reg.bus_register("spi", NodeType::Spi, None).unwrap();
        let broken = TestDriver::failing("broken");
        let first = TestDriver::new("first");
        let second = TestDriver::new("second");
        reg.driver_register(broken.clone(), bus).unwrap();
        let first_id = reg.driver_register(first.clone(), bus).unwrap();
        reg.driver_register(second.clone(), bus).unwrap();

        let id = reg.device_initialize(Device::new("flash"));
        reg.device_set_bus(id, bus).unwrap();
        reg.device_add(id).unwrap();

        let dev = reg.device(id).unwrap();
        assert_eq!(dev.driver(), Some(first_id));
        assert!(dev.is_bound());
        assert_eq!(broken.probes(), 1);
        assert_eq!(first.probes(), 1);
        assert_eq!(second.probes(), 0);
        assert_eq!(reg.device_attach(id), Ok(Attach::Bound(first_id)));
        assert_eq!(first.probes(), 1);
    }

    #[test]
    fn failed_probe_leaves_device_unbound() {
        let mut reg = platform_registry();
        let drv = TestDriver::failing("adc");
        reg.platform_driver_register(drv.clone()).unwrap();
        let id = reg.platform_device_register(PlatformDevice::new("adc")).unwrap();

        let dev = reg.device(id).unwrap();
        assert_eq!(dev.driver(), None);
        assert_eq!(dev.state(), DeviceState::Registered);
        assert_eq!(drv.probes(), 1);
        assert_eq!(reg.device_attach(id), Ok(Attach::NoMatch));
    }

    #[test]
    fn unregister_runs_remove_and_drops_from_bus() {
        let mut reg = platform_registry();
        let bus = reg.platform_bus().unwrap();
        let drv = TestDriver::new("rtc");
        reg.platform_driver_register(drv.clone()).unwrap();
        let id = reg.platform_device_register(PlatformDevice::new("rtc")).unwrap();
        assert!(reg.device(id).unwrap().is_bound());

        reg.device_unregister(id).unwrap();

        assert_eq!(drv.removes(), 1);
        let dev = reg.device(id).unwrap();
        assert_eq!(dev.state(), DeviceState::Removed);
        assert_eq!(dev.driver(), None);
        assert!(!reg.bus(bus).unwrap().devices().contains(&id));
        assert_eq!(reg.device_unregister(id), Err(DriverError::InvalidArgument));
    }

    #[test]
    fn driver_data_round_trips_by_type() {
        let mut dev = Device::new("eth");
        dev.set_driver_data(0x6c00_0000u32);
        assert_eq!(dev.driver_data::<u32>(), Some(&0x6c00_0000));
        assert_eq!(dev.driver_data::<u16>(), None);
        *dev.driver_data_mut::<u32>().unwrap() += 8;
        assert_eq!(dev.driver_data::<u32>(), Some(&0x6c00_0008));
    }
}
