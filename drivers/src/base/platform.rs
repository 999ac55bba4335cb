//! Platform devices: statically described hardware instances on the
//! `"platform"` bus.
//!
//! A board declares its peripherals as [`PlatformDevice`] tables. Each entry
//! names the device, lists its [`Resource`]s, and may name the pin group that
//! must be applied before the device is probed.

use super::{
    BusId, Device, DeviceId, Driver, DriverError, DriverId, NodeType, Registry, Resource,
    ResourceFlags, Result,
};
use crate::hal::pinctrl::PinGroup;
use alloc::sync::Arc;
use core::any::Any;
use core::fmt;
use log::debug;

pub const PLATFORM_BUS_NAME: &str = "platform";

/// Board-supplied description of one platform device.
#[derive(Copy, Clone)]
pub struct PlatformDevice {
    pub name: &'static str,
    pub resources: &'static [Resource],
    /// Name of the pin group to apply before probing.
    pub pinctrl: Option<&'static str>,
    /// Static data handed to the driver, e.g. a pin-group catalog.
    pub platform_data: Option<&'static (dyn Any + Send + Sync)>,
}

impl PlatformDevice {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            resources: &[],
            pinctrl: None,
            platform_data: None,
        }
    }

    pub const fn with_resources(mut self, resources: &'static [Resource]) -> Self {
        self.resources = resources;
        self
    }

    pub const fn with_pinctrl(mut self, group: &'static str) -> Self {
        self.pinctrl = Some(group);
        self
    }

    pub const fn with_platform_data(mut self, data: &'static (dyn Any + Send + Sync)) -> Self {
        self.platform_data = Some(data);
        self
    }
}

impl fmt::Debug for PlatformDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlatformDevice")
            .field("name", &self.name)
            .field("resources", &self.resources)
            .field("pinctrl", &self.pinctrl)
            .field("platform_data", &self.platform_data.is_some())
            .finish()
    }
}

/// Platform state attached to a registered device.
#[derive(Debug)]
pub struct PlatformInfo {
    desc: PlatformDevice,
    pin_group: Option<PinGroup>,
}

impl PlatformInfo {
    pub fn resources(&self) -> &'static [Resource] {
        self.desc.resources
    }

    /// The declared pin-group name.
    pub fn pinctrl(&self) -> Option<&'static str> {
        self.desc.pinctrl
    }

    /// The pin group resolved at bind time.
    pub fn pin_group(&self) -> Option<&PinGroup> {
        self.pin_group.as_ref()
    }

    pub fn platform_data<T: Any>(&self) -> Option<&'static T> {
        let data: &'static (dyn Any + Send + Sync) = self.desc.platform_data?;
        data.downcast_ref()
    }

    /// The `index`-th resource whose type intersects `ty`.
    pub fn resource(&self, ty: ResourceFlags, index: usize) -> Option<&'static Resource> {
        self.desc
            .resources
            .iter()
            .filter(|res| res.is_type(ty))
            .nth(index)
    }

    /// Record the resolved group. A group, once set, is never replaced.
    pub(crate) fn bind_group(&mut self, group: PinGroup) -> Result<()> {
        if self.pin_group.is_some() {
            return Err(DriverError::Busy);
        }
        self.pin_group = Some(group);
        Ok(())
    }
}

/// Default platform bus match: id table first, then exact name equality.
pub fn platform_match(dev: &Device, drv: &dyn Driver) -> bool {
    match drv.id_table() {
        Some(ids) => ids
            .iter()
            .take_while(|id| !id.is_empty())
            .any(|id| *id == dev.name()),
        None => dev.name() == drv.name(),
    }
}

impl Registry {
    /// Register the `"platform"` bus. Calling it again returns the same bus.
    pub fn platform_bus_init(&mut self) -> Result<BusId> {
        if let Some(bus) = self.platform_bus {
            return Ok(bus);
        }
        let bus = self.bus_register(PLATFORM_BUS_NAME, NodeType::Platform, Some(platform_match))?;
        self.platform_bus = Some(bus);
        Ok(bus)
    }

    pub fn platform_bus(&self) -> Option<BusId> {
        self.platform_bus
    }

    /// Register a platform device and try to bind it.
    pub fn platform_device_register(&mut self, pdev: PlatformDevice) -> Result<DeviceId> {
        let info = PlatformInfo {
            desc: pdev,
            pin_group: None,
        };
        let id = self.device_initialize(Device::with_platform(pdev.name, info));
        self.platform_device_add(id)?;
        Ok(id)
    }

    /// Put an initialized device on the platform bus and try to bind it.
    pub fn platform_device_add(&mut self, dev: DeviceId) -> Result<()> {
        let bus = self.platform_bus.ok_or(DriverError::NotFound)?;
        self.device_set_bus(dev, bus)?;

        debug!("Registering platform device '{}'", self.device(dev)?.name());
        self.device_add(dev)
    }

    pub fn platform_driver_register(&mut self, driver: Arc<dyn Driver>) -> Result<DriverId> {
        let bus = self.platform_bus.ok_or(DriverError::NotFound)?;
        self.driver_register(driver, bus)
    }

    /// Platform state of `dev`; InvalidArgument if it is not a platform
    /// device.
    pub fn platform_device(&self, dev: DeviceId) -> Result<&PlatformInfo> {
        self.device(dev)?
            .platform()
            .ok_or(DriverError::InvalidArgument)
    }

    /// The `index`-th resource of `dev` whose type intersects `ty`.
    pub fn platform_get_resource(
        &self,
        dev: DeviceId,
        ty: ResourceFlags,
        index: usize,
    ) -> Result<Resource> {
        self.platform_device(dev)?
            .resource(ty, index)
            .copied()
            .ok_or(DriverError::NotFound)
    }
}
