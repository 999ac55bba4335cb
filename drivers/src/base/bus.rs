//! Buses: named collections of devices and drivers sharing one match policy.
//!
//! Buses form a flat list inside the [`Registry`]. Each bus is identified by
//! a root [`Device`] carrying the bus name, and keeps its device and driver
//! memberships in registration order.

use super::{Device, DeviceId, Driver, DriverError, DriverId, Registry, Result};
use alloc::vec::Vec;
use core::ops::ControlFlow;
use log::debug;

/// Handle to a bus registered in a [`Registry`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BusId(pub(crate) usize);

impl BusId {
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Kind of node a bus represents.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum NodeType {
    None,
    Platform,
    Gpio,
    Pinctrl,
    Uart,
    Spi,
    Can,
    Net,
}

/// Bus-level match policy: does `driver` handle `device`?
pub type MatchFn = fn(&Device, &dyn Driver) -> bool;

/// A bus and its memberships.
#[derive(Debug)]
pub struct Bus {
    node_type: NodeType,
    root: DeviceId,
    match_fn: Option<MatchFn>,
    pub(crate) devices: Vec<DeviceId>,
    pub(crate) drivers: Vec<DriverId>,
}

impl Bus {
    pub fn node_type(&self) -> NodeType {
        self.node_type
    }

    /// The device acting as this bus's identity.
    pub fn root(&self) -> DeviceId {
        self.root
    }

    pub fn match_fn(&self) -> Option<MatchFn> {
        self.match_fn
    }

    /// Member devices in registration order.
    pub fn devices(&self) -> &[DeviceId] {
        &self.devices
    }

    /// Member drivers in registration order.
    pub fn drivers(&self) -> &[DriverId] {
        &self.drivers
    }
}

impl Registry {
    /// Register a new bus named `name`.
    ///
    /// The bus root device is registered first; it belongs to no bus and is
    /// never probed. Bus names are unique.
    pub fn bus_register(
        &mut self,
        name: &'static str,
        node_type: NodeType,
        match_fn: Option<MatchFn>,
    ) -> Result<BusId> {
        if self.bus_find(name).is_some() {
            return Err(DriverError::InvalidArgument);
        }

        let root = self.device_register(Device::new(name))?;
        let id = BusId(self.buses.len());
        self.buses.push(Bus {
            node_type,
            root,
            match_fn,
            devices: Vec::new(),
            drivers: Vec::new(),
        });

        debug!("bus '{}': registered", name);
        Ok(id)
    }

    /// Look a bus up by name.
    pub fn bus_find(&self, name: &str) -> Option<BusId> {
        self.buses
            .iter()
            .position(|bus| self.devices[bus.root.0].name() == name)
            .map(BusId)
    }

    /// Name of a bus, for diagnostics.
    pub fn bus_name(&self, bus: BusId) -> &'static str {
        self.bus(bus)
            .and_then(|b| self.device(b.root))
            .map_or("?", |dev| dev.name())
    }

    /// Find a driver registered on `bus` by exact name.
    pub fn bus_find_driver(&self, name: &str, bus: BusId) -> Option<DriverId> {
        let bus = self.bus(bus).ok()?;
        bus.drivers
            .iter()
            .copied()
            .find(|&drv| self.drivers[drv.0].name() == name)
    }

    /// Call `f` once for each device on `bus`, in registration order, until
    /// it breaks.
    ///
    /// Iteration begins after `start` when given. Devices that leave the bus
    /// while iterating are skipped. Returns the break value, if any.
    pub fn bus_for_each_dev<B>(
        &mut self,
        bus: BusId,
        start: Option<DeviceId>,
        mut f: impl FnMut(&mut Self, DeviceId) -> ControlFlow<B>,
    ) -> Result<Option<B>> {
        let members = self.bus(bus)?.devices.clone();
        let first = skip_to(&members, start);

        for &dev in &members[first..] {
            if !self.buses[bus.0].devices.contains(&dev) {
                continue;
            }
            if let ControlFlow::Break(value) = f(self, dev) {
                return Ok(Some(value));
            }
        }
        Ok(None)
    }

    /// Call `f` once for each driver on `bus`, in registration order, until
    /// it breaks.
    ///
    /// Same contract as [`Registry::bus_for_each_dev`].
    pub fn bus_for_each_drv<B>(
        &mut self,
        bus: BusId,
        start: Option<DriverId>,
        mut f: impl FnMut(&mut Self, DriverId) -> ControlFlow<B>,
    ) -> Result<Option<B>> {
        let members = self.bus(bus)?.drivers.clone();
        let first = skip_to(&members, start);

        for &drv in &members[first..] {
            if !self.buses[bus.0].drivers.contains(&drv) {
                continue;
            }
            if let ControlFlow::Break(value) = f(self, drv) {
                return Ok(Some(value));
            }
        }
        Ok(None)
    }

    /// Append a device to its bus's device list.
    pub(crate) fn bus_add_device(&mut self, dev: DeviceId) -> Result<()> {
        let Some(bus) = self.device(dev)?.bus() else {
            return Ok(());
        };

        debug!(
            "bus: '{}': add device {}",
            self.bus_name(bus),
            self.device(dev)?.name()
        );
        self.bus_mut(bus)?.devices.push(dev);
        Ok(())
    }

    /// Try to bind a freshly added device to one of its bus's drivers.
    ///
    /// The outcome is logged; a device with no driver simply stays unbound.
    pub fn bus_probe_device(&mut self, dev: DeviceId) {
        let Ok(device) = self.device(dev) else {
            return;
        };
        let name = device.name();
        if device.bus().is_none() {
            return;
        }

        match self.device_attach(dev) {
            Ok(super::Attach::Bound(drv)) => {
                debug!("device '{}': bound to '{}'", name, self.drivers[drv.0].name());
            }
            Ok(super::Attach::NoMatch) => debug!("device '{}': no matching driver", name),
            Err(err) => debug!("device '{}': attach failed: {}", name, err),
        }
    }

    /// Remove a device from its bus and detach its driver.
    pub(crate) fn bus_remove_device(&mut self, dev: DeviceId) -> Result<()> {
        let Some(bus) = self.device(dev)?.bus() else {
            return Ok(());
        };

        self.bus_mut(bus)?.devices.retain(|&d| d != dev);
        self.device_release_driver(dev)?;
        debug!(
            "bus: '{}': remove device {}",
            self.bus_name(bus),
            self.device(dev)?.name()
        );
        Ok(())
    }

    /// Add a driver to its bus, unless one with the same name is already
    /// there, then run an attach pass with the registered driver.
    pub(crate) fn bus_add_driver(&mut self, node: super::DriverNode) -> Result<DriverId> {
        let bus = node.bus();
        let name = node.name();
        debug!("bus '{}': add driver {}", self.bus_name(bus), name);

        let id = match self.bus_find_driver(name, bus) {
            Some(existing) => existing,
            None => {
                let id = DriverId(self.drivers.len());
                self.drivers.push(node);
                self.bus_mut(bus)?.drivers.push(id);
                id
            }
        };

        let bound = self.driver_attach(id)?;
        debug!("bus '{}': driver {} bound {} device(s)", self.bus_name(bus), name, bound);
        Ok(id)
    }

    /// Remove a driver from its bus's driver list.
    ///
    /// Devices currently bound to the driver are left bound.
    pub(crate) fn bus_remove_driver(&mut self, drv: DriverId) -> Result<()> {
        let bus = self.driver(drv)?.bus();
        self.bus_mut(bus)?.drivers.retain(|&d| d != drv);
        self.drivers[drv.0].registered = false;
        debug!(
            "bus '{}': remove driver {}",
            self.bus_name(bus),
            self.drivers[drv.0].name()
        );
        Ok(())
    }
}

fn skip_to<T: PartialEq>(members: &[T], start: Option<T>) -> usize {
    match start {
        Some(start) => members
            .iter()
            .position(|m| *m == start)
            .map_or(members.len(), |pos| pos + 1),
        None => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::test_util::{TestDriver, platform_registry};
    use crate::base::PlatformDevice;

    #[test]
    fn bus_names_are_unique() {
        let mut reg = Registry::new();
        reg.bus_register("spi", NodeType::Spi, None).unwrap();
        assert_eq!(
            reg.bus_register("spi", NodeType::Spi, None),
            Err(DriverError::InvalidArgument)
        );
        assert!(reg.bus_find("spi").is_some());
        assert!(reg.bus_find("can").is_none());
    }

    #[test]
    fn for_each_dev_visits_each_device_once_until_break() {
        let mut reg = platform_registry();
        let bus = reg.platform_bus().unwrap();
        let a = reg.platform_device_register(PlatformDevice::new("a")).unwrap();
        let b = reg.platform_device_register(PlatformDevice::new("b")).unwrap();
        let c = reg.platform_device_register(PlatformDevice::new("c")).unwrap();

        let mut seen = Vec::new();
        let found = reg
            .bus_for_each_dev(bus, None, |_, dev| {
                seen.push(dev);
                if dev == b {
                    ControlFlow::Break(dev)
                } else {
                    ControlFlow::Continue(())
                }
            })
            .unwrap();

        assert_eq!(found, Some(b));
        assert_eq!(seen, [a, b]);

        let mut rest = Vec::new();
        let none = reg
            .bus_for_each_dev(bus, Some(a), |_, dev| {
                rest.push(dev);
                ControlFlow::<()>::Continue(())
            })
            .unwrap();
        assert_eq!(none, None);
        assert_eq!(rest, [b, c]);
    }

    #[test]
    fn for_each_on_unknown_bus_is_invalid() {
        let mut reg = Registry::new();
        let res = reg.bus_for_each_drv(BusId(3), None, |_, _| ControlFlow::<()>::Continue(()));
        assert_eq!(res, Err(DriverError::InvalidArgument));
    }

    #[test]
    fn find_driver_by_exact_name() {
        let mut reg = platform_registry();
        let bus = reg.platform_bus().unwrap();
        let id = reg.platform_driver_register(TestDriver::new("uart")).unwrap();

        assert_eq!(reg.bus_find_driver("uart", bus), Some(id));
        assert_eq!(reg.bus_find_driver("UART", bus), None);
    }
}
