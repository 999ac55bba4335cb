//! Drivers and the match-and-probe protocol.

use super::{BusId, DeviceId, DeviceState, DriverError, Registry, Result};
use alloc::sync::Arc;
use core::ops::ControlFlow;
use log::debug;

/// A device driver.
///
/// `probe` receives the registry so a driver can query its device's
/// resources and register the backends it provides.
pub trait Driver: Send + Sync {
    fn name(&self) -> &'static str;

    /// Device names this driver handles, in match order. An empty name ends
    /// the table early. Without a table the driver matches devices with its
    /// own name.
    fn id_table(&self) -> Option<&[&'static str]> {
        None
    }

    fn probe(&self, registry: &mut Registry, dev: DeviceId) -> Result<()>;

    fn remove(&self, registry: &mut Registry, dev: DeviceId) -> Result<()> {
        let _ = (registry, dev);
        Ok(())
    }
}

/// Handle to a driver registered in a [`Registry`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DriverId(pub(crate) usize);

impl DriverId {
    pub const fn index(self) -> usize {
        self.0
    }
}

/// A driver as held by the registry.
pub struct DriverNode {
    driver: Arc<dyn Driver>,
    bus: BusId,
    pub(crate) registered: bool,
}

impl DriverNode {
    pub(crate) fn new(driver: Arc<dyn Driver>, bus: BusId) -> Self {
        Self {
            driver,
            bus,
            registered: true,
        }
    }

    pub fn name(&self) -> &'static str {
        self.driver.name()
    }

    pub fn driver(&self) -> &Arc<dyn Driver> {
        &self.driver
    }

    pub fn bus(&self) -> BusId {
        self.bus
    }

    /// False once the driver has been unregistered.
    pub fn is_registered(&self) -> bool {
        self.registered
    }
}

impl core::fmt::Debug for DriverNode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DriverNode")
            .field("name", &self.name())
            .field("bus", &self.bus)
            .field("registered", &self.registered)
            .finish()
    }
}

impl Registry {
    /// Put `driver` on `bus` and bind it to every matching unbound device.
    ///
    /// Registering a name already present on the bus keeps the existing entry
    /// and re-runs its attach pass.
    pub fn driver_register(&mut self, driver: Arc<dyn Driver>, bus: BusId) -> Result<DriverId> {
        if driver.name().is_empty() {
            return Err(DriverError::InvalidArgument);
        }
        self.bus(bus)?;

        self.bus_add_driver(DriverNode::new(driver, bus))
    }

    /// Take the driver off its bus. Devices it is bound to stay bound.
    pub fn driver_unregister(&mut self, drv: DriverId) -> Result<()> {
        if !self.driver(drv)?.registered {
            return Err(DriverError::InvalidArgument);
        }
        self.bus_remove_driver(drv)
    }

    /// Try to bind `drv` to each unbound device on its bus. Returns the
    /// number of devices newly bound.
    pub fn driver_attach(&mut self, drv: DriverId) -> Result<usize> {
        let bus = self.driver(drv)?.bus;
        let mut bound = 0;

        self.bus_for_each_dev(bus, None, |reg, dev| -> ControlFlow<()> {
            let unbound = reg.device(dev).is_ok_and(|d| d.driver.is_none());
            if unbound
                && reg.driver_match_device(drv, dev)
                && reg.driver_probe_device(drv, dev).is_ok()
            {
                bound += 1;
            }
            ControlFlow::Continue(())
        })?;

        Ok(bound)
    }

    /// Apply the bus match policy. A bus without one matches everything.
    pub fn driver_match_device(&self, drv: DriverId, dev: DeviceId) -> bool {
        let (Ok(node), Ok(device)) = (self.driver(drv), self.device(dev)) else {
            return false;
        };
        match self.bus(node.bus).map(|bus| bus.match_fn()) {
            Ok(Some(matches)) => matches(device, node.driver.as_ref()),
            Ok(None) => true,
            Err(_) => false,
        }
    }

    /// Bind `dev` to `drv`: apply pin configuration, then run `probe`.
    ///
    /// The device records its driver only after `probe` succeeds; on
    /// failure it is left unbound.
    pub fn driver_probe_device(&mut self, drv: DriverId, dev: DeviceId) -> Result<()> {
        let driver = self.driver(drv)?.driver.clone();

        let device = self.device(dev)?;
        if device.driver.is_some() {
            return Err(DriverError::Busy);
        }
        let name = device.name();

        match self.really_probe(driver.as_ref(), dev) {
            Ok(()) => {
                let device = self.device_mut(dev)?;
                device.driver = Some(drv);
                device.state = DeviceState::Bound;
                debug!("bus: '{}': driver {} bound to device {}", self.bus_name(self.driver(drv)?.bus), driver.name(), name);
                Ok(())
            }
            Err(err) => {
                debug!("{}: probe of {} failed: {}", driver.name(), name, err);
                Err(err)
            }
        }
    }

    fn really_probe(&mut self, driver: &dyn Driver, dev: DeviceId) -> Result<()> {
        if cfg!(feature = "pinctrl") {
            self.pinctrl_bind_pins(dev)?;
        }
        driver.probe(self, dev)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::test_util::{TestDriver, platform_registry};
    use crate::base::{Attach, PlatformDevice};
    use spin::Mutex;

    /// Records the device's driver as seen while binding.
    #[derive(Default)]
    struct SeesOwnBinding {
        seen: Mutex<Option<Option<DriverId>>>,
    }

    impl Driver for SeesOwnBinding {
        fn name(&self) -> &'static str {
            "rtc"
        }

        fn probe(&self, registry: &mut Registry, dev: DeviceId) -> Result<()> {
            *self.seen.lock() = Some(registry.device(dev)?.driver());
            Ok(())
        }
    }

    #[test]
    fn empty_driver_name_is_rejected() {
        let mut reg = platform_registry();
        assert_eq!(
            reg.platform_driver_register(TestDriver::new("")),
            Err(DriverError::InvalidArgument)
        );
    }

    #[test]
    fn driver_attach_binds_every_unbound_match() {
        let mut reg = platform_registry();
        let a = reg.platform_device_register(PlatformDevice::new("i2c")).unwrap();
        let b = reg.platform_device_register(PlatformDevice::new("i2c")).unwrap();
        let other = reg.platform_device_register(PlatformDevice::new("spi")).unwrap();

        let drv = TestDriver::new("i2c");
        let id = reg.platform_driver_register(drv.clone()).unwrap();

        assert_eq!(drv.probes(), 2);
        assert_eq!(reg.device(a).unwrap().driver(), Some(id));
        assert_eq!(reg.device(b).unwrap().driver(), Some(id));
        assert_eq!(reg.device(other).unwrap().driver(), None);
        assert_eq!(reg.driver_attach(id), Ok(0));
    }

    #[test]
    fn duplicate_registration_reattaches_with_first_driver() {
        let mut reg = platform_registry();
        let bus = reg.platform_bus().unwrap();
        let first = TestDriver::new("can");
        let first_id = reg.platform_driver_register(first.clone()).unwrap();

        let dev = reg.platform_device_register(PlatformDevice::new("can")).unwrap();
        reg.device_release_driver(dev).unwrap();

        let again = TestDriver::new("can");
        let again_id = reg.platform_driver_register(again.clone()).unwrap();

        assert_eq!(again_id, first_id);
        assert_eq!(reg.bus(bus).unwrap().drivers(), [first_id]);
        assert_eq!(first.probes(), 2);
        assert_eq!(again.probes(), 0);
        assert_eq!(reg.device(dev).unwrap().driver(), Some(first_id));
    }

    #[test]
    fn unregister_keeps_existing_bindings() {
        let mut reg = platform_registry();
        let bus = reg.platform_bus().unwrap();
        let id = reg.platform_driver_register(TestDriver::new("wdt")).unwrap();
        let dev = reg.platform_device_register(PlatformDevice::new("wdt")).unwrap();

        reg.driver_unregister(id).unwrap();

        assert!(reg.bus(bus).unwrap().drivers().is_empty());
        assert!(!reg.driver(id).unwrap().is_registered());
        assert_eq!(reg.device(dev).unwrap().driver(), Some(id));
        assert_eq!(reg.driver_unregister(id), Err(DriverError::InvalidArgument));

        let late = reg.platform_device_register(PlatformDevice::new("wdt")).unwrap();
        assert_eq!(reg.device_attach(late), Ok(Attach::NoMatch));
    }

    #[test]
    fn probe_of_bound_device_is_busy() {
        let mut reg = platform_registry();
        let a = reg.platform_driver_register(TestDriver::new("dma")).unwrap();
        let dev = reg.platform_device_register(PlatformDevice::new("dma")).unwrap();
        assert_eq!(reg.driver_probe_device(a, dev), Err(DriverError::Busy));
    }

    #[test]
    fn driver_is_recorded_only_after_bind_succeeds() {
        let mut reg = platform_registry();
        let drv = Arc::new(SeesOwnBinding::default());
        let id = reg.platform_driver_register(drv.clone()).unwrap();
        let dev = reg.platform_device_register(PlatformDevice::new("rtc")).unwrap();

        assert_eq!(*drv.seen.lock(), Some(None));
        assert_eq!(reg.device(dev).unwrap().driver(), Some(id));
        assert_eq!(reg.device(dev).unwrap().state(), DeviceState::Bound);
    }

    #[test]
    fn failed_bind_leaves_device_unbound() {
        let mut reg = platform_registry();
        let drv = TestDriver::failing("rtc");
        reg.platform_driver_register(drv.clone()).unwrap();
        let dev = reg.platform_device_register(PlatformDevice::new("rtc")).unwrap();

        assert_eq!(drv.probes(), 1);
        assert_eq!(reg.device(dev).unwrap().driver(), None);
        assert_ne!(reg.device(dev).unwrap().state(), DeviceState::Bound);
    }
}
