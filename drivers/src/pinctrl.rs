//! Pin-control core.
//!
//! Holds the active pin controller and applies a platform device's declared
//! pin group before the device is probed.

use crate::base::{DeviceId, DriverError, NodeType, Registry, Result};
use crate::hal::gpio::{GpioNum, GpioOps};
use crate::hal::pinctrl::{PinConfig, PinGroup, PinGroupCatalog, PinconfOps, PinctrlDesc};
use alloc::sync::Arc;
use core::fmt;
use log::{debug, info, warn};

/// The active pin controller, if any.
pub struct Pinctrl {
    desc: Option<PinctrlDesc>,
}

impl Pinctrl {
    pub const fn new() -> Self {
        Self { desc: None }
    }

    /// Make `desc` the active pin controller, replacing any previous one.
    pub fn register(&mut self, desc: PinctrlDesc) {
        if let Some(old) = &self.desc {
            warn!("pinctrl: '{}' replaces '{}'", desc.name, old.name);
        }
        info!(
            "pinctrl: '{}' registered, {} pins, {} groups",
            desc.name,
            desc.npins,
            desc.catalog.groups().len()
        );
        self.desc = Some(desc);
    }

    pub fn is_registered(&self) -> bool {
        self.desc.is_some()
    }

    pub fn desc(&self) -> Option<&PinctrlDesc> {
        self.desc.as_ref()
    }

    pub fn catalog(&self) -> Option<&PinGroupCatalog> {
        self.desc.as_ref().map(|desc| &desc.catalog)
    }

    /// GPIO operations exported by the active pin controller.
    pub fn gpio_ops(&self) -> Option<Arc<dyn GpioOps>> {
        self.desc.as_ref()?.gpio_ops.clone()
    }

    fn conf_ops(&self) -> Result<&dyn PinconfOps> {
        self.desc
            .as_ref()
            .and_then(|desc| desc.conf_ops.as_deref())
            .ok_or(DriverError::NotSupported)
    }

    pub fn set_pin_config(&self, pin: GpioNum, config: PinConfig) -> Result<()> {
        self.conf_ops()?.pin_config_set(pin, config)
    }

    pub fn get_pin_config(&self, pin: GpioNum) -> Result<PinConfig> {
        self.conf_ops()?.pin_config_get(pin)
    }
}

impl Default for Pinctrl {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Pinctrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pinctrl").field("desc", &self.desc).finish()
    }
}

impl Registry {
    /// Resolve and apply the pin group declared by a platform device.
    ///
    /// Returns Ok without touching any pin when the device is not on the
    /// platform bus, no pin controller is active, the device declares no
    /// group, or its group was already resolved. An unknown group name is
    /// NotFound. Otherwise the group's configuration is applied to each pin
    /// in order and the first pin error is returned. The group is recorded
    /// on the device only once every pin took it, so a failed group is
    /// applied again on the next bind attempt.
    pub fn pinctrl_bind_pins(&mut self, dev: DeviceId) -> Result<()> {
        let device = self.device(dev)?;
        let Some(bus) = device.bus() else {
            return Ok(());
        };
        if self.bus(bus)?.node_type() != NodeType::Platform {
            return Ok(());
        }
        let Some(catalog) = self.pinctrl().catalog() else {
            return Ok(());
        };
        let Some(info) = device.platform() else {
            return Ok(());
        };
        if info.pin_group().is_some() {
            return Ok(());
        }
        let Some(name) = info.pinctrl() else {
            return Ok(());
        };

        let Some(group) = catalog.find(name) else {
            warn!("device '{}': pin group '{}' not found", device.name(), name);
            return Err(DriverError::NotFound);
        };
        let group: PinGroup = *group;

        debug!(
            "device '{}': applying pin group '{}' ({} pins)",
            self.device(dev)?.name(),
            group.name,
            group.pins.len()
        );
        for &pin in group.pins {
            self.pinctrl().set_pin_config(pin, group.config)?;
        }

        self.device_mut(dev)?
            .platform_mut()
            .ok_or(DriverError::InvalidArgument)?
            .bind_group(group)
    }

    fn require_pin_group(&self, dev: DeviceId) -> Result<()> {
        match self.platform_device(dev)?.pin_group() {
            Some(_) => Ok(()),
            None => Err(DriverError::InvalidArgument),
        }
    }

    /// Configure one pin on behalf of a device with a resolved pin group.
    pub fn pinctrl_set_pin_config(&self, dev: DeviceId, pin: GpioNum, config: PinConfig) -> Result<()> {
        self.require_pin_group(dev)?;
        self.pinctrl().set_pin_config(pin, config)
    }

    /// Read one pin's configuration on behalf of a device with a resolved
    /// pin group.
    pub fn pinctrl_get_pin_config(&self, dev: DeviceId, pin: GpioNum) -> Result<PinConfig> {
        self.require_pin_group(dev)?;
        self.pinctrl().get_pin_config(pin)
    }
}
