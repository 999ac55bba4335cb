//! Device model and SoC drivers
//!
//! This crate provides a layered device/driver model for bare-metal boards:
//!
//! # Module Organization
//!
//! - [`base`]: Buses, devices, drivers, resources and the platform bus
//! - [`hal`]: Platform-independent trait definitions
//! - [`pinctrl`]: Pin-group resolution applied before a driver probes
//! - [`gpio`]: Dispatch of generic GPIO calls to the active backend
//! - [`clk`]: Clock profiles, peripheral clock gating and hardware waits
//! - [`platform`]: SoC backends (clock controller, pin controller, GPIO)
//! - [`hw`]: Raw register maps
//!
//! # Usage Example
//!
//! ```ignore
//! use drivers::base::{PlatformDevice, Registry};
//!
//! let mut registry = Registry::new();
//! registry.platform_bus_init()?;
//! registry.platform_driver_register(Arc::new(MyDriver))?;
//! registry.platform_device_register(PlatformDevice::new("my-device"))?;
//! ```

#![cfg_attr(not(test), no_std)]
#![allow(dead_code)]

pub mod base;
pub mod clk;
pub mod gpio;
pub mod hal;
pub mod hw;
pub mod led;
pub mod mmio;
pub mod pinctrl;
pub mod platform;

// Re-export commonly used types
pub use base::{Device, DeviceId, Driver, DriverError, PlatformDevice, Registry, Resource};
pub use hal::clock::{ClockController, ClockError};
pub use hal::gpio::{GpioNum, GpioOps, PinLevel};
pub use hal::pinctrl::{PinConfig, PinGroup, PinGroupCatalog};
pub use mmio::RegisterBus;

extern crate alloc;
