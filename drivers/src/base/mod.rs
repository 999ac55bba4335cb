//! Generic device model: buses, devices, drivers and the platform bus.
//!
//! Everything is owned by a [`Registry`]. Adding a device or a driver runs a
//! match-and-probe pass on the shared bus; a probe receives the registry so
//! it can read its device's resources and publish backends.

mod bus;
mod device;
mod driver;
mod error;
mod platform;
mod registry;
mod resource;

pub use bus::{Bus, BusId, MatchFn, NodeType};
pub use device::{Attach, Device, DeviceId, DeviceState};
pub use driver::{Driver, DriverId, DriverNode};
pub use error::{DriverError, Result};
pub use platform::{PLATFORM_BUS_NAME, PlatformDevice, PlatformInfo, platform_match};
pub use registry::Registry;
pub use resource::{RESOURCE_ATTR_MASK, RESOURCE_TYPE_MASK, Resource, ResourceFlags};
