//! Platform Abstraction Layer
//!
//! Each supported SoC implements the [`Platform`] trait: it names its clock
//! controller and registers its platform drivers. Boards pick the SoC
//! through Cargo features and refer to it as [`CurrentPlatform`].
//!
//! # Usage
//!
//! ```ignore
//! use drivers::platform::{CurrentPlatform, Platform};
//!
//! let clock = CurrentPlatform::clock(bus.clone());
//! clock.update(SYS_CLK_FREQ)?;
//! CurrentPlatform::register_drivers(&mut registry, bus, clock)?;
//! ```

use crate::base::{Registry, Result};
use crate::hal::clock::ClockController;
use crate::mmio::RegisterBus;
use alloc::sync::Arc;

/// Platform trait - implemented by each supported SoC
pub trait Platform {
    /// Platform name for debugging
    fn name() -> &'static str;

    /// Clock controller driving registers through `bus`
    fn clock(bus: Arc<dyn RegisterBus>) -> Arc<dyn ClockController>;

    /// Register the SoC's platform drivers
    ///
    /// The platform bus must already be initialized. Devices registered
    /// earlier are bound as their drivers arrive.
    fn register_drivers(
        registry: &mut Registry,
        bus: Arc<dyn RegisterBus>,
        clock: Arc<dyn ClockController>,
    ) -> Result<()>;
}

// Platform selection based on Cargo features
cfg_if::cfg_if! {
    if #[cfg(feature = "stm32f4")] {
        pub mod stm32f4;
        pub use stm32f4::Stm32f4Platform as CurrentPlatform;
    } else {
        compile_error!(
            "No platform selected!\n\
            Use: cargo build --features stm32f4"
        );
    }
}
