//! Hardware Abstraction Layer (HAL) - Platform-Independent Traits
//!
//! This module defines the traits a SoC backend implements. Backends are
//! registered as trait objects, so the device model and board code never
//! name a platform type.
//!
//! # Available Interfaces
//!
//! - [`gpio`]: General Purpose Input/Output control
//! - [`pinctrl`]: Pin multiplexing and pin configuration
//! - [`clock`]: Clock tree control and peripheral clock gating

pub mod clock;
pub mod gpio;
pub mod pinctrl;
