//! armfly STM32F407IG board support
//!
//! Describes the board's devices and pin groups and brings the system up
//! in order: system clock, buses, SoC drivers, then the device table.
//!
//! # Usage
//!
//! ```ignore
//! use drivers::mmio::Mmio;
//!
//! board::logging::init(uart_write, log::LevelFilter::Debug);
//! let board = board::init::board_init(Arc::new(unsafe { Mmio::new() }))?;
//! drivers::led::led_on(board.registry.gpio(), board::config::LED1)?;
//! ```

#![cfg_attr(not(test), no_std)]
#![allow(dead_code)]

extern crate alloc;

cfg_if::cfg_if! {
    if #[cfg(feature = "armfly-stm32f407ig")] {
        pub mod config;
        pub mod devices;
        pub mod init;
        pub mod logging;
    } else {
        compile_error!(
            "No board selected!\n\
            Use: cargo build --features armfly-stm32f407ig"
        );
    }
}
