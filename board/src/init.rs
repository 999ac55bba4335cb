//! Board bring-up.

use crate::config::{BOARD_NAME, SYS_CLK_FREQ};
use crate::devices::DEVICE_TABLE;
use alloc::sync::Arc;
use core::fmt;
use drivers::base::{DriverError, Registry};
use drivers::clk::{clk_get, clk_update};
use drivers::hal::clock::{ClockController, ClockDomain, ClockError};
use drivers::mmio::RegisterBus;
use drivers::platform::{CurrentPlatform, Platform};
use log::{debug, info, warn};

/// A brought-up board.
pub struct Board {
    pub registry: Registry,
    pub clock: Arc<dyn ClockController>,
    pub bus: Arc<dyn RegisterBus>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BoardError {
    Clock(ClockError),
    Driver(DriverError),
}

impl fmt::Display for BoardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoardError::Clock(err) => write!(f, "clock: {}", err),
            BoardError::Driver(err) => write!(f, "driver: {}", err),
        }
    }
}

impl From<ClockError> for BoardError {
    fn from(err: ClockError) -> Self {
        BoardError::Clock(err)
    }
}

impl From<DriverError> for BoardError {
    fn from(err: DriverError) -> Self {
        BoardError::Driver(err)
    }
}

type InitFn = fn(&mut Board) -> Result<(), BoardError>;

/// Bring-up steps, run in order until one fails.
static INIT_SEQUENCE: [(&str, InitFn); 4] = [
    ("clock", clock_init),
    ("buses", buses_init),
    ("drivers", drivers_init),
    ("devices", devices_init),
];

fn clock_init(board: &mut Board) -> Result<(), BoardError> {
    let clock = &*board.clock;
    clk_update(clock, SYS_CLK_FREQ)?;
    info!(
        "clock: core {} Hz, APB1 {} Hz, APB2 {} Hz",
        clk_get(clock, ClockDomain::Core),
        clk_get(clock, ClockDomain::Apb1),
        clk_get(clock, ClockDomain::Apb2)
    );
    Ok(())
}

fn buses_init(board: &mut Board) -> Result<(), BoardError> {
    board.registry.platform_bus_init()?;
    Ok(())
}

fn drivers_init(board: &mut Board) -> Result<(), BoardError> {
    CurrentPlatform::register_drivers(&mut board.registry, board.bus.clone(), board.clock.clone())?;
    Ok(())
}

fn devices_init(board: &mut Board) -> Result<(), BoardError> {
    for pdev in &DEVICE_TABLE {
        let dev = board.registry.platform_device_register(*pdev)?;
        if !board.registry.device(dev)?.is_bound() {
            debug!("device '{}': left unbound", pdev.name);
        }
    }
    Ok(())
}

/// Bring the board up on `bus` with the platform's clock controller.
pub fn board_init(bus: Arc<dyn RegisterBus>) -> Result<Board, BoardError> {
    let clock = CurrentPlatform::clock(bus.clone());
    board_init_with(bus, clock)
}

/// Bring the board up with an explicit clock controller.
pub fn board_init_with(
    bus: Arc<dyn RegisterBus>,
    clock: Arc<dyn ClockController>,
) -> Result<Board, BoardError> {
    info!("{}: board init on {}", BOARD_NAME, CurrentPlatform::name());
    let mut board = Board {
        registry: Registry::new(),
        clock,
        bus,
    };

    for &(name, step) in &INIT_SEQUENCE {
        if let Err(err) = step(&mut board) {
            warn!("initcall '{}' failed: {}", name, err);
            return Err(err);
        }
        debug!("initcall '{}' done", name);
    }
    Ok(board)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_conversions() {
        assert_eq!(
            BoardError::from(ClockError::InvalidProfile),
            BoardError::Clock(ClockError::InvalidProfile)
        );
        assert_eq!(
            BoardError::from(DriverError::NotFound),
            BoardError::Driver(DriverError::NotFound)
        );
    }
}
