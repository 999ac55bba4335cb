//! LEDs wired to GPIO pins, active high.

use crate::base::Result;
use crate::gpio::GpioDispatch;
use crate::hal::gpio::{GpioNum, PinLevel};

/// Claim the LED's pin and drive it as a push-pull output, initially off.
pub fn led_request(gpio: &GpioDispatch, led: GpioNum) -> Result<()> {
    gpio.request(led)?;
    gpio.set_output(led, PinLevel::Low)
}

pub fn led_free(gpio: &GpioDispatch, led: GpioNum) -> Result<()> {
    gpio.free(led)
}

pub fn led_on(gpio: &GpioDispatch, led: GpioNum) -> Result<()> {
    gpio.set(led, PinLevel::High)
}

pub fn led_off(gpio: &GpioDispatch, led: GpioNum) -> Result<()> {
    gpio.set(led, PinLevel::Low)
}

/// Invert the LED from the level read back on its pin.
pub fn led_toggle(gpio: &GpioDispatch, led: GpioNum) -> Result<()> {
    let level = gpio.get(led)?;
    gpio.set(led, !level)
}
