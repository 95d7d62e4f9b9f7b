use embedded_graphics_core::pixelcolor::{Rgb565, Rgb888};

use crate::models::Model;

/// ILI9486 display in Rgb565 color mode.
pub struct ILI9486;

impl Model for ILI9486 {
    type ColorFormat = Rgb565;
    const CLOCK_SPEED_HZ: u32 = 24_000_000;
}

/// ILI9488 display in Rgb888 color mode.
///
/// The ILI9488 only accepts 18-bit color over SPI, each pixel is sent as three bytes.
pub struct ILI9488;

impl Model for ILI9488 {
    type ColorFormat = Rgb888;
}
