use embedded_graphics_core::pixelcolor::Rgb565;
use embedded_hal::spi::{Mode, MODE_2};

use crate::models::Model;

/// ST7789 display in Rgb565 color mode.
pub struct ST7789;

impl Model for ST7789 {
    type ColorFormat = Rgb565;
    const CLOCK_SPEED_HZ: u32 = 24_000_000;
    const SPI_MODE: Mode = MODE_2;
}
