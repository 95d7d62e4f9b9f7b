use embedded_graphics_core::pixelcolor::Rgb565;

use crate::models::Model;

/// HX8357 display in Rgb565 color mode.
pub struct HX8357;

impl Model for HX8357 {
    type ColorFormat = Rgb565;
    const CLOCK_SPEED_HZ: u32 = 26_000_000;
}
