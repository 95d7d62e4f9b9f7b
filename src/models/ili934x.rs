use embedded_graphics_core::pixelcolor::Rgb565;

use crate::models::Model;

/// ILI9341 display in Rgb565 color mode.
pub struct ILI9341;

impl Model for ILI9341 {
    type ColorFormat = Rgb565;
}
