use embedded_graphics_core::pixelcolor::BinaryColor;

use crate::models::Model;

/// SH1107 monochrome OLED.
pub struct SH1107;

impl Model for SH1107 {
    type ColorFormat = BinaryColor;
    const CLOCK_SPEED_HZ: u32 = 8_000_000;
    // Draw buffers are rendered at 16 bits per pixel and packed by the panel driver.
    const TRANSFER_BYTES_PER_PIXEL: usize = 2;
}
