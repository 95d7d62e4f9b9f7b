//! Display controller presets.
//!
//! A [`Model`] bundles the bus settings a controller is driven with: clock,
//! SPI mode and how many bytes one pixel occupies on the wire, which sizes
//! the largest transfer the bus must accept for a given draw buffer.

use embedded_graphics_core::pixelcolor::{raw::RawData, PixelColor};
use embedded_hal::spi::{Mode, MODE_0};

mod hx8357;
mod ili934x;
mod ili948x;
mod sh1107;
mod st7789;

pub use hx8357::*;
pub use ili934x::*;
pub use ili948x::*;
pub use sh1107::*;
pub use st7789::*;

/// Display controller.
pub trait Model {
    /// Pixel format the controller is fed with.
    type ColorFormat: PixelColor;

    /// SPI clock in Hz.
    const CLOCK_SPEED_HZ: u32 = 40_000_000;

    const SPI_MODE: Mode = MODE_0;

    /// Bytes a single pixel occupies in a transfer.
    const TRANSFER_BYTES_PER_PIXEL: usize =
        (<<Self::ColorFormat as PixelColor>::Raw as RawData>::BITS_PER_PIXEL + 7) / 8;
}
