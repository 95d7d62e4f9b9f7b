//! Bus and device configuration.

use core::fmt;

use embedded_hal::spi::{Mode, MODE_0};

use crate::hook::PostCallback;
use crate::models::Model;

/// SPI bus configuration, applied once when the bus is brought up.
///
/// Pins are `None` when unused; a display bus is write-only, so MISO and the
/// quad lines are normally left unconnected.
///
/// Pin numbers and the DMA channel are not interpreted by this crate. They
/// are passed through to the platform transport, which routes the bus
/// accordingly; [`SpiTransport`](crate::transport::SpiTransport) only
/// records them since its `SpiDevice` is already wired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BusConfig {
    pub mosi: Option<u8>,
    pub miso: Option<u8>,
    pub sclk: Option<u8>,
    pub quadwp: Option<u8>,
    pub quadhd: Option<u8>,
    /// Largest single transfer in bytes.
    pub max_transfer_sz: usize,
    /// DMA channel, `0` disables DMA.
    pub dma_channel: u8,
}

impl BusConfig {
    pub fn new() -> Self {
        Default::default()
    }

    /// Bus sized for a draw buffer of `buffer_pixels` pixels of model `M`.
    pub fn for_model<M: Model>(buffer_pixels: usize) -> Self {
        Self::new().max_transfer_sz(buffer_pixels * M::TRANSFER_BYTES_PER_PIXEL)
    }

    #[must_use]
    pub fn mosi(mut self, pin: u8) -> Self {
        self.mosi = Some(pin);
        self
    }

    #[must_use]
    pub fn miso(mut self, pin: u8) -> Self {
        self.miso = Some(pin);
        self
    }

    #[must_use]
    pub fn sclk(mut self, pin: u8) -> Self {
        self.sclk = Some(pin);
        self
    }

    #[must_use]
    pub fn max_transfer_sz(mut self, max_transfer_sz: usize) -> Self {
        self.max_transfer_sz = max_transfer_sz;
        self
    }

    #[must_use]
    pub fn dma_channel(mut self, dma_channel: u8) -> Self {
        self.dma_channel = dma_channel;
        self
    }
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            mosi: None,
            miso: None,
            sclk: None,
            quadwp: None,
            quadhd: None,
            max_transfer_sz: 4092,
            dma_channel: 1,
        }
    }
}

/// Display device configuration used when attaching to the bus.
///
/// `mode`, `cs` and `half_duplex` are passed through to the platform
/// transport like the pins of [`BusConfig`].
#[derive(Clone, Copy)]
pub struct DeviceConfig<'d> {
    pub clock_speed_hz: u32,
    pub mode: Mode,
    /// Chip-select line, `None` when CS is tied or handled by the bus.
    pub cs: Option<u8>,
    /// Transactions the bus driver may hold at once.
    pub queue_size: usize,
    pub half_duplex: bool,
    /// Callback that keeps firing after the dispatcher takes over completion.
    /// Must be the one the [`CompletionHook`](crate::CompletionHook) was
    /// built with through [`CompletionHook::chained`](crate::CompletionHook::chained).
    pub post_cb: Option<&'d (dyn PostCallback + Sync)>,
}

impl<'d> DeviceConfig<'d> {
    pub fn new() -> Self {
        Default::default()
    }

    /// Clock and SPI mode preset of model `M`.
    pub fn for_model<M: Model>() -> Self {
        Self::new()
            .clock_speed_hz(M::CLOCK_SPEED_HZ)
            .mode(M::SPI_MODE)
    }

    #[must_use]
    pub fn clock_speed_hz(mut self, clock_speed_hz: u32) -> Self {
        self.clock_speed_hz = clock_speed_hz;
        self
    }

    #[must_use]
    pub fn mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub fn cs(mut self, pin: u8) -> Self {
        self.cs = Some(pin);
        self
    }

    #[must_use]
    pub fn queue_size(mut self, queue_size: usize) -> Self {
        self.queue_size = queue_size;
        self
    }

    #[must_use]
    pub fn half_duplex(mut self, half_duplex: bool) -> Self {
        self.half_duplex = half_duplex;
        self
    }

    #[must_use]
    pub fn post_cb(mut self, post_cb: &'d (dyn PostCallback + Sync)) -> Self {
        self.post_cb = Some(post_cb);
        self
    }
}

impl Default for DeviceConfig<'_> {
    fn default() -> Self {
        Self {
            clock_speed_hz: 40_000_000,
            mode: MODE_0,
            cs: None,
            queue_size: 1,
            half_duplex: true,
            post_cb: None,
        }
    }
}

impl fmt::Debug for DeviceConfig<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceConfig")
            .field("clock_speed_hz", &self.clock_speed_hz)
            .field("mode", &self.mode)
            .field("cs", &self.cs)
            .field("queue_size", &self.queue_size)
            .field("half_duplex", &self.half_duplex)
            .field("post_cb", &self.post_cb.is_some())
            .finish()
    }
}
