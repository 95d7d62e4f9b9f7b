use embedded_hal::digital::OutputPin;

use super::Interface;
use crate::{hook::FlushReady, transaction::SendFlags, transport::Transport, Dispatcher, SendError};

/// Spi interface error
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SpiError<SPI, DC> {
    Spi(SPI),
    Dc(DC),
}

/// 4-line serial interface: a [`Dispatcher`] plus the data/command pin.
///
/// Commands go out in polling mode with DC low after everything queued
/// before them has left the bus, so the DC line never changes under a
/// transfer. Data and pixels are queued with DC high.
pub struct SpiInterface<'d, T, F, DC>
where
    T: Transport<'d>,
    F: FlushReady,
{
    dispatcher: Dispatcher<'d, T, F>,
    dc: DC,
}

impl<'d, T, F, DC> SpiInterface<'d, T, F, DC>
where
    T: Transport<'d>,
    F: FlushReady,
    DC: OutputPin,
{
    /// Create new interface
    pub fn new(dispatcher: Dispatcher<'d, T, F>, dc: DC) -> Self {
        Self { dispatcher, dc }
    }

    /// Release the DC pin and dispatcher back, deconstructing the interface
    pub fn release(self) -> (Dispatcher<'d, T, F>, DC) {
        (self.dispatcher, self.dc)
    }
}

impl<'d, T, F, DC> Interface<'d> for SpiInterface<'d, T, F, DC>
where
    T: Transport<'d>,
    F: FlushReady,
    DC: OutputPin,
{
    type Error = SpiError<SendError<T::Error>, DC::Error>;

    fn send_command(&mut self, command: u8, args: &[u8]) -> Result<(), Self::Error> {
        self.dispatcher.wait_idle().map_err(SpiError::Spi)?;
        self.dc.set_low().map_err(SpiError::Dc)?;
        self.dispatcher
            .send_blocking(&[command], SendFlags::POLLING)
            .map_err(SpiError::Spi)?;
        self.dc.set_high().map_err(SpiError::Dc)?;
        self.dispatcher
            .send_blocking(args, SendFlags::POLLING)
            .map_err(SpiError::Spi)?;
        Ok(())
    }

    fn send_data_slice(&mut self, data: &'d [u8]) -> Result<(), Self::Error> {
        self.dispatcher.send_data(data).map_err(SpiError::Spi)
    }

    fn send_pixels(&mut self, data: &'d [u8]) -> Result<(), Self::Error> {
        self.dispatcher.send_colors(data).map_err(SpiError::Spi)
    }

    fn is_busy(&self) -> bool {
        self.dispatcher.is_busy()
    }
}
