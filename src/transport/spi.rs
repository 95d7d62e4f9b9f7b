use embedded_hal::spi::SpiDevice;
use heapless::Deque;

use super::Transport;
use crate::config::{BusConfig, DeviceConfig};
use crate::hook::PostCallback;
use crate::transaction::Transaction;

/// Spi transport error
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SpiTransportError<SPI> {
    Spi(SPI),
    /// [`Transport::init_bus`] was called twice.
    BusAlreadyInitialized,
    BusNotInitialized,
    /// A device is already attached to this transport.
    DeviceAlreadyAttached,
    DeviceNotAttached,
    /// The requested queue size exceeds the completion queue capacity.
    QueueSizeTooLarge,
    QueueFull,
    /// Transfer larger than the bus `max_transfer_sz`.
    TransferTooLong,
}

/// Transport over a blocking [`SpiDevice`].
///
/// Every strategy writes the bytes out before returning; queued transactions
/// are then parked in a completion queue of capacity `N` until
/// [`Transport::get_trans_result`] collects them.
///
/// Pins, SPI mode and chip select belong to the `SpiDevice` itself. The bus
/// and device configurations are recorded as given and can be read back.
pub struct SpiTransport<'d, SPI, const N: usize = 1> {
    spi: SPI,
    bus: Option<BusConfig>,
    device: Option<DeviceConfig<'d>>,
    post_cb: Option<&'d dyn PostCallback>,
    done: Deque<Transaction<'d>, N>,
}

impl<'d, SPI, const N: usize> SpiTransport<'d, SPI, N>
where
    SPI: SpiDevice,
{
    /// Create new transport
    pub fn new(spi: SPI) -> Self {
        Self {
            spi,
            bus: None,
            device: None,
            post_cb: None,
            done: Deque::new(),
        }
    }

    /// Bus configuration recorded by [`Transport::init_bus`].
    pub fn bus_config(&self) -> Option<&BusConfig> {
        self.bus.as_ref()
    }

    /// Device configuration recorded by [`Transport::add_device`].
    pub fn device_config(&self) -> Option<&DeviceConfig<'d>> {
        self.device.as_ref()
    }

    /// Release the SPI device, deconstructing the transport
    pub fn release(self) -> SPI {
        self.spi
    }

    fn write(&mut self, trans: &Transaction<'_>) -> Result<(), SpiTransportError<SPI::Error>> {
        let post_cb = self.post_cb.ok_or(SpiTransportError::DeviceNotAttached)?;
        let bus = self.bus.ok_or(SpiTransportError::BusNotInitialized)?;
        if trans.len() > bus.max_transfer_sz {
            return Err(SpiTransportError::TransferTooLong);
        }

        self.spi
            .write(trans.tx_bytes())
            .map_err(SpiTransportError::Spi)?;
        post_cb.post(trans);
        Ok(())
    }
}

impl<'d, SPI, const N: usize> Transport<'d> for SpiTransport<'d, SPI, N>
where
    SPI: SpiDevice,
{
    type Error = SpiTransportError<SPI::Error>;

    fn init_bus(&mut self, config: &BusConfig) -> Result<(), Self::Error> {
        if self.bus.is_some() {
            return Err(SpiTransportError::BusAlreadyInitialized);
        }
        self.bus = Some(*config);
        Ok(())
    }

    fn add_device(
        &mut self,
        config: &DeviceConfig<'d>,
        post_cb: &'d dyn PostCallback,
    ) -> Result<(), Self::Error> {
        if self.bus.is_none() {
            return Err(SpiTransportError::BusNotInitialized);
        }
        if self.post_cb.is_some() {
            return Err(SpiTransportError::DeviceAlreadyAttached);
        }
        if config.queue_size > N {
            return Err(SpiTransportError::QueueSizeTooLarge);
        }
        self.device = Some(*config);
        self.post_cb = Some(post_cb);
        Ok(())
    }

    fn polling_transmit(&mut self, trans: &Transaction<'_>) -> Result<(), Self::Error> {
        self.write(trans)
    }

    fn transmit(&mut self, trans: &Transaction<'_>) -> Result<(), Self::Error> {
        self.write(trans)
    }

    fn queue_trans(&mut self, trans: &Transaction<'d>) -> Result<(), Self::Error> {
        let queue_size = self.device.map_or(0, |device| device.queue_size);
        if self.done.len() >= queue_size {
            return Err(SpiTransportError::QueueFull);
        }
        self.write(trans)?;
        self.done
            .push_back(*trans)
            .map_err(|_| SpiTransportError::QueueFull)
    }

    fn get_trans_result(&mut self) -> nb::Result<Transaction<'d>, Self::Error> {
        self.done.pop_front().ok_or(nb::Error::WouldBlock)
    }
}
