//! Bus transports.
//!
//! A [`Transport`] owns the attached display device and knows three ways to
//! put a [`Transaction`] on the wire: polling, blocking and queued. Queued
//! transactions are retrieved again with [`Transport::get_trans_result`]
//! once the bus is done with them.

#[cfg(feature = "blocking")]
mod spi;
#[cfg(feature = "blocking")]
pub use spi::*;

use crate::config::{BusConfig, DeviceConfig};
use crate::hook::PostCallback;
use crate::transaction::Transaction;

/// Display bus device.
///
/// Every completed transaction, whatever the strategy it was sent with, must
/// be reported to the `post_cb` registered in [`Transport::add_device`]
/// exactly once.
pub trait Transport<'d> {
    /// Error type
    type Error: core::fmt::Debug;

    /// Brings up the bus. Called once, before [`Transport::add_device`].
    fn init_bus(&mut self, config: &BusConfig) -> Result<(), Self::Error>;

    /// Attaches the display device and installs its completion callback.
    fn add_device(
        &mut self,
        config: &DeviceConfig<'d>,
        post_cb: &'d dyn PostCallback,
    ) -> Result<(), Self::Error>;

    /// Sends `trans`, busy-waiting on the bus until it is done.
    fn polling_transmit(&mut self, trans: &Transaction<'_>) -> Result<(), Self::Error>;

    /// Sends `trans` and blocks until the driver reports completion.
    fn transmit(&mut self, trans: &Transaction<'_>) -> Result<(), Self::Error>;

    /// Hands `trans` to the driver queue and returns immediately.
    ///
    /// The bytes `trans` refers to must not change until the transaction is
    /// returned by [`Transport::get_trans_result`].
    fn queue_trans(&mut self, trans: &Transaction<'d>) -> Result<(), Self::Error>;

    /// Returns the oldest completed queued transaction, or
    /// [`nb::Error::WouldBlock`] if none has completed yet.
    fn get_trans_result(&mut self) -> nb::Result<Transaction<'d>, Self::Error>;
}

impl<'d, T: Transport<'d> + ?Sized> Transport<'d> for &mut T {
    type Error = T::Error;

    fn init_bus(&mut self, config: &BusConfig) -> Result<(), Self::Error> {
        T::init_bus(self, config)
    }

    fn add_device(
        &mut self,
        config: &DeviceConfig<'d>,
        post_cb: &'d dyn PostCallback,
    ) -> Result<(), Self::Error> {
        T::add_device(self, config, post_cb)
    }

    fn polling_transmit(&mut self, trans: &Transaction<'_>) -> Result<(), Self::Error> {
        T::polling_transmit(self, trans)
    }

    fn transmit(&mut self, trans: &Transaction<'_>) -> Result<(), Self::Error> {
        T::transmit(self, trans)
    }

    fn queue_trans(&mut self, trans: &Transaction<'d>) -> Result<(), Self::Error> {
        T::queue_trans(self, trans)
    }

    fn get_trans_result(&mut self) -> nb::Result<Transaction<'d>, Self::Error> {
        T::get_trans_result(self)
    }
}
