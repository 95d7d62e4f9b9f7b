#![cfg_attr(not(test), no_std)]

//! This crate drives SPI display panels from a graphics library's flush callback.
//!
//! Pixel and command buffers are treated as opaque bytes and turned into bus
//! transactions. A [`Dispatcher`] decides per send whether the transfer is
//! queued and returned from immediately or whether the caller blocks, keeps
//! at most one queued transaction outstanding, and reports through
//! [`FlushReady`] when a flush-tagged transaction has left the device.
//!
//! ## Example
//!
//! ```rust,ignore
//! let hook = CompletionHook::new(|| lv_disp_flush_ready());
//! let mut disp = Builder::new(SpiTransport::<_, 1>::new(spi_device), &hook)
//!     .model::<ST7789>(DISP_BUF_SIZE)
//!     .init()?;
//!
//! disp.send_data(&[0x2C])?;
//! disp.send_colors(frame)?;
//! while disp.is_busy() {}
//! ```
//!
//! ## Buffer lifetime
//!
//! Payloads of up to [`INLINE_CAPACITY`] bytes are copied into the
//! transaction. Longer payloads are sent straight from the caller's memory,
//! which is why queued sends borrow their buffer for the dispatcher lifetime
//! `'d`: the bytes must stay put until the transaction is reclaimed.
//! [`Dispatcher::send_blocking`] takes any buffer and only queues the short
//! ones it can copy.

pub mod config;
pub mod hook;
pub mod interface;
pub mod models;
pub mod transaction;
pub mod transport;

mod builder;
pub use builder::*;

pub use config::{BusConfig, DeviceConfig};
pub use hook::{CompletionHook, FlushReady, PostCallback};
pub use transaction::{Payload, SendFlags, Strategy, Transaction, INLINE_CAPACITY};
pub use transport::Transport;

#[cfg(test)]
mod _mock;

/// Error returned by the send operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SendError<E> {
    /// The transport refused the transaction.
    Transport(E),
    /// The bus did not hand back an outstanding transaction within the reclaim limit.
    Stalled,
}

/// Transaction dispatcher for one display device.
pub struct Dispatcher<'d, T, F>
where
    T: Transport<'d>,
    F: FlushReady,
{
    /// The bus device.
    transport: T,
    /// Completion hook installed on the device.
    hook: &'d CompletionHook<'d, F>,
    /// Storage for the queued transaction, `Some` until it is reclaimed.
    slot: Option<Transaction<'d>>,
    /// Result polls allowed per reclaim, `None` waits forever.
    reclaim_limit: Option<u32>,
    max_transfer_sz: usize,
}

impl<'d, T, F> Dispatcher<'d, T, F>
where
    T: Transport<'d>,
    F: FlushReady,
{
    /// Sends `data` with the strategy and flush signalling selected by `flags`.
    ///
    /// A zero-length send does nothing. Any previously queued transaction is
    /// reclaimed first.
    pub fn send(&mut self, data: &'d [u8], flags: SendFlags) -> Result<(), SendError<T::Error>> {
        if data.is_empty() {
            return Ok(());
        }
        self.check_len(data);
        self.reclaim()?;

        let trans = Transaction::new(data, flags);
        match flags.strategy() {
            Strategy::Queued => self.enqueue(trans),
            strategy => self.transmit(&trans, strategy),
        }
    }

    /// Like [`Self::send`] for buffers that only live for the call.
    ///
    /// A queued payload of up to [`INLINE_CAPACITY`] bytes is copied into the
    /// transaction and still queued. Longer queued payloads are sent
    /// synchronously instead, since the buffer may be gone as soon as this
    /// returns.
    pub fn send_blocking(
        &mut self,
        data: &[u8],
        flags: SendFlags,
    ) -> Result<(), SendError<T::Error>> {
        if data.is_empty() {
            return Ok(());
        }
        self.check_len(data);
        self.reclaim()?;

        match flags.strategy() {
            Strategy::Queued if data.len() <= INLINE_CAPACITY => {
                self.enqueue(Transaction::inline(data, flags))
            }
            Strategy::Queued => {
                self.transmit(&Transaction::new(data, flags), Strategy::Synchronous)
            }
            strategy => self.transmit(&Transaction::new(data, flags), strategy),
        }
    }

    /// Queues a command or parameter buffer without flush signalling.
    pub fn send_data(&mut self, data: &'d [u8]) -> Result<(), SendError<T::Error>> {
        self.send(data, SendFlags::QUEUED)
    }

    /// Queues pixel data; completion reports the buffer as flushed.
    pub fn send_colors(&mut self, data: &'d [u8]) -> Result<(), SendError<T::Error>> {
        self.send(data, SendFlags::QUEUED | SendFlags::SIGNAL_FLUSH)
    }

    /// Returns `true` while a transaction is in flight.
    pub fn is_busy(&self) -> bool {
        self.hook.is_busy()
    }

    /// Number of submitted transactions not yet reclaimed.
    pub fn outstanding(&self) -> usize {
        usize::from(self.slot.is_some())
    }

    pub fn max_transfer_sz(&self) -> usize {
        self.max_transfer_sz
    }

    /// Reclaims the outstanding transaction and waits until the bus is idle.
    pub fn wait_idle(&mut self) -> Result<(), SendError<T::Error>> {
        self.reclaim()?;

        let mut polls = 0;
        while self.hook.is_busy() {
            self.tick(&mut polls)?;
        }
        Ok(())
    }

    /// Releases the transport, deconstructing the dispatcher.
    pub fn release(self) -> T {
        self.transport
    }

    fn check_len(&self, data: &[u8]) {
        debug_assert!(
            data.len() <= self.max_transfer_sz,
            "transfer of {} bytes exceeds max_transfer_sz {}",
            data.len(),
            self.max_transfer_sz
        );
    }

    /// Collects finished queued transactions until none is outstanding.
    fn reclaim(&mut self) -> Result<(), SendError<T::Error>> {
        let mut polls = 0;
        while let Some(queued) = self.slot {
            match self.transport.get_trans_result() {
                Ok(done) => {
                    debug_assert_eq!(done, queued);
                    self.slot = None;
                }
                Err(nb::Error::WouldBlock) => self.tick(&mut polls)?,
                Err(nb::Error::Other(e)) => return Err(SendError::Transport(e)),
            }
        }
        Ok(())
    }

    fn tick(&self, polls: &mut u32) -> Result<(), SendError<T::Error>> {
        *polls += 1;
        match self.reclaim_limit {
            Some(limit) if *polls >= limit => {
                log::warn!("display bus stalled after {} polls", *polls);
                Err(SendError::Stalled)
            }
            _ => {
                core::hint::spin_loop();
                Ok(())
            }
        }
    }

    fn transmit(
        &mut self,
        trans: &Transaction<'_>,
        strategy: Strategy,
    ) -> Result<(), SendError<T::Error>> {
        self.hook.begin();
        let res = match strategy {
            Strategy::Polling => self.transport.polling_transmit(trans),
            _ => self.transport.transmit(trans),
        };
        res.map_err(|e| {
            self.hook.abort();
            SendError::Transport(e)
        })
    }

    fn enqueue(&mut self, trans: Transaction<'d>) -> Result<(), SendError<T::Error>> {
        // The slot must be free here, reclaim ran first.
        debug_assert!(self.slot.is_none());
        let queued = self.slot.insert(trans);

        self.hook.begin();
        if let Err(e) = self.transport.queue_trans(queued) {
            self.slot = None;
            self.hook.abort();
            return Err(SendError::Transport(e));
        }
        Ok(())
    }
}
