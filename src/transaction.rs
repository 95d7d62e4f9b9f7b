//! Bus transactions and the send flags they carry.

use core::ops::BitOr;

/// Largest payload copied into the transaction itself instead of borrowed.
pub const INLINE_CAPACITY: usize = 4;

/// Send flags stored on every transaction and read back by the completion hook.
///
/// The low two bits select the transmit strategy, [`SendFlags::SIGNAL_FLUSH`]
/// asks the completion hook to report the buffer as flushed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SendFlags(u8);

impl SendFlags {
    /// Hand the transaction to the bus driver queue and return immediately.
    pub const QUEUED: Self = Self(0x00);
    /// Busy-wait on the bus until the transaction is done.
    pub const POLLING: Self = Self(0x01);
    /// Submit and block until the driver reports completion.
    pub const SYNCHRONOUS: Self = Self(0x02);
    /// Notify the graphics library once the transaction completes.
    pub const SIGNAL_FLUSH: Self = Self(0x04);

    const ALL: u8 = 0x07;

    /// Raw bit representation.
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Builds flags from raw bits, dropping unknown ones.
    pub const fn from_bits_truncate(bits: u8) -> Self {
        Self(bits & Self::ALL)
    }

    /// Returns `true` if every bit of `other` is set in `self`.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Transmit strategy selected by these flags.
    ///
    /// Polling wins over synchronous when both are set.
    pub const fn strategy(self) -> Strategy {
        if self.contains(Self::POLLING) {
            Strategy::Polling
        } else if self.contains(Self::SYNCHRONOUS) {
            Strategy::Synchronous
        } else {
            Strategy::Queued
        }
    }

    /// Returns `true` if completion must raise the flush-ready signal.
    pub const fn signals_flush(self) -> bool {
        self.contains(Self::SIGNAL_FLUSH)
    }
}

impl BitOr for SendFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

/// How a transaction is handed to the transport.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Strategy {
    Queued,
    Polling,
    Synchronous,
}

/// Transaction payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Payload<'a> {
    /// Short payload owned by the transaction.
    Inline {
        data: [u8; INLINE_CAPACITY],
        len: u8,
    },
    /// Caller memory, which must stay untouched until the transaction is reclaimed.
    Borrowed(&'a [u8]),
}

impl<'a> Payload<'a> {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Payload::Inline { data, len } => &data[..usize::from(*len)],
            Payload::Borrowed(data) => data,
        }
    }

    pub fn is_inline(&self) -> bool {
        matches!(self, Payload::Inline { .. })
    }
}

/// One discrete transfer submitted to the bus.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Transaction<'a> {
    payload: Payload<'a>,
    length: usize,
    user: SendFlags,
}

impl<'a> Transaction<'a> {
    /// Builds a transaction for `data`, copying it when it fits [`INLINE_CAPACITY`].
    pub fn new(data: &'a [u8], flags: SendFlags) -> Self {
        if data.len() <= INLINE_CAPACITY {
            Self::inline(data, flags)
        } else {
            Self {
                payload: Payload::Borrowed(data),
                length: data.len() * 8,
                user: flags,
            }
        }
    }

    /// Copies `data` into a self-contained transaction.
    ///
    /// # Panics
    ///
    /// Panics if `data` is longer than [`INLINE_CAPACITY`].
    pub fn inline(data: &[u8], flags: SendFlags) -> Transaction<'static> {
        let mut buf = [0; INLINE_CAPACITY];
        buf[..data.len()].copy_from_slice(data);
        Transaction {
            payload: Payload::Inline {
                data: buf,
                len: data.len() as u8,
            },
            length: data.len() * 8,
            user: flags,
        }
    }

    pub fn payload(&self) -> &Payload<'a> {
        &self.payload
    }

    /// Bytes to put on the wire.
    pub fn tx_bytes(&self) -> &[u8] {
        self.payload.as_bytes()
    }

    /// Transfer length in bits.
    pub fn length_bits(&self) -> usize {
        self.length
    }

    pub fn len(&self) -> usize {
        self.length / 8
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Flags the transaction was sent with.
    pub fn flags(&self) -> SendFlags {
        self.user
    }
}
