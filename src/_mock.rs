//! Test doubles.

use core::cell::RefCell;
use core::convert::Infallible;
use std::collections::VecDeque;

use embedded_hal::{
    digital,
    spi::{self, Operation},
};

use crate::{
    config::{BusConfig, DeviceConfig},
    hook::PostCallback,
    transaction::{Payload, SendFlags, Strategy, Transaction},
    transport::Transport,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockError {
    Refused,
    AlreadyAttached,
}

/// When queued transactions complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Completion {
    /// As soon as they are queued.
    Immediate,
    /// When the dispatcher asks for the result.
    OnPoll,
    /// Only through [`MockBus::complete_next`].
    Manual,
}

/// One submission as seen by the bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sent {
    pub strategy: Strategy,
    pub bytes: Vec<u8>,
    pub length_bits: usize,
    pub flags: SendFlags,
    pub inline: bool,
    /// Address of the borrowed caller buffer.
    pub addr: Option<usize>,
    /// Queued transactions held by the driver at submission time.
    pub in_driver_before: usize,
}

impl Sent {
    pub fn borrows(&self, buf: &[u8]) -> bool {
        self.addr == Some(buf.as_ptr() as usize)
    }
}

struct State<'d> {
    completion: Completion,
    post_cb: Option<&'d dyn PostCallback>,
    device_clock: Option<u32>,
    bus_inits: usize,
    fail: Option<MockError>,
    pending: VecDeque<Transaction<'d>>,
    done: VecDeque<Transaction<'d>>,
    sent: Vec<Sent>,
    completions: usize,
    max_in_driver: usize,
}

/// Scriptable display bus.
pub struct MockBus<'d> {
    state: RefCell<State<'d>>,
}

impl<'d> MockBus<'d> {
    pub fn new() -> Self {
        Self {
            state: RefCell::new(State {
                completion: Completion::Immediate,
                post_cb: None,
                device_clock: None,
                bus_inits: 0,
                fail: None,
                pending: VecDeque::new(),
                done: VecDeque::new(),
                sent: Vec::new(),
                completions: 0,
                max_in_driver: 0,
            }),
        }
    }

    /// Queued transactions stay in flight until their result is polled.
    pub fn deferred(self) -> Self {
        self.state.borrow_mut().completion = Completion::OnPoll;
        self
    }

    /// Queued transactions stay in flight until [`Self::complete_next`].
    pub fn stalled(self) -> Self {
        self.state.borrow_mut().completion = Completion::Manual;
        self
    }

    /// Makes the next bus call fail with `err`.
    pub fn fail_next(&self, err: MockError) {
        self.state.borrow_mut().fail = Some(err);
    }

    /// Finishes the oldest in-flight queued transaction.
    pub fn complete_next(&self) -> bool {
        let trans = {
            let mut state = self.state.borrow_mut();
            match state.pending.pop_front() {
                Some(trans) => {
                    state.done.push_back(trans);
                    trans
                }
                None => return false,
            }
        };
        self.post(&trans);
        true
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.state.borrow().sent.clone()
    }

    /// Number of completion callbacks delivered.
    pub fn completions(&self) -> usize {
        self.state.borrow().completions
    }

    pub fn max_in_driver(&self) -> usize {
        self.state.borrow().max_in_driver
    }

    pub fn bus_inits(&self) -> usize {
        self.state.borrow().bus_inits
    }

    pub fn is_attached(&self) -> bool {
        self.state.borrow().post_cb.is_some()
    }

    pub fn device_clock(&self) -> Option<u32> {
        self.state.borrow().device_clock
    }

    fn check(&self) -> Result<(), MockError> {
        match self.state.borrow_mut().fail.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn record(&self, trans: &Transaction<'_>, strategy: Strategy) -> Result<(), MockError> {
        self.check()?;
        let mut state = self.state.borrow_mut();
        let addr = match trans.payload() {
            Payload::Borrowed(data) => Some(data.as_ptr() as usize),
            Payload::Inline { .. } => None,
        };
        let in_driver_before = state.pending.len() + state.done.len();
        state.sent.push(Sent {
            strategy,
            bytes: trans.tx_bytes().to_vec(),
            length_bits: trans.length_bits(),
            flags: trans.flags(),
            inline: trans.payload().is_inline(),
            addr,
            in_driver_before,
        });
        Ok(())
    }

    fn post(&self, trans: &Transaction<'_>) {
        let post_cb = {
            let mut state = self.state.borrow_mut();
            state.completions += 1;
            state.post_cb
        };
        if let Some(post_cb) = post_cb {
            post_cb.post(trans);
        }
    }
}

impl<'m, 'd> Transport<'d> for &'m MockBus<'d> {
    type Error = MockError;

    fn init_bus(&mut self, _config: &BusConfig) -> Result<(), Self::Error> {
        self.check()?;
        self.state.borrow_mut().bus_inits += 1;
        Ok(())
    }

    fn add_device(
        &mut self,
        config: &DeviceConfig<'d>,
        post_cb: &'d dyn PostCallback,
    ) -> Result<(), Self::Error> {
        self.check()?;
        let mut state = self.state.borrow_mut();
        if state.post_cb.is_some() {
            return Err(MockError::AlreadyAttached);
        }
        state.post_cb = Some(post_cb);
        state.device_clock = Some(config.clock_speed_hz);
        Ok(())
    }

    fn polling_transmit(&mut self, trans: &Transaction<'_>) -> Result<(), Self::Error> {
        self.record(trans, Strategy::Polling)?;
        self.post(trans);
        Ok(())
    }

    fn transmit(&mut self, trans: &Transaction<'_>) -> Result<(), Self::Error> {
        self.record(trans, Strategy::Synchronous)?;
        self.post(trans);
        Ok(())
    }

    fn queue_trans(&mut self, trans: &Transaction<'d>) -> Result<(), Self::Error> {
        self.record(trans, Strategy::Queued)?;
        let immediate = {
            let mut state = self.state.borrow_mut();
            state.pending.push_back(*trans);
            let in_driver = state.pending.len() + state.done.len();
            state.max_in_driver = state.max_in_driver.max(in_driver);
            state.completion == Completion::Immediate
        };
        if immediate {
            self.complete_next();
        }
        Ok(())
    }

    fn get_trans_result(&mut self) -> nb::Result<Transaction<'d>, Self::Error> {
        let on_poll = {
            let mut state = self.state.borrow_mut();
            if let Some(trans) = state.done.pop_front() {
                return Ok(trans);
            }
            state.completion == Completion::OnPoll
        };
        if on_poll && self.complete_next() {
            return self.get_trans_result();
        }
        Err(nb::Error::WouldBlock)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusEvent {
    Dc(bool),
    Write(Vec<u8>),
}

/// SPI device recording writes into a shared event log.
pub struct MockSpi<'a> {
    events: &'a RefCell<Vec<BusEvent>>,
}

impl<'a> MockSpi<'a> {
    pub fn new(events: &'a RefCell<Vec<BusEvent>>) -> Self {
        Self { events }
    }
}

impl spi::ErrorType for MockSpi<'_> {
    type Error = Infallible;
}

impl spi::SpiDevice for MockSpi<'_> {
    fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), Self::Error> {
        for op in operations.iter() {
            if let Operation::Write(data) = op {
                self.events.borrow_mut().push(BusEvent::Write(data.to_vec()));
            }
        }
        Ok(())
    }
}

/// Data/command pin recording its level changes into the same log.
pub struct MockPin<'a> {
    events: &'a RefCell<Vec<BusEvent>>,
}

impl<'a> MockPin<'a> {
    pub fn new(events: &'a RefCell<Vec<BusEvent>>) -> Self {
        Self { events }
    }
}

impl digital::ErrorType for MockPin<'_> {
    type Error = Infallible;
}

impl digital::OutputPin for MockPin<'_> {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.events.borrow_mut().push(BusEvent::Dc(false));
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.events.borrow_mut().push(BusEvent::Dc(true));
        Ok(())
    }
}
