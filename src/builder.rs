//! [super::Dispatcher] builder module

use crate::{
    config::{BusConfig, DeviceConfig},
    hook::{CompletionHook, FlushReady, PostCallback},
    models::Model,
    transport::Transport,
    Dispatcher,
};

/// Builder for [Dispatcher] instances.
pub struct Builder<'d, T, F>
where
    T: Transport<'d>,
    F: FlushReady,
{
    transport: T,
    hook: &'d CompletionHook<'d, F>,
    bus: BusConfig,
    device: DeviceConfig<'d>,
    reclaim_limit: Option<u32>,
}

impl<'d, T, F> Builder<'d, T, F>
where
    T: Transport<'d>,
    F: FlushReady + 'd,
{
    #[must_use]
    pub fn new(transport: T, hook: &'d CompletionHook<'d, F>) -> Self {
        Self {
            transport,
            hook,
            bus: BusConfig::default(),
            device: DeviceConfig::default(),
            reclaim_limit: None,
        }
    }

    #[must_use]
    pub fn bus_config(mut self, bus: BusConfig) -> Self {
        self.bus = bus;
        self
    }

    #[must_use]
    pub fn device_config(mut self, device: DeviceConfig<'d>) -> Self {
        self.device = device;
        self
    }

    /// Applies the bus and device presets of model `M` for a draw buffer of
    /// `buffer_pixels` pixels. A chained `post_cb` already set is kept.
    #[must_use]
    pub fn model<M: Model>(mut self, buffer_pixels: usize) -> Self {
        let post_cb = self.device.post_cb;
        self.bus = BusConfig::for_model::<M>(buffer_pixels);
        self.device = DeviceConfig {
            post_cb,
            ..DeviceConfig::for_model::<M>()
        };
        self
    }

    /// Gives up on a stalled bus after `polls` unsuccessful result polls
    /// instead of waiting forever.
    #[must_use]
    pub fn reclaim_limit(mut self, polls: u32) -> Self {
        self.reclaim_limit = Some(polls);
        self
    }

    /// Brings up the bus and attaches the display device.
    ///
    /// The `post_cb` of the device configuration must be the callback the
    /// completion hook was built with, or absent on both. An error here means
    /// the display is unusable.
    pub fn init(mut self) -> Result<Dispatcher<'d, T, F>, InitError<T::Error>> {
        if self.device.queue_size == 0 {
            return Err(InitError::InvalidConfiguration(
                ConfigurationError::InvalidQueueSize,
            ));
        }
        if self.bus.max_transfer_sz == 0 {
            return Err(InitError::InvalidConfiguration(
                ConfigurationError::InvalidTransferSize,
            ));
        }
        if post_cb_addr(self.device.post_cb) != post_cb_addr(self.hook.chained_post_cb()) {
            return Err(InitError::InvalidConfiguration(
                ConfigurationError::PostCallbackMismatch,
            ));
        }

        log::debug!(
            "initializing display bus, max transfer {} bytes",
            self.bus.max_transfer_sz
        );
        self.transport
            .init_bus(&self.bus)
            .map_err(InitError::Bus)?;

        self.transport
            .add_device(&self.device, self.hook)
            .map_err(InitError::Device)?;
        log::debug!(
            "display device attached at {} Hz, queue size {}",
            self.device.clock_speed_hz,
            self.device.queue_size
        );

        Ok(Dispatcher {
            transport: self.transport,
            hook: self.hook,
            slot: None,
            reclaim_limit: self.reclaim_limit,
            max_transfer_sz: self.bus.max_transfer_sz,
        })
    }
}

fn post_cb_addr(post_cb: Option<&(dyn PostCallback + Sync)>) -> Option<*const ()> {
    post_cb.map(|cb| cb as *const _ as *const ())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InitError<E> {
    /// The bus could not be brought up.
    Bus(E),
    /// The display device could not be attached.
    Device(E),
    InvalidConfiguration(ConfigurationError),
}

#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigurationError {
    InvalidQueueSize,
    InvalidTransferSize,
    /// The device `post_cb` differs from the one chained in the hook.
    PostCallbackMismatch,
}
