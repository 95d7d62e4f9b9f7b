mod spi;
pub use spi::*;

/// Command and pixel interface of a display panel.
///
/// Panel drivers talk to the controller through this trait: a command byte
/// followed by its parameters, then raw pixel data.
pub trait Interface<'d> {
    /// Error type
    type Error: core::fmt::Debug;

    /// Send a command with optional parameters.
    ///
    /// Returns once the command and its parameters are on the wire.
    fn send_command(&mut self, command: u8, args: &[u8]) -> Result<(), Self::Error>;

    /// Send a raw slice of data that does not finish a frame.
    fn send_data_slice(&mut self, data: &'d [u8]) -> Result<(), Self::Error>;

    /// Send pixel data. `WriteMemoryStart` (or equivalent) must be sent before
    /// calling this function. Completion raises the flush-ready signal.
    fn send_pixels(&mut self, data: &'d [u8]) -> Result<(), Self::Error>;

    /// Returns `true` while data is still being clocked out.
    fn is_busy(&self) -> bool;
}

impl<'d, T: Interface<'d> + ?Sized> Interface<'d> for &mut T {
    type Error = T::Error;

    fn send_command(&mut self, command: u8, args: &[u8]) -> Result<(), Self::Error> {
        T::send_command(self, command, args)
    }

    fn send_data_slice(&mut self, data: &'d [u8]) -> Result<(), Self::Error> {
        T::send_data_slice(self, data)
    }

    fn send_pixels(&mut self, data: &'d [u8]) -> Result<(), Self::Error> {
        T::send_pixels(self, data)
    }

    fn is_busy(&self) -> bool {
        T::is_busy(self)
    }
}
