//! USB transport abstraction
//!
//! The protocol layer never talks to a USB stack directly. Backends (nusb,
//! the in-memory dummy bridge, test doubles) implement [`ControlTransport`]
//! and perform exactly one control transfer per call.

use std::time::Duration;

use crate::error::TransportError;
use crate::request::{Direction, RequestDescriptor};

/// Timeout used when neither the backend nor the session picks one
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);

/// Data stage of a control transfer
///
/// `wLength` is the length of the buffer.
#[derive(Debug)]
pub enum DataStage<'a> {
    /// Buffer to receive device-to-host data
    In(&'a mut [u8]),
    /// Bytes to send host-to-device (may be empty)
    Out(&'a [u8]),
}

impl DataStage<'_> {
    pub fn len(&self) -> usize {
        match self {
            DataStage::In(buf) => buf.len(),
            DataStage::Out(data) => data.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn direction(&self) -> Direction {
        match self {
            DataStage::In(_) => Direction::In,
            DataStage::Out(_) => Direction::Out,
        }
    }
}

/// A USB device handle able to run control transfers on endpoint 0
///
/// Implementations must not retry: a failed transfer is reported as is.
pub trait ControlTransport {
    /// Run one control transfer
    ///
    /// Returns the number of bytes moved in the data stage. For IN
    /// transfers the received bytes are written to the start of the buffer
    /// and may be fewer than requested.
    fn transfer(
        &mut self,
        request: &RequestDescriptor,
        data: DataStage<'_>,
        timeout: Duration,
    ) -> Result<usize, TransportError>;

    /// Timeout to use when the caller does not supply one
    fn default_timeout(&self) -> Duration {
        DEFAULT_TIMEOUT
    }
}

impl<T: ControlTransport + ?Sized> ControlTransport for &mut T {
    fn transfer(
        &mut self,
        request: &RequestDescriptor,
        data: DataStage<'_>,
        timeout: Duration,
    ) -> Result<usize, TransportError> {
        (**self).transfer(request, data, timeout)
    }

    fn default_timeout(&self) -> Duration {
        (**self).default_timeout()
    }
}

// Allows `Box<dyn ControlTransport + Send>` chosen at runtime
impl<T: ControlTransport + ?Sized> ControlTransport for Box<T> {
    fn transfer(
        &mut self,
        request: &RequestDescriptor,
        data: DataStage<'_>,
        timeout: Duration,
    ) -> Result<usize, TransportError> {
        (**self).transfer(request, data, timeout)
    }

    fn default_timeout(&self) -> Duration {
        (**self).default_timeout()
    }
}
