//! Session over a blocking UART

use core::fmt;

use pumprig_hal::{BlockingDelay, UartRx, UartTx};

use crate::session::{ConfigSession, PulseSettings, SessionError};

/// Pause around every reply; the host reads with the same pacing
pub const PACING_MS: u32 = 10;

/// Link errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkError<E> {
    /// UART read or write failed
    Uart(E),
    /// Session state machine rejected a byte
    Session(SessionError),
}

impl<E> From<SessionError> for LinkError<E> {
    fn from(e: SessionError) -> Self {
        LinkError::Session(e)
    }
}

impl<E: fmt::Debug> fmt::Display for LinkError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uart(e) => write!(f, "uart: {e:?}"),
            Self::Session(e) => write!(f, "session: {e}"),
        }
    }
}

/// Run a configuration session to completion
///
/// Blocks until the host has sent both fields.
pub fn receive_settings<U, D, E>(uart: &mut U, delay: &mut D) -> Result<PulseSettings, LinkError<E>>
where
    U: UartTx<Error = E> + UartRx<Error = E>,
    D: BlockingDelay,
{
    let mut session = ConfigSession::new();

    loop {
        let byte = uart.read_byte().map_err(LinkError::Uart)?;
        let reply = session.feed(byte)?;

        if !reply.bytes.is_empty() {
            delay.delay_ms(PACING_MS);
            uart.write_blocking(&reply.bytes).map_err(LinkError::Uart)?;
            uart.flush().map_err(LinkError::Uart)?;
            delay.delay_ms(PACING_MS);
        }

        if let Some(settings) = reply.settings {
            return Ok(settings);
        }
    }
}
