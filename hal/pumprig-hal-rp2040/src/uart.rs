//! Blocking UART
//!
//! The serial pulse handshake is strictly request/response at 115200
//! baud, so the blocking driver is enough.

use embassy_rp::uart::{Blocking, Config, Error, Uart};
use pumprig_hal::uart::{UartConfig, UartRx, UartTx};

use crate::pins::UartPeripherals;

/// UART0 on GPIO0 (TX) / GPIO1 (RX)
pub struct RpUart {
    inner: Uart<'static, Blocking>,
}

impl RpUart {
    /// Claim UART0 and its pins
    pub fn new(peripherals: UartPeripherals, config: UartConfig) -> Self {
        let mut uart_config = Config::default();
        uart_config.baudrate = config.baudrate;

        let inner = Uart::new_blocking(
            peripherals.uart0,
            peripherals.tx,
            peripherals.rx,
            uart_config,
        );
        Self { inner }
    }
}

impl UartTx for RpUart {
    type Error = Error;

    fn write_blocking(&mut self, data: &[u8]) -> Result<(), Error> {
        self.inner.blocking_write(data)
    }

    fn flush(&mut self) -> Result<(), Error> {
        self.inner.blocking_flush()
    }
}

impl UartRx for RpUart {
    type Error = Error;

    fn read_blocking(&mut self, buf: &mut [u8]) -> Result<usize, Error> {
        self.inner.blocking_read(buf)?;
        Ok(buf.len())
    }
}
