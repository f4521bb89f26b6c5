//! Console UART transmitter status.
//!
//! The clock switch only needs to know when the console has stopped
//! shifting bits out, since the UART baud generator runs from the clock
//! being switched.

use core::convert::Infallible;

use crate::pac;

/// Snapshot of UART_STATUS_REG, transmit side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TxStatus {
    /// Bytes still queued in the TX FIFO (UART_TXFIFO_CNT)
    pub fifo_count: u8,
    /// Transmitter state machine (UART_ST_UTX_OUT), zero when idle
    pub tx_state: u8,
}

impl TxStatus {
    pub const IDLE: Self = Self {
        fifo_count: 0,
        tx_state: 0,
    };

    /// Both the FIFO and the shift register are empty.
    pub const fn is_idle(&self) -> bool {
        self.fifo_count == 0 && self.tx_state == 0
    }
}

/// One non-blocking check of the transmitter. Use with `nb::block!` to wait
/// for the console to drain.
pub fn poll_idle(status: TxStatus) -> nb::Result<(), Infallible> {
    if status.is_idle() {
        Ok(())
    } else {
        Err(nb::Error::WouldBlock)
    }
}

/// UART the clock switch drains, by instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Uart {
    #[default]
    Uart0,
    Uart1,
    Uart2,
}

impl Uart {
    /// Returns `None` if the chip has no UART `num`.
    pub const fn from_num(num: u8) -> Option<Self> {
        match num {
            0 => Some(Self::Uart0),
            1 => Some(Self::Uart1),
            2 => Some(Self::Uart2),
            _ => None,
        }
    }

    pub const fn num(self) -> u8 {
        self as u8
    }

    /// Read the transmit side of UART_STATUS_REG.
    pub fn tx_status(self) -> TxStatus {
        let regs = unsafe {
            &*match self {
                Uart::Uart0 => pac::UART0::ptr(),
                Uart::Uart1 => pac::UART1::ptr(),
                Uart::Uart2 => pac::UART2::ptr(),
            }
        };
        let status = regs.status().read();
        TxStatus {
            fifo_count: status.txfifo_cnt().bits(),
            tx_state: status.st_utx_out().bits(),
        }
    }
}
