//! CIS data packet statistics.

use platform::RadioStatus;

/// Monotonic packet counters and ISR timing samples.
///
/// Written only by the completion handlers; consumers get a shared reference
/// or a copy. Counters saturate instead of wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CisStats {
    /// Successful transmissions.
    pub tx_data: u32,
    /// Successful receptions.
    pub rx_data: u32,
    /// Receive windows that closed without a packet.
    pub rx_data_timeout: u32,
    /// Receptions with a CRC error.
    pub rx_data_crc: u32,
    /// Any other failed transaction.
    pub err_data: u32,
    /// Duration of the last Tx completion handler.
    pub tx_isr_us: u16,
    /// Duration of the last Rx completion handler.
    pub rx_isr_us: u16,
    /// Longest Tx completion handler seen.
    pub max_tx_isr_us: u16,
    /// Longest Rx completion handler seen.
    pub max_rx_isr_us: u16,
}

impl CisStats {
    /// All counters zero.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            tx_data: 0,
            rx_data: 0,
            rx_data_timeout: 0,
            rx_data_crc: 0,
            err_data: 0,
            tx_isr_us: 0,
            rx_isr_us: 0,
            max_tx_isr_us: 0,
            max_rx_isr_us: 0,
        }
    }

    /// Receive attempts of any outcome.
    #[must_use]
    pub fn rx_attempts(&self) -> u32 {
        self.rx_data
            .saturating_add(self.rx_data_timeout)
            .saturating_add(self.rx_data_crc)
    }

    pub(crate) fn record_tx(&mut self, status: RadioStatus, isr_us: u32) {
        let counter = match status {
            RadioStatus::Success => &mut self.tx_data,
            _ => &mut self.err_data,
        };
        *counter = counter.saturating_add(1);

        self.tx_isr_us = clamp_us(isr_us);
        self.max_tx_isr_us = self.max_tx_isr_us.max(self.tx_isr_us);
    }

    pub(crate) fn record_rx(&mut self, status: RadioStatus, isr_us: u32) {
        let counter = match status {
            RadioStatus::Success => &mut self.rx_data,
            RadioStatus::RxTimeout => &mut self.rx_data_timeout,
            RadioStatus::CrcFailed => &mut self.rx_data_crc,
            RadioStatus::Failed | RadioStatus::Canceled => &mut self.err_data,
        };
        *counter = counter.saturating_add(1);

        self.rx_isr_us = clamp_us(isr_us);
        self.max_rx_isr_us = self.max_rx_isr_us.max(self.rx_isr_us);
    }
}

fn clamp_us(us: u32) -> u16 {
    u16::try_from(us).unwrap_or(u16::MAX)
}
