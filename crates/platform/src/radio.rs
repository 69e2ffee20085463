//! BLE radio platform abstraction (PAL).
//!
//! The baseband schedulers in the `bluetooth` crate never touch radio
//! registers. Everything they need from the hardware goes through
//! [`RadioPal`]: channel and timing programming, transmit/receive arming,
//! cancellation of in-flight activity and radio clock access.
//!
//! ## Contract
//!
//! Every method is synchronous, non-blocking and callable from the radio
//! interrupt. Completion of an armed transaction is reported back to the
//! dispatcher, which routes it according to [`DataParams::route`].
//!
//! ```text
//! set_channel_params ─┐
//! set_data_params  ───┼──> rx_data / tx_data ──> [radio] ──> completion ISR
//! adjust_time      ───┘                                        │
//!                                   cancel_ifs / cancel_data <─┘
//! ```

/// Receive timeout applied when a context has not configured one.
pub const DEFAULT_RX_TIMEOUT_US: u32 = 1_000;

// ── Channel parameters ───────────────────────────────────────────────────────

/// Physical layer selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phy {
    /// LE 1M.
    #[default]
    Le1M,
    /// LE 2M.
    Le2M,
    /// LE Coded.
    LeCoded,
}

/// Channel configuration applied before a radio transaction.
///
/// Owned by the operation descriptor while the operation is scheduled; the
/// protocol layer rewrites `chan_idx` between subevents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelParams {
    /// Data channel index (0-39).
    pub chan_idx: u8,
    /// Transmit PHY.
    pub tx_phy: Phy,
    /// Receive PHY.
    pub rx_phy: Phy,
    /// Access address of the stream.
    pub access_addr: u32,
    /// CRC initialisation value (24 bits used).
    pub crc_init: u32,
    /// Transmit power in dBm.
    pub tx_power_dbm: i8,
}

impl Default for ChannelParams {
    fn default() -> Self {
        Self {
            chan_idx: 0,
            tx_phy: Phy::Le1M,
            rx_phy: Phy::Le1M,
            access_addr: 0,
            crc_init: 0,
            tx_power_dbm: 0,
        }
    }
}

// ── Data parameters ──────────────────────────────────────────────────────────

/// Which baseband handler set the PAL completions are routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CompletionRoute {
    /// Nothing bound yet; completions are dropped by the dispatcher.
    #[default]
    Unbound,
    /// CIS slave Tx/Rx completion handlers.
    CisSlave,
}

/// Shared parameter block for the next radio transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DataParams {
    /// Radio clock time at which the transaction starts (already adjusted).
    pub due_us: u32,
    /// Receive window, measured from `due_us`.
    pub rx_timeout_us: u32,
    /// Completion handler binding.
    pub route: CompletionRoute,
}

// ── Completion reporting ─────────────────────────────────────────────────────

/// Closed set of statuses the PAL reports for a finished transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RadioStatus {
    /// Transaction completed.
    Success,
    /// Generic failure (e.g. transmit could not be scheduled in time).
    Failed,
    /// No packet arrived inside the receive window.
    RxTimeout,
    /// Packet received with a CRC error.
    CrcFailed,
    /// Transaction aborted by software.
    Canceled,
}

impl RadioStatus {
    /// Short label for log output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            RadioStatus::Success => "success",
            RadioStatus::Failed => "failed",
            RadioStatus::RxTimeout => "rx-timeout",
            RadioStatus::CrcFailed => "crc-failed",
            RadioStatus::Canceled => "canceled",
        }
    }
}

/// Metadata delivered with every receive completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RxMeta {
    /// Received signal strength in dBm.
    pub rssi: i8,
    /// Received CRC value.
    pub crc: u32,
    /// Radio clock timestamp of the packet start. Only meaningful on success.
    pub timestamp_us: u32,
    /// Coded-PHY option bits of the received packet.
    pub phy_options: u8,
}

// ── PAL trait ────────────────────────────────────────────────────────────────

/// Radio driver interface consumed by the baseband schedulers.
///
/// Implementations must be ISR-safe: no blocking, no allocation.
pub trait RadioPal {
    /// Program channel index, PHYs, access address, CRC init and power.
    fn set_channel_params(&mut self, chan: &ChannelParams);

    /// Program due time, receive timeout and completion routing.
    fn set_data_params(&mut self, params: &DataParams);

    /// Queue a transmit built from `descs` (scatter list of PDU fragments).
    fn tx_data(&mut self, descs: &[&[u8]]);

    /// Arm a receive into `buf`.
    ///
    /// The caller keeps `buf` alive and untouched until the matching receive
    /// completion or [`RadioPal::cancel_data`].
    fn rx_data(&mut self, buf: &mut [u8]);

    /// Cancel a pending inter-frame-spacing (T_IFS) follow-up transaction.
    fn cancel_ifs(&mut self);

    /// Abort any in-flight radio activity.
    fn cancel_data(&mut self);

    /// Convert a protocol due time into the armed due time, handling radio
    /// clock wraparound and setup latency.
    fn adjust_time(&self, due_us: u32) -> u32;

    /// Current radio clock time in microseconds (wraps).
    fn now_us(&self) -> u32;
}
