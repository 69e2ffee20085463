//! Per-stream CIS event context and the protocol callback set.
//!
//! The Link Layer owns one [`CisEventContext`] per active stream and lends it
//! to the scheduler for every call. The seven callbacks are the
//! [`CisProtocol`] trait; the callbacks that run while the radio is being
//! armed also get a [`CisLink`] to queue transmits, arm receives or ask for
//! termination.

use platform::{RadioStatus, DEFAULT_RX_TIMEOUT_US};

use crate::op::OperationDescriptor;

/// Result of the protocol's `check_continue` decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NextSubevent {
    /// Time from the last receive anchor to the next subevent. `0` ends the
    /// operation.
    pub offset_us: u32,
    /// The next subevent belongs to a different CIS context.
    pub switching_context: bool,
}

impl NextSubevent {
    /// The protocol has nothing more to run in this event.
    pub const DONE: Self = Self {
        offset_us: 0,
        switching_context: false,
    };

    /// Continue on the same stream after `offset_us`.
    #[must_use]
    pub const fn after(offset_us: u32) -> Self {
        Self {
            offset_us,
            switching_context: false,
        }
    }

    /// Continue on another stream after `offset_us`.
    #[must_use]
    pub const fn switch_after(offset_us: u32) -> Self {
        Self {
            offset_us,
            switching_context: true,
        }
    }

    /// `true` when the protocol ended the operation.
    #[must_use]
    pub const fn is_done(&self) -> bool {
        self.offset_us == 0
    }
}

/// Data-path services offered to protocol callbacks while they run inside the
/// scheduler.
pub trait CisLink<B> {
    /// Queue a transmit built from `descs`.
    fn tx_data(&mut self, descs: &[&[u8]]);

    /// Arm a receive into `buf`. The scheduler holds `buf` until the receive
    /// completes or the operation is cancelled, then hands it back through
    /// [`CisProtocol::rx_data`].
    ///
    /// Only one receive may be outstanding; arming a second is a fatal
    /// contract violation.
    fn rx_data(&mut self, buf: B);

    /// Stop the operation at the next decision point.
    fn request_termination(&mut self);
}

/// Upper-layer callbacks driven by the CIS slave scheduler.
///
/// All methods run at radio interrupt priority: they must not block or
/// allocate.
pub trait CisProtocol {
    /// Receive buffer handed through the scheduler.
    type Buffer: AsMut<[u8]>;

    /// The stream started; typically arms the first receive.
    fn exec(&mut self, op: &OperationDescriptor, link: &mut dyn CisLink<Self::Buffer>);

    /// The dispatcher aborted the operation; release protocol resources.
    fn cancel(&mut self, op: &OperationDescriptor);

    /// Decide whether another subevent runs. May rewrite `op.chan` for the
    /// next channel.
    fn check_continue(&mut self, op: &mut OperationDescriptor) -> NextSubevent;

    /// The next subevent is armed; rewrite header fields and arm its receive.
    fn continue_exec(&mut self, op: &mut OperationDescriptor, link: &mut dyn CisLink<Self::Buffer>);

    /// A transmit finished with `status`.
    fn tx_data(&mut self, op: &OperationDescriptor, status: RadioStatus);

    /// A receive finished (or was cancelled) with `status`; `buf` is returned
    /// to the protocol layer.
    fn rx_data(
        &mut self,
        op: &OperationDescriptor,
        link: &mut dyn CisLink<Self::Buffer>,
        buf: Self::Buffer,
        status: RadioStatus,
    );

    /// End-of-subevent notification.
    fn post_subevent(&mut self, op: &OperationDescriptor, status: RadioStatus);
}

/// Mutable per-stream state plus its callback set.
pub struct CisEventContext<C> {
    pub(crate) is_first_ts: bool,
    pub(crate) rx_ts_us: u32,
    pub(crate) start_ts_us: u32,
    pub(crate) rx_sync_delay_us: u32,
    pub(crate) rssi: i8,
    pub(crate) rx_phy_options: u8,
    pub(crate) protocol: C,
}

impl<C: CisProtocol> CisEventContext<C> {
    /// Wrap `protocol` with a fresh context using the default receive window.
    pub fn new(protocol: C) -> Self {
        Self {
            is_first_ts: true,
            rx_ts_us: 0,
            start_ts_us: 0,
            rx_sync_delay_us: DEFAULT_RX_TIMEOUT_US,
            rssi: 0,
            rx_phy_options: 0,
            protocol,
        }
    }

    /// Set the receive window used for every armed subevent.
    #[must_use]
    pub fn with_rx_sync_delay(mut self, rx_sync_delay_us: u32) -> Self {
        self.rx_sync_delay_us = rx_sync_delay_us;
        self
    }

    /// No reception has completed yet in the current operation.
    pub fn is_first_ts(&self) -> bool {
        self.is_first_ts
    }

    /// Anchor of the last good reception; the base for the next subevent.
    pub fn rx_ts_us(&self) -> u32 {
        self.rx_ts_us
    }

    /// Anchor of the first reception of the operation.
    pub fn start_ts_us(&self) -> u32 {
        self.start_ts_us
    }

    /// Receive window in microseconds.
    pub fn rx_sync_delay_us(&self) -> u32 {
        self.rx_sync_delay_us
    }

    /// Change the receive window. Takes effect at the next arm.
    pub fn set_rx_sync_delay_us(&mut self, rx_sync_delay_us: u32) {
        self.rx_sync_delay_us = rx_sync_delay_us;
    }

    /// RSSI of the last reception.
    pub fn rssi(&self) -> i8 {
        self.rssi
    }

    /// Coded-PHY options of the last reception.
    pub fn rx_phy_options(&self) -> u8 {
        self.rx_phy_options
    }

    /// The protocol callbacks.
    pub fn protocol(&self) -> &C {
        &self.protocol
    }

    /// Mutable access to the protocol state (between operations).
    pub fn protocol_mut(&mut self) -> &mut C {
        &mut self.protocol
    }

    /// Give the protocol back.
    pub fn into_protocol(self) -> C {
        self.protocol
    }
}
