//! CIS slave baseband scheduler.
//!
//! Drives one already-scheduled CIS operation in the peripheral role: arms
//! the radio when the dispatcher starts the operation, reacts to every Tx/Rx
//! completion interrupt, decides after each transmit whether another subevent
//! runs, and raises exactly one terminate request per operation.
//!
//! ## Event state
//!
//! ```text
//!            execute()
//!               │
//!               ▼
//!            [Idle] ──(terminal condition in Tx or Rx completion)──> [Terminating]
//!               ▲                                                        │
//!               └──────────────────── next execute() ◄───────────────────┘
//! ```
//!
//! The `Idle` guard is what keeps a terminate observed by both completion
//! handlers (or by a handler racing a dispatcher cancel) from being reported
//! twice. Cancellation does not touch the state: the dispatcher guarantees no
//! completion handler is running when it cancels.
//!
//! ## Concurrency
//!
//! All state lives in [`CisSlave`] and is reached through `&mut self`. The
//! target's radio interrupt is assumed non-reentrant, so a plain enum is
//! enough for the guard; wrap the scheduler in
//! [`IsrShared`](crate::shared::IsrShared) to reach it from interrupt
//! trampolines.

use platform::{ChannelParams, CompletionRoute, DataParams, RadioPal, RadioStatus, RxMeta};

use super::context::{CisEventContext, CisLink, CisProtocol};
use super::stats::CisStats;
use crate::config::CisSlaveConfig;
use crate::op::{Dispatcher, OpHandlers, OpTable, OpTableError, OpType, OperationDescriptor};

/// Terminate guard for the active operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EventState {
    /// Armed or between subevents.
    Idle,
    /// Terminate already requested from the dispatcher.
    Terminating,
}

/// Outcome of the continuation decision taken after every transmit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Continuation {
    /// No further subevent; the operation ends.
    Complete,
    /// The radio is re-armed for the next subevent.
    Continue {
        /// The next subevent belongs to another CIS context.
        switched_context: bool,
    },
}

/// Baseband scheduler for one CIS slave operation at a time.
///
/// `P` is the radio PAL, `D` the dispatcher handle and `B` the receive buffer
/// type shared with the protocol layer.
pub struct CisSlave<P, D, B> {
    pal: P,
    bb: D,
    #[cfg_attr(not(feature = "test-mode"), allow(dead_code))]
    config: CisSlaveConfig,
    event_state: EventState,
    pending_rx: Option<B>,
    data_params: DataParams,
    stats: CisStats,
}

impl<P, D, B> CisSlave<P, D, B>
where
    P: RadioPal,
    D: Dispatcher,
    B: AsMut<[u8]>,
{
    /// Scheduler with default configuration.
    pub fn new(pal: P, bb: D) -> Self {
        Self::with_config(pal, bb, CisSlaveConfig::default())
    }

    /// Scheduler with explicit configuration.
    pub fn with_config(pal: P, bb: D, config: CisSlaveConfig) -> Self {
        Self {
            pal,
            bb,
            config,
            event_state: EventState::Idle,
            pending_rx: None,
            data_params: DataParams::default(),
            stats: CisStats::new(),
        }
    }

    /// Register the CIS {execute, cancel} pair in the dispatcher's operation
    /// table and zero the statistics.
    ///
    /// # Errors
    ///
    /// Returns [`OpTableError::AlreadyRegistered`] when the CIS slot is taken.
    pub fn init(&mut self, table: &mut OpTable, handlers: OpHandlers) -> Result<(), OpTableError> {
        self.reset_stats();
        table.register(OpType::Cis, handlers)
    }

    // ── Executor ──────────────────────────────────────────────────────────────

    /// Start `op`: program channel and timing, arm the completion handlers
    /// and let the protocol arm the first receive.
    ///
    /// A receive buffer still held from an earlier operation is returned as
    /// [`RadioStatus::Canceled`] first.
    pub fn execute<C>(&mut self, op: &mut OperationDescriptor, ctx: &mut CisEventContext<C>)
    where
        C: CisProtocol<Buffer = B>,
    {
        if self.pending_rx.is_some() {
            debug!("cis slave: execute found a leftover receive buffer due={}", op.due_us);
            self.release_pending_rx(op, ctx);
        }

        ctx.is_first_ts = true;
        ctx.rx_ts_us = op.due_us;

        self.apply_channel(&op.chan);

        self.data_params = DataParams {
            due_us: self.pal.adjust_time(op.due_us),
            rx_timeout_us: ctx.rx_sync_delay_us,
            route: CompletionRoute::CisSlave,
        };
        self.pal.set_data_params(&self.data_params);

        self.event_state = EventState::Idle;
        debug!(
            "cis slave: execute due={} chan={}",
            self.data_params.due_us,
            op.chan.chan_idx
        );

        let mut link = self.link();
        ctx.protocol.exec(op, &mut link);
    }

    // ── Cancellation ──────────────────────────────────────────────────────────

    /// Abort `op`: stop the radio, return any pending receive buffer as
    /// [`RadioStatus::Canceled`] and let the protocol release its resources.
    ///
    /// Does not use the terminate guard and does not touch statistics.
    pub fn cancel<C>(&mut self, op: &mut OperationDescriptor, ctx: &mut CisEventContext<C>)
    where
        C: CisProtocol<Buffer = B>,
    {
        debug!("cis slave: cancel due={}", op.due_us);
        self.pal.cancel_data();
        self.release_pending_rx(op, ctx);
        ctx.protocol.cancel(op);
    }

    // ── Completion handlers ───────────────────────────────────────────────────

    /// Tx completion interrupt.
    pub fn on_tx_complete<C>(
        &mut self,
        op: &mut OperationDescriptor,
        ctx: &mut CisEventContext<C>,
        status: RadioStatus,
    ) where
        C: CisProtocol<Buffer = B>,
    {
        let entered_us = self.pal.now_us();

        ctx.protocol.tx_data(op, status);

        let decision = self.decide_continuation(op, ctx);
        let bod_complete = decision == Continuation::Complete;
        let switched_context = matches!(
            decision,
            Continuation::Continue {
                switched_context: true
            }
        );

        match status {
            RadioStatus::Success => {
                if self.bb.terminate_requested() || bod_complete {
                    self.pal.cancel_ifs();
                    self.terminate_once(op, ctx);
                }
            }
            RadioStatus::Failed => {
                if bod_complete {
                    self.release_pending_rx(op, ctx);
                    self.pal.cancel_ifs();
                    self.terminate_once(op, ctx);
                }
            }
            other => {
                warn!("cis slave: tx completed with {}", other.as_str());
                self.terminate_once(op, ctx);
            }
        }

        if !switched_context {
            ctx.protocol.post_subevent(op, status);
        }

        let isr_us = self.pal.now_us().wrapping_sub(entered_us);
        self.stats.record_tx(status, isr_us);
    }

    /// Rx completion interrupt.
    ///
    /// A receive buffer must be pending; the PAL cannot complete a receive
    /// that was never armed.
    pub fn on_rx_complete<C>(
        &mut self,
        op: &mut OperationDescriptor,
        ctx: &mut CisEventContext<C>,
        status: RadioStatus,
        meta: RxMeta,
    ) where
        C: CisProtocol<Buffer = B>,
    {
        let entered_us = self.pal.now_us();

        ctx.rssi = meta.rssi;
        ctx.rx_phy_options = meta.phy_options;

        if ctx.is_first_ts {
            // No radio timestamp on failure; anchor on the scheduled time.
            ctx.start_ts_us = if status == RadioStatus::Success {
                meta.timestamp_us
            } else {
                op.due_us
            };
            ctx.is_first_ts = false;
            ctx.rx_ts_us = ctx.start_ts_us;
        } else if status == RadioStatus::Success {
            ctx.rx_ts_us = meta.timestamp_us;
        }

        if status == RadioStatus::CrcFailed {
            trace!("cis slave: crc failure crc={}", meta.crc);
        }

        let buf = self
            .pending_rx
            .take()
            .unwrap_or_else(|| contract_violation("rx completion without a pending receive buffer"));
        let mut link = self.link();
        ctx.protocol.rx_data(op, &mut link, buf, status);

        // On timeout the following transmit fails and drives termination.
        if status != RadioStatus::RxTimeout && self.bb.terminate_requested() {
            if status == RadioStatus::Success {
                self.pal.cancel_ifs();
            }
            self.terminate_once(op, ctx);
        }

        let isr_us = self.pal.now_us().wrapping_sub(entered_us);
        self.stats.record_rx(status, isr_us);
    }

    // ── Accessors ─────────────────────────────────────────────────────────────

    /// Terminate guard of the current operation.
    pub fn event_state(&self) -> EventState {
        self.event_state
    }

    /// `true` while a receive buffer is held for the radio.
    pub fn has_pending_rx(&self) -> bool {
        self.pending_rx.is_some()
    }

    /// Last parameter block handed to the PAL.
    pub fn data_params(&self) -> &DataParams {
        &self.data_params
    }

    /// Packet statistics.
    pub fn stats(&self) -> &CisStats {
        &self.stats
    }

    /// Zero the packet statistics.
    pub fn reset_stats(&mut self) {
        self.stats = CisStats::new();
    }

    /// The radio PAL.
    pub fn pal(&self) -> &P {
        &self.pal
    }

    /// Mutable access to the radio PAL.
    pub fn pal_mut(&mut self) -> &mut P {
        &mut self.pal
    }

    /// The dispatcher handle.
    pub fn dispatcher(&self) -> &D {
        &self.bb
    }

    /// Mutable access to the dispatcher handle.
    pub fn dispatcher_mut(&mut self) -> &mut D {
        &mut self.bb
    }

    // ── Internals ─────────────────────────────────────────────────────────────

    /// Decide whether another subevent runs and, if so, re-arm the radio for
    /// it. Decision and re-arm happen together since the radio is a single
    /// resource.
    fn decide_continuation<C>(
        &mut self,
        op: &mut OperationDescriptor,
        ctx: &mut CisEventContext<C>,
    ) -> Continuation
    where
        C: CisProtocol<Buffer = B>,
    {
        if self.bb.terminate_requested() {
            return Continuation::Complete;
        }

        let next = ctx.protocol.check_continue(op);
        if next.is_done() {
            return Continuation::Complete;
        }

        ctx.rx_ts_us = self
            .pal
            .adjust_time(ctx.rx_ts_us.wrapping_add(next.offset_us));
        op.due_us = ctx.rx_ts_us;

        self.apply_channel(&op.chan);
        self.data_params.due_us = op.due_us;
        self.data_params.rx_timeout_us = ctx.rx_sync_delay_us;
        self.pal.set_data_params(&self.data_params);

        trace!(
            "cis slave: continue due={} chan={}",
            op.due_us,
            op.chan.chan_idx
        );

        let mut link = self.link();
        ctx.protocol.continue_exec(op, &mut link);

        Continuation::Continue {
            switched_context: next.switching_context,
        }
    }

    /// Idle → Terminating, at most once per operation.
    ///
    /// A receive the protocol armed after the radio stopped is handed back as
    /// [`RadioStatus::Canceled`] on every call, so the slot is empty once the
    /// operation ends.
    fn terminate_once<C>(&mut self, op: &OperationDescriptor, ctx: &mut CisEventContext<C>)
    where
        C: CisProtocol<Buffer = B>,
    {
        self.release_pending_rx(op, ctx);
        if self.event_state == EventState::Idle {
            self.event_state = EventState::Terminating;
            debug!("cis slave: terminate due={}", op.due_us);
            self.bb.request_terminate(op);
        }
    }

    /// Hand a still-pending receive buffer back as cancelled.
    fn release_pending_rx<C>(&mut self, op: &OperationDescriptor, ctx: &mut CisEventContext<C>)
    where
        C: CisProtocol<Buffer = B>,
    {
        if let Some(buf) = self.pending_rx.take() {
            let mut link = self.link();
            ctx.protocol.rx_data(op, &mut link, buf, RadioStatus::Canceled);
        }
    }

    fn apply_channel(&mut self, chan: &ChannelParams) {
        #[cfg(feature = "test-mode")]
        {
            let mut chan = *chan;
            chan.tx_power_dbm = chan
                .tx_power_dbm
                .saturating_add(self.config.tx_power_offset_dbm);
            self.pal.set_channel_params(&chan);
        }
        #[cfg(not(feature = "test-mode"))]
        self.pal.set_channel_params(chan);
    }

    fn link(&mut self) -> SlaveLink<'_, P, D, B> {
        SlaveLink {
            pal: &mut self.pal,
            bb: &mut self.bb,
            pending_rx: &mut self.pending_rx,
        }
    }
}

/// [`CisLink`] view over the scheduler's radio, dispatcher and pending slot.
struct SlaveLink<'a, P, D, B> {
    pal: &'a mut P,
    bb: &'a mut D,
    pending_rx: &'a mut Option<B>,
}

impl<P, D, B> CisLink<B> for SlaveLink<'_, P, D, B>
where
    P: RadioPal,
    D: Dispatcher,
    B: AsMut<[u8]>,
{
    fn tx_data(&mut self, descs: &[&[u8]]) {
        self.pal.tx_data(descs);
    }

    fn rx_data(&mut self, buf: B) {
        if self.pending_rx.is_some() {
            contract_violation("receive armed while another buffer is pending");
        }
        let slot = self.pending_rx.insert(buf);
        self.pal.rx_data(slot.as_mut());
    }

    fn request_termination(&mut self) {
        self.bb.set_terminate_flag();
    }
}

/// Dispatcher/protocol broke the buffer ownership contract. Continuing would
/// lose or double-deliver a receive buffer.
#[cold]
#[track_caller]
#[allow(clippy::panic)] // assertion-style abort: the caller violated a precondition
fn contract_violation(what: &'static str) -> ! {
    error!("cis slave contract violation: {}", what);
    panic!("cis slave contract violation: {what}");
}
