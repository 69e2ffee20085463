//! Mock implementations for testing
//!
//! [`MockRadio`] records every PAL call in order so tests can assert on the
//! exact programming sequence a scheduler produced.

#![cfg(any(test, feature = "std"))]

use core::cell::Cell;

use crate::radio::{ChannelParams, DataParams, RadioPal};

/// Capacity of the call log. Older entries are kept; overflow is counted.
pub const CALL_LOG_CAPACITY: usize = 64;

/// One recorded PAL call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RadioCall {
    /// `set_channel_params`
    SetChannel(ChannelParams),
    /// `set_data_params`
    SetData(DataParams),
    /// `tx_data` with the number of fragments and total length.
    Tx {
        /// Fragment count.
        frags: usize,
        /// Total byte count.
        len: usize,
    },
    /// `rx_data` with the armed buffer length.
    Rx {
        /// Buffer length.
        len: usize,
    },
    /// `cancel_ifs`
    CancelIfs,
    /// `cancel_data`
    CancelData,
}

/// Mock radio
pub struct MockRadio {
    calls: heapless::Vec<RadioCall, CALL_LOG_CAPACITY>,
    dropped: usize,
    time_adjust_us: u32,
    clock_us: Cell<u32>,
    clock_step_us: u32,
}

impl MockRadio {
    /// Create a mock with identity time adjustment and a clock at zero.
    pub fn new() -> Self {
        Self {
            calls: heapless::Vec::new(),
            dropped: 0,
            time_adjust_us: 0,
            clock_us: Cell::new(0),
            clock_step_us: 0,
        }
    }

    /// Add `offset_us` (wrapping) in every `adjust_time` call.
    #[must_use]
    pub fn with_time_adjust(mut self, offset_us: u32) -> Self {
        self.time_adjust_us = offset_us;
        self
    }

    /// Advance the clock by `step_us` on every `now_us` read.
    #[must_use]
    pub fn with_clock_step(mut self, step_us: u32) -> Self {
        self.clock_step_us = step_us;
        self
    }

    /// Set the radio clock.
    pub fn set_clock(&self, now_us: u32) {
        self.clock_us.set(now_us);
    }

    /// All recorded calls, oldest first.
    pub fn calls(&self) -> &[RadioCall] {
        &self.calls
    }

    /// Forget recorded calls.
    pub fn clear(&mut self) {
        self.calls.clear();
        self.dropped = 0;
    }

    /// Number of calls that did not fit in the log.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// How many recorded calls satisfy `pred`.
    pub fn count(&self, pred: impl Fn(&RadioCall) -> bool) -> usize {
        self.calls.iter().filter(|c| pred(c)).count()
    }

    /// The most recent `set_data_params` block.
    pub fn last_data_params(&self) -> Option<DataParams> {
        self.calls.iter().rev().find_map(|c| match c {
            RadioCall::SetData(p) => Some(*p),
            _ => None,
        })
    }

    /// The most recent `set_channel_params` block.
    pub fn last_channel_params(&self) -> Option<ChannelParams> {
        self.calls.iter().rev().find_map(|c| match c {
            RadioCall::SetChannel(p) => Some(*p),
            _ => None,
        })
    }

    fn record(&mut self, call: RadioCall) {
        if self.calls.push(call).is_err() {
            self.dropped = self.dropped.saturating_add(1);
        }
    }
}

impl Default for MockRadio {
    fn default() -> Self {
        Self::new()
    }
}

impl RadioPal for MockRadio {
    fn set_channel_params(&mut self, chan: &ChannelParams) {
        self.record(RadioCall::SetChannel(*chan));
    }

    fn set_data_params(&mut self, params: &DataParams) {
        self.record(RadioCall::SetData(*params));
    }

    fn tx_data(&mut self, descs: &[&[u8]]) {
        let len = descs.iter().map(|d| d.len()).sum();
        self.record(RadioCall::Tx {
            frags: descs.len(),
            len,
        });
    }

    fn rx_data(&mut self, buf: &mut [u8]) {
        self.record(RadioCall::Rx { len: buf.len() });
    }

    fn cancel_ifs(&mut self) {
        self.record(RadioCall::CancelIfs);
    }

    fn cancel_data(&mut self) {
        self.record(RadioCall::CancelData);
    }

    fn adjust_time(&self, due_us: u32) -> u32 {
        due_us.wrapping_add(self.time_adjust_us)
    }

    fn now_us(&self) -> u32 {
        let now = self.clock_us.get();
        self.clock_us.set(now.wrapping_add(self.clock_step_us));
        now
    }
}
