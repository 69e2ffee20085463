//! Scheduler configuration and constants.
//!
//! Build-time switches are Cargo features (`test-mode`, `defmt`, `tracing`);
//! run-time knobs live in [`CisSlaveConfig`], fixed when the scheduler is
//! constructed.

/// Number of operation types the dispatcher table can hold.
pub const OP_TYPE_COUNT: usize = 4;

/// Construction-time configuration of a [`CisSlave`](crate::cis::CisSlave).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CisSlaveConfig {
    /// Added to every channel's transmit power before it reaches the PAL.
    /// Used by RF test builds to sweep output power.
    #[cfg(feature = "test-mode")]
    pub tx_power_offset_dbm: i8,
}
