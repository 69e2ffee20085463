//! Bluetooth LE baseband: operation table, dispatcher contract and the CIS
//! slave scheduler.
//!
//! This crate is `no_std`; the radio is reached only through
//! [`platform::RadioPal`].
//!
//! ```text
//! Dispatcher ──execute/cancel──> OpTable ──> CisSlave ──> RadioPal
//!     ▲                                         │
//!     └───── request_terminate (once) ◄─────────┘
//! ```
//!
//! # Features
//!
//! - `std`: host builds (enables `platform/std` mocks)
//! - `defmt`: `defmt` logging and `defmt::Format` derives
//! - `tracing`: `tracing` logging for host simulation
//! - `test-mode`: apply [`config::CisSlaveConfig::tx_power_offset_dbm`]

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // contract violations go through one allowed site
#![deny(unused_must_use)]
// ────────────────────────────────────────────────────────────────────────────
#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)] // accessors — callers decide

#[macro_use]
mod fmt;

pub mod cis;
pub mod config;
pub mod op;
pub mod shared;

pub use cis::{CisEventContext, CisLink, CisProtocol, CisSlave, CisStats, NextSubevent};
pub use op::{Dispatcher, OpHandlers, OpTable, OpTableError, OpType, OperationDescriptor};
