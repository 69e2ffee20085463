//! Radio Hardware Abstraction Layer for the BLE baseband
//!
//! This crate provides the trait-based boundary between the baseband
//! schedulers and the radio driver, enabling development and testing without
//! physical hardware.
//!
//! # Architecture Layers
//!
//! ```text
//! Link Layer (connection / CIS state, outside this workspace)
//!         ↓
//! Baseband schedulers (bluetooth crate)
//!         ↓
//! Radio PAL (this crate - trait abstraction)
//!         ↓
//! Radio peripheral driver (vendor HAL + PAC)
//! ```
//!
//! # Features
//!
//! - `std`: Enable standard library support and [`mocks`] (for testing)
//! - `defmt`: Enable `defmt::Format` derives on all radio types
//!
//! # Example
//!
//! ```no_run
//! use platform::{ChannelParams, RadioPal};
//!
//! fn retune<R: RadioPal>(radio: &mut R, chan_idx: u8) {
//!     let chan = ChannelParams { chan_idx, ..ChannelParams::default() };
//!     radio.set_channel_params(&chan);
//! }
//! ```

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(clippy::unreachable)] // no unreachable!() that isn't documented
#![deny(unused_must_use)]
// all Results must be handled
// ────────────────────────────────────────────────────────────────────────────
#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(unsafe_op_in_unsafe_fn)] // unsafe fn body is not implicitly unsafe block
#![warn(clippy::print_stdout)] // prefer tracing/defmt over println! in lib code
// Pedantic lints suppressed for this hardware HAL crate:
#![allow(clippy::doc_markdown)] // register and PHY names in doc comments
#![allow(clippy::must_use_candidate)] // hardware accessors — callers decide
#![allow(clippy::module_name_repetitions)]

pub mod mocks;
pub mod radio;

pub use radio::{
    ChannelParams, CompletionRoute, DataParams, Phy, RadioPal, RadioStatus, RxMeta,
    DEFAULT_RX_TIMEOUT_US,
};
