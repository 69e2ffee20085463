//! Connected Isochronous Stream (CIS) baseband support.
//!
//! - [`context`]: per-stream state and the protocol callback set
//! - [`slave`]: the peripheral-role scheduler
//! - [`stats`]: packet counters

pub mod context;
pub mod slave;
pub mod stats;

pub use context::{CisEventContext, CisLink, CisProtocol, NextSubevent};
pub use slave::{CisSlave, Continuation, EventState};
pub use stats::CisStats;
