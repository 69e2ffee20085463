//! Baseband operation descriptors, the dispatcher contract and the
//! per-type operation table.
//!
//! The dispatcher owns the radio timeline for every protocol. Each protocol
//! module registers an {execute, cancel} pair for its [`OpType`] in the
//! [`OpTable`]; when an operation's due time arrives the dispatcher routes it
//! to that pair, and later routes PAL completions according to the
//! [`platform::CompletionRoute`] the operation programmed.

use core::fmt;

use platform::ChannelParams;

use crate::config::OP_TYPE_COUNT;


// ─────────────────────────────────────────────────────────────────────────────
// Operation descriptor
// ─────────────────────────────────────────────────────────────────────────────

/// Operation-type tag used to select handlers in the [`OpTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OpType {
    /// Advertising.
    Adv,
    /// Scanning / initiating.
    Scan,
    /// ACL connection event.
    Conn,
    /// Connected isochronous stream event.
    Cis,
}

impl OpType {
    /// Every operation type, in table order.
    pub const ALL: [OpType; OP_TYPE_COUNT] = [OpType::Adv, OpType::Scan, OpType::Conn, OpType::Cis];

    /// Slot index in the operation table.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            OpType::Adv => 0,
            OpType::Scan => 1,
            OpType::Conn => 2,
            OpType::Cis => 3,
        }
    }

    /// Short label for log output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            OpType::Adv => "adv",
            OpType::Scan => "scan",
            OpType::Conn => "conn",
            OpType::Cis => "cis",
        }
    }
}

impl fmt::Display for OpType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One scheduled radio occurrence (BOD).
///
/// Created and queued by the dispatcher, handed by `&mut` to the protocol
/// handlers while it is the active operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OperationDescriptor {
    /// Absolute radio clock time at which the operation runs.
    pub due_us: u32,
    /// Handler selector.
    pub op_type: OpType,
    /// Channel configuration, exclusively owned while scheduled.
    pub chan: ChannelParams,
}

impl OperationDescriptor {
    /// Build a descriptor.
    #[must_use]
    pub const fn new(op_type: OpType, due_us: u32, chan: ChannelParams) -> Self {
        Self {
            due_us,
            op_type,
            chan,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Dispatcher contract
// ─────────────────────────────────────────────────────────────────────────────

/// Services the generic baseband dispatcher offers to protocol handlers.
///
/// Called from interrupt context; implementations must not block.
pub trait Dispatcher {
    /// Global abort signal for the active operation.
    fn terminate_requested(&self) -> bool;

    /// Ask the dispatcher to stop the active operation at the next decision
    /// point.
    fn set_terminate_flag(&mut self);

    /// The active operation is finished; remove it from the timeline.
    fn request_terminate(&mut self, op: &OperationDescriptor);
}

// ─────────────────────────────────────────────────────────────────────────────
// Operation table
// ─────────────────────────────────────────────────────────────────────────────

/// Handler entry point. Firmware binds these to trampolines that reach the
/// statically allocated protocol scheduler.
pub type OpFn = fn(&mut OperationDescriptor);

/// {execute, cancel} pair registered for one operation type.
#[derive(Clone, Copy)]
pub struct OpHandlers {
    /// Called when the operation's due time arrives.
    pub execute: OpFn,
    /// Called when the dispatcher aborts the operation.
    pub cancel: OpFn,
}

/// Errors reported by [`OpTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror_no_std::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OpTableError {
    /// A handler pair is already bound to this operation type.
    #[error("operation type `{0}` already has handlers registered")]
    AlreadyRegistered(OpType),
    /// No handler pair is bound to this operation type.
    #[error("no handlers registered for operation type `{0}`")]
    Unregistered(OpType),
}

/// Dispatcher operation table: one handler pair per [`OpType`].
pub struct OpTable {
    slots: [Option<OpHandlers>; OP_TYPE_COUNT],
}

impl OpTable {
    /// Empty table.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slots: [None; OP_TYPE_COUNT],
        }
    }

    /// Bind `handlers` to `op_type`.
    ///
    /// # Errors
    ///
    /// Returns [`OpTableError::AlreadyRegistered`] if the slot is taken.
    pub fn register(&mut self, op_type: OpType, handlers: OpHandlers) -> Result<(), OpTableError> {
        let slot = self.slot_mut(op_type);
        if slot.is_some() {
            return Err(OpTableError::AlreadyRegistered(op_type));
        }
        *slot = Some(handlers);
        debug!("op table: registered {}", op_type.as_str());
        Ok(())
    }

    /// Remove the handlers bound to `op_type`, returning them.
    pub fn unregister(&mut self, op_type: OpType) -> Option<OpHandlers> {
        self.slot_mut(op_type).take()
    }

    /// `true` when `op_type` has handlers.
    #[must_use]
    pub fn is_registered(&self, op_type: OpType) -> bool {
        self.handlers(op_type).is_some()
    }

    /// Run the execute handler for `op`.
    ///
    /// # Errors
    ///
    /// Returns [`OpTableError::Unregistered`] when `op.op_type` has no handlers.
    pub fn execute(&self, op: &mut OperationDescriptor) -> Result<(), OpTableError> {
        let handlers = self
            .handlers(op.op_type)
            .ok_or(OpTableError::Unregistered(op.op_type))?;
        (handlers.execute)(op);
        Ok(())
    }

    /// Run the cancel handler for `op`.
    ///
    /// # Errors
    ///
    /// Returns [`OpTableError::Unregistered`] when `op.op_type` has no handlers.
    pub fn cancel(&self, op: &mut OperationDescriptor) -> Result<(), OpTableError> {
        let handlers = self
            .handlers(op.op_type)
            .ok_or(OpTableError::Unregistered(op.op_type))?;
        (handlers.cancel)(op);
        Ok(())
    }

    fn handlers(&self, op_type: OpType) -> Option<OpHandlers> {
        self.slots.get(op_type.index()).copied().flatten()
    }

    #[allow(clippy::indexing_slicing)] // Safety: index() < OP_TYPE_COUNT for every variant
    fn slot_mut(&mut self, op_type: OpType) -> &mut Option<OpHandlers> {
        &mut self.slots[op_type.index()]
    }
}

impl Default for OpTable {
    fn default() -> Self {
        Self::new()
    }
}
