//! Property-based tests for the CIS slave completion handlers.
//! Arbitrary interleavings of completions, terminate requests and dispatcher
//! cancels must never double-terminate or lose a receive buffer.

#![allow(clippy::arithmetic_side_effects)]
#![allow(clippy::unwrap_used)]

mod common;

use bluetooth::cis::EventState;
use bluetooth::{NextSubevent, OperationDescriptor};
use common::{harness, rx_meta, Ctx, ScriptedProtocol, Slave};
use platform::RadioStatus;
use proptest::prelude::*;

#[derive(Debug, Clone, Copy)]
enum Step {
    Rx(RadioStatus, u32),
    Tx(RadioStatus),
    Terminate,
    Cancel,
}

fn status() -> impl Strategy<Value = RadioStatus> {
    prop_oneof![
        4 => Just(RadioStatus::Success),
        1 => Just(RadioStatus::Failed),
        1 => Just(RadioStatus::RxTimeout),
        1 => Just(RadioStatus::CrcFailed),
        1 => Just(RadioStatus::Canceled),
    ]
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        4 => (status(), any::<u32>()).prop_map(|(s, ts)| Step::Rx(s, ts)),
        4 => status().prop_map(Step::Tx),
        1 => Just(Step::Terminate),
        1 => Just(Step::Cancel),
    ]
}

fn script() -> impl Strategy<Value = Vec<NextSubevent>> {
    prop::collection::vec(
        (0u32..2_000, any::<bool>()).prop_map(|(offset_us, switching_context)| NextSubevent {
            offset_us,
            switching_context,
        }),
        0..12,
    )
}

/// Feed one step to the scheduler. Completions follow the radio's order
/// within a subevent: a receive completes before its transmit, so each kind
/// is skipped when the radio could not have produced it.
fn apply(slave: &mut Slave, op: &mut OperationDescriptor, ctx: &mut Ctx, step: Step) {
    match step {
        Step::Rx(status, ts) if slave.has_pending_rx() => {
            slave.on_rx_complete(op, ctx, status, rx_meta(ts));
        }
        Step::Tx(status) if !slave.has_pending_rx() => slave.on_tx_complete(op, ctx, status),
        Step::Rx(..) | Step::Tx(_) => {}
        Step::Terminate => slave.dispatcher_mut().terminate_flag = true,
        Step::Cancel => slave.cancel(op, ctx),
    }
}

proptest::proptest! {
    /// The dispatcher hears at most one terminate per operation, and once it
    /// has, the scheduler stays in `Terminating`, cancels included.
    #[test]
    fn terminate_is_reported_at_most_once(
        script in script(),
        steps in prop::collection::vec(step(), 0..40),
    ) {
        let (mut slave, mut op, mut ctx) = harness(ScriptedProtocol::with_script(script));
        slave.execute(&mut op, &mut ctx);

        for step in steps {
            let before = slave.dispatcher().terminate_requests;
            apply(&mut slave, &mut op, &mut ctx, step);

            let requests = slave.dispatcher().terminate_requests;
            prop_assert!(requests <= 1, "terminate reported {} times", requests);
            if requests == 1 {
                prop_assert_eq!(slave.event_state(), EventState::Terminating);
            }
            if requests > before {
                prop_assert!(!slave.has_pending_rx(), "terminate left a receive buffer armed");
            }
        }
    }

    /// Every armed buffer is either still pending or has been delivered back
    /// exactly once.
    #[test]
    fn receive_buffers_are_never_lost_or_duplicated(
        script in script(),
        steps in prop::collection::vec(step(), 0..40),
        cancel_at_end in any::<bool>(),
    ) {
        let (mut slave, mut op, mut ctx) = harness(ScriptedProtocol::with_script(script));
        slave.execute(&mut op, &mut ctx);

        for step in steps {
            apply(&mut slave, &mut op, &mut ctx, step);
        }
        if cancel_at_end {
            slave.cancel(&mut op, &mut ctx);
            prop_assert!(!slave.has_pending_rx());
        }

        let proto = ctx.protocol();
        let mut delivered: Vec<u32> = proto.rx_deliveries().iter().map(|(id, _)| *id).collect();
        delivered.sort_unstable();
        let before = delivered.len();
        delivered.dedup();
        prop_assert_eq!(before, delivered.len(), "a buffer was delivered twice");

        let pending = usize::from(slave.has_pending_rx());
        prop_assert_eq!(proto.armed.len(), delivered.len() + pending);
    }

    /// After a successful reception the anchor is the radio's timestamp.
    #[test]
    fn successful_reception_sets_anchor(
        offsets in prop::collection::vec(1u32..2_000, 1..8),
        timestamps in prop::collection::vec(any::<u32>(), 1..8),
    ) {
        let script = offsets.iter().map(|o| NextSubevent::after(*o));
        let (mut slave, mut op, mut ctx) = harness(ScriptedProtocol::with_script(script));
        slave.execute(&mut op, &mut ctx);

        for ts in timestamps {
            if !slave.has_pending_rx() {
                break;
            }
            slave.on_rx_complete(&mut op, &mut ctx, RadioStatus::Success, rx_meta(ts));
            prop_assert_eq!(ctx.rx_ts_us(), ts);
            slave.on_tx_complete(&mut op, &mut ctx, RadioStatus::Success);
        }
    }
}
