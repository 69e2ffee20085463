//! Shared test doubles: a recording dispatcher, an identifiable receive
//! buffer and a scripted protocol layer.
#![allow(dead_code)]
#![allow(clippy::arithmetic_side_effects)]

use std::collections::VecDeque;

use bluetooth::{CisEventContext, CisLink, CisProtocol, CisSlave, Dispatcher, NextSubevent};
use bluetooth::{OpType, OperationDescriptor};
use platform::mocks::MockRadio;
use platform::{ChannelParams, RadioStatus, RxMeta};

pub const DUE_US: u32 = 1000;
pub const RX_SYNC_DELAY_US: u32 = 300;

/// Dispatcher that records terminate requests.
#[derive(Default)]
pub struct MockDispatcher {
    pub terminate_flag: bool,
    pub terminate_requests: u32,
    pub terminated_due: Vec<u32>,
}

impl Dispatcher for MockDispatcher {
    fn terminate_requested(&self) -> bool {
        self.terminate_flag
    }

    fn set_terminate_flag(&mut self) {
        self.terminate_flag = true;
    }

    fn request_terminate(&mut self, op: &OperationDescriptor) {
        self.terminate_requests += 1;
        self.terminated_due.push(op.due_us);
    }
}

/// Receive buffer tagged with an id so hand-offs can be traced.
#[derive(Debug, PartialEq, Eq)]
pub struct TestBuf {
    pub id: u32,
    pub data: [u8; 16],
}

impl TestBuf {
    pub fn new(id: u32) -> Self {
        Self { id, data: [0; 16] }
    }
}

impl AsMut<[u8]> for TestBuf {
    fn as_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }
}

/// Callback observed by [`ScriptedProtocol`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Exec,
    Cancel,
    CheckContinue,
    ContinueExec { due_us: u32, chan_idx: u8 },
    TxData(RadioStatus),
    RxData { buf_id: u32, status: RadioStatus },
    PostSubevent(RadioStatus),
}

/// Protocol layer driven by a queue of `check_continue` answers.
///
/// By default it arms a fresh receive on `exec` and `continue_exec`, and
/// answers every non-cancelled reception with a two-fragment transmit.
/// `rearm_on_rx` makes it replace the consumed buffer straight away instead.
pub struct ScriptedProtocol {
    pub events: Vec<Event>,
    pub script: VecDeque<NextSubevent>,
    pub armed: Vec<u32>,
    pub next_buf_id: u32,
    pub arm_rx_on_exec: bool,
    pub arm_rx_on_continue: bool,
    pub respond_on_rx: bool,
    pub terminate_on_rx: bool,
    pub rearm_on_rx: bool,
    pub hop_to: Option<u8>,
}

impl Default for ScriptedProtocol {
    fn default() -> Self {
        Self {
            events: Vec::new(),
            script: VecDeque::new(),
            armed: Vec::new(),
            next_buf_id: 0,
            arm_rx_on_exec: true,
            arm_rx_on_continue: true,
            respond_on_rx: true,
            terminate_on_rx: false,
            rearm_on_rx: false,
            hop_to: None,
        }
    }
}

impl ScriptedProtocol {
    pub fn with_script(script: impl IntoIterator<Item = NextSubevent>) -> Self {
        Self {
            script: script.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn count(&self, pred: impl Fn(&Event) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }

    pub fn rx_deliveries(&self) -> Vec<(u32, RadioStatus)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::RxData { buf_id, status } => Some((*buf_id, *status)),
                _ => None,
            })
            .collect()
    }

    fn arm_rx(&mut self, link: &mut dyn CisLink<TestBuf>) {
        let id = self.next_buf_id;
        self.next_buf_id += 1;
        self.armed.push(id);
        link.rx_data(TestBuf::new(id));
    }
}

impl CisProtocol for ScriptedProtocol {
    type Buffer = TestBuf;

    fn exec(&mut self, _op: &OperationDescriptor, link: &mut dyn CisLink<TestBuf>) {
        self.events.push(Event::Exec);
        if self.arm_rx_on_exec {
            self.arm_rx(link);
        }
    }

    fn cancel(&mut self, _op: &OperationDescriptor) {
        self.events.push(Event::Cancel);
    }

    fn check_continue(&mut self, op: &mut OperationDescriptor) -> NextSubevent {
        self.events.push(Event::CheckContinue);
        if let Some(idx) = self.hop_to {
            op.chan.chan_idx = idx;
        }
        self.script.pop_front().unwrap_or(NextSubevent::DONE)
    }

    fn continue_exec(&mut self, op: &mut OperationDescriptor, link: &mut dyn CisLink<TestBuf>) {
        self.events.push(Event::ContinueExec {
            due_us: op.due_us,
            chan_idx: op.chan.chan_idx,
        });
        if self.arm_rx_on_continue {
            self.arm_rx(link);
        }
    }

    fn tx_data(&mut self, _op: &OperationDescriptor, status: RadioStatus) {
        self.events.push(Event::TxData(status));
    }

    fn rx_data(
        &mut self,
        _op: &OperationDescriptor,
        link: &mut dyn CisLink<TestBuf>,
        buf: TestBuf,
        status: RadioStatus,
    ) {
        self.events.push(Event::RxData {
            buf_id: buf.id,
            status,
        });
        if status == RadioStatus::Canceled {
            return;
        }
        if self.respond_on_rx {
            link.tx_data(&[&[0x02, 0x04], &[0xAA, 0xBB, 0xCC, 0xDD]]);
        }
        if self.rearm_on_rx {
            self.arm_rx(link);
        }
        if self.terminate_on_rx {
            link.request_termination();
        }
    }

    fn post_subevent(&mut self, _op: &OperationDescriptor, status: RadioStatus) {
        self.events.push(Event::PostSubevent(status));
    }
}

pub type Slave = CisSlave<MockRadio, MockDispatcher, TestBuf>;
pub type Ctx = CisEventContext<ScriptedProtocol>;

pub fn op() -> OperationDescriptor {
    OperationDescriptor::new(
        OpType::Cis,
        DUE_US,
        ChannelParams {
            chan_idx: 5,
            ..ChannelParams::default()
        },
    )
}

pub fn harness(protocol: ScriptedProtocol) -> (Slave, OperationDescriptor, Ctx) {
    harness_with_radio(MockRadio::new(), protocol)
}

pub fn harness_with_radio(radio: MockRadio, protocol: ScriptedProtocol) -> (Slave, OperationDescriptor, Ctx) {
    let slave = CisSlave::new(radio, MockDispatcher::default());
    let ctx = CisEventContext::new(protocol).with_rx_sync_delay(RX_SYNC_DELAY_US);
    (slave, op(), ctx)
}

pub fn rx_meta(timestamp_us: u32) -> RxMeta {
    RxMeta {
        rssi: -60,
        crc: 0x55_5555,
        timestamp_us,
        phy_options: 0,
    }
}
