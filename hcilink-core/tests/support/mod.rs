//! Simulated controller for host tests
//!
//! The transport side is a shared [`Device`] the test can preload, inspect
//! and script. Lock order is always critical section, then device mutex:
//! helpers here never hold the device lock while calling into the core.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicI32, AtomicU32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;

use hcilink_core::hal::{HciTransport, NotificationLine};
use hcilink_core::protocol::Opcode;
use hcilink_core::{DrainStop, Hci, HciConfig, HciReader};

pub type TestHci = Hci<CriticalSectionRawMutex, MockTransport, MockLine>;
pub type TestReader<'a> = HciReader<'a, CriticalSectionRawMutex, MockTransport, MockLine, 5>;

type Responder = Box<dyn FnMut(&[u8]) -> Vec<Vec<u8>> + Send>;

#[derive(Default)]
struct LineState {
    depth: AtomicI32,
    suppressed: AtomicU32,
}

#[derive(Default)]
struct DeviceState {
    inbox: VecDeque<Vec<u8>>,
    written: Vec<Vec<u8>>,
    responder: Option<Responder>,
    failed_reads: usize,
    fail_writes: bool,
}

/// Test-side handle to the simulated controller
#[derive(Clone, Default)]
pub struct Device {
    state: Arc<Mutex<DeviceState>>,
    line: Arc<LineState>,
}

impl Device {
    fn state(&self) -> MutexGuard<'_, DeviceState> {
        self.state.lock().unwrap()
    }

    /// Make `packet` available to the next read
    pub fn push(&self, packet: Vec<u8>) {
        self.state().inbox.push_back(packet);
    }

    pub fn has_data(&self) -> bool {
        !self.state().inbox.is_empty()
    }

    pub fn pending(&self) -> usize {
        self.state().inbox.len()
    }

    /// Every command written so far, header and parameters joined
    pub fn written(&self) -> Vec<Vec<u8>> {
        self.state().written.clone()
    }

    /// Answer each written command with the packets `f` returns
    pub fn respond_with(&self, f: impl FnMut(&[u8]) -> Vec<Vec<u8>> + Send + 'static) {
        self.state().responder = Some(Box::new(f));
    }

    /// Fail the next `count` reads
    pub fn fail_reads(&self, count: usize) {
        self.state().failed_reads = count;
    }

    pub fn fail_writes(&self) {
        self.state().fail_writes = true;
    }

    pub fn transport(&self) -> MockTransport {
        MockTransport {
            state: Arc::clone(&self.state),
        }
    }

    pub fn line(&self) -> MockLine {
        MockLine {
            state: Arc::clone(&self.line),
        }
    }

    /// Current mask nesting of the data-ready line; zero when idle
    pub fn mask_depth(&self) -> i32 {
        self.line.depth.load(Ordering::SeqCst)
    }

    pub fn times_masked(&self) -> u32 {
        self.line.suppressed.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceFault;

/// Core-side end of the simulated link
pub struct MockTransport {
    state: Arc<Mutex<DeviceState>>,
}

impl HciTransport for MockTransport {
    type Error = DeviceFault;

    fn data_available(&mut self) -> bool {
        !self.state.lock().unwrap().inbox.is_empty()
    }

    fn read_packet(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let mut state = self.state.lock().unwrap();
        if state.failed_reads > 0 {
            state.failed_reads -= 1;
            return Err(DeviceFault);
        }
        let packet = state.inbox.pop_front().ok_or(DeviceFault)?;
        let len = packet.len().min(buf.len());
        buf[..len].copy_from_slice(&packet[..len]);
        Ok(len)
    }

    fn write(&mut self, header: &[u8], payload: &[u8]) -> Result<(), Self::Error> {
        let mut state = self.state.lock().unwrap();
        if state.fail_writes {
            return Err(DeviceFault);
        }
        let command = [header, payload].concat();
        let replies = match state.responder.as_mut() {
            Some(responder) => responder(&command),
            None => Vec::new(),
        };
        state.inbox.extend(replies);
        state.written.push(command);
        Ok(())
    }
}

/// Data-ready line that counts mask nesting
pub struct MockLine {
    state: Arc<LineState>,
}

impl NotificationLine for MockLine {
    fn suppress(&self) {
        self.state.depth.fetch_add(1, Ordering::SeqCst);
        self.state.suppressed.fetch_add(1, Ordering::SeqCst);
    }

    fn restore(&self) {
        self.state.depth.fetch_sub(1, Ordering::SeqCst);
    }
}

pub fn setup() -> (TestHci, Device) {
    setup_with(HciConfig::default())
}

pub fn setup_with(config: HciConfig) -> (TestHci, Device) {
    let device = Device::default();
    let hci = Hci::new(device.transport(), device.line(), config);
    (hci, device)
}

/// Raise the data-ready interrupt and run the reader once
pub fn pump(hci: &TestHci, reader: &TestReader<'_>) -> Option<DrainStop> {
    hci.on_hardware_signal();
    reader.poll()
}

/// Push `packets` and let the reader queue them
pub fn preload(hci: &TestHci, reader: &TestReader<'_>, device: &Device, packets: Vec<Vec<u8>>) {
    for packet in packets {
        device.push(packet);
    }
    pump(hci, reader);
}

struct StopOnDrop<'a>(&'a AtomicBool);

impl Drop for StopOnDrop<'_> {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

/// Run `f` while another thread plays the data-ready interrupt and reader
pub fn with_live_reader<R>(hci: &TestHci, device: &Device, f: impl FnOnce() -> R) -> R {
    let reader = hci.initialize().expect("reader already taken");
    let stop = AtomicBool::new(false);

    thread::scope(|s| {
        s.spawn(|| {
            while !stop.load(Ordering::SeqCst) {
                if device.has_data() {
                    hci.on_hardware_signal();
                }
                reader.poll();
                thread::yield_now();
            }
        });

        let _stop = StopOnDrop(&stop);
        f()
    })
}

/// Event packet with the given code and parameters
pub fn event(code: u8, params: &[u8]) -> Vec<u8> {
    let mut packet = vec![0x04, code, params.len() as u8];
    packet.extend_from_slice(params);
    packet
}

pub fn command_complete(opcode: Opcode, return_params: &[u8]) -> Vec<u8> {
    let [lo, hi] = opcode.to_le_bytes();
    let mut params = vec![0x01, lo, hi];
    params.extend_from_slice(return_params);
    event(0x0E, &params)
}

pub fn command_status(status: u8, opcode: Opcode) -> Vec<u8> {
    let [lo, hi] = opcode.to_le_bytes();
    event(0x0F, &[status, 0x01, lo, hi])
}

pub fn le_meta(subevent: u8, data: &[u8]) -> Vec<u8> {
    let mut params = vec![subevent];
    params.extend_from_slice(data);
    event(0x3E, &params)
}

pub fn hardware_error(code: u8) -> Vec<u8> {
    event(0x10, &[code])
}

/// Disconnection Complete tagged with `tag` as the reason byte
pub fn unrelated(tag: u8) -> Vec<u8> {
    event(0x05, &[0x00, 0x40, 0x00, tag])
}

/// Every queued event as raw bytes, oldest first
pub fn drain_all(hci: &TestHci) -> Vec<Vec<u8>> {
    let mut seen = Vec::new();
    hci.drain_events(|event| seen.push(event.raw().to_vec()));
    seen
}
