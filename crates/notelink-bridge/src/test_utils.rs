//! Test utilities for the device bridge
//!
//! [`FakeRunner`] stands in for adb: responses are scripted per command verb
//! and every issued command is recorded for later assertions.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};

use notelink_core::prelude::*;

use super::devices::Device;
use super::runner::{CommandOutput, CommandRunner, CommandSpec};

/// `adb devices` output with a single ready emulator
pub const ONE_DEVICE: &str = "List of devices attached\nemulator-5554\tdevice\n\n";

/// `adb devices` output with nothing attached
pub const NO_DEVICES: &str = "List of devices attached\n\n";

/// Which bridge verb a command is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Devices,
    StartActivity,
    Tap,
    Other,
}

impl Verb {
    pub fn of(spec: &CommandSpec) -> Self {
        if spec.args_start_with(&["devices"]) {
            Verb::Devices
        } else if spec.args_start_with(&["shell", "am", "start"]) {
            Verb::StartActivity
        } else if spec.args_start_with(&["shell", "input", "tap"]) {
            Verb::Tap
        } else {
            Verb::Other
        }
    }
}

/// Scripted result of one fake invocation
#[derive(Debug, Clone)]
pub enum FakeResponse {
    Output(CommandOutput),
    /// The executable does not exist
    NotFound,
    /// The command exceeded its ceiling
    Timeout,
}

impl FakeResponse {
    pub fn ok(stdout: &str) -> Self {
        FakeResponse::Output(CommandOutput::success(stdout))
    }

    pub fn exit(code: i32, stderr: &str) -> Self {
        FakeResponse::Output(CommandOutput::failure(code, stderr))
    }
}

/// Command runner that never spawns a process
#[derive(Debug)]
pub struct FakeRunner {
    queued: RefCell<HashMap<Verb, VecDeque<FakeResponse>>>,
    defaults: RefCell<HashMap<Verb, FakeResponse>>,
    calls: RefCell<Vec<CommandSpec>>,
}

impl Default for FakeRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeRunner {
    /// One ready device; every other verb succeeds with empty output
    pub fn new() -> Self {
        let mut defaults = HashMap::new();
        defaults.insert(Verb::Devices, FakeResponse::ok(ONE_DEVICE));
        defaults.insert(
            Verb::StartActivity,
            FakeResponse::ok("Starting: Intent { act=android.intent.action.VIEW }\n"),
        );
        defaults.insert(Verb::Tap, FakeResponse::ok(""));
        defaults.insert(Verb::Other, FakeResponse::ok(""));

        Self {
            queued: RefCell::new(HashMap::new()),
            defaults: RefCell::new(defaults),
            calls: RefCell::new(Vec::new()),
        }
    }

    /// Replace the `adb devices` output for every call
    pub fn with_devices(self, stdout: &str) -> Self {
        self.set_default(Verb::Devices, FakeResponse::ok(stdout));
        self
    }

    /// Respond to every call of `verb` with `response` unless something is queued
    pub fn set_default(&self, verb: Verb, response: FakeResponse) {
        self.defaults.borrow_mut().insert(verb, response);
    }

    /// Queue a one-off response for the next call of `verb`
    pub fn push(&self, verb: Verb, response: FakeResponse) {
        self.queued
            .borrow_mut()
            .entry(verb)
            .or_default()
            .push_back(response);
    }

    /// All commands issued so far, in order
    pub fn calls(&self) -> Vec<CommandSpec> {
        self.calls.borrow().clone()
    }

    /// Number of issued commands of `verb`
    pub fn count(&self, verb: Verb) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|spec| Verb::of(spec) == verb)
            .count()
    }

    /// The `-d <uri>` arguments of every dispatch, in order
    pub fn dispatched_uris(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .filter(|spec| Verb::of(spec) == Verb::StartActivity)
            .filter_map(|spec| {
                let pos = spec.args.iter().position(|a| a == "-d")?;
                spec.args.get(pos + 1).cloned()
            })
            .collect()
    }

    fn next_response(&self, verb: Verb) -> FakeResponse {
        let queued = self
            .queued
            .borrow_mut()
            .get_mut(&verb)
            .and_then(VecDeque::pop_front);

        queued.unwrap_or_else(|| {
            self.defaults
                .borrow()
                .get(&verb)
                .cloned()
                .unwrap_or_else(|| FakeResponse::ok(""))
        })
    }
}

impl CommandRunner for FakeRunner {
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput> {
        self.calls.borrow_mut().push(spec.clone());

        match self.next_response(Verb::of(spec)) {
            FakeResponse::Output(output) => Ok(output),
            FakeResponse::NotFound => Err(Error::bridge_not_found(&spec.program)),
            FakeResponse::Timeout => Err(Error::command_timeout(spec.to_string(), spec.timeout)),
        }
    }
}

/// Creates a ready test device.
pub fn test_device(serial: &str) -> Device {
    Device::new(serial, "device")
}
