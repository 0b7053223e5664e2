//! Parsing of `adb devices` output

/// State token adb reports for an online, authorized device
pub const READY_STATE: &str = "device";

/// One entry of `adb devices`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Device {
    /// Device serial (e.g. `emulator-5554`, `R58M123ABC`, `192.168.1.5:5555`)
    pub serial: String,

    /// Reported state (`device`, `offline`, `unauthorized`, ...)
    pub state: String,
}

impl Device {
    pub fn new(serial: impl Into<String>, state: impl Into<String>) -> Self {
        Self {
            serial: serial.into(),
            state: state.into(),
        }
    }

    /// Online and authorized for debugging
    pub fn is_ready(&self) -> bool {
        self.state == READY_STATE
    }
}

impl std::fmt::Display for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}\t{}", self.serial, self.state)
    }
}

/// Parse the output of `adb devices`
///
/// Format is one header line followed by `<serial>\t<state>` lines. Daemon
/// startup chatter (`* daemon not running; starting now ...`) can precede the
/// header and is skipped.
pub fn parse_devices_output(output: &str) -> Vec<Device> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| !line.starts_with('*') && !line.starts_with("List of devices"))
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            let serial = fields.next()?;
            let state = fields.next()?;
            Some(Device::new(serial, state))
        })
        .collect()
}

/// Only the devices in the ready state, in reported order
pub fn ready_devices(devices: Vec<Device>) -> Vec<Device> {
    devices.into_iter().filter(Device::is_ready).collect()
}
