//! The adb device bridge
//!
//! Issues three verbs against the connected device: list devices, start a
//! VIEW activity for a deep link, and inject a tap. Each call is a fresh,
//! independently timed-out adb invocation. Nothing here retries.

use std::sync::LazyLock;
use std::time::Duration;

use notelink_core::prelude::*;
use notelink_core::TapTarget;
use regex::Regex;

use crate::devices::{parse_devices_output, ready_devices, Device};
use crate::runner::{CommandOutput, CommandRunner, CommandSpec, TokioCommandRunner};
use crate::tool_availability::ADB;

/// Default timeout for `adb devices`
pub const LIST_TIMEOUT: Duration = Duration::from_secs(10);

/// Default timeout for `am start`
pub const DISPATCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Default timeout for `input tap`
pub const TAP_TIMEOUT: Duration = Duration::from_secs(10);

/// Default wait for the opened page to settle before tapping
pub const TAP_SETTLE_DELAY: Duration = Duration::from_secs(2);

/// Intent action used to open deep links
pub const VIEW_ACTION: &str = "android.intent.action.VIEW";

/// `am start` reports resolution failures on its output while still exiting 0
static AM_ERROR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^Error( type \d+)?:").expect("Invalid am error regex"));

/// Executable path and time ceilings for bridge calls
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeSettings {
    pub adb_path: String,
    pub list_timeout: Duration,
    pub dispatch_timeout: Duration,
    pub tap_timeout: Duration,
    pub tap_settle: Duration,
}

impl Default for BridgeSettings {
    fn default() -> Self {
        Self {
            adb_path: ADB.to_string(),
            list_timeout: LIST_TIMEOUT,
            dispatch_timeout: DISPATCH_TIMEOUT,
            tap_timeout: TAP_TIMEOUT,
            tap_settle: TAP_SETTLE_DELAY,
        }
    }
}

/// Handle to the device bridge, passed explicitly to the runners
#[derive(Debug)]
pub struct DeviceBridge<R = TokioCommandRunner> {
    runner: R,
    settings: BridgeSettings,
}

impl DeviceBridge<TokioCommandRunner> {
    /// Bridge that spawns real adb processes
    pub fn system(settings: BridgeSettings) -> Self {
        Self::new(TokioCommandRunner, settings)
    }
}

impl<R: CommandRunner> DeviceBridge<R> {
    pub fn new(runner: R, settings: BridgeSettings) -> Self {
        Self { runner, settings }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub fn settings(&self) -> &BridgeSettings {
        &self.settings
    }

    fn command<I, S>(&self, args: I, timeout: Duration) -> CommandSpec
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CommandSpec::new(self.settings.adb_path.clone(), args, timeout)
    }

    /// Devices currently in the ready state, in the order adb reports them.
    ///
    /// A failing or timed-out `adb devices` yields an empty list. Only a
    /// missing adb executable is an error.
    pub async fn list_connected_devices(&self) -> Result<Vec<Device>> {
        let spec = self.command(["devices"], self.settings.list_timeout);

        match self.runner.run(&spec).await {
            Ok(output) if output.is_success() => {
                let devices = ready_devices(parse_devices_output(&output.stdout));
                info!("adb reports {} ready device(s)", devices.len());
                Ok(devices)
            }
            Ok(output) => {
                warn!(
                    "adb devices failed with exit code {:?}: {}",
                    output.code,
                    output.diagnostic()
                );
                Ok(Vec::new())
            }
            Err(e @ Error::BridgeNotFound { .. }) => Err(e),
            Err(e) => {
                warn!("adb devices did not complete: {}", e);
                Ok(Vec::new())
            }
        }
    }

    /// Open `uri` in `package` with a VIEW intent.
    ///
    /// Argument order is fixed: `shell am start -a <VIEW> -d <uri> <package>`.
    pub async fn start_activity(&self, uri: &str, package: &str) -> Result<()> {
        let spec = self.command(
            ["shell", "am", "start", "-a", VIEW_ACTION, "-d", uri, package],
            self.settings.dispatch_timeout,
        );
        info!("Dispatching: {}", spec);

        let output = self.runner.run(&spec).await?;
        if !output.is_success() {
            return Err(Error::dispatch_failed(format!(
                "exit code {:?}: {}",
                output.code,
                output.diagnostic()
            )));
        }
        if am_reported_error(&output) {
            return Err(Error::dispatch_failed(output.diagnostic().to_string()));
        }

        debug!("am start output: {}", output.stdout.trim());
        Ok(())
    }

    /// Wait for the page to settle, then tap `target`.
    pub async fn tap(&self, target: TapTarget) -> Result<()> {
        debug!("Waiting {:?} before tapping {}", self.settings.tap_settle, target);
        tokio::time::sleep(self.settings.tap_settle).await;

        let spec = self.command(
            [
                "shell".to_string(),
                "input".to_string(),
                "tap".to_string(),
                target.x.to_string(),
                target.y.to_string(),
            ],
            self.settings.tap_timeout,
        );
        info!("Tapping: {}", spec);

        let output = self.runner.run(&spec).await?;
        if output.is_success() {
            Ok(())
        } else {
            Err(Error::tap_failed(format!(
                "exit code {:?}: {}",
                output.code,
                output.diagnostic()
            )))
        }
    }
}

fn am_reported_error(output: &CommandOutput) -> bool {
    AM_ERROR.is_match(&output.stdout) || AM_ERROR.is_match(&output.stderr)
}
