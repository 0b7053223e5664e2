//! # notelink-bridge - adb Device Bridge
//!
//! Wraps the `adb` command-line tool: device discovery, deep-link dispatch
//! and tap injection. Every call is a separate, timed-out process invocation
//! whose failures are converted into classified [`notelink_core::Error`]s.
//!
//! Depends on [`notelink_core`] for domain types and error handling.
//!
//! ## Public API
//!
//! ### Command Execution
//! - [`CommandRunner`] - Seam for running external commands
//! - [`TokioCommandRunner`] - Real runner backed by `tokio::process`
//! - [`CommandSpec`], [`CommandOutput`] - One invocation and its captured result
//!
//! ### Device Bridge
//! - [`DeviceBridge`] - `list_connected_devices`, `start_activity`, `tap`
//! - [`BridgeSettings`] - adb path and per-verb timeouts
//!
//! ### Device Discovery
//! - [`Device`] - One `adb devices` entry
//! - [`parse_devices_output()`] - Parse `adb devices` output
//!
//! ### Platform Utilities
//! - [`ToolAvailability`] - Locate the adb executable

pub mod bridge;
pub mod devices;
pub mod runner;
#[cfg(any(test, feature = "test-helpers"))]
pub mod test_utils;
pub mod tool_availability;

// Public API re-exports
pub use bridge::{
    BridgeSettings, DeviceBridge, DISPATCH_TIMEOUT, LIST_TIMEOUT, TAP_SETTLE_DELAY, TAP_TIMEOUT,
    VIEW_ACTION,
};
pub use devices::{parse_devices_output, ready_devices, Device, READY_STATE};
pub use runner::{CommandOutput, CommandRunner, CommandSpec, TokioCommandRunner};
pub use tool_availability::{AdbSource, ToolAvailability, ADB};
