//! Configuration types for notelink
//!
//! Defines:
//! - `Settings` - All settings from `.notelink/config.toml`
//! - `BridgeConfig`, `ScanConfig`, `BatchConfig` - Per-area sections
//! - `TapConfig` - Optional follow-up tap per flow

use std::time::Duration;

use notelink_core::{LinkFlavor, LinkShape, TapTarget, APP_PACKAGE};
use serde::{Deserialize, Serialize};

/// Application settings (.notelink/config.toml)
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub bridge: BridgeConfig,

    #[serde(default)]
    pub scan: ScanConfig,

    #[serde(default)]
    pub batch: BatchConfig,
}

/// Device bridge settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct BridgeConfig {
    /// Explicit adb executable; looked up on PATH / Android SDK when unset
    #[serde(default)]
    pub adb_path: Option<String>,

    /// Package the deep links are opened in
    #[serde(default = "default_package")]
    pub package: String,

    #[serde(default = "default_list_timeout")]
    pub list_timeout_secs: u64,

    #[serde(default = "default_dispatch_timeout")]
    pub dispatch_timeout_secs: u64,

    #[serde(default = "default_tap_timeout")]
    pub tap_timeout_secs: u64,

    /// Wait after opening a note before tapping
    #[serde(default = "default_tap_settle")]
    pub tap_settle_secs: u64,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            adb_path: None,
            package: default_package(),
            list_timeout_secs: default_list_timeout(),
            dispatch_timeout_secs: default_dispatch_timeout(),
            tap_timeout_secs: default_tap_timeout(),
            tap_settle_secs: default_tap_settle(),
        }
    }
}

fn default_package() -> String {
    APP_PACKAGE.to_string()
}

fn default_list_timeout() -> u64 {
    10
}

fn default_dispatch_timeout() -> u64 {
    30
}

fn default_tap_timeout() -> u64 {
    10
}

fn default_tap_settle() -> u64 {
    2
}

/// Follow-up tap after a successful dispatch
///
/// Unset coordinates fall back to the flow's default target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct TapConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default)]
    pub x: Option<u32>,

    #[serde(default)]
    pub y: Option<u32>,
}

impl Default for TapConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            x: None,
            y: None,
        }
    }
}

impl TapConfig {
    /// Resolved tap target for `flavor`, or `None` when tapping is disabled
    pub fn target(&self, flavor: LinkFlavor) -> Option<TapTarget> {
        if !self.enabled {
            return None;
        }
        let fallback = flavor.default_tap_target();
        Some(TapTarget::new(
            self.x.unwrap_or(fallback.x),
            self.y.unwrap_or(fallback.y),
        ))
    }
}

fn default_true() -> bool {
    true
}

/// Scan mode settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ScanConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_retry_delay")]
    pub retry_delay_secs: u64,

    /// Side of the square captured around the screen centre
    #[serde(default = "default_region_size")]
    pub region_size: u32,

    #[serde(default)]
    pub tap: TapConfig,

    #[serde(default = "default_qr_link")]
    pub link: LinkShape,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            retry_delay_secs: default_retry_delay(),
            region_size: default_region_size(),
            tap: TapConfig::default(),
            link: default_qr_link(),
        }
    }
}

impl ScanConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }
}

fn default_max_attempts() -> u32 {
    10
}

fn default_retry_delay() -> u64 {
    3
}

fn default_region_size() -> u32 {
    800
}

fn default_qr_link() -> LinkShape {
    LinkFlavor::QrScan.default_shape()
}

/// Batch mode settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct BatchConfig {
    /// Pause between items of a file batch
    #[serde(default = "default_item_delay")]
    pub item_delay_secs: u64,

    #[serde(default)]
    pub tap: TapConfig,

    #[serde(default = "default_url_link")]
    pub link: LinkShape,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            item_delay_secs: default_item_delay(),
            tap: TapConfig::default(),
            link: default_url_link(),
        }
    }
}

impl BatchConfig {
    pub fn item_delay(&self) -> Duration {
        Duration::from_secs(self.item_delay_secs)
    }
}

fn default_item_delay() -> u64 {
    1
}

fn default_url_link() -> LinkShape {
    LinkFlavor::UrlBatch.default_shape()
}
