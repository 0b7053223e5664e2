//! Shared initialization for both binaries

use std::path::{Path, PathBuf};

use notelink_bridge::{DeviceBridge, ToolAvailability};
use notelink_core::prelude::*;

use crate::config::{load_settings, Settings};

/// What the binaries share after startup
#[derive(Debug)]
pub struct Startup {
    pub settings: Settings,
    pub tools: ToolAvailability,
    pub bridge: DeviceBridge,
}

impl Startup {
    /// Load settings, locate adb and build the device bridge.
    ///
    /// `base` is the directory searched for `.notelink/config.toml`.
    pub fn init(explicit_config: Option<&Path>, base: &Path) -> Result<Self> {
        let settings = load_settings(explicit_config, base)?;

        let tools = ToolAvailability::check(settings.bridge.adb_path.as_deref());
        match tools.unavailable_message() {
            Some(message) => warn!("{}", message),
            None => info!("Using adb at {} ({:?})", tools.adb_path, tools.source),
        }

        let bridge = DeviceBridge::system(settings.bridge_settings(&tools));
        Ok(Self {
            settings,
            tools,
            bridge,
        })
    }
}

/// Directory used for config discovery
pub fn current_dir() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}
