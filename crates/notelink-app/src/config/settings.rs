//! Settings loader for .notelink/config.toml

use std::path::{Path, PathBuf};
use std::time::Duration;

use notelink_bridge::{BridgeSettings, ToolAvailability};
use notelink_core::prelude::*;
use notelink_core::LinkFlavor;

use super::types::Settings;
use crate::attempt::AttemptPlan;

const CONFIG_FILENAME: &str = "config.toml";
const NOTELINK_DIR: &str = ".notelink";
const APP_DIR: &str = "notelink";

/// Config file candidates, most specific first
fn config_candidates(base: &Path) -> Vec<PathBuf> {
    let mut candidates = vec![base.join(NOTELINK_DIR).join(CONFIG_FILENAME)];
    if let Some(config_dir) = dirs::config_dir() {
        candidates.push(config_dir.join(APP_DIR).join(CONFIG_FILENAME));
    }
    candidates
}

/// First existing config file under `base` or the user config dir
pub fn discover_config_path(base: &Path) -> Option<PathBuf> {
    config_candidates(base).into_iter().find(|p| p.is_file())
}

/// Load settings.
///
/// An explicit path must exist and parse. A discovered file that cannot be
/// read or parsed is logged and replaced by defaults. Validation applies to
/// both.
pub fn load_settings(explicit: Option<&Path>, base: &Path) -> Result<Settings> {
    let settings = match explicit {
        Some(path) => load_settings_from(path)?,
        None => match discover_config_path(base) {
            Some(path) => load_settings_from(&path).unwrap_or_else(|e| {
                warn!("Ignoring {:?}: {}", path, e);
                Settings::default()
            }),
            None => {
                debug!("No config file found, using defaults");
                Settings::default()
            }
        },
    };

    settings.validate()?;
    Ok(settings)
}

/// Read and parse one config file
pub fn load_settings_from(path: &Path) -> Result<Settings> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::config(format!("Failed to read {}: {}", path.display(), e)))?;
    let settings: Settings =
        toml::from_str(&content).with_context(|| format!("Parsing {}", path.display()))?;
    debug!("Loaded settings from {:?}", path);
    Ok(settings)
}

impl Settings {
    pub fn validate(&self) -> Result<()> {
        if self.scan.max_attempts == 0 {
            return Err(Error::config("scan.max_attempts must be at least 1"));
        }
        if self.scan.region_size == 0 {
            return Err(Error::config("scan.region_size must be at least 1"));
        }
        if self.bridge.package.trim().is_empty() {
            return Err(Error::config("bridge.package must not be empty"));
        }
        if self.bridge.dispatch_timeout_secs == 0
            || self.bridge.tap_timeout_secs == 0
            || self.bridge.list_timeout_secs == 0
        {
            return Err(Error::config("bridge timeouts must be at least 1 second"));
        }
        for (name, shape) in [("scan.link", &self.scan.link), ("batch.link", &self.batch.link)] {
            if shape.path.is_empty() || shape.source.is_empty() {
                return Err(Error::config(format!(
                    "{} needs a non-empty path and source",
                    name
                )));
            }
        }
        Ok(())
    }

    /// Bridge settings with the resolved adb executable
    pub fn bridge_settings(&self, tools: &ToolAvailability) -> BridgeSettings {
        BridgeSettings {
            adb_path: tools.adb_path.clone(),
            list_timeout: Duration::from_secs(self.bridge.list_timeout_secs),
            dispatch_timeout: Duration::from_secs(self.bridge.dispatch_timeout_secs),
            tap_timeout: Duration::from_secs(self.bridge.tap_timeout_secs),
            tap_settle: Duration::from_secs(self.bridge.tap_settle_secs),
        }
    }

    /// Attempt plan for the QR scan flow
    pub fn scan_plan(&self, tap: bool) -> AttemptPlan {
        AttemptPlan {
            package: self.bridge.package.clone(),
            flavor: LinkFlavor::QrScan,
            shape: self.scan.link.clone(),
            tap: self.scan.tap.target(LinkFlavor::QrScan).filter(|_| tap),
        }
    }

    /// Attempt plan for the URL batch flow
    pub fn batch_plan(&self, tap: bool) -> AttemptPlan {
        AttemptPlan {
            package: self.bridge.package.clone(),
            flavor: LinkFlavor::UrlBatch,
            shape: self.batch.link.clone(),
            tap: self.batch.tap.target(LinkFlavor::UrlBatch).filter(|_| tap),
        }
    }
}
