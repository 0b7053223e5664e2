//! Locating the adb executable
//!
//! adb is looked up once at startup. If it cannot be found the plain `adb`
//! name is used anyway, so the first bridge call reports
//! [`Error::BridgeNotFound`](notelink_core::Error::BridgeNotFound).

use std::path::{Path, PathBuf};

/// Default executable name
pub const ADB: &str = "adb";

/// Where the adb executable was found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdbSource {
    /// Set explicitly in the configuration
    Configured,
    /// Found on `PATH`
    Path,
    /// Found under `$ANDROID_HOME` or `$ANDROID_SDK_ROOT`
    AndroidSdk,
    /// Not found; falling back to the bare name
    Fallback,
}

/// Resolved adb executable
#[derive(Debug, Clone)]
pub struct ToolAvailability {
    pub adb_path: String,
    pub source: AdbSource,
}

impl ToolAvailability {
    /// Resolve the adb executable (run once at startup)
    pub fn check(configured: Option<&str>) -> Self {
        if let Some(path) = configured.filter(|p| !p.trim().is_empty()) {
            return Self {
                adb_path: path.to_string(),
                source: AdbSource::Configured,
            };
        }

        if let Ok(path) = which::which(ADB) {
            return Self {
                adb_path: path.to_string_lossy().to_string(),
                source: AdbSource::Path,
            };
        }

        if let Some(path) = Self::get_sdk_adb_paths()
            .into_iter()
            .find(|p| p.is_file())
        {
            return Self {
                adb_path: path.to_string_lossy().to_string(),
                source: AdbSource::AndroidSdk,
            };
        }

        tracing::debug!("adb not found on PATH or in the Android SDK");
        Self {
            adb_path: ADB.to_string(),
            source: AdbSource::Fallback,
        }
    }

    /// Candidate adb paths inside the Android SDK
    fn get_sdk_adb_paths() -> Vec<PathBuf> {
        ["ANDROID_HOME", "ANDROID_SDK_ROOT"]
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .map(|root| Path::new(&root).join("platform-tools").join(adb_file_name()))
            .collect()
    }

    pub fn is_available(&self) -> bool {
        self.source != AdbSource::Fallback
    }

    /// Get user-friendly message for a missing adb
    pub fn unavailable_message(&self) -> Option<&'static str> {
        if self.is_available() {
            None
        } else {
            Some("adb not found. Install Android platform-tools or set ANDROID_HOME.")
        }
    }
}

fn adb_file_name() -> &'static str {
    if cfg!(windows) {
        "adb.exe"
    } else {
        ADB
    }
}
