//! Application error types with rich context

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Application error types organized by layer/domain
#[derive(Debug, Error)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────
    // Common/Infrastructure Errors
    // ─────────────────────────────────────────────────────────────
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    // ─────────────────────────────────────────────────────────────
    // Device Bridge Errors
    // ─────────────────────────────────────────────────────────────
    #[error("No connected device found. Connect a device with USB debugging enabled and authorized.")]
    NoDeviceConnected,

    #[error("Device bridge '{program}' not found. Ensure adb is installed and in your PATH.")]
    BridgeNotFound { program: String },

    #[error("Command '{command}' timed out after {timeout:?}")]
    CommandTimeout { command: String, timeout: Duration },

    #[error("Failed to open deep link: {reason}")]
    DispatchFailed { reason: String },

    #[error("Failed to tap screen: {reason}")]
    TapFailed { reason: String },

    // ─────────────────────────────────────────────────────────────
    // Payload Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Not a recognized Xiaohongshu link: {payload}")]
    PayloadUnrecognized { payload: String },

    #[error("No /explore/<id> segment found in: {url}")]
    IdentifierNotFound { url: String },

    // ─────────────────────────────────────────────────────────────
    // Capture Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Screen capture error: {message}")]
    Capture { message: String },

    #[error("Screen capture is not available in this build (enable the 'desktop-capture' feature)")]
    CaptureUnavailable,

    // ─────────────────────────────────────────────────────────────
    // Batch/Input Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Batch file not found: {path}")]
    BatchFileNotFound { path: PathBuf },

    #[error("No links to process")]
    EmptyBatch,

    #[error("Cancelled by user")]
    Cancelled,

    // ─────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

// ─────────────────────────────────────────────────────────────────
// Convenience Constructors
// ─────────────────────────────────────────────────────────────────

impl Error {
    pub fn bridge_not_found(program: impl Into<String>) -> Self {
        Self::BridgeNotFound {
            program: program.into(),
        }
    }

    pub fn command_timeout(command: impl Into<String>, timeout: Duration) -> Self {
        Self::CommandTimeout {
            command: command.into(),
            timeout,
        }
    }

    pub fn dispatch_failed(reason: impl Into<String>) -> Self {
        Self::DispatchFailed {
            reason: reason.into(),
        }
    }

    pub fn tap_failed(reason: impl Into<String>) -> Self {
        Self::TapFailed {
            reason: reason.into(),
        }
    }

    pub fn unrecognized(payload: impl Into<String>) -> Self {
        Self::PayloadUnrecognized {
            payload: payload.into(),
        }
    }

    pub fn identifier_not_found(url: impl Into<String>) -> Self {
        Self::IdentifierNotFound { url: url.into() }
    }

    pub fn capture(message: impl Into<String>) -> Self {
        Self::Capture {
            message: message.into(),
        }
    }

    pub fn batch_file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::BatchFileNotFound { path: path.into() }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Check if this error should abort the whole run
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::NoDeviceConnected
                | Error::BridgeNotFound { .. }
                | Error::CaptureUnavailable
                | Error::BatchFileNotFound { .. }
        )
    }
}

// ─────────────────────────────────────────────────────────────────
// Error Context Extensions (for use with color-eyre)
// ─────────────────────────────────────────────────────────────────

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let err = e.into();
            tracing::error!("{}: {:?}", context.into(), err);
            err
        })
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| {
            let err = e.into();
            tracing::error!("{}: {:?}", f(), err);
            err
        })
    }
}
