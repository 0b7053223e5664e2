//! Configuration file parsing for notelink
//!
//! Supports:
//! - `--config <path>` - Explicit settings file
//! - `.notelink/config.toml` - Per-directory settings
//! - `~/.config/notelink/config.toml` - User settings

pub mod settings;
pub mod types;

pub use settings::{discover_config_path, load_settings, load_settings_from};
pub use types::*;
