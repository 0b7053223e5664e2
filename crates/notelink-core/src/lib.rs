//! # notelink-core - Core Domain Types
//!
//! Foundation crate for notelink. Provides domain types, payload
//! classification, error handling and logging setup.
//!
//! This crate has **zero internal dependencies** -- it only depends on external
//! crates (serde, thiserror, regex, url, tracing).
//!
//! ## Public API
//!
//! ### Domain Types (`types`)
//! - [`RawPayload`], [`PayloadOrigin`] - Text from a QR code or an input line
//! - [`PayloadKind`] - Classification of a payload (app URI, web URL, unrecognized)
//! - [`ContentId`] - Validated 24-hex note identifier
//! - [`DeepLink`], [`LinkShape`], [`LinkFlavor`] - App deep links and how they are built
//! - [`TapTarget`] - Fixed screen coordinate tapped after opening a note
//! - [`AttemptOutcome`], [`BatchReport`], [`ScanReport`] - Results of attempts and runs
//!
//! ### Payload Handling (`payload`)
//! - [`classify()`] - Classify a raw payload
//! - [`extract_content_id()`] - Pull the note id from a `/explore/<id>` web link
//! - [`build_deep_link()`] - Build the `xhsdiscover://` link for an id
//!
//! ### Error Handling (`error`)
//! - [`Error`] - Error enum with `is_fatal` classification
//! - [`Result`] - Type alias for `std::result::Result<T, Error>`
//! - [`ResultExt`] - Extension trait for adding error context
//!
//! ## Prelude
//!
//! Import commonly used types with:
//! ```rust
//! use notelink_core::prelude::*;
//! ```

pub mod error;
pub mod logging;
pub mod payload;
pub mod types;

/// Prelude for common imports used throughout all notelink crates
pub mod prelude {
    pub use super::error::{Error, Result, ResultExt};
    pub use tracing::{debug, error, info, instrument, trace, warn};
}

// Re-export commonly used types at crate root for convenience
pub use error::{Error, Result, ResultExt};
pub use payload::{build_deep_link, classify, extract_content_id, WEB_HOSTS};
pub use types::{
    AttemptOutcome, BatchReport, ContentId, DeepLink, LinkFlavor, LinkShape, PayloadKind,
    PayloadOrigin, RawPayload, ScanReport, ScanResult, TapTarget, APP_PACKAGE, APP_SCHEME,
    CONTENT_ID_LEN,
};
