//! Domain types shared by the bridge, the attempt pipeline and the runners

use std::fmt;

use serde::{Deserialize, Serialize};

/// Custom URI scheme registered by the Xiaohongshu app
pub const APP_SCHEME: &str = "xhsdiscover";

/// Android package name of the Xiaohongshu app
pub const APP_PACKAGE: &str = "com.xingin.xhs";

/// Length of a note identifier in hex characters
pub const CONTENT_ID_LEN: usize = 24;

// ─────────────────────────────────────────────────────────────────
// Payloads
// ─────────────────────────────────────────────────────────────────

/// Where a payload came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadOrigin {
    /// Decoded from a QR code in a captured screen region
    DecodedFromImage,
    /// Typed by the operator or read from a batch file
    SuppliedAsLine,
}

/// Text obtained from an input source, before any interpretation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPayload {
    text: String,
    origin: PayloadOrigin,
}

impl RawPayload {
    pub fn new(text: impl Into<String>, origin: PayloadOrigin) -> Self {
        let text = text.into();
        Self {
            text: text.trim().to_string(),
            origin,
        }
    }

    pub fn decoded(text: impl Into<String>) -> Self {
        Self::new(text, PayloadOrigin::DecodedFromImage)
    }

    pub fn line(text: impl Into<String>) -> Self {
        Self::new(text, PayloadOrigin::SuppliedAsLine)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn origin(&self) -> PayloadOrigin {
        self.origin
    }
}

impl fmt::Display for RawPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Classification of a raw payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    /// Already an `xhsdiscover://` link; dispatched unmodified
    AppUri,
    /// A web link on a Xiaohongshu host; needs identifier extraction
    WebUrl,
    Unrecognized,
}

/// A note identifier: exactly 24 lowercase hex characters
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentId(String);

impl ContentId {
    /// Validate a token. Anything that is not exactly 24 lowercase hex
    /// characters is rejected.
    pub fn parse(token: &str) -> Option<Self> {
        let valid = token.len() == CONTENT_ID_LEN
            && token
                .bytes()
                .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
        valid.then(|| Self(token.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ─────────────────────────────────────────────────────────────────
// Deep links
// ─────────────────────────────────────────────────────────────────

/// Path and `source` tag of a built deep link
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LinkShape {
    #[serde(default = "default_link_path")]
    pub path: String,

    #[serde(default = "default_link_source")]
    pub source: String,
}

impl Default for LinkShape {
    fn default() -> Self {
        Self {
            path: default_link_path(),
            source: default_link_source(),
        }
    }
}

fn default_link_path() -> String {
    "item".to_string()
}

fn default_link_source() -> String {
    "pcweb_access_limit".to_string()
}

/// The flow a deep link is built for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkFlavor {
    /// Payload decoded from an on-screen QR code
    QrScan,
    /// Web URL supplied interactively or from a file
    UrlBatch,
}

impl LinkFlavor {
    /// Both flows open the access-limit landing page
    pub fn default_shape(&self) -> LinkShape {
        LinkShape::default()
    }

    pub fn default_tap_target(&self) -> TapTarget {
        match self {
            LinkFlavor::QrScan => TapTarget::QR_FAVORITE,
            LinkFlavor::UrlBatch => TapTarget::URL_FAVORITE,
        }
    }
}

impl fmt::Display for LinkFlavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkFlavor::QrScan => write!(f, "qr-scan"),
            LinkFlavor::UrlBatch => write!(f, "url-batch"),
        }
    }
}

/// A URI in the app's private scheme, ready to dispatch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeepLink(String);

impl DeepLink {
    /// Build `<scheme>://<path>/<id>?source=<tag>`
    pub fn build(id: &ContentId, shape: &LinkShape) -> Self {
        Self(format!(
            "{}://{}/{}?source={}",
            APP_SCHEME, shape.path, id, shape.source
        ))
    }

    /// Use an `AppUri` payload as-is
    pub fn passthrough(payload: &RawPayload) -> Self {
        Self(payload.text().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeepLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fixed screen coordinate tapped after a successful dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct TapTarget {
    pub x: u32,
    pub y: u32,
}

impl TapTarget {
    /// Favorite button as laid out after opening a note from a QR code
    pub const QR_FAVORITE: TapTarget = TapTarget { x: 800, y: 2210 };

    /// Favorite button as laid out after opening a note from a web link
    pub const URL_FAVORITE: TapTarget = TapTarget { x: 865, y: 2690 };

    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for TapTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

// ─────────────────────────────────────────────────────────────────
// Outcomes and reports
// ─────────────────────────────────────────────────────────────────

/// Classified result of one attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// No QR code was found in the captured region
    NoPayload,
    /// Capturing or decoding the region failed
    AcquireFailed { reason: String },
    /// The payload is not a usable Xiaohongshu link
    PayloadInvalid { payload: String, reason: String },
    /// The link was built but the app could not be opened with it
    DispatchFailed { link: DeepLink, reason: String },
    /// The app opened the link; the follow-up tap failed
    TapFailed { link: DeepLink, reason: String },
    Succeeded { link: DeepLink },
}

impl AttemptOutcome {
    /// The content was opened on the device. A failed tap does not change that.
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            AttemptOutcome::Succeeded { .. } | AttemptOutcome::TapFailed { .. }
        )
    }

    /// Outcomes that let the scan loop try again
    pub fn is_soft_failure(&self) -> bool {
        matches!(
            self,
            AttemptOutcome::NoPayload
                | AttemptOutcome::AcquireFailed { .. }
                | AttemptOutcome::PayloadInvalid { .. }
        )
    }

    /// The dispatched (or attempted) link, if the attempt got that far
    pub fn link(&self) -> Option<&DeepLink> {
        match self {
            AttemptOutcome::DispatchFailed { link, .. }
            | AttemptOutcome::TapFailed { link, .. }
            | AttemptOutcome::Succeeded { link } => Some(link),
            _ => None,
        }
    }
}

/// Counters for one batch run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub total: usize,
    pub processed: usize,
    pub succeeded: usize,
    /// The operator stopped the batch before the last item
    pub aborted: bool,
}

impl BatchReport {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            processed: 0,
            succeeded: 0,
            aborted: false,
        }
    }

    pub fn record(&mut self, outcome: &AttemptOutcome) {
        self.processed += 1;
        if outcome.is_success() {
            self.succeeded += 1;
        }
    }

    pub fn failed(&self) -> usize {
        self.processed - self.succeeded
    }
}

/// How a scan run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanResult {
    Opened { link: DeepLink, tapped: bool },
    /// A link was found but the app could not be opened; scanning stops
    DispatchFailed { link: DeepLink, reason: String },
    /// Every attempt ended in a soft failure
    Exhausted,
}

/// Summary of one scan run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanReport {
    pub attempts_used: u32,
    pub max_attempts: u32,
    pub result: ScanResult,
}

impl ScanReport {
    pub fn is_success(&self) -> bool {
        matches!(self.result, ScanResult::Opened { .. })
    }
}
