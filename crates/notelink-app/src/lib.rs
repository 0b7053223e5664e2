//! notelink-app - Attempt orchestration for notelink
//!
//! Turns payloads into opened notes: the per-attempt step machine, the scan
//! retry loop, the batch runner, screen capture and QR decoding, settings
//! and operator-facing status lines.

pub mod attempt;
pub mod batch;
pub mod capture;
pub mod config;
pub mod events;
pub mod report;
pub mod scan;
pub mod startup;

// Re-export primary types
pub use attempt::{check_connectivity, AttemptPipeline, AttemptPlan};
pub use batch::{read_batch_file, BatchRunner, FixedDelay, InteractiveInput, Pacer, Proceed};
pub use capture::{
    centered_region, CodeDecoder, DesktopCapture, GrayFrame, PayloadSource, QrDecoder, Region,
    ScreenCapture, ScreenScanner,
};
pub use config::{load_settings, Settings};
pub use events::{RecordingReporter, Reporter, RunEvent, StopReason};
pub use report::ConsoleReporter;
pub use scan::{QueuedPayloads, ScanOptions, ScanOrchestrator};
pub use startup::Startup;
