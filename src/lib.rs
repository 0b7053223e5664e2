//! notelink Library
//!
//! Entry points behind the `notelink` (batch) and `notelink-scan` binaries.
//! Each returns whether the run reached its goal; fatal conditions come back
//! as errors for the binary to print.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notelink_app::{
    AttemptPipeline, BatchRunner, ConsoleReporter, DesktopCapture, FixedDelay, InteractiveInput,
    QrDecoder, ScanOptions, ScanOrchestrator, ScreenScanner, Settings, Startup,
};
use notelink_bridge::CommandRunner;
use notelink_core::prelude::*;
use notelink_core::{BatchReport, ScanReport};

/// Options shared by both binaries
#[derive(Debug, Clone, Default)]
pub struct CommonOptions {
    /// Explicit settings file
    pub config: Option<PathBuf>,
    /// Skip the follow-up tap
    pub no_tap: bool,
}

/// Command-line overrides for scan mode
#[derive(Debug, Clone, Default)]
pub struct ScanOverrides {
    pub max_attempts: Option<u32>,
    pub retry_delay_secs: Option<u64>,
    pub region_size: Option<u32>,
}

/// Troubleshooting lines printed under a fatal error
pub fn error_hints(err: &Error) -> &'static [&'static str] {
    match err {
        Error::NoDeviceConnected => &[
            "Check that:",
            "  1. The phone is connected to this computer over USB",
            "  2. USB debugging is enabled on the phone",
            "  3. This computer is authorized for USB debugging",
        ],
        Error::BridgeNotFound { .. } => &[
            "Install the Android platform-tools, or set bridge.adb_path in the config file",
        ],
        _ => &[],
    }
}

fn startup(common: &CommonOptions) -> Result<Startup> {
    let base = notelink_app::startup::current_dir();
    Startup::init(common.config.as_deref(), &base)
}

/// Batch mode: links from `file`, or typed by the operator when `None`
pub async fn run_batch(file: Option<&Path>, common: &CommonOptions) -> Result<BatchReport> {
    let startup = startup(common)?;
    let reporter = ConsoleReporter;
    let plan = startup.settings.batch_plan(!common.no_tap);
    let pipeline = AttemptPipeline::new(&startup.bridge, &reporter, plan);
    let runner = BatchRunner::new(pipeline, &reporter);

    let result = match file {
        Some(path) => run_file_batch(&runner, path, startup.settings.batch.item_delay()).await,
        None => {
            run_interactive_batch(&runner, || {
                println!("🔗 Paste Xiaohongshu links, one per line. Empty line to start.");
                InteractiveInput::stdin()
            })
            .await
        }
    };

    if let Err(ref e) = result {
        error!("Batch failed: {:?}", e);
    }
    result
}

/// The file is read before the device is checked
async fn run_file_batch<R: CommandRunner>(
    runner: &BatchRunner<'_, R>,
    path: &Path,
    item_delay: Duration,
) -> Result<BatchReport> {
    info!("Batch file: {}", path.display());
    let links = read_links(path).await?;
    println!("📁 Read {} link(s) from {}", links.len(), path.display());
    runner.run(&links, &mut FixedDelay(item_delay)).await
}

/// The device is checked before the operator is asked for links
async fn run_interactive_batch<R: CommandRunner>(
    runner: &BatchRunner<'_, R>,
    open_input: impl FnOnce() -> InteractiveInput,
) -> Result<BatchReport> {
    runner.check_connectivity().await?;

    let mut input = open_input();
    let links = input.collect_links().await?;
    runner.process_items(&links, &mut input).await
}

async fn read_links(path: &Path) -> Result<Vec<String>> {
    let links = notelink_app::read_batch_file(path)
        .await
        .with_context(|| format!("Reading batch file {}", path.display()))?;
    if links.is_empty() {
        return Err(Error::EmptyBatch);
    }
    Ok(links)
}

/// Scan mode: poll the screen centre for a QR code
pub async fn run_scan(overrides: &ScanOverrides, common: &CommonOptions) -> Result<ScanReport> {
    let mut startup = startup(common)?;
    apply_overrides(&mut startup.settings, overrides)?;

    if !DesktopCapture::is_supported() {
        return Err(Error::CaptureUnavailable);
    }

    let scan = &startup.settings.scan;
    let options = ScanOptions {
        max_attempts: scan.max_attempts,
        retry_delay: scan.retry_delay(),
    };
    let source = ScreenScanner::new(DesktopCapture, QrDecoder, scan.region_size);

    let reporter = ConsoleReporter;
    let plan = startup.settings.scan_plan(!common.no_tap);
    let pipeline = AttemptPipeline::new(&startup.bridge, &reporter, plan);

    let result = ScanOrchestrator::new(pipeline, source, options, &reporter)
        .run()
        .await;

    if let Err(ref e) = result {
        error!("Scan failed: {:?}", e);
    }
    result
}

fn apply_overrides(settings: &mut Settings, overrides: &ScanOverrides) -> Result<()> {
    let scan = &mut settings.scan;
    if let Some(max_attempts) = overrides.max_attempts {
        scan.max_attempts = max_attempts;
    }
    if let Some(secs) = overrides.retry_delay_secs {
        scan.retry_delay_secs = secs;
    }
    if let Some(size) = overrides.region_size {
        scan.region_size = size;
    }
    debug!(
        "Scan settings: {} attempts, {:?} apart, {}px region",
        scan.max_attempts,
        Duration::from_secs(scan.retry_delay_secs),
        scan.region_size
    );
    settings.validate()
}
