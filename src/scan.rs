//! notelink-scan - open the Xiaohongshu note shown as a QR code on screen
//!
//! Scan-mode binary entry point. All logic lives in the library.

use std::path::PathBuf;

use clap::Parser;
use notelink::{CommonOptions, ScanOverrides};

/// Scan the screen centre for a Xiaohongshu QR code and open it on the device
#[derive(Parser, Debug)]
#[command(name = "notelink-scan")]
#[command(about = "Open an on-screen Xiaohongshu QR code in the app via adb", long_about = None)]
struct Args {
    /// Maximum number of scan attempts [default: 10]
    #[arg(long, value_name = "N")]
    attempts: Option<u32>,

    /// Seconds between attempts [default: 3]
    #[arg(long, value_name = "SECS")]
    delay: Option<u64>,

    /// Side of the captured square in pixels [default: 800]
    #[arg(long, value_name = "PX")]
    size: Option<u32>,

    /// Settings file (default: .notelink/config.toml, then the user config dir)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Do not tap the favorite button after opening the note
    #[arg(long)]
    no_tap: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let args = Args::parse();

    notelink_core::logging::init("scan")?;

    let overrides = ScanOverrides {
        max_attempts: args.attempts,
        retry_delay_secs: args.delay,
        region_size: args.size,
    };
    let common = CommonOptions {
        config: args.config,
        no_tap: args.no_tap,
    };

    match notelink::run_scan(&overrides, &common).await {
        Ok(report) if report.is_success() => Ok(()),
        Ok(_) => std::process::exit(1),
        Err(e) => {
            eprintln!("❌ {}", e);
            for hint in notelink::error_hints(&e) {
                eprintln!("   {}", hint);
            }
            std::process::exit(1);
        }
    }
}
