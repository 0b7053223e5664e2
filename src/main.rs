//! notelink - open Xiaohongshu notes on an Android device from web links
//!
//! This is the batch-mode binary entry point. All logic lives in the library.

use std::path::PathBuf;

use clap::Parser;
use notelink::CommonOptions;
use notelink_core::Error;

/// Open Xiaohongshu web links in the app on a connected Android device
#[derive(Parser, Debug)]
#[command(name = "notelink")]
#[command(about = "Open Xiaohongshu web links in the app via adb", long_about = None)]
struct Args {
    /// File with one link per line; links are read from stdin when omitted
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Settings file (default: .notelink/config.toml, then the user config dir)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Do not tap the favorite button after opening a note
    #[arg(long)]
    no_tap: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let args = Args::parse();

    notelink_core::logging::init("batch")?;

    let common = CommonOptions {
        config: args.config,
        no_tap: args.no_tap,
    };

    match notelink::run_batch(args.file.as_deref(), &common).await {
        Ok(_) => Ok(()),
        Err(Error::Cancelled) => {
            eprintln!("\n👋 Cancelled");
            Ok(())
        }
        Err(e) => {
            eprintln!("❌ {}", e);
            for hint in notelink::error_hints(&e) {
                eprintln!("   {}", hint);
            }
            std::process::exit(1);
        }
    }
}
