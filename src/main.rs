mod cache;
mod config;
mod core;
mod decoder;
mod error;
mod flash;
mod lru;
mod stats;
mod store;
mod trace_loader;
mod types;
mod utils;
use crate::core::*;
use anyhow::Result;
use clap::Parser;
use flash::FlashImage;

/// Trace-driven simulator for a set-associative LRU flash cache
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Name of the access trace file
    /// Each line is `I <address>` (instruction fetch) or `D <address>` (data read)
    #[arg(short, long, default_value = "trace.txt")]
    trace: String,

    /// Name of the flash image, mapped at the start of the flash window
    /// If not set, a synthetic image is used
    #[arg(short, long)]
    flash: Option<String>,

    /// Verbose mode
    /// If this flag is set to 1, the simulator prints every access and the word it read
    #[arg(short, long)]
    verbose: Option<u32>,

    /// No cache mode
    /// If this flag is set, every access reads flash directly
    #[arg(short, long)]
    no_cache: bool,

    /// Print miss counts per cache line
    #[arg(short, long)]
    line_stats: bool,

    /// Progress bar refresh interval in accesses
    /// If this flag is set to 0, no progress bar is shown
    #[arg(short, long, default_value_t = 0)]
    progress_bar_size: u64,

    /// Write a flamegraph of the run to this file
    #[arg(long)]
    prof: Option<String>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let flash = match &args.flash {
        Some(path) => {
            let flash = FlashImage::from_file(path)?;
            log::info!("loaded {} bytes of flash from {}", flash.len(), path);
            flash
        }
        None => FlashImage::synthetic(),
    };

    let mut core = Core::new(flash);
    core.run(CoreProps {
        trace_file_path: args.trace,
        use_cache: !args.no_cache,
        verbose: args.verbose.unwrap_or(0),
        progress_bar_size: args.progress_bar_size,
        show_line_stats: args.line_stats,
        prof_file_path: args.prof,
    })
}
