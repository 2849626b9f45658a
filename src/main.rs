use std::fs;
use std::path::PathBuf;
use std::thread;

use anyhow::{bail, Context, Result};
use clap::Parser;
use crossbeam_channel::unbounded;

use craftopt::core::domain::Settings;
use craftopt::worker::{self, Report, Request};

// --- CLI Definitions ---

#[derive(Parser, Debug)]
#[command(author, version, about = "craftopt: evolutionary crafting sequence solver", long_about = None)]
struct Args {
    /// Path to the JSON settings file
    #[arg(short, long)]
    config: PathBuf,

    /// Override the random seed from the settings file
    #[arg(long)]
    seed: Option<u64>,

    /// Enable debug traces in the final report log
    #[arg(long)]
    debug: bool,
}

fn load_settings(args: &Args) -> Result<Settings> {
    let text = fs::read_to_string(&args.config)
        .with_context(|| format!("Failed to read settings file {}", args.config.display()))?;
    let mut settings: Settings =
        serde_json::from_str(&text).context("Failed to parse settings JSON")?;

    if let Some(seed) = args.seed {
        settings.seed = Some(seed);
    }
    if args.debug {
        settings.debug = true;
    }

    Ok(settings)
}

// --- Main ---

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let settings = load_settings(&args)?;

    // One solver worker, driven synchronously over channels. The worker
    // owns the session; this loop only paces it.
    let (request_tx, request_rx) = unbounded();
    let (report_tx, report_rx) = unbounded();

    let handle = thread::Builder::new()
        .name("solver-worker".to_string())
        .spawn(move || worker::run(request_rx, report_tx))?;

    request_tx.send(Request::Start(Box::new(settings)))?;

    let mut failed = false;
    loop {
        let report = report_rx.recv().context("Solver worker disconnected")?;
        println!("{}", serde_json::to_string(&report)?);

        match &report {
            Report::Progress {
                generations_completed,
                max_generations,
                ..
            } => {
                if generations_completed < max_generations {
                    request_tx.send(Request::Advance)?;
                } else {
                    request_tx.send(Request::Finish)?;
                }
            }
            Report::Success { .. } => break,
            Report::Error { message, .. } => {
                log::error!("solver failed: {}", message);
                failed = true;
                break;
            }
        }
    }

    drop(request_tx);
    let _ = handle.join();

    if failed {
        bail!("Solver terminated with an error");
    }
    Ok(())
}
