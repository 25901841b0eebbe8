#![feature(generic_const_exprs)]
#![allow(incomplete_features)]

mod generator;
mod replay;
mod stats;
mod stream;

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use edgehist_common::histogram::{BUCKET_MIN, NUM_READINGS};
use edgehist_io::CaptureFormat;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(about = "Square-wave period histograms from edge-capture timestamps")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Synthesise a capture file of jittered square-wave edges.
    Gen {
        #[arg(short, long)]
        out: PathBuf,
        #[arg(long, default_value_t = NUM_READINGS + 1)]
        samples: usize,
        #[arg(long, default_value_t = 1000, value_parser = clap::value_parser!(u32).range(1..=65535))]
        period_us: u32,
        #[arg(long, default_value_t = 30)]
        jitter_us: u32,
        #[arg(long, default_value_t = 0)]
        start: u16,
        #[arg(long, default_value_t = 12345)]
        seed: u64,
        /// Write one decimal value per line instead of packed u16.
        #[arg(long)]
        text: bool,
    },
    /// Replay capture files through the session pipeline.
    Run {
        #[arg(required = true)]
        captures: Vec<PathBuf>,
        #[arg(long, default_value_t = BUCKET_MIN)]
        bucket_min: u16,
    },
    /// Run live sessions against a simulated capture interrupt.
    Stream {
        #[arg(long, default_value_t = 1000, value_parser = clap::value_parser!(u32).range(1..=65535))]
        period_us: u32,
        #[arg(long, default_value_t = 30)]
        jitter_us: u32,
        #[arg(short, long, default_value_t = 1)]
        sessions: usize,
        /// Give up on a session after this many milliseconds; waits forever if unset.
        #[arg(long)]
        timeout_ms: Option<u64>,
        #[arg(long, default_value_t = BUCKET_MIN)]
        bucket_min: u16,
        #[arg(long, default_value_t = 12345)]
        seed: u64,
        /// Stop the simulated input after this many edges.
        #[arg(long)]
        stop_after: Option<u64>,
        /// Deliver edges as fast as possible.
        #[arg(long)]
        unpaced: bool,
    },
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Gen {
            out,
            samples,
            period_us,
            jitter_us,
            start,
            seed,
            text,
        } => {
            let format = if text {
                CaptureFormat::Text
            } else {
                CaptureFormat::from_path(&out)
            };
            let wave = generator::SquareWave::new(period_us, jitter_us, start, seed);
            generator::generate_capture_file(&out, samples, wave, format)?;
        }
        Commands::Run {
            captures,
            bucket_min,
        } => {
            replay::run_replay(&captures, bucket_min)?;
        }
        Commands::Stream {
            period_us,
            jitter_us,
            sessions,
            timeout_ms,
            bucket_min,
            seed,
            stop_after,
            unpaced,
        } => {
            let config = stream::StreamConfig {
                period_us,
                jitter_us,
                seed,
                sessions,
                timeout: timeout_ms.map(Duration::from_millis),
                bucket_min,
                stop_after,
                unpaced,
            };
            let outcome = stream::run_stream(&config)?;
            if outcome.completed == 0 && outcome.timed_out > 0 {
                bail!("no session completed ({} timed out)", outcome.timed_out);
            }
        }
    }
    Ok(())
}
