use crate::stats::PeriodStats;
use anyhow::{Context, Result};
use edgehist_common::histogram::{NUM_BUCKETS, NUM_READINGS};
use edgehist_core::capture::CaptureBuffer;
use edgehist_core::session::Session;
use edgehist_io::{load_capture_file, loader};
use log::{info, warn};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Instant;

const EDGES_PER_SESSION: usize = NUM_READINGS + 1;

pub struct FileReplay {
    pub path: PathBuf,
    pub reports: Vec<String>,
    pub stats: PeriodStats,
    pub leftover: usize,
}

/// Runs one session per full window of edges in `path`.
pub fn replay_file(path: &Path, bucket_min: u16) -> Result<FileReplay> {
    let samples = load_capture_file(path)
        .with_context(|| format!("Failed to load {}", path.display()))?;
    let (windows, rest) = loader::split_sessions(&samples, EDGES_PER_SESSION);
    if !rest.is_empty() {
        warn!(
            "{}: ignoring {} trailing edges (need {} per session)",
            path.display(),
            rest.len(),
            EDGES_PER_SESSION
        );
    }

    let capture = CaptureBuffer::<EDGES_PER_SESSION>::new();
    let mut session = Session::<NUM_READINGS, NUM_BUCKETS>::new(&capture, bucket_min);
    let mut stats = PeriodStats::new();
    let mut reports = Vec::with_capacity(windows.len());

    for window in windows {
        session.start_session();
        for &edge in window {
            session.on_edge_captured(edge)?;
        }
        session.compute_results()?;
        stats.update(session.periods()?, session.stats());
        reports.push(session.report().to_string());
        session.clear_histogram();
    }

    info!(
        "{}: {} session(s) replayed",
        path.display(),
        reports.len()
    );

    Ok(FileReplay {
        path: path.to_path_buf(),
        reports,
        stats,
        leftover: rest.len(),
    })
}

pub fn run_replay(paths: &[PathBuf], bucket_min: u16) -> Result<()> {
    println!("Replaying {} capture file(s)...", paths.len());
    let start = Instant::now();

    let replays: Vec<FileReplay> = paths
        .par_iter()
        .map(|path| replay_file(path, bucket_min))
        .collect::<Result<_>>()?;

    let mut total = PeriodStats::new();
    for replay in &replays {
        println!("\n== {} ==", replay.path.display());
        if replay.reports.is_empty() {
            println!(
                "No complete session ({} edges, need {}).",
                replay.leftover, EDGES_PER_SESSION
            );
        }
        for (idx, report) in replay.reports.iter().enumerate() {
            println!("-- session {} --", idx + 1);
            print!("{}", report);
        }
        total.merge(&replay.stats);
    }

    total.print_report();
    println!("Time: {:.4} s", start.elapsed().as_secs_f64());
    Ok(())
}
