use crate::generator::SquareWave;
use crate::stats::PeriodStats;
use anyhow::{Result, anyhow};
use edgehist_common::histogram::{NUM_BUCKETS, NUM_READINGS};
use edgehist_core::CaptureError;
use edgehist_core::capture::{CaptureBuffer, EdgeOutcome};
use edgehist_core::session::Session;
use log::{debug, info, warn};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread;
use std::time::{Duration, Instant};

const EDGES_PER_SESSION: usize = NUM_READINGS + 1;

pub struct StreamConfig {
    pub period_us: u32,
    pub jitter_us: u32,
    pub seed: u64,
    pub sessions: usize,
    pub timeout: Option<Duration>,
    pub bucket_min: u16,
    /// Stop emitting after this many edges, to exercise the completion timeout.
    pub stop_after: Option<u64>,
    /// Deliver edges as fast as possible instead of pacing them in real time.
    pub unpaced: bool,
}

pub struct StreamStats {
    pub emitted: Arc<AtomicU64>,
    pub filled: Arc<AtomicU64>,
    pub rejected: Arc<AtomicU64>,
}

pub struct StreamOutcome {
    pub completed: usize,
    pub timed_out: usize,
    pub totals: PeriodStats,
}

/// Runs live sessions against a producer thread standing in for the capture ISR.
pub fn run_stream(config: &StreamConfig) -> Result<StreamOutcome> {
    println!("EDGE STREAM");
    println!("Wave: {} us +/- {} us", config.period_us, config.jitter_us);
    println!("Sessions: {}", config.sessions);
    match config.timeout {
        Some(t) => println!("Timeout: {} ms", t.as_millis()),
        None => println!("Timeout: none"),
    }
    println!("-------------------------------");

    let running = Arc::new(AtomicBool::new(true));
    let stats = StreamStats {
        emitted: Arc::new(AtomicU64::new(0)),
        filled: Arc::new(AtomicU64::new(0)),
        rejected: Arc::new(AtomicU64::new(0)),
    };
    let capture = Arc::new(CaptureBuffer::<EDGES_PER_SESSION>::new());

    let cap_prod = capture.clone();
    let r_prod = running.clone();
    let s_emit = stats.emitted.clone();
    let s_fill = stats.filled.clone();
    let s_rej = stats.rejected.clone();
    let mut wave = SquareWave::new(config.period_us, config.jitter_us, 0, config.seed);
    let stop_after = config.stop_after;
    // Real-time pacing follows the nominal period; jitter only shows in the timestamps.
    let pace = (!config.unpaced).then(|| Duration::from_micros(config.period_us as u64));

    let producer = thread::spawn(move || {
        let mut next_edge = Instant::now();

        while r_prod.load(Ordering::Relaxed) {
            let emitted = s_emit.load(Ordering::Relaxed);
            if stop_after.is_some_and(|limit| emitted >= limit) {
                thread::sleep(Duration::from_millis(1));
                continue;
            }

            let edge = wave.next_edge();
            match cap_prod.record(edge) {
                Ok(EdgeOutcome::Recorded) => {}
                Ok(EdgeOutcome::Filled) => {
                    s_fill.fetch_add(1, Ordering::Relaxed);
                }
                Err(_) => {
                    s_rej.fetch_add(1, Ordering::Relaxed);
                }
            }
            s_emit.fetch_add(1, Ordering::Relaxed);

            if let Some(pace) = pace {
                next_edge += pace;
                while Instant::now() < next_edge {
                    std::hint::spin_loop();
                }
            }
        }
    });

    let epoch = Instant::now();
    let clock = || epoch.elapsed().as_micros() as u64;
    let timeout_ticks = config.timeout.map(|t| t.as_micros() as u64);

    let mut session = Session::<NUM_READINGS, NUM_BUCKETS>::new(&capture, config.bucket_min);
    let mut outcome = StreamOutcome {
        completed: 0,
        timed_out: 0,
        totals: PeriodStats::new(),
    };

    for n in 1..=config.sessions {
        println!("Session {}: reading values...", n);
        session.start_session();

        match session.wait_for_completion(&clock, timeout_ticks) {
            Ok(()) => {}
            Err(CaptureError::Timeout) => {
                session.abort_session();
                warn!("session {} timed out", n);
                println!(
                    "Session {} timed out after {} of {} edges.",
                    n,
                    session.captured(),
                    EDGES_PER_SESSION
                );
                outcome.timed_out += 1;
                continue;
            }
            Err(e) => return Err(e.into()),
        }

        session.compute_results()?;
        print!("{}", session.report());
        outcome.totals.update(session.periods()?, session.stats());
        session.clear_histogram();
        outcome.completed += 1;
        info!("session {} complete", n);
    }

    running.store(false, Ordering::Relaxed);
    producer
        .join()
        .map_err(|_| anyhow!("edge producer thread panicked"))?;

    debug!(
        "producer emitted={} filled={} rejected={}",
        stats.emitted.load(Ordering::Relaxed),
        stats.filled.load(Ordering::Relaxed),
        stats.rejected.load(Ordering::Relaxed)
    );
    println!(
        "Edges: {} emitted, {} rejected outside sessions",
        stats.emitted.load(Ordering::Relaxed),
        stats.rejected.load(Ordering::Relaxed)
    );
    outcome.totals.print_report();
    println!("Done.");

    Ok(outcome)
}
