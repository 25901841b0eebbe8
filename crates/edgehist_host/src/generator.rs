//! Synthetic edge streams for exercising the capture pipeline.
//!
//! Models a square wave observed through a free-running 16-bit capture timer:
//! each rising edge is stamped with the counter value at that instant, the
//! counter wraps at 65536, and every period is perturbed by uniform jitter.
//! Used both to write capture files and to drive the live stream producer.

use anyhow::Result;
use edgehist_io::{CaptureFormat, write_capture_file};
use log::info;
use std::path::Path;

/// Rising-edge timestamp source for a jittered square wave.
pub struct SquareWave {
    period_us: u32,
    jitter_us: u32,
    clock: u16,
    state: u64,
}

impl SquareWave {
    /// Creates a wave whose first edge lands on timer count `start`.
    ///
    /// # Arguments
    ///
    /// * `period_us` - Nominal period in timer counts (1 count = 1 us)
    /// * `jitter_us` - Maximum deviation from the nominal period, either way
    /// * `start` - Timer count at the first edge
    /// * `seed` - Seed for the jitter generator; zero is replaced internally
    pub fn new(period_us: u32, jitter_us: u32, start: u16, seed: u64) -> Self {
        Self {
            period_us,
            jitter_us: jitter_us.min(period_us),
            clock: start,
            state: if seed == 0 { 0x9E37_79B9_7F4A_7C15 } else { seed },
        }
    }

    fn next_random(&mut self) -> u64 {
        self.state ^= self.state >> 12;
        self.state ^= self.state << 25;
        self.state ^= self.state >> 27;
        self.state.wrapping_mul(0x2545F4914F6CDD1D)
    }

    /// Draws the next period, uniform in `[period - jitter, period + jitter]`.
    pub fn next_period(&mut self) -> u32 {
        if self.jitter_us == 0 {
            return self.period_us;
        }
        let span = 2 * self.jitter_us as u64 + 1;
        let offset = (self.next_random() % span) as u32;
        self.period_us - self.jitter_us + offset
    }

    /// Returns the timestamp of the next rising edge and advances the wave.
    pub fn next_edge(&mut self) -> u16 {
        let edge = self.clock;
        let period = self.next_period();
        // The capture counter is 16 bits wide; longer periods alias.
        self.clock = self.clock.wrapping_add(period as u16);
        edge
    }
}

impl Iterator for SquareWave {
    type Item = u16;

    fn next(&mut self) -> Option<u16> {
        Some(self.next_edge())
    }
}

/// Writes `samples` edge timestamps of a jittered square wave to `out_path`.
///
/// # Returns
///
/// Ok(()) on success, or an error if file I/O fails.
pub fn generate_capture_file(
    out_path: &Path,
    samples: usize,
    wave: SquareWave,
    format: CaptureFormat,
) -> Result<()> {
    info!(
        "generating {} edges ({} us +/- {} us) into {}",
        samples,
        wave.period_us,
        wave.jitter_us,
        out_path.display()
    );

    let edges: Vec<u16> = wave.take(samples).collect();
    write_capture_file(out_path, &edges, format)?;

    println!("Wrote {} edges to {}.", edges.len(), out_path.display());
    Ok(())
}
