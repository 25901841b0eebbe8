//! Measurement session state and control.
//!
//! A session is: reset statistics, arm the capture buffer, wait for it to
//! fill, derive periods and statistics, bin the periods, report, clear the
//! histogram. The session owns everything the main flow touches and borrows
//! the capture buffer it shares with the interrupt producer.

use crate::CaptureError;
use crate::capture::{CaptureBuffer, EdgeOutcome};
use crate::clock::TickSource;
use crate::delta;
use crate::histogram::HistogramTable;
use crate::report::Report;
use log::{debug, warn};

/// Per-session summary derived from the period series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionStats {
    /// Shortest period, or `u16::MAX` before any period was computed.
    pub min_period: u16,
    /// Longest period, or 0 before any period was computed.
    pub max_period: u16,
    pub in_range: u32,
    pub out_of_range: u32,
}

impl SessionStats {
    pub const fn new() -> Self {
        Self {
            min_period: u16::MAX,
            max_period: 0,
            in_range: 0,
            out_of_range: 0,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for SessionStats {
    fn default() -> Self {
        Self::new()
    }
}

/// One measure-then-report cycle over `N` periods and `B` histogram buckets.
///
/// The capture buffer holds `N + 1` raw timestamps and lives wherever the
/// interrupt producer can reach it, usually a `static`. The session is the
/// only consumer of that buffer.
///
/// # Type Parameters
///
/// * `'a` - Lifetime of the shared capture buffer
/// * `N` - Number of periods measured per session
/// * `B` - Number of one-microsecond histogram buckets
pub struct Session<'a, const N: usize, const B: usize>
where
    [(); N + 1]:,
{
    capture: &'a CaptureBuffer<{ N + 1 }>,
    periods: [u16; N],
    computed: bool,
    histogram: HistogramTable<B>,
    stats: SessionStats,
}

impl<'a, const N: usize, const B: usize> Session<'a, N, B>
where
    [(); N + 1]:,
{
    /// Creates an idle session over `capture` with buckets starting at `bucket_min`.
    pub fn new(capture: &'a CaptureBuffer<{ N + 1 }>, bucket_min: u16) -> Self {
        Self {
            capture,
            periods: [0; N],
            computed: false,
            histogram: HistogramTable::new(bucket_min),
            stats: SessionStats::new(),
        }
    }

    /// Resets statistics and arms the capture buffer for `N + 1` edges.
    ///
    /// The histogram is left as is; clear it after reporting the previous
    /// session.
    pub fn start_session(&mut self) {
        self.stats.reset();
        self.computed = false;
        self.capture.arm();
        debug!("session armed for {} edges", N + 1);
    }

    /// Stops the producer early, e.g. after a timed-out wait.
    pub fn abort_session(&mut self) {
        self.capture.disarm();
        self.computed = false;
        debug!("session aborted after {} edges", self.capture.len());
    }

    /// Producer entry point; forwards to the shared capture buffer.
    #[inline(always)]
    pub fn on_edge_captured(&self, timestamp: u16) -> Result<EdgeOutcome, CaptureError> {
        self.capture.record(timestamp)
    }

    pub fn is_session_complete(&self) -> bool {
        self.capture.is_complete()
    }

    pub fn captured(&self) -> usize {
        self.capture.len()
    }

    /// Blocks until the capture buffer is full.
    ///
    /// With `timeout` set to `None` the wait is unbounded. Otherwise it gives
    /// up once `timeout` ticks of `clock` have elapsed.
    ///
    /// # Errors
    ///
    /// `Timeout` when the budget runs out first. The session stays armed; call
    /// `abort_session` to stop the producer.
    pub fn wait_for_completion<C: TickSource>(
        &self,
        clock: &C,
        timeout: Option<u64>,
    ) -> Result<(), CaptureError> {
        let start = clock.now();
        while !self.is_session_complete() {
            if let Some(limit) = timeout {
                if clock.now().wrapping_sub(start) >= limit {
                    warn!(
                        "timed out with {} of {} edges captured",
                        self.capture.len(),
                        N + 1
                    );
                    return Err(CaptureError::Timeout);
                }
            }
            core::hint::spin_loop();
        }
        Ok(())
    }

    /// Derives the period series, its extrema and the histogram counts.
    ///
    /// Repeated calls for the same session return the cached statistics
    /// without binning the periods twice.
    ///
    /// # Errors
    ///
    /// `SessionIncomplete` until the capture buffer is full.
    pub fn compute_results(&mut self) -> Result<&SessionStats, CaptureError> {
        if self.computed {
            return Ok(&self.stats);
        }

        let capture = self.capture;
        let raw = capture.samples()?;
        let range = delta::compute_periods(raw, &mut self.periods)?;
        let summary = self.histogram.accumulate(&self.periods);

        self.stats = SessionStats {
            min_period: range.min,
            max_period: range.max,
            in_range: summary.in_range,
            out_of_range: summary.out_of_range,
        };
        self.computed = true;

        if summary.out_of_range > 0 {
            warn!(
                "{} of {} periods outside [{}, {}) us",
                summary.out_of_range,
                N,
                self.histogram.base(),
                self.histogram.upper_bound()
            );
        }
        debug!(
            "periods min={} max={} in_range={}",
            range.min, range.max, summary.in_range
        );

        Ok(&self.stats)
    }

    /// Zeroes every bucket and the in-range totals, ready for the next session.
    pub fn clear_histogram(&mut self) {
        self.histogram.clear();
        self.stats.in_range = 0;
        self.stats.out_of_range = 0;
    }

    pub fn raw_samples(&self) -> Result<&[u16], CaptureError> {
        self.capture.samples()
    }

    pub fn periods(&self) -> Result<&[u16], CaptureError> {
        if self.computed {
            Ok(&self.periods)
        } else {
            Err(CaptureError::SessionIncomplete)
        }
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn histogram(&self) -> &HistogramTable<B> {
        &self.histogram
    }

    pub fn report(&self) -> Report<'_, B> {
        Report::new(&self.histogram, &self.stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;
    use rand::{Rng, SeedableRng, rngs::StdRng};

    fn fill<const N: usize, const B: usize>(session: &Session<'_, N, B>, raw: &[u16])
    where
        [(); N + 1]:,
    {
        for &ts in raw {
            session.on_edge_captured(ts).unwrap();
        }
    }

    #[test]
    fn steady_wave_lands_in_one_bucket() {
        let capture = CaptureBuffer::<3>::new();
        let mut session = Session::<2, 100>::new(&capture, 950);
        session.start_session();
        fill(&session, &[1000, 1975, 2950]);

        let stats = *session.compute_results().unwrap();
        assert_eq!(session.periods().unwrap(), &[975, 975]);
        assert_eq!(session.histogram().count_for(975), 2);
        assert_eq!(session.histogram().nonzero().count(), 1);
        assert_eq!(stats.min_period, 975);
        assert_eq!(stats.max_period, 975);
        assert_eq!(stats.in_range, 2);
        assert_eq!(stats.out_of_range, 0);
    }

    #[test]
    fn out_of_range_periods_are_dropped() {
        let capture = CaptureBuffer::<3>::new();
        let mut session = Session::<2, 100>::new(&capture, 950);
        session.start_session();
        fill(&session, &[0, 500, 1600]);

        let stats = *session.compute_results().unwrap();
        assert!(session.histogram().counts().iter().all(|c| *c == 0));
        assert_eq!(stats.in_range, 0);
        assert_eq!(stats.out_of_range, 2);
        assert_eq!(stats.min_period, 500);
        assert_eq!(stats.max_period, 1100);
    }

    #[test]
    fn counter_wrap_is_out_of_range() {
        let capture = CaptureBuffer::<2>::new();
        let mut session = Session::<1, 100>::new(&capture, 950);
        session.start_session();
        fill(&session, &[65500, 100]);

        let stats = *session.compute_results().unwrap();
        assert_eq!(session.periods().unwrap(), &[136]);
        assert_eq!(stats.in_range, 0);
        assert_eq!(stats.out_of_range, 1);
    }

    #[test]
    fn premature_reads_are_refused() {
        let capture = CaptureBuffer::<3>::new();
        let mut session = Session::<2, 100>::new(&capture, 950);
        assert_eq!(
            session.compute_results().err(),
            Some(CaptureError::SessionIncomplete)
        );

        session.start_session();
        session.on_edge_captured(1).unwrap();
        assert!(!session.is_session_complete());
        assert_eq!(
            session.compute_results().err(),
            Some(CaptureError::SessionIncomplete)
        );
        assert_eq!(session.raw_samples(), Err(CaptureError::SessionIncomplete));
        assert_eq!(session.periods(), Err(CaptureError::SessionIncomplete));
    }

    #[test]
    fn extra_edge_is_rejected_without_corruption() {
        let capture = CaptureBuffer::<1001>::new();
        let mut session = Session::<1000, 100>::new(&capture, 950);
        session.start_session();

        for i in 0..1000u16 {
            assert_eq!(
                session.on_edge_captured(i.wrapping_mul(1000)),
                Ok(EdgeOutcome::Recorded)
            );
        }
        assert_eq!(
            session.on_edge_captured(1000u16.wrapping_mul(1000)),
            Ok(EdgeOutcome::Filled)
        );
        assert_eq!(
            session.on_edge_captured(12345),
            Err(CaptureError::BufferFull)
        );

        let raw = session.raw_samples().unwrap();
        assert_eq!(raw.len(), 1001);
        assert_eq!(raw[1000], 1000u16.wrapping_mul(1000));

        let stats = *session.compute_results().unwrap();
        assert_eq!(stats.in_range + stats.out_of_range, 1000);
        assert_eq!(stats.in_range, 1000);
        assert_eq!(session.histogram().count_for(1000), 1000);
    }

    #[test]
    fn compute_twice_does_not_double_count() {
        let capture = CaptureBuffer::<3>::new();
        let mut session = Session::<2, 100>::new(&capture, 950);
        session.start_session();
        fill(&session, &[1000, 1975, 2950]);

        session.compute_results().unwrap();
        session.compute_results().unwrap();
        assert_eq!(session.histogram().count_for(975), 2);
    }

    #[test]
    fn clear_then_report_is_empty() {
        let capture = CaptureBuffer::<3>::new();
        let mut session = Session::<2, 100>::new(&capture, 950);
        session.start_session();
        fill(&session, &[1000, 1975, 2950]);
        session.compute_results().unwrap();

        session.clear_histogram();
        assert!(session.histogram().is_clear());
        assert_eq!(session.report().entries().count(), 0);
        assert_eq!(session.report().total_in_range(), 0);

        session.clear_histogram();
        assert!(session.histogram().is_clear());
    }

    #[test]
    fn sessions_are_reusable() {
        let capture = CaptureBuffer::<3>::new();
        let mut session = Session::<2, 100>::new(&capture, 950);

        session.start_session();
        fill(&session, &[1000, 1975, 2950]);
        session.compute_results().unwrap();
        session.clear_histogram();

        session.start_session();
        assert_eq!(session.stats(), &SessionStats::new());
        fill(&session, &[0, 1000, 2010]);
        let stats = *session.compute_results().unwrap();
        assert_eq!(stats.min_period, 1000);
        assert_eq!(stats.max_period, 1010);
        assert_eq!(session.histogram().count_for(975), 0);
        assert_eq!(session.histogram().count_for(1000), 1);
        assert_eq!(session.histogram().count_for(1010), 1);
    }

    #[test]
    fn wait_returns_once_complete() {
        let capture = CaptureBuffer::<2>::new();
        let mut session = Session::<1, 100>::new(&capture, 950);
        session.start_session();
        fill(&session, &[0, 1000]);
        assert_eq!(session.wait_for_completion(&|| 0u64, None), Ok(()));
    }

    #[test]
    fn wait_times_out_and_abort_stops_producer() {
        let capture = CaptureBuffer::<3>::new();
        let mut session = Session::<2, 100>::new(&capture, 950);
        session.start_session();
        session.on_edge_captured(5).unwrap();

        let ticks = Cell::new(0u64);
        let clock = || {
            ticks.set(ticks.get() + 1);
            ticks.get()
        };
        assert_eq!(
            session.wait_for_completion(&clock, Some(10)),
            Err(CaptureError::Timeout)
        );
        assert!(ticks.get() >= 10);

        session.abort_session();
        assert_eq!(session.on_edge_captured(6), Err(CaptureError::NotArmed));
        assert_eq!(session.captured(), 1);
    }

    #[test]
    fn random_series_conserve_counts_and_extrema() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let capture = CaptureBuffer::<1001>::new();
        let mut session = Session::<1000, 100>::new(&capture, 950);

        for _ in 0..20 {
            session.start_session();
            let mut ts: u16 = rng.r#gen();
            let mut expected = [0u16; 1000];
            session.on_edge_captured(ts).unwrap();
            for slot in expected.iter_mut() {
                let period: u16 = if rng.gen_bool(0.8) {
                    rng.gen_range(900..1100)
                } else {
                    rng.r#gen()
                };
                ts = ts.wrapping_add(period);
                *slot = period;
                session.on_edge_captured(ts).unwrap();
            }

            let stats = *session.compute_results().unwrap();
            assert_eq!(session.periods().unwrap(), &expected[..]);
            assert_eq!(stats.in_range + stats.out_of_range, 1000);
            assert_eq!(
                session.histogram().counts().iter().sum::<u32>(),
                stats.in_range
            );
            assert_eq!(stats.min_period, *expected.iter().min().unwrap());
            assert_eq!(stats.max_period, *expected.iter().max().unwrap());

            session.clear_histogram();
        }
    }
}
