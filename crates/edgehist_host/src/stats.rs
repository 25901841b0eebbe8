//! Period statistics aggregated across sessions.
//!
//! Each session report covers a single batch of readings. This tracker folds
//! any number of sessions together so a replay or stream run can end with one
//! summary line set.

use edgehist_core::session::SessionStats;

/// Running min/max/mean over every period seen, plus histogram totals.
///
/// Merging two trackers gives the same result as feeding both period streams
/// into one, which lets parallel replays reduce their per-file results.
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodStats {
    pub min: u16,
    pub max: u16,
    pub sum: u64,
    pub count: u64,
    pub sessions: u64,
    pub in_range: u64,
    pub out_of_range: u64,
}

impl Default for PeriodStats {
    fn default() -> Self {
        Self::new()
    }
}

impl PeriodStats {
    /// Creates an empty tracker; min starts at u16::MAX so the first period wins.
    pub fn new() -> Self {
        Self {
            min: u16::MAX,
            max: 0,
            sum: 0,
            count: 0,
            sessions: 0,
            in_range: 0,
            out_of_range: 0,
        }
    }

    /// Folds in one finished session.
    ///
    /// # Arguments
    ///
    /// * `periods` - The session's period series
    /// * `stats` - The session's computed statistics
    pub fn update(&mut self, periods: &[u16], stats: &SessionStats) {
        for &p in periods {
            if p < self.min {
                self.min = p;
            }
            if p > self.max {
                self.max = p;
            }
            self.sum += p as u64;
            self.count += 1;
        }
        self.sessions += 1;
        self.in_range += stats.in_range as u64;
        self.out_of_range += stats.out_of_range as u64;
    }

    pub fn merge(&mut self, other: &PeriodStats) {
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
        self.sum += other.sum;
        self.count += other.count;
        self.sessions += other.sessions;
        self.in_range += other.in_range;
        self.out_of_range += other.out_of_range;
    }

    /// Mean period in microseconds, or 0.0 if nothing was recorded.
    pub fn avg(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum as f64 / self.count as f64
        }
    }

    pub fn print_report(&self) {
        println!("\nPeriod Summary");
        println!("Sessions: {}", self.sessions);
        println!("Periods:  {}", self.count);
        if self.count == 0 {
            return;
        }
        println!("Min:      {} us", self.min);
        println!("Avg:      {:.2} us", self.avg());
        println!("Max:      {} us", self.max);

        let binned = self.in_range + self.out_of_range;
        let pct = if binned == 0 {
            0.0
        } else {
            100.0 * self.in_range as f64 / binned as f64
        };
        println!(
            "In range: {} ({:.1}%), dropped: {}",
            self.in_range, pct, self.out_of_range
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(in_range: u32, out_of_range: u32) -> SessionStats {
        SessionStats {
            in_range,
            out_of_range,
            ..SessionStats::new()
        }
    }

    #[test]
    fn empty_average_is_zero() {
        assert_eq!(PeriodStats::new().avg(), 0.0);
    }

    #[test]
    fn update_tracks_extrema_and_mean() {
        let mut total = PeriodStats::new();
        total.update(&[990, 1000, 1010], &stats(3, 0));
        assert_eq!(total.min, 990);
        assert_eq!(total.max, 1010);
        assert_eq!(total.avg(), 1000.0);
        assert_eq!(total.sessions, 1);
    }

    #[test]
    fn merge_matches_single_stream() {
        let mut a = PeriodStats::new();
        a.update(&[500, 1000], &stats(1, 1));
        let mut b = PeriodStats::new();
        b.update(&[1020, 3000], &stats(1, 1));

        let mut combined = PeriodStats::new();
        combined.update(&[500, 1000], &stats(1, 1));
        combined.update(&[1020, 3000], &stats(1, 1));

        a.merge(&b);
        assert_eq!(a, combined);
        assert_eq!(a.in_range, 2);
        assert_eq!(a.out_of_range, 2);
    }
}
