//! One-microsecond period histogram with explicit range rejection.
//!
//! The table covers `[base, base + B)`. Anything outside that window is
//! counted as out-of-range and never touches the bucket array.

use crate::CaptureError;
use log::trace;

/// Counts produced by a single accumulation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BinSummary {
    pub in_range: u32,
    pub out_of_range: u32,
}

pub struct HistogramTable<const B: usize> {
    base: u16,
    counts: [u32; B],
    in_range: u32,
    out_of_range: u32,
}

impl<const B: usize> HistogramTable<B> {
    pub const fn new(base: u16) -> Self {
        Self {
            base,
            counts: [0; B],
            in_range: 0,
            out_of_range: 0,
        }
    }

    /// Lowest value counted by the first bucket.
    pub fn base(&self) -> u16 {
        self.base
    }

    /// First value past the last bucket. May exceed `u16::MAX` for high bases.
    pub fn upper_bound(&self) -> u32 {
        self.base as u32 + B as u32
    }

    /// Maps a period to its bucket index.
    ///
    /// # Errors
    ///
    /// `OutOfRange(value)` when `value` lies outside `[base, base + B)`.
    #[inline(always)]
    pub fn bucket_index(&self, value: u16) -> Result<usize, CaptureError> {
        match value.checked_sub(self.base) {
            Some(offset) if (offset as usize) < B => Ok(offset as usize),
            _ => Err(CaptureError::OutOfRange(value)),
        }
    }

    /// Counts one period, or tallies it as dropped when out of range.
    pub fn record(&mut self, value: u16) -> Result<usize, CaptureError> {
        match self.bucket_index(value) {
            Ok(idx) => {
                self.counts[idx] = self.counts[idx].saturating_add(1);
                self.in_range += 1;
                Ok(idx)
            }
            Err(e) => {
                self.out_of_range += 1;
                Err(e)
            }
        }
    }

    pub fn accumulate(&mut self, periods: &[u16]) -> BinSummary {
        let mut summary = BinSummary::default();
        for &period in periods {
            match self.record(period) {
                Ok(_) => summary.in_range += 1,
                Err(_) => {
                    trace!("dropping out-of-range period {}", period);
                    summary.out_of_range += 1;
                }
            }
        }
        summary
    }

    /// Count for the bucket holding `value`; zero when out of range.
    pub fn count_for(&self, value: u16) -> u32 {
        self.bucket_index(value).map_or(0, |idx| self.counts[idx])
    }

    pub fn counts(&self) -> &[u32; B] {
        &self.counts
    }

    pub fn in_range(&self) -> u32 {
        self.in_range
    }

    pub fn out_of_range(&self) -> u32 {
        self.out_of_range
    }

    /// `(bucket_lower_bound, count)` for every non-zero bucket, ascending.
    pub fn nonzero(&self) -> impl Iterator<Item = (u16, u32)> + '_ {
        let base = self.base;
        self.counts
            .iter()
            .enumerate()
            .filter(|(_, count)| **count != 0)
            // idx < B only for buckets a u16 value could reach, so this never wraps.
            .map(move |(idx, count)| (base + idx as u16, *count))
    }

    pub fn is_clear(&self) -> bool {
        self.in_range == 0 && self.out_of_range == 0 && self.counts.iter().all(|c| *c == 0)
    }

    pub fn clear(&mut self) {
        self.counts.fill(0);
        self.in_range = 0;
        self.out_of_range = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_edges() {
        let table = HistogramTable::<100>::new(950);
        assert_eq!(table.bucket_index(949), Err(CaptureError::OutOfRange(949)));
        assert_eq!(table.bucket_index(950), Ok(0));
        assert_eq!(table.bucket_index(1049), Ok(99));
        assert_eq!(table.bucket_index(1050), Err(CaptureError::OutOfRange(1050)));
        assert_eq!(table.bucket_index(0), Err(CaptureError::OutOfRange(0)));
        assert_eq!(table.bucket_index(u16::MAX), Err(CaptureError::OutOfRange(u16::MAX)));
        assert_eq!(table.upper_bound(), 1050);
    }

    #[test]
    fn accumulates_and_drops() {
        let mut table = HistogramTable::<100>::new(950);
        let summary = table.accumulate(&[975, 975, 500, 1100, 1049]);

        assert_eq!(
            summary,
            BinSummary {
                in_range: 3,
                out_of_range: 2
            }
        );
        assert_eq!(table.count_for(975), 2);
        assert_eq!(table.count_for(1049), 1);
        assert_eq!(table.count_for(500), 0);
        assert_eq!(table.in_range(), 3);
        assert_eq!(table.out_of_range(), 2);
    }

    #[test]
    fn nonzero_is_ascending() {
        let mut table = HistogramTable::<100>::new(950);
        table.accumulate(&[1000, 960, 1000, 990]);
        let mut it = table.nonzero();
        assert_eq!(it.next(), Some((960, 1)));
        assert_eq!(it.next(), Some((990, 1)));
        assert_eq!(it.next(), Some((1000, 2)));
        assert_eq!(it.next(), None);
    }

    #[test]
    fn clear_zeroes_everything() {
        let mut table = HistogramTable::<100>::new(950);
        table.accumulate(&[955, 2000]);
        assert!(!table.is_clear());
        table.clear();
        assert!(table.is_clear());
        assert_eq!(table.nonzero().count(), 0);
    }

    #[test]
    fn high_base_never_wraps() {
        let mut table = HistogramTable::<100>::new(65500);
        assert_eq!(table.upper_bound(), 65600);
        assert_eq!(table.record(65535), Ok(35));
        assert_eq!(table.nonzero().next(), Some((65535, 1)));
    }
}
