//! Read-only report over a finished session.
//!
//! The text layout matches the serial console output: one tab-indented line
//! per non-zero bucket, then the extrema and the in-range total.

use crate::histogram::HistogramTable;
use crate::session::SessionStats;
use core::fmt;

pub struct Report<'a, const B: usize> {
    histogram: &'a HistogramTable<B>,
    stats: &'a SessionStats,
}

impl<'a, const B: usize> Report<'a, B> {
    pub fn new(histogram: &'a HistogramTable<B>, stats: &'a SessionStats) -> Self {
        Self { histogram, stats }
    }

    /// `(bucket_lower_bound, count)` pairs in ascending bucket order, zero counts skipped.
    pub fn entries(&self) -> impl Iterator<Item = (u16, u32)> + 'a {
        self.histogram.nonzero()
    }

    pub fn min_period(&self) -> u16 {
        self.stats.min_period
    }

    pub fn max_period(&self) -> u16 {
        self.stats.max_period
    }

    pub fn total_in_range(&self) -> u32 {
        self.stats.in_range
    }

    pub fn out_of_range(&self) -> u32 {
        self.stats.out_of_range
    }

    pub fn write_summary<W: fmt::Write>(&self, out: &mut W) -> fmt::Result {
        writeln!(out, "Minimum value: {}", self.min_period())?;
        writeln!(out, "Maximum value: {}", self.max_period())?;
        writeln!(out, "Total Inter-arrival Times: {}", self.total_in_range())?;
        writeln!(out, "Out-of-range periods: {}", self.out_of_range())
    }
}

pub fn write_heading<W: fmt::Write>(out: &mut W) -> fmt::Result {
    writeln!(out, "Inter-arrival Times:")
}

pub fn write_entry<W: fmt::Write>(out: &mut W, lower_bound: u16, count: u32) -> fmt::Result {
    writeln!(out, "\t{} us: {}", lower_bound, count)
}

impl<const B: usize> fmt::Display for Report<'_, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_heading(f)?;
        for (lower_bound, count) in self.entries() {
            write_entry(f, lower_bound, count)?;
        }
        self.write_summary(f)
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use std::string::ToString;

    #[test]
    fn renders_console_layout() {
        let mut table = HistogramTable::<100>::new(950);
        table.accumulate(&[975, 975, 1001, 3000]);
        let stats = SessionStats {
            min_period: 975,
            max_period: 3000,
            in_range: 3,
            out_of_range: 1,
        };

        let text = Report::new(&table, &stats).to_string();
        assert_eq!(
            text,
            "Inter-arrival Times:\n\
             \t975 us: 2\n\
             \t1001 us: 1\n\
             Minimum value: 975\n\
             Maximum value: 3000\n\
             Total Inter-arrival Times: 3\n\
             Out-of-range periods: 1\n"
        );
    }

    #[test]
    fn empty_table_has_no_entries() {
        let table = HistogramTable::<100>::new(950);
        let stats = SessionStats::new();
        let report = Report::new(&table, &stats);
        assert_eq!(report.entries().count(), 0);
        assert_eq!(report.total_in_range(), 0);
    }
}
