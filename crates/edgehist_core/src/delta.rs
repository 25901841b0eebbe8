use crate::CaptureError;

/// Smallest and largest period seen in a series.
///
/// Starts out inverted (`min = u16::MAX`, `max = 0`) so the first period
/// becomes both extrema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodRange {
    pub min: u16,
    pub max: u16,
}

impl PeriodRange {
    pub const EMPTY: Self = Self {
        min: u16::MAX,
        max: 0,
    };

    #[inline(always)]
    pub fn include(&mut self, period: u16) {
        if period < self.min {
            self.min = period;
        }
        if period > self.max {
            self.max = period;
        }
    }

    /// True until at least one period has been included.
    pub fn is_empty(&self) -> bool {
        self.min > self.max
    }
}

impl Default for PeriodRange {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Ticks elapsed between two captures of a 16-bit counter.
///
/// A counter wrap between the two edges yields a large period, never a
/// negative one.
#[inline(always)]
pub fn period_between(earlier: u16, later: u16) -> u16 {
    later.wrapping_sub(earlier)
}

/// Converts N+1 raw timestamps into N inter-arrival periods.
///
/// Writes `periods[i] = raw[i + 1] - raw[i]` (mod 2^16) and returns the
/// range of the written periods.
///
/// # Errors
///
/// `LengthMismatch` unless `raw.len() == periods.len() + 1`.
pub fn compute_periods(raw: &[u16], periods: &mut [u16]) -> Result<PeriodRange, CaptureError> {
    if raw.len() != periods.len() + 1 {
        return Err(CaptureError::LengthMismatch);
    }

    let mut range = PeriodRange::EMPTY;
    for (slot, pair) in periods.iter_mut().zip(raw.windows(2)) {
        let period = period_between(pair[0], pair[1]);
        *slot = period;
        range.include(period);
    }
    Ok(range)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steady_edges() {
        let raw = [1000, 1975, 2950];
        let mut periods = [0u16; 2];
        let range = compute_periods(&raw, &mut periods).unwrap();
        assert_eq!(periods, [975, 975]);
        assert_eq!(range, PeriodRange { min: 975, max: 975 });
    }

    #[test]
    fn tracks_extrema() {
        let raw = [0, 500, 1600];
        let mut periods = [0u16; 2];
        let range = compute_periods(&raw, &mut periods).unwrap();
        assert_eq!(periods, [500, 1100]);
        assert_eq!(range.min, 500);
        assert_eq!(range.max, 1100);
    }

    #[test]
    fn counter_wrap_is_not_negative() {
        let raw = [65500, 100];
        let mut periods = [0u16; 1];
        compute_periods(&raw, &mut periods).unwrap();
        assert_eq!(periods[0], 136);
        assert_eq!(period_between(65500, 100), 136);
    }

    #[test]
    fn length_must_differ_by_one() {
        let mut periods = [0u16; 2];
        assert_eq!(
            compute_periods(&[1, 2], &mut periods),
            Err(CaptureError::LengthMismatch)
        );
        assert_eq!(
            compute_periods(&[], &mut []),
            Err(CaptureError::LengthMismatch)
        );
    }

    #[test]
    fn single_sample_yields_empty_range() {
        let range = compute_periods(&[42], &mut []).unwrap();
        assert!(range.is_empty());
    }
}
