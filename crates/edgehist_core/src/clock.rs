/// Monotonic tick counter used to bound completion waits.
///
/// Tick units are whatever the platform counts in; timeouts passed alongside
/// a source are measured in the same units. Wrapping counters are fine, since
/// elapsed time is computed with wrapping subtraction.
pub trait TickSource {
    fn now(&self) -> u64;
}

impl<F: Fn() -> u64> TickSource for F {
    fn now(&self) -> u64 {
        self()
    }
}
