//! Core edge-capture and period histogram pipeline.
//!
//! This crate provides the bounded capture buffer filled from interrupt
//! context, the delta transform that turns absolute edge timestamps into
//! inter-arrival periods, the histogram accumulator that bins those periods,
//! and the session object tying the stages together. All modules are designed
//! for use in both firmware (no_std, no allocation) and host-side tooling.

#![no_std]
#![feature(generic_const_exprs)]
#![allow(incomplete_features)]

use core::fmt;

/// Fixed-capacity timestamp buffer for single-producer handoff.
///
/// Accepts one raw timer count per captured edge from interrupt context and
/// publishes completion to the main flow through atomics. Capacity overruns
/// are rejected instead of written.
pub mod capture;

/// Tick sources for bounded completion waits.
///
/// Abstracts the platform clock so the session can time out a wait for edges
/// without depending on any particular timer peripheral.
pub mod clock;

/// Conversion of raw edge timestamps into inter-arrival periods.
///
/// Performs wrapping 16-bit subtraction of adjacent samples and tracks the
/// running minimum and maximum period.
pub mod delta;

/// Fixed-range histogram over period values.
///
/// Maps each period onto a one-microsecond bucket, counting in-range values
/// and explicitly dropping everything outside the table.
pub mod histogram;

/// Read-only report view and its text rendering.
///
/// Exposes the non-zero buckets in ascending order together with the session
/// statistics, and renders them in the serial console format.
pub mod report;

/// Measurement session driving the capture, delta and histogram stages.
///
/// Owns the period series, histogram and statistics, borrows the shared
/// capture buffer, and offers the start/wait/compute/clear control surface.
pub mod session;

/// Error types returned by the capture pipeline.
///
/// Every variant is local and recoverable: a rejected sample or a premature
/// read never corrupts state, and the sampling loop carries on after
/// reporting it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureError {
    /// The capture buffer already holds its full complement of samples.
    ///
    /// Raised when the producer keeps delivering edges after the session
    /// filled. The extra sample is discarded.
    BufferFull,

    /// An edge arrived while no session was armed.
    NotArmed,

    /// A period fell outside the histogram range and was dropped.
    OutOfRange(u16),

    /// Raw samples or periods were requested before the session completed.
    ///
    /// The delta transform is only defined over a completely filled buffer,
    /// so any earlier read is refused.
    SessionIncomplete,

    /// The wait for a full buffer exceeded its tick budget.
    Timeout,

    /// The delta transform was handed buffers whose lengths do not differ by one.
    LengthMismatch,
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureError::BufferFull => f.write_str("capture buffer full, sample rejected"),
            CaptureError::NotArmed => f.write_str("edge captured with no session armed"),
            CaptureError::OutOfRange(value) => {
                write!(f, "period {} us outside histogram range", value)
            }
            CaptureError::SessionIncomplete => f.write_str("session not complete"),
            CaptureError::Timeout => f.write_str("timed out waiting for edges"),
            CaptureError::LengthMismatch => {
                f.write_str("period buffer must be one shorter than the sample buffer")
            }
        }
    }
}

impl core::error::Error for CaptureError {}
