use crate::CaptureError;
use core::cell::UnsafeCell;
use core::slice;
use core::sync::atomic::{AtomicU8, AtomicUsize, Ordering};

const IDLE: u8 = 0;
const CAPTURING: u8 = 1;
const COMPLETE: u8 = 2;

/// What the producer should do after handing over a timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeOutcome {
    /// Sample stored, keep the interrupt source enabled.
    Recorded,
    /// Sample stored and the buffer is now full; disable the interrupt source.
    Filled,
}

/// A statically allocated, single-producer capture buffer.
///
/// The producer (an interrupt handler) appends through `record`. The consumer
/// only reads the samples once the buffer reports completion, at which point
/// the producer is refused any further writes.
pub struct CaptureBuffer<const CAP: usize> {
    samples: UnsafeCell<[u16; CAP]>,
    len: AtomicUsize,
    state: AtomicU8,
}

unsafe impl<const CAP: usize> Sync for CaptureBuffer<CAP> {}
unsafe impl<const CAP: usize> Send for CaptureBuffer<CAP> {}

impl<const CAP: usize> Default for CaptureBuffer<CAP> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const CAP: usize> CaptureBuffer<CAP> {
    pub const fn new() -> Self {
        Self {
            samples: UnsafeCell::new([0; CAP]),
            len: AtomicUsize::new(0),
            state: AtomicU8::new(IDLE),
        }
    }

    /// Resets the write index and starts accepting edges.
    ///
    /// Old samples stay in memory; they are unreachable until overwritten.
    pub(crate) fn arm(&self) {
        self.state.store(IDLE, Ordering::Relaxed);
        self.len.store(0, Ordering::Relaxed);
        self.state.store(CAPTURING, Ordering::Release);
    }

    /// Stops accepting edges without marking the buffer complete.
    pub(crate) fn disarm(&self) {
        self.state.store(IDLE, Ordering::Release);
    }

    #[inline(always)]
    pub fn record(&self, timestamp: u16) -> Result<EdgeOutcome, CaptureError> {
        match self.state.load(Ordering::Acquire) {
            CAPTURING => {}
            COMPLETE => return Err(CaptureError::BufferFull),
            _ => return Err(CaptureError::NotArmed),
        }

        let idx = self.len.load(Ordering::Relaxed);
        if idx >= CAP {
            self.state.store(COMPLETE, Ordering::Release);
            return Err(CaptureError::BufferFull);
        }

        unsafe {
            // SAFETY: We are the only producer and idx < CAP. The consumer
            // does not read past `len` until COMPLETE is published below.
            self.samples.get().cast::<u16>().add(idx).write(timestamp);
        }

        let next = idx + 1;
        self.len.store(next, Ordering::Release);

        if next == CAP {
            self.state.store(COMPLETE, Ordering::Release);
            Ok(EdgeOutcome::Filled)
        } else {
            Ok(EdgeOutcome::Recorded)
        }
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.len.load(Ordering::Acquire)
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline(always)]
    pub fn capacity(&self) -> usize {
        CAP
    }

    #[inline(always)]
    pub fn is_capturing(&self) -> bool {
        self.state.load(Ordering::Acquire) == CAPTURING
    }

    #[inline(always)]
    pub fn is_complete(&self) -> bool {
        self.state.load(Ordering::Acquire) == COMPLETE
    }

    /// Returns the captured samples once the buffer is full.
    pub(crate) fn samples(&self) -> Result<&[u16], CaptureError> {
        if !self.is_complete() {
            return Err(CaptureError::SessionIncomplete);
        }
        let len = self.len.load(Ordering::Acquire);
        unsafe {
            // SAFETY: COMPLETE was published after the last write, and the
            // producer rejects every edge until the buffer is re-armed.
            Ok(slice::from_raw_parts(self.samples.get().cast::<u16>(), len))
        }
    }
}
