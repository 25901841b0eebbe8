//! Driver for the 16-bit input-capture timer unit.
//!
//! The unit runs a free-running counter at the prescaled bus clock, latches
//! it on every rising edge of its input, and raises `CAPTURE_IRQ` while the
//! capture flag is set and the interrupt is enabled. A compare register is
//! advanced by a fixed interval on every interrupt to keep the output-compare
//! toggle running alongside the capture.

use edgehist_common::mmio::CAPTURE_UNIT_BASE;
use edgehist_common::timer::{COMPARE_INTERVAL, PRESCALE};

/// Control register: counter enable, interrupt enable, edge select.
const CTRL: usize = 0x00;
/// Status register; writing 1 to a bit clears it.
const STATUS: usize = 0x04;
/// Free-running counter (read-only).
const COUNT: usize = 0x08;
/// Counter value latched at the last rising edge (read-only).
const CAPTURE: usize = 0x0C;
/// Output-compare register.
const COMPARE: usize = 0x10;
/// Bus clock divider.
const PRESCALER: usize = 0x14;

const CTRL_ENABLE: u32 = 1 << 0;
const CTRL_IRQ_ENABLE: u32 = 1 << 1;
const CTRL_RISING_EDGE: u32 = 1 << 2;

const STATUS_CAPTURE_FLAG: u32 = 1 << 0;

/// Capture timer at a fixed MMIO base.
///
/// Holds only the base address, so a `static` instance is shared freely
/// between the main flow and the trap handler.
pub struct CaptureUnit {
    base: usize,
}

/// Capture unit wired to the measured input.
pub static CAPTURE_UNIT: CaptureUnit = CaptureUnit::new(CAPTURE_UNIT_BASE);

impl CaptureUnit {
    pub const fn new(base: usize) -> Self {
        Self { base }
    }

    #[inline(always)]
    fn read(&self, offset: usize) -> u32 {
        unsafe { ((self.base + offset) as *const u32).read_volatile() }
    }

    #[inline(always)]
    fn write(&self, offset: usize, value: u32) {
        unsafe { ((self.base + offset) as *mut u32).write_volatile(value) }
    }

    /// Starts the counter on rising-edge capture with the interrupt masked.
    pub fn init(&self) {
        self.write(PRESCALER, PRESCALE);
        self.write(COMPARE, COMPARE_INTERVAL as u32);
        self.write(STATUS, STATUS_CAPTURE_FLAG);
        self.write(CTRL, CTRL_ENABLE | CTRL_RISING_EDGE);
    }

    /// Current value of the free-running counter.
    #[inline(always)]
    pub fn counter(&self) -> u16 {
        self.read(COUNT) as u16
    }

    /// Counter value latched at the most recent rising edge.
    #[inline(always)]
    pub fn latched(&self) -> u16 {
        self.read(CAPTURE) as u16
    }

    pub fn enable_interrupt(&self) {
        self.write(STATUS, STATUS_CAPTURE_FLAG);
        self.write(CTRL, self.read(CTRL) | CTRL_IRQ_ENABLE);
    }

    pub fn disable_interrupt(&self) {
        self.write(CTRL, self.read(CTRL) & !CTRL_IRQ_ENABLE);
    }

    /// Re-arms the compare register and clears the capture flag.
    #[inline(always)]
    pub fn acknowledge(&self) {
        let next = (self.read(COMPARE) as u16).wrapping_add(COMPARE_INTERVAL);
        self.write(COMPARE, next as u32);
        self.write(STATUS, STATUS_CAPTURE_FLAG);
    }
}
