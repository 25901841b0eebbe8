//! Common definitions and constants shared across the edge histogram system.
//!
//! This crate provides memory-mapped I/O addresses for the firmware's
//! peripherals, the timer configuration that fixes the unit of every captured
//! timestamp, and the histogram geometry used by firmware and host tools alike.

#![no_std]

// Memory-mapped I/O address space definitions for the system-on-chip.
//
// Defines the physical address layout for the UART, the interrupt
// controllers and the input-capture unit on the QEMU 'virt' machine. These
// addresses must match the machine's device tree and are only dereferenced
// by firmware drivers.
pub mod mmio {
    /// Base address of the NS16550A UART in the QEMU 'virt' machine.
    ///
    /// Register offsets follow the 16550 layout: receive/transmit holding
    /// register at +0, line control at +3, line status at +5.
    pub const UART0_BASE: usize = 0x1000_0000;

    /// QEMU 'virt' test finisher; writing 0x5555 powers the machine off.
    pub const TEST_FINISHER_ADDR: usize = 0x10_0000;

    /// Base address of the CLINT (Core Local Interruptor) in QEMU 'virt' machine.
    pub const CLINT_BASE: usize = 0x200_0000;

    /// Memory-mapped address for the machine timer compare register of hart 0.
    pub const MTIMECMP_ADDR: usize = CLINT_BASE + 0x4000;

    /// Memory-mapped address for the 64-bit machine timer counter.
    ///
    /// Increments at 10 MHz on QEMU. The firmware uses it as the tick source
    /// for completion timeouts, never as a capture timestamp.
    pub const MTIME_ADDR: usize = CLINT_BASE + 0xBFF8;

    /// Base address of the PLIC (Platform-Level Interrupt Controller).
    pub const PLIC_BASE: usize = 0x0C00_0000;

    /// PLIC machine-mode enable bits for hart 0 context.
    pub const PLIC_ENABLE_ADDR: usize = PLIC_BASE + 0x2000;

    /// PLIC machine-mode priority threshold for hart 0 context.
    pub const PLIC_THRESHOLD_ADDR: usize = PLIC_BASE + 0x20_0000;

    /// PLIC machine-mode claim/complete register for hart 0 context.
    pub const PLIC_CLAIM_ADDR: usize = PLIC_BASE + 0x20_0004;

    /// Base address of the 16-bit input-capture timer unit.
    ///
    /// The unit latches its free-running counter on every rising edge of the
    /// monitored input and raises an interrupt on `CAPTURE_IRQ`.
    pub const CAPTURE_UNIT_BASE: usize = 0x4000_0000;

    /// PLIC interrupt source wired to the capture unit.
    pub const CAPTURE_IRQ: u32 = 32;

    /// Base address of high RAM region.
    pub const RAM_BASE: usize = 0x8000_0000;
}

/// Timer configuration for the input-capture unit.
///
/// The capture counter runs at the bus clock divided by the prescaler. With a
/// 2 MHz bus and a prescaler of 2 one count is one microsecond, so every
/// period the pipeline produces is already expressed in microseconds.
pub mod timer {
    /// Bus clock feeding the capture unit, in Hz.
    pub const BUS_CLK_HZ: u32 = 2_000_000;

    /// Prescaler applied to the bus clock.
    pub const PRESCALE: u32 = 2;

    /// Resulting capture counter frequency, in Hz.
    pub const TIMER_HZ: u32 = BUS_CLK_HZ / PRESCALE;

    /// Output-compare toggle frequency, in Hz.
    pub const OC_FREQ_HZ: u32 = 10;

    /// Interval added to the compare register on every capture interrupt.
    ///
    /// Half of the output-compare period, since the output toggles twice per
    /// cycle.
    pub const COMPARE_INTERVAL: u16 = ((TIMER_HZ / 2) / OC_FREQ_HZ) as u16;

    /// Number of counter bits; periods are computed modulo `1 << TIMER_BITS`.
    pub const TIMER_BITS: u32 = 16;
}

/// Histogram geometry for a measurement session.
pub mod histogram {
    /// Number of inter-arrival periods measured per session.
    ///
    /// The capture buffer holds one more raw timestamp than this, since N
    /// periods need N+1 edges.
    pub const NUM_READINGS: usize = 1000;

    /// Lowest period, in microseconds, that falls into the histogram.
    pub const BUCKET_MIN: u16 = 950;

    /// First period, in microseconds, past the end of the histogram.
    pub const BUCKET_MAX: u16 = 1050;

    /// One bucket per microsecond in `[BUCKET_MIN, BUCKET_MAX)`.
    pub const NUM_BUCKETS: usize = (BUCKET_MAX - BUCKET_MIN) as usize;

    /// Report lines printed before pausing for a key press. Zero disables pausing.
    pub const MAX_PAUSE_LINES: usize = 1;
}
