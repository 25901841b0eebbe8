//! RISC-V trap and interrupt handling.
//!
//! Machine external interrupts are claimed from the PLIC. A capture-unit
//! interrupt hands the latched timestamp to the shared capture buffer and
//! masks itself once the buffer is full. Exceptions are fatal.

use crate::CAPTURE;
use crate::drivers::capture_unit::CAPTURE_UNIT;
use crate::drivers::plic;
use core::sync::atomic::{AtomicU32, Ordering};
use edgehist_common::mmio::CAPTURE_IRQ;
use edgehist_core::capture::EdgeOutcome;
use riscv::register::{mcause, mepc, mie, mstatus};

/// mcause code for a machine external interrupt.
const MACHINE_EXTERNAL: usize = 11;

/// Edges the capture buffer refused since boot.
pub static REJECTED_EDGES: AtomicU32 = AtomicU32::new(0);

/// Unmasks machine external interrupts globally.
pub fn enable_interrupts() {
    unsafe {
        mie::set_mext();
        mstatus::set_mie();
    }
}

/// Trap handler called from the assembly trap vector.
///
/// Runs with interrupts disabled. Must not print: the console belongs to the
/// main flow.
#[unsafe(no_mangle)]
pub extern "C" fn rust_trap_handler() {
    let cause = mcause::read();

    if cause.is_interrupt() && cause.code() == MACHINE_EXTERNAL {
        let irq = plic::claim();
        if irq == CAPTURE_IRQ {
            on_capture();
        }
        if irq != 0 {
            plic::complete(irq);
        }
        return;
    }

    panic!(
        "unhandled trap: mcause={:#x} mepc={:#x}",
        cause.bits(),
        mepc::read()
    );
}

fn on_capture() {
    let timestamp = CAPTURE_UNIT.latched();
    CAPTURE_UNIT.acknowledge();

    match CAPTURE.record(timestamp) {
        Ok(EdgeOutcome::Recorded) => {}
        Ok(EdgeOutcome::Filled) => CAPTURE_UNIT.disable_interrupt(),
        Err(_) => {
            REJECTED_EDGES.fetch_add(1, Ordering::Relaxed);
            CAPTURE_UNIT.disable_interrupt();
        }
    }
}
