#![no_std]
#![no_main]
#![feature(generic_const_exprs)]
#![allow(incomplete_features)]

use core::sync::atomic::Ordering;
use edgehist_common::histogram::{BUCKET_MIN, MAX_PAUSE_LINES, NUM_BUCKETS, NUM_READINGS};
use edgehist_common::mmio::{CAPTURE_IRQ, MTIME_ADDR, TEST_FINISHER_ADDR};
use edgehist_core::capture::CaptureBuffer;
use edgehist_core::report;
use edgehist_core::session::Session;

mod console;
mod drivers;
mod trap;

use drivers::capture_unit::CAPTURE_UNIT;

/// Raw edge timestamps, written by the capture interrupt and read by `kmain`.
pub static CAPTURE: CaptureBuffer<{ NUM_READINGS + 1 }> = CaptureBuffer::new();

use core::arch::global_asm;
global_asm!(include_str!("entry.S"));

type MeasurementSession = Session<'static, NUM_READINGS, NUM_BUCKETS>;

fn mtime() -> u64 {
    unsafe { (MTIME_ADDR as *const u64).read_volatile() }
}

#[unsafe(no_mangle)]
pub extern "C" fn kmain() -> ! {
    console::init();
    CAPTURE_UNIT.init();
    drivers::plic::enable(CAPTURE_IRQ);
    trap::enable_interrupts();

    if !post_timer() {
        console::println!("Timer Failed to Initialize Properly.");
        halt();
    }

    print_project_header();

    let mut session = MeasurementSession::new(&CAPTURE, BUCKET_MIN);
    loop {
        console::print!("Press any key to begin measurement> ");
        let _ = console::get_char();
        console::println!("");

        console::println!("Reading Values...");
        session.start_session();
        CAPTURE_UNIT.enable_interrupt();

        // Unbounded, like the bench setup: no edges means no report.
        if let Err(e) = session.wait_for_completion(&mtime, None) {
            CAPTURE_UNIT.disable_interrupt();
            session.abort_session();
            console::println!("Measurement aborted: {}", e);
            continue;
        }

        console::print!("Press a key to continue> ");
        let _ = console::get_char();
        console::println!("");

        if let Err(e) = session.compute_results() {
            console::println!("Measurement failed: {}", e);
            continue;
        }

        print_report(&session);
        session.clear_histogram();

        let rejected = trap::REJECTED_EDGES.swap(0, Ordering::Relaxed);
        if rejected > 0 {
            console::println!("Rejected edges: {}", rejected);
        }
    }
}

/// Checks that the capture counter advances across a short busy wait.
fn post_timer() -> bool {
    if cfg!(feature = "no_post") {
        return true;
    }
    let before = CAPTURE_UNIT.counter();
    for _ in 0..1000 {
        core::hint::spin_loop();
    }
    before != CAPTURE_UNIT.counter()
}

fn print_project_header() {
    console::println!("|=========================================================|");
    console::println!("| Project:\tWave Period Histogram");
    console::println!("| Readings:\t{} per session", NUM_READINGS);
    console::println!(
        "| Range:\t[{}, {}) us",
        BUCKET_MIN,
        BUCKET_MIN as usize + NUM_BUCKETS
    );
    console::println!("| Description:\tDisplays the distribution of periods measured");
    console::println!("|\t\ton the capture input.");
    console::println!("|=========================================================|");
}

/// Prints the session report, pausing for a key press every `MAX_PAUSE_LINES` buckets.
fn print_report(session: &MeasurementSession) {
    let view = session.report();
    let mut uart = console::Uart;

    let _ = report::write_heading(&mut uart);
    let mut lines = 0;
    for (lower_bound, count) in view.entries() {
        let _ = report::write_entry(&mut uart, lower_bound, count);
        lines += 1;
        if MAX_PAUSE_LINES != 0 && lines == MAX_PAUSE_LINES {
            let _ = console::get_char();
            lines = 0;
        }
    }
    let _ = view.write_summary(&mut uart);
}

fn halt() -> ! {
    loop {
        unsafe { riscv::asm::wfi() };
    }
}

#[panic_handler]
fn panic(info: &core::panic::PanicInfo) -> ! {
    console::println!("PANIC: {}", info);
    unsafe {
        (TEST_FINISHER_ADDR as *mut u32).write_volatile(0x5555);
    }
    halt();
}
