//! Polled UART console for the measurement prompt and reports.
//!
//! Drives the NS16550A at `UART0_BASE` without interrupts: transmit waits for
//! the holding register to empty, receive waits for a byte to arrive. Only
//! the main flow touches the console; the capture interrupt never prints.

use core::fmt;
use edgehist_common::mmio::UART0_BASE;

/// Receive buffer / transmit holding register (DLAB = 0).
const RBR_THR: usize = 0;
/// Divisor latch high byte (DLAB = 1) / interrupt enable (DLAB = 0).
const DLM_IER: usize = 1;
/// FIFO control register.
const FCR: usize = 2;
/// Line control register.
const LCR: usize = 3;
/// Line status register.
const LSR: usize = 5;

const LSR_DATA_READY: u8 = 0x01;
const LSR_THR_EMPTY: u8 = 0x20;

/// UART input clock on the QEMU 'virt' machine.
const UART_CLOCK_HZ: u32 = 1_843_200;
const BAUD_RATE: u32 = 9600;

#[inline(always)]
fn reg(offset: usize) -> *mut u8 {
    (UART0_BASE + offset) as *mut u8
}

/// Programs the UART for 8N1 at 9600 baud with FIFOs enabled.
///
/// Divisor = UART clock / (16 * baud).
pub fn init() {
    let divisor = (UART_CLOCK_HZ / (16 * BAUD_RATE)) as u16;
    unsafe {
        reg(DLM_IER).write_volatile(0x00);
        reg(LCR).write_volatile(0x80);
        reg(RBR_THR).write_volatile(divisor as u8);
        reg(DLM_IER).write_volatile((divisor >> 8) as u8);
        reg(LCR).write_volatile(0x03);
        reg(FCR).write_volatile(0x07);
    }
}

/// Blocks until the transmitter can take a byte, then sends it.
pub fn put_char(byte: u8) {
    unsafe {
        while reg(LSR).read_volatile() & LSR_THR_EMPTY == 0 {
            core::hint::spin_loop();
        }
        reg(RBR_THR).write_volatile(byte);
    }
}

/// Blocks until a byte is received and returns it.
pub fn get_char() -> u8 {
    unsafe {
        while reg(LSR).read_volatile() & LSR_DATA_READY == 0 {
            core::hint::spin_loop();
        }
        reg(RBR_THR).read_volatile()
    }
}

/// UART handle for formatted output.
///
/// Converts '\n' to "\r\n" for serial terminals.
pub struct Uart;

impl fmt::Write for Uart {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for c in s.bytes() {
            if c == b'\n' {
                put_char(b'\r');
            }
            put_char(c);
        }
        Ok(())
    }
}

#[doc(hidden)]
pub fn _print(args: fmt::Arguments) {
    use fmt::Write;
    let _ = Uart.write_fmt(args);
}

#[macro_export]
macro_rules! print {
    ($($arg:tt)*) => ({
        $crate::console::_print(format_args!($($arg)*));
    });
}

/// Prints a line to the console.
///
/// ```ignore
/// println!("Minimum value: {}", 975);
/// ```
#[macro_export]
macro_rules! println {
    ($($arg:tt)*) => ({
        $crate::console::_print(format_args!($($arg)*));
        $crate::console::_print(format_args!("\n"));
    });
}
pub use print;
pub use println;
