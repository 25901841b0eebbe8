//! Minimal PLIC access for hart 0 in machine mode.

use edgehist_common::mmio::{PLIC_BASE, PLIC_CLAIM_ADDR, PLIC_ENABLE_ADDR, PLIC_THRESHOLD_ADDR};

/// Routes `irq` to hart 0 at priority 1 with a zero threshold.
pub fn enable(irq: u32) {
    unsafe {
        ((PLIC_BASE + 4 * irq as usize) as *mut u32).write_volatile(1);

        let enable = (PLIC_ENABLE_ADDR + 4 * (irq as usize / 32)) as *mut u32;
        enable.write_volatile(enable.read_volatile() | 1 << (irq % 32));

        (PLIC_THRESHOLD_ADDR as *mut u32).write_volatile(0);
    }
}

/// Claims the highest-priority pending interrupt; 0 means none.
#[inline(always)]
pub fn claim() -> u32 {
    unsafe { (PLIC_CLAIM_ADDR as *const u32).read_volatile() }
}

#[inline(always)]
pub fn complete(irq: u32) {
    unsafe { (PLIC_CLAIM_ADDR as *mut u32).write_volatile(irq) }
}
