//! Interrupt Descriptor Table.
//!
//! A tickless cooperative kernel has exactly one reason to touch the IDT:
//! surviving CPU exceptions during development. There is no timer vector,
//! no PIC remapping, and no device IRQs here — `ints_disable`/`ints_enable`
//! (spec §4.1) only ever mask the exceptions and external interrupts that
//! already exist; this kernel never asks the interrupt controller to
//! deliver anything on its own.

use crate::config::DOUBLE_FAULT_IST_INDEX;
use x86_64::structures::idt::{InterruptDescriptorTable, InterruptStackFrame, PageFaultErrorCode};

static IDT: spin::Once<InterruptDescriptorTable> = spin::Once::new();

pub fn init() {
    let idt = IDT.call_once(|| {
        let mut idt = InterruptDescriptorTable::new();
        idt.breakpoint.set_handler_fn(breakpoint_handler);
        unsafe {
            idt.double_fault
                .set_handler_fn(double_fault_handler)
                .set_stack_index(DOUBLE_FAULT_IST_INDEX);
        }
        idt.page_fault.set_handler_fn(page_fault_handler);
        idt
    });
    idt.load();
}

extern "x86-interrupt" fn breakpoint_handler(stack_frame: InterruptStackFrame) {
    log::warn!("breakpoint\n{:#?}", stack_frame);
}

extern "x86-interrupt" fn double_fault_handler(
    stack_frame: InterruptStackFrame,
    _error_code: u64,
) -> ! {
    panic!("double fault\n{:#?}", stack_frame);
}

extern "x86-interrupt" fn page_fault_handler(
    stack_frame: InterruptStackFrame,
    error_code: PageFaultErrorCode,
) {
    use x86_64::registers::control::Cr2;

    log::error!(
        "page fault at {:?}, error {:?}\n{:#?}",
        Cr2::read(),
        error_code,
        stack_frame
    );
    crate::hlt_loop();
}
