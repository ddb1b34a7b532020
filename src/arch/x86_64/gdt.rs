//! Global Descriptor Table and Task State Segment.
//!
//! The kernel never switches privilege rings and never runs user code, so
//! the GDT here exists for one reason: loading a TSS with a dedicated
//! Interrupt Stack Table entry for the double-fault handler. Without it, an
//! app thread that overflows its own stack (spec §6's per-thread
//! `APP_STACK_n_SIZE`, or the init thread overflowing `KERNEL_STACK_SIZE`)
//! turns a page fault into a silent triple fault instead of something
//! `interrupts::double_fault_handler` can log. The fault stack's own size is
//! `config::DOUBLE_FAULT_STACK_SIZE`, deliberately sized off
//! `KERNEL_STACK_SIZE` rather than a bare literal so the two scale together.

use spin::Once;
use x86_64::structures::gdt::{Descriptor, GlobalDescriptorTable, SegmentSelector};
use x86_64::structures::tss::TaskStateSegment;
use x86_64::VirtAddr;

use crate::config::{DOUBLE_FAULT_IST_INDEX, DOUBLE_FAULT_STACK_SIZE};

#[repr(align(16))]
struct Stack(#[allow(dead_code)] [u8; DOUBLE_FAULT_STACK_SIZE]);

static mut DOUBLE_FAULT_STACK: Stack = Stack([0; DOUBLE_FAULT_STACK_SIZE]);

static TSS: Once<TaskStateSegment> = Once::new();
static GDT: Once<(GlobalDescriptorTable, Selectors)> = Once::new();

struct Selectors {
    code_selector: SegmentSelector,
    tss_selector: SegmentSelector,
}

pub fn init() {
    let tss = TSS.call_once(|| {
        let mut tss = TaskStateSegment::new();
        tss.interrupt_stack_table[DOUBLE_FAULT_IST_INDEX as usize] = {
            let stack_start = VirtAddr::from_ptr(&raw const DOUBLE_FAULT_STACK);
            stack_start + DOUBLE_FAULT_STACK_SIZE as u64
        };
        tss
    });

    let (gdt, selectors) = GDT.call_once(|| {
        let mut gdt = GlobalDescriptorTable::new();
        let code_selector = gdt.append(Descriptor::kernel_code_segment());
        let tss_selector = gdt.append(Descriptor::tss_segment(tss));
        (gdt, Selectors { code_selector, tss_selector })
    });

    gdt.load();

    unsafe {
        use x86_64::instructions::segmentation::{Segment, CS};
        use x86_64::instructions::tables::load_tss;
        CS::set_reg(selectors.code_selector);
        load_tss(selectors.tss_selector);
    }
}
