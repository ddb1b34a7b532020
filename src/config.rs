//! Compile-time configuration surface (spec §6).
//!
//! Every constant here mirrors a `#define` in the reference kernel's
//! `sysconfig.h`, scaled from 8051 byte counts to sizes a hosted x86_64
//! stack frame actually needs. `HEAP_SIZE`/`HEAP_PAGES` keep the reference
//! ratio (`PAGE_SIZE = HEAP_SIZE / HEAP_PAGES`, integer division, spec §6).

/// Upper bound on live threads, including thread 0. `sysconfig.h`'s default.
pub const MAX_THREADS: usize = 3;

/// Bytes reserved for the init thread's kernel stack.
pub const KERNEL_STACK_SIZE: usize = 4096;

/// Per-thread app stack sizes, mirroring `sysconfig.h`'s
/// `App_Stack_1_Size`/`App_Stack_2_Size` — each demo thread gets its own
/// named knob rather than sharing one constant.
pub const APP_STACK_1_SIZE: usize = 4096;
pub const APP_STACK_2_SIZE: usize = 4096;

/// IST slot used for the double-fault handler's own stack (see
/// `arch::x86_64::gdt`).
pub const DOUBLE_FAULT_IST_INDEX: u16 = 0;

/// Bytes reserved for the double-fault handler's stack — a multiple of the
/// ordinary kernel stack so a kernel-stack overflow can never itself
/// exhaust the fault handler's own stack.
pub const DOUBLE_FAULT_STACK_SIZE: usize = KERNEL_STACK_SIZE * 5;

/// Total heap bytes. `sysconfig.h`'s `DMEM_SIZE`.
pub const HEAP_SIZE: usize = 800;

/// Number of fixed-size pages the heap is divided into. `sysconfig.h`'s
/// `DMEM_PAGES`.
pub const HEAP_PAGES: usize = 40;

/// Derived: bytes per page. Must divide evenly — the reference
/// configuration (800 / 40 = 20) does.
pub const PAGE_SIZE: usize = HEAP_SIZE / HEAP_PAGES;

const _: () = assert!(HEAP_SIZE % HEAP_PAGES == 0, "HEAP_SIZE must be a multiple of HEAP_PAGES");

/// Informational upper bound on nested `intlock::lock()` calls. The depth
/// counter itself has no ceiling; this only documents what the reference
/// firmware assumed implementers would stay under.
pub const MAX_STACK_DEPTH: usize = 10;
