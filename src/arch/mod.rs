//! Platform contract (spec §4.1): everything the portable core needs from
//! the CPU and that it must never reach past.
//!
//! The core only ever calls the four free functions re-exported below. Each
//! one is a thin, documented seam; the actual register shuffling lives in
//! the concrete backend module and nowhere else in the crate.

#[cfg(target_arch = "x86_64")]
pub mod x86_64;

#[cfg(target_arch = "x86_64")]
pub use self::x86_64 as backend;

/// Opaque per-thread stack pointer. The core stores one of these per TCB and
/// never inspects its bits; only `arch::switch` and `arch::seed_stack` do.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(transparent)]
pub struct StackPointer(pub usize);

/// Disable interrupts globally. Must be safe to call when interrupts are
/// already disabled (idempotent), since the interrupt lock in [`crate::intlock`]
/// is the only code allowed to call this.
///
/// A no-op under `cfg(test)`: `cli` is a privileged instruction, and the
/// host unit test binary runs in ring 3, so [`crate::intlock`]'s tests can
/// exercise the depth counter without ever reaching the real backend.
pub fn ints_disable() {
    #[cfg(not(test))]
    backend::ints_disable();
}

/// Re-enable interrupts globally. Idempotent-safe for the same reason as
/// [`ints_disable`], and a no-op under `cfg(test)` for the same reason.
pub fn ints_enable() {
    #[cfg(not(test))]
    backend::ints_enable();
}

/// A thread's body. Takes no arguments and may return; a thread that
/// returns is treated as if it had sent itself `SIGKILL` (see
/// `arch::x86_64::context::thread_trampoline`).
pub type ThreadEntry = extern "C" fn();

/// Write a synthetic stack image for a brand-new thread such that a later
/// `switch(.., &that_thread.sp)` resumes execution at the thread's entry
/// point instead of returning into whatever called `switch`.
///
/// # Safety
/// `stack_top` must point one-past-the-end of a stack region at least large
/// enough for one seeded frame, exclusively owned by the caller until the
/// thread using it is killed.
pub unsafe fn seed_stack(stack_top: *mut u8) -> StackPointer {
    backend::seed_stack(stack_top)
}

/// The cooperative context switch. Snapshots the caller's machine stack
/// pointer into `*save_into`, loads `*load_from` into the machine stack
/// pointer, and returns — on the new thread's stack, at whatever point it
/// last called `switch` from, or at its seeded entry trampoline if this is
/// its first run.
///
/// This is the one genuinely unsafe primitive in the crate: it is a single
/// hand-written routine rather than two independently callable "save" and
/// "load" steps, because splitting a stack-pointer swap across ordinary
/// Rust function-call boundaries is not something the language's calling
/// convention guarantees survives (see SPEC_FULL.md §4.1).
///
/// # Safety
/// Both pointers must refer to live `StackPointer` slots belonging to
/// occupied TCBs; `*load_from` must have been produced by `seed_stack` or by
/// a previous `switch` that saved into it.
pub unsafe fn switch(save_into: *mut StackPointer, load_from: *const StackPointer) {
    backend::switch(save_into, load_from)
}
