//! The cooperative context switch (spec §4.1, §9 "coroutine control flow").
//!
//! Only callee-saved registers are carried across a switch: `rbx`, `rbp`,
//! `r12`-`r15`, plus the return address `call`/`ret` already manage for us.
//! A thread's entry point is never reached by passing it through these
//! registers — there is no `call` on the resuming side, only a `ret` into a
//! synthetic frame, so none of the usual argument registers can be trusted
//! to hold anything meaningful. Instead the seeded return address always
//! points at [`thread_trampoline`], which looks up the running thread's
//! entry point from its own TCB once it is actually executing on its own
//! stack.

use crate::arch::StackPointer;
use crate::sched;
use crate::signal::Signal;

core::arch::global_asm!(
    ".global tinyrt_switch",
    "tinyrt_switch:",
    "push rbp",
    "push rbx",
    "push r12",
    "push r13",
    "push r14",
    "push r15",
    "mov [rdi], rsp",
    "mov rsp, [rsi]",
    "pop r15",
    "pop r14",
    "pop r13",
    "pop r12",
    "pop rbx",
    "pop rbp",
    "ret",
);

extern "C" {
    fn tinyrt_switch(save_into: *mut usize, load_from: *const usize);
}

/// Number of callee-saved registers `tinyrt_switch` pushes/pops, in bytes.
const SEEDED_FRAME_WORDS: usize = 7; // rbp, rbx, r12, r13, r14, r15, return address

pub unsafe fn switch(save_into: *mut StackPointer, load_from: *const StackPointer) {
    tinyrt_switch(save_into.cast::<usize>(), load_from.cast::<usize>());
}

/// Build a stack image that, once `switch` loads it, resumes execution at
/// [`thread_trampoline`] exactly as if `tinyrt_switch` were returning from a
/// call it made earlier — six zeroed callee-saved registers followed by the
/// trampoline's address.
pub unsafe fn seed_stack(stack_top: *mut u8) -> StackPointer {
    let words = stack_top.cast::<usize>().sub(SEEDED_FRAME_WORDS);
    // rbp, rbx, r12, r13, r14, r15 — zeroed, never inspected by the trampoline.
    for i in 0..SEEDED_FRAME_WORDS - 1 {
        words.add(i).write(0);
    }
    words
        .add(SEEDED_FRAME_WORDS - 1)
        .write(thread_trampoline as usize);
    StackPointer(words as usize)
}

/// Landing pad for every freshly-seeded thread. Runs with interrupts locked
/// (switch_now never unlocks until after the switch returns here), looks up
/// its own entry point, unlocks, and calls it. If the entry point returns,
/// the thread kills itself and parks on the ready ring until the scheduler
/// notices `READY` is clear and moves on — the same "keeps running until its
/// next yield" rule spec §5 gives self-kill in general.
extern "C" fn thread_trampoline() -> ! {
    let tid = sched::current_tid();
    let entry = sched::with_kernel(|k| k.tcb(tid).entry);
    crate::intlock::unlock();

    entry();

    let _ = sched::send_signal(tid, Signal::Kill);
    loop {
        sched::switch_now();
    }
}
