//! The scheduler (spec §4.4): carousel successor selection, the singleton
//! kernel context, and the one true yield point, `switch_now`.

use core::mem::MaybeUninit;
use core::sync::atomic::{AtomicBool, Ordering};

use crate::arch::{self, ThreadEntry, StackPointer};
use crate::config::MAX_THREADS;
use crate::error::{KernelError, KernelResult};
use crate::heap::HeapPtr;
use crate::intlock;
use crate::kernel::Kernel;
use crate::signal::{self, Signal};
use crate::tcb::{Status, ThreadId};

static mut KERNEL: MaybeUninit<Kernel> = MaybeUninit::uninit();
static KERNEL_READY: AtomicBool = AtomicBool::new(false);

/// Install the singleton kernel context. Called once, from `boot()`, before
/// any other function in this module runs.
pub fn install(kernel: Kernel) {
    unsafe {
        (*core::ptr::addr_of_mut!(KERNEL)).write(kernel);
    }
    KERNEL_READY.store(true, Ordering::Release);
}

/// Safe only because the kernel's own concurrency model guarantees exactly
/// one flow of control touches this state at a time: thread code runs with
/// no preemption, and the interrupt lock excludes asynchronous interrupt
/// handlers for the window in which it matters (spec §5, §9).
fn kernel_mut() -> &'static mut Kernel {
    debug_assert!(KERNEL_READY.load(Ordering::Acquire), "kernel singleton used before install()");
    unsafe { (*core::ptr::addr_of_mut!(KERNEL)).assume_init_mut() }
}

pub fn with_kernel<T>(f: impl FnOnce(&mut Kernel) -> T) -> T {
    f(kernel_mut())
}

pub fn current_tid() -> ThreadId {
    with_kernel(|k| k.current_tid)
}

/// `start_thread`: AUTO_TID is the only legal request (spec §4.4), modeled
/// here by simply not accepting a tid parameter at all — there is no value
/// a caller could supply that would ever be honored.
pub fn start_thread(name: &'static str, entry: ThreadEntry, stack_top: *mut u8) -> KernelResult<ThreadId> {
    with_kernel(|k| {
        let _guard = intlock::IrqLock::acquire();
        k.pool
            .start_thread(name, entry, stack_top)
            .ok_or(KernelError::ResourceExhausted)
    })
}

/// `set_ready`: requires `OCCUPY`, rejects already-`READY` or `SLEEP`. Pure
/// logic split out from the singleton wrapper below so it is testable
/// without the global kernel context.
fn set_ready_on(pool: &mut crate::tcb::TcbPool, tid: ThreadId) -> KernelResult<()> {
    if tid >= MAX_THREADS {
        return Err(KernelError::InvalidArgument);
    }
    let status = pool.tcb(tid).status;
    if !status.contains(Status::OCCUPY) || status.intersects(Status::READY | Status::SLEEP) {
        return Err(KernelError::StateViolation);
    }
    pool.tcb_mut(tid).status.insert(Status::READY);
    pool.push_ready_front(tid);
    Ok(())
}

pub fn set_ready(tid: ThreadId) -> KernelResult<()> {
    with_kernel(|k| {
        let _guard = intlock::IrqLock::acquire();
        set_ready_on(&mut k.pool, tid)
    })
}

pub fn send_signal(tid: ThreadId, signal: Signal) -> KernelResult<()> {
    with_kernel(|k| {
        let _guard = intlock::IrqLock::acquire();
        signal::send_signal(&mut k.pool, &mut k.heap, tid, signal)
    })
}

pub fn register_handler(
    tid: ThreadId,
    signal: Signal,
    handler: crate::tcb::UserHandler,
) -> KernelResult<()> {
    with_kernel(|k| {
        let _guard = intlock::IrqLock::acquire();
        signal::register_handler(&mut k.pool, tid, signal, handler)
    })
}

/// `malloc`: the kernel's external heap API is always scoped to whichever
/// thread is currently running (spec §6), mirroring the reference
/// firmware's thin `Sys_Malloc` wrapper over `__Sys_Malloc(Current_TID, ..)`
/// — callers never get to name a tid other than their own.
pub fn malloc(size: usize) -> Option<HeapPtr> {
    with_kernel(|k| {
        let tid = k.current_tid;
        k.heap.malloc(tid, size)
    })
}

/// `free`: same current-tid scoping as `malloc`.
pub fn free(ptr: HeapPtr) -> KernelResult<()> {
    with_kernel(|k| {
        let tid = k.current_tid;
        k.heap.free(tid, ptr)
    })
}

/// `free_all`: frees every page the current thread owns.
pub fn free_all() {
    with_kernel(|k| {
        let tid = k.current_tid;
        k.heap.free_all(tid);
    })
}

/// The successor-selection rule (spec §4.4 step 2), pulled out as pure
/// logic so it is testable without a real stack switch.
pub fn pick_successor(pool: &crate::tcb::TcbPool, current: ThreadId) -> ThreadId {
    let head = crate::tcb::TcbPool::ready_head_sentinel();
    if !pool.tcb(current).status.contains(Status::READY) {
        return pool.ready_front().expect("ready ring must never be empty");
    }
    let next = pool.ready_next(current);
    if next == head {
        pool.ready_front().expect("ready ring must never be empty")
    } else {
        next
    }
}

/// The only scheduling point (spec §4.4). Runs entirely under the interrupt
/// lock up to the stack switch itself; the matching unlock executes
/// whenever this same call site is next resumed, which may be long after
/// control left this thread (spec §9's single process-wide lock depth).
pub fn switch_now() {
    intlock::lock();
    let (save_into, load_from): (*mut StackPointer, *const StackPointer) = with_kernel(|k| {
        let successor = pick_successor(&k.pool, k.current_tid);
        let outgoing = k.current_tid;
        k.current_tid = successor;
        signal::dispatch_pending(&mut k.pool, successor);
        (
            &mut k.pool.tcb_mut(outgoing).sp as *mut StackPointer,
            &k.pool.tcb(successor).sp as *const StackPointer,
        )
    });
    unsafe { arch::switch(save_into, load_from) };
    intlock::unlock();
}

/// Per-thread stack storage for the demo/boot thread set (spec §4.7's
/// ambient row). Sized per instance rather than from one shared constant,
/// matching `sysconfig.h`'s `App_Stack_1_Size`/`App_Stack_2_Size` knobs —
/// see `config::APP_STACK_1_SIZE`/`APP_STACK_2_SIZE`.
#[repr(align(16))]
pub struct ThreadStack<const SIZE: usize>([u8; SIZE]);

impl<const SIZE: usize> ThreadStack<SIZE> {
    pub const fn new() -> Self {
        ThreadStack([0; SIZE])
    }

    pub fn top(&mut self) -> *mut u8 {
        unsafe { self.0.as_mut_ptr().add(SIZE) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tcb::TcbPool;

    fn ready(pool: &mut TcbPool, tid: ThreadId) {
        pool.tcb_mut(tid).status.insert(Status::READY);
        pool.push_ready_front(tid);
    }

    #[test]
    fn carousel_order_wraps_around_the_ring() {
        let mut pool = TcbPool::new();
        // Front-to-back after these pushes: 0, 1, 2 (each push_front moves
        // to the front, so push in reverse of desired order).
        ready(&mut pool, 2);
        ready(&mut pool, 1);
        ready(&mut pool, 0);

        assert_eq!(pick_successor(&pool, 0), 1);
        assert_eq!(pick_successor(&pool, 1), 2);
        assert_eq!(pick_successor(&pool, 2), 0);
    }

    #[test]
    fn thread_that_cleared_ready_is_sent_to_ring_head() {
        let mut pool = TcbPool::new();
        ready(&mut pool, 1);
        ready(&mut pool, 0);
        // Thread 0 is "current" but no longer READY (e.g. it just slept).
        pool.tcb_mut(0).status.remove(Status::READY);
        assert_eq!(pick_successor(&pool, 0), pool.ready_front().unwrap());
    }

    #[test]
    fn set_ready_rejects_non_occupied_slot() {
        let mut pool = TcbPool::new();
        assert_eq!(set_ready_on(&mut pool, 1), Err(KernelError::StateViolation));
    }

    #[test]
    fn set_ready_rejects_already_ready_slot() {
        let mut pool = TcbPool::new();
        let _ = pool.pop_free();
        let top = [0u8; 64];
        let tid = pool.start_thread("t", dummy_entry, top.as_ptr() as *mut u8).unwrap();
        set_ready_on(&mut pool, tid).unwrap();
        assert_eq!(set_ready_on(&mut pool, tid), Err(KernelError::StateViolation));
    }

    extern "C" fn dummy_entry() {}
}
