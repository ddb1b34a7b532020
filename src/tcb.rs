//! Thread control blocks and the fixed-size pool that owns them (spec §3,
//! §4.4's "TCB Pool" row). A slot is always in exactly one of: on the ready
//! ring, on the free ring, or linked into neither (sleeping) — spec
//! invariant 1.

use crate::arch::{self, StackPointer, ThreadEntry};
use crate::config::MAX_THREADS;
use crate::list::Ring;

pub type ThreadId = usize;

/// Reserved, immortal, accepts no signals (spec §3).
pub const INIT_TID: ThreadId = 0;

bitflags::bitflags! {
    /// Spec §3's status bitmask. `READY` and `SLEEP` are mutually exclusive
    /// and both imply `OCCUPY` — enforced by every transition in this
    /// module and in `signal.rs`, never by the bitflags type itself.
    #[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
    pub struct Status: u8 {
        const OCCUPY = 0b001;
        const READY  = 0b010;
        const SLEEP  = 0b100;
    }
}

/// One slot per user signal (spec §3, §4.5).
pub type UserHandler = fn();

#[derive(Clone, Copy)]
pub struct Tcb {
    pub tid: ThreadId,
    pub status: Status,
    pub name: &'static str,
    pub entry: ThreadEntry,
    pub sp: StackPointer,
    pub pending_signals: u8,
    pub handlers: [Option<UserHandler>; 4],
}

impl Tcb {
    const fn empty(tid: ThreadId) -> Self {
        Tcb {
            tid,
            status: Status::empty(),
            name: "",
            entry: no_entry,
            sp: StackPointer(0),
            pending_signals: 0,
            handlers: [None; 4],
        }
    }
}

extern "C" fn no_entry() {}

pub struct TcbPool {
    tcbs: [Tcb; MAX_THREADS],
    ready: Ring<MAX_THREADS>,
    free: Ring<MAX_THREADS>,
}

impl TcbPool {
    /// `_Sys_Scheduler_Init`: both rings empty, TCB array zeroed, every slot
    /// pushed onto the free ring in ascending tid order, each slot's own
    /// tid written into its `tid` field (spec §4.4 Bootstrap).
    pub fn new() -> Self {
        let mut tcbs = [Tcb::empty(0); MAX_THREADS];
        let mut free = Ring::new();
        // Push in descending order so repeated `push_front` leaves the free
        // ring in ascending tid order front-to-back.
        for tid in (0..MAX_THREADS).rev() {
            tcbs[tid] = Tcb::empty(tid);
            free.push_front(tid);
        }
        TcbPool { tcbs, ready: Ring::new(), free }
    }

    pub fn tcb(&self, tid: ThreadId) -> &Tcb {
        &self.tcbs[tid]
    }

    pub fn tcb_mut(&mut self, tid: ThreadId) -> &mut Tcb {
        &mut self.tcbs[tid]
    }

    pub fn is_occupied(&self, tid: ThreadId) -> bool {
        tid < MAX_THREADS && self.tcbs[tid].status.contains(Status::OCCUPY)
    }

    /// Pop the first free slot, if any.
    pub fn pop_free(&mut self) -> Option<ThreadId> {
        let tid = self.free.front()?;
        self.free.remove(tid);
        Some(tid)
    }

    fn push_free(&mut self, tid: ThreadId) {
        self.free.push_front(tid);
    }

    pub fn ready_is_empty(&self) -> bool {
        self.ready.is_empty()
    }

    pub fn ready_front(&self) -> Option<ThreadId> {
        self.ready.front()
    }

    /// `node`'s ready-ring successor, or `Ring::HEAD` if `node` is last.
    pub fn ready_next(&self, node: ThreadId) -> usize {
        self.ready.next(node)
    }

    pub const fn ready_head_sentinel() -> usize {
        Ring::<MAX_THREADS>::HEAD
    }

    pub fn push_ready_front(&mut self, tid: ThreadId) {
        self.ready.push_front(tid);
    }

    pub fn remove_ready(&mut self, tid: ThreadId) {
        self.ready.remove(tid);
    }

    /// `start_thread`: pop a free slot, mark it occupied, store its static
    /// identity, and seed its stack. Does not make it schedulable — callers
    /// must still call `set_ready` (spec §4.4).
    pub fn start_thread(
        &mut self,
        name: &'static str,
        entry: ThreadEntry,
        stack_top: *mut u8,
    ) -> Option<ThreadId> {
        let tid = self.pop_free()?;
        let sp = unsafe { arch::seed_stack(stack_top) };
        let tcb = &mut self.tcbs[tid];
        tcb.status = Status::OCCUPY;
        tcb.name = name;
        tcb.entry = entry;
        tcb.sp = sp;
        Some(tid)
    }

    /// `_Sys_Thread_Kill`: zero everything but `tid`, then return the slot
    /// to the free ring. Caller is responsible for the ring-membership
    /// bookkeeping (removing from the ready ring first if needed) and for
    /// freeing the victim's heap pages — see `signal.rs`.
    pub fn reset_and_free(&mut self, tid: ThreadId) {
        self.tcbs[tid] = Tcb::empty(tid);
        self.push_free(tid);
    }
}

impl Default for TcbPool {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    extern "C" fn dummy_entry() {}

    #[test]
    fn bootstrap_puts_every_slot_on_the_free_ring_in_ascending_order() {
        let mut pool = TcbPool::new();
        assert!(pool.ready_is_empty());
        for tid in 0..MAX_THREADS {
            assert_eq!(pool.pop_free(), Some(tid));
        }
        assert_eq!(pool.pop_free(), None);
    }

    #[test]
    fn start_thread_reserves_a_slot_without_making_it_ready() {
        let mut pool = TcbPool::new();
        let top = [0u8; 64];
        let tid = pool.start_thread("w", dummy_entry, top.as_ptr() as *mut u8).unwrap();
        assert!(pool.is_occupied(tid));
        assert!(!pool.tcb(tid).status.contains(Status::READY));
        assert!(pool.ready_is_empty());
    }

    #[test]
    fn start_thread_fails_when_free_ring_is_empty() {
        let mut pool = TcbPool::new();
        let top = [0u8; 64];
        for i in 0..MAX_THREADS {
            assert!(pool.start_thread("w", dummy_entry, top.as_ptr() as *mut u8).is_some(), "slot {i}");
        }
        assert!(pool.start_thread("w", dummy_entry, top.as_ptr() as *mut u8).is_none());
    }

    #[test]
    fn reset_and_free_preserves_tid_and_clears_everything_else() {
        let mut pool = TcbPool::new();
        let top = [0u8; 64];
        let tid = pool.start_thread("w", dummy_entry, top.as_ptr() as *mut u8).unwrap();
        pool.push_ready_front(tid);
        pool.tcb_mut(tid).status.insert(Status::READY);
        pool.tcb_mut(tid).pending_signals = 0b1111;

        pool.remove_ready(tid);
        pool.reset_and_free(tid);

        let tcb = pool.tcb(tid);
        assert_eq!(tcb.tid, tid);
        assert_eq!(tcb.status, Status::empty());
        assert_eq!(tcb.pending_signals, 0);
        assert_eq!(pool.pop_free(), Some(tid));
    }
}
