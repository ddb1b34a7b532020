//! The kernel context (spec §9: "implementers may prefer an explicit
//! context struct" over the reference firmware's module-scope globals).
//! Bundles the TCB pool, the paged heap, and the currently running tid —
//! the complete process-wide mutable state described in spec §5.

use crate::heap::Heap;
use crate::tcb::{Tcb, TcbPool, ThreadId, INIT_TID};

pub struct Kernel {
    pub pool: TcbPool,
    pub heap: Heap,
    pub current_tid: ThreadId,
}

impl Kernel {
    pub fn new() -> Self {
        Kernel { pool: TcbPool::new(), heap: Heap::new(), current_tid: INIT_TID }
    }

    pub fn tcb(&self, tid: ThreadId) -> &Tcb {
        self.pool.tcb(tid)
    }
}

impl Default for Kernel {
    fn default() -> Self {
        Self::new()
    }
}
