//! The signal engine (spec §4.5): three control signals acted on
//! immediately at `send_signal`, four user signals deferred to the next
//! `switch_now` and dispatched in fixed order.

use crate::error::{KernelError, KernelResult};
use crate::heap::Heap;
use crate::tcb::{Status, TcbPool, ThreadId, UserHandler, INIT_TID};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Signal {
    Kill,
    Sleep,
    Wake,
    Usr1,
    Usr2,
    Usr3,
    Usr4,
}

/// Fixed dispatch order for deferred user signals (spec §4.5).
const USER_SIGNALS: [Signal; 4] = [Signal::Usr1, Signal::Usr2, Signal::Usr3, Signal::Usr4];

fn user_bit(signal: Signal) -> Option<u8> {
    match signal {
        Signal::Usr1 => Some(0b0001),
        Signal::Usr2 => Some(0b0010),
        Signal::Usr3 => Some(0b0100),
        Signal::Usr4 => Some(0b1000),
        _ => None,
    }
}

fn handler_slot(signal: Signal) -> Option<usize> {
    match signal {
        Signal::Usr1 => Some(0),
        Signal::Usr2 => Some(1),
        Signal::Usr3 => Some(2),
        Signal::Usr4 => Some(3),
        _ => None,
    }
}

/// `send_signal`: reject any signal directed at thread 0 uniformly — the
/// reference kernel leaves this ambiguous (spec §9); this crate picks the
/// conservative reading since thread 0 is immortal and has no legitimate
/// receiver-side behavior to trigger.
pub fn send_signal(
    pool: &mut TcbPool,
    heap: &mut Heap,
    tid: ThreadId,
    signal: Signal,
) -> KernelResult<()> {
    if tid >= crate::config::MAX_THREADS || !pool.is_occupied(tid) {
        return Err(KernelError::InvalidArgument);
    }
    if tid == INIT_TID {
        return Err(KernelError::InvalidArgument);
    }

    match signal {
        Signal::Kill => kill_now(pool, heap, tid),
        Signal::Sleep => {
            // Spec's literal guard is "if not already SLEEP", not "if
            // READY" — a thread that was only ever `start_thread`'d and
            // never `set_ready`'d (OCCUPY only) must still transition.
            let status = pool.tcb(tid).status;
            if !status.contains(Status::SLEEP) {
                if status.contains(Status::READY) {
                    pool.remove_ready(tid);
                }
                let tcb = pool.tcb_mut(tid);
                tcb.status.remove(Status::READY);
                tcb.status.insert(Status::SLEEP);
            }
            // Already asleep: idempotent no-op.
            Ok(())
        }
        Signal::Wake => {
            let tcb = pool.tcb_mut(tid);
            if tcb.status.contains(Status::SLEEP) {
                tcb.status.remove(Status::SLEEP);
                tcb.status.insert(Status::READY);
                pool.push_ready_front(tid);
            }
            Ok(())
        }
        user @ (Signal::Usr1 | Signal::Usr2 | Signal::Usr3 | Signal::Usr4) => {
            let bit = user_bit(user).unwrap();
            pool.tcb_mut(tid).pending_signals |= bit;
            Ok(())
        }
    }
}

/// `_Sys_Thread_Kill`, executed in-line rather than deferred: unlink from
/// whichever ring currently holds the victim (if any), free its heap pages,
/// zero the TCB, and return the slot to the free ring.
fn kill_now(pool: &mut TcbPool, heap: &mut Heap, tid: ThreadId) -> KernelResult<()> {
    if pool.tcb(tid).status.contains(Status::READY) {
        pool.remove_ready(tid);
    }
    heap.free_all(tid);
    pool.reset_and_free(tid);
    Ok(())
}

/// `register_handler`: only the four user signals have a handler slot.
/// Rejects thread 0 unconditionally, same as `send_signal` — there is no
/// ambiguity to resolve here (spec's requirement lists `tid==0` as always
/// rejected, unlike `send_signal`'s open question).
pub fn register_handler(
    pool: &mut TcbPool,
    tid: ThreadId,
    signal: Signal,
    handler: UserHandler,
) -> KernelResult<()> {
    if tid >= crate::config::MAX_THREADS || !pool.is_occupied(tid) {
        return Err(KernelError::InvalidArgument);
    }
    if tid == INIT_TID {
        return Err(KernelError::InvalidArgument);
    }
    let slot = handler_slot(signal).ok_or(KernelError::InvalidArgument)?;
    pool.tcb_mut(tid).handlers[slot] = Some(handler);
    Ok(())
}

/// Run `tid`'s pending user-signal handlers, in fixed order, on the
/// caller's own stack. Called from `switch_now` for the thread about to
/// become current — the new successor, not the one yielding — *before* the
/// stack pointer is swapped (spec §4.4 step 4, §4.5's ordering note); a
/// handler with no registered function still has its bit cleared.
pub fn dispatch_pending(pool: &mut TcbPool, tid: ThreadId) {
    let pending = pool.tcb(tid).pending_signals;
    if pending == 0 {
        return;
    }
    for signal in USER_SIGNALS {
        let bit = user_bit(signal).unwrap();
        if pending & bit == 0 {
            continue;
        }
        let slot = handler_slot(signal).unwrap();
        if let Some(handler) = pool.tcb(tid).handlers[slot] {
            handler();
        }
    }
    pool.tcb_mut(tid).pending_signals = 0;
}
