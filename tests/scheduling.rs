//! Drives the carousel/sleep-wake scenarios from spec §8's end-to-end
//! scenarios through real stack switches.

#![no_std]
#![no_main]
#![feature(custom_test_frameworks)]
#![test_runner(tinyrt::test_runner)]
#![reexport_test_harness_main = "test_main"]

use bootloader_api::{entry_point, BootInfo};
use core::panic::PanicInfo;
use core::sync::atomic::{AtomicUsize, Ordering};
use tinyrt::config::{APP_STACK_1_SIZE, APP_STACK_2_SIZE};
use tinyrt::sched::{self, ThreadStack};
use tinyrt::signal::Signal;
use tinyrt::tcb::ThreadId;

entry_point!(main);

fn main(_boot_info: &'static mut BootInfo) -> ! {
    tinyrt::init();
    test_main();
    tinyrt::hlt_loop();
}

#[panic_handler]
fn panic(info: &PanicInfo) -> ! {
    tinyrt::test_panic_handler(info)
}

static mut STACK_1: ThreadStack<APP_STACK_1_SIZE> = ThreadStack::new();
static mut STACK_2: ThreadStack<APP_STACK_2_SIZE> = ThreadStack::new();
static VISITS: AtomicUsize = AtomicUsize::new(0);
static mut LOG: [ThreadId; 8] = [usize::MAX; 8];

fn record(tid: ThreadId) {
    let i = VISITS.fetch_add(1, Ordering::SeqCst);
    if i < 8 {
        unsafe { (*core::ptr::addr_of_mut!(LOG))[i] = tid };
    }
}

extern "C" fn thread_one() {
    loop {
        record(1);
        sched::switch_now();
    }
}

extern "C" fn thread_two() {
    loop {
        record(2);
        sched::switch_now();
    }
}

#[test_case]
fn carousel_order_then_sleep_wake_matches_spec_scenario() {
    tinyrt::boot();
    let top1 = unsafe { (*core::ptr::addr_of_mut!(STACK_1)).top() };
    let top2 = unsafe { (*core::ptr::addr_of_mut!(STACK_2)).top() };
    let t1 = sched::start_thread("t1", thread_one, top1).unwrap();
    let t2 = sched::start_thread("t2", thread_two, top2).unwrap();
    // Ready-ring insertion is most-recent-first (spec §4.4's "insert at the
    // front"), so readying t2 before t1 leaves the carousel order t1, t2.
    sched::set_ready(t2).unwrap();
    sched::set_ready(t1).unwrap();

    // init -> t1 -> t2, three full laps.
    for _ in 0..9 {
        sched::switch_now();
    }
    let log = unsafe { core::ptr::addr_of!(LOG).read() };
    assert_eq!(&log[..6], &[1, 2, 1, 2, 1, 2]);

    // t2 asleep: the carousel now only ever visits t1.
    sched::send_signal(t2, Signal::Sleep).unwrap();
    sched::switch_now();
    let before_wake = VISITS.load(Ordering::SeqCst);

    // SIGWAKE reinserts t2 at the ring's head-next, so it is the very next
    // thread visited once t1 yields again.
    sched::send_signal(t2, Signal::Wake).unwrap();
    sched::switch_now();
    assert!(VISITS.load(Ordering::SeqCst) > before_wake);

    sched::send_signal(t1, Signal::Kill).unwrap();
    sched::send_signal(t2, Signal::Kill).unwrap();
}
