//! Boots the kernel and exercises the public thread/signal/heap facade end
//! to end under QEMU, the way `tests/basic_boot.rs` in the reference repo
//! checked basic printing.

#![no_std]
#![no_main]
#![feature(custom_test_frameworks)]
#![test_runner(tinyrt::test_runner)]
#![reexport_test_harness_main = "test_main"]

use bootloader_api::{entry_point, BootInfo};
use core::panic::PanicInfo;
use tinyrt::config::APP_STACK_1_SIZE;
use tinyrt::sched::{self, ThreadStack};
use tinyrt::signal::Signal;

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

#[test_case]
fn boot_installs_thread_zero_as_ready_and_current() {
    tinyrt::boot();
    assert_eq!(sched::current_tid(), tinyrt::tcb::INIT_TID);
}

#[test_case]
fn start_thread_then_set_ready_then_switch_reaches_the_new_thread() {
    static mut STACK: ThreadStack<APP_STACK_1_SIZE> = ThreadStack::new();
    static mut VISITED: bool = false;

    extern "C" fn entry() {
        unsafe { *core::ptr::addr_of_mut!(VISITED) = true };
        loop {
            sched::switch_now();
        }
    }

    let top = unsafe { (*core::ptr::addr_of_mut!(STACK)).top() };
    let tid = sched::start_thread("t", entry, top).expect("start_thread");
    sched::set_ready(tid).expect("set_ready");
    sched::switch_now();
    assert!(unsafe { *core::ptr::addr_of!(VISITED) });

    sched::send_signal(tid, Signal::Kill).expect("kill demo thread");
}
