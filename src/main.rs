#![no_std]
#![no_main]
#![feature(abi_x86_interrupt)]

use bootloader_api::{entry_point, BootInfo, BootloaderConfig};

use tinyrt::config::{APP_STACK_1_SIZE, APP_STACK_2_SIZE};
use tinyrt::sched::{self, ThreadStack};
use tinyrt::signal::Signal;
use tinyrt::tcb::ThreadId;

#[allow(deprecated)]
pub static BOOTLOADER_CONFIG: BootloaderConfig = {
    let mut config = BootloaderConfig::new_default();
    config.kernel_stack_size = 128 * 1024;
    config
};

entry_point!(kernel_main, config = &BOOTLOADER_CONFIG);

static mut STACK_A: ThreadStack<APP_STACK_1_SIZE> = ThreadStack::new();
static mut STACK_B: ThreadStack<APP_STACK_2_SIZE> = ThreadStack::new();

static mut WORKER_B_TID: ThreadId = 0;

/// Boots the core, then spawns the two-thread demo set exercising
/// start_thread/set_ready/signals/heap end to end, in place of the reference
/// firmware's application tasks (out of scope for the core itself).
fn kernel_main(_boot_info: &'static mut BootInfo) -> ! {
    tinyrt::init();
    tinyrt::boot();

    let top_a = unsafe { (*core::ptr::addr_of_mut!(STACK_A)).top() };
    let top_b = unsafe { (*core::ptr::addr_of_mut!(STACK_B)).top() };

    let tid_a = sched::start_thread("worker-a", worker_a, top_a).expect("start worker-a");
    let tid_b = sched::start_thread("worker-b", worker_b, top_b).expect("start worker-b");
    unsafe { *core::ptr::addr_of_mut!(WORKER_B_TID) = tid_b };

    sched::register_handler(tid_a, Signal::Usr1, on_usr1).expect("register usr1 on worker-a");
    sched::set_ready(tid_a).expect("ready worker-a");
    sched::set_ready(tid_b).expect("ready worker-b");

    log::info!("tinyrt: demo threads {} and {} ready, entering idle loop", tid_a, tid_b);
    loop {
        sched::switch_now();
    }
}

fn on_usr1() {
    log::info!("worker-a: got USR1");
}

/// Exercises malloc/free, deferred USR1 delivery, and SIGSLEEP/SIGWAKE
/// against worker-b.
extern "C" fn worker_a() {
    for round in 0..4u32 {
        let tid = sched::current_tid();
        let ptr = sched::malloc(32);
        log::info!("worker-a: round {round}, malloc -> {:?}", ptr);
        if let Some(ptr) = ptr {
            sched::free(ptr).ok();
        }
        sched::send_signal(tid, Signal::Usr1).ok();

        let worker_b = unsafe { *core::ptr::addr_of!(WORKER_B_TID) };
        if round == 1 {
            sched::send_signal(worker_b, Signal::Sleep).ok();
        }
        if round == 2 {
            sched::send_signal(worker_b, Signal::Wake).ok();
        }
        sched::switch_now();
    }
}

extern "C" fn worker_b() {
    loop {
        log::info!("worker-b: tick");
        sched::switch_now();
    }
}
