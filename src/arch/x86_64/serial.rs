//! UART 16550 serial port — the kernel's only output device.
//!
//! QEMU redirects COM1 (I/O port 0x3F8) to stdio, so this doubles as the
//! boot trace channel and the transport the [`super::logger`] backend
//! writes through.

use spin::Mutex;
use uart_16550::SerialPort;

pub static SERIAL1: Mutex<SerialPort> = Mutex::new(unsafe { SerialPort::new(0x3F8) });

pub fn init() {
    SERIAL1.lock().init();
}

#[macro_export]
macro_rules! serial_print {
    ($($arg:tt)*) => {
        $crate::arch::x86_64::serial::_print(::core::format_args!($($arg)*));
    };
}

#[macro_export]
macro_rules! serial_println {
    () => ($crate::serial_print!("\n"));
    ($($arg:tt)*) => ($crate::serial_print!("{}\n", ::core::format_args!($($arg)*)));
}

#[doc(hidden)]
pub fn _print(args: core::fmt::Arguments) {
    use core::fmt::Write;

    // The serial port is shared global state; keep interrupts masked for
    // the duration of the write the same way every other mutation of
    // kernel-owned state does (spec §5's "shared-resource policy").
    crate::intlock::with_lock(|| {
        SERIAL1.lock().write_fmt(args).unwrap();
    });
}
