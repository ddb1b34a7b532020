//! The kernel's single error type (spec §7).
//!
//! Spec models failure as a signed status code or a null pointer, with "no
//! error details encoded". This enum is the idiomatic Rust rendering of the
//! same compact-result-indicator idea: every fallible API returns
//! `Result<T, KernelError>`, and nothing here carries a payload beyond which
//! of the three documented failure categories applies. The fourth category
//! spec §7 lists, "programmer fault", is deliberately unrepresentable — the
//! kernel does not defend against it and this type does not pretend to.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum KernelError {
    /// Bad tid, bad signal, non-`AUTO_TID` create request, null/misaligned
    /// free pointer.
    InvalidArgument,
    /// No free TCB slot, or no contiguous heap run big enough.
    ResourceExhausted,
    /// `set_ready` on a non-occupied/already-ready/sleeping thread,
    /// `free` on pages not owned by the caller.
    StateViolation,
}

impl core::fmt::Display for KernelError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let msg = match self {
            KernelError::InvalidArgument => "invalid argument",
            KernelError::ResourceExhausted => "resource exhausted",
            KernelError::StateViolation => "state violation",
        };
        f.write_str(msg)
    }
}

impl core::error::Error for KernelError {}

pub type KernelResult<T> = Result<T, KernelError>;
