//! Unwinding via Rust panics, shared by the `wrapped` and `unwrapped` backends.

use crate::exception::DynException;
use alloc::boxed::Box;
use core::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind, resume_unwind};

// Distinguishes our payloads from those of ordinary panics.
struct Thrown(Box<dyn DynException>);

/// Unwind with `ex` as the payload.
///
/// Uses `resume_unwind`, so the panic hook is not invoked.
pub(super) fn throw(ex: Box<dyn DynException>) -> ! {
    resume_unwind(Box::new(Thrown(ex)))
}

pub(super) fn intercept<Func: FnOnce() -> R, R>(func: Func) -> Result<R, Box<dyn DynException>> {
    catch_unwind(AssertUnwindSafe(func)).map_err(|payload| match recover(payload) {
        Ok(ex) => ex,
        Err(payload) => resume_unwind(payload),
    })
}

pub(super) fn recover(
    payload: Box<dyn Any + Send>,
) -> Result<Box<dyn DynException>, Box<dyn Any + Send>> {
    payload.downcast::<Thrown>().map(|thrown| thrown.0)
}
