use super::{Backend, unwind};
use crate::exception::DynException;
use crate::location::SourceLocation;
use crate::raise::Throwable;
use alloc::boxed::Box;
use alloc::collections::TryReserveError;
use core::any::Any;

pub(crate) struct ActiveBackend;

impl Backend for ActiveBackend {
    fn throw<T: Throwable>(ex: T, location: Option<&SourceLocation>) -> ! {
        let mut wrapped = match ex.into_wrapexcept() {
            Ok(wrapped) => wrapped,
            Err(err) => out_of_memory(err),
        };
        if let Some(location) = location {
            if let Err(err) = wrapped.diagnostics_mut().set_location(location) {
                out_of_memory(err);
            }
        }
        unwind::throw(Box::new(wrapped))
    }

    fn rethrow(ex: &dyn DynException) -> ! {
        match ex.clone_exception() {
            Ok(copy) => unwind::throw(copy),
            Err(err) => out_of_memory(err),
        }
    }

    fn resume(ex: Box<dyn DynException>) -> ! {
        unwind::throw(ex)
    }

    fn intercept<Func: FnOnce() -> R, R>(func: Func) -> Result<R, Box<dyn DynException>> {
        unwind::intercept(func)
    }

    fn recover(payload: Box<dyn Any + Send>) -> Result<Box<dyn DynException>, Box<dyn Any + Send>> {
        unwind::recover(payload)
    }
}

// The allocation failure replaces the exception being thrown. It is not wrapped, since wrapping
// needs another allocation.
fn out_of_memory(err: TryReserveError) -> ! {
    crate::raise::trace("annotations could not be allocated", &err, None);
    unwind::throw(Box::new(err))
}
