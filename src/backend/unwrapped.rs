use super::{Backend, unwind};
use crate::exception::DynException;
use crate::location::SourceLocation;
use crate::raise::Throwable;
use alloc::boxed::Box;
use alloc::collections::TryReserveError;
use core::any::Any;

pub(crate) struct ActiveBackend;

impl Backend for ActiveBackend {
    // The location is only recorded by wrappers.
    fn throw<T: Throwable>(ex: T, _location: Option<&SourceLocation>) -> ! {
        unwind::throw(Box::new(ex))
    }

    fn rethrow(ex: &dyn DynException) -> ! {
        match ex.clone_exception() {
            Ok(copy) => unwind::throw(copy),
            Err(err) => unwind::throw(Box::<TryReserveError>::new(err)),
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
