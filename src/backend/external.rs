//! Exceptions disabled: forward to handlers defined by the embedding application.
//!
//! See [the crate docs](crate#exceptions-disabled) for the handler signatures.

use super::Backend;
use crate::exception::DynException;
use crate::location::SourceLocation;
use crate::raise::Throwable;
use alloc::boxed::Box;
use core::any::Any;
use core::error::Error;

unsafe extern "Rust" {
    fn wrapexcept_throw_exception(error: &(dyn Error + Send + Sync + 'static)) -> !;

    fn wrapexcept_throw_exception_at(
        error: &(dyn Error + Send + Sync + 'static),
        location: &SourceLocation,
    ) -> !;
}

fn forward(error: &(dyn Error + Send + Sync + 'static), location: Option<&SourceLocation>) -> ! {
    match location {
        // SAFETY: The embedder defines the handler with exactly this signature; the declared
        // `-> !` makes the compiler reject a definition that returns.
        Some(location) => unsafe { wrapexcept_throw_exception_at(error, location) },
        // SAFETY: As above.
        None => unsafe { wrapexcept_throw_exception(error) },
    }
}

pub(crate) struct ActiveBackend;

impl Backend for ActiveBackend {
    fn throw<T: Throwable>(ex: T, location: Option<&SourceLocation>) -> ! {
        forward(ex.as_error(), location)
    }

    fn rethrow(ex: &dyn DynException) -> ! {
        let location = ex.diagnostics_ref().and_then(|diagnostics| diagnostics.location());
        forward(ex.as_error(), location.as_ref())
    }

    fn resume(ex: Box<dyn DynException>) -> ! {
        Self::rethrow(&*ex)
    }

    // Nothing can unwind through here on behalf of this crate.
    fn intercept<Func: FnOnce() -> R, R>(func: Func) -> Result<R, Box<dyn DynException>> {
        Ok(func())
    }

    fn recover(payload: Box<dyn Any + Send>) -> Result<Box<dyn DynException>, Box<dyn Any + Send>> {
        Err(payload)
    }
}
