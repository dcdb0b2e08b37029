use crate::exception::DynException;
use crate::location::SourceLocation;
use crate::raise::Throwable;
use alloc::boxed::Box;
use core::any::Any;

/// A raising backend.
///
/// Raising forcefully "returns" through multiple call frames up until the closest `intercept`
/// frame, which receives the exception object. The backend is picked at build time by
/// `cfg(mode)`, see `build.rs`:
///
/// - `wrapped`: unwinds with the value wrapped into a [`WrapExcept`](crate::WrapExcept).
/// - `unwrapped`: unwinds with the value as-is.
/// - `no-exceptions`: never unwinds by itself, and forwards to the embedder's handler instead.
///
/// During unwinding, all destructors of locals must be run, as if `return` was called. Several
/// exceptions can be in flight at once on one thread (e.g. thrown and caught inside a `drop`
/// that runs during unwinding); each is delivered to its own closest `intercept`.
pub(crate) trait Backend {
    /// Raise a freshly thrown value, optionally annotated with `location`.
    fn throw<T: Throwable>(ex: T, location: Option<&SourceLocation>) -> !;

    /// Raise a copy of an exception object.
    fn rethrow(ex: &dyn DynException) -> !;

    /// Raise an existing exception object as-is.
    fn resume(ex: Box<dyn DynException>) -> !;

    /// Run `func`, returning the exception object if it raises.
    ///
    /// Unwinding that did not originate from this backend is propagated untouched.
    fn intercept<Func: FnOnce() -> R, R>(func: Func) -> Result<R, Box<dyn DynException>>;

    /// Extract an exception object from a panic payload it escaped a thread with.
    fn recover(payload: Box<dyn Any + Send>) -> Result<Box<dyn DynException>, Box<dyn Any + Send>>;
}

#[cfg(not(mode = "no-exceptions"))]
mod unwind;

#[cfg(mode = "wrapped")]
#[path = "wrapped.rs"]
mod imp;

#[cfg(mode = "unwrapped")]
#[path = "unwrapped.rs"]
mod imp;

#[cfg(mode = "no-exceptions")]
#[path = "external.rs"]
mod imp;

pub(crate) use imp::ActiveBackend;
