use crate::backend::{ActiveBackend, Backend};
use crate::exception::{DynException, Exception};
use crate::location::SourceLocation;
use crate::wrapexcept::WrapExcept;
use alloc::boxed::Box;
use alloc::collections::TryReserveError;

/// A value [`throw_exception`] accepts.
///
/// Implemented for every [`Exception`] and for [`WrapExcept`] of one. Passing a `WrapExcept<E>`
/// reuses it as the wrapper instead of nesting it in another one.
pub trait Throwable: DynException + Sized {
    /// The type a catch site recovers from the wrapper.
    type Error: Exception;

    /// Convert into the wrapper that is thrown when wrapping is enabled.
    ///
    /// # Errors
    ///
    /// Fails if annotations already carried by the value cannot be copied.
    fn into_wrapexcept(self) -> Result<WrapExcept<Self::Error>, TryReserveError>;
}

impl<E: Exception> Throwable for E {
    type Error = E;

    #[inline]
    fn into_wrapexcept(self) -> Result<WrapExcept<E>, TryReserveError> {
        WrapExcept::try_new(self)
    }
}

impl<E: Exception> Throwable for WrapExcept<E> {
    type Error = E;

    #[inline]
    fn into_wrapexcept(self) -> Result<WrapExcept<E>, TryReserveError> {
        Ok(self)
    }
}

/// Throw an exception.
///
/// What happens depends on how the crate was built:
///
/// - By default, `ex` is wrapped into a [`WrapExcept`], keeping any annotations it already
///   carries, and the wrapper is thrown.
/// - With the `disable-wrap` feature, `ex` is thrown as-is.
/// - With exceptions disabled (the `no-exceptions` feature, `panic = "abort"`, or no `std`),
///   nothing is thrown: the embedder-defined `wrapexcept_throw_exception` function is called
///   instead. See [the crate docs](crate#exceptions-disabled).
///
/// If uncaught, the exception unwinds the thread like a panic. Catch it with
/// [`catch`](crate::catch) or [`catch_as`](crate::catch_as).
///
/// If the wrapper's annotations cannot be allocated, the resulting [`TryReserveError`] is thrown
/// instead of `ex`.
///
/// # Example
///
#[cfg_attr(mode = "no-exceptions", doc = "```ignore")]
#[cfg_attr(not(mode = "no-exceptions"), doc = "```rust")]
/// use wrapexcept::{catch, throw_exception};
///
/// let caught = catch(|| -> () {
///     throw_exception("x".parse::<u8>().unwrap_err());
/// })
/// .unwrap_err();
/// assert!(caught.is::<std::num::ParseIntError>());
/// assert!(caught.location().is_none());
/// ```
#[inline]
pub fn throw_exception<T: Throwable>(ex: T) -> ! {
    trace("throwing exception", &ex, None);
    ActiveBackend::throw(ex, None)
}

/// Throw an exception, recording where it was thrown from.
///
/// Same as [`throw_exception`], except that by default the wrapper is annotated with
/// [`ThrowFile`](crate::ThrowFile), [`ThrowLine`](crate::ThrowLine), and
/// [`ThrowFunction`](crate::ThrowFunction) taken from `location`. The location is ignored when
/// wrapping is disabled, and forwarded as-is when exceptions are disabled.
///
/// The [`throw!`](crate::throw) macro calls this with the current location.
#[inline]
pub fn throw_exception_at<T: Throwable>(ex: T, location: &SourceLocation) -> ! {
    trace("throwing exception", &ex, Some(location));
    ActiveBackend::throw(ex, Some(location))
}

/// Throw an exception annotated with the current file, line, and function.
///
/// # Example
///
#[cfg_attr(mode = "no-exceptions", doc = "```ignore")]
#[cfg_attr(not(mode = "no-exceptions"), doc = "```rust")]
/// use wrapexcept::{ThrowLine, catch, throw};
///
/// fn parse(input: &str) -> u8 {
///     match input.parse() {
///         Ok(value) => value,
///         Err(err) => throw!(err),
///     }
/// }
///
/// let caught = catch(|| parse("256")).unwrap_err();
/// let location = caught.location().unwrap();
/// assert!(location.function_name().ends_with("parse"));
/// assert_eq!(location.file_name(), file!());
/// assert!(caught.get::<ThrowLine>().is_some());
/// ```
#[macro_export]
macro_rules! throw {
    ($ex:expr $(,)?) => {
        $crate::throw_exception_at($ex, &$crate::current_location!())
    };
}

pub(crate) fn rethrow_copy(ex: &dyn DynException) -> ! {
    trace("rethrowing exception", ex, None);
    ActiveBackend::rethrow(ex)
}

pub(crate) fn resume(ex: Box<dyn DynException>) -> ! {
    ActiveBackend::resume(ex)
}

#[inline]
pub(crate) fn trace(event: &str, ex: &dyn DynException, location: Option<&SourceLocation>) {
    #[cfg(feature = "tracing")]
    tracing::trace!(
        target: "wrapexcept",
        exception_type = ex.type_name(),
        location = ?location,
        "{event}: {}",
        ex.as_error(),
    );
    #[cfg(not(feature = "tracing"))]
    let _ = (event, ex, location);
}
