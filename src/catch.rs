use crate::backend::{ActiveBackend, Backend};
use crate::diagnostics::{Diagnostics, ErrorInfo, ThrowFile, ThrowFunction, ThrowLine};
use crate::exception::DynException;
use crate::location::SourceLocation;
use crate::raise::{resume, trace};
use alloc::boxed::Box;
use alloc::collections::TryReserveError;
use alloc::string::{String, ToString};
use core::any::Any;
use core::error::Error;
use core::fmt;

/// Catch any exception thrown by this crate.
///
/// If `func` returns a value, this function wraps it in [`Ok`]. If `func` throws, the exception is
/// returned as a [`Caught`] handle in [`Err`].
///
/// Rust panics are propagated as-is and not caught. When exceptions are disabled, nothing can be
/// thrown and this always returns [`Ok`].
///
/// # Errors
///
/// Returns the exception thrown by `func`.
///
/// # Example
///
#[cfg_attr(mode = "no-exceptions", doc = "```ignore")]
#[cfg_attr(not(mode = "no-exceptions"), doc = "```rust")]
/// use wrapexcept::{catch, throw};
///
/// let result = catch(|| -> u32 { throw!("abc".parse::<u32>().unwrap_err()) });
/// let caught = result.unwrap_err();
/// assert_eq!(caught.to_string(), "invalid digit found in string");
/// ```
#[inline]
pub fn catch<R>(func: impl FnOnce() -> R) -> Result<R, Caught> {
    ActiveBackend::intercept(func).map_err(|ex| {
        trace("caught exception", &*ex, None);
        Caught { ex }
    })
}

/// Catch exceptions of type `E`.
///
/// `E` is matched against the thrown value, or against the value inside the wrapper if it was
/// wrapped. Other exceptions keep propagating unchanged, annotations included.
///
/// # Errors
///
/// Returns the value thrown by `func`, if it is an `E`.
///
/// # Example
///
#[cfg_attr(mode = "no-exceptions", doc = "```ignore")]
#[cfg_attr(not(mode = "no-exceptions"), doc = "```rust")]
/// use std::num::ParseIntError;
/// use wrapexcept::{catch_as, throw_exception};
///
/// let err = catch_as::<(), ParseIntError>(|| {
///     throw_exception("-".parse::<i8>().unwrap_err());
/// })
/// .unwrap_err();
/// assert_eq!(err.to_string(), "invalid digit found in string");
/// ```
#[inline]
pub fn catch_as<R, E: Any>(func: impl FnOnce() -> R) -> Result<R, E> {
    catch(func).map_err(|caught| match caught.downcast::<E>() {
        Ok(ex) => ex,
        Err(caught) => caught.resume(),
    })
}

/// A caught exception.
///
/// This is the catch-all view of an exception: its concrete type is erased, but the error, its
/// annotations, and the thrown value are still available, and it can be copied or thrown again.
pub struct Caught {
    ex: Box<dyn DynException>,
}

impl Caught {
    /// Recover an exception from a panic payload.
    ///
    /// Exceptions that are never caught unwind their thread like panics, so they show up in the
    /// result of [`JoinHandle::join`](std::thread::JoinHandle::join) or
    /// [`catch_unwind`](std::panic::catch_unwind). Payloads of ordinary panics are returned back in
    /// [`Err`].
    ///
    /// # Errors
    ///
    /// Returns `payload` if it is not an exception thrown by this crate.
    #[inline]
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Result<Self, Box<dyn Any + Send>> {
        ActiveBackend::recover(payload).map(|ex| Self { ex })
    }

    /// The exception as an error.
    #[inline]
    #[must_use]
    pub fn error(&self) -> &(dyn Error + Send + Sync + 'static) {
        self.ex.as_error()
    }

    /// Name of the concrete type that was thrown, e.g. `wrapexcept::WrapExcept<my::Error>`.
    #[inline]
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.ex.type_name()
    }

    /// Annotations carried by the exception. `None` if it cannot carry any.
    #[inline]
    #[must_use]
    pub fn diagnostics(&self) -> Option<&Diagnostics> {
        self.ex.diagnostics_ref()
    }

    #[inline]
    #[must_use]
    pub fn get<I: ErrorInfo + ?Sized>(&self) -> Option<&I::Value> {
        self.diagnostics()?.get::<I>()
    }

    /// The location the exception was thrown from, if it was recorded.
    #[inline]
    #[must_use]
    pub fn location(&self) -> Option<SourceLocation> {
        self.diagnostics()?.location()
    }

    /// Whether the exception, or the value inside its wrapper, is a `T`.
    #[inline]
    #[must_use]
    pub fn is<T: Any>(&self) -> bool {
        self.ex.as_any().is::<T>() || self.ex.payload().is::<T>()
    }

    #[inline]
    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.ex
            .as_any()
            .downcast_ref()
            .or_else(|| self.ex.payload().downcast_ref())
    }

    /// Take the exception, or the value inside its wrapper, as a `T`.
    ///
    /// # Errors
    ///
    /// Returns `self` unchanged if neither is a `T`.
    #[inline]
    pub fn downcast<T: Any>(self) -> Result<T, Self> {
        let any = if self.ex.as_any().is::<T>() {
            self.ex.into_any()
        } else if self.ex.payload().is::<T>() {
            self.ex.into_payload()
        } else {
            return Err(self);
        };
        let raw = Box::into_raw(any).cast::<T>();
        // SAFETY: `into_any` and `into_payload` unbox the same values `as_any` and `payload` refer
        // to. `DynException` is sealed, so this holds for every implementation, and the box holds
        // a `T` allocated with `T`'s layout.
        Ok(*unsafe { Box::from_raw(raw) })
    }

    /// Copy the exception, including its annotations.
    ///
    /// # Errors
    ///
    /// Fails if the annotations cannot be allocated.
    #[inline]
    pub fn clone_exception(&self) -> Result<Self, TryReserveError> {
        self.ex.clone_exception().map(|ex| Self { ex })
    }

    /// Throw a copy of the exception, as if it was just thrown.
    #[inline]
    pub fn rethrow(&self) -> ! {
        self.ex.rethrow()
    }

    /// Continue unwinding with this exception, without copying it.
    #[inline]
    pub fn resume(self) -> ! {
        trace("resuming exception", &*self.ex, None);
        resume(self.ex)
    }

    #[inline]
    #[must_use]
    pub fn into_inner(self) -> Box<dyn DynException> {
        self.ex
    }

    /// A multi-line, human-readable report of the exception and its annotations.
    ///
    /// ```text
    /// src/net.rs(42): Throw in function 'net::connect'
    /// Dynamic exception type: wrapexcept::WrapExcept<net::Refused>
    /// Message: connection refused
    /// [Attempt] = 3
    /// ```
    #[must_use]
    pub fn diagnostic_information(&self) -> String {
        Report(self).to_string()
    }
}

struct Report<'a>(&'a Caught);

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let caught = self.0;
        if let Some(location) = caught.location() {
            write!(f, "{}({})", location.file_name(), location.line())?;
            if location.function_name().is_empty() {
                writeln!(f, ": Throw")?;
            } else {
                writeln!(f, ": Throw in function '{}'", location.function_name())?;
            }
        }
        writeln!(f, "Dynamic exception type: {}", caught.type_name())?;
        writeln!(f, "Message: {}", caught.error())?;
        if let Some(diagnostics) = caught.diagnostics() {
            for (name, value) in diagnostics.iter() {
                if name == ThrowFile::NAME || name == ThrowLine::NAME || name == ThrowFunction::NAME
                {
                    continue;
                }
                writeln!(f, "[{name}] = {value:?}")?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Caught {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Caught")
            .field("type", &self.type_name())
            .field("error", &self.error())
            .field("diagnostics", &self.diagnostics())
            .finish()
    }
}

impl fmt::Display for Caught {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.error(), f)
    }
}

impl Error for Caught {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.error().source()
    }
}

#[cfg(all(test, not(mode = "no-exceptions")))]
mod test {
    use super::*;
    use crate::exception::Exception;
    use crate::raise::throw_exception;
    use alloc::string::ToString;
    use alloc::vec::Vec;
    use std::panic::{catch_unwind, resume_unwind};

    fn thrown(func: impl FnOnce()) -> Caught {
        catch(func).unwrap_err()
    }

    #[derive(Clone, Debug, PartialEq)]
    struct NotFound(String);

    impl fmt::Display for NotFound {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{} not found", self.0)
        }
    }

    impl Error for NotFound {}
    impl Exception for NotFound {}

    #[derive(Clone, Debug, PartialEq)]
    struct Marker(usize);

    impl fmt::Display for Marker {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "marker {}", self.0)
        }
    }

    impl Error for Marker {}
    impl Exception for Marker {}

    #[test]
    fn ok_passes_through() {
        assert_eq!(catch(|| 5).unwrap(), 5);
        assert_eq!(catch_as::<_, NotFound>(|| "fine").unwrap(), "fine");
    }

    #[test]
    fn panics_are_not_caught() {
        let result = catch_unwind(|| {
            let _ = catch(|| -> () { resume_unwind(Box::new("plain panic")) });
        });
        assert_eq!(
            *result.unwrap_err().downcast_ref::<&'static str>().unwrap(),
            "plain panic",
        );
    }

    #[test]
    fn displays_as_error() {
        let caught = thrown(|| throw_exception(NotFound(String::from("user"))));
        assert_eq!(caught.to_string(), "user not found");
        assert_eq!(caught.error().to_string(), "user not found");
        assert!(caught.source().is_none());
    }

    #[test]
    fn catch_as_matches_type() {
        let err = catch_as::<(), NotFound>(|| throw_exception(NotFound(String::from("key"))));
        assert_eq!(err.unwrap_err(), NotFound(String::from("key")));
    }

    #[test]
    fn catch_as_propagates_other_types() {
        let caught = thrown(|| {
            let _ = catch_as::<(), Marker>(|| throw_exception(NotFound(String::from("x"))));
        });
        assert_eq!(caught.downcast_ref::<NotFound>(), Some(&NotFound(String::from("x"))));
    }

    #[test]
    fn downcast_mismatch_returns_handle() {
        let caught = thrown(|| throw_exception(Marker(1)));
        let caught = caught.downcast::<NotFound>().unwrap_err();
        assert_eq!(caught.downcast::<Marker>().unwrap(), Marker(1));
    }

    #[test]
    fn clone_is_independent() {
        let caught = thrown(|| crate::throw!(Marker(3)));
        let clone = caught.clone_exception().unwrap();
        assert_eq!(clone.type_name(), caught.type_name());
        assert_eq!(clone.location(), caught.location());
        assert_eq!(clone.downcast_ref::<Marker>(), Some(&Marker(3)));
        drop(clone);
        assert_eq!(caught.downcast_ref::<Marker>(), Some(&Marker(3)));
    }

    #[test]
    fn rethrow_raises_copy() {
        let caught = thrown(|| crate::throw!(Marker(4)));
        let again = thrown(|| caught.rethrow());
        assert_eq!(again.downcast_ref::<Marker>(), Some(&Marker(4)));
        assert_eq!(again.location(), caught.location());
        assert_eq!(again.type_name(), caught.type_name());
        // The original handle is still usable.
        assert_eq!(caught.downcast_ref::<Marker>(), Some(&Marker(4)));
    }

    #[test]
    fn resume_keeps_exception() {
        let caught = thrown(|| {
            let inner = thrown(|| crate::throw!(Marker(5)));
            inner.resume();
        });
        assert_eq!(caught.downcast_ref::<Marker>(), Some(&Marker(5)));
    }

    #[test]
    fn from_panic_recovers_thread_exceptions() {
        let payload = std::thread::spawn(|| -> () { throw_exception(Marker(6)) })
            .join()
            .unwrap_err();
        let caught = Caught::from_panic(payload).unwrap();
        assert_eq!(caught.downcast_ref::<Marker>(), Some(&Marker(6)));

        let payload = catch_unwind(|| -> () { resume_unwind(Box::new(7_i32)) }).unwrap_err();
        let payload = Caught::from_panic(payload).unwrap_err();
        assert_eq!(payload.downcast_ref::<i32>(), Some(&7));
    }

    #[test]
    fn converts_into_anyhow() {
        fn load() -> anyhow::Result<()> {
            catch(|| -> () { throw_exception(NotFound(String::from("file"))) })?;
            Ok(())
        }
        let err = load().unwrap_err();
        assert_eq!(err.to_string(), "file not found");
        assert!(err.downcast_ref::<Caught>().unwrap().is::<NotFound>());
    }

    #[test]
    fn concurrent_throws_stay_separate() {
        const THREADS: usize = 128;
        let results: Vec<(usize, Caught)> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..THREADS)
                .map(|i| scope.spawn(move || (i, thrown(|| crate::throw!(Marker(i))))))
                .collect();
            handles.into_iter().map(|handle| handle.join().unwrap()).collect()
        });
        assert_eq!(results.len(), THREADS);
        for (i, caught) in &results {
            assert_eq!(caught.downcast_ref::<Marker>(), Some(&Marker(*i)));
        }
    }

    #[cfg(mode = "wrapped")]
    #[test]
    fn downcast_takes_wrapper_or_value() {
        let caught = thrown(|| crate::throw!(Marker(8)));
        let line = caught.location().unwrap().line();
        let wrapped = caught.downcast::<crate::WrapExcept<Marker>>().unwrap();
        assert_eq!(*wrapped, Marker(8));
        assert_eq!(wrapped.location().unwrap().line(), line);

        let caught = thrown(|| crate::throw!(Marker(9)));
        assert_eq!(caught.downcast::<Marker>().unwrap(), Marker(9));
    }

    #[cfg(mode = "wrapped")]
    #[test]
    fn diagnostic_information_report() {
        crate::error_info!(Attempt: u32);

        let location = SourceLocation::new("src/net.rs", 42, "net::connect");
        let mut wrapped = crate::WrapExcept::new(NotFound(String::from("host")));
        wrapped.diagnostics_mut().set::<Attempt>(3);
        let caught = thrown(|| crate::throw_exception_at(wrapped, &location));
        assert_eq!(
            caught.diagnostic_information(),
            alloc::format!(
                "src/net.rs(42): Throw in function 'net::connect'\n\
                 Dynamic exception type: {}\n\
                 Message: host not found\n\
                 [Attempt] = 3\n",
                core::any::type_name::<crate::WrapExcept<NotFound>>(),
            ),
        );
    }
}
