use crate::diagnostics::Diagnostics;
use alloc::boxed::Box;
use alloc::collections::TryReserveError;
use core::any::{Any, type_name};
use core::error::Error;
use core::fmt;

/// An error type that can be thrown.
///
/// This is the compatibility requirement for everything passed to
/// [`throw_exception`](crate::throw_exception): the value must be a cloneable, thread-safe
/// [`Error`], so that any catch site can observe it through [`Caught`](crate::Caught) and the
/// exception can be copied and rethrown later.
///
/// Types that carry their own [`Diagnostics`] expose them by overriding
/// [`Exception::diagnostics`]; they are copied into the wrapper when the value is thrown.
///
/// # Example
///
/// ```rust
/// use wrapexcept::{Diagnostics, Exception};
///
/// #[derive(Clone, Debug)]
/// struct ConfigError {
///     diagnostics: Diagnostics,
/// }
///
/// impl std::fmt::Display for ConfigError {
///     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
///         f.write_str("invalid configuration")
///     }
/// }
///
/// impl std::error::Error for ConfigError {}
///
/// impl Exception for ConfigError {
///     fn diagnostics(&self) -> Option<&Diagnostics> {
///         Some(&self.diagnostics)
///     }
/// }
/// ```
pub trait Exception: Error + Clone + Send + Sync + 'static {
    /// Annotations already attached to this value.
    #[inline]
    fn diagnostics(&self) -> Option<&Diagnostics> {
        None
    }
}

macro_rules! impl_exception {
    ($($ty:ty),* $(,)?) => {
        $(impl Exception for $ty {})*
    };
}

impl_exception!(
    TryReserveError,
    alloc::string::FromUtf8Error,
    core::array::TryFromSliceError,
    core::char::CharTryFromError,
    core::char::ParseCharError,
    core::fmt::Error,
    core::num::ParseFloatError,
    core::num::ParseIntError,
    core::num::TryFromIntError,
    core::str::ParseBoolError,
    core::str::Utf8Error,
);

/// A thrown exception with its concrete type erased.
///
/// Every value that can be thrown implements this trait: plain [`Exception`] types and
/// [`WrapExcept`](crate::WrapExcept). It is what a [`Caught`](crate::Caught) handle holds, and
/// provides copying and rethrowing without knowing the concrete type.
///
/// This trait is sealed: it is implemented by the crate for exactly these types.
pub trait DynException: sealed::Sealed + fmt::Debug + Send + Sync + 'static {
    /// The exception as an error.
    fn as_error(&self) -> &(dyn Error + Send + Sync + 'static);

    /// The exception object itself.
    fn as_any(&self) -> &dyn Any;

    /// The thrown value. For a wrapper, this is the wrapped value.
    fn payload(&self) -> &dyn Any;

    /// Unbox into the exception object itself, the same value [`as_any`](Self::as_any) returns.
    fn into_any(self: Box<Self>) -> Box<dyn Any + Send>;

    /// Unbox into the thrown value, the same value [`payload`](Self::payload) returns.
    fn into_payload(self: Box<Self>) -> Box<dyn Any + Send>;

    /// Annotations carried by the exception, if it can carry any.
    fn diagnostics_ref(&self) -> Option<&Diagnostics>;

    /// Name of the concrete exception type.
    fn type_name(&self) -> &'static str;

    /// Copy the exception, including its annotations, into a new allocation.
    ///
    /// # Errors
    ///
    /// Fails if the annotations cannot be allocated. Nothing is leaked in that case.
    fn clone_exception(&self) -> Result<Box<dyn DynException>, TryReserveError>;

    /// Throw a copy of the exception, as if it was just thrown.
    fn rethrow(&self) -> !;
}

pub(crate) mod sealed {
    pub trait Sealed {}
}

impl<E: Exception> sealed::Sealed for E {}

impl<E: Exception> DynException for E {
    fn as_error(&self) -> &(dyn Error + Send + Sync + 'static) {
        self
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn payload(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any + Send> {
        self
    }

    fn into_payload(self: Box<Self>) -> Box<dyn Any + Send> {
        self
    }

    fn diagnostics_ref(&self) -> Option<&Diagnostics> {
        self.diagnostics()
    }

    fn type_name(&self) -> &'static str {
        type_name::<E>()
    }

    fn clone_exception(&self) -> Result<Box<dyn DynException>, TryReserveError> {
        Ok(Box::new(self.clone()))
    }

    fn rethrow(&self) -> ! {
        crate::raise::rethrow_copy(self)
    }
}
