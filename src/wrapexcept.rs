use crate::diagnostics::Diagnostics;
use crate::exception::{DynException, Exception, sealed};
use crate::location::SourceLocation;
use alloc::boxed::Box;
use alloc::collections::TryReserveError;
use core::any::{Any, type_name};
use core::error::Error;
use core::fmt;
use core::ops::Deref;

/// An exception wrapped together with diagnostic annotations.
///
/// This is what [`throw_exception`](crate::throw_exception) actually throws in the default
/// configuration. It dereferences to the wrapped value and displays as it.
///
/// Throwing a `WrapExcept<E>` again does not wrap it a second time: the location is added to the
/// existing annotations.
#[derive(Clone, Debug)]
pub struct WrapExcept<E> {
    error: E,
    diagnostics: Diagnostics,
}

impl<E: Exception> WrapExcept<E> {
    /// Wrap `error`, copying any annotations it already carries.
    ///
    /// # Panics
    ///
    /// Follows the global allocator's policy on allocation failure. Use [`WrapExcept::try_new`]
    /// to handle it.
    #[inline]
    #[must_use]
    pub fn new(error: E) -> Self {
        let diagnostics = error.diagnostics().cloned().unwrap_or_default();
        Self { error, diagnostics }
    }

    /// Wrap `error`, copying any annotations it already carries.
    ///
    /// # Errors
    ///
    /// Fails if the annotations cannot be copied.
    #[inline]
    pub fn try_new(error: E) -> Result<Self, TryReserveError> {
        let mut diagnostics = Diagnostics::new();
        if let Some(existing) = error.diagnostics() {
            diagnostics.copy_from(existing)?;
        }
        Ok(Self { error, diagnostics })
    }

    /// Wrap `error` and annotate it with the throw location.
    ///
    /// # Errors
    ///
    /// Fails if the annotations cannot be allocated.
    #[inline]
    pub fn with_location(error: E, location: &SourceLocation) -> Result<Self, TryReserveError> {
        let mut wrapped = Self::try_new(error)?;
        wrapped.diagnostics.set_location(location)?;
        Ok(wrapped)
    }
}

impl<E> WrapExcept<E> {
    /// The wrapped value.
    #[inline]
    #[must_use]
    pub const fn get_ref(&self) -> &E {
        &self.error
    }

    /// The wrapped value, mutably.
    #[inline]
    pub fn get_mut(&mut self) -> &mut E {
        &mut self.error
    }

    /// Unwrap, dropping the annotations.
    #[inline]
    #[must_use]
    pub fn into_inner(self) -> E {
        self.error
    }

    /// Annotations attached to this exception.
    #[inline]
    #[must_use]
    pub const fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Annotations attached to this exception, for adding more before throwing it.
    #[inline]
    pub fn diagnostics_mut(&mut self) -> &mut Diagnostics {
        &mut self.diagnostics
    }

    /// The location this exception was thrown from, if it was recorded.
    #[inline]
    #[must_use]
    pub fn location(&self) -> Option<SourceLocation> {
        self.diagnostics.location()
    }
}

impl<E> Deref for WrapExcept<E> {
    type Target = E;

    #[inline]
    fn deref(&self) -> &E {
        &self.error
    }
}

impl<E: fmt::Display> fmt::Display for WrapExcept<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.error.fmt(f)
    }
}

impl<E: Error> Error for WrapExcept<E> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.error.source()
    }
}

impl<E: Exception> sealed::Sealed for WrapExcept<E> {}

impl<E: Exception> DynException for WrapExcept<E> {
    fn as_error(&self) -> &(dyn Error + Send + Sync + 'static) {
        self
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn payload(&self) -> &dyn Any {
        &self.error
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any + Send> {
        self
    }

    fn into_payload(self: Box<Self>) -> Box<dyn Any + Send> {
        Box::new(self.error)
    }

    fn diagnostics_ref(&self) -> Option<&Diagnostics> {
        Some(&self.diagnostics)
    }

    fn type_name(&self) -> &'static str {
        type_name::<Self>()
    }

    fn clone_exception(&self) -> Result<Box<dyn DynException>, TryReserveError> {
        let mut clone = Box::new(Self {
            error: self.error.clone(),
            diagnostics: Diagnostics::new(),
        });
        // On failure `clone` is dropped here, before the error reaches the caller.
        clone.diagnostics.copy_from(&self.diagnostics)?;
        Ok(clone)
    }

    fn rethrow(&self) -> ! {
        crate::raise::rethrow_copy(self)
    }
}
