//! Open-ended diagnostic annotations.
//!
//! An annotation kind is a tag type implementing [`ErrorInfo`], which names the kind and fixes the
//! type of its value. [`Diagnostics`] maps kinds to values; setting a kind twice replaces the
//! earlier value.
//!
//! ```rust
//! use wrapexcept::{Diagnostics, ThrowLine, error_info};
//!
//! error_info!(pub RequestId: u64);
//!
//! let mut diagnostics = Diagnostics::new();
//! diagnostics.set::<RequestId>(17);
//! diagnostics.set::<ThrowLine>(42);
//! assert_eq!(diagnostics.get::<RequestId>(), Some(&17));
//! assert_eq!(diagnostics.get::<ThrowLine>(), Some(&42));
//! ```

use crate::location::SourceLocation;
use alloc::collections::TryReserveError;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::{Any, TypeId};
use core::fmt;

/// An annotation kind.
///
/// Implementors are usually uninhabited tag types, declared with [`error_info!`](crate::error_info).
pub trait ErrorInfo {
    /// The type of the annotation value.
    type Value: Any + fmt::Debug + Send + Sync;

    /// Human-readable name of the annotation, used in reports.
    const NAME: &'static str;
}

/// Declare an annotation kind.
///
/// `error_info!(pub Tag: Type)` declares an uninhabited `Tag` implementing [`ErrorInfo`] with
/// `Value = Type`.
#[macro_export]
macro_rules! error_info {
    ($(#[$attr:meta])* $vis:vis $name:ident : $value:ty) => {
        $(#[$attr])*
        #[derive(Debug)]
        $vis enum $name {}

        impl $crate::ErrorInfo for $name {
            type Value = $value;
            const NAME: &'static str = ::core::stringify!($name);
        }
    };
}

error_info!(
    /// The file an exception was thrown from.
    pub ThrowFile: &'static str
);
error_info!(
    /// The line an exception was thrown from.
    pub ThrowLine: u32
);
error_info!(
    /// The function an exception was thrown from.
    pub ThrowFunction: &'static str
);

trait InfoValue: Any + fmt::Debug + Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn as_debug(&self) -> &(dyn fmt::Debug + Send + Sync);
}

impl<T: Any + fmt::Debug + Send + Sync> InfoValue for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_debug(&self) -> &(dyn fmt::Debug + Send + Sync) {
        self
    }
}

// Values are immutable once set, so copies share them. Cloning `Diagnostics` only allocates the
// entry vector.
#[derive(Clone)]
struct Entry {
    id: TypeId,
    name: &'static str,
    value: Arc<dyn InfoValue>,
}

/// A set of annotations attached to an exception.
#[derive(Clone, Default)]
pub struct Diagnostics {
    entries: Vec<Entry>,
}

impl Diagnostics {
    /// Create an empty set.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Number of annotations set.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no annotation is set.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, id: TypeId) -> Option<usize> {
        self.entries.iter().position(|entry| entry.id == id)
    }

    /// Get the value of annotation `I`, if set.
    #[inline]
    #[must_use]
    pub fn get<I: ErrorInfo + ?Sized>(&self) -> Option<&I::Value> {
        let index = self.position(typeid::of::<I>())?;
        // Deref first: `Arc<dyn InfoValue>` is itself an `InfoValue`.
        (*self.entries[index].value).as_any().downcast_ref()
    }

    /// Whether annotation `I` is set.
    #[inline]
    #[must_use]
    pub fn contains<I: ErrorInfo + ?Sized>(&self) -> bool {
        self.position(typeid::of::<I>()).is_some()
    }

    /// Set annotation `I`, replacing the previous value if any.
    ///
    /// # Panics
    ///
    /// Follows the global allocator's policy on allocation failure, like [`Vec::push`]. Use
    /// [`Diagnostics::try_set`] to handle it.
    #[inline]
    pub fn set<I: ErrorInfo + ?Sized>(&mut self, value: I::Value) {
        self.insert(Entry {
            id: typeid::of::<I>(),
            name: I::NAME,
            value: Arc::new(value),
        });
    }

    /// Set annotation `I`, replacing the previous value if any.
    ///
    /// # Errors
    ///
    /// Fails if the entry storage cannot grow. `self` is left unchanged in that case.
    #[inline]
    pub fn try_set<I: ErrorInfo + ?Sized>(&mut self, value: I::Value) -> Result<(), TryReserveError> {
        let id = typeid::of::<I>();
        if self.position(id).is_none() {
            self.reserve(1)?;
        }
        self.insert(Entry {
            id,
            name: I::NAME,
            value: Arc::new(value),
        });
        Ok(())
    }

    fn reserve(&mut self, additional: usize) -> Result<(), TryReserveError> {
        #[cfg(test)]
        test::injected_failure()?;
        self.entries.try_reserve(additional)
    }

    fn insert(&mut self, entry: Entry) {
        match self.position(entry.id) {
            Some(index) => self.entries[index] = entry,
            None => self.entries.push(entry),
        }
    }

    /// Remove annotation `I`. Returns whether it was set.
    #[inline]
    pub fn remove<I: ErrorInfo + ?Sized>(&mut self) -> bool {
        match self.position(typeid::of::<I>()) {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => false,
        }
    }

    /// Copy every annotation of `other` into `self`.
    ///
    /// Kinds present in both take the value from `other`; everything else in `self` is kept.
    ///
    /// # Errors
    ///
    /// Fails if the entry storage cannot grow. `self` is left unchanged in that case.
    #[inline]
    pub fn copy_from(&mut self, other: &Diagnostics) -> Result<(), TryReserveError> {
        self.reserve(other.entries.len())?;
        for entry in &other.entries {
            self.insert(entry.clone());
        }
        Ok(())
    }

    /// Clone, reporting allocation failure instead of aborting.
    ///
    /// # Errors
    ///
    /// Fails if the entry storage cannot be allocated.
    #[inline]
    pub fn try_clone(&self) -> Result<Self, TryReserveError> {
        let mut clone = Self::new();
        clone.copy_from(self)?;
        Ok(clone)
    }

    /// Set the throw location annotations: [`ThrowFile`], [`ThrowLine`], and [`ThrowFunction`].
    ///
    /// # Errors
    ///
    /// Fails if the entry storage cannot grow. No annotation is changed in that case.
    #[inline]
    pub fn set_location(&mut self, location: &SourceLocation) -> Result<(), TryReserveError> {
        self.reserve(3)?;
        self.set::<ThrowFile>(location.file_name());
        self.set::<ThrowLine>(location.line());
        self.set::<ThrowFunction>(location.function_name());
        Ok(())
    }

    /// Reassemble the throw location, if [`ThrowFile`] and [`ThrowLine`] are set.
    #[inline]
    #[must_use]
    pub fn location(&self) -> Option<SourceLocation> {
        let file = *self.get::<ThrowFile>()?;
        let line = *self.get::<ThrowLine>()?;
        let function = self.get::<ThrowFunction>().copied().unwrap_or("");
        Some(SourceLocation::new(file, line, function))
    }

    /// Iterate over `(name, value)` pairs in insertion order.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &(dyn fmt::Debug + Send + Sync))> {
        self.entries
            .iter()
            .map(|entry| (entry.name, (*entry.value).as_debug()))
    }
}

impl fmt::Debug for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}
