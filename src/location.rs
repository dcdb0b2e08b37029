use core::fmt;

/// A source code location: file, line, and enclosing function.
///
/// Usually captured with [`current_location!`](crate::current_location) or
/// [`SourceLocation::caller`], and passed to
/// [`throw_exception_at`](crate::throw_exception_at).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SourceLocation {
    file: &'static str,
    line: u32,
    function: &'static str,
}

impl SourceLocation {
    /// Create a location from its parts.
    #[inline]
    #[must_use]
    pub const fn new(file: &'static str, line: u32, function: &'static str) -> Self {
        Self {
            file,
            line,
            function,
        }
    }

    /// Capture the location of the caller.
    ///
    /// The function name is unknown to `#[track_caller]` and is left empty. Use
    /// [`current_location!`](crate::current_location) to capture it too.
    #[inline]
    #[must_use]
    #[track_caller]
    pub fn caller() -> Self {
        let location = core::panic::Location::caller();
        Self::new(location.file(), location.line(), "")
    }

    #[inline]
    #[must_use]
    pub const fn file_name(&self) -> &'static str {
        self.file
    }

    #[inline]
    #[must_use]
    pub const fn line(&self) -> u32 {
        self.line
    }

    /// The path of the enclosing function, or an empty string if unknown.
    #[inline]
    #[must_use]
    pub const fn function_name(&self) -> &'static str {
        self.function
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)?;
        if !self.function.is_empty() {
            write!(f, " in function '{}'", self.function)?;
        }
        Ok(())
    }
}

/// Capture the current file, line, and enclosing function as a [`SourceLocation`].
///
/// # Example
///
/// ```rust
/// use wrapexcept::current_location;
///
/// fn here() -> wrapexcept::SourceLocation {
///     current_location!()
/// }
///
/// let location = here();
/// assert!(location.function_name().ends_with("here"));
/// assert_eq!(location.file_name(), file!());
/// ```
#[macro_export]
macro_rules! current_location {
    () => {
        $crate::SourceLocation::new(::core::file!(), ::core::line!(), {
            fn __wrapexcept_marker() {}
            $crate::__private::enclosing_function(::core::any::type_name_of_val(
                &__wrapexcept_marker,
            ))
        })
    };
}

// `type_name_of_val` on a nested item yields `path::to::function::__wrapexcept_marker`.
#[doc(hidden)]
#[inline]
#[must_use]
pub fn enclosing_function(marker: &'static str) -> &'static str {
    marker
        .strip_suffix("::__wrapexcept_marker")
        .unwrap_or(marker)
}

#[cfg(test)]
mod test {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn captures_function_path() {
        fn outer() -> SourceLocation {
            crate::current_location!()
        }
        let location = outer();
        assert!(
            location.function_name().ends_with("captures_function_path::outer"),
            "{}",
            location.function_name(),
        );
        assert_eq!(location.file_name(), file!());
    }

    #[test]
    fn caller_has_no_function() {
        let line = line!() + 1;
        let location = SourceLocation::caller();
        assert_eq!(location.line(), line);
        assert_eq!(location.function_name(), "");
    }

    #[test]
    fn display() {
        let location = SourceLocation::new("src/lib.rs", 12, "app::run");
        assert_eq!(location.to_string(), "src/lib.rs:12 in function 'app::run'");
        let location = SourceLocation::new("src/lib.rs", 12, "");
        assert_eq!(location.to_string(), "src/lib.rs:12");
    }
}
