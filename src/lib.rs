//! Throw errors as exceptions, annotated with where they were thrown from.
//!
//! [`throw!`] wraps an error into a [`WrapExcept`], records the file, line, and function of the
//! call site as diagnostic annotations, and raises it by unwinding. [`catch`] turns it back into a
//! value: a [`Caught`] handle that exposes the error, the annotations, and the original value, and
//! can copy or rethrow the exception.
//!
//!
//! # Usage
//!
//! Any type implementing [`Exception`] can be thrown. That is a cloneable, thread-safe
//! [`Error`](core::error::Error); the trait has no required methods.
//!
#![cfg_attr(mode = "no-exceptions", doc = "```ignore")]
#![cfg_attr(not(mode = "no-exceptions"), doc = "```rust")]
//! use wrapexcept::{Exception, catch, throw};
//!
//! #[derive(Clone, Debug)]
//! struct Unavailable(&'static str);
//!
//! impl std::fmt::Display for Unavailable {
//!     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
//!         write!(f, "{} is unavailable", self.0)
//!     }
//! }
//!
//! impl std::error::Error for Unavailable {}
//! impl Exception for Unavailable {}
//!
//! fn fetch() -> Vec<u8> {
//!     throw!(Unavailable("storage"));
//! }
//!
//! let caught = catch(fetch).unwrap_err();
//! assert_eq!(caught.to_string(), "storage is unavailable");
//! assert!(caught.location().unwrap().function_name().ends_with("fetch"));
//! println!("{}", caught.diagnostic_information());
//! ```
//!
//! Arbitrary annotations can be attached with [`Diagnostics`]: either to a [`WrapExcept`] before
//! throwing it, or to an error type that exposes its own annotations through
//! [`Exception::diagnostics`]. Annotations already present survive wrapping.
//!
//! Exceptions unwind like panics, and run destructors on the way. Panics that are not
//! exceptions pass through [`catch`] untouched. An exception that is never caught terminates its
//! thread; [`Caught::from_panic`] recovers it from the thread's join result.
//!
//!
//! # Configuration
//!
//! How exceptions are raised is fixed at build time:
//!
//! - By default, thrown values are wrapped into [`WrapExcept`] and annotated.
//! - The `disable-wrap` feature throws values as-is. Locations are discarded.
//! - The `no-exceptions` feature, `panic = "abort"`, or building without the `std` feature
//!   disables exceptions altogether, see below.
//!
//! The `WRAPEXCEPT_MODE` environment variable overrides the choice at build time with one of
//! `wrapped`, `unwrapped`, or `no-exceptions`.
//!
//! The `tracing` feature emits `trace`-level events for thrown, rethrown, and caught exceptions.
//!
//!
//! # Exceptions disabled
//!
//! Without exceptions, throwing calls one of two functions that the final binary must define.
//! The error is passed by reference, unmodified, with the location if there is one. Both are
//! declared `-> !` and must not return; typically they log and abort:
//!
//! ```rust,no_run
//! use std::error::Error;
//! use wrapexcept::SourceLocation;
//!
//! #[unsafe(no_mangle)]
//! fn wrapexcept_throw_exception(error: &(dyn Error + Send + Sync + 'static)) -> ! {
//!     eprintln!("fatal: {error}");
//!     std::process::abort();
//! }
//!
//! #[unsafe(no_mangle)]
//! fn wrapexcept_throw_exception_at(
//!     error: &(dyn Error + Send + Sync + 'static),
//!     location: &SourceLocation,
//! ) -> ! {
//!     eprintln!("fatal: {error} at {location}");
//!     std::process::abort();
//! }
//! ```
//!
//! In this configuration [`catch`] always returns [`Ok`], and the crate supports `#![no_std]`.

#![no_std]
#![warn(
    clippy::cargo,
    clippy::pedantic,
    clippy::alloc_instead_of_core,
    clippy::allow_attributes,
    clippy::as_underscore,
    clippy::clone_on_ref_ptr,
    clippy::default_numeric_fallback,
    clippy::empty_structs_with_brackets,
    clippy::format_push_string,
    clippy::mem_forget,
    clippy::missing_assert_message,
    clippy::missing_inline_in_public_items,
    clippy::multiple_unsafe_ops_per_block,
    clippy::needless_raw_strings,
    clippy::rc_buffer,
    clippy::redundant_type_annotations,
    clippy::same_name_method,
    clippy::self_named_module_files,
    clippy::std_instead_of_alloc,
    clippy::std_instead_of_core,
    clippy::string_to_string,
    clippy::undocumented_unsafe_blocks,
    clippy::unnecessary_safety_comment,
    clippy::unused_result_ok,
    clippy::wildcard_enum_match_arm,
)]

extern crate alloc;
#[cfg(any(feature = "std", test))]
extern crate std;

mod backend;
mod catch;
mod diagnostics;
mod exception;
mod location;
mod raise;
mod wrapexcept;

pub use catch::{Caught, catch, catch_as};
pub use diagnostics::{Diagnostics, ErrorInfo, ThrowFile, ThrowFunction, ThrowLine};
pub use exception::{DynException, Exception};
pub use location::SourceLocation;
pub use raise::{Throwable, throw_exception, throw_exception_at};
pub use wrapexcept::WrapExcept;

#[doc(hidden)]
pub mod __private {
    pub use crate::location::enclosing_function;
}
