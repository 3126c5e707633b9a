#![cfg_attr(not(doc), no_std)]
#![deny(
    missing_docs,
    clippy::alloc_instead_of_core,
    clippy::std_instead_of_alloc,
    clippy::std_instead_of_core,
    clippy::missing_safety_doc,
    clippy::undocumented_unsafe_blocks,
    clippy::multiple_unsafe_ops_per_block,
    clippy::as_ptr_cast_mut,
    clippy::ptr_as_ptr,
    rustdoc::invalid_rust_codeblocks,
    rustdoc::broken_intra_doc_links,
    missing_copy_implementations,
    unused_doc_comments
)]
// Make docs.rs generate better docs
#![cfg_attr(docsrs, feature(doc_cfg))]

//! A type-erased callable wrapper with small-object optimization.
//!
//! ## Overview
//!
//! This crate provides [`Function`], an owning wrapper around any clonable
//! callable with a fixed signature. The concrete type of the callable is
//! erased at construction: a `Function<(i32,), i32>` can hold a plain
//! function pointer, a capturing closure, or any other value implementing
//! [`Callable`], and swap between them at runtime.
//!
//! Unlike a `Box<dyn FnMut>`, a `Function` has an **empty state** (calling
//! it reports [`BadFunctionCall`] instead of panicking), supports **checked
//! downcasting** back to the stored concrete type, and stores small
//! callables **inline** without touching the heap.
//!
//! ## Quick Example
//!
//! ```
//! use smallfn::Function;
//!
//! let x = 5;
//! let mut doubled = Function::new(move || x * 2);
//!
//! assert_eq!(doubled.call(()), Ok(10));
//!
//! doubled.clear();
//! assert!(doubled.call(()).is_err());
//! ```
//!
//! ## Core Concepts
//!
//! A `Function<Args, R>` is two pointers wide. It consists of:
//! - A pointer-sized inline buffer holding the callable itself when it fits,
//!   or a pointer to its heap allocation when it does not.
//! - A reference to a static dispatch table describing the stored type.
//!
//! Arguments are passed as a tuple (`()` for zero arguments, `(a,)` for
//! one), which is what lets one type parameter stand for a whole parameter
//! list on stable Rust. The [`Callable`] trait bridges the tuple form back
//! to ordinary closures and function pointers; it is implemented for all of
//! them up to twelve arguments.
//!
//! ## Storage Strategy
//!
//! Whether a callable is stored inline is decided purely by its layout, at
//! compile time: it must be no larger than a pointer and require no stricter
//! alignment. [`fits_inline`] exposes the predicate, and tests can use it to
//! pin down which representation a given capture gets. Moving a `Function`
//! never moves a heap-stored callable; only the pointer changes hands.
//!
//! ## Thread Safety
//!
//! `Function` is neither [`Send`] nor [`Sync`]. Nothing is known about the
//! captured state after erasure, so crossing threads cannot be allowed.

extern crate alloc;

mod error;
mod function;

pub use smallfn_internals::{Callable, fits_inline};

pub use crate::{error::BadFunctionCall, function::Function};
