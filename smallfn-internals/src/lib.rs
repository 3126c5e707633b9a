#![no_std]
#![forbid(
    missing_docs,
    clippy::alloc_instead_of_core,
    clippy::std_instead_of_alloc,
    clippy::std_instead_of_core,
    clippy::missing_safety_doc,
    clippy::missing_docs_in_private_items,
    clippy::undocumented_unsafe_blocks,
    clippy::multiple_unsafe_ops_per_block,
    rustdoc::invalid_rust_codeblocks,
    rustdoc::broken_intra_doc_links,
    missing_copy_implementations,
    unused_doc_comments
)]
#![allow(rustdoc::private_intra_doc_links)]
//! Internal implementation crate for [`smallfn`].
//!
//! # Overview
//!
//! This crate contains the low-level, type-erased storage cell and the unsafe
//! operations that power the [`smallfn`] callable-wrapper library. It
//! provides zero-cost type erasure of callables through vtable-based
//! dispatch, with a small-buffer optimization that keeps pointer-sized
//! callables out of the heap entirely.
//!
//! **This crate is an implementation detail.** No semantic versioning
//! guarantees are provided. Users should depend on the [`smallfn`] crate, not
//! this one.
//!
//! # Architecture
//!
//! - **[`callable`]**: The [`Callable`] trait expressing a call signature as
//!   an argument tuple, bridged to every matching [`FnMut`] implementor.
//! - **`storage`**: Type-erased callable storage
//!   - [`RawFunction`]: Owned storage cell holding zero or one callable,
//!     either directly in a pointer-sized inline buffer or behind a
//!     [`Box`]-allocated pointer stored in that buffer
//!   - `StorageVtable`: Function pointers for type-erased dispatch, one
//!     `&'static` table per stored concrete type, plus a distinguished table
//!     for the empty state
//!
//! # Safety Strategy
//!
//! Type erasure requires careful handling to maintain Rust's type safety
//! guarantees. Once a concrete callable type `F` has been erased, the only
//! record of what the cell's buffer contains is the vtable reference stored
//! next to it, so the vtable must never disagree with the buffer.
//!
//! This crate maintains safety through:
//!
//! - **Module-based encapsulation**: the fields of `RawFunction` and
//!   `StorageVtable` are private to their defining modules, making the
//!   invariant "the installed vtable matches the buffer contents" locally
//!   verifiable within a single file
//! - **Compile-time vtable construction**: vtables are produced as `&'static`
//!   references from a `const` constructor, pairing the function pointers
//!   with a specific `F` at compile time; there is no runtime initialization
//!   step that could race or be observed half-built
//! - **Documented vtable contracts**: each vtable operation specifies exactly
//!   when it can be safely called
//!
//! [`smallfn`]: https://docs.rs/smallfn/latest/smallfn/
//! [`Box`]: alloc::boxed::Box

extern crate alloc;

pub mod callable;
mod storage;
mod util;

pub use callable::Callable;
pub use storage::raw::{INLINE_BUFFER_ALIGNMENT, INLINE_BUFFER_SIZE, RawFunction, fits_inline};
