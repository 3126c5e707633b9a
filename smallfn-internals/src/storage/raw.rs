//! The type-erased storage cell.
//!
//! This module encapsulates the fields of [`RawFunction`], ensuring they are
//! only visible within this file. This visibility restriction guarantees the
//! safety invariant: **the installed vtable always matches the contents of
//! the buffer**.
//!
//! # Safety Invariant
//!
//! The `buffer` field has exactly three valid states, distinguished by the
//! `vtable` field:
//!
//! 1. The empty vtable is installed: the buffer is uninitialized and is never
//!    read.
//! 2. A vtable for an inline-eligible `F` is installed: the buffer holds an
//!    initialized `F`, placement-constructed directly into it.
//! 3. A vtable for any other `F` is installed: the buffer holds the pointer
//!    produced by [`Box::into_raw`] on a `Box<F>` owned by this cell.
//!
//! Every method of this module either preserves the pairing or moves between
//! the three states atomically from the caller's point of view. The vtable
//! operations in [`vtable`](super::vtable) rely on this invariant to
//! reinterpret the buffer at the correct concrete type.
//!
//! # Representation selection
//!
//! Whether a concrete `F` lives inline or behind a heap pointer is decided by
//! [`fits_inline`], a `const` predicate over `F`'s layout. The decision is
//! made once, at vtable-construction time, and is never recorded explicitly:
//! the operations baked into `F`'s vtable simply know which representation
//! they address.

use alloc::boxed::Box;
use core::{any::TypeId, mem::MaybeUninit};

use crate::{Callable, storage::vtable::StorageVtable, util::Empty};

/// Size in bytes of the inline buffer of a [`RawFunction`].
pub const INLINE_BUFFER_SIZE: usize = size_of::<*mut ()>();

/// Alignment in bytes of the inline buffer of a [`RawFunction`].
pub const INLINE_BUFFER_ALIGNMENT: usize = align_of::<*mut ()>();

/// Whether values of type `T` are stored directly in the inline buffer of a
/// [`RawFunction`] rather than behind a heap allocation.
///
/// A type is inline-eligible when it fits in the buffer and the buffer's
/// alignment satisfies its own. There is no third condition on relocation
/// behavior: in Rust every value can be moved by a plain byte copy, so
/// in-place relocation of an inline value can never fail halfway.
#[must_use]
pub const fn fits_inline<T>() -> bool {
    size_of::<T>() <= INLINE_BUFFER_SIZE && INLINE_BUFFER_ALIGNMENT % align_of::<T>() == 0
}

/// A storage cell holding zero or one type-erased callable.
///
/// The cell is two words: a pointer-sized inline buffer and a reference to
/// the `&'static` vtable describing the buffer's current contents. Small
/// callables (up to one pointer in size) are stored directly in the buffer;
/// larger ones live on the heap with only the pointer stored inline. A cell
/// holding nothing points at the distinguished empty vtable — the vtable
/// reference is never null and every operation always has a valid dispatch
/// target.
///
/// All operations (invoke, clone, relocate, drop, downcast) go through the
/// installed vtable; the cell itself never branches on the stored concrete
/// type after construction.
///
/// `RawFunction` is neither [`Send`] nor [`Sync`]: nothing is known about
/// the captured state of the erased callable, so the conservative choice is
/// the only sound one.
pub struct RawFunction<Args: 'static, R: 'static> {
    /// Inline value storage.
    ///
    /// # Safety
    ///
    /// Interpretation is governed by `vtable`; see the module documentation
    /// for the three valid states. The buffer is only ever read through the
    /// accessors below, each of which requires the caller to know the
    /// current state.
    buffer: MaybeUninit<*mut ()>,
    /// The dispatch table matching the current contents of `buffer`.
    vtable: &'static StorageVtable<Args, R>,
}

impl<Args: 'static, R: 'static> RawFunction<Args, R> {
    /// Creates a cell holding no callable.
    ///
    /// The buffer starts uninitialized; the empty vtable guarantees it is
    /// never read before a value is installed.
    #[inline]
    #[must_use]
    pub fn empty() -> Self {
        Self {
            buffer: MaybeUninit::uninit(),
            vtable: StorageVtable::empty(),
        }
    }

    /// Creates a cell holding `callable`.
    ///
    /// The value is placed inline when [`fits_inline::<F>()`](fits_inline)
    /// holds, and moved to the heap otherwise. The `Clone` bound is what
    /// makes the cell itself clonable after `F` has been erased: the clone
    /// operation is baked into `F`'s vtable here, at the last point where
    /// `F` is still known.
    #[must_use]
    pub fn new<F>(callable: F) -> Self
    where
        F: Callable<Args, Output = R> + Clone,
    {
        let mut cell = Self::empty();
        // SAFETY: a fresh cell holds no prior value, and the vtable matching
        // `F`'s representation is installed immediately after the write.
        unsafe { cell.write_value(callable) };
        cell.set_vtable(StorageVtable::new::<F>());
        cell
    }

    /// Returns `true` if the cell holds no callable.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vtable.type_id() == TypeId::of::<Empty>()
    }

    /// Returns the [`TypeId`] of the stored callable, or `None` when the
    /// cell is empty.
    #[inline]
    #[must_use]
    pub fn type_id(&self) -> Option<TypeId> {
        if self.is_empty() {
            None
        } else {
            Some(self.vtable.type_id())
        }
    }

    /// Returns the [`core::any::type_name`] of the stored callable, or
    /// `"<empty>"` when the cell is empty.
    #[inline]
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.vtable.type_name()
    }

    /// Invokes the stored callable with `args`.
    ///
    /// Returns `None` exactly when the cell is empty; a stored callable
    /// always produces `Some`. The emptiness check is not performed here: an
    /// empty cell dispatches through the empty vtable, whose invoke
    /// operation reports the failure without touching the buffer.
    #[inline]
    pub fn invoke(&mut self, args: Args) -> Option<R> {
        let vtable = self.vtable;
        // SAFETY: `vtable` is the table installed for the cell's current
        // contents, as guaranteed by this module's safety invariant.
        unsafe { vtable.invoke(self, args) }
    }

    /// Returns a shared reference to the stored callable if it has exactly
    /// the concrete type `F`.
    ///
    /// Returns `None` when the cell is empty or holds a different type. The
    /// check compares the [`TypeId`] recorded in the installed vtable, which
    /// was captured from the real stored type at construction.
    #[must_use]
    pub fn downcast_ref<F: 'static>(&self) -> Option<&F> {
        if self.vtable.type_id() == TypeId::of::<F>() {
            // SAFETY: the installed vtable records the TypeId of the stored
            // type, and it equals `F`'s, so the buffer holds an `F` in the
            // representation selected by `fits_inline::<F>()`.
            Some(unsafe { self.value_ref::<F>() })
        } else {
            None
        }
    }

    /// Returns a mutable reference to the stored callable if it has exactly
    /// the concrete type `F`.
    ///
    /// Returns `None` when the cell is empty or holds a different type.
    #[must_use]
    pub fn downcast_mut<F: 'static>(&mut self) -> Option<&mut F> {
        if self.vtable.type_id() == TypeId::of::<F>() {
            // SAFETY: as in `downcast_ref`, the vtable's recorded TypeId
            // proves the buffer holds an `F`.
            Some(unsafe { self.value_mut::<F>() })
        } else {
            None
        }
    }

    /// Moves the stored callable out into a fresh cell, leaving `self`
    /// empty.
    ///
    /// For an inline value this relocates the bytes; for a boxed value only
    /// the heap pointer changes hands, with no allocation. Taking from an
    /// empty cell yields another empty cell.
    #[must_use]
    pub fn take(&mut self) -> Self {
        let mut dest = Self::empty();
        let vtable = self.vtable;
        // SAFETY: `vtable` matches `self`'s contents, and `dest` is a fresh
        // empty cell, satisfying the relocate operation's contract.
        unsafe { vtable.relocate(self, &mut dest) };
        dest
    }

    /// Drops the stored callable in place, leaving the cell empty.
    ///
    /// Clearing an already-empty cell is a no-op; the operation is
    /// idempotent because every drop resets the cell to the empty vtable
    /// before anything else can observe it.
    pub fn clear(&mut self) {
        let vtable = self.vtable;
        // SAFETY: `vtable` matches `self`'s contents; the drop operation
        // resets the cell to empty, so repeating it dispatches to the empty
        // vtable's no-op.
        unsafe { vtable.drop(self) };
    }

    /// Returns a reference to the stored value, resolving the inline/boxed
    /// representation from `F`'s layout.
    ///
    /// # Safety
    ///
    /// The caller must ensure that the cell currently holds a value of
    /// exactly the type `F`.
    pub(super) unsafe fn value_ref<F: 'static>(&self) -> &F {
        // Debug assertion to catch type confusion in case of bugs
        debug_assert_eq!(self.vtable.type_id(), TypeId::of::<F>());

        if fits_inline::<F>() {
            // SAFETY: inline representation: the buffer holds an initialized
            // `F` at its start, properly aligned, as guaranteed by the
            // caller and the layout predicate.
            unsafe { &*self.buffer.as_ptr().cast::<F>() }
        } else {
            // SAFETY: boxed representation: the buffer slot holds the
            // pointer produced by `Box::into_raw`, as guaranteed by the
            // caller.
            let ptr: *mut F = unsafe { *self.buffer.as_ptr().cast::<*mut F>() };
            // SAFETY: the pointee is the live heap value owned by this cell;
            // the returned borrow is tied to `self`, so it cannot outlive
            // the cell dropping or relocating it.
            unsafe { &*ptr }
        }
    }

    /// Returns a mutable reference to the stored value, resolving the
    /// inline/boxed representation from `F`'s layout.
    ///
    /// # Safety
    ///
    /// The caller must ensure that the cell currently holds a value of
    /// exactly the type `F`.
    pub(super) unsafe fn value_mut<F: 'static>(&mut self) -> &mut F {
        debug_assert_eq!(self.vtable.type_id(), TypeId::of::<F>());

        if fits_inline::<F>() {
            // SAFETY: inline representation, as in `value_ref`; the mutable
            // borrow of `self` grants exclusive access.
            unsafe { &mut *self.buffer.as_mut_ptr().cast::<F>() }
        } else {
            // SAFETY: boxed representation, as in `value_ref`.
            let ptr: *mut F = unsafe { *self.buffer.as_ptr().cast::<*mut F>() };
            // SAFETY: the pointee is the live heap value exclusively owned
            // by this cell, and `self` is borrowed mutably.
            unsafe { &mut *ptr }
        }
    }

    /// Installs `value` into the buffer, inline or boxed per
    /// [`fits_inline::<F>()`](fits_inline). Does not touch the vtable.
    ///
    /// # Safety
    ///
    /// The caller must ensure that the cell holds no prior value (its buffer
    /// is overwritten without being dropped), and must install a vtable
    /// matching `F` before the cell is used or dropped.
    pub(super) unsafe fn write_value<F: 'static>(&mut self, value: F) {
        if fits_inline::<F>() {
            // SAFETY: the buffer is large and aligned enough for `F` by the
            // layout predicate, and holds no prior value per the caller.
            unsafe { self.buffer.as_mut_ptr().cast::<F>().write(value) };
        } else {
            let ptr: *mut F = Box::into_raw(Box::new(value));
            // SAFETY: the buffer holds no prior value per the caller; it now
            // records the heap pointer owning `value`.
            unsafe { self.buffer.as_mut_ptr().cast::<*mut F>().write(ptr) };
        }
    }

    /// Reads the stored value out of the inline buffer by value,
    /// transferring ownership to the caller.
    ///
    /// # Safety
    ///
    /// The caller must ensure that the cell holds a value of exactly the
    /// inline-eligible type `F`, and must treat the buffer as uninitialized
    /// afterwards (installing the empty vtable or a new value).
    pub(super) unsafe fn read_value_inline<F: 'static>(&mut self) -> F {
        debug_assert!(fits_inline::<F>());
        debug_assert_eq!(self.vtable.type_id(), TypeId::of::<F>());

        // SAFETY: the buffer holds an initialized `F` per the caller;
        // ownership moves out and the caller takes over the now-stale
        // buffer.
        unsafe { self.buffer.as_ptr().cast::<F>().read() }
    }

    /// Reads the heap pointer out of the buffer slot.
    ///
    /// # Safety
    ///
    /// The caller must ensure that the cell is in the boxed representation;
    /// ownership of the pointee is unaffected.
    pub(super) unsafe fn ptr_slot(&self) -> *mut () {
        // SAFETY: the boxed representation keeps the slot initialized with
        // the `Box::into_raw` pointer, as guaranteed by the caller.
        unsafe { self.buffer.assume_init_read() }
    }

    /// Stores a heap pointer into the buffer slot. Does not touch the
    /// vtable.
    ///
    /// The write itself is safe; pairing it with a vtable that will
    /// interpret the slot is the caller's (unsafe) responsibility, exactly
    /// as with [`write_value`](Self::write_value).
    pub(super) fn set_ptr_slot(&mut self, ptr: *mut ()) {
        self.buffer.write(ptr);
    }

    /// Returns the currently installed vtable.
    #[inline]
    pub(super) fn vtable(&self) -> &'static StorageVtable<Args, R> {
        self.vtable
    }

    /// Installs a new vtable, changing how the buffer is interpreted.
    #[inline]
    pub(super) fn set_vtable(&mut self, vtable: &'static StorageVtable<Args, R>) {
        self.vtable = vtable;
    }
}

impl<Args: 'static, R: 'static> Clone for RawFunction<Args, R> {
    fn clone(&self) -> Self {
        let mut dest = Self::empty();
        let vtable = self.vtable;
        // SAFETY: `vtable` matches `self`'s contents, and `dest` is a fresh
        // empty cell, satisfying the clone operation's contract.
        unsafe { vtable.clone(self, &mut dest) };
        dest
    }
}

impl<Args: 'static, R: 'static> Drop for RawFunction<Args, R> {
    fn drop(&mut self) {
        let vtable = self.vtable;
        // SAFETY: `vtable` matches `self`'s contents. The operation resets
        // the cell to empty, so a cell cleared earlier dispatches to the
        // empty vtable's no-op here.
        unsafe { vtable.drop(self) };
    }
}
