//! Vtable for [`RawFunction`] storage cells.
//!
//! A [`StorageVtable`] is created for each concrete callable type stored in
//! a cell, using the [`StorageVtable::new`] method, plus one distinguished
//! table ([`StorageVtable::empty`]) describing the cell holding nothing.
//! Each table is synthesized in a `const` block, so it is built at compile
//! time, promoted to a `&'static`, and shared by every cell storing that
//! concrete type.
//!
//! The table captures everything the cell needs to know about the erased
//! type: its identity (for downcasting), its name (for diagnostics), and the
//! four operations (clone, relocate, invoke, drop) specialized to the
//! representation `fits_inline` selected for it. After construction the cell
//! never branches on the concrete type again; it only dispatches.
//!
//! # Safety
//!
//! Every operation in the table receives cells whose contents it
//! reinterprets at the concrete type the table was synthesized for. The
//! functions in this module are sound because the only way to install a
//! table into a cell pairs it with a matching value (see the safety
//! invariant in [`raw`](super::raw)).

use alloc::boxed::Box;
use core::{any::TypeId, ptr};

use crate::{
    Callable,
    storage::raw::{RawFunction, fits_inline},
    util::Empty,
};

/// A vtable for the storage cell of a type-erased callable.
pub(crate) struct StorageVtable<Args: 'static, R: 'static> {
    /// Returns the [`TypeId`] of the stored type.
    type_id: fn() -> TypeId,
    /// Returns the [`core::any::type_name`] of the stored type.
    type_name: fn() -> &'static str,
    /// Clones the value in `src` into the fresh empty cell `dest`.
    clone: unsafe fn(&RawFunction<Args, R>, &mut RawFunction<Args, R>),
    /// Moves the value in `src` into the fresh empty cell `dest`, leaving
    /// `src` empty.
    relocate: unsafe fn(&mut RawFunction<Args, R>, &mut RawFunction<Args, R>),
    /// Invokes the stored value with `args`. Returns `None` only from the
    /// empty table.
    invoke: unsafe fn(&mut RawFunction<Args, R>, Args) -> Option<R>,
    /// Drops the stored value in place and resets the cell to empty.
    drop: unsafe fn(&mut RawFunction<Args, R>),
}

impl<Args: 'static, R: 'static> StorageVtable<Args, R> {
    /// Creates a new vtable for callables of type `F`.
    ///
    /// The relocate and drop slots are chosen per `F`'s representation; the
    /// remaining slots are representation-agnostic, going through the cell
    /// accessors that resolve the representation themselves.
    pub(super) const fn new<F>() -> &'static Self
    where
        F: Callable<Args, Output = R> + Clone,
    {
        if fits_inline::<F>() {
            const {
                &Self {
                    type_id: TypeId::of::<F>,
                    type_name: core::any::type_name::<F>,
                    clone: clone_value::<Args, R, F>,
                    relocate: relocate_inline::<Args, R, F>,
                    invoke: invoke_value::<Args, R, F>,
                    drop: drop_inline::<Args, R, F>,
                }
            }
        } else {
            const {
                &Self {
                    type_id: TypeId::of::<F>,
                    type_name: core::any::type_name::<F>,
                    clone: clone_value::<Args, R, F>,
                    relocate: relocate_boxed::<Args, R>,
                    invoke: invoke_value::<Args, R, F>,
                    drop: drop_boxed::<Args, R, F>,
                }
            }
        }
    }

    /// Returns the vtable describing a cell holding nothing.
    ///
    /// Empty cells get a real dispatch table rather than a null sentinel:
    /// every operation stays a plain indirect call with no precondition
    /// branch, and emptiness itself is just this table's identity.
    pub(super) const fn empty() -> &'static Self {
        const {
            &Self {
                type_id: TypeId::of::<Empty>,
                type_name: empty_type_name,
                clone: clone_empty,
                relocate: relocate_empty,
                invoke: invoke_empty,
                drop: drop_empty,
            }
        }
    }

    /// Returns the [`TypeId`] of the type this vtable was created for.
    ///
    /// The empty table reports the `TypeId` of a private marker type, which
    /// can never collide with a storable callable.
    #[inline]
    pub(super) fn type_id(&self) -> TypeId {
        (self.type_id)()
    }

    /// Returns the type name of the type this vtable was created for, or
    /// `"<empty>"` for the empty table.
    #[inline]
    pub(super) fn type_name(&self) -> &'static str {
        (self.type_name)()
    }

    /// Clones the value stored in `src` into `dest`.
    ///
    /// # Safety
    ///
    /// `src` must be the cell this vtable is installed in, and `dest` must
    /// be a fresh empty cell.
    #[inline]
    pub(super) unsafe fn clone(
        &self,
        src: &RawFunction<Args, R>,
        dest: &mut RawFunction<Args, R>,
    ) {
        // SAFETY: We know that `self.clone` points to `clone_value::<_, _, F>`
        // (or the empty no-op) for the type this table was created for. Its
        // requirements on `src` and `dest` are guaranteed by the caller.
        unsafe { (self.clone)(src, dest) }
    }

    /// Moves the value stored in `src` into `dest`, leaving `src` empty.
    ///
    /// # Safety
    ///
    /// `src` must be the cell this vtable is installed in, and `dest` must
    /// be a fresh empty cell.
    #[inline]
    pub(super) unsafe fn relocate(
        &self,
        src: &mut RawFunction<Args, R>,
        dest: &mut RawFunction<Args, R>,
    ) {
        // SAFETY: We know that `self.relocate` points to the relocate
        // function matching the representation this table was created for.
        // Its requirements on `src` and `dest` are guaranteed by the caller.
        unsafe { (self.relocate)(src, dest) }
    }

    /// Invokes the value stored in `cell` with `args`, or returns `None`
    /// from the empty table.
    ///
    /// # Safety
    ///
    /// `cell` must be the cell this vtable is installed in.
    #[inline]
    pub(super) unsafe fn invoke(
        &self,
        cell: &mut RawFunction<Args, R>,
        args: Args,
    ) -> Option<R> {
        // SAFETY: We know that `self.invoke` points to `invoke_value::<_, _,
        // F>` (or the empty table's `None`) for the type this table was
        // created for. Its requirement on `cell` is guaranteed by the caller.
        unsafe { (self.invoke)(cell, args) }
    }

    /// Drops the value stored in `cell` and resets the cell to empty.
    ///
    /// # Safety
    ///
    /// `cell` must be the cell this vtable is installed in.
    #[inline]
    pub(super) unsafe fn drop(&self, cell: &mut RawFunction<Args, R>) {
        // SAFETY: We know that `self.drop` points to the drop function
        // matching the representation this table was created for. Its
        // requirement on `cell` is guaranteed by the caller.
        unsafe { (self.drop)(cell) }
    }
}

/// Type name reported for the empty cell.
fn empty_type_name() -> &'static str {
    "<empty>"
}

/// Clones the `F` in `src` into `dest`, installing `src`'s vtable there.
///
/// The same function serves both representations: the typed accessor and the
/// typed write each resolve the representation from `F`'s layout.
///
/// # Safety
///
/// `src` must hold a value of type `F`, and `dest` must be a fresh empty
/// cell.
unsafe fn clone_value<Args: 'static, R: 'static, F: Clone + 'static>(
    src: &RawFunction<Args, R>,
    dest: &mut RawFunction<Args, R>,
) {
    // SAFETY: `src` holds an `F` per the caller.
    let value = unsafe { src.value_ref::<F>() }.clone();
    // SAFETY: `dest` is a fresh empty cell per the caller, and `src`'s
    // vtable, the one for `F`, is installed immediately after.
    unsafe { dest.write_value(value) };
    dest.set_vtable(src.vtable());
}

/// Moves the inline `F` out of `src` into `dest`, leaving `src` empty.
///
/// # Safety
///
/// `src` must hold an inline value of type `F`, and `dest` must be a fresh
/// empty cell.
unsafe fn relocate_inline<Args: 'static, R: 'static, F: 'static>(
    src: &mut RawFunction<Args, R>,
    dest: &mut RawFunction<Args, R>,
) {
    // SAFETY: `src` holds an inline `F` per the caller; its buffer is stale
    // after the read and the empty vtable is installed below.
    let value = unsafe { src.read_value_inline::<F>() };
    // SAFETY: `dest` is a fresh empty cell per the caller, and the matching
    // vtable is installed immediately after.
    unsafe { dest.write_value(value) };
    dest.set_vtable(src.vtable());
    src.set_vtable(StorageVtable::empty());
}

/// Moves the heap pointer of a boxed value from `src` to `dest`, leaving
/// `src` empty. No allocation, no typed access: the pointee never moves.
///
/// # Safety
///
/// `src` must be in the boxed representation, and `dest` must be a fresh
/// empty cell.
unsafe fn relocate_boxed<Args: 'static, R: 'static>(
    src: &mut RawFunction<Args, R>,
    dest: &mut RawFunction<Args, R>,
) {
    // SAFETY: `src` is in the boxed representation per the caller, so the
    // slot holds its heap pointer.
    let ptr = unsafe { src.ptr_slot() };
    dest.set_ptr_slot(ptr);
    dest.set_vtable(src.vtable());
    src.set_vtable(StorageVtable::empty());
}

/// Invokes the `F` in `cell` with `args`.
///
/// # Safety
///
/// `cell` must hold a value of type `F`.
unsafe fn invoke_value<Args: 'static, R: 'static, F>(
    cell: &mut RawFunction<Args, R>,
    args: Args,
) -> Option<R>
where
    F: Callable<Args, Output = R>,
{
    // SAFETY: `cell` holds an `F` per the caller.
    let callable = unsafe { cell.value_mut::<F>() };
    Some(callable.call(args))
}

/// Drops the inline `F` in `cell` in place and resets the cell to empty.
///
/// # Safety
///
/// `cell` must hold an inline value of type `F`.
unsafe fn drop_inline<Args: 'static, R: 'static, F: 'static>(
    cell: &mut RawFunction<Args, R>,
) {
    // SAFETY: `cell` holds an inline `F` per the caller. The pointer is
    // taken before the vtable flips to empty, and stays valid through the
    // in-place drop: nothing else can observe the cell in between.
    let value: *mut F = unsafe { cell.value_mut::<F>() };
    cell.set_vtable(StorageVtable::empty());
    // SAFETY: `value` points at the initialized `F` still sitting in the
    // buffer; the empty vtable ensures the buffer is treated as
    // uninitialized from now on.
    unsafe { ptr::drop_in_place(value) };
}

/// Drops the boxed `F` owned by `cell` and resets the cell to empty.
///
/// # Safety
///
/// `cell` must be in the boxed representation with a pointee of type `F`.
unsafe fn drop_boxed<Args: 'static, R: 'static, F: 'static>(
    cell: &mut RawFunction<Args, R>,
) {
    // SAFETY: `cell` is in the boxed representation per the caller, so the
    // slot holds its heap pointer.
    let ptr = unsafe { cell.ptr_slot() };
    cell.set_vtable(StorageVtable::empty());
    // SAFETY: `ptr` came from `Box::into_raw` on a `Box<F>` owned solely by
    // the cell, which has just given up its claim.
    drop(unsafe { Box::from_raw(ptr.cast::<F>()) });
}

/// No-op clone for the empty cell: `dest` already is one.
///
/// # Safety
///
/// Trivially safe; the signature is unsafe to fit the vtable slot.
unsafe fn clone_empty<Args: 'static, R: 'static>(
    _src: &RawFunction<Args, R>,
    _dest: &mut RawFunction<Args, R>,
) {
}

/// No-op relocate for the empty cell: both cells already are empty.
///
/// # Safety
///
/// Trivially safe; the signature is unsafe to fit the vtable slot.
unsafe fn relocate_empty<Args: 'static, R: 'static>(
    _src: &mut RawFunction<Args, R>,
    _dest: &mut RawFunction<Args, R>,
) {
}

/// Invoke on the empty cell: reports the absence, dropping the arguments.
///
/// # Safety
///
/// Trivially safe; the signature is unsafe to fit the vtable slot.
unsafe fn invoke_empty<Args: 'static, R: 'static>(
    _cell: &mut RawFunction<Args, R>,
    _args: Args,
) -> Option<R> {
    None
}

/// No-op drop for the empty cell: there is nothing to drop.
///
/// # Safety
///
/// Trivially safe; the signature is unsafe to fit the vtable slot.
unsafe fn drop_empty<Args: 'static, R: 'static>(_cell: &mut RawFunction<Args, R>) {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vtable_records_concrete_type() {
        let doubler = StorageVtable::<(i32,), i32>::new::<fn(i32) -> i32>();
        assert_eq!(doubler.type_id(), TypeId::of::<fn(i32) -> i32>());
        assert_eq!(doubler.type_name(), core::any::type_name::<fn(i32) -> i32>());
    }

    #[test]
    fn test_distinct_types_get_distinct_identities() {
        let narrow = StorageVtable::<(i32,), i32>::new::<fn(i32) -> i32>();
        let unit = StorageVtable::<(), ()>::new::<fn()>();
        assert_ne!(narrow.type_id(), unit.type_id());
    }

    #[test]
    fn test_empty_vtable_identity() {
        let empty = StorageVtable::<(), ()>::empty();
        assert_eq!(empty.type_id(), TypeId::of::<Empty>());
        assert_eq!(empty.type_name(), "<empty>");

        let real = StorageVtable::<(), ()>::new::<fn()>();
        assert_ne!(empty.type_id(), real.type_id());
    }
}
