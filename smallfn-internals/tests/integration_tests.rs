//! Integration tests for the smallfn-internals crate functionality.
//!
//! This test suite exercises the public surface of the crate through the
//! [`RawFunction`] storage cell and the [`Callable`] trait:
//!
//! ## Storage Tests
//! - `test_empty_cell_operations`: Behavior of the cell holding nothing
//! - `test_inline_callable_lifecycle`: Construction, invocation, clone,
//!   take, and drop of an inline-stored callable
//! - `test_boxed_callable_lifecycle`: The same lifecycle for a heap-stored
//!   callable with a large capture
//! - `test_stateful_closure_semantics`: Mutation of captured state across
//!   invocations and independence of clones
//! - `test_cell_reuse_across_types`: Several cells of the same signature
//!   holding different concrete types
//!
//! ## Identity Tests
//! - `test_type_identity_and_downcasting`: TypeId reporting and checked
//!   downcasts, including failure cases
//! - `test_type_name_reporting`: Human-readable names for stored callables
//!   and the empty cell
//!
//! ## Trait Tests
//! - `test_callable_arities`: The `Callable` blanket implementations across
//!   argument counts
//! - `test_unit_return`: Callables producing `()`

use core::any::TypeId;
use std::{cell::Cell, rc::Rc};

use smallfn_internals::{Callable, RawFunction, fits_inline};

#[test]
fn test_empty_cell_operations() {
    let mut cell = RawFunction::<(i32,), i32>::empty();
    assert!(cell.is_empty());
    assert_eq!(cell.type_id(), None);
    assert_eq!(cell.type_name(), "<empty>");
    assert_eq!(cell.invoke((7,)), None);
    assert!(cell.downcast_ref::<fn(i32) -> i32>().is_none());
    assert!(cell.downcast_mut::<fn(i32) -> i32>().is_none());

    // Empty cells clone to empty cells and take to empty cells.
    let mut copied = cell.clone();
    assert!(copied.is_empty());
    assert_eq!(copied.invoke((7,)), None);

    let mut taken = cell.take();
    assert!(taken.is_empty());
    assert_eq!(taken.invoke((7,)), None);

    cell.clear();
    assert!(cell.is_empty());
}

#[test]
fn test_inline_callable_lifecycle() {
    let offset = 10_i32;
    assert!(fits_inline::<i32>());

    let mut cell = RawFunction::<(i32,), i32>::new(move |x| x + offset);
    assert!(!cell.is_empty());
    assert_eq!(cell.invoke((5,)), Some(15));

    let mut copied = cell.clone();
    assert_eq!(copied.invoke((0,)), Some(10));

    let mut taken = cell.take();
    assert!(cell.is_empty());
    assert_eq!(cell.invoke((5,)), None);
    assert_eq!(taken.invoke((5,)), Some(15));
}

#[test]
fn test_boxed_callable_lifecycle() {
    // Sixteen words of captured state, far beyond the inline buffer.
    let table = [3_usize; 16];
    assert!(!fits_inline::<[usize; 16]>());

    let mut cell = RawFunction::<(usize,), usize>::new(move |i| table[i] * i);
    assert_eq!(cell.invoke((4,)), Some(12));

    let mut copied = cell.clone();
    assert_eq!(copied.invoke((5,)), Some(15));

    let mut taken = cell.take();
    assert!(cell.is_empty());
    assert_eq!(taken.invoke((4,)), Some(12));

    // Dropping all three owners releases their heap state without issue.
    drop(cell);
    drop(copied);
    drop(taken);
}

#[test]
fn test_stateful_closure_semantics() {
    let mut total = 0_i64;
    let mut acc = RawFunction::<(i64,), i64>::new(move |x| {
        total += x;
        total
    });

    assert_eq!(acc.invoke((3,)), Some(3));
    assert_eq!(acc.invoke((4,)), Some(7));

    // A clone snapshots the accumulated state and then diverges.
    let mut fork = acc.clone();
    assert_eq!(fork.invoke((100,)), Some(107));
    assert_eq!(acc.invoke((1,)), Some(8));
    assert_eq!(fork.invoke((1,)), Some(108));
}

#[test]
fn test_cell_reuse_across_types() {
    fn halve(x: i32) -> i32 {
        x / 2
    }

    let mut cells: Vec<RawFunction<(i32,), i32>> = vec![
        RawFunction::new(halve as fn(i32) -> i32),
        RawFunction::new(|x: i32| x * x),
        RawFunction::empty(),
    ];

    assert_eq!(cells[0].invoke((8,)), Some(4));
    assert_eq!(cells[1].invoke((8,)), Some(64));
    assert_eq!(cells[2].invoke((8,)), None);

    // Each cell carries the identity of its own concrete type.
    assert_eq!(cells[0].type_id(), Some(TypeId::of::<fn(i32) -> i32>()));
    assert_ne!(cells[0].type_id(), cells[1].type_id());
    assert_eq!(cells[2].type_id(), None);
}

#[test]
fn test_type_identity_and_downcasting() {
    fn negate(x: i32) -> i32 {
        -x
    }
    let mut cell = RawFunction::<(i32,), i32>::new(negate as fn(i32) -> i32);

    let recovered = cell.downcast_ref::<fn(i32) -> i32>();
    assert!(recovered.is_some());
    assert_eq!(recovered.unwrap()(3), -3);

    // A mismatched concrete type is rejected even with identical signature
    // shape at the cell level.
    assert!(cell.downcast_ref::<i32>().is_none());

    // Replacing the value through a mutable downcast redirects invocation.
    fn shift(x: i32) -> i32 {
        x << 1
    }
    *cell.downcast_mut::<fn(i32) -> i32>().unwrap() = shift;
    assert_eq!(cell.invoke((3,)), Some(6));
}

#[test]
fn test_type_name_reporting() {
    let cell = RawFunction::<(i32,), i32>::new(core::convert::identity as fn(i32) -> i32);
    assert_eq!(cell.type_name(), core::any::type_name::<fn(i32) -> i32>());

    let empty = RawFunction::<(i32,), i32>::empty();
    assert_eq!(empty.type_name(), "<empty>");
}

#[test]
fn test_callable_arities() {
    let mut constant = || 42_i32;
    assert_eq!(Callable::<()>::call(&mut constant, ()), 42);

    let mut add2 = |a: i32, b: i32| a + b;
    assert_eq!(add2.call((3, 4)), 7);

    let mut join4 = |a: u8, b: u8, c: u8, d: u8| u32::from_be_bytes([a, b, c, d]);
    assert_eq!(join4.call((0, 0, 1, 0)), 256);

    let mut cell = RawFunction::<(i32, i32, i32), i32>::new(|a: i32, b: i32, c: i32| a * b + c);
    assert_eq!(cell.invoke((2, 3, 4)), Some(10));
}

#[test]
fn test_unit_return() {
    let hits = Rc::new(Cell::new(0_u32));
    let handle = Rc::clone(&hits);

    let mut cell = RawFunction::<(u32,), ()>::new(move |n| {
        handle.set(handle.get() + n);
    });

    assert_eq!(cell.invoke((5,)), Some(()));
    assert_eq!(cell.invoke((7,)), Some(()));
    assert_eq!(hits.get(), 12);

    drop(cell);
    assert_eq!(Rc::strong_count(&hits), 1);
}
