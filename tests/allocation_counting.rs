//! Verifies which callables are stored inline and which are boxed, by
//! counting heap allocations through a wrapping global allocator.
//!
//! The counter is process-global, so everything lives in a single test
//! function; independent test threads would see each other's allocations.

use std::{
    alloc::{GlobalAlloc, Layout, System},
    sync::atomic::{AtomicUsize, Ordering},
};

use smallfn::{Function, fits_inline};

struct CountingAllocator;

static ALLOCATIONS: AtomicUsize = AtomicUsize::new(0);

// SAFETY: all calls are forwarded unchanged to the system allocator; only a
// side counter is updated.
unsafe impl GlobalAlloc for CountingAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        ALLOCATIONS.fetch_add(1, Ordering::SeqCst);
        // SAFETY: the layout is forwarded unchanged from our caller.
        unsafe { System.alloc(layout) }
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        // SAFETY: `ptr` and `layout` are forwarded unchanged from our
        // caller, who got `ptr` from our `alloc`.
        unsafe { System.dealloc(ptr, layout) }
    }
}

#[global_allocator]
static GLOBAL: CountingAllocator = CountingAllocator;

/// Runs `f` and returns how many heap allocations it performed.
fn allocations_during<T>(f: impl FnOnce() -> T) -> (T, usize) {
    let before = ALLOCATIONS.load(Ordering::SeqCst);
    let value = f();
    let after = ALLOCATIONS.load(Ordering::SeqCst);
    (value, after - before)
}

#[test]
fn test_storage_representation_boundary() {
    const WORD: usize = size_of::<usize>();

    // A capture of exactly one pointer's worth of bytes sits on the inline
    // side of the boundary; one more byte pushes it to the heap.
    assert!(fits_inline::<[u8; WORD]>());
    assert!(!fits_inline::<[u8; WORD + 1]>());

    let small = [7_u8; WORD];
    let (mut inline_fn, count) =
        allocations_during(|| Function::new(move |i: usize| small[i % WORD]));
    assert_eq!(count, 0, "pointer-sized capture must be stored inline");

    let large = [7_u8; WORD + 1];
    let (mut boxed_fn, count) =
        allocations_during(|| Function::new(move |i: usize| large[i % (WORD + 1)]));
    assert_eq!(count, 1, "oversized capture must be boxed exactly once");

    assert_eq!(inline_fn.call((3,)), Ok(7));
    assert_eq!(boxed_fn.call((3,)), Ok(7));

    // Invoking never allocates, for either representation.
    let ((), count) = allocations_during(|| {
        for i in 0..32 {
            let _ = inline_fn.call((i,));
            let _ = boxed_fn.call((i,));
        }
    });
    assert_eq!(count, 0, "calls must not allocate");

    // Cloning duplicates the representation of the original.
    let (inline_clone, count) = allocations_during(|| inline_fn.clone());
    assert_eq!(count, 0, "inline clones must stay inline");
    let (boxed_clone, count) = allocations_during(|| boxed_fn.clone());
    assert_eq!(count, 1, "boxed clones allocate their own box");

    // Moving the callable out transfers the existing box instead of
    // reallocating.
    let ((inline_taken, boxed_taken), count) =
        allocations_during(|| (inline_fn.take(), boxed_fn.take()));
    assert_eq!(count, 0, "take must transfer storage without allocating");

    let ((), count) = allocations_during(|| {
        drop(inline_clone);
        drop(boxed_clone);
        drop(inline_taken);
        drop(boxed_taken);
    });
    assert_eq!(count, 0, "drops must not allocate");
}
