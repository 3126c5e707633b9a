//! The call-signature abstraction satisfied by storable callables.
//!
//! Rust has no variadic generics, so a call signature is expressed as a
//! single tuple type: a signature taking an `i32` and a `&'static str` is
//! the tuple `(i32, &'static str)`. The [`Callable`] trait maps that tuple
//! back onto an ordinary call, and blanket implementations bridge every
//! matching [`FnMut`] implementor of arity 0 through 12, which covers
//! closures, function pointers, and anything else the language considers
//! callable.

/// A value callable with the argument tuple `Args`.
///
/// This is the stable-Rust stand-in for the unstable `FnMut<Args>` family.
/// It is implemented for every `F: FnMut(A0, .., An) -> R + 'static` with
/// `Args = (A0, .., An)` for arities 0 through 12, so it does not normally
/// need to be (and, due to the blanket implementations, cannot be) implemented
/// by hand.
///
/// # Examples
///
/// ```
/// use smallfn_internals::Callable;
///
/// let mut double = |x: i32| x * 2;
/// assert_eq!(Callable::<(i32,)>::call(&mut double, (5,)), 10);
///
/// let mut join = |a: &'static str, b: &'static str| [a, b].concat();
/// assert_eq!(Callable::call(&mut join, ("small", "fn")), "smallfn");
/// ```
pub trait Callable<Args>: 'static {
    /// The type returned by the call.
    type Output;

    /// Invokes the callable with the packed argument tuple.
    fn call(&mut self, args: Args) -> Self::Output;
}

/// Implements [`Callable`] for all [`FnMut`] implementors of one arity.
macro_rules! impl_callable {
    ($(($value:ident, $ty:ident)),*) => {
        impl<Func, Ret, $($ty),*> Callable<($($ty,)*)> for Func
        where
            Func: FnMut($($ty),*) -> Ret + 'static,
        {
            type Output = Ret;

            #[inline]
            fn call(&mut self, ($($value,)*): ($($ty,)*)) -> Ret {
                self($($value),*)
            }
        }
    };
}

impl_callable!();
impl_callable!((a0, A0));
impl_callable!((a0, A0), (a1, A1));
impl_callable!((a0, A0), (a1, A1), (a2, A2));
impl_callable!((a0, A0), (a1, A1), (a2, A2), (a3, A3));
impl_callable!((a0, A0), (a1, A1), (a2, A2), (a3, A3), (a4, A4));
impl_callable!((a0, A0), (a1, A1), (a2, A2), (a3, A3), (a4, A4), (a5, A5));
impl_callable!(
    (a0, A0),
    (a1, A1),
    (a2, A2),
    (a3, A3),
    (a4, A4),
    (a5, A5),
    (a6, A6)
);
impl_callable!(
    (a0, A0),
    (a1, A1),
    (a2, A2),
    (a3, A3),
    (a4, A4),
    (a5, A5),
    (a6, A6),
    (a7, A7)
);
impl_callable!(
    (a0, A0),
    (a1, A1),
    (a2, A2),
    (a3, A3),
    (a4, A4),
    (a5, A5),
    (a6, A6),
    (a7, A7),
    (a8, A8)
);
impl_callable!(
    (a0, A0),
    (a1, A1),
    (a2, A2),
    (a3, A3),
    (a4, A4),
    (a5, A5),
    (a6, A6),
    (a7, A7),
    (a8, A8),
    (a9, A9)
);
impl_callable!(
    (a0, A0),
    (a1, A1),
    (a2, A2),
    (a3, A3),
    (a4, A4),
    (a5, A5),
    (a6, A6),
    (a7, A7),
    (a8, A8),
    (a9, A9),
    (a10, A10)
);
impl_callable!(
    (a0, A0),
    (a1, A1),
    (a2, A2),
    (a3, A3),
    (a4, A4),
    (a5, A5),
    (a6, A6),
    (a7, A7),
    (a8, A8),
    (a9, A9),
    (a10, A10),
    (a11, A11)
);
