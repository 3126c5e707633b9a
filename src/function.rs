//! The [`Function`] wrapper around a type-erased callable.

use core::fmt;

use smallfn_internals::{Callable, RawFunction};

use crate::error::BadFunctionCall;

/// An owning, clonable wrapper around a type-erased callable.
///
/// A `Function<Args, R>` holds zero or one callable taking the argument
/// tuple `Args` and returning `R`. The concrete type of the callable is
/// erased: function pointers, capturing closures, and anything else
/// implementing [`Callable`] all fit behind the same two-word wrapper.
///
/// Callables no larger than a pointer are stored inline with no heap
/// allocation; larger ones are boxed. The choice is made per concrete type
/// at compile time and can be predicted with
/// [`fits_inline`](crate::fits_inline).
///
/// # Examples
///
/// Wrapping a capturing closure:
///
/// ```
/// use smallfn::Function;
///
/// let greeting = 3;
/// let mut repeat = Function::new(move |s: &'static str| {
///     let mut out = String::new();
///     for _ in 0..greeting {
///         out.push_str(s);
///     }
///     out
/// });
///
/// assert_eq!(repeat.call(("hi",)), Ok(String::from("hihihi")));
/// ```
///
/// Swapping the stored callable at runtime:
///
/// ```
/// use smallfn::Function;
///
/// let mut op = Function::new(|x: i32| x + 1);
/// assert_eq!(op.call((10,)), Ok(11));
///
/// op = Function::new(|x: i32| x * x);
/// assert_eq!(op.call((10,)), Ok(100));
/// ```
pub struct Function<Args: 'static, R: 'static> {
    storage: RawFunction<Args, R>,
}

impl<Args: 'static, R: 'static> Function<Args, R> {
    /// Creates a function wrapping `callable`.
    ///
    /// The callable must be [`Clone`] so the wrapper itself stays clonable
    /// after the concrete type is erased.
    ///
    /// # Examples
    ///
    /// ```
    /// use smallfn::Function;
    ///
    /// let mut min = Function::new(i32::min as fn(i32, i32) -> i32);
    /// assert_eq!(min.call((3, 7)), Ok(3));
    /// ```
    #[must_use]
    pub fn new<F>(callable: F) -> Self
    where
        F: Callable<Args, Output = R> + Clone,
    {
        Self {
            storage: RawFunction::new(callable),
        }
    }

    /// Creates a function holding no callable.
    ///
    /// Calling it reports [`BadFunctionCall`] until a callable is assigned.
    ///
    /// # Examples
    ///
    /// ```
    /// use smallfn::Function;
    ///
    /// let mut f = Function::<(i32,), i32>::empty();
    /// assert!(f.call((1,)).is_err());
    /// ```
    #[must_use]
    pub fn empty() -> Self {
        Self {
            storage: RawFunction::empty(),
        }
    }

    /// Returns `true` if the function holds no callable.
    ///
    /// # Examples
    ///
    /// ```
    /// use smallfn::Function;
    ///
    /// let f = Function::new(|| ());
    /// assert!(!f.is_empty());
    /// assert!(Function::<(), ()>::empty().is_empty());
    /// ```
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    /// Returns `true` if the function holds a callable.
    #[inline]
    #[must_use]
    pub fn is_some(&self) -> bool {
        !self.storage.is_empty()
    }

    /// Invokes the stored callable with the argument tuple `args`.
    ///
    /// Returns `Err(BadFunctionCall)` if the function is empty; a stored
    /// callable always produces `Ok`.
    ///
    /// # Examples
    ///
    /// ```
    /// use smallfn::{BadFunctionCall, Function};
    ///
    /// let mut sum3 = Function::new(|a: u32, b: u32, c: u32| a + b + c);
    /// assert_eq!(sum3.call((1, 2, 3)), Ok(6));
    ///
    /// let mut gone = sum3.take();
    /// assert_eq!(sum3.call((1, 2, 3)), Err(BadFunctionCall));
    /// assert_eq!(gone.call((1, 2, 3)), Ok(6));
    /// ```
    pub fn call(&mut self, args: Args) -> Result<R, BadFunctionCall> {
        self.storage.invoke(args).ok_or(BadFunctionCall)
    }

    /// Returns a shared reference to the stored callable if it has exactly
    /// the concrete type `F`.
    ///
    /// Returns `None` when the function is empty or stores a different
    /// type. Closure types cannot be named, so downcasting is mostly useful
    /// for function pointers and hand-written callable structs.
    ///
    /// # Examples
    ///
    /// ```
    /// use smallfn::Function;
    ///
    /// fn double(x: i32) -> i32 {
    ///     x * 2
    /// }
    ///
    /// let f = Function::new(double as fn(i32) -> i32);
    /// assert!(f.downcast_ref::<fn(i32) -> i32>().is_some());
    /// assert!(f.downcast_ref::<fn(i32) -> u32>().is_none());
    /// ```
    #[must_use]
    pub fn downcast_ref<F: 'static>(&self) -> Option<&F> {
        self.storage.downcast_ref::<F>()
    }

    /// Returns a mutable reference to the stored callable if it has exactly
    /// the concrete type `F`.
    ///
    /// # Examples
    ///
    /// ```
    /// use smallfn::Function;
    ///
    /// fn double(x: i32) -> i32 {
    ///     x * 2
    /// }
    /// fn triple(x: i32) -> i32 {
    ///     x * 3
    /// }
    ///
    /// let mut f = Function::new(double as fn(i32) -> i32);
    /// *f.downcast_mut::<fn(i32) -> i32>().unwrap() = triple;
    /// assert_eq!(f.call((5,)), Ok(15));
    /// ```
    #[must_use]
    pub fn downcast_mut<F: 'static>(&mut self) -> Option<&mut F> {
        self.storage.downcast_mut::<F>()
    }

    /// Moves the stored callable out into a new function, leaving `self`
    /// empty.
    ///
    /// Heap-stored callables change hands by pointer, with no allocation or
    /// clone. Taking from an empty function yields an empty function.
    #[must_use]
    pub fn take(&mut self) -> Self {
        Self {
            storage: self.storage.take(),
        }
    }

    /// Drops the stored callable, leaving the function empty.
    ///
    /// Clearing an already-empty function is a no-op.
    ///
    /// # Examples
    ///
    /// ```
    /// use smallfn::Function;
    ///
    /// let mut f = Function::new(|| 1);
    /// f.clear();
    /// assert!(f.is_empty());
    /// ```
    pub fn clear(&mut self) {
        self.storage.clear();
    }

    /// Returns the [`core::any::type_name`] of the stored callable, or
    /// `"<empty>"` when the function is empty.
    ///
    /// The name is meant for diagnostics only; its exact contents are not
    /// stable across compiler versions.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.storage.type_name()
    }
}

impl<Args: 'static, R: 'static> Default for Function<Args, R> {
    /// Creates an empty function, equivalent to [`Function::empty`].
    fn default() -> Self {
        Self::empty()
    }
}

impl<Args: 'static, R: 'static> Clone for Function<Args, R> {
    /// Clones the stored callable, captured state included.
    ///
    /// The two functions are fully independent afterwards; mutation of
    /// state captured by one is never observed through the other. Cloning
    /// an empty function yields an empty function.
    fn clone(&self) -> Self {
        Self {
            storage: self.storage.clone(),
        }
    }
}

impl<Args: 'static, R: 'static> fmt::Debug for Function<Args, R> {
    /// Formats as `Function(<type name>)`, with `"<empty>"` standing in for
    /// the missing type of an empty function.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Function")
            .field(&self.storage.type_name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use alloc::format;

    use super::*;

    #[test]
    fn test_default_is_empty() {
        let mut f = Function::<(), i32>::default();
        assert!(f.is_empty());
        assert!(!f.is_some());
        assert_eq!(f.call(()), Err(BadFunctionCall));
    }

    #[test]
    fn test_debug_formatting() {
        let empty = Function::<(), ()>::empty();
        assert_eq!(format!("{empty:?}"), "Function(\"<empty>\")");

        let named = Function::new(drop as fn(i32));
        let rendered = format!("{named:?}");
        assert!(rendered.starts_with("Function("));
        assert!(rendered.contains("fn(i32)"));
    }

    #[test]
    fn test_send_sync() {
        static_assertions::assert_not_impl_any!(Function<(), ()>: Send, Sync);
        static_assertions::assert_not_impl_any!(Function<(i32,), i32>: Send, Sync);
    }

    #[test]
    fn test_reassignment_replaces_callable() {
        let mut f = Function::new(|x: i32| x + 1);
        assert_eq!(f.call((1,)), Ok(2));

        f = Function::new(|x: i32| x - 1);
        assert_eq!(f.call((1,)), Ok(0));

        f = Function::empty();
        assert_eq!(f.call((1,)), Err(BadFunctionCall));
    }
}
