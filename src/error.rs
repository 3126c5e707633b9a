//! The error reported when invoking an empty [`Function`](crate::Function).

use core::fmt;

/// The error returned by [`Function::call`](crate::Function::call) when the
/// function holds no callable.
///
/// An empty function is a normal, reachable state (freshly constructed with
/// [`Function::empty`](crate::Function::empty), cleared, or moved out of
/// with [`Function::take`](crate::Function::take)), so calling one reports
/// an error value rather than panicking.
///
/// # Examples
///
/// ```
/// use smallfn::{BadFunctionCall, Function};
///
/// let mut f = Function::<(), i32>::empty();
/// assert_eq!(f.call(()), Err(BadFunctionCall));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BadFunctionCall;

impl fmt::Display for BadFunctionCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("bad function call")
    }
}

impl core::error::Error for BadFunctionCall {}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(BadFunctionCall.to_string(), "bad function call");
    }

    #[test]
    fn test_is_error() {
        fn assert_error<E: core::error::Error>(_: E) {}
        assert_error(BadFunctionCall);
    }
}
