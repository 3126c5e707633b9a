//! Internal utility types.

/// Marker type identifying the empty state of a storage cell.
///
/// The empty vtable records the [`TypeId`] of this type: a cell whose vtable
/// reports it holds no callable. Because `Empty` is private to this crate, no
/// user-supplied callable can ever share its identity, so the empty state can
/// never be confused with a stored value.
///
/// [`TypeId`]: core::any::TypeId
pub(crate) struct Empty;
