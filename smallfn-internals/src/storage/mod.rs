//! Module containing the type-erased callable storage cell

pub(crate) mod raw;
mod vtable;
