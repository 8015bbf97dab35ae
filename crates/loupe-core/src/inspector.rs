//! # Inspector Trait
//!
//! The boundary between the printers and the host debugger.
//!
//! The printers never touch target memory themselves. Everything they know
//! about a value comes through this trait, which a host implements on top of
//! its own introspection API (a GDB/LLDB scripting bridge, a DWARF reader over
//! a core file, or the [`Snapshot`](crate::snapshot::Snapshot) used by the CLI
//! and the tests).
//!
//! ## Contract
//!
//! - Every method is a read. Nothing here may write to the target.
//! - The target is stopped for the duration of a request, so two reads of the
//!   same value during one request observe the same bytes.
//! - Values are handles owned by the host. Printers clone them freely and
//!   drop them when the request ends.

use std::fmt;

use crate::error::LoupeResult;
use crate::types::{Address, TypeDescriptor};

/// Read-only introspection API of a host debugger
///
/// ## Thread Safety
///
/// Hosts issue one request at a time and block on the result. Implementations
/// do not need to be thread-safe.
pub trait Inspector
{
    /// Handle to a typed value in the paused target.
    type Value: Clone + fmt::Debug + 'static;

    /// Describe the type of a value, as declared (aliases and qualifiers intact).
    ///
    /// ## Errors
    ///
    /// - `UnknownType`: the host has no debug information for the value's type
    fn describe(&self, value: &Self::Value) -> LoupeResult<TypeDescriptor>;

    /// Look up a type by name.
    ///
    /// ## Errors
    ///
    /// - `UnknownType`: no type with that name exists
    fn lookup_type(&self, name: &str) -> LoupeResult<TypeDescriptor>;

    /// One step of alias resolution.
    ///
    /// Returns the aliased type name if `name` is a declared alias, `None`
    /// otherwise. [`canonicalize`](crate::matcher::canonicalize) repeats this
    /// until a fixed point is reached.
    fn resolve_alias(&self, name: &str) -> Option<String>;

    /// Access a field of a struct value by name.
    ///
    /// ## Errors
    ///
    /// - `MissingField`: the value's type declares no such field
    fn field(&self, value: &Self::Value, name: &str) -> LoupeResult<Self::Value>;

    /// Reinterpret a value as another declared type.
    fn cast(&self, value: &Self::Value, type_name: &str) -> LoupeResult<Self::Value>;

    /// Follow an indirect reference.
    ///
    /// ## Errors
    ///
    /// - `NotAPointer`: the value is not a pointer
    /// - `InvalidAddress`: the pointer does not point into readable memory
    fn dereference(&self, value: &Self::Value) -> LoupeResult<Self::Value>;

    /// Element `index` of an array value, or of the memory a pointer value
    /// points to (pointer arithmetic followed by a dereference).
    fn element(&self, value: &Self::Value, index: u64) -> LoupeResult<Self::Value>;

    /// Integral representation of a scalar or pointer value.
    ///
    /// ## Errors
    ///
    /// - `NotAnInteger`: the value is a struct, array or floating point value
    fn to_integer(&self, value: &Self::Value) -> LoupeResult<i128>;

    /// The host's own string form of a value.
    fn to_display(&self, value: &Self::Value) -> LoupeResult<String>;

    /// Reinterpret `len` consecutive elements of `element_type` starting at
    /// `start` as a native indexable sequence (`std::span<T>`).
    ///
    /// ## Errors
    ///
    /// - `InvalidAddress`: the range is not inside a single allocation
    fn span(&self, element_type: &str, start: Address, len: u64) -> LoupeResult<Self::Value>;

    /// Evaluate an expression in the context of the paused target.
    ///
    /// ## Errors
    ///
    /// - `InvalidExpression`: the host cannot parse or resolve the expression
    fn evaluate(&self, expression: &str) -> LoupeResult<Self::Value>;
}
