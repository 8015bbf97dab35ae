//! # Printers
//!
//! Value printers and synthetic methods for custom container and wrapper
//! templates.
//!
//! A printer is instantiated by the [`Registry`](crate::registry::Registry)
//! for one value during one request. The host asks it for a summary and/or a
//! sequence of named children and then drops it.
//!
//! - [`scalar`]: timestamps, durations, fractions, strong aliases, optionals
//! - [`reflect`]: fields of a structure reached through a reflective-access wrapper
//! - [`static_vector`]: bounded prefix of a fixed backing array
//! - [`vecvec`]: vector of buckets, plus the synthetic `operator[]`

pub mod reflect;
pub mod scalar;
pub mod static_vector;
pub mod vecvec;

use crate::error::{LoupeError, LoupeResult};
use crate::inspector::Inspector;
use crate::types::TypeDescriptor;

/// What a printer shows on the value's own line.
#[derive(Debug, Clone, PartialEq)]
pub enum Summary<V>
{
    /// Final text.
    Text(String),
    /// Another value the host formats on its own, printers included.
    Value(V),
}

/// Named child value for structured expansion.
#[derive(Debug, Clone)]
pub struct Child<V>
{
    pub name: String,
    pub value: V,
}

impl<V> Child<V>
{
    pub fn new(name: impl Into<String>, value: V) -> Self
    {
        Self {
            name: name.into(),
            value,
        }
    }

    /// Child named `[index]`.
    pub fn indexed(index: u64, value: V) -> Self
    {
        Self::new(format!("[{index}]"), value)
    }
}

/// How the host should lay out a printer's children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayHint
{
    /// Children are the elements of a sequence.
    Array,
}

/// A value matched by a registered pattern, handed to the printer factory.
#[derive(Debug, Clone)]
pub struct Inspected<V>
{
    pub value: V,
    /// Canonical type name the pattern accepted.
    pub type_name: String,
    pub descriptor: TypeDescriptor,
}

/// Renders one value. Every method is a read.
pub trait ValuePrinter<I: Inspector>
{
    /// Text (or a value to format instead) for the value's own line.
    fn summary(&self, _inspector: &I) -> LoupeResult<Option<Summary<I::Value>>>
    {
        Ok(None)
    }

    /// Named children in display order.
    fn children(&self, _inspector: &I) -> LoupeResult<Vec<Child<I::Value>>>
    {
        Ok(Vec::new())
    }

    /// The first `limit` children. Printers over large containers override
    /// this so nothing past the limit is read from the target.
    fn children_up_to(&self, inspector: &I, limit: usize) -> LoupeResult<Vec<Child<I::Value>>>
    {
        let mut children = self.children(inspector)?;
        children.truncate(limit);
        Ok(children)
    }

    fn display_hint(&self) -> Option<DisplayHint>
    {
        None
    }
}

/// Debugger-side emulation of an operation the host cannot call in the
/// target, typically because the compiled operation was inlined.
pub trait SyntheticMethod<I: Inspector>
{
    /// Declared argument types.
    fn argument_types(&self) -> &'static [&'static str];

    /// Type of the value [`invoke`](Self::invoke) returns for these arguments.
    fn result_type(&self, inspector: &I, this: &I::Value, args: &[I::Value]) -> LoupeResult<String>;

    /// Compute the result from the target's memory layout.
    fn invoke(&self, inspector: &I, this: &I::Value, args: &[I::Value]) -> LoupeResult<I::Value>;
}

/// Builds a printer for a matched value.
pub type PrinterFactory<I> =
    fn(&I, Inspected<<I as Inspector>::Value>) -> LoupeResult<Box<dyn ValuePrinter<I>>>;

/// Builds the worker for a synthetic method.
pub type MethodFactory<I> = fn() -> Box<dyn SyntheticMethod<I>>;

/// A child count as an element count.
pub(crate) fn limit_to_u64(limit: usize) -> u64
{
    u64::try_from(limit).unwrap_or(u64::MAX)
}

/// Read a non-negative integral value.
pub(crate) fn read_unsigned<I: Inspector>(inspector: &I, value: &I::Value) -> LoupeResult<u64>
{
    let raw = inspector.to_integer(value)?;
    u64::try_from(raw).map_err(|_| LoupeError::InvalidArgument(format!("expected an unsigned value, got {raw}")))
}

/// Follow a chain of field names, e.g. `["__d", "__r"]`.
pub(crate) fn field_path<I: Inspector>(inspector: &I, value: &I::Value, path: &[&str]) -> LoupeResult<I::Value>
{
    path.iter()
        .try_fold(value.clone(), |current, name| inspector.field(&current, name))
}

/// The object a synthetic method was called on; hosts pass either the
/// object or a pointer to it.
pub(crate) fn receiver<I: Inspector>(inspector: &I, this: &I::Value) -> LoupeResult<I::Value>
{
    if inspector.describe(this)?.is_pointer() {
        inspector.dereference(this)
    } else {
        Ok(this.clone())
    }
}
