//! Composite printer for structures reached through a reflective-access
//! wrapper.
//!
//! Some types keep their real state behind an opaque handle and carry a
//! `cista::wrapped<T>` member solely so tools can find it. The printer finds
//! the first such member, takes its `el_` pointer as the access handle and
//! expands the pointed-to structure field by field.

use tracing::trace;

use super::{Child, Inspected, ValuePrinter};
use crate::error::LoupeResult;
use crate::inspector::Inspector;
use crate::matcher::{canonicalize, TypeMatcher};

/// Type of the member that holds the access handle.
pub const REFLECTIVE_WRAPPER: TypeMatcher = TypeMatcher::prefix("cista::wrapped<");

/// Field of the wrapper holding the pointer.
pub const ACCESS_HANDLE_FIELD: &str = "el_";

/// Expands the fields behind a reflective-access handle.
///
/// The handle is a non-owning pointer into target memory. When the matched
/// type has no wrapper member the handle stays unset and the printer has no
/// children.
pub struct ReflectedFieldsPrinter<V>
{
    handle: Option<V>,
}

impl<I: Inspector> ValuePrinter<I> for ReflectedFieldsPrinter<I::Value>
{
    fn children(&self, inspector: &I) -> LoupeResult<Vec<Child<I::Value>>>
    {
        let Some(handle) = &self.handle else {
            return Ok(Vec::new());
        };

        let target = inspector.dereference(handle)?;
        let descriptor = inspector.describe(&target)?;
        descriptor
            .fields
            .iter()
            .map(|field| {
                let value = inspector.field(&target, &field.name)?;
                let value = inspector.cast(&value, &field.type_name)?;
                Ok(Child::new(field.name.clone(), value))
            })
            .collect()
    }
}

/// Locate the wrapper member and its access handle.
pub fn reflected_fields<I: Inspector>(
    inspector: &I,
    inspected: Inspected<I::Value>,
) -> LoupeResult<Box<dyn ValuePrinter<I>>>
{
    let wrapper = inspected
        .descriptor
        .fields
        .iter()
        .find(|field| REFLECTIVE_WRAPPER.accepts(&canonicalize(inspector, &field.type_name)));

    let handle = match wrapper {
        Some(field) => {
            let wrapper = inspector.field(&inspected.value, &field.name)?;
            Some(inspector.field(&wrapper, ACCESS_HANDLE_FIELD)?)
        }
        None => {
            trace!(type_name = %inspected.type_name, "no reflective-access member");
            None
        }
    };

    Ok(Box::new(ReflectedFieldsPrinter { handle }))
}
