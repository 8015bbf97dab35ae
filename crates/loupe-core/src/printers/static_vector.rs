//! Fixed-capacity vector printer (`soro::utls::static_vector<T, N>`).
//!
//! Elements live in a fixed backing array `mem_`; only the first `end_` of
//! them are constructed. Anything at or past `end_` is uninitialized storage
//! and is never read.

use super::{limit_to_u64, read_unsigned, Child, DisplayHint, Inspected, ValuePrinter};
use crate::error::{LoupeError, LoupeResult};
use crate::inspector::Inspector;
use crate::types::TypeKind;

const STORAGE_FIELD: &str = "mem_";
const LENGTH_FIELD: &str = "end_";
/// Built-in array inside libstdc++'s `std::array`.
const STD_ARRAY_ELEMS: &str = "_M_elems";

pub struct StaticVectorPrinter<V>
{
    storage: V,
    element_type: String,
    len: u64,
}

impl<I: Inspector> ValuePrinter<I> for StaticVectorPrinter<I::Value>
{
    fn children(&self, inspector: &I) -> LoupeResult<Vec<Child<I::Value>>>
    {
        self.children_up_to(inspector, usize::MAX)
    }

    fn children_up_to(&self, inspector: &I, limit: usize) -> LoupeResult<Vec<Child<I::Value>>>
    {
        (0..self.len.min(limit_to_u64(limit)))
            .map(|index| {
                let element = inspector.element(&self.storage, index)?;
                let element = inspector.cast(&element, &self.element_type)?;
                Ok(Child::indexed(index, element))
            })
            .collect()
    }

    fn display_hint(&self) -> Option<DisplayHint>
    {
        Some(DisplayHint::Array)
    }
}

pub fn static_vector<I: Inspector>(
    inspector: &I,
    inspected: Inspected<I::Value>,
) -> LoupeResult<Box<dyn ValuePrinter<I>>>
{
    let len_value = inspector.field(&inspected.value, LENGTH_FIELD)?;
    let len = read_unsigned(inspector, &len_value)?;

    let mut storage = inspector.field(&inspected.value, STORAGE_FIELD)?;
    let mut descriptor = inspector.describe(&storage)?;
    if descriptor.kind == TypeKind::Struct {
        if descriptor.field(STD_ARRAY_ELEMS).is_none() {
            return Err(LoupeError::missing_field(descriptor.name, STD_ARRAY_ELEMS));
        }
        storage = inspector.field(&storage, STD_ARRAY_ELEMS)?;
        descriptor = inspector.describe(&storage)?;
    }

    let capacity = descriptor
        .array_length()
        .ok_or_else(|| LoupeError::InvalidArgument(format!("{STORAGE_FIELD} of {} is not an array", inspected.type_name)))?;
    if len > capacity {
        return Err(LoupeError::CorruptLength { len, capacity });
    }
    let element_type = descriptor
        .target
        .ok_or_else(|| LoupeError::UnknownType(format!("element type of {}", descriptor.name)))?;

    Ok(Box::new(StaticVectorPrinter {
        storage,
        element_type,
        len,
    }))
}
