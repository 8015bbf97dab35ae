//! Vector-of-buckets printer and synthetic indexer (`cista::basic_vecvec`).
//!
//! A vecvec keeps every element of every bucket in one flat vector `data_`
//! and the bucket boundaries in a second vector `bucket_starts_` of `n + 1`
//! offsets. Both are cista vectors: a pointer `el_` to the first element and
//! a length `used_size_`.
//!
//! Each bucket is shown as a `std::span<T>` over `data_`, built through the
//! host's memory reinterpretation instead of by calling the (usually inlined)
//! `operator[]` in the target. The same computation backs the synthetic
//! `operator[]` so expressions like `graph.element_to_section_ids_[3]` can
//! be evaluated interactively.

use tracing::debug;

use super::{limit_to_u64, read_unsigned, receiver, Child, DisplayHint, Inspected, SyntheticMethod, ValuePrinter};
use crate::error::{LoupeError, LoupeResult};
use crate::inspector::Inspector;
use crate::matcher::{canonicalize, TypeMatcher};
use crate::span::{bucket_count, Span, SpanDecoder};
use crate::types::Address;

/// `cista::basic_vecvec`, but not the sibling family whose names mention
/// buckets, which lays out its storage differently.
pub const VECVEC: TypeMatcher = TypeMatcher::prefix_excluding("cista::basic_vecvec", "bucket");

/// Name of the emulated indexing operator.
pub const INDEX_OPERATOR: &str = "operator[]";

const DATA_FIELD: &str = "data_";
const BUCKET_STARTS_FIELD: &str = "bucket_starts_";
const VECTOR_BEGIN_FIELD: &str = "el_";
const VECTOR_LEN_FIELD: &str = "used_size_";

fn span_type(element_type: &str) -> String
{
    format!("std::span<{element_type}>")
}

/// Pointer and length of a cista vector.
struct CistaVector<V>
{
    begin: V,
    len: u64,
}

impl<V: Clone> CistaVector<V>
{
    fn read<I: Inspector<Value = V>>(inspector: &I, vector: &V) -> LoupeResult<Self>
    {
        let begin = inspector.field(vector, VECTOR_BEGIN_FIELD)?;
        let len = read_unsigned(inspector, &inspector.field(vector, VECTOR_LEN_FIELD)?)?;
        Ok(Self { begin, len })
    }

    fn get<I: Inspector<Value = V>>(&self, inspector: &I, index: u64) -> LoupeResult<u64>
    {
        if index >= self.len {
            return Err(LoupeError::IndexOutOfBounds { index, len: self.len });
        }
        read_unsigned(inspector, &inspector.element(&self.begin, index)?)
    }

    fn base_address<I: Inspector<Value = V>>(&self, inspector: &I) -> LoupeResult<Address>
    {
        let raw = inspector.to_integer(&self.begin)?;
        u64::try_from(raw)
            .map(Address::from)
            .map_err(|_| LoupeError::InvalidArgument(format!("negative pointer value {raw}")))
    }
}

/// Everything needed to turn a bucket index into a span value.
struct BucketLayout<V>
{
    data: CistaVector<V>,
    bucket_starts: CistaVector<V>,
    element_type: String,
}

impl<V: Clone> BucketLayout<V>
{
    fn read<I: Inspector<Value = V>>(inspector: &I, vecvec: &V) -> LoupeResult<Self>
    {
        let data_value = inspector.field(vecvec, DATA_FIELD)?;
        let data = CistaVector::read(inspector, &data_value)?;
        let bucket_starts = CistaVector::read(inspector, &inspector.field(vecvec, BUCKET_STARTS_FIELD)?)?;
        let element_type = element_type(inspector, &data_value, &data.begin)?;
        Ok(Self {
            data,
            bucket_starts,
            element_type,
        })
    }

    fn len(&self) -> u64
    {
        bucket_count(self.bucket_starts.len)
    }

    /// Span of one bucket, reading only its two bounding offsets.
    fn bucket<I: Inspector<Value = V>>(&self, inspector: &I, index: u64) -> LoupeResult<Span>
    {
        let len = self.len();
        if index >= len {
            return Err(LoupeError::IndexOutOfBounds { index, len });
        }
        let start = self.bucket_starts.get(inspector, index)?;
        let end = self.bucket_starts.get(inspector, index + 1)?;
        Span::between(index, start, end, self.data.len)
    }

    /// Offsets bounding the first `buckets` buckets.
    fn offsets<I: Inspector<Value = V>>(&self, inspector: &I, buckets: u64) -> LoupeResult<Vec<u64>>
    {
        let count = buckets.saturating_add(1).min(self.bucket_starts.len);
        (0..count)
            .map(|index| self.bucket_starts.get(inspector, index))
            .collect()
    }

    /// Reinterpret a span of `data_` as a `std::span<T>` in the target.
    fn materialize<I: Inspector<Value = V>>(&self, inspector: &I, span: Span) -> LoupeResult<V>
    {
        let stride = inspector
            .lookup_type(&self.element_type)?
            .size_bytes
            .ok_or_else(|| LoupeError::UnknownType(format!("size of {}", self.element_type)))?;
        let base = self.data.base_address(inspector)?;
        let start = base
            .element(span.start, stride)
            .ok_or(LoupeError::InvalidAddress(base.value()))?;
        inspector.span(&self.element_type, start, span.len)
    }
}

/// Element type of the flat store: its `value_type` member alias, or the
/// pointee of its begin pointer when the alias is not available.
fn element_type<I: Inspector>(inspector: &I, data: &I::Value, begin: &I::Value) -> LoupeResult<String>
{
    let data_type = canonicalize(inspector, &inspector.describe(data)?.name);
    let member_alias = format!("{data_type}::value_type");
    let resolved = canonicalize(inspector, &member_alias);
    if resolved != member_alias {
        return Ok(resolved);
    }

    inspector
        .describe(begin)?
        .target
        .map(|pointee| canonicalize(inspector, &pointee))
        .ok_or(LoupeError::UnknownType(member_alias))
}

pub struct VecVecPrinter<V>
{
    layout: BucketLayout<V>,
}

impl<I: Inspector> ValuePrinter<I> for VecVecPrinter<I::Value>
{
    fn children(&self, inspector: &I) -> LoupeResult<Vec<Child<I::Value>>>
    {
        self.children_up_to(inspector, usize::MAX)
    }

    fn children_up_to(&self, inspector: &I, limit: usize) -> LoupeResult<Vec<Child<I::Value>>>
    {
        let shown = self.layout.len().min(limit_to_u64(limit));
        let offsets = self.layout.offsets(inspector, shown)?;
        let decoder = SpanDecoder::new(&offsets, self.layout.data.len);
        (0..decoder.len())
            .map(|index| {
                let span = decoder.span(index)?;
                Ok(Child::indexed(index, self.layout.materialize(inspector, span)?))
            })
            .collect()
    }

    fn display_hint(&self) -> Option<DisplayHint>
    {
        Some(DisplayHint::Array)
    }
}

pub fn vecvec<I: Inspector>(inspector: &I, inspected: Inspected<I::Value>) -> LoupeResult<Box<dyn ValuePrinter<I>>>
{
    let layout = BucketLayout::read(inspector, &inspected.value)?;
    Ok(Box::new(VecVecPrinter { layout }))
}

/// `operator[](unsigned long idx)`: the span of bucket `idx`.
pub struct BucketIndexOperator;

impl BucketIndexOperator
{
    fn index<I: Inspector>(inspector: &I, args: &[I::Value]) -> LoupeResult<u64>
    {
        match args {
            [idx] => read_unsigned(inspector, idx),
            _ => Err(LoupeError::InvalidArgument(format!(
                "{INDEX_OPERATOR} takes 1 argument, got {}",
                args.len()
            ))),
        }
    }
}

impl<I: Inspector> SyntheticMethod<I> for BucketIndexOperator
{
    fn argument_types(&self) -> &'static [&'static str]
    {
        &["unsigned long"]
    }

    fn result_type(&self, inspector: &I, this: &I::Value, _args: &[I::Value]) -> LoupeResult<String>
    {
        let layout = BucketLayout::read(inspector, &receiver(inspector, this)?)?;
        Ok(span_type(&layout.element_type))
    }

    fn invoke(&self, inspector: &I, this: &I::Value, args: &[I::Value]) -> LoupeResult<I::Value>
    {
        let index = Self::index(inspector, args)?;
        let layout = BucketLayout::read(inspector, &receiver(inspector, this)?)?;
        let span = layout.bucket(inspector, index)?;
        debug!(index, start = span.start, len = span.len, "synthetic {INDEX_OPERATOR}");
        layout.materialize(inspector, span)
    }
}

pub fn index_operator<I: Inspector>() -> Box<dyn SyntheticMethod<I>>
{
    Box::new(BucketIndexOperator)
}
