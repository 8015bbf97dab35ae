//! # Span Decoding
//!
//! Turns an offsets sequence plus a flat backing store into per-bucket views.
//!
//! A vector of buckets stores all of its elements in one flat backing store
//! and keeps `n + 1` non-decreasing offsets next to it. Bucket `i` covers
//! `[offsets[i], offsets[i + 1])` of the backing store:
//!
//! ```text
//! offsets: [0, 2, 2, 5]
//! data:    [a, b, c, d, e]
//! buckets: [a, b] [] [c, d, e]
//! ```
//!
//! Nothing in here touches target memory. The decoder works on offsets that
//! were already read, so it can be tested (and reasoned about) on its own.

use crate::error::{LoupeError, LoupeResult};

/// Contiguous run of elements inside a backing store.
///
/// Derived per request and never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span
{
    /// Index of the first element in the backing store.
    pub start: u64,
    /// Number of elements.
    pub len: u64,
}

impl Span
{
    /// Span between two consecutive offsets of bucket `index`, validated
    /// against the backing store's `extent`.
    ///
    /// ## Errors
    ///
    /// - `CorruptOffsets`: `start > end`
    /// - `SpanOutOfBounds`: `end > extent`
    pub fn between(index: u64, start: u64, end: u64, extent: u64) -> LoupeResult<Self>
    {
        if start > end {
            return Err(LoupeError::CorruptOffsets { index, start, end });
        }
        if end > extent {
            return Err(LoupeError::SpanOutOfBounds { start, end, extent });
        }
        Ok(Self {
            start,
            len: end - start,
        })
    }

    /// One past the last element.
    pub fn end(&self) -> u64
    {
        self.start + self.len
    }

    pub fn is_empty(&self) -> bool
    {
        self.len == 0
    }
}

/// Number of buckets described by an offsets sequence of `offsets_len`
/// entries. An empty sequence describes no buckets, same as `[0]`.
pub fn bucket_count(offsets_len: u64) -> u64
{
    offsets_len.saturating_sub(1)
}

/// Decoder over an already-read offsets sequence.
#[derive(Debug, Clone)]
pub struct SpanDecoder<'a>
{
    offsets: &'a [u64],
    extent: u64,
}

impl<'a> SpanDecoder<'a>
{
    /// `extent` is the number of elements in the backing store.
    pub fn new(offsets: &'a [u64], extent: u64) -> Self
    {
        Self { offsets, extent }
    }

    /// Number of buckets.
    pub fn len(&self) -> u64
    {
        bucket_count(self.offsets.len() as u64)
    }

    pub fn is_empty(&self) -> bool
    {
        self.len() == 0
    }

    /// Span of bucket `index`.
    ///
    /// ## Errors
    ///
    /// - `IndexOutOfBounds`: `index >= len()`
    /// - `CorruptOffsets` / `SpanOutOfBounds`: see [`Span::between`]
    pub fn span(&self, index: u64) -> LoupeResult<Span>
    {
        let len = self.len();
        if index >= len {
            return Err(LoupeError::IndexOutOfBounds { index, len });
        }
        let i = usize::try_from(index).map_err(|_| LoupeError::IndexOutOfBounds { index, len })?;
        Span::between(index, self.offsets[i], self.offsets[i + 1], self.extent)
    }

    /// Spans of all buckets in order.
    pub fn spans(&self) -> impl Iterator<Item = LoupeResult<Span>> + '_
    {
        (0..self.len()).map(move |index| self.span(index))
    }
}
