//! # Error Types
//!
//! General error handling for printers, synthetic methods and hosts.
//!
//! We use `thiserror` to automatically generate `Error` trait implementations
//! and nice error messages.
//!
//! Not everything that goes wrong during inspection is an error:
//!
//! - A type nobody recognizes is reported as `Ok(None)` by the registry, and
//!   the host falls back to its default formatter.
//! - A composite value without a reflective-access field renders with no
//!   children.
//! - A matched type missing a field its printer reads is handed to the
//!   default formatter, the same as an unrecognized type. `MissingField`
//!   still reaches callers that read fields directly.

use thiserror::Error;

/// Main error type for inspection requests
///
/// Each request is independent: an error aborts the current request only and
/// never leaves state behind that could affect the next one.
///
/// ## Error Categories
///
/// 1. **Layout errors**: MissingField, UnknownType, NotAPointer, NotAnInteger
/// 2. **Precondition violations**: IndexOutOfBounds, InvalidArgument
/// 3. **Inconsistent target memory**: CorruptOffsets, SpanOutOfBounds, CorruptLength, InvalidAddress
/// 4. **Formatting errors**: InvalidTimestamp
/// 5. **Registration errors**: OverlappingPatterns
/// 6. **Host errors**: InvalidExpression, Snapshot, Io
#[derive(Error, Debug)]
pub enum LoupeError
{
    /// A field a printer depends on is not declared by the value's type
    #[error("Type {type_name} has no field `{field}`")]
    MissingField
    {
        /// Canonical name of the inspected type
        type_name: String,
        /// Name of the missing field
        field: String,
    },

    /// A type name could not be resolved by the host
    #[error("Unknown type: {0}")]
    UnknownType(String),

    /// The value was expected to be an indirect reference
    #[error("Value of type {0} is not a pointer")]
    NotAPointer(String),

    /// The value has no integral representation
    #[error("Value of type {0} is not an integer")]
    NotAnInteger(String),

    /// A synthetic method was asked for an element past the logical length
    ///
    /// This is a genuine precondition violation. Printers never fabricate data
    /// for out-of-range requests.
    #[error("Index {index} out of bounds (length {len})")]
    IndexOutOfBounds
    {
        /// Requested index
        index: u64,
        /// Logical length of the container
        len: u64,
    },

    /// Invalid argument passed to a printer, method or host
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// An offsets sequence decreases between two consecutive entries
    #[error("Corrupt offsets at bucket {index}: start {start} > end {end}")]
    CorruptOffsets
    {
        /// Bucket whose bounds are inverted
        index: u64,
        /// Offset read for the bucket start
        start: u64,
        /// Offset read for the bucket end
        end: u64,
    },

    /// A span would reach past the backing store
    #[error("Span [{start}, {end}) exceeds backing store of {extent} elements")]
    SpanOutOfBounds
    {
        /// First element of the span
        start: u64,
        /// One past the last element of the span
        end: u64,
        /// Number of elements in the backing store
        extent: u64,
    },

    /// A logical length exceeds the fixed capacity of its backing array
    #[error("Length {len} exceeds capacity {capacity}")]
    CorruptLength
    {
        /// Logical length read from the target
        len: u64,
        /// Declared capacity of the backing array
        capacity: u64,
    },

    /// An address does not fall inside any known allocation
    #[error("Invalid address 0x{0:016x}")]
    InvalidAddress(u64),

    /// A timestamp cannot be represented as a calendar date
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(i128),

    /// Two registrations could claim the same type
    #[error("Pattern {0} overlaps with an already registered pattern {1}")]
    OverlappingPatterns(String, String),

    /// The host could not evaluate an expression
    #[error("Invalid expression: {0}")]
    InvalidExpression(String),

    /// A snapshot file could not be parsed
    #[error("Snapshot error: {0}")]
    Snapshot(#[from] serde_json::Error),

    /// I/O error (for reading snapshot files, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl LoupeError
{
    /// Shorthand for [`LoupeError::MissingField`].
    pub fn missing_field(type_name: impl Into<String>, field: impl Into<String>) -> Self
    {
        Self::MissingField {
            type_name: type_name.into(),
            field: field.into(),
        }
    }
}

/// Convenience type alias for `Result<T, LoupeError>`
///
/// ```rust
/// use loupe_core::error::LoupeResult;
/// fn foo() -> LoupeResult<()>
/// {
///     Ok(())
/// }
/// ```
pub type LoupeResult<T> = std::result::Result<T, LoupeError>;
