//! # Types
//!
//! Host-agnostic types used throughout the printers.
//!
//! These types abstract away how a particular debugger represents types and
//! addresses, allowing the printers to work with "a struct with fields" or
//! "a pointer to `T`" without knowing which debugger is asking.

pub mod address;
pub mod descriptor;

// Re-export all public types
pub use address::Address;
pub use descriptor::{FieldDescriptor, TypeDescriptor, TypeKind};
