//! Common module for library exports

pub use crate::error::{LoupeError, LoupeResult};
pub use crate::inspector::Inspector;
pub use crate::matcher::{canonicalize, TypeMatcher};
pub use crate::printers::{Child, Summary, SyntheticMethod, ValuePrinter};
pub use crate::registry::{Registry, RegistryBuilder};
pub use crate::render::{render, RenderOptions, ValueTree};
pub use crate::snapshot::{Datum, Snapshot, SnapshotValue};
pub use crate::types::{Address, TypeDescriptor, TypeKind};
