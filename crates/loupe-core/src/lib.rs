//! # loupe-core
//!
//! Value printers for an interactive debugger inspecting custom container
//! and wrapper templates.
//!
//! A debugger's generic formatter only sees raw memory and type names. This
//! crate provides:
//! - Type matching over canonicalized type names
//! - Printers for timestamps, durations, strong aliases, optionals, fractions,
//!   fixed-capacity vectors, reflective composites and vectors of buckets
//! - A synthetic `operator[]` for vectors of buckets, for targets where the
//!   compiled operator was inlined away
//! - A registry that dispatches values to printers in registration order
//!
//! ## Hosts
//!
//! Printers talk to the debugger only through the [`Inspector`] trait. The
//! crate ships one implementation, [`snapshot::Snapshot`], which serves a
//! captured image of a stopped process.
//!
//! ## Read-only
//!
//! Nothing in this crate writes to, resumes or instruments the inspected
//! process.

pub mod error;
pub mod inspector;
pub mod matcher;
pub mod prelude;
pub mod printers;
pub mod registry;
pub mod render;
pub mod snapshot;
pub mod span;
pub mod types;

pub use error::{LoupeError, LoupeResult};
pub use inspector::Inspector;
pub use registry::{Registry, RegistryBuilder};
pub use render::{render, RenderOptions, ValueTree};
